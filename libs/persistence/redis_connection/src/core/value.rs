use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The unified trait for all cacheable values
pub trait CacheValue: Sized + Send + Sync {
    /// Serialize to bytes for any cache backend
    fn to_bytes(&self) -> Result<Bytes, CodecError>;

    /// Deserialize from bytes
    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("Deserialization failed: {0}")]
    Deserialization(String),
}

/// JSON-encode any serializable value for a cache store. Unlike
/// [`Json::to_bytes`] this does not require the value to be
/// deserializable, so borrowed views can be written directly.
pub fn encode<T>(value: &T) -> Result<Bytes, CodecError>
where
    T: Serialize + ?Sized,
{
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| CodecError::Serialization(e.to_string()))
}

/// JSON wrapper used for everything written to a cache store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn inner(self) -> T { self.0 }
}

impl<T> CacheValue for Json<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Send + Sync,
{
    fn to_bytes(&self) -> Result<Bytes, CodecError> { encode(&self.0) }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(bytes)
            .map(Json)
            .map_err(|e| CodecError::Deserialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
    struct Series {
        label: String,
        data: Vec<f64>,
    }

    #[test]
    fn test_json_roundtrip() {
        let series = Series {
            label: "pageview".into(),
            data: vec![1.0, 4.0, 2.0],
        };
        let json = Json(series.clone());

        let bytes = json.to_bytes().unwrap();
        let recovered = Json::<Series>::from_bytes(&bytes).unwrap();

        assert_eq!(recovered.0, series);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let result = Json::<Series>::from_bytes(b"not json");
        assert!(matches!(result, Err(CodecError::Deserialization(_))));
    }
}
