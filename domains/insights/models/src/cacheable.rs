use std::collections::{BTreeMap, HashMap};

/// Whether a computed result is worth storing.
///
/// Empty or undefined results are recomputed on every request instead of
/// being cached.
pub trait Cacheable {
    fn is_cacheable(&self) -> bool { true }
}

impl<T> Cacheable for Vec<T> {
    fn is_cacheable(&self) -> bool { !self.is_empty() }
}

impl<T> Cacheable for Option<T> {
    fn is_cacheable(&self) -> bool { self.is_some() }
}

impl Cacheable for String {
    fn is_cacheable(&self) -> bool { !self.is_empty() }
}

impl<K, V, S> Cacheable for HashMap<K, V, S> {
    fn is_cacheable(&self) -> bool { !self.is_empty() }
}

impl<K, V> Cacheable for BTreeMap<K, V> {
    fn is_cacheable(&self) -> bool { !self.is_empty() }
}

impl Cacheable for serde_json::Value {
    fn is_cacheable(&self) -> bool {
        match self {
            serde_json::Value::Null => false,
            serde_json::Value::Array(items) => !items.is_empty(),
            serde_json::Value::Object(fields) => !fields.is_empty(),
            serde_json::Value::String(s) => !s.is_empty(),
            serde_json::Value::Bool(_) | serde_json::Value::Number(_) => {
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_collections_are_not_cacheable() {
        assert!(!Vec::<u8>::new().is_cacheable());
        assert!(!String::new().is_cacheable());
        assert!(!HashMap::<String, u8>::new().is_cacheable());
        assert!(!None::<u8>.is_cacheable());
    }

    #[test]
    fn test_json_values() {
        assert!(!json!(null).is_cacheable());
        assert!(!json!([]).is_cacheable());
        assert!(!json!({}).is_cacheable());
        assert!(json!(0).is_cacheable());
        assert!(json!(false).is_cacheable());
        assert!(json!([{"count": 0}]).is_cacheable());
    }
}
