pub trait DbConnectConfig: serde::de::DeserializeOwned {
    fn host(&self) -> &str;
    fn port(&self) -> u16;
    fn db(&self) -> u8;
}

#[derive(Debug, serde::Deserialize)]
pub struct RedisDbConfig {
    #[serde(default = "host_default")]
    pub host: String,
    #[serde(default = "port_default")]
    pub port: u16,
    #[serde(default = "db_default")]
    pub db: u8,
}

/// Settings for the in-process [`crate::cache::Memory`] store.
///
/// Entry lifetimes are not configured here: every write carries its own
/// TTL.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_capacity")]
    pub capacity: u64,
}

impl DbConnectConfig for RedisDbConfig {
    fn host(&self) -> &str { &self.host }

    fn port(&self) -> u16 { self.port }

    fn db(&self) -> u8 { self.db }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_memory_capacity(),
        }
    }
}

fn host_default() -> String { "127.0.0.1".into() }
fn port_default() -> u16 { 6379 }
fn db_default() -> u8 { 0 }
fn default_memory_capacity() -> u64 { 10_000 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config_defaults_from_empty_json() {
        let config: MemoryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.capacity, 10_000);
    }

    #[test]
    fn test_memory_config_capacity_override() {
        let config: MemoryConfig =
            serde_json::from_str(r#"{"capacity": 64}"#).unwrap();
        assert_eq!(config.capacity, 64);
    }
}
