pub mod value;

pub use value::{CacheValue, CodecError, Json, encode};
