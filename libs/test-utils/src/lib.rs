pub mod clock;
pub mod redis;
pub mod stores;
pub mod test_helpers;

pub use clock::ManualClock;
pub use stores::{CountingStore, FailingStore, FailureMode};
pub use test_helpers::*;
