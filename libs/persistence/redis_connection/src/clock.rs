use chrono::{DateTime, Utc};

/// Source of "now" for stores and caches that stamp or expire entries.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> { Utc::now() }
}

impl<T> Clock for std::sync::Arc<T>
where
    T: Clock + ?Sized,
{
    fn now(&self) -> DateTime<Utc> { (**self).now() }
}
