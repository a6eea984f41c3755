//! Clock abstraction; commit timestamps always come from a [`DateProvider`].

use chrono::{DateTime, Utc};

pub trait DateProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDateProvider;

impl DateProvider for SystemDateProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedDateProvider(DateTime<Utc>);

impl FixedDateProvider {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl DateProvider for FixedDateProvider {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
