use chrono::Local;
use chrono::NaiveDateTime;

/// Source of the current instant used for header timestamps.
pub trait Clock {
	fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> NaiveDateTime {
		Local::now().naive_local()
	}
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
	fn now(&self) -> NaiveDateTime {
		self.0
	}
}
