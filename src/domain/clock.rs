use chrono::NaiveDate;

/// Source of "today" for stamping records and classifying deadlines.
pub trait Clock {
    /// The current calendar date.
    fn today(&self) -> NaiveDate;
}

/// The local system calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A fixed date is its own clock, which keeps tests deterministic.
impl Clock for NaiveDate {
    fn today(&self) -> NaiveDate {
        *self
    }
}
