use crate::utils::AppError;
use chrono::{DateTime, Utc};

/// A time window. `new` requires `start` strictly before `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AppError> {
        if start >= end {
            return Err(AppError::invalid("start date must be BEFORE end date"));
        }
        Ok(Self { start, end })
    }

    /// Closed range where `start == end` is allowed; only `start > end` is rejected.
    pub fn inclusive(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::invalid("start date must be BEFORE end date"));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}
