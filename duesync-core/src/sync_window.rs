//! Lower bound on the due dates a sync run looks at.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::ics::start_of_day;

/// Remote records due before `after` are left out of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub after: DateTime<Utc>,
}

impl SyncWindow {
    /// Window starting at midnight of the current day in `tz`.
    pub fn today(tz: Tz) -> Self {
        Self::starting_at(Utc::now(), tz)
    }

    /// Window starting at midnight of the day `now` falls on in `tz`.
    pub fn starting_at(now: DateTime<Utc>, tz: Tz) -> Self {
        let date = now.with_timezone(&tz).date_naive();
        SyncWindow {
            after: start_of_day(date, tz),
        }
    }

    /// Parse an optional `--from` argument.
    /// - `None`: today
    /// - `Some("YYYY-MM-DD")`: start of that day in `tz`
    pub fn from_arg(from: Option<&str>, tz: Tz) -> Result<Self, String> {
        match from {
            None => Ok(Self::today(tz)),
            Some(s) => {
                let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))?;
                Ok(SyncWindow {
                    after: start_of_day(date, tz),
                })
            }
        }
    }
}
