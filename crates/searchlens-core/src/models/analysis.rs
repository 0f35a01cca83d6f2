use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Brand and keywords a user submitted for analysis.
/// `timestamp` is milliseconds since the Unix epoch, the same shape the
/// browser dashboard keeps in local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct StoredAnalysis {
    pub brand: String,
    pub keywords: Vec<String>,
    pub timestamp: i64,
}

impl StoredAnalysis {
    pub fn new(brand: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            brand: brand.into(),
            keywords,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp)
    }

    /// Upper-cased first character of the brand, used as its avatar
    pub fn initial(&self) -> Option<char> {
        self.brand.chars().next().map(|c| c.to_ascii_uppercase())
    }

    pub fn age_minutes(&self) -> i64 {
        self.age_minutes_at(Utc::now())
    }

    fn age_minutes_at(&self, now: DateTime<Utc>) -> i64 {
        match self.submitted_at() {
            Some(at) => (now - at).num_minutes(),
            None => 0,
        }
    }

    pub fn age_display(&self) -> String {
        Self::format_age(self.age_minutes())
    }

    fn format_age(minutes: i64) -> String {
        if minutes < 1 {
            // Covers clock skew too
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    /// Submission time in the local timezone, e.g. "March 4, 2025, 02:05 PM"
    pub fn formatted_date(&self) -> String {
        match self.submitted_at() {
            Some(at) => Self::format_date(&at.with_timezone(&Local)),
            None => "unknown date".to_string(),
        }
    }

    fn format_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
    where
        Tz::Offset: Display,
    {
        at.format("%B %-d, %Y, %I:%M %p").to_string()
    }
}
