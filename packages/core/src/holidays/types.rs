//! Core data types for holiday lookups and alerts

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single public holiday as reported by the holiday API.
///
/// The upstream payload carries more fields (local name, country code,
/// holiday types); only the date and the English name are kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

impl Holiday {
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
        }
    }
}

/// Raised once per upcoming holiday per scheduler tick. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertEvent {
    pub country_code: String,
    pub holiday: Holiday,
}
