//! Provenance payload carried by the watermark.
//!
//! Text form: `OWNER:<owner>;DATE:<ISO-8601 local date-time>;ID:<8 hex>`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Structured watermark payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkPayload {
    pub owner: String,
    pub date: String,
    pub id: String,
}

impl WatermarkPayload {
    /// Payload for `owner`, stamped with the current local time and a
    /// fresh short id.
    pub fn new(owner: impl Into<String>) -> Self {
        Self::with_timestamp(owner, Local::now().naive_local())
    }

    pub fn with_timestamp(owner: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        Self {
            owner: owner.into(),
            date: timestamp.format(DATE_FORMAT).to_string(),
            id,
        }
    }

    /// Parse extracted text. Returns `None` unless `OWNER`, `DATE` and `ID`
    /// are all present.
    pub fn parse(text: &str) -> Option<Self> {
        let mut fields = parse_fields(text);
        Some(Self {
            owner: fields.remove("OWNER")?,
            date: fields.remove("DATE")?,
            id: fields.remove("ID")?,
        })
    }

    /// The `DATE` field as a timestamp, if it is well formed.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

impl fmt::Display for WatermarkPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OWNER:{};DATE:{};ID:{}", self.owner, self.date, self.id)
    }
}

/// Split `KEY:value;KEY:value` text into a map. Each field splits on its
/// first `:` only, so values may contain colons (date-times do).
/// Fields without a `:` are skipped.
pub fn parse_fields(text: &str) -> BTreeMap<String, String> {
    text.split(';')
        .filter_map(|field| field.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .collect()
}
