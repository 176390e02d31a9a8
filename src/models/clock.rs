use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One of the seven day-of-week tokens used as keys in per-day message maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayCode {
    #[serde(rename = "MON")]
    Mon,
    #[serde(rename = "TUE")]
    Tue,
    #[serde(rename = "WED")]
    Wed,
    #[serde(rename = "THU")]
    Thu,
    #[serde(rename = "FRI")]
    Fri,
    #[serde(rename = "SAT")]
    Sat,
    #[serde(rename = "SUN")]
    Sun,
}

impl DayCode {
    pub const ALL: [DayCode; 7] = [
        DayCode::Mon,
        DayCode::Tue,
        DayCode::Wed,
        DayCode::Thu,
        DayCode::Fri,
        DayCode::Sat,
        DayCode::Sun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayCode::Mon => "MON",
            DayCode::Tue => "TUE",
            DayCode::Wed => "WED",
            DayCode::Thu => "THU",
            DayCode::Fri => "FRI",
            DayCode::Sat => "SAT",
            DayCode::Sun => "SUN",
        }
    }

    pub fn from_weekday(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => DayCode::Mon,
            chrono::Weekday::Tue => DayCode::Tue,
            chrono::Weekday::Wed => DayCode::Wed,
            chrono::Weekday::Thu => DayCode::Thu,
            chrono::Weekday::Fri => DayCode::Fri,
            chrono::Weekday::Sat => DayCode::Sat,
            chrono::Weekday::Sun => DayCode::Sun,
        }
    }
}

impl std::fmt::Display for DayCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DayCode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayCode::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown day code: {s}"))
    }
}

pub type DayMessages = BTreeMap<DayCode, String>;

/// What a clock shows, resolved from a write request before any record is built.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    /// One message for every day of the week.
    Simple(String),
    /// A message per day code.
    PerDay(DayMessages),
    /// Simple mode with nothing to show.
    Empty,
}

impl MessageContent {
    pub fn mode(&self) -> &'static str {
        match self {
            MessageContent::Simple(_) => "simple",
            MessageContent::PerDay(_) => "per_day",
            MessageContent::Empty => "empty",
        }
    }
}

/// The value stored under a clock id.
///
/// `message` and `single_message` carry the same text in simple mode; older
/// displays read only `message`. In per-day mode both are empty and
/// `messages` holds the day map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(default, alias = "singleMessage", deserialize_with = "null_as_empty")]
    pub single_message: String,
    #[serde(default, alias = "messagesByDay")]
    pub messages: Option<DayMessages>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    /// Records written before timestamps were kept read back as the Unix epoch.
    #[serde(
        rename = "lastUpdated",
        default,
        serialize_with = "serialize_timestamp"
    )]
    pub last_updated: DateTime<Utc>,
}

impl ClockRecord {
    pub fn new(
        id: &str,
        content: MessageContent,
        image_url: Option<String>,
        last_updated: DateTime<Utc>,
    ) -> Self {
        let (text, messages) = match content {
            MessageContent::Simple(text) => (text, None),
            MessageContent::PerDay(map) => (String::new(), Some(map)),
            MessageContent::Empty => (String::new(), None),
        };
        Self {
            id: Some(id.to_string()),
            message: text.clone(),
            single_message: text,
            messages,
            image_url,
            last_updated,
        }
    }

    /// Whether any mode of this record carries something to display.
    pub fn has_message(&self) -> bool {
        !self.message.is_empty()
            || !self.single_message.is_empty()
            || self
                .messages
                .as_ref()
                .is_some_and(|m| m.values().any(|v| !v.is_empty()))
    }

    /// The text a display should show on `day`.
    pub fn message_for(&self, day: DayCode) -> Option<&str> {
        if let Some(map) = &self.messages {
            return map.get(&day).map(String::as_str).filter(|m| !m.is_empty());
        }
        [&self.single_message, &self.message]
            .into_iter()
            .find(|m| !m.is_empty())
            .map(String::as_str)
    }
}

/// Raw POST body. Validation happens in `ClockService`, not during parsing.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PostClockRequest {
    #[serde(default)]
    pub clock_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<serde_json::Value>,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostClockResponse {
    pub status: String,
    pub clock_id: String,
    pub message: String,
    pub messages: Option<DayMessages>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(
        rename = "lastUpdated",
        serialize_with = "serialize_timestamp"
    )]
    pub last_updated: DateTime<Utc>,
}

impl PostClockResponse {
    pub fn success(clock_id: &str, record: &ClockRecord) -> Self {
        Self {
            status: "success".into(),
            clock_id: clock_id.to_string(),
            message: record.message.clone(),
            messages: record.messages.clone(),
            image_url: record.image_url.clone(),
            last_updated: record.last_updated,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClockQuery {
    pub clock_id: Option<String>,
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}
