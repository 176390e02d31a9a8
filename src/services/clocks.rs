use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db::{KvStore, StoreError},
    models::clock::{
        ClockRecord, DayCode, DayMessages, MessageContent, PostClockRequest, PostClockResponse,
    },
    services::metrics::{CLOCK_READS, CLOCK_REJECTIONS, CLOCK_WRITES},
};

#[derive(Error, Debug)]
pub enum ClockError {
    #[error("Missing clock_id query parameter")]
    MissingQueryId,

    #[error("Request body must include \"clock_id\"")]
    MissingClockId,

    #[error("Request body must include \"single_message\", \"message\" or \"messages\"")]
    MissingMessage,

    #[error("\"messages\" must be an object keyed by day code")]
    MessagesNotObject,

    #[error("Invalid day code in \"messages\": {0} (expected one of MON, TUE, WED, THU, FRI, SAT, SUN)")]
    InvalidDayCode(String),

    #[error("Message for {0} must be a string")]
    InvalidDayMessage(DayCode),

    #[error("Invalid JSON in request body")]
    InvalidJson,

    #[error("Message not found for this clock_id")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ClockError {
    pub fn status(&self) -> StatusCode {
        match self {
            ClockError::NotFound => StatusCode::NOT_FOUND,
            ClockError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Metric label for rejected requests.
    pub fn reason(&self) -> &'static str {
        match self {
            ClockError::MissingQueryId | ClockError::MissingClockId => "missing_clock_id",
            ClockError::MissingMessage => "missing_message",
            ClockError::MessagesNotObject
            | ClockError::InvalidDayCode(_)
            | ClockError::InvalidDayMessage(_) => "invalid_messages",
            ClockError::InvalidJson => "invalid_json",
            ClockError::NotFound => "not_found",
            ClockError::Store(_) => "store",
        }
    }
}

impl IntoResponse for ClockError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ClockError::Store(e) => {
                tracing::error!(error = %e, "Clock store failure");
                "Internal storage error".to_string()
            }
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}

/// A POST body that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockWrite {
    pub clock_id: String,
    pub content: MessageContent,
    pub image_url: Option<String>,
}

pub struct ClockService;

impl ClockService {
    /// The stored JSON under `clock_id`, returned as written.
    ///
    /// Older records with a different shape pass through unchanged; the
    /// value only has to be valid JSON.
    pub async fn fetch(
        store: &dyn KvStore,
        prefix: &str,
        clock_id: Option<&str>,
    ) -> Result<serde_json::Value, ClockError> {
        let clock_id = clock_id
            .filter(|id| !id.is_empty())
            .ok_or(ClockError::MissingQueryId)?;
        let key = store_key(prefix, clock_id);

        let raw = match store.get(&key).await {
            Ok(raw) => raw,
            Err(e) => {
                CLOCK_READS.with_label_values(&["error"]).inc();
                return Err(e.into());
            }
        };
        let Some(raw) = raw else {
            CLOCK_READS.with_label_values(&["not_found"]).inc();
            return Err(ClockError::NotFound);
        };

        let record = serde_json::from_str::<serde_json::Value>(&raw).map_err(|e| {
            CLOCK_READS.with_label_values(&["error"]).inc();
            StoreError::Corrupt {
                key: key.clone(),
                reason: e.to_string(),
            }
        })?;
        CLOCK_READS.with_label_values(&["found"]).inc();
        Ok(record)
    }

    /// Validate `body` and overwrite the record under its clock id.
    ///
    /// Nothing is written unless the whole body is valid. The previous
    /// record, if any, is replaced without being read.
    pub async fn save(
        store: &dyn KvStore,
        prefix: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<PostClockResponse, ClockError> {
        let write = parse_write(body).inspect_err(|e| {
            CLOCK_REJECTIONS.with_label_values(&[e.reason()]).inc();
            tracing::warn!(reason = %e, "Rejected clock write");
        })?;

        let mode = write.content.mode();
        let record = ClockRecord::new(&write.clock_id, write.content, write.image_url, now);
        let value = serde_json::to_string(&record).map_err(|e| StoreError::Operation(e.to_string()))?;

        store.put(&store_key(prefix, &write.clock_id), value).await?;
        CLOCK_WRITES.with_label_values(&[mode]).inc();
        tracing::info!(clock_id = %write.clock_id, mode, "Clock message stored");

        Ok(PostClockResponse::success(&write.clock_id, &record))
    }
}

pub fn store_key(prefix: &str, clock_id: &str) -> String {
    format!("{prefix}{clock_id}")
}

/// Resolve a raw POST body into exactly one kind of content.
///
/// Checks run in order: body parses, `clock_id` is present, some message
/// field is present, the day map (when it decides the content) is an
/// object keyed only by valid day codes.
pub fn parse_write(body: &[u8]) -> Result<ClockWrite, ClockError> {
    let req: PostClockRequest = serde_json::from_slice(body).map_err(|_| ClockError::InvalidJson)?;

    let clock_id = req
        .clock_id
        .filter(|id| !id.is_empty())
        .ok_or(ClockError::MissingClockId)?;

    // An empty field still counts as present; the first non-empty one is the text.
    let single_present = req.single_message.is_some() || req.message.is_some();
    let single = req
        .single_message
        .filter(|s| !s.is_empty())
        .or(req.message.filter(|s| !s.is_empty()));
    let day_map = req.messages.filter(|m| !m.is_null());

    let content = match (single, day_map) {
        (Some(text), _) => MessageContent::Simple(text),
        (None, Some(map)) => MessageContent::PerDay(parse_day_messages(map)?),
        (None, None) if single_present => MessageContent::Empty,
        (None, None) => return Err(ClockError::MissingMessage),
    };

    Ok(ClockWrite {
        clock_id,
        content,
        image_url: req.image_url.filter(|u| !u.is_empty()),
    })
}

fn parse_day_messages(value: serde_json::Value) -> Result<DayMessages, ClockError> {
    let serde_json::Value::Object(entries) = value else {
        return Err(ClockError::MessagesNotObject);
    };

    let mut messages = DayMessages::new();
    for (key, text) in entries {
        let day: DayCode = key
            .parse()
            .map_err(|_| ClockError::InvalidDayCode(key.clone()))?;
        let text = match text {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            _ => return Err(ClockError::InvalidDayMessage(day)),
        };
        messages.insert(day, text);
    }
    Ok(messages)
}
