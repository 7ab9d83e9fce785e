use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{ActivityRecord, ActorProfile, QuizMode, RawEvent};

/// Builds the uniform record for one raw event. Payload fields are carried
/// through as-is; only the timestamp is decoded, and a missing or unparsable
/// timestamp stays absent rather than being replaced with "now" or epoch.
pub fn normalize(event: &RawEvent, actor: &ActorProfile) -> ActivityRecord {
    let payload = &event.payload;
    ActivityRecord {
        id: event.id.clone(),
        actor_id: actor.id,
        actor_name: display_name(actor),
        actor_role: actor.role,
        timestamp: parse_timestamp(payload.get("timestamp")),
        mode: str_field(payload, "mode")
            .as_deref()
            .and_then(QuizMode::parse),
        action: str_field(payload, "action"),
        accuracy_rate: f64_field(payload, "accuracyRate"),
        total_exp: f64_field(payload, "totalExp"),
        percentage: f64_field(payload, "percentage"),
        score: i64_field(payload, "score"),
        total_questions: i64_field(payload, "totalQuestions"),
        current_level: i64_field(payload, "currentLevel"),
        previous_level: i64_field(payload, "previousLevel"),
        details: payload.get("details").filter(|v| v.is_object()).cloned(),
        answers: payload.get("answers").and_then(Value::as_array).cloned(),
    }
}

fn display_name(actor: &ActorProfile) -> String {
    match actor.display_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => actor.role.fallback_name().to_string(),
    }
}

/// Accepts the two temporal encodings seeds and imports produce: an RFC 3339
/// string or integer epoch milliseconds. Anything else is absent.
pub fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(number) => number.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

pub fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

pub fn f64_field(value: &Value, key: &str) -> Option<f64> {
    value.get(key)?.as_f64()
}

pub fn i64_field(value: &Value, key: &str) -> Option<i64> {
    let field = value.get(key)?;
    field.as_i64().or_else(|| field.as_f64().map(|f| f as i64))
}
