use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Learner,
    Instructor,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Learner => "learner",
            ActorRole::Instructor => "instructor",
        }
    }

    pub fn from_db(value: &str) -> Option<ActorRole> {
        match value {
            "learner" => Some(ActorRole::Learner),
            "instructor" => Some(ActorRole::Instructor),
            _ => None,
        }
    }

    pub fn fallback_name(&self) -> &'static str {
        match self {
            ActorRole::Learner => "Student",
            ActorRole::Instructor => "Teacher",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActorProfile {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub role: ActorRole,
}

/// An event exactly as the store holds it: an id unique within its owning
/// actor's log plus an opaque payload document.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub id: String,
    pub payload: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizMode {
    Pretest,
    LevelBased,
    Thematic,
    Story,
}

impl QuizMode {
    pub fn parse(value: &str) -> Option<QuizMode> {
        match value {
            "pretest" => Some(QuizMode::Pretest),
            "level-based" => Some(QuizMode::LevelBased),
            "thematic" => Some(QuizMode::Thematic),
            "story" => Some(QuizMode::Story),
            _ => None,
        }
    }
}

/// Normalized event. Immutable once built; every payload-derived field is
/// optional because no raw event guarantees any schema beyond its id.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityRecord {
    pub id: String,
    pub actor_id: Uuid,
    pub actor_name: String,
    pub actor_role: ActorRole,
    pub timestamp: Option<DateTime<Utc>>,
    pub mode: Option<QuizMode>,
    pub action: Option<String>,
    pub accuracy_rate: Option<f64>,
    pub total_exp: Option<f64>,
    pub percentage: Option<f64>,
    pub score: Option<i64>,
    pub total_questions: Option<i64>,
    pub current_level: Option<i64>,
    pub previous_level: Option<i64>,
    pub details: Option<Value>,
    pub answers: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityGroup {
    pub label: String,
    pub records: Vec<ActivityRecord>,
}
