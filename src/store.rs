use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sqlx::{PgPool, Row};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{ActorProfile, ActorRole, RawEvent};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
}

/// The only interface the engine sees: list a population's actors and list
/// one actor's events. Ordering from `list_events` is best-effort; the feed
/// re-ranks regardless.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn list_actors(&self, population: ActorRole) -> Result<Vec<ActorProfile>, StoreError>;

    async fn list_events(
        &self,
        actor_id: Uuid,
        population: ActorRole,
    ) -> Result<Vec<RawEvent>, StoreError>;
}

pub struct PgActivityStore {
    pool: PgPool,
}

impl PgActivityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_db(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("activity_feed schema ready");
        Ok(())
    }

    /// Demo population: two named learners, one learner without a display
    /// name, and an instructor covering every action shape, plus one event
    /// with a broken timestamp to exercise the absent-timestamp path.
    pub async fn seed(&self) -> anyhow::Result<()> {
        let maya = Uuid::parse_str("7c9a1f5e-0d7b-4e54-9a36-1f2b3c4d5e6f")?;
        let leo = Uuid::parse_str("2b4d6f81-3a5c-4e7f-9b1d-8c0e2f4a6b8d")?;
        let unnamed = Uuid::parse_str("9e8d7c6b-5a49-4837-a625-14f3e2d1c0b9")?;
        let priya = Uuid::parse_str("4f3e2d1c-0b9a-4877-b665-54433221100f")?;

        let actors: Vec<(Uuid, Option<&str>, ActorRole)> = vec![
            (maya, Some("Maya Santos"), ActorRole::Learner),
            (leo, Some("Leo Tran"), ActorRole::Learner),
            (unnamed, None, ActorRole::Learner),
            (priya, Some("Priya Raman"), ActorRole::Instructor),
        ];

        for (id, display_name, role) in actors {
            sqlx::query(
                r#"
                INSERT INTO activity_feed.actors (id, display_name, role)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO UPDATE
                SET display_name = EXCLUDED.display_name, role = EXCLUDED.role
                "#,
            )
            .bind(id)
            .bind(display_name)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        }

        let now = Utc::now();
        let stamp = |hours_ago: i64| (now - Duration::hours(hours_ago)).to_rfc3339();

        let events: Vec<(Uuid, &str, Value)> = vec![
            (
                maya,
                "quiz-001",
                json!({
                    "mode": "pretest",
                    "accuracyRate": 83.4,
                    "score": 5,
                    "totalQuestions": 6,
                    "timestamp": stamp(2),
                    "answers": [
                        {"question": "Translate 'perro'", "userAnswer": "dog", "isCorrect": true},
                        {"question": "Translate 'gato'", "selectedOption": 1,
                         "options": ["bird", "cat", "fish"], "isCorrect": true},
                        {"correctAnswer": "house", "isCorrect": false},
                    ],
                }),
            ),
            (
                maya,
                "quiz-002",
                json!({
                    "mode": "level-based",
                    "totalExp": 140,
                    "currentLevel": 3,
                    "previousLevel": 2,
                    "timestamp": stamp(26),
                }),
            ),
            (
                leo,
                "quiz-001",
                json!({
                    "mode": "thematic",
                    "percentage": 58.2,
                    "score": 7,
                    "totalQuestions": 12,
                    "timestamp": stamp(5),
                }),
            ),
            (
                leo,
                "quiz-002",
                json!({
                    "mode": "story",
                    "percentage": 64.0,
                    "timestamp": (now - Duration::days(4)).timestamp_millis(),
                }),
            ),
            (
                unnamed,
                "quiz-001",
                json!({
                    "mode": "pretest",
                    "accuracyRate": 41.0,
                    "timestamp": "last tuesday, probably",
                }),
            ),
            (
                priya,
                "act-001",
                json!({
                    "action": "enroll_students",
                    "details": {"count": 5},
                    "timestamp": stamp(1),
                }),
            ),
            (
                priya,
                "act-002",
                json!({
                    "action": "create_quiz",
                    "details": {"themeName": "Animals"},
                    "timestamp": stamp(30),
                }),
            ),
            (
                priya,
                "act-003",
                json!({
                    "action": "upload_theme",
                    "details": {"name": "Household Objects", "wordCount": 24},
                    "timestamp": stamp(49),
                }),
            ),
            (
                priya,
                "act-004",
                json!({
                    "action": "assign_task",
                    "details": {"mode": "thematic", "studentCount": 3},
                    "timestamp": stamp(73),
                }),
            ),
        ];

        let mut inserted = 0usize;
        for (actor_id, id, payload) in events {
            sqlx::query(
                r#"
                INSERT INTO activity_feed.events (actor_id, id, payload)
                VALUES ($1, $2, $3)
                ON CONFLICT (actor_id, id) DO UPDATE
                SET payload = EXCLUDED.payload
                "#,
            )
            .bind(actor_id)
            .bind(id)
            .bind(payload)
            .execute(&self.pool)
            .await?;
            inserted += 1;
        }

        info!(events = inserted, "seed data inserted");
        Ok(())
    }

    /// Single-actor lookup for the detail-view command. Not part of the
    /// engine-facing trait.
    pub async fn find_actor(&self, id: Uuid) -> anyhow::Result<Option<ActorProfile>> {
        let row = sqlx::query(
            "SELECT id, display_name, role FROM activity_feed.actors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let role_text: String = row.get("role");
            let role = ActorRole::from_db(&role_text)
                .ok_or_else(|| anyhow::anyhow!("unknown actor role {role_text:?}"))?;
            Ok(ActorProfile {
                id: row.get("id"),
                display_name: row.get("display_name"),
                role,
            })
        })
        .transpose()
    }

    pub async fn find_event(
        &self,
        actor_id: Uuid,
        event_id: &str,
    ) -> anyhow::Result<Option<RawEvent>> {
        let row = sqlx::query(
            "SELECT id, payload FROM activity_feed.events WHERE actor_id = $1 AND id = $2",
        )
        .bind(actor_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| RawEvent {
            id: row.get("id"),
            payload: row.get("payload"),
        }))
    }
}

#[async_trait]
impl ActivityStore for PgActivityStore {
    async fn list_actors(&self, population: ActorRole) -> Result<Vec<ActorProfile>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, display_name FROM activity_feed.actors WHERE role = $1 ORDER BY id",
        )
        .bind(population.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| ActorProfile {
                id: row.get("id"),
                display_name: row.get("display_name"),
                role: population,
            })
            .collect())
    }

    async fn list_events(
        &self,
        actor_id: Uuid,
        population: ActorRole,
    ) -> Result<Vec<RawEvent>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.payload
            FROM activity_feed.events e
            JOIN activity_feed.actors a ON a.id = e.actor_id
            WHERE e.actor_id = $1 AND a.role = $2
            ORDER BY e.payload ->> 'timestamp' DESC NULLS LAST
            "#,
        )
        .bind(actor_id)
        .bind(population.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| RawEvent {
                id: row.get("id"),
                payload: row.get("payload"),
            })
            .collect())
    }
}
