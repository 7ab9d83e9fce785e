use serde::Serialize;

use crate::models::{ActivityRecord, ActorRole, QuizMode};
use crate::normalize::{i64_field, str_field};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Enrollment,
    QuizCreation,
    ContentUpload,
    Assignment,
    GenericAction,
    LevelUp,
    PretestResult,
    LevelQuizResult,
    ThematicQuizResult,
    StoryQuizResult,
    QuizResult,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Enrollment => "enrollment",
            Category::QuizCreation => "quiz-creation",
            Category::ContentUpload => "content-upload",
            Category::Assignment => "assignment",
            Category::GenericAction => "generic-action",
            Category::LevelUp => "level-up",
            Category::PretestResult => "pretest-result",
            Category::LevelQuizResult => "level-quiz-result",
            Category::ThematicQuizResult => "thematic-quiz-result",
            Category::StoryQuizResult => "story-quiz-result",
            Category::QuizResult => "quiz-result",
        }
    }
}

/// Emphasis tone for the `**…**` span inside the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Neutral,
    Attention,
}

/// Derived display metadata for one record. Never persisted; recomputing is
/// idempotent and side-effect free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: Category,
    pub color_class: &'static str,
    pub icon_key: &'static str,
    pub description: String,
    pub tone: Tone,
    pub metric: Option<u32>,
}

/// Pure, total decision function. Precedence: instructor action keywords,
/// then learner level-up, then quiz completion by mode. Every input lands in
/// exactly one category.
pub fn classify(record: &ActivityRecord) -> Classification {
    if record.actor_role == ActorRole::Instructor {
        return classify_instructor(record);
    }

    let current = record.current_level.unwrap_or(0);
    let previous = record.previous_level.unwrap_or(0);
    if current > previous {
        // Level-up outranks any score the same record may carry.
        return build(
            Category::LevelUp,
            format!("leveled up to **Level {current}**"),
            Tone::Positive,
            None,
        );
    }

    classify_quiz(record)
}

fn classify_instructor(record: &ActivityRecord) -> Classification {
    let action = record
        .action
        .as_deref()
        .unwrap_or("")
        .to_ascii_lowercase();

    if action.contains("enroll") {
        let count = detail_i64(record, "count").unwrap_or(1);
        return build(
            Category::Enrollment,
            format!("enrolled **{count} {}**", plural_students(count)),
            Tone::Neutral,
            Some(u32::try_from(count.max(0)).unwrap_or(u32::MAX)),
        );
    }

    if action.contains("quiz") || action.contains("test") {
        let description = match detail_str(record, "themeName") {
            Some(theme) => format!("created a quiz on **{theme}**"),
            None => "created **a new quiz**".to_string(),
        };
        return build(Category::QuizCreation, description, Tone::Neutral, None);
    }

    if action.contains("theme") {
        let description = match detail_str(record, "name") {
            Some(name) => format!("uploaded the theme **{name}**"),
            None => "uploaded **a theme**".to_string(),
        };
        return build(Category::ContentUpload, description, Tone::Neutral, None);
    }

    if action.contains("assign") {
        let mode_name = match detail_str(record, "mode").as_deref() {
            Some("thematic") => "Thematic Learning",
            Some("level-based") => "Level-Based Learning",
            _ => "Story Mode",
        };
        let count = detail_i64(record, "studentCount").unwrap_or(1);
        return build(
            Category::Assignment,
            format!(
                "assigned a **{mode_name}** task to **{count} {}**",
                plural_students(count)
            ),
            Tone::Neutral,
            None,
        );
    }

    build(
        Category::GenericAction,
        "performed an action".to_string(),
        Tone::Neutral,
        None,
    )
}

fn classify_quiz(record: &ActivityRecord) -> Classification {
    let category = quiz_category(record.mode);
    let mode_name = mode_display_name(record.mode);

    match resolve_metric(record) {
        Some(metric) => build(
            category,
            format!("completed {mode_name} with **{metric}% score**"),
            metric_tone(metric),
            Some(metric),
        ),
        None => build(category, format!("completed {mode_name}"), Tone::Neutral, None),
    }
}

/// Metric source depends on mode: pretest reads the accuracy rate,
/// level-based reads experience capped at 100, everything else (including
/// absent mode) reads the plain percentage. Shared with the detail view.
pub fn resolve_metric(record: &ActivityRecord) -> Option<u32> {
    match record.mode {
        Some(QuizMode::Pretest) => record.accuracy_rate.map(round_metric),
        Some(QuizMode::LevelBased) => record.total_exp.map(|exp| round_metric(exp).min(100)),
        _ => record.percentage.map(round_metric),
    }
}

pub fn mode_display_name(mode: Option<QuizMode>) -> &'static str {
    match mode {
        Some(QuizMode::Pretest) => "Pretest",
        Some(QuizMode::LevelBased) => "Level-Based Learning Quiz",
        Some(QuizMode::Thematic) => "Thematic Learning Quiz",
        Some(QuizMode::Story) => "Story Mode Quiz",
        None => "a quiz",
    }
}

fn quiz_category(mode: Option<QuizMode>) -> Category {
    match mode {
        Some(QuizMode::Pretest) => Category::PretestResult,
        Some(QuizMode::LevelBased) => Category::LevelQuizResult,
        Some(QuizMode::Thematic) => Category::ThematicQuizResult,
        Some(QuizMode::Story) => Category::StoryQuizResult,
        None => Category::QuizResult,
    }
}

fn metric_tone(metric: u32) -> Tone {
    if metric >= 80 {
        Tone::Positive
    } else if metric >= 60 {
        Tone::Neutral
    } else {
        Tone::Attention
    }
}

fn round_metric(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

fn plural_students(count: i64) -> &'static str {
    if count == 1 {
        "student"
    } else {
        "students"
    }
}

fn detail_str(record: &ActivityRecord, key: &str) -> Option<String> {
    record.details.as_ref().and_then(|d| str_field(d, key))
}

fn detail_i64(record: &ActivityRecord, key: &str) -> Option<i64> {
    record.details.as_ref().and_then(|d| i64_field(d, key))
}

fn build(
    category: Category,
    description: String,
    tone: Tone,
    metric: Option<u32>,
) -> Classification {
    let (color_class, icon_key) = palette(category);
    Classification {
        category,
        color_class,
        icon_key,
        description,
        tone,
        metric,
    }
}

fn palette(category: Category) -> (&'static str, &'static str) {
    match category {
        Category::Enrollment => ("text-blue-600", "user-plus"),
        Category::QuizCreation => ("text-purple-600", "file-plus"),
        Category::ContentUpload => ("text-teal-600", "upload"),
        Category::Assignment => ("text-indigo-600", "clipboard-list"),
        Category::GenericAction => ("text-gray-500", "activity"),
        Category::LevelUp => ("text-amber-500", "trending-up"),
        Category::PretestResult => ("text-cyan-600", "clipboard-check"),
        Category::LevelQuizResult => ("text-green-600", "bar-chart"),
        Category::ThematicQuizResult => ("text-pink-600", "book-open"),
        Category::StoryQuizResult => ("text-orange-600", "book"),
        Category::QuizResult => ("text-slate-600", "check-circle"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActorProfile, RawEvent};
    use crate::normalize::normalize;
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn record(role: ActorRole, payload: Value) -> ActivityRecord {
        let actor = ActorProfile {
            id: Uuid::new_v4(),
            display_name: Some("Sam Reyes".to_string()),
            role,
        };
        normalize(
            &RawEvent {
                id: "evt-1".to_string(),
                payload,
            },
            &actor,
        )
    }

    #[test]
    fn pretest_with_accuracy_is_positive() {
        let class = classify(&record(
            ActorRole::Learner,
            json!({"mode": "pretest", "accuracyRate": 83.4}),
        ));
        assert_eq!(class.category, Category::PretestResult);
        assert_eq!(class.metric, Some(83));
        assert_eq!(class.tone, Tone::Positive);
        assert!(class.description.contains("Pretest"));
        assert!(class.description.contains("83% score"));
    }

    #[test]
    fn enrollment_counts_students() {
        let class = classify(&record(
            ActorRole::Instructor,
            json!({"action": "enroll_students", "details": {"count": 5}}),
        ));
        assert_eq!(class.category, Category::Enrollment);
        assert_eq!(class.description, "enrolled **5 students**");
        assert_eq!(class.metric, Some(5));
    }

    #[test]
    fn enrollment_metric_saturates_on_malformed_counts() {
        let huge = classify(&record(
            ActorRole::Instructor,
            json!({"action": "enroll", "details": {"count": 10_000_000_000i64}}),
        ));
        assert_eq!(huge.metric, Some(u32::MAX));

        let negative = classify(&record(
            ActorRole::Instructor,
            json!({"action": "enroll", "details": {"count": -3}}),
        ));
        assert_eq!(negative.metric, Some(0));
    }

    #[test]
    fn enrollment_defaults_to_one_student() {
        let class = classify(&record(ActorRole::Instructor, json!({"action": "enroll"})));
        assert_eq!(class.description, "enrolled **1 student**");
        assert_eq!(class.metric, Some(1));
    }

    #[test]
    fn level_up_outranks_score() {
        let class = classify(&record(
            ActorRole::Learner,
            json!({"currentLevel": 4, "previousLevel": 2, "mode": "level-based", "totalExp": 90}),
        ));
        assert_eq!(class.category, Category::LevelUp);
        assert_eq!(class.description, "leveled up to **Level 4**");
        assert_eq!(class.metric, None);
        assert_eq!(class.tone, Tone::Positive);
    }

    #[test]
    fn previous_level_defaults_to_zero() {
        let class = classify(&record(ActorRole::Learner, json!({"currentLevel": 1})));
        assert_eq!(class.category, Category::LevelUp);
        assert_eq!(class.description, "leveled up to **Level 1**");
    }

    #[test]
    fn quiz_creation_references_theme_name() {
        let with_theme = classify(&record(
            ActorRole::Instructor,
            json!({"action": "create_quiz", "details": {"themeName": "Animals"}}),
        ));
        assert_eq!(with_theme.category, Category::QuizCreation);
        assert_eq!(with_theme.description, "created a quiz on **Animals**");

        let bare = classify(&record(ActorRole::Instructor, json!({"action": "generate_test"})));
        assert_eq!(bare.category, Category::QuizCreation);
        assert_eq!(bare.description, "created **a new quiz**");
    }

    #[test]
    fn theme_upload_references_name() {
        let class = classify(&record(
            ActorRole::Instructor,
            json!({"action": "upload_theme", "details": {"name": "Food"}}),
        ));
        assert_eq!(class.category, Category::ContentUpload);
        assert_eq!(class.description, "uploaded the theme **Food**");

        let bare = classify(&record(ActorRole::Instructor, json!({"action": "theme_edit"})));
        assert_eq!(bare.description, "uploaded **a theme**");
    }

    #[test]
    fn assignment_resolves_mode_and_count() {
        let class = classify(&record(
            ActorRole::Instructor,
            json!({"action": "assign_task", "details": {"mode": "thematic", "studentCount": 3}}),
        ));
        assert_eq!(class.category, Category::Assignment);
        assert_eq!(
            class.description,
            "assigned a **Thematic Learning** task to **3 students**"
        );

        let level = classify(&record(
            ActorRole::Instructor,
            json!({"action": "assign", "details": {"mode": "level-based"}}),
        ));
        assert!(level.description.contains("Level-Based Learning"));
        assert!(level.description.contains("1 student**"));

        let story = classify(&record(ActorRole::Instructor, json!({"action": "assign"})));
        assert!(story.description.contains("Story Mode"));
    }

    #[test]
    fn unrecognized_instructor_action_is_generic() {
        let class = classify(&record(ActorRole::Instructor, json!({"action": "logged_in"})));
        assert_eq!(class.category, Category::GenericAction);
        assert_eq!(class.description, "performed an action");

        let missing = classify(&record(ActorRole::Instructor, json!({})));
        assert_eq!(missing.category, Category::GenericAction);
    }

    #[test]
    fn metric_resolution_by_mode() {
        let level = classify(&record(
            ActorRole::Learner,
            json!({"mode": "level-based", "totalExp": 140}),
        ));
        assert_eq!(level.metric, Some(100), "experience caps at 100");

        let thematic = classify(&record(
            ActorRole::Learner,
            json!({"mode": "thematic", "percentage": 58.2}),
        ));
        assert_eq!(thematic.metric, Some(58));
        assert_eq!(thematic.tone, Tone::Attention);

        let modeless = classify(&record(ActorRole::Learner, json!({"percentage": 72.0})));
        assert_eq!(modeless.category, Category::QuizResult);
        assert_eq!(modeless.metric, Some(72));
        assert!(modeless.description.contains("a quiz"));
    }

    #[test]
    fn missing_metric_drops_score_phrase() {
        let class = classify(&record(ActorRole::Learner, json!({"mode": "pretest"})));
        assert_eq!(class.metric, None);
        assert_eq!(class.description, "completed Pretest");
        assert_eq!(class.tone, Tone::Neutral);
    }

    #[test]
    fn tone_bands_at_eighty_and_sixty() {
        let tone_of = |pct: f64| {
            classify(&record(ActorRole::Learner, json!({"percentage": pct}))).tone
        };
        assert_eq!(tone_of(80.0), Tone::Positive);
        assert_eq!(tone_of(79.0), Tone::Neutral);
        assert_eq!(tone_of(60.0), Tone::Neutral);
        assert_eq!(tone_of(59.0), Tone::Attention);
    }

    #[test]
    fn classify_is_idempotent() {
        let rec = record(
            ActorRole::Learner,
            json!({"mode": "pretest", "accuracyRate": 83.4}),
        );
        assert_eq!(classify(&rec), classify(&rec));
    }
}
