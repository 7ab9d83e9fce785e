use serde::Serialize;
use serde_json::Value;

use crate::classify::resolve_metric;
use crate::models::{ActivityRecord, ActorRole, QuizMode};
use crate::normalize::{i64_field, str_field};

/// Supplemental panels for an expanded record view. More than one may apply
/// to the same record; projection never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum DetailPanel {
    Score {
        metric: Option<u32>,
        breakdown: ScoreBreakdown,
    },
    Level {
        current_level: i64,
        leveled_up: bool,
    },
    InstructorAction {
        details: Value,
    },
    Questions {
        answers: Vec<AnswerReview>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreBreakdown {
    /// Raw fraction for pretest and percentage-style quizzes. Either side
    /// renders "?" when the payload lacks it.
    Fraction { score: String, total: String },
    /// Level-based quizzes report experience instead of a fraction.
    Experience { total_exp: Option<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerReview {
    pub question: String,
    pub given: String,
    pub correct: bool,
    /// Only populated for incorrect answers.
    pub correct_answer: Option<String>,
}

pub fn project(record: &ActivityRecord) -> Vec<DetailPanel> {
    let mut panels = Vec::new();

    let scored_mode = matches!(
        record.mode,
        Some(QuizMode::Pretest) | Some(QuizMode::LevelBased)
    );
    if scored_mode || record.percentage.is_some() {
        let breakdown = if record.mode == Some(QuizMode::LevelBased) {
            ScoreBreakdown::Experience {
                total_exp: record.total_exp,
            }
        } else {
            ScoreBreakdown::Fraction {
                score: fraction_side(record.score),
                total: fraction_side(record.total_questions),
            }
        };
        panels.push(DetailPanel::Score {
            metric: resolve_metric(record),
            breakdown,
        });
    }

    if let Some(current_level) = record.current_level {
        panels.push(DetailPanel::Level {
            current_level,
            leveled_up: current_level > record.previous_level.unwrap_or(0),
        });
    }

    if record.actor_role == ActorRole::Instructor {
        if let Some(details) = &record.details {
            panels.push(DetailPanel::InstructorAction {
                details: details.clone(),
            });
        }
    }

    if let Some(answers) = &record.answers {
        panels.push(DetailPanel::Questions {
            answers: answers
                .iter()
                .enumerate()
                .map(|(index, answer)| review_answer(index, answer))
                .collect(),
        });
    }

    panels
}

fn review_answer(index: usize, answer: &Value) -> AnswerReview {
    let question = str_field(answer, "question")
        .unwrap_or_else(|| format!("Question {}", index + 1));

    let given = str_field(answer, "userAnswer")
        .or_else(|| selected_option(answer))
        .unwrap_or_else(|| "No answer provided".to_string());

    let correct = answer
        .get("isCorrect")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let correct_answer = if correct {
        None
    } else {
        str_field(answer, "correctAnswer")
    };

    AnswerReview {
        question,
        given,
        correct,
        correct_answer,
    }
}

fn selected_option(answer: &Value) -> Option<String> {
    let index = i64_field(answer, "selectedOption")?;
    let options = answer.get("options")?.as_array()?;
    options
        .get(usize::try_from(index).ok()?)?
        .as_str()
        .map(str::to_string)
}

fn fraction_side(value: Option<i64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "?".to_string(),
    }
}
