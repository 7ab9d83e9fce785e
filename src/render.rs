use std::fmt::Write;

use serde_json::{json, Value};

use crate::classify::{classify, Tone};
use crate::detail::{self, DetailPanel, ScoreBreakdown};
use crate::models::{ActivityGroup, ActivityRecord};

pub fn render_feed(groups: &[ActivityGroup]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Recent Activity");

    if groups.is_empty() {
        let _ = writeln!(output, "No recent activity.");
        return output;
    }

    for group in groups {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", group.label);
        for record in &group.records {
            let class = classify(record);
            let _ = writeln!(
                output,
                "- {} {} [{}{}]",
                record.actor_name,
                class.description,
                class.category.as_str(),
                tone_suffix(class.tone),
            );
        }
    }

    output
}

fn tone_suffix(tone: Tone) -> &'static str {
    match tone {
        Tone::Positive => ", positive",
        Tone::Neutral => "",
        Tone::Attention => ", attention",
    }
}

pub fn render_detail(record: &ActivityRecord) -> String {
    let class = classify(record);
    let mut output = String::new();

    let _ = writeln!(output, "# Event {}", record.id);
    let _ = writeln!(
        output,
        "Actor: {} ({})",
        record.actor_name,
        record.actor_role.as_str()
    );
    let when = match record.timestamp {
        Some(ts) => ts.format("%b %-d, %Y %H:%M UTC").to_string(),
        None => "unknown".to_string(),
    };
    let _ = writeln!(output, "When: {when}");
    let _ = writeln!(
        output,
        "Category: {} (icon {}, {})",
        class.category.as_str(),
        class.icon_key,
        class.color_class
    );
    let _ = writeln!(output, "Summary: {} {}", record.actor_name, class.description);

    for panel in detail::project(record) {
        let _ = writeln!(output);
        match panel {
            DetailPanel::Score { metric, breakdown } => {
                let _ = writeln!(output, "## Score");
                match metric {
                    Some(value) => {
                        let _ = writeln!(output, "Metric: {value}%");
                    }
                    None => {
                        let _ = writeln!(output, "Metric: none");
                    }
                }
                match breakdown {
                    ScoreBreakdown::Fraction { score, total } => {
                        let _ = writeln!(output, "Raw: {score} / {total}");
                    }
                    ScoreBreakdown::Experience { total_exp } => match total_exp {
                        Some(exp) => {
                            let _ = writeln!(output, "Experience: {exp} EXP");
                        }
                        None => {
                            let _ = writeln!(output, "Experience: not recorded");
                        }
                    },
                }
            }
            DetailPanel::Level {
                current_level,
                leveled_up,
            } => {
                let _ = writeln!(output, "## Level");
                if leveled_up {
                    let _ = writeln!(output, "Level {current_level} (leveled up)");
                } else {
                    let _ = writeln!(output, "Level {current_level}");
                }
            }
            DetailPanel::InstructorAction { details } => {
                let _ = writeln!(output, "## Action Details");
                let pretty = serde_json::to_string_pretty(&details)
                    .unwrap_or_else(|_| details.to_string());
                let _ = writeln!(output, "{pretty}");
            }
            DetailPanel::Questions { answers } => {
                let _ = writeln!(output, "## Questions");
                for answer in answers {
                    let verdict = if answer.correct { "correct" } else { "incorrect" };
                    let mut line = format!(
                        "- {}: answered \"{}\" ({verdict})",
                        answer.question, answer.given
                    );
                    if let Some(expected) = answer.correct_answer {
                        line.push_str(&format!(", expected \"{expected}\""));
                    }
                    let _ = writeln!(output, "{line}");
                }
            }
        }
    }

    output
}

/// JSON projection of the grouped feed with per-record classification
/// attached, for callers that post-process rather than read the text form.
pub fn feed_json(groups: &[ActivityGroup]) -> Value {
    let rendered: Vec<Value> = groups
        .iter()
        .map(|group| {
            json!({
                "label": group.label,
                "records": group
                    .records
                    .iter()
                    .map(|record| json!({
                        "record": record,
                        "classification": classify(record),
                    }))
                    .collect::<Vec<Value>>(),
            })
        })
        .collect();
    json!(rendered)
}
