// src/skills/actions.rs
//! Short, concrete learning suggestions for the top skill gaps.

use crate::skills::scoring::display_skill;
use crate::skills::vector::{count_bounded, normalize_token};

pub const MAX_FIX_ACTIONS: usize = 3;

/// First rule whose keyword appears in the gap token wins.
const RULES: &[(&[&str], &str)] = &[
    (
        &["aws", "cloud", "azure", "gcp", "s3"],
        "Learn cloud fundamentals: S3, IAM and compute basics (2h) - free AWS Cloud Practitioner material",
    ),
    (
        &["python"],
        "Complete Python fundamentals (4h) - the official Python tutorial",
    ),
    (
        &["sql", "postgres", "mysql"],
        "Practice SQL queries: joins and aggregations (3h) - SQLBolt interactive lessons",
    ),
    (
        &["react", "frontend", "javascript", "typescript"],
        "Build a small React app (5h) - the official React tutorial",
    ),
    (
        &["docker", "kubernetes", "container"],
        "Learn containerization basics (3h) - Docker getting-started guide",
    ),
    (
        &["data", "analyst", "pandas"],
        "Learn data analysis with pandas (4h) - pandas getting-started tutorials",
    ),
    (
        &["spark", "kafka", "airflow", "etl"],
        "Build a toy data pipeline (4h) - Airflow or Kafka quickstart",
    ),
    (
        &["terraform", "jenkins", "ci/cd", "github actions"],
        "Automate a deploy pipeline (3h) - GitHub Actions quickstart",
    ),
];

/// At most three distinct suggestions, in gap order.
///
/// Gaps may be bare tokens or display strings ("React: required, ...").
/// A gap the resume text already mentions gets a "surface it" suggestion
/// instead of a course.
pub fn generate_fix_actions<S: AsRef<str>>(gaps: &[S], raw_text: &str) -> Vec<String> {
    let raw = raw_text.to_lowercase();
    let mut out: Vec<String> = Vec::new();
    for gap in gaps {
        if out.len() >= MAX_FIX_ACTIONS {
            break;
        }
        let token = gap_token(gap.as_ref());
        if token.is_empty() {
            continue;
        }
        let action = if count_bounded(&raw, &token) > 0 {
            format!(
                "Surface your existing {} experience on your resume (30m)",
                display_skill(&token)
            )
        } else {
            RULES
                .iter()
                .find(|(keys, _)| keys.iter().any(|k| token.contains(k)))
                .map(|(_, a)| a.to_string())
                .unwrap_or_else(|| {
                    format!("Learn {} basics (3h) - an introductory online course", display_skill(&token))
                })
        };
        if !out.contains(&action) {
            out.push(action);
        }
    }
    out
}

fn gap_token(gap: &str) -> String {
    let head = gap.split(':').next().unwrap_or_default();
    normalize_token(head)
}
