// src/skills/scoring.rs
//! Match score of a candidate against one job's requirement vector.
//!
//! score = clamp(50 + Σ deltas, 0, 100). Each requirement token either
//! matches (tier bonus by candidate weight, plus exact-tool and raw-text
//! bonuses) or counts as a gap (−8 required, −4 preferred).

use serde::Serialize;

use crate::skills::vector::SkillVector;

pub const NEUTRAL_BASELINE: i32 = 50;

pub const CORE_MATCH_BONUS: i32 = 10;
pub const ADJACENT_MATCH_BONUS: i32 = 5;
pub const ADVANCED_MATCH_BONUS: i32 = 3;
pub const WEAK_MATCH_BONUS: i32 = 2;
pub const EXACT_TOOL_BONUS: i32 = 5;
pub const RAW_TEXT_BONUS: i32 = 2;

pub const REQUIRED_GAP_PENALTY: i32 = 8;
pub const PREFERRED_GAP_PENALTY: i32 = 4;

pub const MAX_WHY_FIT: usize = 5;
pub const MAX_GAPS: usize = 3;

/// Shown when nothing matched.
pub const GENERIC_WHY_FIT: &str = "Relevant role match";

/// Tools specific enough that naming them is a strong signal.
pub const EXACT_TOOLS: &[&str] = &[
    "fastapi",
    "redshift",
    "snowflake",
    "bigquery",
    "airflow",
    "kafka",
    "terraform",
    "kubernetes",
];

// Weights are sums of 0.1/0.2 steps, so compare with a little slack.
const EPS: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    pub score: u8,
    pub why_fit: Vec<String>,
    pub gaps: Vec<String>,
    /// Normalized tokens behind `gaps`, same order (input for fix actions).
    #[serde(skip)]
    pub gap_skills: Vec<String>,
}

struct Entry {
    impact: i32,
    text: String,
    token: String,
}

/// Pure: identical inputs give identical outcomes.
pub fn score(
    candidate: &SkillVector,
    requirement: &SkillVector,
    raw_candidate_text: &str,
) -> MatchOutcome {
    let raw = raw_candidate_text.to_lowercase();
    let mut total = NEUTRAL_BASELINE;
    let mut fits: Vec<Entry> = Vec::new();
    let mut gaps: Vec<Entry> = Vec::new();

    for (token, req_weight) in requirement.iter() {
        if token.is_empty() {
            continue;
        }
        match best_match(candidate, token) {
            Some(cand_weight) => {
                let (tier, label) = tier_bonus(cand_weight);
                let mut delta = tier;
                let exact = EXACT_TOOLS.contains(&token);
                if exact {
                    delta += EXACT_TOOL_BONUS;
                }
                if raw.contains(token) {
                    delta += RAW_TEXT_BONUS;
                }
                total += delta;
                let text = if exact {
                    format!("{}: {label}, exact tool match", display_skill(token))
                } else {
                    format!("{}: {label}", display_skill(token))
                };
                fits.push(Entry {
                    impact: delta,
                    text,
                    token: token.to_string(),
                });
            }
            None => {
                let required = req_weight + EPS >= 1.0;
                let penalty = if required {
                    REQUIRED_GAP_PENALTY
                } else {
                    PREFERRED_GAP_PENALTY
                };
                total -= penalty;
                let kind = if required { "required" } else { "preferred" };
                gaps.push(Entry {
                    impact: penalty,
                    text: format!("{}: {kind}, not on resume", display_skill(token)),
                    token: token.to_string(),
                });
            }
        }
    }

    // Stable: ties keep requirement-token order.
    fits.sort_by(|a, b| b.impact.cmp(&a.impact));
    gaps.sort_by(|a, b| b.impact.cmp(&a.impact));
    fits.truncate(MAX_WHY_FIT);
    gaps.truncate(MAX_GAPS);

    let why_fit = if fits.is_empty() {
        vec![GENERIC_WHY_FIT.to_string()]
    } else {
        fits.into_iter().map(|e| e.text).collect()
    };

    MatchOutcome {
        score: total.clamp(0, 100) as u8,
        why_fit,
        gap_skills: gaps.iter().map(|e| e.token.clone()).collect(),
        gaps: gaps.into_iter().map(|e| e.text).collect(),
    }
}

/// Exact token first; otherwise the heaviest candidate token that contains
/// or is contained in `token` (ties go to the lexicographically first).
fn best_match(candidate: &SkillVector, token: &str) -> Option<f64> {
    if let Some(w) = candidate.get(token) {
        return Some(w);
    }
    let mut best: Option<f64> = None;
    for (c, w) in candidate.iter() {
        if c.is_empty() {
            continue;
        }
        if (c.contains(token) || token.contains(c)) && best.map_or(true, |b| w > b) {
            best = Some(w);
        }
    }
    best
}

fn tier_bonus(weight: f64) -> (i32, &'static str) {
    if weight + EPS >= 1.0 {
        (CORE_MATCH_BONUS, "core skill")
    } else if weight + EPS >= 0.7 {
        (ADJACENT_MATCH_BONUS, "adjacent skill")
    } else if weight + EPS >= 0.5 {
        (ADVANCED_MATCH_BONUS, "advanced skill")
    } else {
        (WEAK_MATCH_BONUS, "mentioned")
    }
}

/// "node.js" → "Node.js", "rest api" → "Rest Api".
pub fn display_skill(token: &str) -> String {
    token
        .split(' ')
        .map(|w| {
            let mut cs = w.chars();
            match cs.next() {
                Some(first) => first.to_uppercase().chain(cs).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(pairs: &[(&str, f64)]) -> SkillVector {
        pairs.iter().map(|(k, w)| (*k, *w)).collect()
    }

    #[test]
    fn two_matches_one_gap() {
        let cand = vector(&[("python", 1.0), ("sql", 1.0)]);
        let req = vector(&[("python", 1.0), ("sql", 1.0), ("react", 1.0)]);
        let out = score(&cand, &req, "");
        assert_eq!(out.score, 62);
        assert_eq!(out.why_fit.len(), 2);
        assert_eq!(out.gaps, vec!["React: required, not on resume".to_string()]);
        assert_eq!(out.gap_skills, vec!["react".to_string()]);
    }

    #[test]
    fn full_match_clamps_at_100() {
        let toks = ["python", "sql", "react", "docker", "aws", "java"];
        let cand = vector(&toks.map(|t| (t, 1.0)));
        for n in 1..=toks.len() {
            let req = vector(&toks[..n].iter().map(|t| (*t, 1.0)).collect::<Vec<_>>());
            let out = score(&cand, &req, "");
            assert_eq!(out.score as i32, (50 + 10 * n as i32).min(100), "n={n}");
            assert!(out.gaps.is_empty());
        }
    }

    #[test]
    fn bands_bonuses_and_raw_text() {
        let cand = vector(&[("kafka", 0.7), ("docker", 0.5), ("linux", 0.3)]);
        let req = vector(&[("kafka", 0.6), ("docker", 0.6), ("linux", 0.6)]);
        // kafka 5+5+2, docker 3, linux 2
        let out = score(&cand, &req, "Built Kafka consumers");
        assert_eq!(out.score, 50 + 12 + 3 + 2);
        assert_eq!(out.why_fit[0], "Kafka: adjacent skill, exact tool match");
        assert_eq!(out.why_fit[1], "Docker: advanced skill");
    }

    #[test]
    fn preferred_gap_costs_less() {
        let cand = SkillVector::new();
        let req = vector(&[("react", 1.0), ("docker", 0.5)]);
        let out = score(&cand, &req, "");
        assert_eq!(out.score, 50 - 8 - 4);
        assert_eq!(out.why_fit, vec![GENERIC_WHY_FIT.to_string()]);
        assert_eq!(out.gap_skills, vec!["react".to_string(), "docker".to_string()]);
    }

    #[test]
    fn containment_prefers_heaviest_candidate_token() {
        let cand = vector(&[("postgres", 0.3), ("postgresql", 1.0)]);
        let req = vector(&[("postgresql admin", 1.0)]);
        let out = score(&cand, &req, "");
        assert_eq!(out.score, 60);
    }

    #[test]
    fn truncates_and_orders_by_impact() {
        let req = vector(&[
            ("a1", 1.0),
            ("b2", 1.0),
            ("c3", 1.0),
            ("d4", 1.0),
            ("e5", 0.5),
            ("kafka", 1.0),
            ("z9", 1.0),
        ]);
        let cand = vector(&[
            ("a1", 0.3),
            ("b2", 0.5),
            ("c3", 0.7),
            ("d4", 1.0),
            ("kafka", 1.0),
            ("z9", 1.0),
        ]);
        let out = score(&cand, &req, "");
        assert_eq!(out.why_fit.len(), MAX_WHY_FIT);
        assert!(out.why_fit[0].starts_with("Kafka"));
        assert!(out.why_fit.iter().all(|w| !w.starts_with("A1")));
        assert_eq!(out.gaps.len(), 1);
    }

    #[test]
    fn never_below_zero() {
        let req: SkillVector = (0..20).map(|i| (format!("skill{i}"), 1.0)).collect();
        let out = score(&SkillVector::new(), &req, "");
        assert_eq!(out.score, 0);
        assert_eq!(out.gaps.len(), MAX_GAPS);
    }

    #[test]
    fn deterministic() {
        let cand = vector(&[("python", 1.0), ("go", 0.7)]);
        let req = vector(&[("python", 1.0), ("golang", 0.6), ("rust", 1.0)]);
        assert_eq!(score(&cand, &req, "python"), score(&cand, &req, "python"));
    }
}
