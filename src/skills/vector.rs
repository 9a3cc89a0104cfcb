// src/skills/vector.rs
//! Weighted skill maps for candidates and job requirements.
//!
//! Both builders are pure: same input, same vector. Keys are normalized
//! tokens (lowercased, trimmed, inner whitespace collapsed); weights live in
//! `[0.0, 1.0]`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CORE_WEIGHT: f64 = 1.0;
pub const ADJACENT_WEIGHT: f64 = 0.7;
pub const ADVANCED_WEIGHT: f64 = 0.5;
pub const KEYWORD_WEIGHT: f64 = 0.3;
pub const STRENGTH_BOOST: f64 = 0.2;

pub const REQUIRED_WEIGHT: f64 = 1.0;
pub const PREFERRED_WEIGHT: f64 = 0.5;

/// Known tools/technologies counted in requirement text.
pub const TECH_VOCABULARY: &[&str] = &[
    // Languages
    "python", "java", "javascript", "typescript", "go", "rust", "c++", "c#", "ruby", "php",
    "swift", "kotlin", "scala", "r",
    // Frameworks
    "react", "angular", "vue", "node.js", "django", "flask", "fastapi", "spring", "express",
    "next.js",
    // Databases
    "sql", "postgresql", "mysql", "mongodb", "redis", "elasticsearch", "dynamodb", "cassandra",
    // Cloud & DevOps
    "aws", "azure", "gcp", "docker", "kubernetes", "terraform", "jenkins", "ci/cd",
    "github actions",
    // Data & ML
    "pandas", "numpy", "scikit-learn", "tensorflow", "pytorch", "spark", "hadoop", "kafka",
    "airflow",
    // Tools
    "git", "linux", "bash", "rest api", "graphql", "microservices", "agile", "scrum",
    // Data specific
    "tableau", "power bi", "looker", "snowflake", "redshift", "bigquery", "s3", "etl",
    // Frontend
    "html", "css", "sass", "tailwind", "webpack", "vite", "jest", "cypress",
    // Backend
    "api", "rest", "grpc", "message queue", "rabbitmq", "celery",
];

/// Filler that never counts as a skill when reading "required: ..." clauses.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "with", "for", "to", "of", "in", "on", "at", "by", "as",
    "is", "are", "be", "will", "who", "you", "your", "our", "we", "us", "also", "etc", "this",
    "that", "have", "has", "having", "must", "should", "can", "able", "ability", "strong",
    "solid", "good", "great", "excellent", "proven", "deep", "working", "work", "hands",
    "experience", "experienced", "knowledge", "understanding", "familiarity", "familiar",
    "skills", "skill", "proficiency", "proficient", "expertise", "background", "years", "year",
    "plus", "bonus", "preferred", "required", "nice", "least", "minimum", "degree", "developer",
    "engineer", "candidate", "candidates", "someone", "person", "team", "role", "position",
    "following", "similar", "related", "equivalent", "other", "more", "one", "two", "three",
];

/// Weighted mapping from normalized skill token to weight in `[0, 1]`.
///
/// Backed by a `BTreeMap` so iteration order (and everything derived from
/// it) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkillVector(BTreeMap<String, f64>);

impl SkillVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, token: &str) -> Option<f64> {
        self.0.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains_key(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// First assignment wins; returns whether the token was inserted.
    pub fn insert_if_absent(&mut self, token: &str, weight: f64) -> bool {
        let key = normalize_token(token);
        if key.is_empty() || self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, clamp_weight(weight));
        true
    }

    fn boost(&mut self, token: &str, by: f64) {
        if let Some(w) = self.0.get_mut(token) {
            *w = clamp_weight(*w + by);
        }
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for SkillVector {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut v = SkillVector::new();
        for (k, w) in iter {
            v.insert_if_absent(k.as_ref(), w);
        }
        v
    }
}

/// Candidate skills as handed over by the resume-analysis collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub core: Vec<String>,
    pub adjacent: Vec<String>,
    pub advanced: Vec<String>,
    pub keywords: Vec<String>,
    pub strengths: Vec<String>,
}

impl CandidateProfile {
    /// Flat text of every listed skill and strength (used when no resume text is supplied).
    pub fn as_text(&self) -> String {
        self.core
            .iter()
            .chain(&self.adjacent)
            .chain(&self.advanced)
            .chain(&self.keywords)
            .chain(&self.strengths)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn normalize_token(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn clamp_weight(w: f64) -> f64 {
    w.clamp(0.0, 1.0)
}

/// Core 1.0, adjacent 0.7, advanced 0.5, stray keywords 0.3 (never
/// downgraded), then +0.2 per strength statement mentioning the token.
pub fn build_candidate_vector(profile: &CandidateProfile) -> SkillVector {
    let mut v = SkillVector::new();
    for (list, weight) in [
        (&profile.core, CORE_WEIGHT),
        (&profile.adjacent, ADJACENT_WEIGHT),
        (&profile.advanced, ADVANCED_WEIGHT),
        (&profile.keywords, KEYWORD_WEIGHT),
    ] {
        for skill in list {
            v.insert_if_absent(skill, weight);
        }
    }

    let tokens: Vec<String> = v.0.keys().cloned().collect();
    for strength in &profile.strengths {
        let s = strength.to_lowercase();
        for t in &tokens {
            if s.contains(t.as_str()) {
                v.boost(t, STRENGTH_BOOST);
            }
        }
    }
    v
}

static RE_REQUIRED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:must[- ]haves?|required|requirements?|essential|needs?|needed)\b")
        .expect("required regex")
});
static RE_PREFERRED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:preferred|nice[- ]to[- ]haves?|bonus|plus)\b").expect("preferred regex")
});
static RE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z][a-z0-9+#./-]*").expect("word regex"));
static RE_YEARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\+?\s*years?\s*(?:of\s+)?(?:experience\s+)?(?:with\s+|in\s+)?([a-z][a-z0-9+#.]*)")
        .expect("years regex")
});

/// Required phrasing → 1.0, preferred phrasing → 0.5 (never overriding 1.0),
/// then vocabulary hits → `min(1.0, 0.5 + 0.1 * occurrences)` if still unset.
/// Falls back to "N years of X" phrasing when nothing else matched.
pub fn build_requirement_vector(text: &str) -> SkillVector {
    let lower = text.to_lowercase();
    let mut v = SkillVector::new();

    // Required pass first so preferred can never downgrade it.
    for sentence in sentences(&lower) {
        for token in triggered_tokens(sentence, &RE_REQUIRED) {
            v.insert_if_absent(&token, REQUIRED_WEIGHT);
        }
    }
    for sentence in sentences(&lower) {
        for token in triggered_tokens(sentence, &RE_PREFERRED) {
            v.insert_if_absent(&token, PREFERRED_WEIGHT);
        }
    }

    for tool in TECH_VOCABULARY {
        let n = count_bounded(&lower, tool);
        if n > 0 {
            v.insert_if_absent(tool, (0.5 + 0.1 * n as f64).min(1.0));
        }
    }

    if v.is_empty() {
        for cap in RE_YEARS.captures_iter(&lower) {
            let years: f64 = cap[1].parse().unwrap_or(0.0);
            let skill = cap[2].trim_end_matches('.');
            if skill.len() > 2 && !is_stopword(skill) {
                v.insert_if_absent(skill, (years / 5.0).min(1.0));
            }
        }
    }
    v
}

/// Split on sentence punctuation, but keep dots inside tokens like `node.js`.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    for (i, ch) in text.char_indices() {
        let ends = match ch {
            ';' | '\n' | '!' | '?' => true,
            '.' => bytes
                .get(i + 1)
                .map_or(true, |b| b.is_ascii_whitespace()),
            _ => false,
        };
        if ends {
            if start < i {
                out.push(&text[start..i]);
            }
            start = i + ch.len_utf8();
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

/// Tokens governed by each trigger phrase in one sentence.
///
/// The clause after a trigger runs to the next trigger (or sentence end). An
/// empty clause falls back to the text before the trigger, which catches the
/// "React is a plus" form.
fn triggered_tokens(sentence: &str, trigger: &Regex) -> Vec<String> {
    let matches: Vec<_> = trigger.find_iter(sentence).collect();
    let mut out = Vec::new();
    let mut prev_end = 0;
    for (i, m) in matches.iter().enumerate() {
        let clause_end = matches.get(i + 1).map_or(sentence.len(), |n| n.start());
        let after = clause_tokens(&sentence[m.end()..clause_end]);
        let tokens = if after.is_empty() {
            clause_tokens(&sentence[prev_end..m.start()])
        } else {
            after
        };
        out.extend(tokens);
        prev_end = m.end();
    }
    out
}

/// Vocabulary tools named in the clause; otherwise its first meaningful word.
fn clause_tokens(clause: &str) -> Vec<String> {
    let tools: Vec<String> = TECH_VOCABULARY
        .iter()
        .filter(|t| count_bounded(clause, t) > 0)
        .map(|t| t.to_string())
        .collect();
    if !tools.is_empty() {
        return tools;
    }
    RE_WORD
        .find_iter(clause)
        .map(|m| m.as_str().trim_end_matches(['.', '-', '/']))
        .find(|w| w.len() > 2 && !is_stopword(w))
        .map(|w| vec![w.to_string()])
        .unwrap_or_default()
}

fn is_stopword(w: &str) -> bool {
    STOPWORDS.contains(&w)
}

/// Occurrences of `needle` not glued to surrounding letters/digits.
pub(crate) fn count_bounded(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack
        .match_indices(needle)
        .filter(|(i, _)| {
            let before = haystack[..*i].chars().next_back();
            let after = haystack[i + needle.len()..].chars().next();
            !before.is_some_and(|c| c.is_alphanumeric())
                && !after.is_some_and(|c| c.is_alphanumeric())
        })
        .count()
}
