// src/skills/mod.rs
//! Skill vectors, match scoring and fix-action suggestions. Pure functions;
//! no I/O.

pub mod actions;
pub mod scoring;
pub mod vector;

pub use actions::generate_fix_actions;
pub use scoring::{score, MatchOutcome};
pub use vector::{build_candidate_vector, build_requirement_vector, CandidateProfile, SkillVector};
