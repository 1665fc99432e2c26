//! Rubric and theme tree engine for assessment solutions.
//!
//! The [`themes`] module turns delimiter-encoded theme uploads into nested scoring trees,
//! attaches rubric expressions, rewrites criteria weightage, and flattens trees into the
//! hierarchy-annotated projection used for storage and scoring.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod themes;
