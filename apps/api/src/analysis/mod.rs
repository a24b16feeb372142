//! Submittal-versus-specification comparison engine.
//!
//! Stages, leaves first: `extractor` → `matcher` → `differences` → `findings` → `scoring`,
//! `risk`, `quality`, `actions` → `assembler` → `validation`. `engine` runs them in order.

pub mod actions;
pub mod assembler;
pub mod categories;
pub mod classifier;
pub mod differences;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod findings;
pub mod handlers;
pub mod matcher;
pub mod models;
pub mod quality;
pub mod risk;
pub mod scoring;
pub mod validation;

pub use engine::{AnalysisOutcome, AnalysisRequest, ComparisonEngine};
