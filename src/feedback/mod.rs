//! Feedback engine
//!
//! Turns a predicted exam score plus a student's feature record into a risk
//! band and two audience-specific advice lists (parent, teacher).

pub mod engine;
pub mod report;
pub mod types;

pub use engine::evaluate;
pub use report::ParentReport;
pub use types::{FeedbackResult, RiskBand};
