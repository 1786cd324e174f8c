//! HTTP handlers

pub mod health;
pub mod feedback;
pub mod analysis;
pub mod batch;
pub mod model;
pub mod history;
pub mod students;
