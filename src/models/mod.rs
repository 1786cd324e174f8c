//! Data models

pub mod features;
pub mod student;
pub mod training;
pub mod prediction;

pub use features::*;
pub use student::*;
pub use training::*;
pub use prediction::*;
