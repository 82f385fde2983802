pub mod coordinates;
pub mod corrections;
pub mod country_goals;
pub mod error;
pub mod flags;
pub mod records;
pub mod render;
pub mod report;
pub mod scorers;
pub mod stadiums;

pub use error::{AnalysisError, Result};
