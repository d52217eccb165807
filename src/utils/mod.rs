pub mod dataset;
pub mod evaluation;
pub mod stats;
