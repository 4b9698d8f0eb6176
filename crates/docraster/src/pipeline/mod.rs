//! Conversion pipeline: rasterize a stored document and persist its
//! page records.

pub mod error;
pub mod runner;

pub use error::PipelineError;
pub use runner::Pipeline;
