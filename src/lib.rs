pub use crate::errors::{ComparisonMismatch, PipelineError, SuiteError, ToolInvocationError};

pub mod catalog;
pub mod cli;
pub mod compare;
pub mod config;
pub mod errors;
pub mod invoker;
pub mod normalize;
pub mod pipeline;
pub mod suite;
