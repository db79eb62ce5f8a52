//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod articles;
pub mod datapoint;

pub use articles::{ArticlesParams, ArticlesTool};
pub use datapoint::{DatapointParams, DatapointTool};
