pub mod analysis;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod jira;
pub mod key;
pub mod render;
pub mod report;
pub mod rules;
pub mod source;
pub mod ticket;
pub mod types;

pub use error::{DodError, Result};
