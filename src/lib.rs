pub mod config;
pub mod error;

// Corpus and ranking
pub mod corpus;
pub mod filters;
pub mod similarity;
pub mod text;

// Query orchestration
pub mod search;

// Interfaces
pub mod api;
pub mod cli;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
