pub mod filters;

use crate::error::{Error, Result};
use crate::text::TermDictionary;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use filters::FilterRules;

/// Placeholder served when a recipe has no usable image
pub const DEFAULT_FALLBACK_IMAGE: &str =
    "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcT27gTKHqKhHk3i-EiarE5Q9IND_awvKaKjxw&s";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub corpus: CorpusConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_rate_limit: u64,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub path: PathBuf,
    pub filter_config_path: Option<PathBuf>,
    /// Word list for spelling suggestions; corpus terms are used when unset
    pub suggestion_dictionary_path: Option<PathBuf>,
    pub fallback_image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Results returned by free-text search
    pub search_limit: usize,
    /// Results returned by both recommendation modes
    pub recommend_limit: usize,
    pub suggestion_limit: usize,
    pub suggestion_cutoff: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_limit: 100,
            recommend_limit: 5,
            suggestion_limit: 3,
            suggestion_cutoff: 0.65,
        }
    }
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid PORT value".to_string()))?;

        let api_rate_limit = std::env::var("API_RATE_LIMIT")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid API_RATE_LIMIT value".to_string()))?;

        let max_request_body_size = std::env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| "1048576".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_REQUEST_BODY_SIZE value".to_string()))?;

        let corpus_path = std::env::var("CORPUS_PATH")
            .unwrap_or_else(|_| "./data/recipes.csv".to_string())
            .into();

        let filter_config_path = std::env::var("FILTER_CONFIG_PATH").ok().map(PathBuf::from);

        let suggestion_dictionary_path = std::env::var("SUGGESTION_DICTIONARY_PATH")
            .ok()
            .map(PathBuf::from);

        let fallback_image_url = std::env::var("FALLBACK_IMAGE_URL")
            .unwrap_or_else(|_| DEFAULT_FALLBACK_IMAGE.to_string());

        let search_limit = std::env::var("SEARCH_LIMIT")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid SEARCH_LIMIT value".to_string()))?;

        let recommend_limit = std::env::var("RECOMMEND_LIMIT")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid RECOMMEND_LIMIT value".to_string()))?;

        let suggestion_limit = std::env::var("SUGGESTION_LIMIT")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid SUGGESTION_LIMIT value".to_string()))?;

        let suggestion_cutoff = std::env::var("SUGGESTION_CUTOFF")
            .unwrap_or_else(|_| "0.65".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid SUGGESTION_CUTOFF value".to_string()))?;

        Ok(Settings {
            server: ServerConfig {
                host,
                port,
                api_rate_limit,
                max_request_body_size,
            },
            corpus: CorpusConfig {
                path: corpus_path,
                filter_config_path,
                suggestion_dictionary_path,
                fallback_image_url,
            },
            search: SearchConfig {
                search_limit,
                recommend_limit,
                suggestion_limit,
                suggestion_cutoff,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.server.api_rate_limit == 0 {
            return Err(Error::Config("API rate limit must be non-zero".to_string()));
        }

        if self.search.search_limit == 0 || self.search.recommend_limit == 0 {
            return Err(Error::Config("Result limits must be non-zero".to_string()));
        }

        if !(0.0..=1.0).contains(&self.search.suggestion_cutoff) {
            return Err(Error::Config(
                "Suggestion cutoff must be between 0.0 and 1.0".to_string(),
            ));
        }

        if !self.corpus.fallback_image_url.starts_with("http") {
            return Err(Error::Config(
                "Fallback image URL must be an absolute http(s) URL".to_string(),
            ));
        }

        Ok(())
    }

    /// Load the filter keyword tables, preferring the configured override file
    pub fn filter_rules(&self) -> Result<FilterRules> {
        match &self.corpus.filter_config_path {
            Some(path) => FilterRules::from_file(path),
            None => FilterRules::builtin(),
        }
    }

    /// Load the configured suggestion word list, if any
    pub fn suggestion_dictionary(&self) -> Result<Option<TermDictionary>> {
        self.corpus
            .suggestion_dictionary_path
            .as_ref()
            .map(|path| TermDictionary::read_from(path))
            .transpose()
    }
}
