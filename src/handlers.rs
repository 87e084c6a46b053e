pub mod annotation;
pub mod media;
pub mod practice;

use actix_web::web::{JsonConfig, PathConfig, QueryConfig};

use crate::error::Error;

// Malformed ids, query strings and bodies are client errors with the crate's error body.
pub fn path_config() -> PathConfig {
    PathConfig::default().error_handler(|e, _| Error::BusinessError(e.to_string()).into())
}

pub fn query_config() -> QueryConfig {
    QueryConfig::default().error_handler(|e, _| Error::BusinessError(e.to_string()).into())
}

pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|e, _| Error::BusinessError(e.to_string()).into())
}
