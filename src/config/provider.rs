use http::Method;
use serde::Deserialize;
use std::collections::HashMap;

use crate::utils::constants::{DEFAULT_PROVIDER_TIMEOUT_MS, DEFAULT_TOKEN_FIELD};

/// ================================
/// Identity provider endpoint
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub url: String,
    #[serde(with = "http_serde::method")]
    pub method: Method, // GET, POST
    pub headers: Option<HashMap<String, HeaderSourceValue>>,
    /// JSON body field carrying the issued token
    #[serde(default = "default_token_field")]
    pub token_field: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Header value sources
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum HeaderSourceValue {
    Literal { value: String },
    FromEnv { from_env: String },
    FromFile { path: String },
}

fn default_token_field() -> String {
    DEFAULT_TOKEN_FIELD.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_MS
}
