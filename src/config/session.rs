use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::error::{CalError, Result};

/// Session material for the provider request: browser-like headers plus
/// the operator's session cookies. Cookies come from a TOML file so no
/// secret ever lives in the source; `${VAR}` references are substituted
/// from the environment when the file is loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub cookies: HashMap<String, String>,
}

impl SessionConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CalError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    /// Headers a browser would send alongside the XHR the provider expects.
    /// File-level entries override these defaults.
    pub fn request_headers(&self) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = default_headers()
            .into_iter()
            .filter(|(k, _)| !self.headers.contains_key(*k))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut overrides: Vec<_> = self
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        overrides.sort();
        merged.extend(overrides);
        merged
    }

    /// `Cookie` header value, or None when no cookies are configured.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let mut pairs: Vec<_> = self
            .cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        pairs.sort();
        Some(pairs.join("; "))
    }
}

fn default_headers() -> Vec<(&'static str, &'static str)> {
    vec![
        ("accept", "application/json, text/javascript, */*; q=0.01"),
        ("accept-language", "en,zh-CN;q=0.9,zh;q=0.8"),
        ("cache-control", "no-cache"),
        ("pragma", "no-cache"),
        (
            "user-agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36",
        ),
        ("x-requested-with", "XMLHttpRequest"),
    ]
}

/// Replaces `${VAR_NAME}` with the environment value; unset variables are
/// left verbatim so the parse error points at them.
fn substitute_env_vars(content: &str) -> String {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .to_string()
}
