//! Cloudflare R2 configuration.

use serde::{Deserialize, Serialize};

/// Default bucket name.
fn default_bucket_name() -> String {
    String::from("quire-assets")
}

/// Default path under the public site that serves bucket objects.
fn default_public_path() -> String {
    String::from("img")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct R2Config {
    /// Cloudflare account ID.
    #[serde(default)]
    pub account_id: String,

    /// R2 access key ID.
    #[serde(default)]
    pub access_key_id: String,

    /// R2 secret access key.
    #[serde(default)]
    pub secret_access_key: String,

    /// R2 bucket name.
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,

    /// Custom endpoint URL. If empty, built from `account_id`.
    #[serde(default)]
    pub endpoint: String,

    /// Base URL of the site API (e.g. `https://example.com/api`).
    #[serde(default)]
    pub api_base_url: String,

    /// Explicit public base for uploaded objects. Overrides the value derived
    /// from `api_base_url`.
    #[serde(default)]
    pub public_domain: String,

    /// Path segment appended to the derived site root.
    #[serde(default = "default_public_path")]
    pub public_path: String,
}

impl Default for R2Config {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            bucket_name: default_bucket_name(),
            endpoint: String::new(),
            api_base_url: String::new(),
            public_domain: String::new(),
            public_path: default_public_path(),
        }
    }
}

impl R2Config {
    /// Check if the R2 config has the minimum required fields.
    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Required fields that are blank, as `(setting, env var)` pairs.
    pub fn missing_fields(&self) -> Vec<(&'static str, &'static str)> {
        let mut missing = Vec::new();
        if self.account_id.trim().is_empty() {
            missing.push(("r2.account_id", "CF_ACCOUNT_ID"));
        }
        if self.access_key_id.trim().is_empty() {
            missing.push(("r2.access_key_id", "R2_ACCESS_KEY"));
        }
        if self.secret_access_key.trim().is_empty() {
            missing.push(("r2.secret_access_key", "R2_SECRET_KEY"));
        }
        if self.bucket_name.trim().is_empty() {
            missing.push(("r2.bucket_name", "R2_BUCKET"));
        }
        if self.public_base().is_none() {
            missing.push(("r2.api_base_url", "API_BASE_URL"));
        }
        missing
    }

    /// Build the R2 endpoint URL.
    ///
    /// Returns the custom `endpoint` if set, otherwise builds from `account_id`.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.is_empty() {
            format!("https://{}.r2.cloudflarestorage.com", self.account_id)
        } else {
            self.endpoint.clone()
        }
    }

    /// Public base URL under which uploaded keys are served.
    ///
    /// `public_domain` wins when set. Otherwise the last path segment of
    /// `api_base_url` is replaced by `public_path`:
    /// `https://example.com/api` → `https://example.com/img`.
    pub fn public_base(&self) -> Option<String> {
        let explicit = self.public_domain.trim().trim_end_matches('/');
        if !explicit.is_empty() {
            return Some(explicit.to_string());
        }

        let api = self.api_base_url.trim().trim_end_matches('/');
        if api.is_empty() {
            return None;
        }

        let site = strip_last_path_segment(api);
        let path = self.public_path.trim().trim_matches('/');
        if path.is_empty() {
            Some(site.to_string())
        } else {
            Some(format!("{site}/{path}"))
        }
    }

    /// Copy with credentials masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            access_key_id: mask(&self.access_key_id),
            secret_access_key: mask(&self.secret_access_key),
            ..self.clone()
        }
    }
}

fn strip_last_path_segment(url: &str) -> &str {
    let authority_start = url.find("://").map_or(0, |idx| idx + 3);
    match url.rfind('/') {
        Some(idx) if idx >= authority_start => &url[..idx],
        _ => url,
    }
}

fn mask(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        String::from("********")
    }
}
