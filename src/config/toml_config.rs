use crate::domain::model::QueryOptions;
use crate::utils::error::{QueryError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// Largest poll interval accepted from user-facing configuration.
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex")
});

/// Optional settings file, e.g.
///
/// ```toml
/// [aws]
/// profile = "audit"
/// region = "${AWS_REGION}"
///
/// [query]
/// expand = true
/// normalize = false
/// poll_interval_ms = 500
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub aws: Option<AwsSection>,
    pub query: Option<QuerySection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsSection {
    pub profile: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySection {
    pub expand: Option<bool>,
    pub normalize: Option<bool>,
    pub poll_interval_ms: Option<u64>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| QueryError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| QueryError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn profile(&self) -> Option<&str> {
        self.aws.as_ref()?.profile.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.aws.as_ref()?.region.as_deref()
    }

    /// Options from the `[query]` section on top of the defaults.
    pub fn query_options(&self) -> QueryOptions {
        let mut options = QueryOptions::default();
        if let Some(query) = &self.query {
            if let Some(expand) = query.expand {
                options.expand = expand;
            }
            if let Some(normalize) = query.normalize {
                options.normalize = normalize;
            }
            if let Some(ms) = query.poll_interval_ms {
                options.poll_interval = Duration::from_millis(ms);
            }
        }
        options
    }
}

impl Validate for FileConfig {
    fn validate(&self) -> Result<()> {
        if let Some(profile) = self.profile() {
            validate_non_empty_string("aws.profile", profile)?;
        }
        if let Some(region) = self.region() {
            validate_non_empty_string("aws.region", region)?;
        }
        if let Some(ms) = self.query.as_ref().and_then(|query| query.poll_interval_ms) {
            validate_range("query.poll_interval_ms", ms, 0, MAX_POLL_INTERVAL_MS)?;
        }
        Ok(())
    }
}

// Unset variables are left as `${NAME}`.
fn substitute_env_vars(content: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}
