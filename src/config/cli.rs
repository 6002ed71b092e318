use crate::config::toml_config::{FileConfig, MAX_POLL_INTERVAL_MS};
use crate::domain::model::QueryOptions;
use crate::utils::error::{QueryError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Parser)]
#[command(name = "cloudtrail-query")]
#[command(about = "Run a CloudTrail Lake query and print the results as JSON lines")]
pub struct CliConfig {
    #[arg(help = "CloudTrail Lake SQL query. Use - to read the query from stdin")]
    pub query: String,

    #[arg(short, long, help = "AWS profile to use [default: default]")]
    pub profile: Option<String>,

    #[arg(long, help = "AWS region, overrides the profile's region")]
    pub region: Option<String>,

    #[arg(
        short = 'N',
        long,
        help = "Do not normalize values. Normalization turns empty and \"null\" strings into null and \"true\"/\"false\" strings into booleans"
    )]
    pub no_normalization: bool,

    #[arg(
        short = 'E',
        long,
        help = "Do not expand key=value dumps found in columns. Expanded values are added under the \"__parsed\" suffix"
    )]
    pub no_expansion: bool,

    #[arg(long, help = "Minimum delay between polls while the query is running [default: 250]")]
    pub poll_interval_ms: Option<u64>,

    #[arg(short, long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn load_file_config(&self) -> Result<FileConfig> {
        match &self.config {
            Some(path) => FileConfig::from_file(path),
            None => Ok(FileConfig::default()),
        }
    }

    /// Flags win over the file; the file wins over the defaults.
    pub fn query_options(&self, file: &FileConfig) -> QueryOptions {
        let mut options = file.query_options();
        if self.no_expansion {
            options.expand = false;
        }
        if self.no_normalization {
            options.normalize = false;
        }
        if let Some(ms) = self.poll_interval_ms {
            options.poll_interval = Duration::from_millis(ms);
        }
        options
    }

    pub fn profile(&self, file: &FileConfig) -> String {
        self.profile
            .as_deref()
            .or_else(|| file.profile())
            .unwrap_or(DEFAULT_PROFILE)
            .to_string()
    }

    pub fn region(&self, file: &FileConfig) -> Option<String> {
        self.region
            .as_deref()
            .or_else(|| file.region())
            .map(str::to_string)
    }

    /// The query text, reading all of `input` when the argument is `-`.
    pub fn query_text<R: Read>(&self, mut input: R) -> Result<String> {
        if self.query != "-" {
            return Ok(self.query.clone());
        }
        let mut query = String::new();
        input.read_to_string(&mut query).map_err(QueryError::IoError)?;
        Ok(query)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("query", &self.query)?;
        if let Some(profile) = &self.profile {
            validate_non_empty_string("profile", profile)?;
        }
        if let Some(ms) = self.poll_interval_ms {
            validate_range("poll_interval_ms", ms, 0, MAX_POLL_INTERVAL_MS)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        CliConfig::try_parse_from(std::iter::once("cloudtrail-query").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["SELECT eventName FROM eds"]);
        let file = FileConfig::default();

        assert_eq!(cli.profile(&file), "default");
        assert_eq!(cli.region(&file), None);
        assert_eq!(cli.query_options(&file), QueryOptions::default());
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_short_flags_disable_transforms() {
        let cli = parse(&["-N", "-E", "-p", "audit", "SELECT 1"]);
        let options = cli.query_options(&FileConfig::default());

        assert!(!options.expand);
        assert!(!options.normalize);
        assert_eq!(cli.profile(&FileConfig::default()), "audit");
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig::from_toml_str(
            "[aws]\nprofile = \"from-file\"\nregion = \"us-west-2\"\n[query]\npoll_interval_ms = 900\n",
        )
        .unwrap();

        let cli = parse(&["--poll-interval-ms", "100", "SELECT 1"]);
        assert_eq!(cli.profile(&file), "from-file");
        assert_eq!(cli.region(&file), Some("us-west-2".to_string()));
        assert_eq!(
            cli.query_options(&file).poll_interval,
            Duration::from_millis(100)
        );

        let cli = parse(&["--profile", "flag", "--region", "eu-central-1", "SELECT 1"]);
        assert_eq!(cli.profile(&file), "flag");
        assert_eq!(cli.region(&file), Some("eu-central-1".to_string()));
        assert_eq!(
            cli.query_options(&file).poll_interval,
            Duration::from_millis(900)
        );
    }

    #[test]
    fn test_query_from_stdin() {
        let cli = parse(&["-"]);
        let query = cli
            .query_text("SELECT *\nFROM eds\n".as_bytes())
            .unwrap();
        assert_eq!(query, "SELECT *\nFROM eds\n");

        let cli = parse(&["SELECT 1"]);
        assert_eq!(cli.query_text(std::io::empty()).unwrap(), "SELECT 1");
    }

    #[test]
    fn test_empty_query_fails_validation() {
        let cli = parse(&[""]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_poll_interval_flag_is_bounded() {
        let cli = parse(&["--poll-interval-ms", "60000", "SELECT 1"]);
        assert!(cli.validate().is_ok());

        let cli = parse(&["--poll-interval-ms", "3600000", "SELECT 1"]);
        let err = cli.validate().unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { .. }));
        assert!(err.to_string().contains("poll_interval_ms"));
    }
}
