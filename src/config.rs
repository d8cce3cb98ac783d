use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
    pub display: DisplayConfig,
}

/// Analysis service connection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL; the client appends the endpoint paths
    pub base_url: String,
    /// Per-request timeout in seconds (default: 30)
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
}

/// Command line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "querylens")]
#[command(version, about = "QueryLens - BI Query Performance Analyzer")]
pub struct CommandLineArgs {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<String>,

    /// Analysis service base URL (overrides config file and APP_API_URL)
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Request timeout (overrides config file, e.g., "30s", "2m")
    #[arg(long, value_name = "DURATION", global = true)]
    pub timeout: Option<String>,

    /// Logging level (overrides config file, e.g., "warn,querylens=debug")
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyze a query and render the bottleneck report
    Analyze {
        #[command(flatten)]
        input: QueryInput,

        /// Print the validated report as JSON
        #[arg(long)]
        json: bool,

        /// Print the service's pre-formatted text report
        #[arg(long, conflicts_with = "json")]
        formatted: bool,
    },

    /// Show metrics and suggestions from the legacy analyzer
    Suggest {
        #[command(flatten)]
        input: QueryInput,
    },

    /// Read queries from stdin and analyze them one after another
    Interactive,

    /// List the built-in example queries
    Samples,
}

/// Where the SQL text comes from; stdin when nothing is given
#[derive(Args, Debug, Clone, Default)]
pub struct QueryInput {
    /// SQL text
    pub sql: Option<String>,

    /// Read SQL from a file
    #[arg(long, short, value_name = "PATH", conflicts_with_all = ["sql", "example"])]
    pub file: Option<PathBuf>,

    /// Use a built-in example query (see `samples`)
    #[arg(long, short, value_name = "N", conflicts_with = "sql")]
    pub example: Option<usize>,
}

impl Config {
    /// Load configuration with command line, environment variable, and file support
    ///
    /// Loading order (priority from highest to lowest):
    /// 1. Command line arguments
    /// 2. Environment variables (prefixed with APP_)
    /// 3. Configuration file (querylens.toml)
    /// 4. Default values
    pub fn load(cli_args: &CommandLineArgs) -> Result<Self, anyhow::Error> {
        let config_path = cli_args.config.clone().or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            Self::from_toml(&config_path)?
        } else {
            tracing::debug!("Configuration file not found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.apply_cli_overrides(cli_args);
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_API_URL: Analysis service base URL (default: http://localhost:8080)
    /// - APP_API_TIMEOUT: Request timeout (accepts "30", "30s", "2m")
    /// - APP_LOG_LEVEL: Logging level (e.g., "warn,querylens=debug")
    /// - APP_LOG_FILE: Log file path
    /// - NO_COLOR: Disable coloured output when set
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("APP_API_URL") {
            self.service.base_url = url;
            tracing::debug!("Override service.base_url from env: {}", self.service.base_url);
        }

        if let Ok(timeout) = std::env::var("APP_API_TIMEOUT") {
            match parse_duration_to_secs(&timeout) {
                Ok(val) => {
                    self.service.timeout_secs = val;
                    tracing::debug!(
                        "Override service.timeout_secs from env: {}",
                        self.service.timeout_secs
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_API_TIMEOUT '{}': {} (keep {})",
                    timeout,
                    e,
                    self.service.timeout_secs
                ),
            }
        }

        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::debug!("Override logging.level from env: {}", self.logging.level);
        }

        if let Ok(file) = std::env::var("APP_LOG_FILE") {
            self.logging.file = Some(file).filter(|f| !f.trim().is_empty());
            tracing::debug!("Override logging.file from env: {:?}", self.logging.file);
        }

        if std::env::var_os("NO_COLOR").is_some() {
            self.display.color = false;
        }
    }

    /// Apply command line argument overrides (highest priority)
    fn apply_cli_overrides(&mut self, args: &CommandLineArgs) {
        if let Some(url) = &args.api_url {
            self.service.base_url = url.clone();
            tracing::debug!("Override service.base_url from CLI: {}", self.service.base_url);
        }

        if let Some(timeout) = &args.timeout {
            match parse_duration_to_secs(timeout) {
                Ok(val) => {
                    self.service.timeout_secs = val;
                    tracing::debug!(
                        "Override service.timeout_secs from CLI: {}",
                        self.service.timeout_secs
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid --timeout '{}': {} (keep {})",
                    timeout,
                    e,
                    self.service.timeout_secs
                ),
            }
        }

        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
            tracing::debug!("Override logging.level from CLI: {}", self.logging.level);
        }

        if args.no_color {
            self.display.color = false;
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        let url = self.service.base_url.trim();
        if url.is_empty() {
            anyhow::bail!("service.base_url cannot be empty");
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("service.base_url must start with http:// or https:// (got '{}')", url);
        }

        if self.service.timeout_secs == 0 {
            anyhow::bail!("service.timeout_secs must be > 0");
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths = ["conf/querylens.toml", "querylens.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, anyhow::Error> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:8080".to_string(), timeout_secs: 30 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn,querylens=info".to_string(), file: None }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

// =========================
// Helpers for parsing values
// =========================

fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    // Accept plain numbers (treated as seconds)
    if let Ok(val) = input.parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err("missing number or unit".into());
    }
    let n: u64 = num_str.parse().map_err(|_| "invalid number".to_string())?;
    let multiplier = match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hour" | "hours" => 60 * 60,
        _ => return Err(format!("unsupported unit: {}", unit)),
    };
    n.checked_mul(multiplier).ok_or_else(|| "invalid number".to_string())
}

// Accept either a number of seconds or a human-friendly string
fn deserialize_duration_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;
    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = u64;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number of seconds or a string like '30s', '2m'")
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v)
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if v >= 0 { Ok(v as u64) } else { Err(E::custom("negative not allowed")) }
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(v).map_err(E::custom)
        }
    }
    deserializer.deserialize_any(Visitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> CommandLineArgs {
        let mut argv = vec!["querylens"];
        argv.extend_from_slice(extra);
        argv.push("samples");
        CommandLineArgs::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.service.base_url, "http://localhost:8080");
        assert_eq!(config.service.timeout_secs, 30);
        assert!(config.display.color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration_to_secs("45"), Ok(45));
        assert_eq!(parse_duration_to_secs("30s"), Ok(30));
        assert_eq!(parse_duration_to_secs("2m"), Ok(120));
        assert_eq!(parse_duration_to_secs("1h"), Ok(3600));
        assert!(parse_duration_to_secs("10x").is_err());
        assert!(parse_duration_to_secs("s").is_err());
    }

    #[test]
    fn test_parse_duration_overflow_is_error() {
        assert_eq!(
            parse_duration_to_secs("9999999999999999999h"),
            Err("invalid number".to_string())
        );
        assert!(parse_duration_to_secs("400000000000000000m").is_err());
        assert_eq!(parse_duration_to_secs("18446744073709551615s"), Ok(u64::MAX));

        let mut config = Config::default();
        config.apply_cli_overrides(&args(&["--timeout", "9999999999999999999h"]));
        assert_eq!(config.service.timeout_secs, 30);
    }

    #[test]
    fn test_toml_sections() {
        let config = Config::from_toml_str(
            r#"
            [service]
            base_url = "https://lens.internal:9443/"
            timeout_secs = "90s"

            [display]
            color = false
            "#,
        )
        .unwrap();

        assert_eq!(config.service.base_url, "https://lens.internal:9443/");
        assert_eq!(config.service.timeout_secs, 90);
        assert!(!config.display.color);
        assert_eq!(config.logging.level, LoggingConfig::default().level);
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = Config::default();
        config.apply_cli_overrides(&args(&[
            "--api-url",
            "http://analyzer:8080",
            "--timeout",
            "5m",
            "--no-color",
        ]));

        assert_eq!(config.service.base_url, "http://analyzer:8080");
        assert_eq!(config.service.timeout_secs, 300);
        assert!(!config.display.color);
    }

    #[test]
    fn test_invalid_cli_timeout_keeps_previous() {
        let mut config = Config::default();
        config.apply_cli_overrides(&args(&["--timeout", "soon"]));
        assert_eq!(config.service.timeout_secs, 30);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.service.base_url = "localhost:8080".to_string();
        assert!(config.validate().is_err());

        config.service.base_url = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.service.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_query_input_conflicts() {
        let parsed = CommandLineArgs::try_parse_from([
            "querylens",
            "analyze",
            "SELECT 1",
            "--example",
            "2",
        ]);
        assert!(parsed.is_err());

        let parsed =
            CommandLineArgs::try_parse_from(["querylens", "analyze", "--example", "2", "--json"])
                .unwrap();
        match parsed.command {
            Command::Analyze { input, json, formatted } => {
                assert_eq!(input.example, Some(2));
                assert!(json);
                assert!(!formatted);
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
