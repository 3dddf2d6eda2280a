use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::PluginError;

pub const DEFAULT_BOT_NAME: &str = "prime-sentinel";
const DEFAULT_CONFIG_FILE: &str = "prime-sentinel.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub slack: SlackConfig,
    pub logging: LoggingConfig,
    pub plugins: PluginsConfig,
}

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub bot_token: SecretString,
    pub bot_user_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Debug, Default)]
pub struct PluginsConfig {
    pub quoter: QuoterConfig,
    pub schoolcode: SchoolcodeConfig,
}

#[derive(Clone, Debug)]
pub struct QuoterConfig {
    pub enabled: bool,
    pub quote_configs: Vec<QuoteConfig>,
}

impl Default for QuoterConfig {
    fn default() -> Self {
        Self { enabled: true, quote_configs: Vec::new() }
    }
}

#[derive(Clone, Debug)]
pub struct SchoolcodeConfig {
    pub enabled: bool,
    pub threaded_replies: bool,
}

impl Default for SchoolcodeConfig {
    fn default() -> Self {
        Self { enabled: true, threaded_replies: false }
    }
}

/// A set of trigger phrases sharing one response pool.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteConfig {
    triggers: Vec<String>,
    frequency: f64,
    responses: Responses,
}

impl QuoteConfig {
    /// Triggers may be empty (the block then never fires); responses may not.
    pub fn new(
        triggers: Vec<String>,
        frequency: f64,
        responses: Vec<String>,
    ) -> Result<Self, PluginError> {
        if !frequency.is_finite() || !(0.0..=1.0).contains(&frequency) {
            return Err(PluginError::FrequencyOutOfRange(frequency));
        }
        Ok(Self { triggers, frequency, responses: Responses::try_from(responses)? })
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn responses(&self) -> &Responses {
        &self.responses
    }
}

/// A response pool that is never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Responses(Vec<String>);

impl Responses {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for Responses {
    type Error = PluginError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(PluginError::EmptyResponses);
        }
        Ok(Self(value))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bot_name: Option<String>,
    pub slack_bot_token: Option<String>,
    pub slack_bot_user_id: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub quoter_enabled: Option<bool>,
    pub schoolcode_enabled: Option<bool>,
    pub schoolcode_threaded_replies: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("[quoter] error loading plugins.quoter.quote_configs[{index}]: {source}")]
    QuoteConfig { index: usize, source: PluginError },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bot: BotConfig { name: DEFAULT_BOT_NAME.to_string() },
            slack: SlackConfig { bot_token: String::new().into(), bot_user_id: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            plugins: PluginsConfig::default(),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(bot) = patch.bot {
            if let Some(name) = bot.name {
                self.bot.name = name;
            }
        }

        if let Some(slack) = patch.slack {
            if let Some(bot_token) = slack.bot_token {
                self.slack.bot_token = bot_token.into();
            }
            if let Some(bot_user_id) = slack.bot_user_id {
                self.slack.bot_user_id = Some(bot_user_id);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        let Some(plugins) = patch.plugins else {
            return Ok(());
        };

        if let Some(quoter) = plugins.quoter {
            if let Some(enabled) = quoter.enabled {
                self.plugins.quoter.enabled = enabled;
            }
            if let Some(quote_configs) = quoter.quote_configs {
                self.plugins.quoter.quote_configs = quote_configs
                    .into_iter()
                    .enumerate()
                    .map(|(index, block)| {
                        QuoteConfig::new(
                            block.triggers.unwrap_or_default(),
                            block.frequency.unwrap_or_default(),
                            block.responses.unwrap_or_default(),
                        )
                        .map_err(|source| ConfigError::QuoteConfig { index, source })
                    })
                    .collect::<Result<_, _>>()?;
            }
        }

        if let Some(schoolcode) = plugins.schoolcode {
            if let Some(enabled) = schoolcode.enabled {
                self.plugins.schoolcode.enabled = enabled;
            }
            if let Some(threaded_replies) = schoolcode.threaded_replies {
                self.plugins.schoolcode.threaded_replies = threaded_replies;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PRIME_SENTINEL_BOT_NAME") {
            self.bot.name = value;
        }

        let bot_token =
            read_env("PRIME_SENTINEL_SLACK_BOT_TOKEN").or_else(|| read_env("SLACK_TOKEN"));
        if let Some(value) = bot_token {
            self.slack.bot_token = value.into();
        }
        if let Some(value) = read_env("PRIME_SENTINEL_SLACK_BOT_USER_ID") {
            self.slack.bot_user_id = Some(value);
        }

        if let Some(value) = read_env("PRIME_SENTINEL_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("PRIME_SENTINEL_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }

        if let Some(value) = read_env("PRIME_SENTINEL_QUOTER_ENABLED") {
            self.plugins.quoter.enabled = parse_bool("PRIME_SENTINEL_QUOTER_ENABLED", &value)?;
        }
        if let Some(value) = read_env("PRIME_SENTINEL_SCHOOLCODE_ENABLED") {
            self.plugins.schoolcode.enabled =
                parse_bool("PRIME_SENTINEL_SCHOOLCODE_ENABLED", &value)?;
        }
        if let Some(value) = read_env("PRIME_SENTINEL_SCHOOLCODE_THREADED_REPLIES") {
            self.plugins.schoolcode.threaded_replies =
                parse_bool("PRIME_SENTINEL_SCHOOLCODE_THREADED_REPLIES", &value)?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bot_name) = overrides.bot_name {
            self.bot.name = bot_name;
        }
        if let Some(bot_token) = overrides.slack_bot_token {
            self.slack.bot_token = bot_token.into();
        }
        if let Some(bot_user_id) = overrides.slack_bot_user_id {
            self.slack.bot_user_id = Some(bot_user_id);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(enabled) = overrides.quoter_enabled {
            self.plugins.quoter.enabled = enabled;
        }
        if let Some(enabled) = overrides.schoolcode_enabled {
            self.plugins.schoolcode.enabled = enabled;
        }
        if let Some(threaded_replies) = overrides.schoolcode_threaded_replies {
            self.plugins.schoolcode.threaded_replies = threaded_replies;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_bot(&self.bot)?;
        validate_slack(&self.slack)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_bot(bot: &BotConfig) -> Result<(), ConfigError> {
    if bot.name.trim().is_empty() {
        return Err(ConfigError::Validation("bot.name must not be empty".to_string()));
    }
    Ok(())
}

fn validate_slack(slack: &SlackConfig) -> Result<(), ConfigError> {
    let bot_token = slack.bot_token.expose_secret();
    if bot_token.is_empty() {
        return Err(ConfigError::Validation(
            "slack.bot_token is required (set it in the config file or via SLACK_TOKEN)"
                .to_string(),
        ));
    }
    if !bot_token.starts_with("xoxb-") {
        let hint = if bot_token.starts_with("xapp-") {
            " (hint: you may have used the app token instead of the bot token)"
        } else {
            ""
        };
        return Err(ConfigError::Validation(format!(
            "slack.bot_token must start with `xoxb-`{hint}"
        )));
    }

    if let Some(bot_user_id) = &slack.bot_user_id {
        if bot_user_id.trim().is_empty() || bot_user_id.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "slack.bot_user_id must be a Slack user id such as `U0123ABCD`".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    bot: Option<BotPatch>,
    slack: Option<SlackPatch>,
    logging: Option<LoggingPatch>,
    plugins: Option<PluginsPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct BotPatch {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SlackPatch {
    bot_token: Option<String>,
    bot_user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct PluginsPatch {
    quoter: Option<QuoterPatch>,
    schoolcode: Option<SchoolcodePatch>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoterPatch {
    enabled: Option<bool>,
    quote_configs: Option<Vec<QuoteConfigPatch>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteConfigPatch {
    triggers: Option<Vec<String>>,
    frequency: Option<f64>,
    responses: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct SchoolcodePatch {
    enabled: Option<bool>,
    threaded_replies: Option<bool>,
}
