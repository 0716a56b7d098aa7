use anyhow::Result;
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use crate::error::CoreResult;


#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub parser: ParserConfig,
}

/// Switches consulted while parsing, constructing, and migrating vCards.
///
/// Passed by reference into every entry point instead of living in a global,
/// so two parsers in one process can disagree about validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Run the per-property rule table at construction time.
    pub validate: bool,
    /// Warn about logical lines longer than 75 characters.
    pub warn_long_lines: bool,
    /// Warn when a quoted-printable or base64 payload fails to decode.
    pub warn_decode_failures: bool,
    /// Index every property in the generic table, not only names, phones and groups.
    pub index_params: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            validate: true,
            warn_long_lines: true,
            warn_decode_failures: true,
            index_params: false,
        }
    }
}

impl ParserConfig {
    /// ## Summary
    /// Returns a copy with validation switched off.
    #[must_use]
    pub const fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// ## Summary
    /// Returns a copy with generic property indexing switched on.
    #[must_use]
    pub const fn with_index_params(mut self) -> Self {
        self.index_params = true;
        self
    }
}

fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    let defaults = ParserConfig::default();
    Config::builder()
        .set_default("parser.validate", defaults.validate)?
        .set_default("parser.warn_long_lines", defaults.warn_long_lines)?
        .set_default("parser.warn_decode_failures", defaults.warn_decode_failures)?
        .set_default("parser.index_params", defaults.index_params)
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional
    /// `rolodex.toml`. Environment variables use the `ROLODEX_` prefix and a
    /// double underscore between sections, e.g. `ROLODEX_PARSER__VALIDATE=false`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(builder_with_defaults()?
            .add_source(
                config::Environment::with_prefix("ROLODEX")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("rolodex.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Builds settings from a TOML document layered over the defaults.
    ///
    /// ## Errors
    /// Returns [`CoreError::ConfigError`](crate::error::CoreError::ConfigError)
    /// if the document does not parse or has the wrong shape.
    pub fn from_toml(source: &str) -> CoreResult<Self> {
        let settings = builder_with_defaults()?
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?;
        tracing::debug!(?settings.parser, "Loaded settings from TOML");
        Ok(settings)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
