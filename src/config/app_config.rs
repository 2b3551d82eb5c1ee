use serde::Deserialize;

use crate::domain::filter::{
    CompilerConfig, MetadataInStrategy, DEFAULT_JSON_COLUMN, DEFAULT_MAX_DEPTH,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub compiler: CompilerSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Filter compiler settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Plain columns; empty means the built-in defaults
    pub top_level_columns: Vec<String>,
    pub json_column: String,
    pub max_depth: usize,
    pub like_auto_wildcard: bool,
    pub metadata_in: MetadataInStrategy,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            top_level_columns: Vec::new(),
            json_column: DEFAULT_JSON_COLUMN.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            like_auto_wildcard: false,
            metadata_in: MetadataInStrategy::default(),
        }
    }
}

impl CompilerSettings {
    pub fn to_compiler_config(&self) -> CompilerConfig {
        CompilerConfig::new()
            .with_top_level_columns(self.top_level_columns.iter().cloned())
            .with_json_column(self.json_column.clone())
            .with_max_depth(self.max_depth)
            .with_like_auto_wildcard(self.like_auto_wildcard)
            .with_metadata_in(self.metadata_in)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
