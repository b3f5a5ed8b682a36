use clap::Parser;
use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

/// Endpoint and model settings for the three SQL-generation backends.
///
/// API keys are never configured here; the user supplies a credential through
/// the UI when selecting a backend. The URLs are overridable so a self-hosted
/// gateway (or a test stub) can stand in for the real service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    pub gemini_url: String,
    pub gemini_model: String,
    pub together_url: String,
    pub together_model: String,
    pub agentic_url: String,
    pub agentic_model: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub web: WebConfig,
    pub llm: LlmConfig,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        // Start with the built-in defaults
        let mut config_builder =
            Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            // Check for config in default locations
            let default_locations = vec![
                "config.toml",
                "config/config.toml",
                "/etc/text2sql/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        // Build the config
        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        // Override with command line args if provided
        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            llm: LlmConfig {
                gemini_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                gemini_model: "gemini-1.5-flash".to_string(),
                together_url: "https://api.together.xyz/v1/completions".to_string(),
                together_model: "together-ai/gpt-neoxt".to_string(),
                agentic_url: "https://api.openai.com/v1/completions".to_string(),
                agentic_model: "gpt-3.5-turbo-instruct".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let args = CliArgs {
            config: None,
            host: None,
            port: None,
        };
        let config = AppConfig::new(&args).unwrap();
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.llm.gemini_model, "gemini-1.5-flash");
    }

    #[test]
    fn cli_args_override_defaults() {
        let args = CliArgs {
            config: None,
            host: Some("0.0.0.0".to_string()),
            port: Some(8080),
        };
        let config = AppConfig::new(&args).unwrap();
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 8080);
    }
}
