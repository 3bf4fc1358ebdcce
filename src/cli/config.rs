//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::{
    config::{AppConfig, ExtractorConfig, ExtractorConfigBuilder},
    session::{CurrentUser, SessionContext},
};
use anyhow::{Context, Result};

/// Environment variable naming the signed-in user
pub(crate) const ENV_USER: &str = "PALETTEGEN_USER";
/// Environment variable holding the signed-in user's display name
pub(crate) const ENV_USER_NAME: &str = "PALETTEGEN_USER_NAME";

/// Convert CLI arguments to library configuration
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the application configuration, CLI flags over environment
    pub(crate) fn from_cli(cli: &Cli) -> Result<AppConfig> {
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => AppConfig::default_data_dir().context("No data directory available")?,
        };

        Ok(AppConfig {
            extractor: ExtractorConfig::from_env(),
            data_dir,
            export_dir: AppConfig::default_export_dir(),
        })
    }

    /// Validated extractor settings for an `extract` run
    pub(crate) fn extractor_config(
        config: &AppConfig,
        max_colors: Option<usize>,
    ) -> Result<ExtractorConfig> {
        let mut builder = ExtractorConfigBuilder::from_config(config.extractor.clone());
        if let Some(max_colors) = max_colors {
            if max_colors == 0 {
                anyhow::bail!("--max-colors must be between 1 and 5");
            }
            builder = builder.max_colors(max_colors);
        }
        Ok(builder.build()?)
    }

    /// Session for the user named by `--user` or `PALETTEGEN_USER`
    pub(crate) fn session_from_cli(cli: &Cli) -> SessionContext {
        Self::session_from(
            cli.user.clone().or_else(|| std::env::var(ENV_USER).ok()),
            cli.user_name
                .clone()
                .or_else(|| std::env::var(ENV_USER_NAME).ok()),
        )
    }

    fn session_from(user: Option<String>, display_name: Option<String>) -> SessionContext {
        match user.filter(|id| !id.trim().is_empty()) {
            Some(id) => {
                let mut user = CurrentUser::new(id.trim());
                user.display_name = display_name;
                SessionContext::signed_in(user)
            },
            None => SessionContext::anonymous(),
        }
    }
}
