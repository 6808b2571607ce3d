//! CLI route: single route table and run context.

use crate::cli::parse::Commands;
use crate::cli::presentation::{format_menu_state, format_page};
use crate::config::{ConfigLoader, ExtensionConfig};
use crate::error::ExtensionError;
use crate::hash::hash_text;
use crate::runtime::Simulation;
use crate::types::{CENSOR_ITEM_ID, UNCENSOR_ITEM_ID};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::debug;

/// Runtime context for CLI execution
pub struct RunContext {
    config: ExtensionConfig,
    color: bool,
}

impl RunContext {
    /// Load configuration from the global file and an optional explicit file.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ExtensionError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        let color = config.logging.color;
        Ok(Self { config, color })
    }

    pub fn from_config(config: ExtensionConfig) -> Self {
        Self {
            color: config.logging.color,
            config,
        }
    }

    /// Disable ANSI color in rendered output
    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }

    pub async fn execute(&self, command: &Commands) -> Result<String, ExtensionError> {
        match command {
            Commands::Hash { text } => Ok(hash_text(text).to_string()),
            Commands::Simulate {
                page,
                select,
                no_uncensor,
            } => self.simulate(page, select, *no_uncensor).await,
            Commands::Config => toml::to_string_pretty(&self.config).map_err(|e| {
                ExtensionError::ConfigError(format!("Failed to render config: {}", e))
            }),
        }
    }

    async fn simulate(
        &self,
        page: &str,
        select: &str,
        no_uncensor: bool,
    ) -> Result<String, ExtensionError> {
        let mut sim = Simulation::start(&self.config, page).await?;
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "[start]\n{}\n{}",
            format_page(&sim.document, self.color),
            format_menu_state(&sim.browser)
        );

        sim.click(CENSOR_ITEM_ID, Some(select)).await?;
        let hash_id = hash_text(select);
        let _ = writeln!(
            out,
            "[censor] hashId={}\n{}",
            hash_id,
            format_page(&sim.document, self.color)
        );

        let Some(target) = sim.document.marks().first().map(|mark| mark.id) else {
            let _ = writeln!(out, "no occurrences of {:?} on the page", select);
            return Ok(out.trim_end().to_string());
        };

        sim.hover(target).await?;
        let _ = writeln!(
            out,
            "[hover {}] target={:?}\n{}",
            target,
            sim.background.router.target_hash(),
            format_menu_state(&sim.browser)
        );

        if !no_uncensor {
            sim.click(UNCENSOR_ITEM_ID, None).await?;
            let _ = writeln!(out, "[uncensor]\n{}", format_page(&sim.document, self.color));
        }

        debug!(native_calls = sim.browser.calls().len(), "Simulation finished");
        Ok(out.trim_end().to_string())
    }
}
