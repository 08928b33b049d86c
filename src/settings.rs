use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::parser::document::{DEFAULT_CONTENT_SELECTOR, DEFAULT_TITLE_SELECTOR};
use crate::parser::PageLayout;

const ENV_PREFIX: &str = "ANTV_SCHEMA";
const DEFAULT_CONFIG_NAME: &str = "antv_schema";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
    pub manifest_file: String,
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
    pub title_selector: String,
    pub content_selector: String,
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Default)]
pub struct Overrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl Settings {
    /// Defaults, then the config file, then `ANTV_SCHEMA_*` variables, then
    /// command-line overrides. An explicit `config_file` must exist.
    pub fn load(config_file: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        Config::builder()
            .set_default("input_dir", "resources/g2plot.antv.vision/zh/docs/api/plots")?
            .set_default("output_dir", "var/tmp/schema")?
            .set_default("log_dir", "var/log")?
            .set_default("manifest_file", "index.ts")?
            .set_default("title_selector", DEFAULT_TITLE_SELECTOR)?
            .set_default("content_selector", DEFAULT_CONTENT_SELECTOR)?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .set_override_option("input_dir", overrides.input_dir.map(path_value))?
            .set_override_option("output_dir", overrides.output_dir.map(path_value))?
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn layout(&self) -> Result<PageLayout> {
        PageLayout::new(&self.title_selector, &self.content_selector)
    }
}

fn path_value(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}
