use crate::Result;
use crate::compile::{CompileError, CompileOptions, StatisticDef, default_chain, extract_definitions};
use crate::tree::ConfigNode;
use camino::Utf8Path;
use core::time::Duration;
use ohno::{EnrichableExt, IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;

/// The default configuration, embedded from `default_config.yml`
pub const DEFAULT_CONFIG_YAML: &str = include_str!("../../default_config.yml");

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Time between two collection cycles
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Text placed between the RDNs of a DN
    #[serde(default = "default_dn_separator")]
    pub dn_separator: String,

    /// Text placed between the parts of a metric name
    #[serde(default = "default_metric_separator")]
    pub metric_separator: String,

    /// Leading part of every metric name
    #[serde(default)]
    pub metric_prefix: String,

    /// Value of the `database` tag for statistics outside any per-database subtree
    #[serde(default = "default_target")]
    pub default_target: String,

    /// The declarative monitoring tree
    #[serde(default)]
    pub objects: serde_yaml::Value,
}

const fn default_poll_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_dn_separator() -> String {
    ",".to_owned()
}

fn default_metric_separator() -> String {
    "/".to_owned()
}

fn default_target() -> String {
    "default".to_owned()
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading slapd-stats configuration file '{path}'"))?;
        Self::parse(&text).map_err(|e| e.enrich_with(|| format!("loading configuration file '{path}'")))
    }

    /// Parse and validate configuration text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration
    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text).into_app_err("parsing configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Save the default configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_YAML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range
    fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(app_err!("poll_interval must be greater than zero"));
        }

        if self.dn_separator.is_empty() {
            return Err(app_err!("dn_separator must not be empty"));
        }

        Ok(())
    }

    #[must_use]
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            dn_separator: self.dn_separator.clone(),
            metric_separator: self.metric_separator.clone(),
            metric_prefix: self.metric_prefix.clone(),
        }
    }

    /// The monitoring tree as written, before compilation.
    #[must_use]
    pub fn tree(&self) -> ConfigNode {
        ConfigNode::from_yaml(&self.objects)
    }

    /// Run the standard chain over the monitoring tree.
    ///
    /// # Errors
    ///
    /// Returns an error if any stage rejects the tree
    pub fn compile_tree(&self) -> Result<ConfigNode, CompileError> {
        default_chain(&self.compile_options()).compile(&self.tree())
    }

    /// Compile the monitoring tree into the statistics to poll.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree does not compile
    pub fn compile(&self) -> Result<Vec<StatisticDef>, CompileError> {
        extract_definitions(&self.compile_tree()?, &self.default_target)
    }
}

impl Default for Config {
    fn default() -> Self {
        serde_yaml::from_str(DEFAULT_CONFIG_YAML).expect("default_config.yml should be valid YAML that deserializes to Config")
    }
}
