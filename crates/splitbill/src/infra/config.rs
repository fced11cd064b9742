//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".splitbill/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub report: Report,
    #[serde(default)]
    pub keybindings: Keybindings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Tax percentage prefilled into the form.
    #[serde(default)]
    pub tax_rate: Option<f64>,
    #[serde(default = "Defaults::default_report_format")]
    pub report_format: String,
}

impl Defaults {
    fn default_report_format() -> String {
        "plain".into()
    }

    pub fn report_format(&self) -> &str {
        &self.report_format
    }

    pub fn tax_rate(&self) -> f64 {
        self.tax_rate.unwrap_or(0.0)
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            tax_rate: None,
            report_format: Self::default_report_format(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Report {
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    include_timestamp: Option<bool>,
}

impl Report {
    fn default_template() -> &'static str {
        "plain_summary"
    }

    fn default_include_timestamp() -> bool {
        true
    }

    /// Built-in template name or a path to a template file.
    pub fn template(&self) -> String {
        self.template
            .clone()
            .unwrap_or_else(|| Self::default_template().to_owned())
    }

    /// Whether a template other than the built-in plain summary is configured.
    pub fn has_custom_template(&self) -> bool {
        self.template
            .as_deref()
            .is_some_and(|name| name != Self::default_template())
    }

    pub fn include_timestamp(&self) -> bool {
        self.include_timestamp
            .unwrap_or_else(Self::default_include_timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keybindings {
    #[serde(default = "Keybindings::default_add")]
    pub add: String,
    #[serde(default = "Keybindings::default_edit")]
    pub edit: String,
    #[serde(default = "Keybindings::default_calculate")]
    pub calculate: String,
    #[serde(default = "Keybindings::default_copy")]
    pub copy: String,
}

impl Keybindings {
    fn default_add() -> String {
        "a".into()
    }

    fn default_edit() -> String {
        "e".into()
    }

    fn default_calculate() -> String {
        "c".into()
    }

    fn default_copy() -> String {
        "y".into()
    }
}

impl Default for Keybindings {
    fn default() -> Self {
        Self {
            add: Self::default_add(),
            edit: Self::default_edit(),
            calculate: Self::default_calculate(),
            copy: Self::default_copy(),
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    tax_rate: Option<String>,
    report_format: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            tax_rate: env::var("SPLITBILL_TAX_RATE").ok(),
            report_format: env::var("SPLITBILL_REPORT_FORMAT").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(tax_rate: &str, report_format: &str) -> Self {
        Self {
            tax_rate: Some(tax_rate.to_owned()),
            report_format: Some(report_format.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    /// Load the defaults plus a single explicit file, still honouring env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_from_with(path, EnvOverrides::from_env())
    }

    fn load_from_with(path: &Path, env_overrides: EnvOverrides) -> Result<Self> {
        let base = Self::from_str(&DEFAULT_CONFIG)?;
        Ok(apply_env_overrides(
            base.merge(Self::from_file(path)?),
            env_overrides,
        ))
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading global config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            report: merge_report(self.report, other.report),
            keybindings: merge_keybindings(self.keybindings, other.keybindings),
        }
    }
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        tax_rate: overlay.tax_rate.or(base.tax_rate),
        report_format: if overlay.report_format != Defaults::default_report_format() {
            overlay.report_format
        } else {
            base.report_format
        },
    }
}

fn merge_report(mut base: Report, overlay: Report) -> Report {
    if let Some(value) = overlay.template {
        base.template = Some(value);
    }
    if let Some(value) = overlay.include_timestamp {
        base.include_timestamp = Some(value);
    }
    base
}

fn merge_keybindings(base: Keybindings, overlay: Keybindings) -> Keybindings {
    Keybindings {
        add: choose_keybinding(base.add, overlay.add, Keybindings::default_add),
        edit: choose_keybinding(base.edit, overlay.edit, Keybindings::default_edit),
        calculate: choose_keybinding(
            base.calculate,
            overlay.calculate,
            Keybindings::default_calculate,
        ),
        copy: choose_keybinding(base.copy, overlay.copy, Keybindings::default_copy),
    }
}

fn choose_keybinding(base: String, overlay: String, default_fn: fn() -> String) -> String {
    if overlay != default_fn() {
        overlay
    } else {
        base
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("splitbill/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    Ok(Some(cwd.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

/// A non-numeric `SPLITBILL_TAX_RATE` is logged and left out; the file layers still apply.
fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(tax_rate) = env.tax_rate {
        match tax_rate.trim().parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => config.defaults.tax_rate = Some(parsed),
            _ => tracing::warn!(value = %tax_rate, "ignoring SPLITBILL_TAX_RATE, not a number"),
        }
    }
    if let Some(report_format) = env.report_format {
        config.defaults.report_format = report_format;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_no_files() {
        let config = Config::load_with_layers(None, None, EnvOverrides::default())
            .expect("load default config");
        assert_eq!(config.defaults.tax_rate(), 0.0);
        assert_eq!(config.defaults.report_format, "plain");
        assert_eq!(config.report.template(), "plain_summary");
        assert!(config.report.include_timestamp());
        assert_eq!(config.keybindings.add, "a");
    }

    #[test]
    fn merge_global_and_workspace() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
[defaults]
tax_rate = 11.0
[keybindings]
add = "n"
"#,
        )?;

        let workspace_dir = temp.path().join("dinner");
        fs::create_dir_all(workspace_dir.join(".splitbill"))?;
        fs::write(
            workspace_dir.join(".splitbill/config.toml"),
            r#"
[defaults]
report_format = "markdown"
[report]
include_timestamp = false
"#,
        )?;

        let config = Config::load_with_layers(
            Some(global),
            Some(workspace_dir.join(".splitbill/config.toml")),
            EnvOverrides::default(),
        )?;

        assert_eq!(config.defaults.tax_rate(), 11.0);
        assert_eq!(config.defaults.report_format, "markdown");
        assert!(!config.report.include_timestamp());
        assert_eq!(config.report.template(), "plain_summary");
        assert_eq!(config.keybindings.add, "n");
        assert_eq!(config.keybindings.copy, "y");

        Ok(())
    }

    #[test]
    fn workspace_can_reset_tax_to_zero() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("global.toml");
        let workspace = temp.path().join("workspace.toml");
        fs::write(&global, "[defaults]\ntax_rate = 10.0\n[report]\ninclude_timestamp = false\n")?;
        fs::write(&workspace, "[defaults]\ntax_rate = 0.0\n")?;

        let config =
            Config::load_with_layers(Some(global), Some(workspace), EnvOverrides::default())?;
        assert_eq!(config.defaults.tax_rate(), 0.0);
        assert!(!config.report.include_timestamp());
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides::for_tests("7.5", "json");
        let config = Config::load_with_layers(None, None, overrides)?;
        assert_eq!(config.defaults.tax_rate(), 7.5);
        assert_eq!(config.defaults.report_format, "json");
        Ok(())
    }

    #[test]
    fn non_numeric_env_tax_is_ignored() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("config.toml");
        fs::write(&file, "[defaults]\ntax_rate = 10.0\n")?;

        let config = Config::load_from_with(&file, EnvOverrides::for_tests("lots", "plain"))?;
        assert_eq!(config.defaults.tax_rate(), 10.0);

        let overrides = EnvOverrides::for_tests("inf", "plain");
        let config = Config::load_with_layers(None, None, overrides)?;
        assert_eq!(config.defaults.tax_rate(), 0.0);
        Ok(())
    }

    #[test]
    fn invalid_config_returns_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        let result = Config::from_file(&file);
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn explicit_file_layers_over_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("custom.toml");
        fs::write(&file, "[report]\ntemplate = \"markdown_summary\"\n")?;
        let config = Config::load_from_with(&file, EnvOverrides::default())?;
        assert_eq!(config.report.template(), "markdown_summary");
        assert!(config.report.has_custom_template());
        Ok(())
    }
}
