//! Rendering a calculated split into a shareable report.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::app::currency::format_currency;
use crate::domain::model::{CalculationResult, PersonResult, Totals};
use crate::infra::clipboard::{Clipboard, CopiedVia};
use crate::infra::config::Config;

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// Plain text summary.
    Plain,
    /// Markdown table.
    Markdown,
    /// Machine readable JSON.
    Json,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Plain => "plain",
            ReportFormat::Markdown => "markdown",
            ReportFormat::Json => "json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Plain => "txt",
            ReportFormat::Markdown => "md",
            ReportFormat::Json => "json",
        }
    }

    fn builtin_template(&self) -> Option<&'static str> {
        match self {
            ReportFormat::Plain => Some(PLAIN_TEMPLATE_NAME),
            ReportFormat::Markdown => Some(MARKDOWN_TEMPLATE_NAME),
            ReportFormat::Json => None,
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportFormatParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" | "txt" => Ok(ReportFormat::Plain),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            other => Err(ReportFormatParseError::UnknownFormat(other.to_string())),
        }
    }
}

/// Error returned when parsing a [`ReportFormat`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ReportFormatParseError {
    #[error("unknown report format '{0}'")]
    UnknownFormat(String),
}

/// Runtime options controlling report output.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub format: ReportFormat,
    /// Template name or path overriding the format's built-in template.
    pub template: Option<String>,
    pub include_timestamp: bool,
    pub output_path: Option<PathBuf>,
    pub copy_to_clipboard: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: ReportFormat::Plain,
            template: None,
            include_timestamp: true,
            output_path: None,
            copy_to_clipboard: false,
        }
    }
}

impl ReportOptions {
    /// Build options from configuration defaults.
    pub fn from_config(config: &Config) -> Self {
        let format = match <ReportFormat as FromStr>::from_str(config.defaults.report_format()) {
            Ok(format) => format,
            Err(err) => {
                tracing::warn!(error = %err, "falling back to plain reports");
                ReportFormat::Plain
            }
        };
        Self {
            format,
            template: config
                .report
                .has_custom_template()
                .then(|| config.report.template()),
            include_timestamp: config.report.include_timestamp(),
            output_path: None,
            copy_to_clipboard: false,
        }
    }

    fn template_name(&self) -> Option<&str> {
        self.template
            .as_deref()
            .or_else(|| self.format.builtin_template())
    }
}

/// Result of a report export.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub rendered: String,
    pub output_path: Option<PathBuf>,
    /// Set when the report went to a clipboard.
    pub copied_via: Option<CopiedVia>,
}

/// Renders calculations and delivers them to files or the clipboard.
pub struct ReportRenderer {
    env: Environment<'static>,
    clipboard: Mutex<Option<Clipboard>>,
}

impl ReportRenderer {
    /// Create a renderer with the built-in templates loaded.
    pub fn new() -> Result<Self> {
        Ok(Self {
            env: default_environment()?,
            clipboard: Mutex::new(None),
        })
    }

    /// Render `result` into a string according to `options`.
    pub fn render(&self, result: &CalculationResult, options: &ReportOptions) -> Result<String> {
        let context = build_template_context(result, options)?;

        if options.format == ReportFormat::Json && options.template.is_none() {
            let report = JsonReport {
                generated_at: context.generated_at.as_deref(),
                tax_rate: context.tax_rate,
                people: &context.people,
                totals: &context.totals,
            };
            return serde_json::to_string_pretty(&report)
                .context("failed to serialize report as JSON");
        }

        let template_name = options
            .template_name()
            .ok_or_else(|| anyhow!("no template for {} reports", options.format.as_str()))?;
        self.render_with_template(&context, template_name)
    }

    /// Render the report and write/copy it according to `options`.
    pub fn export(
        &self,
        result: &CalculationResult,
        options: &ReportOptions,
    ) -> Result<ReportOutcome> {
        let rendered = self.render(result, options)?;

        if let Some(path) = &options.output_path {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create report directory: {}", parent.display())
                })?;
            }
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }

        let copied_via = if options.copy_to_clipboard {
            let mut guard = self
                .clipboard
                .lock()
                .map_err(|_| anyhow!("clipboard lock poisoned"))?;
            let via = guard
                .get_or_insert_with(Clipboard::new)
                .copy(&rendered)
                .context("failed to copy report to clipboard")?;
            Some(via)
        } else {
            None
        };

        Ok(ReportOutcome {
            rendered,
            output_path: options.output_path.clone(),
            copied_via,
        })
    }

    fn render_with_template(
        &self,
        context: &TemplateContext,
        template_name: &str,
    ) -> Result<String> {
        if let Ok(template) = self.env.get_template(template_name) {
            return template
                .render(context)
                .map_err(|err| anyhow!("failed to render template '{template_name}': {err}"));
        }

        let template_path = Path::new(template_name);
        if template_path.exists() {
            let source = fs::read_to_string(template_path).with_context(|| {
                format!("failed to load template from {}", template_path.display())
            })?;
            let mut env = configured_environment();
            env.add_template("external", &source)
                .map_err(|err| anyhow!("invalid template '{template_name}': {err}"))?;
            return env
                .get_template("external")
                .and_then(|template| template.render(context))
                .map_err(|err| anyhow!("failed to render template '{template_name}': {err}"));
        }

        Err(anyhow!(
            "template '{template_name}' not found (built-in or filesystem)"
        ))
    }
}

const PLAIN_TEMPLATE_NAME: &str = "plain_summary";
const MARKDOWN_TEMPLATE_NAME: &str = "markdown_summary";

fn configured_environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_filter("currency", currency_filter);
    env
}

fn default_environment() -> Result<Environment<'static>> {
    let mut env = configured_environment();
    env.add_template(PLAIN_TEMPLATE_NAME, DEFAULT_PLAIN_TEMPLATE)
        .map_err(|err| anyhow!("failed to register plain template: {err}"))?;
    env.add_template(MARKDOWN_TEMPLATE_NAME, DEFAULT_MARKDOWN_TEMPLATE)
        .map_err(|err| anyhow!("failed to register markdown template: {err}"))?;
    Ok(env)
}

fn currency_filter(value: f64) -> String {
    format_currency(value)
}

fn build_template_context(
    result: &CalculationResult,
    options: &ReportOptions,
) -> Result<TemplateContext> {
    let generated_at = if options.include_timestamp {
        Some(
            OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .context("failed to format report timestamp")?,
        )
    } else {
        None
    };

    Ok(TemplateContext {
        generated_at,
        tax_rate: result.tax_rate,
        tax_rate_display: result.tax_rate.to_string(),
        people: result.per_person.clone(),
        totals: result.totals,
        tax_total: result.totals.tax(),
    })
}

#[derive(Serialize)]
struct TemplateContext {
    generated_at: Option<String>,
    tax_rate: f64,
    tax_rate_display: String,
    people: Vec<PersonResult>,
    totals: Totals,
    tax_total: f64,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_at: Option<&'a str>,
    tax_rate: f64,
    people: &'a [PersonResult],
    totals: &'a Totals,
}

const DEFAULT_PLAIN_TEMPLATE: &str = r#"Split bill{{ " (" ~ generated_at ~ ")" if generated_at else "" }}

Tax: {{ tax_rate_display }}%
{% for person in people %}
{{ person.name }}: {{ person.bill_total|currency }} / with tax {{ person.bill_with_tax|currency }}
{% endfor %}

Total: {{ totals.bill|currency }}
Total with tax: {{ totals.with_tax|currency }}
"#;

const DEFAULT_MARKDOWN_TEMPLATE: &str = r#"# Split bill

{% if generated_at %}Generated at: {{ generated_at }}

{% endif %}
Tax: {{ tax_rate_display }}%

| Name | Bill | With tax |
| --- | ---: | ---: |
{% for person in people %}
| {{ person.name }} | {{ person.bill_total|currency }} | {{ person.bill_with_tax|currency }} |
{% endfor %}
| **Total** | **{{ totals.bill|currency }}** | **{{ totals.with_tax|currency }}** |
"#;

#[cfg(test)]
mod tests {
    use super::*;

    use crate::app::calculator::calculate;
    use crate::domain::model::Person;

    fn sample() -> CalculationResult {
        let people = vec![
            Person {
                name: "Alice".into(),
                bill_lines: "20\n30".into(),
                bill_total: 50.0,
            },
            Person {
                name: "Bob".into(),
                bill_lines: "1000".into(),
                bill_total: 1000.0,
            },
        ];
        calculate(&people, Some(10.0))
    }

    fn untimed(format: ReportFormat) -> ReportOptions {
        ReportOptions {
            format,
            include_timestamp: false,
            ..ReportOptions::default()
        }
    }

    #[test]
    fn plain_report_lists_people_and_totals() -> Result<()> {
        let renderer = ReportRenderer::new()?;
        let rendered = renderer.render(&sample(), &untimed(ReportFormat::Plain))?;

        assert!(rendered.starts_with("Split bill\n"));
        assert!(rendered.contains("Tax: 10%"));
        assert!(rendered.contains("Alice: 50.00 / with tax 55.00"));
        assert!(rendered.contains("Bob: 1,000.00 / with tax 1,100.00"));
        assert!(rendered.contains("Total: 1,050.00"));
        assert!(rendered.contains("Total with tax: 1,155.00"));
        Ok(())
    }

    #[test]
    fn markdown_report_renders_table() -> Result<()> {
        let renderer = ReportRenderer::new()?;
        let rendered = renderer.render(&sample(), &untimed(ReportFormat::Markdown))?;

        assert!(rendered.contains("| Alice | 50.00 | 55.00 |"));
        assert!(rendered.contains("| **Total** | **1,050.00** | **1,155.00** |"));
        assert!(!rendered.contains("Generated at"));
        Ok(())
    }

    #[test]
    fn json_report_carries_raw_numbers() -> Result<()> {
        let renderer = ReportRenderer::new()?;
        let rendered = renderer.render(&sample(), &untimed(ReportFormat::Json))?;
        let value: serde_json::Value = serde_json::from_str(&rendered)?;

        assert_eq!(value["tax_rate"], 10.0);
        assert_eq!(value["people"][0]["name"], "Alice");
        assert_eq!(value["totals"]["bill"], 1050.0);
        assert!(value.get("generated_at").is_none());
        Ok(())
    }

    #[test]
    fn timestamp_included_when_enabled() -> Result<()> {
        let renderer = ReportRenderer::new()?;
        let options = ReportOptions::default();
        let rendered = renderer.render(&sample(), &options)?;
        assert!(rendered.starts_with("Split bill ("));
        Ok(())
    }

    #[test]
    fn external_template_from_path() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("short.j2");
        fs::write(&path, "{{ totals.with_tax|currency }} for {{ people|length }}")?;

        let renderer = ReportRenderer::new()?;
        let mut options = untimed(ReportFormat::Plain);
        options.template = Some(path.display().to_string());
        assert_eq!(renderer.render(&sample(), &options)?, "1,155.00 for 2");
        Ok(())
    }

    #[test]
    fn unknown_template_is_an_error() -> Result<()> {
        let renderer = ReportRenderer::new()?;
        let mut options = untimed(ReportFormat::Plain);
        options.template = Some("no-such-template".into());
        assert!(renderer.render(&sample(), &options).is_err());
        Ok(())
    }

    #[test]
    fn export_writes_output_file() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let target = temp.path().join("reports/dinner.txt");

        let renderer = ReportRenderer::new()?;
        let mut options = untimed(ReportFormat::Plain);
        options.output_path = Some(target.clone());
        let outcome = renderer.export(&sample(), &options)?;

        assert_eq!(fs::read_to_string(&target)?, outcome.rendered);
        assert!(outcome.copied_via.is_none());
        Ok(())
    }

    #[test]
    fn parses_format_aliases() {
        assert_eq!("MD".parse::<ReportFormat>(), Ok(ReportFormat::Markdown));
        assert_eq!("txt".parse::<ReportFormat>(), Ok(ReportFormat::Plain));
        assert!("pdf".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn options_follow_config() {
        let mut config = Config::default();
        config.defaults.report_format = "markdown".into();
        let options = ReportOptions::from_config(&config);
        assert_eq!(options.format, ReportFormat::Markdown);
        assert_eq!(options.template_name(), Some(MARKDOWN_TEMPLATE_NAME));
    }
}
