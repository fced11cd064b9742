use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use splitbill::app::form::BillForm;
use splitbill::app::report::{ReportFormat, ReportOptions, ReportRenderer};
use splitbill::domain::model::EntryTarget;
use splitbill::infra::config::Config;
use splitbill::ui::app::UiApp;

#[derive(Parser)]
#[command(author, version, about = "Split a shared bill, tax included", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Use this config file instead of the global and workspace ones
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate a split without opening the interactive interface
    Calc(CalcArgs),
}

#[derive(Args)]
struct CalcArgs {
    /// Person and their bill amounts, e.g. "Alice=20,30"
    #[arg(short, long = "person", value_name = "NAME=AMOUNTS", required = true)]
    people: Vec<String>,
    /// Tax percentage applied to everyone
    #[arg(short, long, allow_hyphen_values = true)]
    tax: Option<f64>,
    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,
    /// Also write the report to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Copy the report to the clipboard
    #[arg(long)]
    copy: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    splitbill::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Some(Commands::Calc(args)) => run_calc(args, &config),
        None => UiApp::new(config)?.run(),
    }
}

fn run_calc(args: CalcArgs, config: &Config) -> Result<()> {
    let mut form = BillForm::new();
    for entry in &args.people {
        let (name, bill_lines) = parse_person_arg(entry);
        let saved = form
            .upsert(name, &bill_lines, EntryTarget::New)
            .with_context(|| format!("invalid person entry '{entry}'"))?;
        for rejected in &saved.parsed.rejected {
            tracing::warn!(
                person = name.trim(),
                amount = %rejected.text,
                "amount is not a number, counted as 0"
            );
        }
    }

    form.set_tax_input(args.tax.unwrap_or(config.defaults.tax_rate()).to_string());

    let Some(result) = form.calculate() else {
        bail!("no people to split the bill between");
    };

    let mut options = ReportOptions::from_config(config);
    if let Some(format) = args.format {
        options.format = format;
    }
    options.output_path = args.output;
    options.copy_to_clipboard = args.copy;

    let renderer = ReportRenderer::new()?;
    let outcome = renderer.export(result, &options)?;
    print!("{}", outcome.rendered);
    if !outcome.rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Split `NAME=AMOUNTS` into a name and newline separated bill lines. Amounts may be separated by
/// commas or semicolons.
fn parse_person_arg(entry: &str) -> (&str, String) {
    match entry.split_once('=') {
        Some((name, amounts)) => (name, amounts.split([',', ';']).collect::<Vec<_>>().join("\n")),
        None => (entry, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn person_arg_becomes_bill_lines() {
        assert_eq!(
            parse_person_arg("Alice=20,30;5"),
            ("Alice", "20\n30\n5".to_string())
        );
        assert_eq!(parse_person_arg("Bob"), ("Bob", String::new()));
        assert_eq!(parse_person_arg("=10"), ("", "10".to_string()));
    }
}
