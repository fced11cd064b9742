//! Clipboard integration for sharing a calculated split.

use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow, bail};

type ToolCommand = &'static [&'static str];

/// Where a copied report ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopiedVia {
    System,
    Tool(&'static str),
}

impl fmt::Display for CopiedVia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopiedVia::System => f.write_str("system clipboard"),
            CopiedVia::Tool(program) => f.write_str(program),
        }
    }
}

/// System clipboard, then the platform's copy tools for headless sessions.
pub struct Clipboard {
    system: Option<arboard::Clipboard>,
    tools: Vec<ToolCommand>,
}

impl Clipboard {
    pub fn new() -> Self {
        let system = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(err) => {
                tracing::debug!(error = %err, "system clipboard unavailable");
                None
            }
        };
        Self {
            system,
            tools: platform_tools(),
        }
    }

    #[cfg(test)]
    fn tools_only(tools: Vec<ToolCommand>) -> Self {
        Self {
            system: None,
            tools,
        }
    }

    /// Copy a rendered report. Once the system clipboard refuses, later copies go straight to
    /// the tools.
    pub fn copy(&mut self, report: &str) -> Result<CopiedVia> {
        if let Some(system) = self.system.as_mut() {
            match system.set_text(report.to_owned()) {
                Ok(()) => return Ok(CopiedVia::System),
                Err(err) => {
                    tracing::debug!(error = %err, "system clipboard refused the report");
                    self.system = None;
                }
            }
        }

        for &tool in &self.tools {
            match run_tool(tool, report) {
                Ok(program) => {
                    tracing::debug!(program, bytes = report.len(), "report copied");
                    return Ok(CopiedVia::Tool(program));
                }
                Err(err) => tracing::debug!(tool = ?tool, error = %err, "copy tool failed"),
            }
        }

        bail!("no clipboard available (tried {})", describe_tools(&self.tools))
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

fn run_tool(tool: ToolCommand, report: &str) -> Result<&'static str> {
    let (&program, args) = tool.split_first().context("copy tool has no program")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start {program}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(report.as_bytes())
            .with_context(|| format!("failed to send the report to {program}"))?;
    }

    let status = child
        .wait()
        .with_context(|| format!("{program} did not exit cleanly"))?;
    if status.success() {
        Ok(program)
    } else {
        Err(anyhow!("{program} exited with {status}"))
    }
}

fn describe_tools(tools: &[ToolCommand]) -> String {
    let mut names: Vec<&str> = vec!["system clipboard"];
    names.extend(tools.iter().filter_map(|tool| tool.first().copied()));
    names.join(", ")
}

#[cfg(target_os = "macos")]
fn platform_tools() -> Vec<ToolCommand> {
    vec![&["pbcopy"][..]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_tools() -> Vec<ToolCommand> {
    let tools: [ToolCommand; 3] = [
        &["wl-copy"],
        &["xclip", "-selection", "clipboard"],
        &["xsel", "--clipboard", "--input"],
    ];
    tools.to_vec()
}

#[cfg(target_os = "windows")]
fn platform_tools() -> Vec<ToolCommand> {
    vec![&["powershell.exe", "-NoProfile", "-Command", "Set-Clipboard"][..]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn platform_tools() -> Vec<ToolCommand> {
    Vec::new()
}
