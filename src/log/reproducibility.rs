/// Reproducibility log
///
/// Every step applied to the spectra of a run is recorded with its
/// timestamp, a description and the parameter values used. The log also
/// keeps the exact command line, so it can be exported as:
/// - Human-readable text
/// - JSON
/// - Executable shell script that re-runs the same command

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::io;
use std::path::Path;

/// One recorded step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// 1-based position in the log
    pub sequence: usize,
    pub timestamp: DateTime<Local>,
    pub operation: String,
    pub description: String,
    /// Parameter values, `key=value` separated by spaces
    pub parameters: String,
}

impl LogEntry {
    pub fn to_text(&self) -> String {
        format!(
            "[{:03}] {} | {} | {}\n      Parameters: {}",
            self.sequence,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.operation,
            self.description,
            if self.parameters.is_empty() {
                "(none)"
            } else {
                &self.parameters
            }
        )
    }

    pub fn to_comment(&self) -> String {
        if self.parameters.is_empty() {
            format!("# Step {}: {}: {}", self.sequence, self.operation, self.description)
        } else {
            format!(
                "# Step {}: {}: {}\n#   {}",
                self.sequence, self.operation, self.description, self.parameters
            )
        }
    }
}

/// Ordered record of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReproLog {
    pub session_id: String,
    pub session_start: DateTime<Local>,
    /// Input files, in the order given
    pub sources: Vec<String>,
    pub software_version: String,
    /// Command line the run was started with, shell-quoted
    pub command_line: String,
    pub entries: Vec<LogEntry>,
}

impl ReproLog {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            session_start: Local::now(),
            sources: Vec::new(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            command_line: String::new(),
            entries: Vec::new(),
        }
    }

    /// Record the program arguments, quoting any that need it. Arguments
    /// that are not valid Unicode are kept lossily.
    pub fn set_command_line<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.command_line = args
            .into_iter()
            .map(|a| shell_quote(&a.as_ref().to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ");
    }

    pub fn add_source(&mut self, source: &str) {
        self.sources.push(source.to_string());
    }

    pub fn add_entry(&mut self, operation: &str, description: &str, parameters: &str) {
        let seq = self.entries.len() + 1;
        self.entries.push(LogEntry {
            sequence: seq,
            timestamp: Local::now(),
            operation: operation.to_string(),
            description: description.to_string(),
            parameters: parameters.to_string(),
        });
        log::info!("[LOG {:03}] {}: {}", seq, operation, description);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("═══════════════════════════════════════════════════════════════\n");
        out.push_str("  Raman Processing Reproducibility Log\n");
        out.push_str("═══════════════════════════════════════════════════════════════\n");
        out.push_str(&format!("  Session ID:  {}\n", self.session_id));
        out.push_str(&format!(
            "  Started:     {}\n",
            self.session_start.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("  Sources:     {}\n", self.sources.join(", ")));
        out.push_str(&format!("  Software:    raman-tl v{}\n", self.software_version));
        out.push_str(&format!("  Command:     {}\n", self.command_line));
        out.push_str(&format!("  Operations:  {}\n", self.entries.len()));
        out.push_str("───────────────────────────────────────────────────────────────\n\n");

        for entry in &self.entries {
            out.push_str(&entry.to_text());
            out.push_str("\n\n");
        }

        out.push_str("═══════════════════════════════════════════════════════════════\n");
        out.push_str(&format!(
            "  Log exported: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str("═══════════════════════════════════════════════════════════════\n");
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Shell script that repeats the run; the recorded steps are comments.
    pub fn to_shell_script(&self) -> String {
        let mut out = String::new();
        out.push_str("#!/bin/bash\n");
        out.push_str("#\n");
        out.push_str("# Raman Processing Reproducibility Script\n");
        out.push_str(&format!("# Generated by raman-tl v{}\n", self.software_version));
        out.push_str(&format!(
            "# Session: {} ({})\n",
            self.session_id,
            self.session_start.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str("#\n");
        for entry in &self.entries {
            out.push_str(&entry.to_comment());
            out.push('\n');
        }
        out.push_str("#\n");
        out.push_str("set -euo pipefail\n\n");
        out.push_str(&self.command_line);
        out.push('\n');
        out
    }

    pub fn save_text(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_text())
    }

    pub fn save_json(&self, path: &Path) -> io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    pub fn save_script(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_shell_script())?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
        }
        Ok(())
    }
}

impl Default for ReproLog {
    fn default() -> Self {
        Self::new()
    }
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
