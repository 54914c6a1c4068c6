//! Raw records from the scheduler's `-o "%all"` listings.

use std::{fs, path::Path, process::Command};

use tracing::debug;

use crate::error::{Error, Result};

/// Field name and value, both trimmed, in column order.
pub type RawRow = Vec<(String, String)>;

/// Split a `|`-separated listing whose first line names the fields.
pub fn parse_table(text: &str) -> Vec<RawRow> {
    let mut lines = text.lines();
    let Some(head) = lines.next() else {
        return Vec::new();
    };
    let head: Vec<&str> = head.split('|').map(str::trim).collect();

    lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            head.iter()
                .zip(line.split('|'))
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.trim().to_string()))
                .collect()
        })
        .collect()
}

/// Run `program` and return what it printed.
pub fn run(program: &str, args: &[&str]) -> Result<String> {
    debug!(program, ?args, "running");
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| Error::Command {
            program: program.to_string(),
            source,
        })?;
    if !output.status.success() {
        return Err(Error::CommandStatus {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub fn squeue_all() -> Result<String> {
    run("squeue", &["-o", "%all"])
}

pub fn sinfo_all() -> Result<String> {
    run("sinfo", &["-o", "%all"])
}

/// A saved listing, in place of calling the scheduler.
pub fn read_file(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "reading listing");
    Ok(fs::read_to_string(path)?)
}
