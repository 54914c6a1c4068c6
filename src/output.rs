use std::{
    env,
    io::{self, Write},
    process::{Command, Stdio},
};

use is_terminal::IsTerminal;
use terminal_size::{terminal_size, Height, Width};
use tracing::{debug, warn};

use crate::error::{Error, Result};

const FALLBACK_WIDTH: usize = 80;
const DEFAULT_PAGER: &str = "less -r";

pub fn terminal_width() -> usize {
    match terminal_size() {
        Some((Width(width), _)) => usize::from(width),
        None => FALLBACK_WIDTH,
    }
}

pub fn terminal_height() -> Option<usize> {
    terminal_size().map(|(_, Height(height))| usize::from(height))
}

/// Print `text`, or page it when it does not fit on the terminal.
pub fn display(text: &str) -> Result<()> {
    let stdout = io::stdout();
    if stdout.is_terminal() {
        if let Some(height) = terminal_height() {
            if text.lines().count() > height {
                match page(text) {
                    Ok(()) => return Ok(()),
                    Err(error) => warn!("pager failed, printing instead: {error}"),
                }
            }
        }
    }

    let mut stdout = stdout.lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn page(text: &str) -> Result<()> {
    let command = env::var("PAGER")
        .ok()
        .filter(|pager| !pager.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PAGER.to_string());
    let words = shell_words::split(&command)?;
    let Some((program, args)) = words.split_first() else {
        return Ok(());
    };
    debug!(%program, ?args, "paging output");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|source| Error::Command {
            program: program.clone(),
            source,
        })?;
    if let Some(mut stdin) = child.stdin.take() {
        // the pager may quit before reading everything
        match stdin.write_all(text.as_bytes()) {
            Err(error) if error.kind() == io::ErrorKind::BrokenPipe => {}
            other => other?,
        }
    }
    child.wait()?;
    Ok(())
}
