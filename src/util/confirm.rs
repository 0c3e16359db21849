//! Confirmation prompt for destructive subcommands.

use anyhow::Result;
use std::io::{BufRead, Write};

/// Ask `prompt [y/N]` on stderr and read one line from stdin.
/// `assume_yes` (the `--yes` flag) skips the prompt.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(is_affirmative(&line))
}

fn is_affirmative(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
