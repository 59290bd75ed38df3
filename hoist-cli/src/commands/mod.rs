pub mod config;
pub mod delete;
pub mod push;

use std::io::{BufRead, Write};

/// Ask a `[y/N]` question on stdout and read the answer from stdin.
///
/// Anything other than `y`/`yes` (case-insensitive) is "no".
pub(crate) fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N]: ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
