pub mod login;
pub mod policy;
pub mod tenant;

use crate::error::Result;
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Ask a yes/no question on stdin; anything but "y" is a no
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    print!("\n{} {} [y/N]: ", "?".yellow().bold(), prompt);
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().eq_ignore_ascii_case("y"))
}

/// Pretty-print JSON to a file, or to stdout when no path is given
pub(crate) fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json + "\n")?;
            println!("{} Written to {}", "✓".green(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
