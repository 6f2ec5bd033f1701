//! Terminal rendering of emitted units.
//! Used by every stage when echo is enabled.

use std::io::{self, IsTerminal, Write};

const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Format one emitted unit as `[stage] text`, optionally colored.
pub fn format_emission(stage: &str, text: &str, color: bool) -> String {
    if color {
        format!("{DIM}[{RESET}{CYAN}{stage}{RESET}{DIM}]{RESET} {text}")
    } else {
        format!("[{stage}] {text}")
    }
}

/// Echo one emitted unit to stderr.
pub fn render_emission(stage: &str, text: &str) {
    let stderr = io::stderr();
    let color = stderr.is_terminal();
    let mut lock = stderr.lock();
    if writeln!(lock, "{}", format_emission(stage, text, color)).is_err() {
        // stderr closed, nowhere left to echo
    }
}
