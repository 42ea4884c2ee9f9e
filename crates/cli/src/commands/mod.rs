//! CLI command implementations.

pub mod cart;
pub mod checkout;

use std::io::Write;

/// Write one line of command output to stdout.
fn emit(line: &str) -> std::io::Result<()> {
    writeln!(std::io::stdout().lock(), "{line}")
}
