//! Operator prompts on the console.
//!
//! Prompts take their input and output streams as arguments so they can be
//! driven from tests.

use anyhow::{anyhow, Result};
use std::io::{BufRead, Write};

use crate::region::Region;

/// Reads one line, failing when the input is closed.
fn read_answer<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(anyhow!("Input closed while waiting for an answer"));
    }
    Ok(line.trim().to_lowercase())
}

/// Asks whether the saved region should be reused.
///
/// Repeats the question until the answer is `y` or `n`.
pub fn confirm_reuse<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    region: &Region,
) -> Result<bool> {
    loop {
        write!(output, "📂 Found saved region {}. Use it? (y/n): ", region)?;
        output.flush()?;

        match read_answer(input)?.as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => writeln!(output, "Please answer 'y' or 'n'.")?,
        }
    }
}

/// Asks the operator to accept a freshly marked region.
///
/// An empty answer accepts it, `r` starts the selection again.
pub fn confirm_selection<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    region: &Region,
) -> Result<bool> {
    loop {
        write!(
            output,
            "✅ Selected region {}. Press Enter to accept or type 'r' to redo: ",
            region
        )?;
        output.flush()?;

        match read_answer(input)?.as_str() {
            "" => return Ok(true),
            "r" => return Ok(false),
            _ => writeln!(output, "Press Enter or type 'r'.")?,
        }
    }
}
