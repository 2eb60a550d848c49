//! JSON I/O handling for CLI
//!
//! - Input: one JSON query per line on stdin
//! - Output: one JSON response per line on stdout
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON request from stdin
pub fn read_request() -> CliResult<Value> {
    let stdin = io::stdin();
    let mut line = String::new();

    stdin.lock().read_line(&mut line)?;

    if line.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    let value: Value = serde_json::from_str(&line)?;
    Ok(value)
}

/// Read JSON requests from stdin until EOF. Blank lines are skipped.
pub fn read_requests() -> impl Iterator<Item = CliResult<Value>> {
    parse_lines(io::stdin().lock())
}

/// Parses one JSON value per line. A read failure is yielded once and ends
/// the stream; a malformed line is yielded and parsing continues.
fn parse_lines<R: BufRead>(reader: R) -> impl Iterator<Item = CliResult<Value>> {
    let mut failed = false;
    reader
        .lines()
        .map_while(move |line| {
            if failed {
                return None;
            }
            Some(match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(serde_json::from_str(&line).map_err(CliError::from)),
                Err(e) => {
                    failed = true;
                    Some(Err(CliError::from(e)))
                }
            })
        })
        .flatten()
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&success_response(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&error_response(code, message))
}

fn success_response(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

fn error_response(code: &str, message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
