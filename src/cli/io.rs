//! JSON output for one-shot commands
//!
//! Success: `{"status": "ok", "data": ...}` on stdout, one line.

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

pub fn write_response(data: Value) -> CliResult<()> {
    write_response_to(&mut io::stdout(), data)
}

pub(crate) fn write_response_to<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}
