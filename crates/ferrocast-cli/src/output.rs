use std::io::{self, Write};

use serde_json::Value;

use crate::error::CliError;

pub fn render(payload: &Value, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    write_payload(&mut stdout.lock(), payload, pretty)
}

fn write_payload<W: Write>(writer: &mut W, payload: &Value, pretty: bool) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    writeln!(writer, "{text}")?;
    writer.flush()?;
    Ok(())
}
