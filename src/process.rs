//! Shared subprocess execution for the external tools we orchestrate.

use std::ffi::OsString;
use std::process::{Command, Output};

use tracing::debug;

use crate::{Error, Result};

/// How much trailing stderr we keep when a command fails.
const STDERR_TAIL_BYTES: usize = 2048;

/// Run `program` with `args`, capturing output.
///
/// A missing executable surfaces as [`Error::CommandMissing`]; a non-zero
/// exit becomes [`Error::CommandFailed`] carrying the tail of stderr.
pub fn run(program: &str, args: &[OsString]) -> Result<Output> {
    debug!(command = program, ?args, "spawning");

    let output = Command::new(program).args(args).output().map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::CommandMissing {
                command: program.to_owned(),
            }
        } else {
            Error::from(err)
        }
    })?;

    if !output.status.success() {
        return Err(Error::CommandFailed {
            command: program.to_owned(),
            status: output.status.code().unwrap_or(-1),
            stderr_tail: tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_BYTES),
        });
    }

    Ok(output)
}

/// Keep at most `limit` trailing bytes of `text`, snapped to a char boundary.
fn tail(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.trim().to_owned();
    }
    let mut start = text.len() - limit;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].trim().to_owned()
}
