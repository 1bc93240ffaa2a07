//! Turning a command-line argument into MessagePack bytes.

use std::fs;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;

/// Resolve an argument to the bytes of an object.
///
/// The argument is first tried as standard base64. Failing that it is a file
/// path; a file whose trimmed content is base64 text is decoded, anything
/// else is taken as raw MessagePack.
pub fn get_binary(arg: &str) -> anyhow::Result<Vec<u8>> {
    if let Ok(bytes) = STANDARD.decode(arg) {
        debug!(bytes = bytes.len(), "decoded argument as base64");
        return Ok(bytes);
    }

    let content = fs::read(arg)
        .with_context(|| format!("{arg:?} is neither base64 nor a readable file"))?;

    if let Ok(text) = std::str::from_utf8(&content) {
        if let Ok(bytes) = STANDARD.decode(text.trim()) {
            debug!(path = arg, bytes = bytes.len(), "decoded file content as base64");
            return Ok(bytes);
        }
    }

    debug!(path = arg, bytes = content.len(), "read raw file content");
    Ok(content)
}
