//! Webhook payload decoding and content extraction.
//!
//! Report generators deliver the same markdown in a surprising number of
//! wrappings: a JSON object with a `content` field, a wrapper field holding
//! an object, a wrapper field holding a *double-encoded* JSON string, a
//! wrapper field holding the markdown directly, or no JSON at all. The
//! extractor tries an ordered list of strategies and the first one that
//! yields non-blank content wins.
//!
//! Body framing is handled here too: hyper normally unwraps chunked
//! transfer encoding before the handler sees the body, but some forwarders
//! pass the framed bytes through verbatim with the `Transfer-Encoding`
//! header intact. When the header survived and the bytes still parse as
//! hex-size-prefixed chunks, they are unwrapped.

use axum::http::{header, HeaderMap};
use serde_json::Value;
use thiserror::Error;

/// A submission that cannot be turned into report content. Maps to a 400
/// response at the webhook; never reaches the pipeline.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("malformed chunk size line: {0:?}")]
    BadChunkSize(String),
    #[error("chunked body ended before the declared chunk length")]
    ShortStream,
    #[error("request body is empty")]
    EmptyBody,
    #[error("no content found (expected content/text_input/text/final_report_markdown, or raw markdown)")]
    NoContent,
}

/// Wrapper field names accepted at the top level, tried in order.
const WRAPPER_FIELDS: [&str; 3] = ["text_input", "text", "final_report_markdown"];

/// Content-like field names accepted inside a wrapper object.
const CONTENT_FIELDS: [&str; 3] = ["content", "text", "final_report_markdown"];

/// Unwrap the request body according to its framing.
///
/// With a surviving `Transfer-Encoding: chunked` header the body is decoded
/// as hex-size-prefixed chunks; if the bytes do not carry chunked framing
/// they are assumed to be already unwrapped by the HTTP stack and are used
/// as-is. Fixed-length bodies pass through (the listener already enforced
/// `Content-Length`).
pub fn decode_body(headers: &HeaderMap, body: &[u8]) -> Result<Vec<u8>, InputError> {
    if body.is_empty() {
        return Err(InputError::EmptyBody);
    }
    let chunked = headers
        .get(header::TRANSFER_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"));
    if chunked && looks_chunked(body) {
        return decode_chunked(body);
    }
    Ok(body.to_vec())
}

/// True if the body still carries chunked framing: its first line is a
/// plausible hex size line. Bodies the HTTP stack already unwrapped fail
/// this check and are used as-is.
fn looks_chunked(body: &[u8]) -> bool {
    let Some(nl) = body.iter().position(|&b| b == b'\n') else {
        return false;
    };
    let line = String::from_utf8_lossy(&body[..nl]);
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c.is_ascii_hexdigit())
}

/// Decode a hex-size-prefixed chunked body.
///
/// Each chunk is a hexadecimal size line, the payload bytes, and a trailing
/// line separator. A size of zero terminates the stream after consuming its
/// trailing empty line. Malformed size lines and truncated streams are fatal.
pub fn decode_chunked(raw: &[u8]) -> Result<Vec<u8>, InputError> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    loop {
        let line = read_line(raw, &mut pos)?;
        let size_text = String::from_utf8_lossy(line).trim().to_string();
        // Chunk extensions (";ext=...") are not produced by any known sender.
        let size = usize::from_str_radix(&size_text, 16)
            .map_err(|_| InputError::BadChunkSize(size_text.clone()))?;
        if size == 0 {
            // Trailing empty line after the terminal chunk; tolerate its absence.
            let _ = read_line(raw, &mut pos);
            return Ok(out);
        }
        if pos + size > raw.len() {
            return Err(InputError::ShortStream);
        }
        out.extend_from_slice(&raw[pos..pos + size]);
        pos += size;
        read_line(raw, &mut pos)?;
    }
}

/// Read one line (terminated by `\n`, optionally preceded by `\r`) starting
/// at `*pos`; advances `*pos` past the terminator.
fn read_line<'a>(raw: &'a [u8], pos: &mut usize) -> Result<&'a [u8], InputError> {
    let rest = &raw[*pos..];
    let nl = rest
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(InputError::ShortStream)?;
    let mut line = &rest[..nl];
    if line.ends_with(b"\r") {
        line = &line[..line.len() - 1];
    }
    *pos += nl + 1;
    Ok(line)
}

/// Resolve the submission body into report content.
///
/// Strategies, in order, first non-blank match wins:
/// 1. JSON object with a direct `content` string.
/// 2. Wrapper field holding an object with a content-like field.
/// 3. Wrapper field holding a string that is itself JSON with a content-like
///    field (double-encoded).
/// 4. Wrapper field holding a plain string, used verbatim.
/// 5. Body is not JSON — the whole body is the markdown.
pub fn extract_content(body: &str) -> Result<String, InputError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(InputError::EmptyBody);
    }

    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let content = match parsed {
        Some(Value::Object(map)) => {
            let direct = map
                .get("content")
                .and_then(Value::as_str)
                .map(str::to_string);
            direct
                .filter(|c| !c.trim().is_empty())
                .or_else(|| unwrap_wrapper(&map))
        }
        // A JSON scalar or array is not a recognized shape; the raw-text
        // fallback below still applies to it.
        Some(_) => Some(body.to_string()),
        None => Some(body.to_string()),
    };

    match content {
        Some(c) if !c.trim().is_empty() => Ok(c),
        _ => Err(InputError::NoContent),
    }
}

/// Strategies 2–4: look through the accepted wrapper fields.
fn unwrap_wrapper(map: &serde_json::Map<String, Value>) -> Option<String> {
    let candidate = WRAPPER_FIELDS.iter().find_map(|f| {
        map.get(*f)
            .filter(|v| v.is_object() || v.as_str().is_some_and(|s| !s.is_empty()))
    })?;

    match candidate {
        Value::Object(inner) => content_field(inner),
        Value::String(s) => {
            // Double-encoded: the wrapper value is a JSON document itself.
            if let Ok(Value::Object(inner)) = serde_json::from_str::<Value>(s) {
                content_field(&inner).or_else(|| Some(s.clone()))
            } else {
                Some(s.clone())
            }
        }
        _ => None,
    }
}

fn content_field(map: &serde_json::Map<String, Value>) -> Option<String> {
    CONTENT_FIELDS.iter().find_map(|f| {
        map.get(*f)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}
