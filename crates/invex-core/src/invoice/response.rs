//! Turning the model's free-text reply into structured data.

use serde_json::Value;
use tracing::{debug, warn};

use crate::models::config::{ExtractionConfig, PayloadStrategy};
use crate::models::invoice::{ExtractionError, InvoiceRecord, StructuredData};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Parse a model reply. Never fails: unparseable output becomes
/// [`StructuredData::Error`] carrying `raw` unchanged.
pub fn parse_response(raw: &str, config: &ExtractionConfig) -> StructuredData {
    let content = raw.trim();

    let parsed = match config.payload_strategy {
        PayloadStrategy::FenceSplit => parse_json(strip_code_fence(content)),
        PayloadStrategy::Balanced => match find_balanced_object(content).map(parse_json) {
            Some(Ok(value)) => Ok(value),
            _ => {
                debug!("No parseable balanced object, falling back to fence split");
                parse_json(strip_code_fence(content))
            }
        },
    };

    let value = match parsed {
        Ok(value) => value,
        Err(e) => {
            warn!("Model reply is not valid JSON: {}", e);
            return failure(format!("Failed to parse JSON: {}", e), raw);
        }
    };

    if config.validate_schema {
        if let Err(reason) = InvoiceRecord::check_shape(&value) {
            warn!("Model reply has the wrong shape: {}", reason);
            return failure(format!("Invalid invoice schema: {}", reason), raw);
        }
    }

    StructuredData::Record(value)
}

/// Remove a leading code fence from trimmed model output.
///
/// A reply starting with ```` ```json ```` yields the text after that marker
/// up to the next ```` ``` ````. A reply starting with a bare ```` ``` ````
/// yields the text between the first two fences. Anything else is returned
/// as is. A language tag other than `json` stays in the payload.
pub fn strip_code_fence(content: &str) -> &str {
    if content.starts_with(JSON_FENCE) {
        content
            .split(JSON_FENCE)
            .nth(1)
            .and_then(|rest| rest.split(FENCE).next())
            .unwrap_or("")
            .trim()
    } else if content.starts_with(FENCE) {
        content.split(FENCE).nth(1).unwrap_or("").trim()
    } else {
        content
    }
}

/// Find the first `{` and its matching `}`, skipping braces inside strings.
pub fn find_balanced_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in content[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

fn parse_json(payload: &str) -> serde_json::Result<Value> {
    serde_json::from_str(payload)
}

fn failure(error: String, raw: &str) -> StructuredData {
    StructuredData::Error(ExtractionError {
        error,
        raw_response: raw.to_string(),
    })
}
