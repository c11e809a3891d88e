//! Recovery of JSON payloads from free-form model replies.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::debug;

use crate::error::AiError;

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n?(.*?)```").unwrap());
static VALUE_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\{\[]").unwrap());

/// Parse a model reply as `T`.
///
/// The reply is first parsed as-is. If that fails, a JSON candidate is
/// extracted from a fenced code block or from the first bracket that starts a
/// complete JSON value, and parsed once more.
///
/// # Errors
///
/// Returns `AiError::MalformedResponse` when neither attempt yields a `T`.
pub fn parse_json_response<T: DeserializeOwned>(text: &str) -> Result<T, AiError> {
    let strict_error = match serde_json::from_str::<T>(text.trim()) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    debug!(error = %strict_error, len = text.len(), "strict JSON parse failed, extracting");

    let Some(candidate) = extract_json(text) else {
        return Err(AiError::MalformedResponse(strict_error.to_string()));
    };
    serde_json::from_str(candidate).map_err(|err| AiError::MalformedResponse(err.to_string()))
}

/// Locate the JSON text inside a reply, preferring a fenced code block.
#[must_use]
pub fn extract_json(text: &str) -> Option<&str> {
    let fenced = FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|body| !body.is_empty());
    if fenced.is_some() {
        return fenced;
    }
    VALUE_START.find_iter(text).find_map(|start| {
        let rest = &text[start.start()..];
        let mut values = serde_json::Deserializer::from_str(rest).into_iter::<IgnoredAny>();
        match values.next() {
            Some(Ok(_)) => Some(&rest[..values.byte_offset()]),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::{Value, json};

    #[test]
    fn fenced_json_block_is_recovered() {
        let reply = "```json\n{\"a\":1}\n```";
        assert_eq!(extract_json(reply), Some("{\"a\":1}"));
        let value: Value = parse_json_response(reply).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn unlabelled_fence_is_recovered() {
        let value: Value = parse_json_response("Sure!\n```\n[1, 2]\n```\nDone.").unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn bare_array_in_prose_is_recovered() {
        let reply = "Here are your questions: [{\"question\":\"q\"}] hope this helps";
        let value: Value = parse_json_response(reply).unwrap();
        assert_eq!(value, json!([{"question": "q"}]));
    }

    #[test]
    fn bare_object_in_prose_is_recovered() {
        #[derive(Debug, Deserialize)]
        struct Reply {
            level: String,
        }
        let reply: Reply = parse_json_response("Result: {\"level\": \"B1\"}.").unwrap();
        assert_eq!(reply.level, "B1");
    }

    #[test]
    fn strict_json_is_parsed_directly() {
        let value: Value = parse_json_response("  {\"ok\": true}\n").unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[test]
    fn text_without_json_is_malformed() {
        let err = parse_json_response::<Value>("I cannot help with that.").unwrap_err();
        assert!(matches!(err, AiError::MalformedResponse(_)));
    }

    #[test]
    fn broken_candidate_is_malformed() {
        let err = parse_json_response::<Value>("```json\n{\"a\": }\n```").unwrap_err();
        assert!(matches!(err, AiError::MalformedResponse(_)));
    }

    #[test]
    fn bracket_in_prose_before_json_is_skipped() {
        let reply = "[Note] result: {\"a\":1} (end)";
        assert_eq!(extract_json(reply), Some("{\"a\":1}"));
        let value: Value = parse_json_response(reply).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }
}
