use std::error::Error as StdError;

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use kit_validator::Report;
use serde_json::{Map, Value};

use crate::response::{self, Problem};

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub(crate) const INTERNAL_MESSAGE: &str = "Failed to read request due to an internal error, try again";
pub(crate) const INVALID_MESSAGE: &str = "Request is not valid";

/// A request could not be read or parsed.
///
/// `Display` is the client-facing message; the underlying cause, if any, is
/// available through [`std::error::Error::source`].
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ReadError {
    status: StatusCode,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ReadError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub(crate) fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }

    pub(crate) fn too_large(limit: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Request body must not be larger than {}", human_size(limit)),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The request was well-formed but failed validation.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
    report: Report,
}

impl ValidationError {
    pub fn new(report: Report) -> Self {
        Self {
            message: INVALID_MESSAGE.to_string(),
            report,
        }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Problem for ReadError {
    fn type_uri(&self) -> &str {
        response::ABOUT_BLANK
    }

    fn title(&self) -> &str {
        self.status.canonical_reason().unwrap_or_default()
    }

    fn status(&self) -> StatusCode {
        self.status
    }

    fn detail(&self) -> &str {
        &self.message
    }
}

impl Problem for ValidationError {
    fn type_uri(&self) -> &str {
        response::ABOUT_BLANK
    }

    fn title(&self) -> &str {
        "Unprocessable Entity"
    }

    fn status(&self) -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }

    fn detail(&self) -> &str {
        &self.message
    }

    fn custom_members(&self) -> Map<String, Value> {
        let mut members = Map::new();
        match serde_json::to_value(&self.report.failed) {
            Ok(errors) => {
                members.insert("errors".to_string(), errors);
            }
            Err(err) => log::error!("Failed to encode validation errors: {}", err),
        }
        members
    }
}

impl RequestError {
    pub fn as_problem(&self) -> &(dyn Problem + Send + Sync) {
        match self {
            RequestError::Read(err) => err,
            RequestError::Validation(err) => err,
        }
    }
}

impl Problem for RequestError {
    fn type_uri(&self) -> &str {
        self.as_problem().type_uri()
    }

    fn title(&self) -> &str {
        self.as_problem().title()
    }

    fn status(&self) -> StatusCode {
        self.as_problem().status()
    }

    fn detail(&self) -> &str {
        self.as_problem().detail()
    }

    fn custom_members(&self) -> Map<String, Value> {
        self.as_problem().custom_members()
    }
}

impl ResponseError for RequestError {
    fn status_code(&self) -> StatusCode {
        Problem::status(self)
    }

    fn error_response(&self) -> HttpResponse {
        let body = response::problem_body(None, self);
        response::json_response(Problem::status(self), &body)
    }
}

/// Maps a `serde_json` failure onto a client-facing [`ReadError`].
pub(crate) fn from_json_error(err: serde_json::Error, body: &[u8]) -> ReadError {
    use serde_json::error::Category;

    let message = match err.classify() {
        Category::Eof if body.iter().all(u8::is_ascii_whitespace) => {
            "Request body must not be empty".to_string()
        }
        Category::Eof => "Request body contains badly-formed JSON".to_string(),
        Category::Syntax => format!(
            "Request body contains badly-formed JSON at offset {}",
            byte_offset(body, err.line(), err.column())
        ),
        Category::Data => data_error_message(&err),
        Category::Io => "Failed to parse request body".to_string(),
    };

    ReadError::bad_request(message).with_source(err)
}

fn data_error_message(err: &serde_json::Error) -> String {
    let text = err.to_string();
    // Drop the " at line X column Y" suffix serde_json appends.
    let text = match text.rfind(" at line ") {
        Some(idx) => &text[..idx],
        None => text.as_str(),
    };

    if let Some(rest) = text.strip_prefix("unknown field `") {
        let field = rest.split('`').next().unwrap_or_default();
        return format!("Request body contains unknown field \"{field}\"");
    }

    if let Some(rest) = text.strip_prefix("missing field `") {
        let field = rest.split('`').next().unwrap_or_default();
        return format!("Request body is missing the \"{field}\" field");
    }

    let is_type_error = ["invalid type", "invalid value", "invalid length"]
        .iter()
        .any(|prefix| text.starts_with(prefix));
    if is_type_error {
        if let Some((_, expected)) = text.rsplit_once(", expected ") {
            let expected = json_type_name(expected);
            return format!("Request body contains an invalid value, expecting: \"{expected}\"");
        }
    }

    "Failed to parse request body".to_string()
}

/// Translates serde's description of the expected Rust type into a JSON type.
fn json_type_name(expected: &str) -> &str {
    const NUMBERS: &[&str] = &[
        "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128", "isize",
        "f32", "f64",
    ];

    if NUMBERS.contains(&expected) {
        "number"
    } else if expected.ends_with("string") || expected == "a character" {
        "string"
    } else if expected == "a boolean" {
        "boolean"
    } else if expected.starts_with("struct ") || expected == "a map" {
        "object"
    } else if expected == "a sequence"
        || expected.starts_with("a tuple")
        || expected.starts_with("an array")
        || expected.starts_with("tuple struct ")
    {
        "array"
    } else {
        expected
    }
}

/// Converts serde_json's 1-based line/column into a byte offset.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let preceding: usize = body
        .split(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    preceding + column
}

fn human_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{}KB", bytes / KB)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    #[allow(dead_code)]
    struct Person {
        name: String,
        age: i32,
    }

    fn parse(input: &str) -> ReadError {
        let err = serde_json::from_slice::<Person>(input.as_bytes()).unwrap_err();
        from_json_error(err, input.as_bytes())
    }

    #[test]
    fn test_json_error_taxonomy() {
        let cases = [
            (r#"{"name": "John", "age": 30"#, "Request body contains badly-formed JSON"),
            (
                r#"{"name": "John", "age": "thirty"}"#,
                "Request body contains an invalid value, expecting: \"number\"",
            ),
            (
                r#"{"name": "John", "age": 30, "unknown_field": true}"#,
                "Request body contains unknown field \"unknown_field\"",
            ),
            ("", "Request body must not be empty"),
            ("  \n", "Request body must not be empty"),
            (r#"{"name": "John"}"#, "Request body is missing the \"age\" field"),
        ];

        for (input, expected) in cases {
            let err = parse(input);
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "input: {input}");
            assert_eq!(err.message(), expected, "input: {input}");
            assert!(err.source().is_some());
        }
    }

    #[test]
    fn test_syntax_error_reports_offset() {
        let err = parse(r#"{"name": "John",}"#);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(
            err.message()
                .starts_with("Request body contains badly-formed JSON at offset "),
            "got: {}",
            err.message()
        );
    }

    #[test]
    fn test_type_errors_use_json_names() {
        let cases = [
            (r#"{"name": 7, "age": 30}"#, "string"),
            (r#""John""#, "object"),
            (r#"{"name": "John", "age": true}"#, "number"),
        ];

        for (input, expected) in cases {
            let err = parse(input);
            assert_eq!(
                err.message(),
                format!("Request body contains an invalid value, expecting: \"{expected}\""),
                "input: {input}"
            );
        }

        assert_eq!(json_type_name("a boolean"), "boolean");
        assert_eq!(json_type_name("a sequence"), "array");
        assert_eq!(json_type_name("a borrowed string"), "string");
    }

    #[test]
    fn test_byte_offset() {
        assert_eq!(byte_offset(b"abc", 1, 2), 2);
        assert_eq!(byte_offset(b"ab\ncd", 2, 1), 4);
    }

    #[test]
    fn test_too_large_message() {
        let err = ReadError::too_large(1024 * 1024);
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.message(), "Request body must not be larger than 1MB");
        assert_eq!(human_size(4096), "4KB");
        assert_eq!(human_size(100), "100 bytes");
    }

    #[test]
    fn test_read_error_display_and_source() {
        let err = ReadError::bad_request("Failed to parse form data").with_source("missing field `q`");
        assert_eq!(err.to_string(), "Failed to parse form data");
        assert_eq!(err.source().unwrap().to_string(), "missing field `q`");

        assert!(ReadError::internal().source().is_none());
    }

    #[test]
    fn test_read_error_problem() {
        let err = ReadError::bad_request("nope");
        assert_eq!(Problem::title(&err), "Bad Request");
        assert_eq!(Problem::detail(&err), "nope");
        assert!(err.custom_members().is_empty());
    }
}
