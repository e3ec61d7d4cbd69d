//! Unvalidated request bodies and the violations found while validating them.
//!
//! A [`RawInput`] is whatever bytes the client sent. The validated input types
//! ([`crate::NewBlogPost`], [`crate::BlogPostPatch`], [`crate::UserPatch`])
//! can only be built by parsing one, so nothing unchecked reaches the store.

use std::fmt;

use serde_json::{Map, Value};

/// A request body that has not been validated yet.
#[derive(Clone, Copy, Debug)]
pub struct RawInput<'a> {
    bytes: &'a [u8],
}

impl<'a> RawInput<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Decode the body as a JSON object.
    pub(crate) fn object(&self) -> Result<Map<String, Value>, ValidationError> {
        match serde_json::from_slice::<Value>(self.bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ValidationError::single("body", "Expected a JSON object")),
            Err(e) => Err(ValidationError::single("body", format!("Malformed JSON: {e}"))),
        }
    }
}

impl<'a> From<&'a [u8]> for RawInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<'a> From<&'a str> for RawInput<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s.as_bytes())
    }
}

/// One field that failed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Every violation found in one input. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Whether any violation concerns `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validation error: ")?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} at \"{}\"", v.message, v.field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Reads typed fields out of a JSON object, collecting every violation
/// instead of stopping at the first one.
pub(crate) struct FieldReader {
    map: Map<String, Value>,
    violations: Vec<FieldViolation>,
}

impl FieldReader {
    pub(crate) fn new(map: Map<String, Value>) -> Self {
        Self {
            map,
            violations: Vec::new(),
        }
    }

    pub(crate) fn violation(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// A field that must be present and a string of at least `min_chars`.
    pub(crate) fn required_str(
        &mut self,
        field: &str,
        min_chars: usize,
        too_short: &str,
    ) -> Option<String> {
        if !self.map.contains_key(field) {
            self.violation(field, "Required");
            return None;
        }
        self.optional_str(field, min_chars, too_short)
    }

    /// A field that may be absent; when present it must be a string of at
    /// least `min_chars`, not counting surrounding whitespace.
    pub(crate) fn optional_str(
        &mut self,
        field: &str,
        min_chars: usize,
        too_short: &str,
    ) -> Option<String> {
        match self.map.remove(field) {
            None => None,
            Some(Value::String(s)) => {
                if s.trim().chars().count() < min_chars {
                    self.violation(field, too_short);
                    None
                } else {
                    Some(s)
                }
            }
            Some(other) => {
                self.violation(
                    field,
                    format!("Expected string, received {}", type_name(&other)),
                );
                None
            }
        }
    }

    /// A field that may be absent, a string, or `null`.
    ///
    /// Absent → `None`, `null` → `Some(None)`, string → `Some(Some(s))`.
    pub(crate) fn nullable_str(&mut self, field: &str) -> Option<Option<String>> {
        match self.map.remove(field) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(Value::String(s)) => Some(Some(s)),
            Some(other) => {
                self.violation(
                    field,
                    format!("Expected string, received {}", type_name(&other)),
                );
                None
            }
        }
    }

    /// Reject a field that cannot be set through this input.
    pub(crate) fn forbid(&mut self, field: &str, message: &str) {
        if self.map.contains_key(field) {
            self.violation(field, message);
        }
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                violations: self.violations,
            })
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
