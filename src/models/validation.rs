// Field validation shared by every request payload

use crate::error::{AppResult, FieldErrors};

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Constraints on a single text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRule {
    pub max_chars: usize,
    pub allow_blank: bool,
}

impl TextRule {
    /// Must be present and non-blank.
    pub const fn required(max_chars: usize) -> Self {
        Self { max_chars, allow_blank: false }
    }

    /// May be omitted or blank.
    pub const fn optional(max_chars: usize) -> Self {
        Self { max_chars, allow_blank: true }
    }
}

pub fn too_long(max_chars: usize) -> String {
    format!("Ensure this field has no more than {} characters.", max_chars)
}

/// Check `value` against `rule`, recording any problem under `field`.
///
/// `None` means the field was absent from the payload; the caller decides
/// whether that is an error by passing a fallback. Present values are trimmed.
pub fn check_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    fallback: Option<String>,
    rule: TextRule,
) -> String {
    let value = match (value, fallback) {
        (Some(value), _) => value,
        (None, Some(existing)) => return existing,
        (None, None) if rule.allow_blank => return String::new(),
        (None, None) => {
            errors.add(field, REQUIRED);
            return String::new();
        }
    };

    let value = value.trim().to_string();
    if !rule.allow_blank && value.is_empty() {
        errors.add(field, BLANK);
    } else if value.chars().count() > rule.max_chars {
        errors.add(field, too_long(rule.max_chars));
    }
    value
}

/// Single-field form of [`check_text`] for payloads with one input.
pub fn validate_text(field: &str, value: Option<String>, rule: TextRule) -> AppResult<String> {
    let mut errors = FieldErrors::new();
    let value = check_text(&mut errors, field, value, None, rule);
    errors.into_result()?;
    Ok(value)
}
