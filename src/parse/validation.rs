//! Input validation and sanitization for address records and form fields.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::api::NewIp;
use crate::config::{MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MAX_TAGS, MAX_TAG_LENGTH};
use crate::error_handling::ApiError;

const IPV4_PATTERN: &str = r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$";

// Full form plus each position the `::` compression can take.
const IPV6_PATTERN: &str = concat!(
    r"^(?:",
    r"(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}",
    r"|::(?:[0-9a-fA-F]{1,4}:){0,6}[0-9a-fA-F]{1,4}",
    r"|[0-9a-fA-F]{1,4}::(?:[0-9a-fA-F]{1,4}:){0,5}[0-9a-fA-F]{1,4}",
    r"|[0-9a-fA-F]{1,4}:[0-9a-fA-F]{1,4}::(?:[0-9a-fA-F]{1,4}:){0,4}[0-9a-fA-F]{1,4}",
    r"|(?:[0-9a-fA-F]{1,4}:){2}:(?:[0-9a-fA-F]{1,4}:){0,3}[0-9a-fA-F]{1,4}",
    r"|(?:[0-9a-fA-F]{1,4}:){3}:(?:[0-9a-fA-F]{1,4}:){0,2}[0-9a-fA-F]{1,4}",
    r"|(?:[0-9a-fA-F]{1,4}:){4}:(?:[0-9a-fA-F]{1,4}:)?[0-9a-fA-F]{1,4}",
    r"|(?:[0-9a-fA-F]{1,4}:){5}:[0-9a-fA-F]{1,4}",
    r"|(?:[0-9a-fA-F]{1,4}:){6}:",
    r")$"
);

const ANGLE_BRACKETS_PATTERN: &str = r"[<>]";
const SCRIPT_PROTOCOL_PATTERN: &str = r"(?i)javascript:";
const EVENT_HANDLER_PATTERN: &str = r"(?i)on[a-z0-9_]+=";

/// Compiles a hardcoded pattern; failure is a programming error.
fn compile_regex(pattern: &str, name: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}. This is a programming error.",
            pattern, name, e
        )
    })
}

static IPV4_RE: LazyLock<Regex> = LazyLock::new(|| compile_regex(IPV4_PATTERN, "IPV4_RE"));
static IPV6_RE: LazyLock<Regex> = LazyLock::new(|| compile_regex(IPV6_PATTERN, "IPV6_RE"));
static ANGLE_BRACKETS_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(ANGLE_BRACKETS_PATTERN, "ANGLE_BRACKETS_RE"));
static SCRIPT_PROTOCOL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(SCRIPT_PROTOCOL_PATTERN, "SCRIPT_PROTOCOL_RE"));
static EVENT_HANDLER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(EVENT_HANDLER_PATTERN, "EVENT_HANDLER_RE"));

/// A single rejected field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid IP address")]
    InvalidIpAddress,

    #[error("Name must be {max} characters or less")]
    NameTooLong { max: usize },

    #[error("Description must be {max} characters or less")]
    DescriptionTooLong { max: usize },

    #[error("Maximum {max} tags allowed")]
    TooManyTags { max: usize },
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// Every field error found in one form submission, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub fields: Vec<(&'static str, ValidationError)>,
}

impl FormErrors {
    pub fn get(&self, field: &str) -> Option<&ValidationError> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, err)| err)
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (field, err)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

impl From<FormErrors> for ApiError {
    fn from(err: FormErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

pub fn is_valid_ipv4(ip: &str) -> bool {
    IPV4_RE.is_match(ip.trim())
}

/// Structural IPv6 check; does not accept embedded IPv4 or zone ids.
pub fn is_valid_ipv6(ip: &str) -> bool {
    IPV6_RE.is_match(ip.trim())
}

/// True for a dotted-quad IPv4 or a structurally valid IPv6 address.
pub fn is_valid_ip_address(ip: &str) -> bool {
    let trimmed = ip.trim();
    !trimmed.is_empty() && (IPV4_RE.is_match(trimmed) || IPV6_RE.is_match(trimmed))
}

/// Strips markup and script fragments from free text.
///
/// Removes `<` and `>`, `javascript:` and `on<word>=` handler prefixes
/// (case-insensitive), then trims.
pub fn sanitize_input(input: &str) -> String {
    let s = ANGLE_BRACKETS_RE.replace_all(input, "");
    let s = SCRIPT_PROTOCOL_RE.replace_all(&s, "");
    let s = EVENT_HANDLER_RE.replace_all(&s, "");
    s.trim().to_string()
}

fn validate_text(
    value: Option<&str>,
    max: usize,
    too_long: fn(usize) -> ValidationError,
) -> Result<Option<String>, ValidationError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let sanitized = sanitize_input(raw);
    if sanitized.chars().count() > max {
        return Err(too_long(max));
    }
    Ok(if sanitized.is_empty() {
        None
    } else {
        Some(sanitized)
    })
}

/// Sanitizes an optional display name. Blank input yields `None`.
pub fn validate_name(name: Option<&str>) -> Result<Option<String>, ValidationError> {
    validate_text(name, MAX_NAME_LENGTH, |max| ValidationError::NameTooLong {
        max,
    })
}

/// Sanitizes an optional description. Blank input yields `None`.
pub fn validate_description(description: Option<&str>) -> Result<Option<String>, ValidationError> {
    validate_text(description, MAX_DESCRIPTION_LENGTH, |max| {
        ValidationError::DescriptionTooLong { max }
    })
}

/// Normalizes a tag list.
///
/// More than `MAX_TAGS` input tags is an error. Otherwise each tag is
/// sanitized and lowercased; empty tags and tags longer than
/// `MAX_TAG_LENGTH` are dropped, and duplicates are removed keeping the first.
pub fn validate_tags<S: AsRef<str>>(tags: &[S]) -> Result<Vec<String>, ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::TooManyTags { max: MAX_TAGS });
    }

    let mut seen = HashSet::new();
    Ok(tags
        .iter()
        .map(|tag| sanitize_input(tag.as_ref()).to_lowercase())
        .filter(|tag| !tag.is_empty() && tag.chars().count() <= MAX_TAG_LENGTH)
        .filter(|tag| seen.insert(tag.clone()))
        .collect())
}

/// Validates the single-address add form, collecting every field error.
pub fn validate_ip_form<S: AsRef<str>>(
    ip_address: &str,
    name: Option<&str>,
    description: Option<&str>,
    tags: &[S],
) -> Result<NewIp, FormErrors> {
    let mut errors = FormErrors::default();
    let mut form = NewIp::default();

    if is_valid_ip_address(ip_address) {
        form.ip_address = ip_address.trim().to_string();
    } else {
        errors
            .fields
            .push(("ip_address", ValidationError::InvalidIpAddress));
    }

    match validate_name(name) {
        Ok(v) => form.name = v,
        Err(e) => errors.fields.push(("name", e)),
    }
    match validate_description(description) {
        Ok(v) => form.description = v,
        Err(e) => errors.fields.push(("description", e)),
    }
    match validate_tags(tags) {
        Ok(v) => form.tags = v,
        Err(e) => errors.fields.push(("tags", e)),
    }

    if errors.fields.is_empty() {
        Ok(form)
    } else {
        Err(errors)
    }
}
