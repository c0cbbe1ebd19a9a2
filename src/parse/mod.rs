//! Address list parsing and input validation.
//!
//! `parse_candidates` turns free text pasted or loaded by the user into an
//! ordered, deduplicated list of `CandidateRecord`s:
//! - records are separated by runs of newlines or semicolons
//! - each record is `address[,name[,description...]]`; commas after the
//!   second one belong to the description
//! - records with an invalid address are dropped silently
//! - the first occurrence of an address wins, including its name and
//!   description
//!
//! Parsing never fails; an empty result is the caller's signal that there was
//! nothing to import.

mod validation;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub use validation::{
    is_valid_ip_address, is_valid_ipv4, is_valid_ipv6, sanitize_input, validate_description,
    validate_ip_form, validate_name, validate_tags, FormErrors, ValidationError,
};

static RECORD_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\n;]+").unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern in RECORD_SEPARATOR_RE: {}. This is a programming error.",
            e
        )
    })
});

/// One address parsed from user input, ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRecord {
    pub address: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CandidateRecord {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
            description: None,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_record(record: &str) -> Option<CandidateRecord> {
    let mut fields = record.split(',');
    let address = fields.next()?.trim();
    if !is_valid_ip_address(address) {
        return None;
    }
    let name = fields.next().and_then(non_empty);
    let rest: Vec<&str> = fields.collect();
    let description = non_empty(&rest.join(","));

    Some(CandidateRecord {
        address: address.to_string(),
        name,
        description,
    })
}

/// Parses free text into valid, unique candidate records in first-seen order.
pub fn parse_candidates(text: &str) -> Vec<CandidateRecord> {
    let mut seen = HashSet::new();
    RECORD_SEPARATOR_RE
        .split(text)
        .map(str::trim)
        .filter(|record| !record.is_empty())
        .filter_map(parse_record)
        .filter(|candidate| seen.insert(candidate.address.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
