//! Field-level validation rules.

use crate::error::StoreError;
use crate::kind::{EMAIL_FIELD, EntityKind, TAX_CODE_FIELD};
use crate::record::Record;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Exact length of a tax-registration code, in characters.
pub const TAX_CODE_LEN: usize = 14;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Anchored at the start only: trailing text after a valid prefix is accepted.
    RE.get_or_init(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+").expect("email regex must compile"))
}

/// Fail with every required field `record` lacks, in schema order.
pub fn require_fields(kind: EntityKind, record: &Record) -> Result<(), StoreError> {
    let missing: Vec<&'static str> = kind
        .required_fields()
        .iter()
        .copied()
        .filter(|field| !record.contains_field(field))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::MissingFields {
            kind,
            fields: missing,
        })
    }
}

/// Check the per-field rules for whichever governed fields `record` carries.
pub fn check_field_rules(kind: EntityKind, record: &Record) -> Result<(), StoreError> {
    match kind {
        EntityKind::Organization => {
            if let Some(value) = record.get(TAX_CODE_FIELD) {
                check_tax_code(value)?;
            }
        }
        EntityKind::Member => {
            if let Some(value) = record.get(EMAIL_FIELD) {
                check_email(value)?;
            }
        }
    }
    Ok(())
}

pub fn check_tax_code(value: &Value) -> Result<(), StoreError> {
    match value.as_str() {
        Some(code) if code.chars().count() == TAX_CODE_LEN => Ok(()),
        _ => Err(StoreError::InvalidTaxCode),
    }
}

pub fn check_email(value: &Value) -> Result<(), StoreError> {
    match value.as_str() {
        Some(email) if email_re().is_match(email) => Ok(()),
        _ => Err(StoreError::InvalidEmail),
    }
}
