//! Explicit validation of drafts and the non-null merge used by partial updates.

use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: &'static str,
}

pub trait Validate {
    fn violations(&self) -> Vec<Violation>;
}

/// Fields present in `patch` replace those of `self`; absent ones are kept.
pub trait CopyNonNull {
    fn copy_non_null(&mut self, patch: Self);
}

/// Fails with every violation message lower-cased and joined by `", "`.
pub fn ensure_valid<V: Validate + ?Sized>(value: &V) -> Result<(), ServiceError> {
    reject_violations(value.violations())
}

pub fn reject_violations(violations: Vec<Violation>) -> Result<(), ServiceError> {
    if violations.is_empty() {
        return Ok(());
    }
    let msg = violations
        .iter()
        .map(|v| v.message.to_lowercase())
        .collect::<Vec<_>>()
        .join(", ");
    Err(ServiceError::IllegalModification(msg))
}

pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true)
}

pub(crate) fn mandatory(out: &mut Vec<Violation>, field: &'static str, value: &Option<String>, message: &'static str) {
    if is_blank(value) {
        out.push(Violation { field, message });
    }
}

pub(crate) fn replace_if_some<T>(slot: &mut Option<T>, patch: Option<T>) {
    if patch.is_some() {
        *slot = patch;
    }
}

/// Loose shape check: `local@domain.tld`, no whitespace.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
