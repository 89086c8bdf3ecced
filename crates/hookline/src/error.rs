use thiserror::Error;

/// Registration-time contract violations.
///
/// Handler misbehavior during a dispatch (failure, timeout, panic) is never
/// an error at this level; it is recorded as data in the aggregated result.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("invalid registration: {0}")]
    InvalidRegistration(String),
}
