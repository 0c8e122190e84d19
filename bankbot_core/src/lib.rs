use std::{future::Future, pin::Pin};

pub mod action;
pub mod dispatcher;
pub mod event;
pub mod http;
pub mod tracker;

pub use action::*;
pub use dispatcher::*;
pub use event::*;
pub use self::http::*;
pub use tracker::*;

pub use serde_json::Value;

/// A type alias for a boxed error that is thread-safe and sendable across threads.
/// This is commonly used as a return type for functions that can return various error types.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A type alias for a boxed future that is thread-safe and sendable across threads.
pub type BoxPinFut<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Validates an action name.
///
/// # Rules
/// - Must not be empty
/// - Length must be ≤ 64 characters
/// - Can only contain: lowercase letters (a-z), digits (0-9), and underscores (_)
pub fn validate_name(name: &str) -> Result<(), BoxError> {
    if name.is_empty() {
        return Err("empty string".into());
    }

    if name.len() > 64 {
        return Err(format!("string length exceeds the limit 64: {name:?}").into());
    }

    for c in name.chars() {
        if !matches!(c, 'a'..='z' | '0'..='9' | '_') {
            return Err(format!("invalid character {c:?} in {name:?}").into());
        }
    }
    Ok(())
}
