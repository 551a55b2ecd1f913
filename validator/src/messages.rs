use std::collections::HashMap;
use std::sync::Arc;

/// Builds the message for a failed rule.
///
/// Rule templates get `(field, param)`; the [`DEFAULT_MESSAGE_KEY`] template
/// gets `(field, rule)` instead.
pub type MessageFunc = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Template used for rules without one of their own.
pub const DEFAULT_MESSAGE_KEY: &str = "default";

/// The templates every [`Validator`](crate::Validator) starts with.
pub fn default_messages() -> HashMap<String, MessageFunc> {
    let table: [(&str, MessageFunc); 6] = [
        ("required", Arc::new(|field: &str, _: &str| format!("{field} is required"))),
        (
            "email",
            Arc::new(|field: &str, _: &str| format!("{field} must be a valid email address")),
        ),
        (
            "min",
            Arc::new(|field: &str, param: &str| format!("{field} must be at least {param}")),
        ),
        (
            "max",
            Arc::new(|field: &str, param: &str| format!("{field} must not exceed {param}")),
        ),
        (
            "len",
            Arc::new(|field: &str, param: &str| format!("{field} must be exactly {param} characters long")),
        ),
        (DEFAULT_MESSAGE_KEY, Arc::new(fallback_message)),
    ];

    table
        .into_iter()
        .map(|(rule, func)| (rule.to_string(), func))
        .collect()
}

pub(crate) fn fallback_message(field: &str, rule: &str) -> String {
    format!("{field} failed validation for rule: {rule}")
}
