use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, ValidatorError};
use crate::fields::{FieldLevel, Fields, Validate};
use crate::messages::{default_messages, fallback_message, MessageFunc, DEFAULT_MESSAGE_KEY};
use crate::rules::{self, ValidationFunc, OMITEMPTY};

/// Why a single field failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reason {
    pub value: Value,
    pub rule: String,
    pub message: String,
}

/// Outcome of validating one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub valid: bool,
    pub failed: BTreeMap<String, Reason>,
}

impl Report {
    fn from_failures(failed: BTreeMap<String, Reason>) -> Self {
        Self {
            valid: failed.is_empty(),
            failed,
        }
    }
}

/// Seam used by consumers that only need to run a validation.
pub trait ValidateStruct {
    fn validate_struct(&self, value: &dyn Validate) -> Result<Report>;
}

#[derive(Clone)]
pub struct Validator {
    rules: HashMap<String, ValidationFunc>,
    messages: HashMap<String, MessageFunc>,
}

impl Validator {
    /// A validator with the built-in rules and default messages.
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            messages: default_messages(),
        }
    }

    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    /// Evaluates every declared field of `value`.
    ///
    /// Failed rules are reported in the returned [`Report`]; an `Err` means the
    /// declaration itself is broken (unknown rule, bad parameter,
    /// unserializable value).
    pub fn validate_struct<T>(&self, value: &T) -> Result<Report>
    where
        T: Validate + ?Sized,
    {
        let mut fields = Fields::new();
        value.fields(&mut fields);

        if let Some(err) = fields.errors.into_iter().next() {
            return Err(err);
        }

        let mut failed = BTreeMap::new();
        for entry in &fields.entries {
            if let Some(reason) = self.check_field(&entry.name, &entry.value, &entry.rules)? {
                failed.insert(entry.name.clone(), reason);
            }
        }

        Ok(Report::from_failures(failed))
    }

    /// Runs the rules of one field in order and stops at the first failure.
    fn check_field(&self, field: &str, value: &Value, rules: &str) -> Result<Option<Reason>> {
        for (tag, param) in rules::parse(rules) {
            if tag == OMITEMPTY {
                if rules::has_value(value) {
                    continue;
                }
                break;
            }

            let level = FieldLevel::new(field, value, param);
            let passed = if let Some(custom) = self.rules.get(tag) {
                custom(&level)
            } else if let Some(builtin) = rules::builtin(tag) {
                builtin(&level).ok_or_else(|| ValidatorError::InvalidParam {
                    field: field.to_string(),
                    rule: tag.to_string(),
                    param: param.to_string(),
                })?
            } else {
                return Err(ValidatorError::UndefinedRule {
                    field: field.to_string(),
                    rule: tag.to_string(),
                });
            };

            if !passed {
                return Ok(Some(Reason {
                    value: value.clone(),
                    rule: tag.to_string(),
                    message: self.message(field, tag, param),
                }));
            }
        }

        Ok(None)
    }

    fn message(&self, field: &str, rule: &str, param: &str) -> String {
        if let Some(template) = self.messages.get(rule) {
            return template(field, param);
        }

        if let Some(template) = self.messages.get(DEFAULT_MESSAGE_KEY) {
            return template(field, rule);
        }

        fallback_message(field, rule)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut custom: Vec<_> = self.rules.keys().collect();
        custom.sort();
        let mut messages: Vec<_> = self.messages.keys().collect();
        messages.sort();

        f.debug_struct("Validator")
            .field("custom_rules", &custom)
            .field("messages", &messages)
            .finish()
    }
}

impl ValidateStruct for Validator {
    fn validate_struct(&self, value: &dyn Validate) -> Result<Report> {
        Validator::validate_struct(self, value)
    }
}

impl<V: ValidateStruct + ?Sized> ValidateStruct for Arc<V> {
    fn validate_struct(&self, value: &dyn Validate) -> Result<Report> {
        (**self).validate_struct(value)
    }
}

/// Registers custom rules and message templates.
#[derive(Default)]
pub struct ValidatorBuilder {
    rules: HashMap<String, ValidationFunc>,
    messages: HashMap<String, MessageFunc>,
}

impl ValidatorBuilder {
    /// Adds a rule usable as `tag` in rule strings. May shadow a built-in.
    pub fn custom_tag<F>(mut self, tag: impl Into<String>, func: F) -> Self
    where
        F: Fn(&FieldLevel<'_>) -> bool + Send + Sync + 'static,
    {
        self.rules.insert(tag.into(), Arc::new(func));
        self
    }

    pub fn custom_tags(mut self, rules: HashMap<String, ValidationFunc>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Overrides or adds the message template for `rule`.
    pub fn message<F>(mut self, rule: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.messages.insert(rule.into(), Arc::new(func));
        self
    }

    pub fn messages(mut self, messages: HashMap<String, MessageFunc>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn build(self) -> Result<Validator> {
        if let Some(tag) = self.rules.keys().find(|tag| !rules::is_valid_tag(tag)) {
            return Err(ValidatorError::InvalidTag(tag.clone()));
        }

        for tag in self.rules.keys() {
            if rules::builtin(tag).is_some() {
                log::debug!("Custom rule '{}' shadows the built-in rule", tag);
            }
        }

        let mut messages = default_messages();
        messages.extend(self.messages);

        Ok(Validator {
            rules: self.rules,
            messages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Account {
        username: String,
        nickname: Option<String>,
    }

    impl Validate for Account {
        fn fields(&self, fields: &mut Fields) {
            fields
                .field("username", &self.username, "required,min=3")
                .field("nickname", &self.nickname, "omitempty,min=2");
        }
    }

    #[test]
    fn test_first_failing_rule_is_reported() {
        let report = Validator::new()
            .validate_struct(&Account {
                username: String::new(),
                nickname: None,
            })
            .unwrap();

        assert!(!report.valid);
        assert_eq!(report.failed["username"].rule, "required");
        assert_eq!(report.failed["username"].message, "username is required");
    }

    #[test]
    fn test_omitempty_skips_empty_values() {
        let report = Validator::new()
            .validate_struct(&Account {
                username: "alice".into(),
                nickname: None,
            })
            .unwrap();

        assert!(report.valid);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_omitempty_still_checks_present_values() {
        let report = Validator::new()
            .validate_struct(&Account {
                username: "alice".into(),
                nickname: Some("x".into()),
            })
            .unwrap();

        assert_eq!(report.failed["nickname"].message, "nickname must be at least 2");
        assert_eq!(report.failed["nickname"].value, Value::from("x"));
    }

    #[test]
    fn test_fallback_without_default_template() {
        let mut validator = Validator::new();
        validator.messages.clear();

        assert_eq!(
            validator.message("code", "len", "4"),
            "code failed validation for rule: len"
        );
    }

    #[test]
    fn test_debug_lists_rules() {
        let validator = Validator::builder()
            .custom_tag("even", |fl| fl.value().as_i64().is_some_and(|n| n % 2 == 0))
            .build()
            .unwrap();

        let rendered = format!("{validator:?}");
        assert!(rendered.contains("even"));
    }
}
