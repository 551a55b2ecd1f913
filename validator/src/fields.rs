use serde::Serialize;
use serde_json::Value;

use crate::error::ValidatorError;

/// Implemented by types that can be checked by a [`Validator`](crate::Validator).
///
/// Each field is declared with the name clients know it by (usually its JSON
/// name), its value and a comma separated rule list such as
/// `"required,min=3,max=50"`.
pub trait Validate {
    fn fields(&self, fields: &mut Fields);
}

impl<T: Validate + ?Sized> Validate for &T {
    fn fields(&self, fields: &mut Fields) {
        (**self).fields(fields)
    }
}

impl<T: Validate + ?Sized> Validate for Box<T> {
    fn fields(&self, fields: &mut Fields) {
        (**self).fields(fields)
    }
}

#[derive(Debug)]
pub(crate) struct FieldEntry {
    pub(crate) name: String,
    pub(crate) value: Value,
    pub(crate) rules: String,
}

/// Collects the declared fields of a [`Validate`] value.
#[derive(Debug, Default)]
pub struct Fields {
    prefix: String,
    pub(crate) entries: Vec<FieldEntry>,
    pub(crate) errors: Vec<ValidatorError>,
}

impl Fields {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn path(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix, name)
        }
    }

    /// Declares a field. An empty rule string declares nothing to check.
    pub fn field<T>(&mut self, name: &str, value: &T, rules: &str) -> &mut Self
    where
        T: Serialize + ?Sized,
    {
        let name = self.path(name);

        match serde_json::to_value(value) {
            Ok(value) => self.entries.push(FieldEntry {
                name,
                value,
                rules: rules.to_string(),
            }),
            Err(source) => self.errors.push(ValidatorError::Serialize {
                field: name,
                source,
            }),
        }

        self
    }

    /// Declares the fields of a nested value under `name.`.
    pub fn nested<T>(&mut self, name: &str, value: &T) -> &mut Self
    where
        T: Validate + ?Sized,
    {
        let prefix = self.path(name);
        self.scoped(prefix, value);
        self
    }

    /// Declares the fields of every element, keyed `name[i].field`.
    pub fn nested_each<T>(&mut self, name: &str, items: &[T]) -> &mut Self
    where
        T: Validate,
    {
        let base = self.path(name);
        for (i, item) in items.iter().enumerate() {
            self.scoped(format!("{base}[{i}]"), item);
        }
        self
    }

    fn scoped<T: Validate + ?Sized>(&mut self, prefix: String, value: &T) {
        let outer = std::mem::replace(&mut self.prefix, prefix);
        value.fields(self);
        self.prefix = outer;
    }
}

/// What a rule function sees about the field being checked.
#[derive(Debug, Clone, Copy)]
pub struct FieldLevel<'a> {
    pub(crate) field: &'a str,
    pub(crate) value: &'a Value,
    pub(crate) param: &'a str,
}

impl<'a> FieldLevel<'a> {
    pub fn new(field: &'a str, value: &'a Value, param: &'a str) -> Self {
        Self {
            field,
            value,
            param,
        }
    }

    pub fn field(&self) -> &'a str {
        self.field
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// The text after `=` in the rule, empty when there is none.
    pub fn param(&self) -> &'a str {
        self.param
    }

    /// The value as a string, empty for anything that is not a JSON string.
    pub fn as_str(&self) -> &'a str {
        self.value.as_str().unwrap_or_default()
    }
}
