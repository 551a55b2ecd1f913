#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error("Invalid custom tag name {0:?}")]
    InvalidTag(String),

    #[error("Undefined validation rule '{rule}' on field '{field}'")]
    UndefinedRule { field: String, rule: String },

    #[error("Invalid parameter {param:?} for rule '{rule}' on field '{field}'")]
    InvalidParam {
        field: String,
        rule: String,
        param: String,
    },

    #[error("Failed to read value of field '{field}': {source}")]
    Serialize {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ValidatorError>;
