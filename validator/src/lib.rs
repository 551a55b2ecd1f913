//! Declarative struct validation with user-facing messages.
//!
//! A type lists its fields, their JSON names and a rule string through the
//! [`Validate`] trait. A [`Validator`] evaluates the rules and shapes every
//! failure into a [`Reason`] keyed by field name, so the result can be sent
//! back to an API client unchanged.
//!
//! ```
//! use kit_validator::{Fields, Validate, Validator};
//!
//! struct SignUp {
//!     email: String,
//!     age: u32,
//! }
//!
//! impl Validate for SignUp {
//!     fn fields(&self, fields: &mut Fields) {
//!         fields
//!             .field("email", &self.email, "required,email")
//!             .field("age", &self.age, "gte=18");
//!     }
//! }
//!
//! let report = Validator::new()
//!     .validate_struct(&SignUp { email: "nope".into(), age: 30 })
//!     .unwrap();
//!
//! assert!(!report.valid);
//! assert_eq!(report.failed["email"].message, "email must be a valid email address");
//! ```

mod error;
mod fields;
mod messages;
mod rules;
mod validator;

pub use error::{Result, ValidatorError};
pub use fields::{FieldLevel, Fields, Validate};
pub use messages::{default_messages, MessageFunc, DEFAULT_MESSAGE_KEY};
pub use rules::{ValidationFunc, BUILTIN_RULES};
pub use validator::{Reason, Report, ValidateStruct, Validator, ValidatorBuilder};
