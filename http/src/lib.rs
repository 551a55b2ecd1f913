//! HTTP plumbing for actix-web services.
//!
//! - [`request`]: read JSON bodies, query strings and forms into typed values
//!   and validate them, with failures already shaped as HTTP errors.
//! - [`response`]: JSON writer and RFC 9457 Problem Details rendering.
//! - [`server`]: start a server and shut it down gracefully on a signal.

pub mod request;
pub mod response;
pub mod server;

pub use request::{
    ReadError, Reader, RequestError, TypedReader, ValidatedForm, ValidatedJson, ValidatedQuery, ValidationError,
};
pub use response::{JsonWriter, Problem, ProblemBuilder};
pub use server::{Server, ServerError};
