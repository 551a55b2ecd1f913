mod error;
mod extract;

use std::marker::PhantomData;
use std::sync::Arc;

use actix_web::{
    error::PayloadError,
    http::{header, StatusCode},
    web::{Bytes, BytesMut},
    HttpRequest,
};
use futures_util::{Stream, StreamExt};
use kit_validator::{Validate, ValidateStruct};
use serde::de::DeserializeOwned;

pub use error::{ReadError, RequestError, ValidationError};
pub use extract::{ValidatedForm, ValidatedJson, ValidatedQuery};

/// Largest body read by default: 1 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Decodes a JSON body into `T`.
pub fn read_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ReadError> {
    serde_json::from_slice(body).map_err(|err| error::from_json_error(err, body))
}

/// Decodes a URL query string (without the leading `?`) into `T`.
pub fn read_query_params<T: DeserializeOwned>(query: &str) -> Result<T, ReadError> {
    serde_urlencoded::from_str(query)
        .map_err(|err| ReadError::bad_request("Failed to parse query parameters").with_source(err))
}

/// Decodes an `application/x-www-form-urlencoded` body into `T`.
pub fn read_form_data<T: DeserializeOwned>(body: &[u8]) -> Result<T, ReadError> {
    serde_urlencoded::from_bytes(body)
        .map_err(|err| ReadError::bad_request("Failed to parse form data").with_source(err))
}

/// Reads and validates request data. Cheap to clone; register it as app
/// data to use the `Validated*` extractors.
#[derive(Clone)]
pub struct Reader {
    validator: Arc<dyn ValidateStruct + Send + Sync>,
    body_limit: usize,
}

impl Reader {
    pub fn new<V>(validator: V) -> Self
    where
        V: ValidateStruct + Send + Sync + 'static,
    {
        Self {
            validator: Arc::new(validator),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// A reader bound to the request type `T`.
    pub fn typed<T>(&self) -> TypedReader<T> {
        TypedReader {
            reader: self.clone(),
            _target: PhantomData,
        }
    }

    /// Collects the whole payload, failing with 413 past the body limit.
    pub async fn read_body<S>(&self, payload: S) -> Result<Bytes, ReadError>
    where
        S: Stream<Item = Result<Bytes, PayloadError>>,
    {
        let mut payload = std::pin::pin!(payload);
        let mut body = BytesMut::new();

        while let Some(chunk) = payload.next().await {
            let chunk = chunk.map_err(|err| match err {
                PayloadError::Overflow => ReadError::too_large(self.body_limit),
                err => ReadError::bad_request("Failed to read request body").with_source(err.to_string()),
            })?;

            if body.len() + chunk.len() > self.body_limit {
                return Err(ReadError::too_large(self.body_limit));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body.freeze())
    }

    fn validate(&self, value: &dyn Validate) -> Result<(), RequestError> {
        let report = self.validator.validate_struct(value).map_err(|err| {
            log::error!("Failed to validate body: {}", err);
            ReadError::internal().with_source(err)
        })?;

        if report.valid {
            Ok(())
        } else {
            Err(ValidationError::new(report).into())
        }
    }
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

/// A [`Reader`] fixed to one request type.
pub struct TypedReader<T> {
    reader: Reader,
    _target: PhantomData<fn() -> T>,
}

impl<T> Clone for TypedReader<T> {
    fn clone(&self) -> Self {
        self.reader.typed()
    }
}

impl<T> TypedReader<T>
where
    T: DeserializeOwned + Validate,
{
    pub fn new(reader: Reader) -> Self {
        reader.typed()
    }

    /// Reads a JSON body and validates it.
    pub async fn read_and_validate_json<S>(&self, payload: S) -> Result<T, RequestError>
    where
        S: Stream<Item = Result<Bytes, PayloadError>>,
    {
        let body = self.reader.read_body(payload).await?;
        let value: T = read_json_body(&body)?;
        self.reader.validate(&value)?;
        Ok(value)
    }

    /// Reads an urlencoded form body and validates it.
    pub async fn read_and_validate_form<S>(&self, req: &HttpRequest, payload: S) -> Result<T, RequestError>
    where
        S: Stream<Item = Result<Bytes, PayloadError>>,
    {
        check_form_content_type(req)?;
        let body = self.reader.read_body(payload).await?;
        let value: T = read_form_data(&body)?;
        self.reader.validate(&value)?;
        Ok(value)
    }

    /// Reads the query string and validates it.
    pub fn read_and_validate_query(&self, req: &HttpRequest) -> Result<T, RequestError> {
        let value: T = read_query_params(req.query_string())?;
        self.reader.validate(&value)?;
        Ok(value)
    }
}

/// A missing content type is accepted; any other type is 415.
fn check_form_content_type(req: &HttpRequest) -> Result<(), ReadError> {
    let Some(content_type) = req.headers().get(header::CONTENT_TYPE) else {
        return Ok(());
    };

    let is_form = content_type
        .to_str()
        .ok()
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE));

    if is_form {
        Ok(())
    } else {
        Err(ReadError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("Content-Type must be {FORM_CONTENT_TYPE}"),
        ))
    }
}
