mod problem;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use actix_web::{
    http::{header, StatusCode},
    web, HttpRequest, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;

use crate::request::{ReadError, RequestError, ValidationError};

pub use problem::{default_problem, problem_body, CustomProblem, Problem, ProblemBuilder, ABOUT_BLANK};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const PROBLEM_CONTENT_TYPE: &str = "application/problem+json; charset=utf-8";

/// Turns an application error into a problem. `None` falls back to the
/// default 500 problem.
pub type ProblemMapper =
    Arc<dyn Fn(&anyhow::Error) -> Option<Box<dyn Problem + Send>> + Send + Sync>;

/// Writes JSON and Problem+JSON responses.
#[derive(Clone, Default)]
pub struct JsonWriter {
    error_problem_mapper: Option<ProblemMapper>,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps errors that are not request errors into problems.
    pub fn with_error_problem_mapper<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&anyhow::Error) -> Option<Box<dyn Problem + Send>> + Send + Sync + 'static,
    {
        self.error_problem_mapper = Some(Arc::new(mapper));
        self
    }

    pub fn ok<T: Serialize + ?Sized>(&self, value: &T) -> HttpResponse {
        self.write(StatusCode::OK, value)
    }

    pub fn write<T: Serialize + ?Sized>(&self, status: StatusCode, value: &T) -> HttpResponse {
        json_response(status, value)
    }

    /// A response with headers only.
    pub fn write_status(&self, status: StatusCode) -> HttpResponse {
        response_builder(status).finish()
    }

    pub fn write_problem<P>(&self, req: &HttpRequest, problem: &P) -> HttpResponse
    where
        P: Problem + ?Sized,
    {
        let instance = req.uri().to_string();
        let body = problem_body(Some(&instance), problem);
        json_response(problem.status(), &body)
    }

    /// Renders `err` as a problem.
    ///
    /// Request errors anywhere in the chain render as themselves; anything
    /// else goes through the configured mapper, or becomes a logged 500.
    pub fn write_error(&self, req: &HttpRequest, err: &anyhow::Error) -> HttpResponse {
        for cause in err.chain() {
            if let Some(err) = cause.downcast_ref::<RequestError>() {
                return self.write_problem(req, err);
            }
            if let Some(err) = cause.downcast_ref::<ReadError>() {
                return self.write_problem(req, err);
            }
            if let Some(err) = cause.downcast_ref::<ValidationError>() {
                return self.write_problem(req, err);
            }
        }

        let Some(mapper) = &self.error_problem_mapper else {
            log::error!(path = req.path(); "Failed to handle request: {:#}", err);
            return self.write_problem(req, &default_problem());
        };

        match mapper(err) {
            Some(problem) => self.write_problem(req, &problem),
            None => self.write_problem(req, &default_problem()),
        }
    }

    /// Adapts a fallible handler into an actix handler whose errors are
    /// rendered through [`JsonWriter::write_error`].
    pub fn handler<F, Fut>(
        &self,
        handler: F,
    ) -> impl Fn(HttpRequest, web::Payload) -> LocalBoxFuture<'static, HttpResponse> + Clone + 'static
    where
        F: Fn(HttpRequest, web::Payload) -> Fut + Clone + 'static,
        Fut: Future<Output = anyhow::Result<HttpResponse>> + 'static,
    {
        let writer = self.clone();
        move |req: HttpRequest, payload: web::Payload| -> LocalBoxFuture<'static, HttpResponse> {
            let writer = writer.clone();
            let handler = handler.clone();
            Box::pin(async move {
                match handler(req.clone(), payload).await {
                    Ok(response) => response,
                    Err(err) => writer.write_error(&req, &err),
                }
            })
        }
    }
}

impl fmt::Debug for JsonWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonWriter")
            .field("error_problem_mapper", &self.error_problem_mapper.is_some())
            .finish()
    }
}

fn response_builder(status: StatusCode) -> actix_web::HttpResponseBuilder {
    let mut builder = HttpResponse::build(status);
    if status.is_client_error() || status.is_server_error() {
        builder
            .insert_header((header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE))
            .insert_header((header::CACHE_CONTROL, "no-store"));
    } else {
        builder.insert_header((header::CONTENT_TYPE, JSON_CONTENT_TYPE));
    }
    builder
}

/// Serializes `value` with the content type matching `status`. An encoding
/// failure is logged and leaves the body empty.
pub(crate) fn json_response<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> HttpResponse {
    let mut builder = response_builder(status);
    match serde_json::to_vec(value) {
        Ok(body) => builder.body(body),
        Err(err) => {
            log::error!("Failed to encode response: {}", err);
            builder.finish()
        }
    }
}
