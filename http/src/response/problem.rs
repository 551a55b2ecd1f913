use actix_web::http::StatusCode;
use serde_json::{Map, Value};

pub const ABOUT_BLANK: &str = "about:blank";

/// An RFC 9457 problem description.
pub trait Problem {
    fn type_uri(&self) -> &str;
    fn title(&self) -> &str;
    fn status(&self) -> StatusCode;
    fn detail(&self) -> &str;

    /// Extension members merged into the top level of the body.
    fn custom_members(&self) -> Map<String, Value> {
        Map::new()
    }
}

impl<P: Problem + ?Sized> Problem for Box<P> {
    fn type_uri(&self) -> &str {
        (**self).type_uri()
    }

    fn title(&self) -> &str {
        (**self).title()
    }

    fn status(&self) -> StatusCode {
        (**self).status()
    }

    fn detail(&self) -> &str {
        (**self).detail()
    }

    fn custom_members(&self) -> Map<String, Value> {
        (**self).custom_members()
    }
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or_default()
}

/// Builds a [`CustomProblem`]. Starts out as a generic 500.
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    problem: CustomProblem,
}

impl ProblemBuilder {
    pub fn new() -> Self {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        Self {
            problem: CustomProblem {
                type_uri: ABOUT_BLANK.to_string(),
                title: reason(status).to_string(),
                status,
                detail: reason(status).to_string(),
                custom_members: Map::new(),
            },
        }
    }

    pub fn with_type(mut self, type_uri: impl Into<String>) -> Self {
        self.problem.type_uri = type_uri.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.problem.title = title.into();
        self
    }

    /// Sets the status; a title still at the 500 default follows the new status.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        if self.problem.title == reason(StatusCode::INTERNAL_SERVER_ERROR) {
            self.problem.title = reason(status).to_string();
        }
        self.problem.status = status;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.problem.detail = detail.into();
        self
    }

    pub fn with_custom_member(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.problem.custom_members.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> CustomProblem {
        self.problem
    }
}

impl Default for ProblemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomProblem {
    type_uri: String,
    title: String,
    status: StatusCode,
    detail: String,
    custom_members: Map<String, Value>,
}

impl Problem for CustomProblem {
    fn type_uri(&self) -> &str {
        &self.type_uri
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> StatusCode {
        self.status
    }

    fn detail(&self) -> &str {
        &self.detail
    }

    fn custom_members(&self) -> Map<String, Value> {
        self.custom_members.clone()
    }
}

/// The problem used when nothing more specific is known.
pub fn default_problem() -> CustomProblem {
    ProblemBuilder::new().build()
}

/// Renders the JSON object for `problem`.
///
/// A blank type (`""` or `about:blank`) always carries the status's
/// canonical reason as title. Custom members are applied last.
pub fn problem_body<P>(instance: Option<&str>, problem: &P) -> Map<String, Value>
where
    P: Problem + ?Sized,
{
    let status = problem.status();
    let mut body = Map::new();

    let type_uri = problem.type_uri();
    if type_uri.is_empty() || type_uri.eq_ignore_ascii_case(ABOUT_BLANK) {
        body.insert("type".into(), ABOUT_BLANK.into());
        body.insert("title".into(), reason(status).into());
    } else {
        body.insert("type".into(), type_uri.into());
        body.insert("title".into(), problem.title().into());
    }

    body.insert("status".into(), status.as_u16().into());
    body.insert("detail".into(), problem.detail().into());
    if let Some(instance) = instance {
        body.insert("instance".into(), instance.into());
    }

    body.extend(problem.custom_members());
    body
}
