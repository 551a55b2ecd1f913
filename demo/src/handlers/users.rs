use actix_web::{get, http::StatusCode, post, web, HttpRequest, HttpResponse};
use kit_http::{JsonWriter, ValidatedJson, ValidatedQuery};
use kit_validator::{Fields, Validate};
use serde::{Deserialize, Serialize};

use crate::store::{User, UserStore};

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub age: u8,
    pub password: String,
}

impl Validate for CreateUserRequest {
    fn fields(&self, fields: &mut Fields) {
        fields
            .field("username", &self.username, "required,username")
            .field("email", &self.email, "required,email")
            .field("age", &self.age, "gte=13,lte=130")
            .field("password", &self.password, "required,min=8,max=72");
    }
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

impl Validate for SearchParams {
    fn fields(&self, fields: &mut Fields) {
        fields
            .field("q", &self.q, "required,min=2")
            .field("limit", &self.limit, "min=1,max=100");
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub users: Vec<User>,
    pub count: usize,
}

#[post("/users")]
pub async fn create_user(
    req: HttpRequest,
    ValidatedJson(body): ValidatedJson<CreateUserRequest>,
    store: web::Data<UserStore>,
    writer: web::Data<JsonWriter>,
) -> HttpResponse {
    match store.create(&body.username, &body.email, body.age, &body.password) {
        Ok(user) => writer.write(StatusCode::CREATED, &user),
        Err(err) => writer.write_error(&req, &err.into()),
    }
}

#[get("/users/search")]
pub async fn search_users(
    ValidatedQuery(params): ValidatedQuery<SearchParams>,
    store: web::Data<UserStore>,
    writer: web::Data<JsonWriter>,
) -> HttpResponse {
    let users = store.search(&params.q, params.limit);
    log::debug!("Search {:?} matched {} users", params.q, users.len());

    writer.ok(&SearchResponse {
        count: users.len(),
        users,
    })
}
