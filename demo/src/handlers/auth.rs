use actix_web::{post, web, HttpRequest, HttpResponse};
use kit_http::{JsonWriter, ValidatedForm};
use kit_validator::{Fields, Validate};
use serde::{Deserialize, Serialize};

use crate::store::UserStore;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl Validate for LoginForm {
    fn fields(&self, fields: &mut Fields) {
        fields
            .field("username", &self.username, "required")
            .field("password", &self.password, "required");
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub message: String,
}

#[post("/login")]
pub async fn login(
    req: HttpRequest,
    ValidatedForm(form): ValidatedForm<LoginForm>,
    store: web::Data<UserStore>,
    writer: web::Data<JsonWriter>,
) -> HttpResponse {
    log::info!("Login attempt for user: {}", form.username);

    match store.login(&form.username, &form.password) {
        Ok(session) => writer.ok(&LoginResponse {
            success: true,
            token: session.token,
            message: "Login successful".to_string(),
        }),
        Err(err) => writer.write_error(&req, &err.into()),
    }
}
