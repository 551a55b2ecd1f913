use actix_web::http::StatusCode;
use kit_http::Problem;

const CONFLICT_TYPE: &str = "https://kit.example/problems/username-taken";

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("Username {0:?} is already taken")]
    UsernameTaken(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

pub type Result<T> = std::result::Result<T, DemoError>;

impl Problem for DemoError {
    fn type_uri(&self) -> &str {
        match self {
            DemoError::UsernameTaken(_) => CONFLICT_TYPE,
            _ => kit_http::response::ABOUT_BLANK,
        }
    }

    fn title(&self) -> &str {
        match self {
            DemoError::UsernameTaken(_) => "Username taken",
            _ => self.status().canonical_reason().unwrap_or_default(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            DemoError::UsernameTaken(_) => StatusCode::CONFLICT,
            DemoError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            DemoError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> &str {
        match self {
            DemoError::UsernameTaken(_) => "Choose a different username",
            DemoError::InvalidCredentials => "Username or password is incorrect",
            DemoError::PasswordHash(_) => "Internal Server Error",
        }
    }
}

/// Error mapper for the app's [`kit_http::JsonWriter`].
pub fn problem_for(err: &anyhow::Error) -> Option<Box<dyn Problem + Send>> {
    let err = err.downcast_ref::<DemoError>()?;
    if let DemoError::PasswordHash(source) = err {
        log::error!("Password hashing failed: {}", source);
        return None;
    }

    let problem = kit_http::ProblemBuilder::new()
        .with_type(err.type_uri())
        .with_title(err.title())
        .with_status(err.status())
        .with_detail(err.detail())
        .build();
    Some(Box::new(problem))
}
