pub mod auth;
pub mod health;
pub mod users;

pub use auth::login;
pub use health::health_check;
pub use users::{create_user, search_users};
