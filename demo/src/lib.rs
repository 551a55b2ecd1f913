//! Example service wired from the kit crates.

pub mod config;
pub mod error;
pub mod handlers;
pub mod store;
pub mod validation;

use actix_web::web;
use kit_http::{JsonWriter, Reader};

use config::DemoConfig;
use store::UserStore;

/// Everything the handlers share. Clone per worker.
#[derive(Clone)]
pub struct AppState {
    pub store: UserStore,
    pub reader: Reader,
    pub writer: JsonWriter,
}

impl AppState {
    pub fn new(config: &DemoConfig) -> kit_validator::Result<Self> {
        let reader = Reader::new(validation::validator()?).with_body_limit(config.server.body.limit);

        Ok(Self {
            store: UserStore::new(config.password.cost),
            reader,
            writer: JsonWriter::new().with_error_problem_mapper(error::problem_for),
        })
    }

    /// Registers shared data and every route.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.store.clone()))
            .app_data(web::Data::new(self.reader.clone()))
            .app_data(web::Data::new(self.writer.clone()))
            .service(handlers::health_check)
            .service(handlers::create_user)
            .service(handlers::search_users)
            .service(handlers::login);
    }
}
