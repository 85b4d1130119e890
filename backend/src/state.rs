use std::sync::Arc;

use crate::{config::Config, db::connection::DbPool, utils::email::Mailer};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            pool,
            config,
            mailer,
        }
    }
}
