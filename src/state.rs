use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::dispatch::DispatchTable;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub dispatch: DispatchTable,
    pub client: reqwest::Client,
}
