use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::utils::AppError;

/// Server state — explicit dependency injection
///
/// The pool and the JWT service are constructed exactly once at process
/// start and handed to every handler through this struct; there is no
/// ambient singleton lookup anywhere in the crate. Cloning is shallow.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt: Arc<JwtService>,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool, jwt: Arc<JwtService>) -> Self {
        Self { config, pool, jwt }
    }

    /// Initialize state from configuration: open the database (running
    /// migrations) and build the JWT service.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.db_path).await?;
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
        Ok(Self::new(config.clone(), db.pool, jwt))
    }

    pub fn jwt_service(&self) -> Arc<JwtService> {
        self.jwt.clone()
    }
}
