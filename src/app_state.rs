use crate::{config::Config, database::Database, error::AppResult, services::SchedulerService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub scheduler: SchedulerService,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        // Initialize database
        let database = Database::new(&config.database.url).await?;
        database.init().await?;

        let scheduler = SchedulerService::new(Arc::new(database));

        Ok(Self { scheduler, config })
    }
}
