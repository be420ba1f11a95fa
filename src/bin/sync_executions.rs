//! Background worker refreshing workflow executions that are still running
//! in the external engine.

use std::time::Duration;

use dotenvy::dotenv;

use servicehub::db::establish_connection_pool;
use servicehub::models::config::ServerConfig;
use servicehub::repository::DieselRepository;
use servicehub::services::automation::sync_active_executions;
use servicehub::workflow::HttpWorkflowEngine;

#[actix_web::main]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let repo = DieselRepository::new(pool);

    let engine = match HttpWorkflowEngine::new(&server_config.workflow) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Failed to build workflow engine client: {e}");
            std::process::exit(1);
        }
    };

    let period = Duration::from_secs(server_config.workflow.poll_interval_secs.max(1));
    log::info!("Starting execution sync worker, polling every {period:?}");

    let mut ticker = actix_web::rt::time::interval(period);
    loop {
        ticker.tick().await;
        match sync_active_executions(&repo, &engine).await {
            Ok(0) => {}
            Ok(updated) => log::info!("Refreshed {updated} active executions"),
            Err(e) => log::error!("Error syncing executions: {e}"),
        }
    }
}
