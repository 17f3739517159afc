// src/main.rs
use std::env;
use dotenvy::dotenv;
use household_budget::{backend, cli, config::Config, database, logging};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Config::from_env()?;

    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "server" {
        logging::init_stderr(&config.log_filter);
        info!(db_url = %config.database_url, "starting backend server");

        let pool = database::db::connection::get_db_pool(&config.database_url).await?;
        database::db::migrate::run_migrations(&pool).await?;
        backend::run_server(pool, config.bind_addr).await?;
    } else {
        logging::init_file(&config.log_filter, &config.log_file)?;
        cli::run(&config).await?;
    }
    Ok(())
}
