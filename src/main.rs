use color_eyre::eyre::Result;
use dotenv::dotenv;
use mentormesh_api::config::ApiConfig;
use mentormesh_db::{create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = ApiConfig::from_env()?;

    let db_pool = create_pool(&config.database_url, config.database_max_connections).await?;

    // Bootstrap the schema so a fresh database can serve immediately
    initialize_database(&db_pool).await?;

    mentormesh_api::start_server(config, db_pool).await?;

    Ok(())
}
