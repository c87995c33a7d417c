// Seeds a local database with sample events, opportunities and shifts.

use volunteer_scheduler::{config::Config, data_seeder, database::Database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    println!("Seeding sample data into {}", config.database.url);

    let database = Database::new(&config.database.url).await?;
    database.init().await?;

    data_seeder::seed_sample_data(&database).await?;

    Ok(())
}
