use config::AppConfig;
use ui::App;

mod config;
mod ui;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let config = AppConfig::from_env();
    config::init_logging(&config)?;

    let mut app = App::new(&config);
    app.run().await?;

    Ok(())
}
