//! Short PUT Screener
//!
//! Screens configured ticker groups for short PUT candidates and posts the
//! best contracts to Discord.

use anyhow::Result;

use shortput::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (webhook URLs go here, not in the config file)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
