use anyhow::Result;
use clap::Parser;

use hobbyyk::{
    app::load_config,
    cli::{handle_command, Cli},
    runtime::{react_to_expiry, run, AppContext},
    utils::init_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        let toml_str = std::fs::read_to_string(config_path)?;
        toml::from_str(&toml_str)?
    } else {
        load_config().unwrap_or_default()
    };

    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }

    let ctx = AppContext::new(config).await?;

    match &cli.command {
        Some(command) => {
            let result = handle_command(command, &ctx).await;
            // A 401/403 during the command raises the expiry signal; react
            // before surfacing the command's own error
            if react_to_expiry(&ctx.store).await? {
                return Ok(());
            }
            result
        }
        None => run(&ctx).await,
    }
}
