//! MultiAuth passcode server binary.
//!
//! Reads its configuration from the TOML file named by the first argument
//! or `MULTIAUTH_CONFIG`, falling back to defaults.

use multiauth_passcode::PasscodeRegistry;
use multiauth_server::{AppConfig, PasscodeServer, load_config};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MULTIAUTH_CONFIG").ok())
    {
        Some(path) => load_config(&path)?,
        None => AppConfig::default(),
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(config.server.log_level()?)
        .init();

    // Create and run server
    let registry = Arc::new(PasscodeRegistry::system()?);
    let server = PasscodeServer::new(config, registry);
    server.run().await?;

    Ok(())
}
