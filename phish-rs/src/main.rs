//! phish-rs: phishing classifier service
//!
//! Loads the trained model once, then serves classification, health,
//! history and analytics over HTTP.
//!
//! Usage: `phish-rs [config.toml]`

use phish_rs::{logging, ApiServer, Config, FusionPolicy, PhishError, ScanHistory, Scorer};
use std::path::Path;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref().map(Path::new))?;

    logging::init(&config.logging)?;

    info!("Starting phish-rs v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Configuration loaded from {}", path),
        None => info!("No config file specified, using defaults and environment"),
    }

    let policy = FusionPolicy::from(&config.decision);
    let scorer = match Scorer::load(&config.model.path, policy) {
        Ok(scorer) => scorer,
        Err(PhishError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                "Model not found at {}. Run phish-train first; predictions will return 503",
                config.model.path
            );
            Scorer::unavailable(policy)
        }
        Err(e) => return Err(e.into()),
    };

    let history = if config.history.enabled {
        let history = ScanHistory::connect(&config.history.database_url).await?;
        history.init_db().await?;
        info!("Scan history enabled ({})", config.history.database_url);
        Some(history)
    } else {
        info!("Scan history disabled");
        None
    };

    let server = ApiServer::new(
        scorer,
        history,
        config.history.max_results,
        config.server.listen_addr.clone(),
    );
    server.run().await?;

    Ok(())
}
