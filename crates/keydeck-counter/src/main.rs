//! keydeck-counter - demonstration plugin with a per-key counter and a shared counter

mod counter;
mod synccounter;

use keydeck_rpc::{ConfigError, LaunchConfig, logging, serve};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match LaunchConfig::from_env() {
        Ok(config) => config,
        Err(ConfigError::Args(e)) => e.exit(),
        Err(e) => return Err(e.into()),
    };

    let log_path = logging::init("keydeck-counter");
    info!("Logging to {}", log_path.display());

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted, shutting down");
                trigger.cancel();
            }
            Err(e) => error!("Failed to listen for ctrl-c: {}", e),
        }
    });

    serve(
        &config,
        [counter::definition(), synccounter::definition()],
        shutdown,
    )
    .await?;

    info!("keydeck-counter stopped");
    Ok(())
}
