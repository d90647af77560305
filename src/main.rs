use std::pin::pin;

use clap::Parser;
use color_eyre::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ssewire::cli::Cli;
use ssewire::{ClientConfig, ConnectionState, StreamClient};

/// Install the fmt subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli
        .apply(ClientConfig::from_env()?)
        .with_on_message(|payload| println!("{}", payload))
        .with_on_connect(|| info!("Listening for events"))
        .with_on_error(|err| {
            warn!(
                code = err.error_code(),
                retryable = err.is_retryable(),
                "Stream error: {}",
                err
            )
        });

    let client = StreamClient::new(config)?;
    info!("Connecting to {}", client.endpoint());

    let mut state_rx = client.state_receiver();
    client.connect();

    let mut shutdown = pin!(tokio::signal::ctrl_c());
    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    error!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Shutting down");
                break;
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *state_rx.borrow_and_update();
                match state {
                    ConnectionState::Exhausted => {
                        error!(
                            "Giving up after {} reconnect attempts",
                            client.config().max_reconnect_attempts
                        );
                        break;
                    }
                    ConnectionState::Disconnected => {
                        info!("Stream ended");
                        break;
                    }
                    other => tracing::debug!("Connection state: {}", other.as_str()),
                }
            }
        }
    }

    client.disconnect();
    Ok(())
}
