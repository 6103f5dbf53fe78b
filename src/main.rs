use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};

use propresenter_control::api::{self, ApiState};
use propresenter_control::broadcast::{self, BroadcastHandler};
use propresenter_control::settings::ConnectionArgs;
use propresenter_control::state::Instance;
use propresenter_control::transport::link::LinkClient;
use propresenter_control::transport::socket::RemoteSocket;

#[derive(Parser)]
#[command(
    name = "propresenter-control",
    about = "Long-running ProPresenter driver with a local trigger API",
    version
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Port for the local trigger API (0 picks a free port)
    #[arg(long, default_value_t = 7070)]
    api_port: u16,

    /// Drop discovery requests the remote has not answered after this many
    /// seconds
    #[arg(long)]
    slot_ttl: Option<u64>,
}

#[tokio::main]
async fn main() {
    propresenter_control::init_logging();
    let cli = Cli::parse();

    let settings = cli.connection.resolve();
    let link = match LinkClient::new(&settings) {
        Ok(link) => link,
        Err(e) => {
            error!("cannot build link client: {e}");
            std::process::exit(1);
        }
    };

    let (socket, frames) = match RemoteSocket::connect(&settings).await {
        Ok((socket, frames)) => (Some(socket), Some(frames)),
        Err(e) => {
            warn!("remote unreachable, socket intents will fail: {e}");
            (None, None)
        }
    };

    let instance = Arc::new(Instance::new(settings));
    let state = Arc::new(ApiState {
        instance: Arc::clone(&instance),
        socket,
        link,
    });

    if let Some(frames) = frames {
        let pump_state = Arc::clone(&state);
        tokio::spawn(async move {
            let handler = BroadcastHandler::new(Arc::clone(&pump_state.instance));
            broadcast::pump(&handler, frames, &pump_state.socket).await;
            warn!("remote connection ended, socket intents will fail");
        });
    }

    if let Some(ttl) = cli.slot_ttl {
        let expiry_instance = Arc::clone(&instance);
        tokio::spawn(async move {
            let max_age = Duration::from_secs(ttl);
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            loop {
                ticker.tick().await;
                let expired = expiry_instance.correlation.expire_older_than(max_age);
                if expired > 0 {
                    info!(expired, "expired unanswered discovery requests");
                }
            }
        });
    }

    if let Err(e) = api::start_api_server(state, cli.api_port).await {
        error!("cannot start API server: {e}");
        std::process::exit(1);
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("signal handler failed: {e}");
    }
    info!("shutting down");
}
