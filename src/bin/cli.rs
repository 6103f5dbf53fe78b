use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;

use propresenter_control::broadcast::{self, BroadcastHandler};
use propresenter_control::error::DriverError;
use propresenter_control::registry::execute::execute;
use propresenter_control::registry::validation::{session_needs, validate_intent};
use propresenter_control::registry::{catalog, CompileContext, Compiled, Intent};
use propresenter_control::settings::{self, ConnectionArgs};
use propresenter_control::state::Instance;
use propresenter_control::transport::link::LinkClient;
use propresenter_control::transport::socket::RemoteSocket;
use propresenter_control::variables::{NoVariables, SessionVariables};

/// How long `send` waits for the remote to report its current slide and
/// presentation before giving up on intents that resolve against them.
const SESSION_SYNC_TIMEOUT: Duration = Duration::from_secs(3);

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "propresenter-cli",
    about = "One-shot ProPresenter control CLI",
    version,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List every intent
    List,
    /// Show help for a category or an intent
    Help { topic: Option<String> },
    /// Compile an intent and print the result without sending it
    Compile {
        intent: String,
        /// Options as a JSON object
        options: Option<String>,
        /// Current slide index (0-based) to resolve relative slides against
        #[arg(long, default_value_t = 0)]
        slide_index: i64,
        /// Current presentation path
        #[arg(long, default_value = "")]
        presentation_path: String,
    },
    /// Connect, send one intent, and exit
    Send {
        intent: String,
        /// Options as a JSON object
        options: Option<String>,
        /// Keep the connection open this many seconds to complete discovery
        /// intents (slide_label, group_slide)
        #[arg(long, default_value_t = 0)]
        wait: u64,
    },
    /// Write settings.json from the current flags
    Config {
        /// Password for the remote-control socket
        #[arg(long)]
        password: Option<String>,
    },
}

// ── Helpers ──────────────────────────────────────────────────────

fn fail(e: &DriverError) -> ! {
    eprintln!("Error: {e}");
    process::exit(1);
}

fn parse_intent(name: &str, options: Option<&str>) -> Result<Intent, DriverError> {
    let options: Value = match options {
        Some(text) => serde_json::from_str(text)?,
        None => Value::Null,
    };
    let intent = Intent::from_request(name, &options)?;
    validate_intent(&intent)?;
    Ok(intent)
}

fn print_compiled(compiled: &Compiled, raw: bool) {
    if raw {
        println!("{}", serde_json::to_string_pretty(compiled).unwrap_or_default());
    } else {
        println!("{}", compiled.summary());
    }
}

fn print_list(raw: bool) {
    let registry = catalog::intent_registry();
    if raw {
        println!("{}", serde_json::to_string_pretty(&registry).unwrap_or_default());
        return;
    }
    for entry in registry {
        let mut flags = Vec::new();
        if entry.discovery {
            flags.push("discovery");
        }
        if entry.link {
            flags.push("link");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!("{:<26} {}{flags}", entry.name, entry.description);
    }
}

// ── Subcommands ──────────────────────────────────────────────────

async fn run_compile(
    settings: settings::ConnectionSettings,
    name: &str,
    options: Option<&str>,
    slide_index: i64,
    presentation_path: String,
    raw: bool,
) {
    let intent = parse_intent(name, options).unwrap_or_else(|e| fail(&e));
    let instance = Instance::new(settings);
    instance.with_session_mut(|s| {
        s.slide_index = slide_index;
        s.presentation_path = presentation_path;
    });
    let ctx = CompileContext::new(&instance, &NoVariables);
    match intent.compile(&ctx).await {
        Ok(compiled) => print_compiled(&compiled, raw),
        Err(e) => fail(&e),
    }
}

async fn run_send(
    settings: settings::ConnectionSettings,
    name: &str,
    options: Option<&str>,
    wait: u64,
    raw: bool,
) {
    let intent = parse_intent(name, options).unwrap_or_else(|e| fail(&e));
    let link = LinkClient::new(&settings).unwrap_or_else(|e| fail(&e));

    // Link intents never touch the socket.
    let (socket, mut frames) = if intent.info().link {
        (None, None)
    } else {
        let (socket, frames) = RemoteSocket::connect(&settings)
            .await
            .unwrap_or_else(|e| fail(&e));
        (Some(socket), Some(frames))
    };

    let instance = Arc::new(Instance::new(settings));
    let handler = BroadcastHandler::new(Arc::clone(&instance));

    // Relative slides and blank paths resolve against what the remote is
    // showing, so hear that first.
    let needs = session_needs(&intent);
    if needs.any() {
        let synced = match frames.as_mut() {
            Some(frames) => tokio::time::timeout(
                SESSION_SYNC_TIMEOUT,
                broadcast::pump_until(&handler, frames, &socket, |s| needs.met_by(s)),
            )
            .await
            .unwrap_or(false),
            None => false,
        };
        if !synced {
            fail(&DriverError::InvalidIntent {
                message: "the remote did not report its current slide and presentation; \
                          pass an absolute slide and a full presentation path"
                    .into(),
            });
        }
    }

    let variables = SessionVariables {
        instance: &instance,
    };
    let ctx = CompileContext::new(&instance, &variables);
    let discovery = intent.info().discovery;

    match execute(&ctx, intent, &socket, &link).await {
        Ok(compiled) => print_compiled(&compiled, raw),
        Err(e) => fail(&e),
    }

    if let (Some(frames), true) = (frames, wait > 0) {
        let pump = broadcast::pump(&handler, frames, &socket);
        // Returns early only if the remote drops the connection.
        let _ = tokio::time::timeout(Duration::from_secs(wait), pump).await;
    } else if discovery {
        eprintln!("Note: discovery intents complete only while connected; pass --wait <secs>.");
    }

    if let Some(socket) = socket {
        if !socket.is_connected() {
            fail(&DriverError::NotConnected);
        }
        socket.close().await;
    }
}

fn run_config(args: &ConnectionArgs, password: Option<String>) {
    let mut settings = args.resolve();
    if let Some(password) = password {
        settings.password = password;
    }
    let dir = args.config_dir();
    match settings::save_settings(&dir, &settings) {
        Ok(()) => println!(
            "Wrote {}",
            propresenter_control::paths::settings_path(&dir).display()
        ),
        Err(e) => fail(&e),
    }
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    propresenter_control::init_logging();
    let cli = Cli::parse();
    let raw = cli.json;

    match cli.command {
        Commands::List => print_list(raw),
        Commands::Help { topic } => println!("{}", catalog::help_text(topic.as_deref())),
        Commands::Compile {
            intent,
            options,
            slide_index,
            presentation_path,
        } => {
            run_compile(
                cli.connection.resolve(),
                &intent,
                options.as_deref(),
                slide_index,
                presentation_path,
                raw,
            )
            .await;
        }
        Commands::Send {
            intent,
            options,
            wait,
        } => run_send(cli.connection.resolve(), &intent, options.as_deref(), wait, raw).await,
        Commands::Config { password } => run_config(&cli.connection, password),
    }
}
