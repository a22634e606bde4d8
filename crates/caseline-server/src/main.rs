use std::path::PathBuf;

use anyhow::Result;
use caseline_server::commands::{self, AttachOptions};
use caseline_server::config::ServerConfig;
use caseline_server::{app_state, auth};
use caseline_service::LocalCaseStore;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "caseline-server", about = "Case lookup and attachment download service")]
struct Cli {
    #[command(flatten)]
    config: ServerConfig,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Load cases from a JSON array file, replacing cases with the same id
    ImportCases {
        /// Path to the JSON file
        path: PathBuf,
    },
    /// Store a file as a base64 attachment and print its id
    Attach {
        /// File to store
        path: PathBuf,
        /// Case the attachment belongs to
        #[arg(long)]
        case_id: Option<String>,
        /// Mime type; guessed from the extension when omitted
        #[arg(long)]
        mime_type: Option<String>,
        /// Attachment id; a UUID is generated when omitted
        #[arg(long)]
        id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db = caseline_db::open_database(&cli.config.db_config()).await?;

    match cli.command {
        Some(Commands::ImportCases { path }) => {
            let store = LocalCaseStore::new(db);
            commands::import_cases(&store, &path).await?;
        }
        Some(Commands::Attach {
            path,
            case_id,
            mime_type,
            id,
        }) => {
            let opts = AttachOptions {
                attachment_id: id,
                case_id,
                mime_type,
            };
            let attachment = commands::attach_file(&*db, &path, opts).await?;
            // Print the id to stdout so it can be captured
            println!("{}", attachment.attachment_id);
        }
        Some(Commands::Serve) | None => {
            let addr = cli.config.socket_addr();
            let auth = auth::build_auth_config(cli.config.api_key.as_deref());
            if auth.is_some() {
                info!("authentication enabled");
            } else {
                info!("authentication disabled (no CASELINE_API_KEY)");
            }

            let listener = TcpListener::bind(addr).await?;
            info!("caseline-server listening on http://{addr}");

            caseline_server::serve(listener, app_state(db, auth)).await?;
        }
    }

    Ok(())
}
