//! libcat CLI tool
//!
//! Command-line client for the library catalog backend.
//!
//! ## Commands
//!
//! - `books`: Print the catalog with availability
//! - `graph`: Print the ontology graph, optionally the viewer link of one node
//! - `entity <type> <id>`: Print one entity with resolved references and its description
//! - `borrow`, `return`, `clear`: Change borrowing state (asks for confirmation unless `--yes`)
//! - `sparql`: Run a query through the backend's SPARQL passthrough
//! - `chat`: Talk to the catalog assistant on stdin
//! - `serve`: Serve the browser front-end and forward `/api` to the backend
//!
//! ## Configuration
//!
//! Settings are read from `--config` (default `libcat.toml`; a missing file means defaults).
//! `LIBCAT_BASE_URL` overrides the configured backend, and `--base-url` overrides both.

use clap::{Parser, Subcommand};
use libcat::{
    api::{native::HttpTransport, ApiClient},
    chat::ChatWidget,
    config::ClientConfig,
    forms::{BorrowForm, ReturnForm, Submission},
    page::{CatalogPage, ViewMode},
    sparql::{SparqlConsole, SparqlForm},
    viewer::{ViewerPage, ViewerParams},
    CatalogError,
};
use std::{
    io::{self, BufRead},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

mod dev_server;
mod terminal;

use terminal::Terminal;

#[derive(Parser)]
#[command(name = "libcat")]
#[command(author, version, about = "A client for the library catalog backend", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "libcat.toml")]
    config: PathBuf,

    /// Backend origin (e.g., <http://127.0.0.1:5000>)
    /// Can also be set via LIBCAT_BASE_URL environment variable
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the catalog
    Books,

    /// Print the ontology graph
    Graph {
        /// Also print the viewer link for this node id
        #[arg(long)]
        open: Option<String>,
    },

    /// Print one entity with its resolved references and description
    Entity {
        /// Entity type: Book, Author, Publisher or Genre
        entity_type: String,

        /// Entity id (short id or full URI)
        id: String,
    },

    /// Lend a book
    Borrow {
        /// Book URI
        #[arg(long)]
        book_id: String,

        #[arg(long)]
        name: String,

        /// Borrower category (e.g., Student, Faculty)
        #[arg(long)]
        borrower_type: String,

        /// Borrow date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Return a borrowed book
    Return {
        /// Book URI
        #[arg(long)]
        book_id: String,

        /// Return date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove every borrowing record
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Run a SPARQL query through the backend
    Sparql {
        /// SPARQL endpoint URL (default: `[sparql] default_endpoint` from the config)
        #[arg(long)]
        endpoint: Option<String>,

        /// Query text
        #[arg(long, conflicts_with = "query_file")]
        query: Option<String>,

        /// Read the query from a file
        #[arg(long)]
        query_file: Option<PathBuf>,
    },

    /// Chat with the catalog assistant (one message per line, `exit` to quit)
    Chat,

    /// Serve the browser front-end
    Serve {
        /// Directory containing the page shells and the wasm package
        #[arg(long, default_value = "static")]
        static_dir: PathBuf,

        /// Port for dev server (default: 9037)
        #[arg(long, default_value = "9037")]
        port: u16,
    },
}

fn load_config(cli: &Cli) -> Result<ClientConfig, CatalogError> {
    let mut config = ClientConfig::load(&cli.config)?.with_env_overrides();
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    config.validate()?;
    tracing::debug!("Using backend {}", config.base_url);
    Ok(config)
}

fn report(outcome: Submission) {
    match outcome {
        Submission::Accepted(_) => {}
        Submission::Declined => println!("Cancelled"),
        Submission::Invalid | Submission::Rejected(_) | Submission::Failed => {
            std::process::exit(1)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let client = ApiClient::new(HttpTransport::new(&config)?);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli.command, client, &config))
}

async fn run(
    command: Commands,
    client: ApiClient<HttpTransport>,
    config: &ClientConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Books => {
            CatalogPage::new(client, Terminal::default())
                .load_table()
                .await?;
        }

        Commands::Graph { open } => {
            let page = CatalogPage::new(client, Terminal::default());
            match open {
                None => page.set_view(ViewMode::Graph).await?,
                Some(node_id) => {
                    page.render_graph().await?;
                    match page.open_node(&node_id) {
                        Some(link) => println!("{}", link.href()),
                        None => {
                            eprintln!("Error: {node_id} is not a viewable node");
                            std::process::exit(1);
                        }
                    }
                }
            }
        }

        Commands::Entity { entity_type, id } => {
            let page = ViewerPage::new(client, Terminal::default());
            page.display(&ViewerParams { entity_type, id }).await?;
        }

        Commands::Borrow {
            book_id,
            name,
            borrower_type,
            date,
            yes,
        } => {
            let page = CatalogPage::new(client, Terminal::new(yes));
            report(
                page.borrow(BorrowForm {
                    book_id,
                    borrower_name: name,
                    borrower_type,
                    borrow_date: date,
                })
                .await,
            );
        }

        Commands::Return { book_id, date, yes } => {
            let page = CatalogPage::new(client, Terminal::new(yes));
            report(
                page.return_book(ReturnForm {
                    book_id,
                    return_date: date,
                })
                .await,
            );
        }

        Commands::Clear { yes } => {
            let page = CatalogPage::new(client, Terminal::new(yes));
            report(page.clear().await);
        }

        Commands::Sparql {
            endpoint,
            query,
            query_file,
        } => {
            let query = match (query, query_file) {
                (Some(query), _) => query,
                (None, Some(path)) => std::fs::read_to_string(path)?,
                (None, None) => String::new(),
            };
            let endpoint = endpoint
                .or_else(|| config.sparql.default_endpoint.clone())
                .unwrap_or_default();
            let console =
                SparqlConsole::new(client, Terminal::default(), config.sparql.encoding);
            if console
                .submit(&SparqlForm::new(endpoint, query))
                .await
                .is_none()
            {
                std::process::exit(1);
            }
        }

        Commands::Chat => {
            let widget = ChatWidget::new(client, Terminal::default());
            widget.init().await?;
            for line in io::stdin().lock().lines() {
                let line = line?;
                if matches!(line.trim(), "exit" | "quit") {
                    break;
                }
                if let Err(err) = widget.send(&line).await {
                    tracing::debug!("Message not delivered: {err}");
                }
            }
        }

        Commands::Serve { static_dir, port } => serve(static_dir, port, config).await?,
    }
    Ok(())
}

async fn serve(
    static_dir: PathBuf,
    port: u16,
    config: &ClientConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = url::Url::parse(&config.base_url)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\nShutting down...");
        r.store(false, Ordering::SeqCst);
    })?;

    // Shutdown signal based on running flag
    let shutdown = async move {
        while running.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    };
    dev_server::DevServer::new(static_dir, port, backend)
        .serve(shutdown)
        .await?;

    println!("Shutdown complete");
    Ok(())
}
