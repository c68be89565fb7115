mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Static site generator for personal blogs", long_about = None)]
struct Cli {
    /// Log debug diagnostics to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Scaffold a new site directory
    Init {
        /// Directory to create the site in
        path: PathBuf,

        /// Blog title
        #[arg(long)]
        title: Option<String>,

        /// Author name
        #[arg(long)]
        name: Option<String>,

        /// Author email
        #[arg(long)]
        email: Option<String>,

        /// Canonical site URL
        #[arg(long)]
        link: Option<String>,
    },

    /// Validate site configuration and posts
    Validate {
        /// Path to site directory
        path: PathBuf,
    },

    /// Preview site locally with hot reload
    Preview {
        /// Path to site directory
        path: PathBuf,

        /// Port to serve on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Build the static site
    Build {
        /// Path to site directory
        path: PathBuf,

        /// Output directory for generated site
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Query the search index from the terminal
    Search {
        /// Path to site directory
        path: PathBuf,

        /// Search query
        query: String,

        /// Print hits as JSON
        #[arg(long)]
        json: bool,

        /// Maximum number of hits to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Init {
            path,
            title,
            name,
            email,
            link,
        } => commands::init::run(path, title, name, email, link).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Preview { path, port } => commands::preview::run(path, port).await,
        Command::Build { path, output } => commands::build::run(path, output).await,
        Command::Search {
            path,
            query,
            json,
            limit,
        } => commands::search::run(path, query, json, limit).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "folio", &mut io::stdout());
            Ok(())
        }
    }
}
