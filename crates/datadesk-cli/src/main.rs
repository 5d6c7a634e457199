//! Datadesk CLI - Describe CSV and PDF files, store them, and index them for search.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::ApiKeys;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Datadesk - Describe, store and index your data files
#[derive(Parser)]
#[command(name = "datadesk")]
#[command(author = "Lalo Morales <lalomorales22@github.com>")]
#[command(version)]
#[command(about = "Describe, store and index your data files", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Cohere API key (overrides cohere.api_key)
    #[arg(long, global = true, env = "COHERE_API_KEY", hide_env_values = true)]
    cohere_api_key: Option<String>,

    /// Pinecone API key (overrides pinecone.api_key)
    #[arg(long, global = true, env = "PINECONE_API_KEY", hide_env_values = true)]
    pinecone_api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Datadesk (create config and database)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Show the metadata a file needs before it can be ingested
    Spec {
        /// Path to a CSV or PDF file
        path: String,
    },

    /// Describe a file, store it and index it
    Ingest {
        /// Path to a CSV or PDF file
        path: String,

        /// JSON file with metadata (an object or an array of objects); repeatable
        #[arg(short, long = "metadata")]
        metadata: Vec<String>,

        /// Metadata field as key=value; repeatable, applied after --metadata
        #[arg(short, long = "set")]
        set: Vec<String>,

        /// Fail instead of prompting for missing fields
        #[arg(long)]
        no_input: bool,

        /// Build the record without writing or indexing it
        #[arg(long)]
        dry_run: bool,

        /// Store the record but skip the vector index
        #[arg(long)]
        no_index: bool,
    },

    /// List stored datasets and documents
    List {
        /// Maximum number of records of each kind
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show details of a stored record
    Show {
        /// Dataset or document ID
        id: String,
    },

    /// Send records to the vector index
    #[command(subcommand)]
    Index(IndexCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Open config file in editor
    Edit,

    /// Print the config file location
    Path,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., vectorstore.use_local)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Subcommand)]
enum IndexCommands {
    /// Index a stored dataset with its columns and categorical values
    Dataframe {
        /// Dataset ID
        id: String,
    },

    /// Index a stored document with its full text
    Unstructured {
        /// Document ID
        id: String,
    },

    /// Index an ad-hoc document; `id` and `type` fields are required
    Doc {
        /// Field as key=value, in order; repeatable
        #[arg(short, long = "field", required = true)]
        field: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("datadesk=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("datadesk=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let keys = ApiKeys {
        cohere: cli.cohere_api_key,
        pinecone: cli.pinecone_api_key,
    };

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Edit => commands::config::edit(),
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value),
        },
        Commands::Spec { path } => commands::spec::run(&path),
        Commands::Ingest {
            path,
            metadata,
            set,
            no_input,
            dry_run,
            no_index,
        } => commands::ingest::run(
            &path,
            commands::ingest::IngestOptions {
                metadata_files: metadata,
                assignments: set,
                interactive: !no_input,
                dry_run,
                index: !no_index,
            },
            &keys,
        ),
        Commands::List { limit } => commands::list::run(limit),
        Commands::Show { id } => commands::show::run(&id),
        Commands::Index(cmd) => match cmd {
            IndexCommands::Dataframe { id } => commands::index::dataframe(&id, &keys),
            IndexCommands::Unstructured { id } => commands::index::unstructured(&id, &keys),
            IndexCommands::Doc { field } => commands::index::doc(&field, &keys),
        },
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
