//! CLI argument parsing for vecsmoke.
//!
//! Flags override every other configuration source.

use clap::{Args, Parser, Subcommand};

use vecsmoke_types::{CollectionPolicy, Distance, Settings};

/// Vector store smoke test
///
/// Creates a collection, upserts sample points and runs a similarity search
/// against a vector store endpoint.
#[derive(Parser, Debug)]
#[command(name = "vecsmoke")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/vecsmoke/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the smoke test: ensure collection, upsert, search
    Run(RunArgs),

    /// Check connectivity and whether the collection exists
    Check(EndpointArgs),

    /// Print effective settings (credential redacted)
    Config,
}

/// Endpoint overrides shared by `run` and `check`.
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
    /// Service host, optionally with scheme (e.g. localhost or https://x.cloud:6333)
    #[arg(long)]
    pub host: Option<String>,

    /// Service REST port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Use plain http when the host has no scheme
    #[arg(long)]
    pub no_tls: bool,

    /// Collection name
    #[arg(long)]
    pub collection: Option<String>,
}

impl EndpointArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(host) = &self.host {
            settings.host = Some(host.clone());
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if self.no_tls {
            settings.use_tls = false;
        }
        if let Some(collection) = &self.collection {
            settings.collection = collection.clone();
        }
    }
}

/// Options for `run`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    /// Distance metric (cosine, dot, euclidean)
    #[arg(long)]
    pub distance: Option<Distance>,

    /// Vector dimensionality; must match the points file
    #[arg(long)]
    pub vector_size: Option<u64>,

    /// Maximum number of search results
    #[arg(long)]
    pub limit: Option<u64>,

    /// JSON file with points and query vector
    #[arg(long)]
    pub points_file: Option<String>,

    /// Delete an existing collection and create it again
    #[arg(long)]
    pub recreate: bool,

    /// Delete the collection after the search
    #[arg(long)]
    pub cleanup: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Run against an in-process store instead of the network
    #[arg(long)]
    pub in_memory: bool,
}

impl RunArgs {
    pub fn apply(&self, settings: &mut Settings) {
        self.endpoint.apply(settings);
        if let Some(distance) = self.distance {
            settings.distance = distance;
        }
        if let Some(size) = self.vector_size {
            settings.vector_size = size;
        }
        if let Some(limit) = self.limit {
            settings.search_limit = limit;
        }
        if let Some(path) = &self.points_file {
            settings.points_file = Some(path.clone());
        }
        if self.recreate {
            settings.policy = CollectionPolicy::Recreate;
        }
        if self.cleanup {
            settings.cleanup = true;
        }
    }
}
