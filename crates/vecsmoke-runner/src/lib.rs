//! # vecsmoke-runner
//!
//! Verifies that a vector store endpoint can create a collection, accept an
//! upsert and answer a similarity search.
//!
//! ```rust
//! use vecsmoke_client::MemoryStore;
//! use vecsmoke_runner::{RunConfig, SmokeTestRunner};
//! use vecsmoke_types::{CollectionSpec, Distance, SampleSet};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = SmokeTestRunner::new(MemoryStore::new());
//! let config = RunConfig::new(
//!     CollectionSpec::new("smoke", 4, Distance::Cosine),
//!     SampleSet::builtin(),
//! );
//!
//! let report = runner.run(&config).await?;
//! assert_eq!(report.upserted, 2);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod guard;
pub mod report;
pub mod runner;

pub use config::{RunConfig, DEFAULT_LIMIT};
pub use error::RunError;
pub use guard::ConnectionGuard;
pub use report::{CollectionOutcome, ProbeReport, RunReport};
pub use runner::SmokeTestRunner;
