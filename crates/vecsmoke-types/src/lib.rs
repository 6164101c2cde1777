//! # vecsmoke-types
//!
//! Shared domain types for the vecsmoke harness.
//!
//! This crate defines the data that flows between the runner and a vector store:
//! - Points: vectors with an identifier and an optional scalar payload
//! - Collections: name, dimensionality and distance metric
//! - Search results: scored hits returned by the remote service
//! - Settings: layered configuration for a smoke-test run
//!
//! ## Usage
//!
//! ```rust
//! use vecsmoke_types::{CollectionSpec, Distance, Point};
//!
//! let spec = CollectionSpec::new("smoke", 4, Distance::Cosine);
//! let point = Point::new(1, vec![0.32, 0.52, 0.21, 0.52]).with_payload_entry("color", "red");
//! assert!(spec.validate_points(&[point]).is_ok());
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod point;
pub mod sample;
pub mod search;

pub use collection::{CollectionInfo, CollectionSpec, Distance};
pub use config::{CollectionPolicy, Settings};
pub use error::{SmokeError, ValidationError};
pub use point::{Payload, PayloadValue, Point, PointId};
pub use sample::SampleSet;
pub use search::SearchResult;
