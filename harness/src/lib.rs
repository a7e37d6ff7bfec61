//! # echt-harness
//!
//! Drives every [`echt`] backend through the same load and resolve workload
//! and records how long each step took.
//!
//! ## Example
//!
//! ```rust
//! use echt::BackendKind;
//! use echt_harness::{compare, Dataset, DatasetSpec, TrialConfig};
//!
//! let dataset = Dataset::synthetic(DatasetSpec {
//!     size: 500,
//!     ..DatasetSpec::default()
//! });
//! let config = TrialConfig {
//!     resolving_batch_sizes: vec![50],
//!     ..TrialConfig::default()
//! };
//!
//! for report in compare(&BackendKind::ALL, &dataset, &config) {
//!     assert_eq!(report.unexpected, 0);
//!     println!("{}: {} bytes", report.backend, report.approximate_size);
//! }
//! ```

#![warn(clippy::all)]

pub mod dataset;
pub mod journal;
pub mod shared;
pub mod trial;

pub use dataset::{Dataset, DatasetSpec};
pub use journal::{Journal, LoadRow, ResolveRow};
pub use shared::{OwnedMatch, SharedBackend};
pub use trial::{compare, verify_agreement, Disagreement, Trial, TrialConfig, TrialReport};
