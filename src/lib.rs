// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Residue-level quality annotations for a molecular viewer.
//!
//! Resqual fetches per-residue validation data (Q-score, atom inclusion,
//! or geometry outlier summaries) for a loaded structure, maps each record
//! onto the model's residue ordinals, and serves the result to color
//! themes and hover labels.
//!
//! # Key entry points
//!
//! - [`report::QualityReportProvider`] - per-model store cache with
//!   reference-counted attach/detach
//! - [`behavior::QualityReportBehavior`] - theme registration, auto-attach
//!   and tooltips for a host viewer
//! - [`theme`] - per-residue colors and labels derived from a store
//! - [`options::Options`] - runtime configuration (server, metric,
//!   toggles)
//!
//! # Architecture
//!
//! The host model is consumed through [`model::StructureModel`]. A report
//! body is parsed into raw entries, resolved against the model by
//! [`report::IdentifierResolver`] and frozen into an immutable
//! [`report::ResidueIndexedStore`] shared behind an `Arc`. Concurrent
//! attaches for the same model wait on one in-flight fetch.

pub mod behavior;
pub mod error;
pub mod model;
pub mod options;
pub mod picking;
pub mod report;
pub mod theme;
pub mod util;
