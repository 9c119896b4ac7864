//! dbflow-core — database flow core library.
//!
//! This crate exposes the pipeline layers as public modules, plus the shared
//! types used across all layers.
//!
//! # Architecture
//!
//! ```text
//! RawLogRow ──► Adapter ──► Grouper ──► Reducer ──► Graph ──► Export
//!                  │                       │
//!            Canonicalizer           TableExtractor
//! ```
//!
//! Everything here is synchronous and free of I/O; rows are fetched by
//! `dbflow-feeds` and outputs written by the binary.

pub mod adapter;
pub mod canonicalizer;
pub mod config;
pub mod export;
pub mod reducer;
pub mod tables;
pub mod types;

pub use adapter::{AdapterOptions, LogAdapter};
pub use canonicalizer::{canonicalize, generalize};
pub use export::OutputFormat;
pub use reducer::{build_graph, Group, Grouper};
pub use tables::{KeywordTableExtractor, TableExtractor};
pub use types::{Edge, Graph, NormalizedEntry, RawLogRow};
