//! dbflow — database flow graphs from SQL call logs.
//!
//! Reads SQL log rows, collapses every query into its canonical shape and
//! emits one weighted edge per `(database, shape)` between the calling code
//! and the table.
//!
//! # Architecture
//!
//! ```text
//! Feed ──► Adapter ──► Grouper/Reducer ──► Graph ──► Export
//! ```
//!
//! The feeds live in `dbflow-feeds`, everything between them and the files
//! written lives in `dbflow-core`; [`flow`] wires the two together.

pub mod flow;

pub use flow::{get_flow, graph_from_rows, write_outputs, FlowOptions};
