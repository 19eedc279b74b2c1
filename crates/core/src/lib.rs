//! Domain types and logic shared by every shipnotes crate.
//!
//! No I/O lives here: the database layer, HTTP clients, and the pipeline
//! all depend on this crate, never the other way around.

pub mod analysis;
pub mod changelog;
pub mod clients;
pub mod commit;
pub mod error;
pub mod generation;
pub mod options;
pub mod roles;
pub mod types;
