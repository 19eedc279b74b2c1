//! Language-model client, prompt construction, and resilient output
//! parsing.
//!
//! The client implements the `ChangelogModel` collaborator trait from
//! `shipnotes_core::clients` and returns raw completions; recovering a
//! JSON value from that free text is the job of [`repair`], which the
//! pipeline calls so the whole recovery path is testable with canned text.

mod client;
pub mod prompt;
pub mod repair;

pub use client::LlmClient;
