//! REST client for the GitHub commits API.
//!
//! Implements the `CommitSource` collaborator trait from
//! `shipnotes_core::clients`. Authentication is a configured personal
//! access token sent as a bearer header; there is no OAuth flow here.

mod client;
mod wire;

pub use client::GithubClient;
