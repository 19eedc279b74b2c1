pub mod admin;
pub mod auth;
pub mod changelog;
pub mod dashboard;
pub mod generation;
pub mod public;
pub mod repository;
