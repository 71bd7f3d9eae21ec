pub mod auth;
pub mod client;
pub mod config;
pub mod humanize;
pub mod mapping;
pub mod media;
pub mod observability;
pub mod registry;
pub mod session;
pub mod workflow;
