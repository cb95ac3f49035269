//! # Orgstore API Library
//!
//! This library provides the core functionality for the Orgstore API
//! service: per-organization storage provisioning over a shared database,
//! with an authoritative organization directory kept in step with a
//! dynamic namespace of per-tenant collections.

pub mod auth;
pub mod collections;
pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod repositories;
pub mod sanitize;
pub mod server;
pub use migration;
