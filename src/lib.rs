//! Deep research backend: an HTTP worker that proxies generation requests to
//! an AI gateway and persists research sessions, tasks and logs in SQLite,
//! plus the client side that talks to it.
//!
//! # Architecture
//!
//! - **Storage**: SQLite via `rusqlite`, one connection shared behind a mutex,
//!   foreign keys enforced so tasks and logs always belong to a session
//! - **Generation**: a [`gateway::GenerationProvider`] trait with one
//!   implementation that forwards Gemini-format requests through the AI gateway
//! - **Transport**: an axum router guarded by a single shared bearer secret,
//!   with permissive CORS headers on every response
//! - **Client**: a typed `reqwest` client and two small state stores
//!   (credential, settings) persisted to the local state directory
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization, schema and migrations
//! - [`research`] — Session, task and log records and their CRUD operations
//! - [`gateway`] — Generation request types and the AI gateway provider
//! - [`server`] — The HTTP worker: routing, auth, CORS and error mapping
//! - [`client`] — Typed API client, streaming text decoder and worker-backed provider
//! - [`stores`] — Client-side auth and settings stores

pub mod client;
pub mod config;
pub mod db;
pub mod gateway;
pub mod research;
pub mod server;
pub mod stores;
