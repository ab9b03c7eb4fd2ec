//! # StaffDesk API Server Library
//!
//! Router, handlers and configuration of the StaffDesk REST API. The
//! `staffdesk-api` binary wires these to a Postgres pool and a TCP listener;
//! integration tests build the same router in-process.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: environment configuration
//! - `error`: error type and HTTP response mapping
//! - `extract`: validated JSON extractor
//! - `middleware`: response security headers
//! - `routes`: route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
