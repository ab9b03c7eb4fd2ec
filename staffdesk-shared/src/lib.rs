//! # StaffDesk Shared Library
//!
//! Types and business logic shared by the StaffDesk API server and its
//! tooling.
//!
//! ## Module Organization
//!
//! - `domain`: value objects and aggregates (employees, payroll, vacations, users)
//! - `models`: database records and queries
//! - `db`: connection pool and migrations
//! - `auth`: passwords, JWTs and request authentication
//! - `fixtures`: seeded demo data

pub mod auth;
pub mod db;
pub mod domain;
pub mod fixtures;
pub mod models;

/// Current version of the StaffDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
