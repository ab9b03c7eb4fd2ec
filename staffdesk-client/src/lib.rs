//! # StaffDesk Client
//!
//! Async client for the StaffDesk API.
//!
//! ```no_run
//! use std::sync::Arc;
//! use staffdesk_client::{ApiClient, AuthSession, EmployeeService, FileTokenStore};
//!
//! # async fn example() -> staffdesk_client::ClientResult<()> {
//! let store = Arc::new(FileTokenStore::new("session.json"));
//! let client = ApiClient::new("http://localhost:8080", store)?;
//!
//! let auth = AuthSession::new(client.clone());
//! if auth.restore().await?.is_none() {
//!     auth.login("admin@staffdesk.test", "Admin!2345").await?;
//! }
//!
//! let page = EmployeeService::new(client).list(1, 30).await?;
//! println!("{} of {} employees", page.items.len(), page.total_items);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod employees;
pub mod error;
pub mod payrolls;
pub mod store;
pub mod token;
pub mod types;
pub mod vacations;

pub use auth::AuthSession;
pub use client::ApiClient;
pub use employees::{EmployeeForm, EmployeeService};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use payrolls::{PayrollForm, PayrollService};
pub use store::{FileTokenStore, MemoryTokenStore, StoredSession, TokenStore};
pub use types::{Employee, Page, Payroll, PayrollStatus, User, Vacation, VacationStatus};
pub use vacations::{VacationForm, VacationService};
