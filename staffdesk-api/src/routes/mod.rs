/// Route handlers, one module per resource
///
/// - `health`: liveness and database status
/// - `auth`: login, token refresh, current user
/// - `employees`, `payrolls`, `vacations`, `users`: resource CRUD
/// - `pagination`: collection envelope shared by the list endpoints

pub mod auth;
pub mod employees;
pub mod health;
pub mod pagination;
pub mod payrolls;
pub mod users;
pub mod vacations;
