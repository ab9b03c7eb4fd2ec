/// Database plumbing: connection pool and schema migrations
///
/// Records and their queries live in [`crate::models`].

pub mod migrations;
pub mod pool;
