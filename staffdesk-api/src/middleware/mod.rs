/// Tower middleware applied by [`crate::app::build_router`]
///
/// Tracing and CORS come from tower-http; authentication lives in
/// [`crate::app`] because it needs the application state.

pub mod security;
