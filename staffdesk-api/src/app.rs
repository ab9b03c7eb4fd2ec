/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use staffdesk_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use staffdesk_shared::auth::middleware::authenticate;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router
///
/// ```text
/// /health                              public
/// /api/login_check                     public
/// /api/auth/{login,refresh}            public
/// /api/auth/me                         bearer token
/// /api/employees[/:id]                 bearer token
/// /api/payrolls[/:id[/process|pay|cancel]]
/// /api/vacations[/:id[/approve|reject]]  approve/reject: ROLE_ADMIN
/// /api/users[/:id]                     ROLE_ADMIN
/// ```
///
/// Layers, outermost first: security headers, CORS, request tracing.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/login_check", post(routes::auth::login_check))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh));

    let protected = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route(
            "/employees",
            get(routes::employees::list_employees).post(routes::employees::create_employee),
        )
        .route(
            "/employees/:id",
            get(routes::employees::get_employee)
                .put(routes::employees::replace_employee)
                .patch(routes::employees::update_employee)
                .delete(routes::employees::delete_employee),
        )
        .route(
            "/payrolls",
            get(routes::payrolls::list_payrolls).post(routes::payrolls::create_payroll),
        )
        .route(
            "/payrolls/:id",
            get(routes::payrolls::get_payroll)
                .patch(routes::payrolls::update_payroll)
                .delete(routes::payrolls::delete_payroll),
        )
        .route("/payrolls/:id/process", post(routes::payrolls::process_payroll))
        .route("/payrolls/:id/pay", post(routes::payrolls::pay_payroll))
        .route("/payrolls/:id/cancel", post(routes::payrolls::cancel_payroll))
        .route(
            "/vacations",
            get(routes::vacations::list_vacations).post(routes::vacations::create_vacation),
        )
        .route(
            "/vacations/:id",
            get(routes::vacations::get_vacation)
                .put(routes::vacations::replace_vacation)
                .patch(routes::vacations::update_vacation)
                .delete(routes::vacations::delete_vacation),
        )
        .route("/vacations/:id/approve", post(routes::vacations::approve_vacation))
        .route("/vacations/:id/reject", post(routes::vacations::reject_vacation))
        .route(
            "/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/users/:id",
            get(routes::users::get_user)
                .put(routes::users::replace_user)
                .patch(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    let cors = cors_layer(&state.config);
    let production = state.config.api.production;

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", public.merge(protected))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

/// Permissive for `*`, otherwise restricted to the configured origins
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Validates the bearer access token and stores the caller's
/// [`AuthContext`](staffdesk_shared::auth::middleware::AuthContext) in the
/// request extensions
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret()).map_err(|e| {
        tracing::debug!(error = %e, path = %req.uri().path(), "Rejected request");
        e
    })?;

    req.extensions_mut().insert(auth);
    Ok(next.run(req).await)
}
