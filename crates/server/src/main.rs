mod config;

use api::{
    auth::{decode_token, issue_token, AuthConfig, CurrentUser, UserRole, SESSION_COOKIE},
    schema::{build_schema, AppSchema, HrSchema},
    seed::seed_hr_demo,
};
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::Html,
    routing::get,
    Router,
};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use entity::user;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn, Level};
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "hr-suite", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run HTTP server
    Serve {
        #[arg(long, env = "BIND", default_value = "127.0.0.1:8080")]
        bind: String,
    },
    /// Run migrations (up|down|reset)
    Migrate {
        #[arg(long, default_value = "up")]
        action: String,
    },
    /// Seed the demo organisation
    Seed,
    /// Print GraphQL SDL
    PrintSchema,
    /// Mint a session token for an existing account
    IssueToken {
        #[arg(long)]
        email: String,
    },
}

#[derive(Clone)]
struct AppState {
    schema: HrSchema,
    db: Arc<DatabaseConnection>,
    auth: Arc<AuthConfig>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let db = Arc::new(Database::connect(&config.database_url).await?);
    let auth = Arc::new(config.auth.clone());

    match cli.cmd {
        Cmd::Migrate { action } => {
            match action.as_str() {
                "up" => Migrator::up(db.as_ref(), None).await?,
                "down" => Migrator::down(db.as_ref(), None).await?,
                "reset" => Migrator::reset(db.as_ref()).await?,
                _ => anyhow::bail!("unknown migrate action: {} (use up|down|reset)", action),
            }
            info!(action = %action, "migrations finished");
            Ok(())
        }
        Cmd::Seed => {
            let seeded = seed_hr_demo(db.as_ref())
                .await
                .map_err(|err| anyhow::anyhow!("seed data failed: {}", err))?;
            info!(
                employees = seeded.employees.len(),
                users = seeded.users.len(),
                tickets = seeded.tickets.len(),
                "demo organisation seeded"
            );
            Ok(())
        }
        Cmd::PrintSchema => {
            let AppSchema(schema) = build_schema(db.clone());
            println!("{}", schema.sdl());
            Ok(())
        }
        Cmd::IssueToken { email } => {
            let account = user::Entity::find()
                .filter(user::Column::Email.eq(email.trim().to_lowercase()))
                .one(db.as_ref())
                .await?
                .ok_or_else(|| anyhow::anyhow!("no account for {}", email))?;
            let token = issue_token(account.id, &[UserRole::from(account.role)], &auth)?;
            println!("{}", token);
            Ok(())
        }
        Cmd::Serve { bind } => {
            Migrator::up(db.as_ref(), None).await?;
            let AppSchema(schema) = build_schema(db.clone());
            let state = AppState {
                schema,
                db: db.clone(),
                auth: auth.clone(),
            };
            let app = app_router(state, cors_layer(&config.cors_allowed_origins));

            let addr: SocketAddr = bind.parse()?;
            let listener = TcpListener::bind(addr).await?;
            info!("listening on http://{}", addr);
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(shutdown_signal())
            .await?;
            Ok(())
        }
    }
}

fn app_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/graphiql", get(graphiql))
        .route("/graphql", get(graphql_handler).post(graphql_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(current_user) = authenticate_request(&state, &headers).await {
        request = request.data(current_user);
    }
    state.schema.execute(request).await.into()
}

async fn authenticate_request(state: &AppState, headers: &HeaderMap) -> Option<CurrentUser> {
    let token = extract_token(headers)?;
    let claims = match decode_token(&token, &state.auth) {
        Ok(claims) => claims,
        Err(err) => {
            warn!(error = %err, "rejecting session token");
            return None;
        }
    };
    load_current_user(state.db.as_ref(), claims.sub).await
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(text) = value.to_str() {
            if let Some(rest) = text.strip_prefix("Bearer ") {
                return Some(rest.trim().to_string());
            }
        }
    }
    if let Some(cookie) = headers.get(header::COOKIE) {
        if let Ok(text) = cookie.to_str() {
            for part in text.split(';') {
                let trimmed = part.trim();
                if let Some(rest) = trimmed.strip_prefix(SESSION_COOKIE) {
                    if let Some(value) = rest.strip_prefix('=') {
                        return Some(value.trim().to_string());
                    }
                }
            }
        }
    }
    None
}

/// Roles come from the stored account, not the token, so a demotion takes
/// effect before the token expires.
async fn load_current_user(db: &DatabaseConnection, user_id: Uuid) -> Option<CurrentUser> {
    let account = match user::Entity::find_by_id(user_id).one(db).await {
        Ok(account) => account?,
        Err(err) => {
            warn!(error = %err, "session lookup failed");
            return None;
        }
    };
    if !account.is_active {
        return None;
    }
    Some(CurrentUser {
        user_id,
        roles: vec![UserRole::from(account.role)],
        employee_id: account.employee_id,
    })
}

async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

async fn shutdown_signal() {
    use tokio::signal;
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler")
    };
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! { _ = ctrl_c => {}, _ = terminate => {}, }
}
