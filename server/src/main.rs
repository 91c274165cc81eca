use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use log::{info, warn};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

mod handlers;
mod logic;
mod sessions;
mod state;
mod storage;

use crate::handlers::{
    composite_handler, confirm_mask_handler, open_handler, ping_handler, session_handler,
    session_info_handler,
};
use crate::logic::DEFAULT_MAX_BODY_BYTES;
use crate::sessions::{prune_expired_sessions, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};
use crate::state::AppState;
use crate::storage::FileStorage;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory confirmed masks are written to.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[arg(long)]
    public_dir: Option<PathBuf>,
    #[arg(long)]
    tls_cert: Option<PathBuf>,
    #[arg(long)]
    tls_key: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,
    /// Seconds a session may sit idle before it is dropped.
    #[arg(long, default_value_t = DEFAULT_SESSION_TTL.as_secs())]
    session_ttl_secs: u64,
    #[arg(long, default_value_t = DEFAULT_MAX_SESSIONS)]
    max_sessions: usize,
}

fn router(state: AppState, public_dir: PathBuf, max_body_bytes: usize) -> Router {
    let index_file = public_dir.join("index.html");
    let api = Router::new()
        .route("/api/open", post(open_handler))
        .route("/api/session/:session_id", get(session_info_handler))
        .route("/api/mask", post(confirm_mask_handler))
        .route("/api/composite", post(composite_handler))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));
    Router::new()
        .merge(api)
        .route("/ping", get(ping_handler))
        .route("/s/:session_id", get(session_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(axum::Extension(index_file))
        .with_state(state)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let output_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../masks"));
    let public_dir = args
        .public_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));
    info!(
        "Masks go to {} static files from {}",
        output_dir.display(),
        public_dir.display()
    );
    let mut state = AppState::new(Arc::new(FileStorage::new(output_dir)));
    state.session_ttl = Duration::from_secs(args.session_ttl_secs);
    state.max_sessions = args.max_sessions;

    let sweep_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let removed = prune_expired_sessions(&sweep_state, Instant::now()).await;
            if removed > 0 {
                info!("Dropped {removed} idle sessions");
            }
        }
    });

    let app = router(state, public_dir, args.max_body_bytes);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    match (args.tls_cert, args.tls_key) {
        (Some(cert), Some(key)) => {
            let config = RustlsConfig::from_pem_file(cert, key).await?;
            info!("Mask editor running at https://localhost:{port}");
            axum_server::bind_rustls(addr, config)
                .serve(app.into_make_service())
                .await
        }
        (cert, key) => {
            if cert.is_some() || key.is_some() {
                warn!("TLS needs both --tls-cert and --tls-key; serving plain HTTP");
            }
            info!("Mask editor running at http://localhost:{port}");
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await
        }
    }
}
