//! HTTP front end for the student roster.
//!
//! # Routes
//! - `GET    /api/students?search=Q`  search + averages
//! - `GET    /api/students/:id`       one student, 404 if missing
//! - `POST   /api/students`           create, 201; 400 without name/rollNo
//! - `PUT    /api/students/:id`       merge update, 404 if missing
//! - `DELETE /api/students/:id`       204, 404 if missing
//! - `GET    /api/reports/ranklist`
//! - `GET    /api/reports/top5`
//! - `GET    /api/reports/subject-averages`
//! - `GET    /api/reports/summary`
//! - `GET    /api/health`
//!
//! # Configuration
//! Environment variables, see [`config::ServerConfig`]:
//! `PORT`, `ROSTER_STORE` (`json|sqlite|memory`), `ROSTER_DATA_PATH`,
//! `ROSTER_READ_FAILURE` (`recover|fail`), `ROSTER_LOG_LEVEL`, `ROSTER_LOG_DIR`.
//!
//! ```sh
//! ROSTER_STORE=sqlite ROSTER_DATA_PATH=data/roster.sqlite3 cargo run -p roster_server
//! ```

use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use log::info;
use roster_core::{init_logging_with_echo, open_store, RosterService};
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::ServerConfig;
use error::ServerError;
use routes::{
    create_student_handler, delete_student_handler, get_student_handler, health_handler,
    list_students_handler, rank_list_handler, subject_averages_handler, summary_handler,
    top_students_handler, update_student_handler,
};
use state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let students = Router::new()
        .route("/", get(list_students_handler).post(create_student_handler))
        .route(
            "/:id",
            get(get_student_handler)
                .put(update_student_handler)
                .delete(delete_student_handler),
        );

    let reports = Router::new()
        .route("/ranklist", get(rank_list_handler))
        .route("/top5", get(top_students_handler))
        .route("/subject-averages", get(subject_averages_handler))
        .route("/summary", get(summary_handler));

    Router::new()
        .route("/api/health", get(health_handler))
        .nest("/api/students", students)
        .nest("/api/reports", reports)
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<(), ServerError> {
    let config = ServerConfig::load()?;

    init_logging_with_echo(
        &config.log_level,
        &config.log_dir.to_string_lossy(),
        Some("info"),
    )
    .map_err(ServerError::Logging)?;

    info!(
        "event=server_init module=server status=start store={} read_failure={:?}",
        config.store, config.read_failure
    );
    let store = open_store(config.store, &config.data_path)?;
    let roster = RosterService::new(store).with_read_failure_policy(config.read_failure);
    let app = build_router(AppState::new(roster));

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("event=server_listen module=server status=ok address={address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = ctrl_c().await {
            log::error!("event=signal_install module=server status=error error={err}");
            std::future::pending::<()>().await;
        }
        info!("event=shutdown module=server reason=ctrl_c");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=shutdown module=server reason=sigterm");
            }
            Err(err) => {
                log::error!("event=signal_install module=server status=error error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
