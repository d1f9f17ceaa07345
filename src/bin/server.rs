use std::{
    fs::OpenOptions,
    net::SocketAddr,
    path::PathBuf,
    process::exit,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack_rs::{
    AdvisorConfig, AppState, KeywordAdvisor, PaginationConfig, build_router, graceful_shutdown,
    logging_middleware,
};

/// The REST API server for fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "FINTRACK_DB_PATH")]
    db_path: PathBuf,

    /// The port to serve the API from.
    #[arg(short, long, env = "FINTRACK_PORT", default_value_t = 3000)]
    port: u16,

    /// File path to write debug logs to.
    #[arg(long, env = "FINTRACK_LOG_PATH", default_value = "debug.log")]
    log_path: PathBuf,

    /// The canonical name of the timezone used for "today", e.g. "Pacific/Auckland".
    #[arg(long, env = "FINTRACK_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// The number of transactions per page when a request does not specify a limit.
    #[arg(long, env = "FINTRACK_DEFAULT_PAGE_SIZE", default_value_t = 50)]
    default_page_size: u64,

    /// The number of goals per page when a request does not specify a limit.
    #[arg(long, env = "FINTRACK_DEFAULT_GOAL_PAGE_SIZE", default_value_t = 20)]
    default_goal_page_size: u64,

    /// The largest page size a client may request.
    #[arg(long, env = "FINTRACK_MAX_PAGE_SIZE", default_value_t = 500)]
    max_page_size: u64,

    /// How many recent transactions the advisor is told about.
    #[arg(long, env = "FINTRACK_ADVISOR_TRANSACTIONS", default_value_t = 20)]
    advisor_transactions: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_path);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let connection = match Connection::open(&args.db_path) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not open database at {:?}: {error}", args.db_path);
            exit(1);
        }
    };

    let pagination_config = PaginationConfig {
        default_transactions_per_page: args.default_page_size,
        default_goals_per_page: args.default_goal_page_size,
        max_page_size: args.max_page_size,
        ..Default::default()
    };

    if args.default_page_size.max(args.default_goal_page_size) > args.max_page_size {
        tracing::warn!(
            "Default page sizes are larger than the max page size of {}, listings will use the max instead.",
            args.max_page_size
        );
    }

    let advisor_config = AdvisorConfig {
        recent_transactions: args.advisor_transactions,
    };

    let state = match AppState::new(
        connection,
        &args.timezone,
        pagination_config,
        Arc::new(KeywordAdvisor),
        advisor_config,
    ) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not start server: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging(log_path: &PathBuf) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are turned into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
