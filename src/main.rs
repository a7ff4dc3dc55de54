use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};
use court_bids::config::AppConfig;
use court_bids::error::AppError;
use court_bids::telemetry;
use court_bids::workflows::bids::{
    bid_router, closing_sunday, Bid, BidId, BidRepository, BidScore, BidService, BidServiceError,
    BidStatus, EvaluationRun, EvaluationSummary, MemoryBidRepository, SystemClock, WeeklyAllocator,
};
use court_bids::workflows::players::{
    MemoryPlayerDirectory, Player, PlayerDirectory, PlayerId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Court Bid Allocator",
    about = "Run the weekly court-bid evaluation service and demos from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one weekly evaluation over a seeded demo week and print the outcome
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug, Default)]
struct EvaluateArgs {
    /// Override the allocator's weekly slot capacity
    #[arg(long)]
    capacity: Option<usize>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Evaluate(args) => run_evaluation(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let repository = Arc::new(MemoryBidRepository::default());
    let directory = Arc::new(MemoryPlayerDirectory::default());
    seed_roster(directory.as_ref())?;
    let service = Arc::new(BidService::new(
        repository,
        directory,
        Arc::new(SystemClock),
    ));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(bid_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        events_per_week = config.club.events_per_week,
        "court bid allocator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_evaluation(args: EvaluateArgs) -> Result<(), AppError> {
    let repository = Arc::new(MemoryBidRepository::default());
    let directory = Arc::new(MemoryPlayerDirectory::default());
    let allocator = args
        .capacity
        .map(WeeklyAllocator::new)
        .unwrap_or_default();
    let service = BidService::with_allocator(
        repository.clone(),
        directory.clone(),
        Arc::new(SystemClock),
        allocator,
    );

    seed_roster(directory.as_ref())?;
    let (confirmed_pair, _waiting_pair) = seed_demo_week(repository.as_ref())?;
    service.approve(&confirmed_pair)?;

    match service.run_weekly_evaluation()? {
        EvaluationRun::NothingToEvaluate => println!("Nothing to evaluate this week."),
        EvaluationRun::Completed(summary) => render_summary(&summary),
    }

    Ok(())
}

fn seed_roster<P: PlayerDirectory>(directory: &P) -> Result<(), AppError> {
    let roster = [
        ("alice", "Alice", "Varga"),
        ("ben", "Ben", "Molnar"),
        ("clara", "Clara", "Kiss"),
        ("dan", "Dan", "Szabo"),
        ("eva", "Eva", "Horvath"),
        ("finn", "Finn", "Toth"),
    ];
    for (id, first, last) in roster {
        directory
            .create_player(Player {
                id: PlayerId(id.to_string()),
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: format!("{id}@club.example"),
            })
            .map_err(BidServiceError::from)?;
    }
    Ok(())
}

/// Seeds one representative week of bids: two solo bids, one confirmed pair,
/// one pair still waiting on approval. Returns the two paired bid ids.
fn seed_demo_week<R: BidRepository>(repository: &R) -> Result<(BidId, BidId), AppError> {
    let week_end = closing_sunday(Utc::now());
    let monday = week_end - Duration::days(6);

    let confirmed_pair = BidId("demo-clara-dan".to_string());
    let waiting_pair = BidId("demo-eva-finn".to_string());

    let seeds = [
        demo_bid("demo-alice", "alice", None, monday + Duration::hours(10)),
        demo_bid(
            "demo-ben",
            "ben",
            None,
            monday + Duration::days(1) + Duration::hours(9),
        ),
        demo_bid(
            "demo-clara-dan",
            "clara",
            Some("dan"),
            monday + Duration::days(2) + Duration::hours(18),
        ),
        demo_bid(
            "demo-eva-finn",
            "eva",
            Some("finn"),
            monday + Duration::days(3) + Duration::hours(8),
        ),
    ];
    for bid in seeds {
        repository.insert(bid).map_err(BidServiceError::from)?;
    }

    Ok((confirmed_pair, waiting_pair))
}

fn demo_bid(
    id: &str,
    creator: &str,
    partner: Option<&str>,
    created_at: DateTime<Utc>,
) -> Bid {
    let status = if partner.is_some() {
        BidStatus::WaitingForApproval
    } else {
        BidStatus::Pending
    };
    Bid {
        id: BidId(id.to_string()),
        creator: PlayerId(creator.to_string()),
        partner: partner.map(|name| PlayerId(name.to_string())),
        created_at,
        status,
        score: BidScore::Unscored,
        ticket_code: None,
    }
}

fn render_summary(summary: &EvaluationSummary) {
    println!(
        "Weekly evaluation for {} -> {}",
        summary.week_start, summary.week_end
    );
    println!(
        "{} slot(s) awarded, {} bid(s) lost",
        summary.awarded, summary.rejected
    );
    println!("\nFinal ranking");
    for (rank, view) in summary.ranked.iter().enumerate() {
        let participants = match &view.partner {
            Some(partner) => format!("{} + {}", view.creator.0, partner.0),
            None => view.creator.0.clone(),
        };
        let score = match view.score {
            Some(score) => format!("{score:.1}"),
            None => "-".to_string(),
        };
        let ticket = match &view.ticket_code {
            Some(code) => format!(" ticket {}", code.0),
            None => String::new(),
        };
        println!(
            "{:>2}. {} | {} | score {} | {}{}",
            rank + 1,
            view.bid_id.0,
            participants,
            score,
            view.status,
            ticket
        );
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
