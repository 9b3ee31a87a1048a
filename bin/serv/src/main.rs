use axum::{Router, middleware, routing::get};
use hzc_api::{config::ApiConfig, state::ApiState};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from .env and HZC_* environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    hzc_api::tracing::init_tracing(&config.env);
    let metrics_handle = hzc_api::metrics::init_metrics()?;

    // Legacy records are migrated here, once, before serving
    let store = hzc_db::open_json_store(
        &config.data_path,
        config.duplicate_policy(),
        hzc_srs::today(),
    )?;
    let state = ApiState::new(store, config.env.clone());

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let metrics_app = Router::new()
        .route("/metrics", get(hzc_api::metrics::metrics_handler))
        .with_state(metrics_handle);

    let app = hzc_api::router::router()
        .merge(metrics_app)
        .with_state(state)
        .layer(CorsLayer::very_permissive())
        .layer(trace_layer)
        .layer(middleware::from_fn(hzc_api::metrics::track_metrics));

    let listener = tokio::net::TcpListener::bind(config.bind_address.as_str()).await?;
    tracing::info!(
        address = %config.bind_address,
        data_path = %config.data_path.display(),
        env = ?config.env,
        "server listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
