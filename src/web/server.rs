use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::cli::ServeArgs;
use crate::graph::nodes::find_nodes;
use crate::graph::render::{self, SamplePalette};
use crate::graph::summary::GraphSummary;
use crate::graph::{load_region, GraphConfig, GraphError, RegionQuery};

/// Most ids accepted by a single `/api/nodes` request
pub const MAX_QUERY_IDS: usize = 1_000;

/// Most samples accepted by a single `/api/subgraph` request
pub const MAX_QUERY_SAMPLES: usize = 1_000;

/// Every request is answered within this time or gets a 408
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state
pub struct AppState {
    /// The served file; it is re-read on every request
    pub gfa: PathBuf,
    pub config: GraphConfig,
}

/// Enhanced error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Query parameters for `/api/subgraph`
#[derive(Debug, Deserialize)]
pub struct SubgraphParams {
    pub contig: String,
    pub from: Option<u64>,
    pub to: Option<u64>,
    /// Comma-separated sample names
    pub samples: Option<String>,
    pub backbone: Option<String>,
}

/// Query parameters for `/api/nodes`
#[derive(Debug, Deserialize)]
pub struct NodesParams {
    /// Comma-separated segment ids
    pub ids: String,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    // Log detailed error server-side for debugging (not exposed to client)
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None, // Never expose internal details to prevent information disclosure
    }
}

fn error_response(status: StatusCode, error: ErrorResponse) -> Response {
    (status, Json(error)).into_response()
}

fn bad_request(error_type: &str, message: &str) -> Response {
    error_response(
        StatusCode::BAD_REQUEST,
        create_safe_error_response(error_type, message, None),
    )
}

fn load_failed(e: &GraphError) -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        create_safe_error_response("load_failed", "Failed to read the graph file", Some(&e.to_string())),
    )
}

fn task_failed(e: &tokio::task::JoinError) -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        create_safe_error_response("internal_error", "Request could not be completed", Some(&e.to_string())),
    )
}

/// Split a comma-separated parameter, dropping empty entries
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the graph file does not exist.
pub fn create_router(gfa: PathBuf, config: GraphConfig) -> anyhow::Result<Router> {
    if !gfa.is_file() {
        anyhow::bail!("Graph file {} not found", gfa.display());
    }
    let state = Arc::new(AppState { gfa, config });

    // Build router with comprehensive security layers
    let app = Router::new()
        .route("/api/summary", get(summary_handler))
        .route("/api/subgraph", get(subgraph_handler))
        .route("/api/nodes", get(nodes_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Security headers for browser protection
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    REQUEST_TIMEOUT,
                ))
                // Each request loads its own graph; bound how many run at once
                .layer(ConcurrencyLimitLayer::new(100))
                // Only GET endpoints, no bodies expected
                .layer(DefaultBodyLimit::max(64 * 1024)),
        );

    Ok(app)
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let config = GraphConfig {
        delimiter: args.delimiter.clone(),
        ..GraphConfig::default()
    };
    let app = create_router(args.gfa.clone(), config)?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Serving {} at http://{addr}", args.gfa.display());

    if args.open {
        let _ = open::that(format!("http://{addr}/api/summary"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// API endpoint for the one-pass file summary
async fn summary_handler(State(state): State<Arc<AppState>>) -> Response {
    let task_state = Arc::clone(&state);
    let result =
        tokio::task::spawn_blocking(move || GraphSummary::scan(&task_state.gfa, &task_state.config)).await;

    match result {
        Ok(Ok(summary)) => Json(summary).into_response(),
        Ok(Err(e)) => load_failed(&e),
        Err(e) => task_failed(&e),
    }
}

/// API endpoint for region render data
async fn subgraph_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SubgraphParams>,
) -> Response {
    if params.contig.trim().is_empty() {
        return bad_request("missing_contig", "A contig is required");
    }
    if let (Some(from), Some(to)) = (params.from, params.to) {
        if from > to {
            return bad_request("invalid_region", "Region start is after its end");
        }
    }

    let samples = params.samples.as_deref().map(split_list);
    if samples.as_ref().is_some_and(|s| s.len() > MAX_QUERY_SAMPLES) {
        return bad_request("too_many_samples", "Too many samples requested");
    }

    let query = RegionQuery {
        contig: params.contig.trim().to_string(),
        from: params.from,
        to: params.to,
        samples: samples.filter(|s| !s.is_empty()),
    };

    let task_state = Arc::clone(&state);
    let task_query = query.clone();
    let result = tokio::task::spawn_blocking(move || -> Result<_, GraphError> {
        let (graph, selection) = load_region(
            &task_state.gfa,
            &task_query,
            params.backbone.as_deref(),
            &task_state.config,
        )?;
        if selection.signals.exceeds_max_nodes {
            return Ok(None);
        }
        let palette = SamplePalette::from_graph(&graph);
        let data = render::build(&graph, &selection, &palette);
        Ok(Some((data, selection.issues)))
    })
    .await;

    match result {
        Ok(Ok(Some((data, issues)))) => Json(serde_json::json!({
            "query": query,
            "nodes": data.nodes,
            "edges": data.edges,
            "signals": data.signals,
            "issues": issues,
        }))
        .into_response(),
        Ok(Ok(None)) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            create_safe_error_response(
                "too_many_nodes",
                "The selected region has too many nodes to render; narrow the region",
                None,
            ),
        ),
        Ok(Err(e)) => load_failed(&e),
        Err(e) => task_failed(&e),
    }
}

/// API endpoint for segment lookup by id
async fn nodes_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NodesParams>,
) -> Response {
    let ids = split_list(&params.ids);
    if ids.is_empty() {
        return bad_request("missing_ids", "At least one node id is required");
    }
    if ids.len() > MAX_QUERY_IDS {
        return bad_request("too_many_ids", "Too many node ids requested");
    }

    let task_state = Arc::clone(&state);
    let result =
        tokio::task::spawn_blocking(move || find_nodes(&task_state.gfa, &ids, &task_state.config)).await;

    match result {
        Ok(Ok(records)) => Json(records).into_response(),
        Ok(Err(e)) => load_failed(&e),
        Err(e) => task_failed(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("s1, s2,,s3 "), vec!["s1", "s2", "s3"]);
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn test_safe_error_hides_details() {
        let response = create_safe_error_response("load_failed", "Failed", Some("/secret/path"));
        assert_eq!(response.error, "Failed");
        assert_eq!(response.error_type, "load_failed");
        assert!(response.details.is_none());
    }

    #[test]
    fn test_router_requires_existing_file() {
        let result = create_router(PathBuf::from("/nonexistent/graph.gfa"), GraphConfig::default());
        assert!(result.is_err());
    }
}
