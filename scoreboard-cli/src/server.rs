/// HTTP surface over the leaderboard engine.
///
/// Handlers only parse query strings and serialize results; every ranking
/// decision is made by `scoreboard_core`. Routes answer any method, as the
/// game client has always called them with plain GETs and POSTs.
use std::sync::Arc;

use axum::extract::{Query, Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use scoreboard_core::constants::MAX_PAGE_SIZE;
use scoreboard_core::{
    parse_score, LeaderboardError, LeaderboardSummary, RankedEntry, SharedLeaderboard,
    Standing,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::output::congratulations;
use crate::store::JsonlStore;

const ALLOWED_METHODS: &str = "POST, GET, OPTIONS, PUT, DELETE";
const ALLOWED_HEADERS: &str =
    "Accept, Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, Authorization";

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub leaderboard: SharedLeaderboard,
    pub store: Option<Arc<JsonlStore>>,
    pub page_size: usize,
    pub top_limit: usize,
    pub allowed_origin: HeaderValue,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid score")]
    InvalidScore,
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Name parameter is required")]
    MissingName,
    #[error("No entries for {0:?}")]
    NotFound(String),
}

impl From<LeaderboardError> for ApiError {
    fn from(e: LeaderboardError) -> Self {
        match e {
            LeaderboardError::InvalidScore { .. } => ApiError::InvalidScore,
            LeaderboardError::EmptyName => ApiError::EmptyName,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidScore | ApiError::EmptyName | ApiError::MissingName => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitParams {
    #[serde(default)]
    pub name: String,
    pub score: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    pub rank: usize,
    pub percentile: f64,
    pub total_count: usize,
}

// Paging params stay strings: garbage degrades to the default instead of a 400.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NameParams {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveResponse {
    pub removed: usize,
    pub message: String,
}

pub fn build_router(state: AppState) -> Router {
    let origin = state.allowed_origin.clone();
    Router::new()
        .route("/submit", any(submit))
        .route("/leaderboard", any(leaderboard))
        .route("/top", any(top))
        .route("/remove", any(remove))
        .route("/standing", any(standing))
        .route("/summary", any(summary))
        .layer(middleware::from_fn_with_state(origin, cors))
        .with_state(state)
}

/// Attach CORS headers to every response and answer preflights directly.
async fn cors(State(origin): State<HeaderValue>, request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}

async fn submit(
    State(state): State<AppState>,
    Query(params): Query<SubmitParams>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let score = parse_score(params.score.as_deref().unwrap_or_default())?;
    let submitted_at = params.time.filter(|t| !t.is_empty());

    // Append under the board's write lock so the log keeps the applied order.
    let result = state
        .leaderboard
        .submit_with(params.name.clone(), score, submitted_at, |entry| {
            if let Some(store) = &state.store {
                if let Err(e) = store.append_submit(entry) {
                    error!("failed to persist submission: {e}");
                }
            }
        })?;

    info!(name = %params.name, score, rank = result.rank, total = result.total_count, "submission");

    Ok(Json(SubmitResponse {
        message: congratulations(&params.name, result.percentile, result.rank),
        rank: result.rank,
        percentile: result.percentile,
        total_count: result.total_count,
    }))
}

async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Json<Vec<RankedEntry>> {
    let page = params
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<i64>().ok())
        .unwrap_or(1);
    let size = parse_size(params.size.as_deref(), state.page_size);
    Json(state.leaderboard.page(page, size))
}

async fn top(State(state): State<AppState>, Query(params): Query<TopParams>) -> Json<Vec<RankedEntry>> {
    let limit = parse_size(params.limit.as_deref(), state.top_limit);
    Json(state.leaderboard.top(limit))
}

async fn remove(
    State(state): State<AppState>,
    Query(params): Query<NameParams>,
) -> Result<Json<RemoveResponse>, ApiError> {
    if params.name.is_empty() {
        return Err(ApiError::MissingName);
    }

    let removed = state.leaderboard.remove_by_name_with(&params.name, |removed| {
        if removed == 0 {
            return;
        }
        if let Some(store) = &state.store {
            if let Err(e) = store.append_remove(&params.name) {
                error!("failed to persist removal: {e}");
            }
        }
    });

    info!(name = %params.name, removed, "removal");

    Ok(Json(RemoveResponse {
        removed,
        message: format!("All entries with name '{}' removed successfully", params.name),
    }))
}

async fn standing(
    State(state): State<AppState>,
    Query(params): Query<NameParams>,
) -> Result<Json<Standing>, ApiError> {
    if params.name.is_empty() {
        return Err(ApiError::MissingName);
    }
    state
        .leaderboard
        .standing(&params.name)
        .map(Json)
        .ok_or(ApiError::NotFound(params.name))
}

async fn summary(State(state): State<AppState>) -> Json<LeaderboardSummary> {
    Json(state.leaderboard.summary())
}

/// Parse a page size or limit, falling back to `default` and clamping to `MAX_PAGE_SIZE`.
fn parse_size(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(default)
        .min(MAX_PAGE_SIZE)
}

/// Bind and serve until the process is stopped.
pub async fn serve(addr: std::net::SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        entries = state.leaderboard.len(),
        persisted = state.store.is_some(),
        "scoreboard listening"
    );
    if state.store.is_none() {
        warn!("no store configured; scores will be lost on restart");
    }
    axum::serve(listener, build_router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use scoreboard_core::{Entry, Leaderboard, LeaderboardConfig};
    use serde_json::Value;
    use tower::util::ServiceExt;

    fn test_state(config: LeaderboardConfig) -> AppState {
        AppState {
            leaderboard: SharedLeaderboard::new(Leaderboard::new(config)),
            store: None,
            page_size: 5,
            top_limit: 10,
            allowed_origin: HeaderValue::from_static("http://127.0.0.1:5500"),
        }
    }

    async fn call(app: &Router, method: Method, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let resp = app
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = call(app, Method::GET, uri).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_submit_and_page() {
        let app = build_router(test_state(LeaderboardConfig::default()));

        let (status, json) = get_json(&app, "/submit?name=ana&score=50&time=10:00").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rank"], 1);
        assert_eq!(json["total_count"], 1);
        assert_eq!(json["message"], "Congrats ana, you are in the top 100.00%, on the 1st position.");

        get_json(&app, "/submit?name=bo&score=50").await;
        let (_, json) = get_json(&app, "/submit?name=cy&score=40").await;
        assert_eq!(json["rank"], 3);

        let (status, json) = get_json(&app, "/leaderboard?page=1").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        let ranks: Vec<i64> = rows.iter().map(|r| r["rank"].as_i64().unwrap()).collect();
        assert_eq!(ranks, vec![1, 1, 3]);
        assert_eq!(rows[0]["name"], "ana");
        assert_eq!(rows[0]["time"], "10:00");
        assert!(rows[1].get("time").is_none());
    }

    #[tokio::test]
    async fn test_invalid_score_is_bad_request() {
        let app = build_router(test_state(LeaderboardConfig::default()));
        for uri in ["/submit?name=a&score=abc", "/submit?name=a"] {
            let (status, _, body) = call(&app, Method::POST, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, b"Invalid score");
        }
        let (_, json) = get_json(&app, "/summary").await;
        assert_eq!(json["total_entries"], 0);
    }

    #[tokio::test]
    async fn test_empty_name_policy() {
        let app = build_router(test_state(LeaderboardConfig::default()));
        let (status, _) = get_json(&app, "/submit?score=5").await;
        assert_eq!(status, StatusCode::OK);

        let strict = build_router(test_state(LeaderboardConfig { reject_empty_names: true }));
        let (status, _, body) = call(&strict, Method::GET, "/submit?name=&score=5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"Name must not be empty");
    }

    #[tokio::test]
    async fn test_pagination_defaults_and_bad_input() {
        let app = build_router(test_state(LeaderboardConfig::default()));
        for i in 0..7 {
            get_json(&app, &format!("/submit?name=p{i}&score={}", 100 - i)).await;
        }

        let (_, first) = get_json(&app, "/leaderboard").await;
        assert_eq!(first.as_array().unwrap().len(), 5);
        let (_, bad) = get_json(&app, "/leaderboard?page=zero").await;
        assert_eq!(bad, first);
        let (_, negative) = get_json(&app, "/leaderboard?page=-2").await;
        assert_eq!(negative, first);

        let (_, second) = get_json(&app, "/leaderboard?page=2").await;
        assert_eq!(second.as_array().unwrap().len(), 2);
        assert_eq!(second[0]["rank"], 6);
        let (status, third) = get_json(&app, "/leaderboard?page=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(third, Value::Array(vec![]));

        let (_, sized) = get_json(&app, "/leaderboard?page=2&size=3").await;
        assert_eq!(sized[0]["name"], "p3");
    }

    #[tokio::test]
    async fn test_top_and_limit_clamp() {
        let app = build_router(test_state(LeaderboardConfig::default()));
        for i in 0..(MAX_PAGE_SIZE + 5) {
            get_json(&app, &format!("/submit?name=p{i}&score={i}")).await;
        }
        let (_, default) = get_json(&app, "/top").await;
        assert_eq!(default.as_array().unwrap().len(), 10);
        let (_, two) = get_json(&app, "/top?limit=2").await;
        assert_eq!(two.as_array().unwrap().len(), 2);
        let (_, huge) = get_json(&app, "/top?limit=100000").await;
        assert_eq!(huge.as_array().unwrap().len(), MAX_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_remove_promotes_and_requires_name() {
        let app = build_router(test_state(LeaderboardConfig::default()));
        get_json(&app, "/submit?name=A&score=100").await;
        get_json(&app, "/submit?name=B&score=80").await;
        get_json(&app, "/submit?name=C&score=80").await;

        let (status, json) = get_json(&app, "/remove?name=A").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["removed"], 1);
        assert_eq!(json["message"], "All entries with name 'A' removed successfully");

        let (_, top) = get_json(&app, "/top").await;
        let rows = top.as_array().unwrap();
        assert!(rows.iter().all(|r| r["name"] != "A"));
        assert!(rows.iter().all(|r| r["rank"] == 1));

        let (_, json) = get_json(&app, "/remove?name=nobody").await;
        assert_eq!(json["removed"], 0);

        let (status, _, body) = call(&app, Method::DELETE, "/remove").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"Name parameter is required");
    }

    #[tokio::test]
    async fn test_standing_and_summary() {
        let app = build_router(test_state(LeaderboardConfig::default()));
        get_json(&app, "/submit?name=a&score=10").await;
        get_json(&app, "/submit?name=b&score=20").await;

        let (status, json) = get_json(&app, "/standing?name=a").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rank"], 2);
        assert_eq!(json["percentile"], 50.0);

        let (status, _) = get_json(&app, "/standing?name=zz").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, json) = get_json(&app, "/summary").await;
        assert_eq!(json["total_entries"], 2);
        assert_eq!(json["top_score"], 20);
        assert_eq!(json["mean_score"], 15.0);
    }

    #[tokio::test]
    async fn test_cors_headers_and_preflight() {
        let app = build_router(test_state(LeaderboardConfig::default()));

        let (status, headers, body) = call(&app, Method::OPTIONS, "/submit").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://127.0.0.1:5500");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);

        let (_, headers, _) = call(&app, Method::GET, "/top").await;
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://127.0.0.1:5500");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], ALLOWED_HEADERS);
    }

    #[tokio::test]
    async fn test_mutations_are_mirrored_to_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.jsonl");
        let mut state = test_state(LeaderboardConfig::default());
        state.store = Some(Arc::new(JsonlStore::open(&path).unwrap()));
        let app = build_router(state);

        get_json(&app, "/submit?name=a&score=1&time=t0").await;
        get_json(&app, "/submit?name=b&score=2").await;
        get_json(&app, "/remove?name=a").await;
        // Rejected submissions never reach the store.
        get_json(&app, "/submit?name=c&score=x").await;

        let entries = JsonlStore::load(&path).unwrap();
        assert_eq!(entries, vec![Entry::new("b", 2, None)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_mutations_replay_to_live_board() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.jsonl");
        let mut state = test_state(LeaderboardConfig::default());
        state.store = Some(Arc::new(JsonlStore::open(&path).unwrap()));
        let board = state.leaderboard.clone();
        let app = build_router(state);

        let tasks: Vec<_> = (0..1000)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move {
                    get_json(&app, &format!("/submit?name=p{i}&score=7")).await;
                    if i % 7 == 0 {
                        get_json(&app, &format!("/remove?name=p{}", i / 2)).await;
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let rebuilt = Leaderboard::from_entries(JsonlStore::load(&path).unwrap(), LeaderboardConfig::default());
        assert_eq!(rebuilt.ranked(), board.ranked());
    }
}
