use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use stockpick_core::domain::record::{Record, ScoredRecord};
use stockpick_core::error::CatalogUnavailable;
use stockpick_core::service::ScoreQueryService;

pub const WELCOME: &str = "Welcome to the Stock API!";

#[derive(Debug, Clone)]
pub struct AppState {
    /// `None` when the database could not be reached at startup.
    pub service: Option<ScoreQueryService>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(home).options(preflight))
        .route("/healthz", get(healthz).options(preflight))
        .route("/stocks", get(list_stocks).options(preflight))
        .route(
            "/recommendations",
            get(list_recommendations).options(preflight),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn home() -> &'static str {
    WELCOME
}

async fn healthz() -> &'static str {
    "ok"
}

// OPTIONS without Access-Control-Request-Method is not a CORS preflight; answer it anyway.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn list_stocks(State(state): State<AppState>) -> Result<Json<Vec<Record>>, ApiError> {
    const MSG: &str = "Error fetching stocks";

    let service = state.service.as_ref().ok_or(ApiError::unconfigured(MSG))?;
    let records = service
        .get_all_records()
        .await
        .map_err(|e| ApiError::catalog(MSG, e))?;
    Ok(Json(records))
}

async fn list_recommendations(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScoredRecord>>, ApiError> {
    const MSG: &str = "Error fetching recommendations";

    let service = state.service.as_ref().ok_or(ApiError::unconfigured(MSG))?;
    let scored = service
        .get_recommendations()
        .await
        .map_err(|e| ApiError::catalog(MSG, e))?;
    Ok(Json(scored))
}

#[derive(Debug)]
pub struct ApiError {
    message: &'static str,
    cause: Option<CatalogUnavailable>,
}

impl ApiError {
    fn catalog(message: &'static str, cause: CatalogUnavailable) -> Self {
        Self {
            message,
            cause: Some(cause),
        }
    }

    fn unconfigured(message: &'static str) -> Self {
        Self {
            message,
            cause: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.cause {
            Some(cause) => {
                let err = anyhow::Error::new(cause);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %format!("{err:#}"), "{}", self.message);
            }
            None => {
                tracing::error!("{}: catalog not connected (degraded mode)", self.message);
            }
        }
        (StatusCode::INTERNAL_SERVER_ERROR, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Arc;
    use stockpick_core::error::StoreError;
    use stockpick_core::storage::memory::MemoryCatalog;
    use stockpick_core::storage::CatalogAccess;
    use tower::ServiceExt;

    struct DownCatalog;

    #[async_trait::async_trait]
    impl CatalogAccess for DownCatalog {
        async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }

        async fn upsert(&self, _record: &Record) -> Result<bool, StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
    }

    fn rec(ticker: &str, rating_from: &str, rating_to: &str, action: &str) -> Record {
        Record {
            ticker: ticker.to_string(),
            company: format!("{ticker} Inc."),
            brokerage: "Broker".to_string(),
            action: action.to_string(),
            rating_from: rating_from.to_string(),
            rating_to: rating_to.to_string(),
            target_from: "$100".to_string(),
            target_to: "$120".to_string(),
        }
    }

    fn app_with(catalog: Arc<dyn CatalogAccess>) -> Router {
        router(AppState {
            service: Some(ScoreQueryService::new(catalog)),
        })
    }

    fn seeded_app() -> Router {
        app_with(Arc::new(MemoryCatalog::with_records(vec![
            rec("TSLA", "Buy", "Sell", "downgraded by"),
            rec("AAPL", "Sell", "Buy", "upgraded by"),
            rec("MSFT", "Neutral", "Buy", "reiterated by"),
        ])))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let res = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn home_returns_welcome_text() {
        let (status, body) = get(seeded_app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, WELCOME.as_bytes());
    }

    #[tokio::test]
    async fn stocks_lists_every_record() {
        let (status, body) = get(seeded_app(), "/stocks").await;
        assert_eq!(status, StatusCode::OK);

        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let arr = v.as_array().unwrap();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr[0]["ticker"], "TSLA");
        assert_eq!(arr[0]["rating_from"], "Buy");
        assert_eq!(arr[0]["target_to"], "$120");
    }

    #[tokio::test]
    async fn recommendations_are_ranked() {
        let (status, body) = get(seeded_app(), "/recommendations").await;
        assert_eq!(status, StatusCode::OK);

        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let arr = v.as_array().unwrap();
        let tickers: Vec<_> = arr
            .iter()
            .map(|o| o["stock"]["ticker"].as_str().unwrap())
            .collect();
        assert_eq!(tickers, vec!["AAPL", "MSFT", "TSLA"]);

        let top = arr[0]["score"].as_f64().unwrap();
        assert!((top - 5.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_catalog_serializes_as_empty_array() {
        let app = app_with(Arc::new(MemoryCatalog::new()));
        let (status, body) = get(app.clone(), "/stocks").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"[]");

        let (status, body) = get(app, "/recommendations").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn catalog_failure_is_500() {
        let app = app_with(Arc::new(DownCatalog));

        let (status, body) = get(app.clone(), "/stocks").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, b"Error fetching stocks");

        let (status, body) = get(app, "/recommendations").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, b"Error fetching recommendations");
    }

    #[tokio::test]
    async fn degraded_mode_is_500() {
        let app = router(AppState { service: None });
        let (status, _) = get(app.clone(), "/stocks").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, body) = get(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, WELCOME.as_bytes());
    }

    #[tokio::test]
    async fn cors_headers_on_responses_and_preflight() {
        let res = seeded_app()
            .oneshot(
                Request::builder()
                    .uri("/stocks")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );

        let res = seeded_app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/recommendations")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let methods = res
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(methods.contains("GET"));
        assert!(methods.contains("DELETE"));
    }

    #[tokio::test]
    async fn bare_options_is_ok() {
        for uri in ["/", "/stocks", "/recommendations"] {
            let res = seeded_app()
                .oneshot(
                    Request::builder()
                        .method(Method::OPTIONS)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK, "OPTIONS {uri}");
            let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
            assert!(body.is_empty());
        }
    }
}
