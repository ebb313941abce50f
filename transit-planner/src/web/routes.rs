//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::departures::DepartureSource;
use crate::domain::StopId;
use crate::network::{DEFAULT_LIMIT, Network};
use crate::planner::{PlanError, PlanOutcome, Planner, SearchConfig};

use super::dto::*;
use super::state::AppState;

/// Upper bound on stop search results.
const MAX_SEARCH_LIMIT: usize = 50;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stops/search", get(search_stops))
        .route("/journey/plan", post(plan_journey))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search stops by name.
async fn search_stops(
    State(state): State<AppState>,
    Query(req): Query<StopSearchRequest>,
) -> Json<StopSearchResponse> {
    let limit = req.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_SEARCH_LIMIT);

    let stops = state
        .catalog
        .search(&req.q, limit)
        .into_iter()
        .map(StopResult::from_stop)
        .collect();

    Json(StopSearchResponse { stops })
}

/// Parse an optional RFC 3339 start time. Invalid values mean "now".
fn parse_start_time(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            warn!(start_time = %raw, error = %e, "Invalid start time, planning from now");
            None
        }
    }
}

/// Plan the earliest-arriving journey between two stops.
async fn plan_journey(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PlanJourneyResponse>, AppError> {
    // Parse JSON manually so we can log the body on failure
    let req: PlanJourneyRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(
            error = %e,
            body = %String::from_utf8_lossy(&body),
            "Rejected plan request"
        );
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let start_time = parse_start_time(req.start_time.as_deref());

    let outcome = plan_within_deadline(
        &state.network,
        state.departures.as_ref(),
        &state.config,
        (req.start_stop, req.end_stop),
        start_time,
    )
    .await?;

    match outcome.itinerary() {
        Some(itinerary) => info!(
            from = %req.start_stop,
            to = %req.end_stop,
            segments = itinerary.segments().len(),
            transfers = itinerary.transfers(),
            direct = itinerary.is_direct(),
            duration_secs = itinerary.total_duration().num_seconds(),
            "Planned journey"
        ),
        None => info!(from = %req.start_stop, to = %req.end_stop, "No journey found"),
    }

    Ok(Json(PlanJourneyResponse::from_outcome(&outcome)))
}

/// Run one planning call, giving up after the configured deadline.
async fn plan_within_deadline<S: DepartureSource>(
    network: &Network,
    source: &S,
    config: &SearchConfig,
    (from, to): (StopId, StopId),
    start_time: Option<DateTime<Utc>>,
) -> Result<PlanOutcome, AppError> {
    let planner = Planner::new(network, source, config);
    let outcome = tokio::time::timeout(config.deadline(), planner.plan(from, to, start_time))
        .await
        .map_err(|_| {
            warn!(from = %from, to = %to, deadline = ?config.deadline(), "Planning timed out");
            AppError::Timeout
        })??;
    Ok(outcome)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Upstream { message: String },
    Timeout,
    Internal { message: String },
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::DeparturesUnavailable { .. } => AppError::Upstream {
                message: e.to_string(),
            },
            PlanError::Reconstruction(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "journey planning timed out".to_string(),
            ),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(status = %status, message = %message, "Request failed");
        } else {
            warn!(status = %status, message = %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::departures::StaticDepartureSource;
    use crate::domain::{
        Coordinates, Departure, PatternId, RouteNumber, RoutePattern, Stop, StopId,
        VehicleCategory,
    };
    use crate::network::Network;
    use crate::planner::SearchConfig;
    use crate::web::DepartureBackend;
    use chrono::TimeZone;

    fn stop(id: u32, name: &str, lat: f64, lng: f64) -> Stop {
        Stop::new(StopId(id), name, Coordinates::new(lat, lng))
    }

    fn test_state(config: SearchConfig) -> AppState {
        let pattern = RoutePattern {
            id: PatternId {
                route: RouteNumber::new("2").unwrap(),
                direction: 1,
            },
            name: "Linie 2".into(),
            category: VehicleCategory::Tram,
            direction_label: "Kuhberg".into(),
            stops: vec![
                stop(1, "Hauptbahnhof", 48.399, 9.983),
                stop(2, "Theater", 48.401, 9.990),
                stop(3, "Kuhberg Schulzentrum", 48.390, 9.960),
            ],
        };
        let network = Network::build(&[pattern], config.travel_time.clone());

        let departure = Departure::scheduled(
            RouteNumber::new("2").unwrap(),
            "Kuhberg",
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 2, 0).unwrap(),
        )
        .with_vehicle("47");
        let source = StaticDepartureSource::new().with_departures(StopId(1), vec![departure]);

        AppState::new(network, DepartureBackend::Static(source), config)
    }

    async fn post_plan(state: AppState, body: &str) -> Result<PlanJourneyResponse, AppError> {
        plan_journey(State(state), Bytes::from(body.to_string()))
            .await
            .map(|Json(resp)| resp)
    }

    #[tokio::test]
    async fn health_check() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn plans_journey() {
        let resp = post_plan(
            test_state(SearchConfig::default()),
            r#"{"start_stop": 1, "end_stop": 2, "start_time": "2024-03-15T10:00:00Z"}"#,
        )
        .await
        .unwrap();

        let PlanJourneyResponse::Found { itinerary } = resp else {
            panic!("expected itinerary");
        };
        assert_eq!(itinerary.departure, "2024-03-15T10:02:00Z");
        assert_eq!(itinerary.transfers, 0);
        assert_eq!(itinerary.segments[0].vehicle.as_deref(), Some("47"));
    }

    #[tokio::test]
    async fn unknown_stop_is_not_found_response() {
        let resp = post_plan(
            test_state(SearchConfig::default()),
            r#"{"start_stop": 1, "end_stop": 99}"#,
        )
        .await
        .unwrap();

        match resp {
            PlanJourneyResponse::NotFound { reason } => {
                assert_eq!(reason, "stop 99 is not in the network")
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let result = post_plan(test_state(SearchConfig::default()), r#"{"start_stop": "#).await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));

        let result = post_plan(
            test_state(SearchConfig::default()),
            r#"{"start_stop": "Hauptbahnhof", "end_stop": 2}"#,
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn invalid_start_time_plans_from_now() {
        let resp = post_plan(
            test_state(SearchConfig::default()),
            r#"{"start_stop": 1, "end_stop": 2, "start_time": "tomorrow-ish"}"#,
        )
        .await
        .unwrap();

        assert!(matches!(resp, PlanJourneyResponse::Found { .. }));
    }

    #[tokio::test]
    async fn search_stops_by_name() {
        let state = test_state(SearchConfig::default());

        let Json(resp) = search_stops(
            State(state.clone()),
            Query(StopSearchRequest {
                q: "kuh".into(),
                limit: None,
            }),
        )
        .await;
        assert_eq!(resp.stops.len(), 1);
        assert_eq!(resp.stops[0].id, StopId(3));

        let Json(resp) = search_stops(
            State(state),
            Query(StopSearchRequest {
                q: "a".into(),
                limit: Some(5),
            }),
        )
        .await;
        assert!(resp.stops.is_empty());
    }

    #[test]
    fn start_time_parsing() {
        assert_eq!(
            parse_start_time(Some("2024-03-15T11:00:00+01:00")),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap())
        );
        assert_eq!(parse_start_time(Some("  ")), None);
        assert_eq!(parse_start_time(Some("10:00")), None);
        assert_eq!(parse_start_time(None), None);
    }

    /// Never answers within a test's patience.
    struct StalledSource;

    impl DepartureSource for StalledSource {
        async fn departures_from(
            &self,
            _stop: StopId,
            _limit: usize,
        ) -> Result<Vec<Departure>, crate::departures::SourceError> {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok(Vec::new())
        }

        async fn arrivals_at(
            &self,
            _stop: StopId,
            _limit: usize,
        ) -> Result<Vec<Departure>, crate::departures::SourceError> {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn slow_departures_hit_the_deadline() {
        let config = SearchConfig::default().with_deadline_secs(1);
        let state = test_state(config.clone());

        let result = plan_within_deadline(
            &state.network,
            &StalledSource,
            &config,
            (StopId(1), StopId(2)),
            None,
        )
        .await;

        let Err(err) = result else {
            panic!("expected deadline to pass");
        };
        assert!(matches!(err, AppError::Timeout));
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn error_status_codes() {
        let status = |e: AppError| e.into_response().status();

        assert_eq!(
            status(AppError::BadRequest {
                message: "x".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(PlanError::DeparturesUnavailable { stops: 3 }.into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status(AppError::Timeout), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            status(AppError::Internal {
                message: "x".into()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn router_builds() {
        let _router = create_router(test_state(SearchConfig::default()));
    }
}
