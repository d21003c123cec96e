//! Health endpoints: liveness and readiness probes for orchestration and load balancers.
//!
//! Readiness also pings the employee store, so a replica whose database is
//! unreachable drops out of rotation while staying alive.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use tracing::warn;

use crate::domain::ports::{AlwaysHealthy, StoreHealth};

/// Shared health state for readiness and liveness checks.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    store: Arc<dyn StoreHealth>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new(Arc::new(AlwaysHealthy))
    }
}

impl HealthState {
    /// Create a health state that starts live but not ready.
    pub fn new(store: Arc<dyn StoreHealth>) -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            store,
        }
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail fast during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// When false, liveness probes emit 503 to trigger restarts.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Ready and the store answers a ping.
    pub async fn check_ready(&self) -> bool {
        if !self.is_ready() {
            return false;
        }
        match self.store.ping().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "readiness probe failed: store unavailable");
                false
            }
        }
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness probe. Return 200 when the server is marked ready and the store
/// responds; return 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (
            status = 405,
            description = "Method not allowed; only GET probes are supported"
        ),
        (status = 503, description = "Server or employee store is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.check_ready().await)
}

/// Liveness probe. Return 200 while the process is marked alive and 503 once draining.
/// Call `HealthState::mark_unhealthy` before graceful shutdown to surface the drain early.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (
            status = 405,
            description = "Method not allowed; only GET probes are supported"
        ),
        (
            status = 503,
            description = "Server is shutting down"
        )
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockStoreHealth, StoreHealthError};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;

    async fn probe(state: HealthState, uri: &str) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(ready)
                .service(live),
        )
        .await;
        test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await
    }

    fn failing_store() -> Arc<dyn StoreHealth> {
        let mut store = MockStoreHealth::new();
        store
            .expect_ping()
            .returning(|| Err(StoreHealthError::unavailable("connection refused")));
        Arc::new(store)
    }

    #[actix_web::test]
    async fn readiness_waits_for_mark_ready() {
        let response = probe(HealthState::default(), "/health/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
    }

    #[actix_web::test]
    async fn readiness_succeeds_once_marked_with_a_healthy_store() {
        let state = HealthState::default();
        state.mark_ready();
        let response = probe(state, "/health/ready").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn readiness_fails_when_the_store_is_down() {
        let state = HealthState::new(failing_store());
        state.mark_ready();
        let response = probe(state, "/health/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[rstest]
    #[case(false, StatusCode::OK)]
    #[case(true, StatusCode::SERVICE_UNAVAILABLE)]
    #[actix_web::test]
    async fn liveness_follows_the_drain_flag(#[case] draining: bool, #[case] expected: StatusCode) {
        let state = HealthState::new(failing_store());
        if draining {
            state.mark_unhealthy();
        }
        let response = probe(state, "/health/live").await;
        assert_eq!(response.status(), expected);
    }
}
