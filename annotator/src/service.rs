//! HTTP surface of the webhook.

use std::sync::Arc;

use annotator_core::admission::{AdmissionHandler, AdmissionRequest, AdmissionResponse, AdmissionReview};
use axum::{extract::State, routing::post, Json, Router};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::webhook::NamespaceAnnotator;

/// Path the webhook is registered under (see the yaml/ manifest).
pub const MUTATE_PATH: &str = "/mutate-core-v1-namespace";

/// Builds the webhook router around a shared handler.
pub fn app(handler: Arc<NamespaceAnnotator>) -> Router {
    Router::new()
        .route(MUTATE_PATH, post(mutate_handler))
        .with_state(handler)
        .layer(TraceLayer::new_for_http())
}

async fn mutate_handler(
    State(handler): State<Arc<NamespaceAnnotator>>,
    Json(review): Json<AdmissionReview>,
) -> Json<AdmissionReview> {
    let request: AdmissionRequest = match review.try_into() {
        Ok(request) => request,
        Err(err) => {
            warn!(%err, "review envelope carried no request");
            return Json(AdmissionResponse::invalid(err).into_review());
        }
    };

    Json(handler.handle(&request).into_review())
}
