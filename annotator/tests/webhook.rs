//! Drives the webhook router end to end, envelope in and envelope out.

use std::sync::Arc;

use annotator::{service, webhook};
use annotator_core::admission::Decoder;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

fn app() -> axum::Router {
    service::app(Arc::new(webhook::NamespaceAnnotator::new(Decoder::new())))
}

async fn post_review(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(service::MUTATE_PATH)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn review_for(object: serde_json::Value) -> serde_json::Value {
    json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
            "kind": {"group": "", "version": "v1", "kind": "Namespace"},
            "resource": {"group": "", "version": "v1", "resource": "namespaces"},
            "name": "team-a",
            "operation": "CREATE",
            "userInfo": {"username": "kubernetes-admin"},
            "object": object,
        }
    })
}

#[tokio::test]
async fn mutate_round_trip_patches_namespace() {
    let (status, reply) = post_review(review_for(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {"name": "team-a"},
    })))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["apiVersion"], "admission.k8s.io/v1");
    assert_eq!(reply["kind"], "AdmissionReview");

    let response = &reply["response"];
    assert_eq!(response["uid"], "705ab4f5-6393-11e8-b7cc-42010a800002");
    assert_eq!(response["allowed"], true);
    assert_eq!(response["patchType"], "JSONPatch");

    let patch = STANDARD.decode(response["patch"].as_str().unwrap()).unwrap();
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&patch).unwrap(),
        json!([{
            "op": "add",
            "path": "/metadata/annotations",
            "value": {webhook::ANNOTATION_KEY: webhook::ANNOTATION_VALUE},
        }])
    );
}

#[tokio::test]
async fn already_marked_namespace_passes_unpatched() {
    let (status, reply) = post_review(review_for(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": "team-a",
            "annotations": {webhook::ANNOTATION_KEY: webhook::ANNOTATION_VALUE},
        },
    })))
    .await;

    assert_eq!(status, StatusCode::OK);
    let response = &reply["response"];
    assert_eq!(response["allowed"], true);
    assert!(response.get("patch").is_none());
    assert!(response.get("patchType").is_none());
}

#[tokio::test]
async fn undecodable_object_is_disallowed_with_400() {
    let (status, reply) = post_review(review_for(json!({"metadata": 42}))).await;

    // the webhook reply itself is always HTTP 200; the verdict is in the body
    assert_eq!(status, StatusCode::OK);
    let response = &reply["response"];
    assert_eq!(response["allowed"], false);
    assert_eq!(response["status"]["code"], 400);
    assert!(!response["status"]["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn envelope_without_request_is_invalid() {
    let (status, reply) = post_review(json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    let response = &reply["response"];
    assert_eq!(response["allowed"], false);
    assert_eq!(response["uid"], "");
    assert_eq!(response["status"]["code"], 400);
    assert_eq!(response["status"]["reason"], "InvalidRequest");
}
