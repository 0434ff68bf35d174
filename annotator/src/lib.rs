//! Mutating admission webhook that stamps a marker annotation on every
//! Namespace passing through CREATE/UPDATE admission.
//!
//! The pipeline is decode → mutate → encode → diff: the submitted object is
//! parsed into a typed [`Namespace`](k8s_openapi::api::core::v1::Namespace),
//! the marker annotation is ensured, and the reply carries the minimal JSON
//! Patch between what the apiserver sent and the mutated object.
#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod service;
pub mod webhook;
