//! Client-less types for the namespace-annotator admission webhook.
//!
//! This crate holds the review envelope exchanged with the Kubernetes
//! apiserver, the decoder for raw admission payloads, and admission response
//! construction. The serving half of the project lives in the `annotator`
//! crate.
#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod admission;
pub use admission::{AdmissionHandler, AdmissionRequest, AdmissionResponse, AdmissionReview, Decoder};

pub mod gvk;
pub use gvk::{GroupVersionKind, GroupVersionResource};

pub mod response;
pub use response::Status;
