//! The namespace-annotating admission handler.

use std::collections::BTreeMap;

use annotator_core::admission::{
    AdmissionHandler, AdmissionRequest, AdmissionResponse, DecodeError, Decoder, EncodeError,
    PatchError,
};
use http::StatusCode;
use k8s_openapi::api::core::v1::Namespace;
use thiserror::Error;
use tracing::{error, info, info_span, warn};

/// Annotation key stamped onto every admitted namespace.
pub const ANNOTATION_KEY: &str = "githu.gkarthiks.io/annotation";
/// Value the marker annotation is always set to.
pub const ANNOTATION_VALUE: &str = "added";

/// Failures the mutation pipeline can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// The submitted object was missing or malformed. The caller's fault.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The mutated namespace failed to serialize. An internal fault: it
    /// should not occur for an object that decoded cleanly.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// The pre/post diff could not be produced. An internal fault.
    #[error(transparent)]
    Patch(#[from] PatchError),
}

impl Error {
    /// The HTTP status code reported on the admission response.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Decode(_) => StatusCode::BAD_REQUEST,
            Error::Encode(_) | Error::Patch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Guarantees the marker annotation is present on `namespace`.
///
/// Creates the annotations map when the object carries none, and always sets
/// the canonical value, overwriting whatever a caller put under the key.
/// Applying it twice changes nothing; the object's name is never touched.
pub fn ensure_marker(namespace: &mut Namespace) {
    namespace
        .metadata
        .annotations
        .get_or_insert_with(BTreeMap::new)
        .insert(ANNOTATION_KEY.to_owned(), ANNOTATION_VALUE.to_owned());
}

/// Mutating admission handler for namespaces.
///
/// Holds only the shared, read-only [`Decoder`]; every call operates on
/// call-local data, so one instance serves all concurrent requests.
pub struct NamespaceAnnotator {
    decoder: Decoder,
}

static_assertions::assert_impl_all!(NamespaceAnnotator: AdmissionHandler, Send, Sync);

impl NamespaceAnnotator {
    /// Creates a handler around a shared admission decoder.
    pub fn new(decoder: Decoder) -> Self {
        NamespaceAnnotator { decoder }
    }

    fn mutate(&self, request: &AdmissionRequest) -> Result<AdmissionResponse, Error> {
        let raw = request
            .object
            .as_deref()
            .ok_or(DecodeError::MissingObject)?
            .get()
            .as_bytes();
        let mut namespace: Namespace = self.decoder.decode_raw(raw)?;

        ensure_marker(&mut namespace);

        let marshaled = serde_json::to_vec(&namespace).map_err(EncodeError::from)?;
        info!(namespace = ?namespace.metadata.name, "namespace annotated");

        Ok(AdmissionResponse::from(request).with_patch_from_raw(raw, &marshaled)?)
    }
}

impl AdmissionHandler for NamespaceAnnotator {
    fn handle(&self, request: &AdmissionRequest) -> AdmissionResponse {
        let span = info_span!(
            "admission",
            uid = %request.uid,
            operation = ?request.operation,
            name = %request.name,
        );
        let _entered = span.enter();
        info!("handling namespace CREATE/UPDATE event");

        match self.mutate(request) {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    Error::Decode(_) => warn!(%err, "could not decode admission object"),
                    _ => error!(%err, "admission pipeline failed unexpectedly"),
                }
                AdmissionResponse::from(request).errored(err.status_code(), &err)
            }
        }
    }
}
