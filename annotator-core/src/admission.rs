//! Types for the admission review exchange with the Kubernetes apiserver.
//!
//! A mutating webhook receives an [`AdmissionReview`] wrapping an
//! [`AdmissionRequest`], and answers with another review wrapping an
//! [`AdmissionResponse`]. For background, see:
//! <https://kubernetes.io/docs/reference/access-authn-authz/extensible-admission-controllers/>

use crate::{
    gvk::{GroupVersionKind, GroupVersionResource},
    response::Status,
};

use http::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

/// The `kind` field in [`TypeMeta`].
pub const META_KIND: &str = "AdmissionReview";
/// The `api_version` field in [`TypeMeta`] on the served review version.
pub const META_API_VERSION_V1: &str = "admission.k8s.io/v1";

/// Failed to convert an [`AdmissionReview`] into an [`AdmissionRequest`].
#[derive(Debug, Error)]
#[error("AdmissionReview does not contain a request")]
pub struct ConvertAdmissionReviewError;

/// The object carried by an [`AdmissionRequest`] could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The request carried no object payload.
    #[error("admission request has no object to decode")]
    MissingObject,
    /// The payload did not deserialize into the expected resource.
    ///
    /// Partially-malformed input is never accepted; the first
    /// deserialization failure is reported as-is.
    #[error("failed to decode admission object: {0}")]
    Parse(#[source] serde_json::Error),
}

/// A mutated resource failed to serialize back to bytes.
#[derive(Debug, Error)]
#[error("failed to encode mutated object: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// The patch between two serialized objects could not be produced.
#[derive(Debug, Error)]
#[error("failed to build admission patch: {0}")]
pub struct PatchError(#[from] serde_json::Error);

/// Type information that is flattened into the review envelope.
#[derive(Deserialize, Serialize, Clone, Default, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    /// The version of the API
    pub api_version: String,

    /// The name of the API
    pub kind: String,
}

impl TypeMeta {
    /// [`TypeMeta`] for the served `admission.k8s.io/v1` review version.
    pub fn admission_v1() -> Self {
        TypeMeta {
            api_version: META_API_VERSION_V1.to_owned(),
            kind: META_KIND.to_owned(),
        }
    }
}

/// The envelope pairing a request with its response for one admission decision.
///
/// This is both the input type received by the webhook and the output type it
/// answers with. Inbound envelopes convert into an [`AdmissionRequest`] via
/// [`TryInto`]; [`AdmissionResponse::into_review`] produces the reply.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReview {
    /// Contains the API version and type of the review.
    #[serde(flatten)]
    pub types: TypeMeta,

    /// Describes the attributes for the admission request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<AdmissionRequest>,

    /// Describes the attributes for the admission response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AdmissionResponse>,
}

impl TryFrom<AdmissionReview> for AdmissionRequest {
    type Error = ConvertAdmissionReviewError;

    fn try_from(review: AdmissionReview) -> Result<Self, Self::Error> {
        match review.request {
            Some(mut request) => {
                request.types = review.types;
                Ok(request)
            }
            None => Err(ConvertAdmissionReviewError),
        }
    }
}

/// An incoming admission request, extracted from an [`AdmissionReview`].
///
/// Only the attributes this webhook consumes are modelled; the remaining v1
/// request fields (`userInfo`, the `request*` conversion triple, `options`)
/// are ignored on deserialization.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    /// Copied from the containing [`AdmissionReview`] and used to answer
    /// with the same review version.
    #[serde(skip)]
    pub types: TypeMeta,

    /// An identifier correlating this request with its response, suitable
    /// for matching log entries between the webhook and the apiserver.
    pub uid: String,

    /// The fully-qualified type of object being submitted.
    pub kind: GroupVersionKind,

    /// The fully-qualified resource being requested.
    pub resource: GroupVersionResource,

    /// The name of the object as presented in the request. Empty on CREATE
    /// when the client relies on server-side name generation.
    #[serde(default)]
    pub name: String,

    /// The namespace associated with the request, if any.
    #[serde(default)]
    pub namespace: Option<String>,

    /// The operation being performed.
    pub operation: Operation,

    /// The submitted object, byte-exact as the apiserver serialized it.
    /// `None` for [`DELETE`](Operation::Delete) operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Box<RawValue>>,

    /// The existing object. Only populated for DELETE and UPDATE requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_object: Option<Box<RawValue>>,

    /// Specifies that modifications will definitely not be persisted for
    /// this request.
    #[serde(default)]
    pub dry_run: bool,
}

/// The operation specified in an [`AdmissionRequest`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    /// An operation that creates a resource.
    Create,
    /// An operation that updates a resource.
    Update,
    /// An operation that deletes a resource.
    Delete,
    /// An operation that connects to a resource.
    Connect,
}

/// Decodes the raw object carried by an [`AdmissionRequest`] into a typed
/// resource.
///
/// The decoder is stateless and immutable: construct one at startup and
/// share it freely across concurrent calls.
#[derive(Clone, Copy, Debug, Default)]
pub struct Decoder;

impl Decoder {
    /// Creates a decoder.
    pub fn new() -> Self {
        Decoder
    }

    /// Parses the request's object payload into `T`.
    pub fn decode<T: DeserializeOwned>(&self, request: &AdmissionRequest) -> Result<T, DecodeError> {
        let raw = request.object.as_deref().ok_or(DecodeError::MissingObject)?;
        self.decode_raw(raw.get().as_bytes())
    }

    /// Parses raw serialized bytes into `T`.
    pub fn decode_raw<T: DeserializeOwned>(&self, raw: &[u8]) -> Result<T, DecodeError> {
        serde_json::from_slice(raw).map_err(DecodeError::Parse)
    }
}

/// The contract an admission handler implements.
///
/// Handlers are shared across concurrent calls and keep no per-call state;
/// everything a decision needs arrives in the request.
pub trait AdmissionHandler {
    /// Produces the admission decision for one request.
    fn handle(&self, request: &AdmissionRequest) -> AdmissionResponse;
}

/// An outgoing admission response. Constructed from the corresponding
/// [`AdmissionRequest`] via [`AdmissionResponse::from`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct AdmissionResponse {
    /// Copied from the corresponding constructing [`AdmissionRequest`].
    #[serde(skip)]
    pub types: TypeMeta,

    /// Identifier mirrored from the corresponding request.
    pub uid: String,

    /// Indicates whether or not the admission request was permitted.
    pub allowed: bool,

    /// Details on why a request was disallowed. This field IS NOT consulted
    /// in any way when `allowed` is `true`.
    #[serde(rename = "status", default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Status>,

    /// The patch body. On the wire this is base64, following the Kubernetes
    /// `[]byte` marshalling convention.
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub patch: Option<Vec<u8>>,

    /// The type of patch. Only "JSONPatch" (RFC 6902) is produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    patch_type: Option<PatchType>,
}

impl From<&AdmissionRequest> for AdmissionResponse {
    fn from(request: &AdmissionRequest) -> Self {
        AdmissionResponse {
            types: request.types.clone(),
            uid: request.uid.clone(),
            allowed: true,
            result: None,
            patch: None,
            patch_type: None,
        }
    }
}

impl AdmissionResponse {
    /// Constructs a response for an envelope whose request could not be
    /// read. There is no uid to mirror, so this should only be used when
    /// the original request cannot be recovered.
    pub fn invalid<T: ToString>(reason: T) -> Self {
        AdmissionResponse {
            types: TypeMeta::admission_v1(),
            uid: Default::default(),
            allowed: false,
            result: Some(
                Status::failure(&reason.to_string(), "InvalidRequest")
                    .with_code(StatusCode::BAD_REQUEST.as_u16()),
            ),
            patch: None,
            patch_type: None,
        }
    }

    /// Disallows the request, carrying the originating error's message and a
    /// suggested HTTP status code for the apiserver to report.
    #[must_use]
    pub fn errored<T: ToString>(mut self, code: StatusCode, reason: T) -> Self {
        self.allowed = false;
        self.result = Some(Status::failure(&reason.to_string(), "").with_code(code.as_u16()));
        self
    }

    /// Attaches the minimal JSON Patch that turns `original` into `current`.
    ///
    /// Applying the attached patch to `original` yields exactly `current`.
    /// Semantically equal documents attach nothing and leave the response
    /// allowed, so a no-op mutation answers without a patch.
    pub fn with_patch_from_raw(mut self, original: &[u8], current: &[u8]) -> Result<Self, PatchError> {
        let before: serde_json::Value = serde_json::from_slice(original)?;
        let after: serde_json::Value = serde_json::from_slice(current)?;

        let patch = json_patch::diff(&before, &after);
        if !patch.0.is_empty() {
            self.patch = Some(serde_json::to_vec(&patch)?);
            self.patch_type = Some(PatchType::JsonPatch);
        }
        Ok(self)
    }

    /// Converts the response into an [`AdmissionReview`] usable as a webhook
    /// reply, with the request's review version passed through.
    pub fn into_review(self) -> AdmissionReview {
        AdmissionReview {
            types: self.types.clone(),
            request: None,
            response: Some(self),
        }
    }
}

/// The type of patch returned in an [`AdmissionResponse`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum PatchType {
    /// The patch body implements JSON Patch under RFC 6902.
    #[serde(rename = "JSONPatch")]
    JsonPatch,
}

/// Marshals the optional patch body the way Kubernetes marshals `[]byte`.
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|encoded| STANDARD.decode(encoded).map_err(serde::de::Error::custom))
            .transpose()
    }
}
