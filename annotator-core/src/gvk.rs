//! Group/version identifiers naming the resource under admission.
use serde::{Deserialize, Serialize};

/// The fully-qualified type of an object submitted for admission.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct GroupVersionKind {
    /// API group
    pub group: String,
    /// Version
    pub version: String,
    /// Kind
    pub kind: String,
}

impl GroupVersionKind {
    /// Construct from explicit group, version, and kind
    pub fn gvk(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }
}

/// The fully-qualified family of resources named by an admission request.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct GroupVersionResource {
    /// API group
    pub group: String,
    /// Version
    pub version: String,
    /// Resource (plural name)
    pub resource: String,
}

impl GroupVersionResource {
    /// Construct from explicit group, version, and plural resource name
    pub fn gvr(group: &str, version: &str, resource: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_group_serializes_empty() {
        let gvk = GroupVersionKind::gvk("", "v1", "Namespace");
        let js = serde_json::to_value(&gvk).unwrap();
        assert_eq!(js, serde_json::json!({"group": "", "version": "v1", "kind": "Namespace"}));
    }

    #[test]
    fn gvr_round_trips() {
        let gvr = GroupVersionResource::gvr("", "v1", "namespaces");
        let js = serde_json::to_string(&gvr).unwrap();
        assert_eq!(serde_json::from_str::<GroupVersionResource>(&js).unwrap(), gvr);
    }
}
