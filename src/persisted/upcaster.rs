use serde_json::Value;

/// A stateless, pure transformation that moves a persisted cart document from
/// one schema version to the next.
///
/// Upcasters are plain structs with function pointers and are kept in a
/// static slice, see [`CART_UPCASTERS`](super::CART_UPCASTERS).
pub struct StateUpcaster {
    pub from_version: u64,
    pub to_version: u64,
    pub transform: fn(document: Value) -> Value,
}

/// Apply upcasters to a document at `version`. Chains automatically
/// (v0->v1->v2). Returns the document and the version it ended at.
pub fn upcast(mut document: Value, mut version: u64, upcasters: &[StateUpcaster]) -> (Value, u64) {
    while let Some(u) = upcasters.iter().find(|u| u.from_version == version) {
        document = (u.transform)(document);
        version = u.to_version;
    }
    (document, version)
}
