//! Persisted cart layout.
//!
//! The cart is stored as one JSON string under a single key:
//!
//! ```json
//! {"version": 1, "items": [{"id": "A", "title": "T", "image_url": "u", "price": 10.0, "quantity": 1}]}
//! ```
//!
//! Older app builds wrote a bare array of items with no version field. That
//! layout is read as version 0 and upcast on load; writes always use
//! [`CURRENT_VERSION`].

mod upcaster;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::cart::{Cart, LineItem};

pub use upcaster::{upcast, StateUpcaster};

/// Schema version written by [`encode`].
pub const CURRENT_VERSION: u64 = 1;

/// Upcasters from every known older layout to [`CURRENT_VERSION`].
pub static CART_UPCASTERS: &[StateUpcaster] = &[StateUpcaster {
    from_version: 0,
    to_version: 1,
    transform: wrap_legacy_items,
}];

/// v0 was the bare item array.
fn wrap_legacy_items(items: Value) -> Value {
    json!({ "version": 1, "items": items })
}

/// Errors decoding a persisted cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("persisted cart is not valid json: {0}")]
    Json(String),
    #[error("persisted cart has unexpected layout: {0}")]
    Layout(String),
    #[error("persisted cart version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u64, supported: u64 },
}

impl From<serde_json::Error> for PersistError {
    fn from(err: serde_json::Error) -> Self {
        PersistError::Json(err.to_string())
    }
}

#[derive(Serialize)]
struct PersistedCartRef<'a> {
    version: u64,
    items: &'a [LineItem],
}

#[derive(Deserialize)]
struct PersistedCart {
    version: u64,
    items: Vec<LineItem>,
}

/// Serialize the full cart in the current layout.
pub fn encode(cart: &Cart) -> Result<String, PersistError> {
    let doc = PersistedCartRef {
        version: CURRENT_VERSION,
        items: cart.items(),
    };
    Ok(serde_json::to_string(&doc)?)
}

/// Decode a persisted cart in any known layout.
pub fn decode(raw: &str) -> Result<Cart, PersistError> {
    let document: Value = serde_json::from_str(raw)?;
    let version = match &document {
        Value::Array(_) => 0,
        Value::Object(map) => map
            .get("version")
            .and_then(Value::as_u64)
            .ok_or_else(|| PersistError::Layout("missing numeric version".into()))?,
        other => {
            return Err(PersistError::Layout(format!(
                "expected array or object, found {}",
                json_kind(other)
            )))
        }
    };

    let (document, version) = upcast(document, version, CART_UPCASTERS);
    if version != CURRENT_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: version,
            supported: CURRENT_VERSION,
        });
    }

    let persisted: PersistedCart = serde_json::from_value(document)?;
    debug_assert_eq!(persisted.version, CURRENT_VERSION);
    Ok(Cart::from_items(persisted.items))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Product;

    fn sample() -> Cart {
        Cart::new()
            .add(Product::new("A", "Tee", "https://img/a.png", 10.0))
            .add(Product::new("B", "Mug", "https://img/b.png", 4.5))
            .add(Product::new("A", "Tee", "https://img/a.png", 10.0))
    }

    #[test]
    fn encode_writes_versioned_document() {
        let raw = encode(&sample()).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["items"][0]["id"], "A");
        assert_eq!(value["items"][0]["quantity"], 2);
        assert_eq!(value["items"][1]["image_url"], "https://img/b.png");
    }

    #[test]
    fn decode_reads_what_encode_wrote() {
        let cart = sample();
        assert_eq!(decode(&encode(&cart).unwrap()).unwrap(), cart);
    }

    #[test]
    fn decode_upcasts_legacy_array() {
        let raw = r#"[
            {"id":"A","title":"Tee","image_url":"https://img/a.png","price":10,"quantity":2},
            {"id":"B","title":"Mug","imageUrl":"https://img/b.png","price":4.5,"quantity":1}
        ]"#;
        let cart = decode(raw).unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get("A").unwrap().quantity, 2);
        assert_eq!(cart.get("B").unwrap().image_url, "https://img/b.png");
    }

    #[test]
    fn decode_empty_legacy_array() {
        assert!(decode("[]").unwrap().is_empty());
    }

    #[test]
    fn decode_normalizes_items() {
        let raw = r#"{"version":1,"items":[
            {"id":"A","title":"T","image_url":"u","price":1,"quantity":0},
            {"id":"B","title":"T","image_url":"u","price":1,"quantity":3},
            {"id":"B","title":"T","image_url":"u","price":1,"quantity":9}
        ]}"#;
        let cart = decode(raw).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("B").unwrap().quantity, 3);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode("{not json"), Err(PersistError::Json(_))));
        assert!(matches!(decode("42"), Err(PersistError::Layout(_))));
        assert!(matches!(decode(r#"{"items":[]}"#), Err(PersistError::Layout(_))));
        assert!(matches!(
            decode(r#"[{"id":"A"}]"#),
            Err(PersistError::Json(_))
        ));
    }

    #[test]
    fn decode_rejects_newer_version() {
        assert_eq!(
            decode(r#"{"version":7,"items":[]}"#),
            Err(PersistError::UnsupportedVersion {
                found: 7,
                supported: CURRENT_VERSION
            })
        );
    }
}
