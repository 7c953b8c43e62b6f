//! Track Purchase: reports each product of an `Order Completed` event to the
//! Braze session as an in-app purchase.

use actions_core::transform::omit;
use actions_core::{
    ActionDefinition, ActionResult, BrowserAction, FieldDescriptor, FieldSchema, Identifier,
    Platform, ValueKind,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::client::{BrazeClient, BrazeSettings};

/// Fields of a product entry. These names are reserved and never forwarded as
/// free-form purchase properties.
pub const PRODUCT_FIELDS: [&str; 4] = ["product_id", "price", "currency", "quantity"];

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_QUANTITY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: Identifier,
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    /// Forwarded as given; the SDK rejects values outside 1..=100 per product.
    #[serde(default)]
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPurchasePayload {
    #[serde(default)]
    pub purchase_properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub products: Option<Vec<Product>>,
}

pub struct TrackPurchase {
    definition: ActionDefinition,
}

impl TrackPurchase {
    pub fn new() -> Self {
        let [product_id, price, currency, quantity] = PRODUCT_FIELDS;
        let products = FieldSchema::new(vec![
            FieldDescriptor::new(product_id, "Product ID", ValueKind::String)
                .required()
                .description(
                    "Identifier of the purchased product, such as a SKU. At most 255 characters, \
                     must not start with `$`, alphanumerics and punctuation only.",
                ),
            FieldDescriptor::new(price, "Price", ValueKind::Number)
                .required()
                .description(
                    "Price paid in the currency's base units (dollars and cents for USD, whole \
                     yen for JPY). The SDK rounds to two decimal places.",
                ),
            FieldDescriptor::new(currency, "Currency Code", ValueKind::String).description(
                "ISO 4217 currency code. Defaults to USD.",
            ),
            FieldDescriptor::new(quantity, "Quantity", ValueKind::Number).description(
                "Whole number of items purchased, between 1 and 100. Defaults to 1.",
            ),
        ]);

        let fields = FieldSchema::new(vec![
            FieldDescriptor::new("purchaseProperties", "Purchase Properties", ValueKind::Object)
                .description(
                    "Properties attached to every product of this purchase. Keys are at most \
                     255 characters and cannot begin with `$`. The total size may not exceed 50KB.",
                )
                .default_path("$.properties"),
            FieldDescriptor::new("products", "Products", ValueKind::Object)
                .description("Products purchased by the user.")
                .multiple()
                .default_path("$.properties.products")
                .properties(products),
        ]);

        Self {
            definition: ActionDefinition {
                slug: "trackPurchase".to_string(),
                title: "Track Purchase".to_string(),
                description: "Reports that the current user made an in-app purchase.".to_string(),
                platform: Platform::Web,
                default_subscription: Some(
                    r#"type = "track" and event = "Order Completed""#.to_string(),
                ),
                fields,
            },
        }
    }
}

impl Default for TrackPurchase {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: BrazeClient + ?Sized> BrowserAction<C> for TrackPurchase {
    type Settings = BrazeSettings;
    type Payload = TrackPurchasePayload;

    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    fn perform(
        &self,
        client: &C,
        _settings: &BrazeSettings,
        payload: TrackPurchasePayload,
    ) -> ActionResult<()> {
        if !client.ready() {
            return Ok(());
        }

        let properties = payload
            .purchase_properties
            .as_ref()
            .map(|p| omit(p, &PRODUCT_FIELDS))
            .unwrap_or_default();

        for product in payload.products.unwrap_or_default() {
            let product_id = product.product_id.to_string();
            let logged = client.log_purchase(
                &product_id,
                product.price,
                product.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
                product.quantity.unwrap_or(DEFAULT_QUANTITY),
                &properties,
            );

            if !logged {
                warn!(
                    product_id = %product_id,
                    "Braze failed to attach purchase to the session for product"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use tracing_test::traced_test;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        product_id: String,
        price: f64,
        currency: String,
        quantity: f64,
        properties: Map<String, Value>,
    }

    struct RecordingClient {
        ready: bool,
        reject: Vec<&'static str>,
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingClient {
        fn new(ready: bool) -> Self {
            Self {
                ready,
                reject: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }
    }

    impl BrazeClient for RecordingClient {
        fn ready(&self) -> bool {
            self.ready
        }

        fn log_purchase(
            &self,
            product_id: &str,
            price: f64,
            currency: &str,
            quantity: f64,
            properties: &Map<String, Value>,
        ) -> bool {
            self.calls.lock().push(Call {
                product_id: product_id.to_string(),
                price,
                currency: currency.to_string(),
                quantity,
                properties: properties.clone(),
            });
            !self.reject.contains(&product_id)
        }
    }

    fn settings() -> BrazeSettings {
        BrazeSettings {
            api_key: "key".to_string(),
            endpoint: "sdk.iad-01.braze.com".to_string(),
            sdk_version: None,
        }
    }

    fn order_completed() -> Value {
        json!({
            "type": "track",
            "event": "Order Completed",
            "properties": {
                "order_id": "o-1",
                "price": 99,
                "currency": "EUR",
                "coupon": "SPRING",
                "products": [
                    {"product_id": "sku-1", "price": 10.5, "currency": "CAD", "quantity": 2},
                    {"product_id": 42, "price": 3}
                ]
            }
        })
    }

    #[test]
    fn test_definition() {
        let action = TrackPurchase::new();
        let def = BrowserAction::<RecordingClient>::definition(&action);
        assert_eq!(def.title, "Track Purchase");
        assert_eq!(def.platform, Platform::Web);
        assert_eq!(
            def.default_subscription.as_deref(),
            Some(r#"type = "track" and event = "Order Completed""#)
        );
        let products = def.fields.get("products").unwrap();
        assert!(products.multiple);
        assert_eq!(products.properties.as_ref().unwrap().names(), PRODUCT_FIELDS.to_vec());
    }

    #[test]
    #[traced_test]
    fn test_logs_each_product_with_defaults() {
        let client = RecordingClient::new(true);
        TrackPurchase::new()
            .run(&client, &settings(), &order_completed(), None)
            .unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 2);

        assert_eq!(calls[0].product_id, "sku-1");
        assert_eq!(calls[0].price, 10.5);
        assert_eq!(calls[0].currency, "CAD");
        assert_eq!(calls[0].quantity, 2.0);

        assert_eq!(calls[1].product_id, "42");
        assert_eq!(calls[1].price, 3.0);
        assert_eq!(calls[1].currency, "USD");
        assert_eq!(calls[1].quantity, 1.0);

        assert!(!logs_contain("failed to attach purchase"));
    }

    #[test]
    fn test_reserved_keys_stripped() {
        let client = RecordingClient::new(true);
        TrackPurchase::new()
            .run(&client, &settings(), &order_completed(), None)
            .unwrap();

        for call in client.calls() {
            for key in PRODUCT_FIELDS {
                assert!(!call.properties.contains_key(key), "{} leaked", key);
            }
            assert_eq!(call.properties["coupon"], "SPRING");
            assert_eq!(call.properties["order_id"], "o-1");
        }
    }

    #[test]
    #[traced_test]
    fn test_failure_warns_and_continues() {
        let mut client = RecordingClient::new(true);
        client.reject = vec!["a"];
        let payload = TrackPurchasePayload {
            purchase_properties: None,
            products: Some(vec![
                Product {
                    product_id: Identifier::from("a"),
                    price: 1.0,
                    currency: None,
                    quantity: None,
                },
                Product {
                    product_id: Identifier::from("b"),
                    price: 2.0,
                    currency: None,
                    quantity: None,
                },
            ]),
        };

        TrackPurchase::new()
            .perform(&client, &settings(), payload)
            .unwrap();

        let ids: Vec<_> = client.calls().into_iter().map(|c| c.product_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(logs_contain("failed to attach purchase"));
        assert!(logs_contain("product_id=a"));
        assert!(!logs_contain("product_id=b"));
    }

    #[test]
    #[traced_test]
    fn test_out_of_range_quantity_does_not_drop_batch() {
        let mut client = RecordingClient::new(true);
        client.reject = vec!["a", "c"];
        let event = json!({
            "type": "track",
            "event": "Order Completed",
            "properties": {
                "products": [
                    {"product_id": "a", "price": 1, "quantity": -1},
                    {"product_id": "b", "price": 2},
                    {"product_id": "c", "price": 3, "quantity": 1.5}
                ]
            }
        });

        TrackPurchase::new()
            .run(&client, &settings(), &event, None)
            .unwrap();

        let calls = client.calls();
        let ids: Vec<_> = calls.iter().map(|c| c.product_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(calls[0].quantity, -1.0);
        assert_eq!(calls[1].quantity, 1.0);
        assert_eq!(calls[2].quantity, 1.5);
        assert!(logs_contain("product_id=a"));
        assert!(logs_contain("product_id=c"));
        assert!(!logs_contain("product_id=b"));
    }

    #[test]
    fn test_integral_float_product_id() {
        let client = RecordingClient::new(true);
        let event = json!({"properties": {"products": [{"product_id": 42.0, "price": 1}]}});
        TrackPurchase::new()
            .run(&client, &settings(), &event, None)
            .unwrap();
        assert_eq!(client.calls()[0].product_id, "42");
    }

    #[test]
    #[traced_test]
    fn test_not_ready_is_noop() {
        let mut client = RecordingClient::new(false);
        client.reject = vec!["sku-1", "42"];
        TrackPurchase::new()
            .run(&client, &settings(), &order_completed(), None)
            .unwrap();

        assert!(client.calls().is_empty());
        assert!(!logs_contain("failed to attach purchase"));
    }

    #[test]
    fn test_no_products() {
        let client = RecordingClient::new(true);
        let event = json!({"type": "track", "event": "Order Completed", "properties": {"total": 5}});
        TrackPurchase::new()
            .run(&client, &settings(), &event, None)
            .unwrap();
        assert!(client.calls().is_empty());

        TrackPurchase::new()
            .perform(&client, &settings(), TrackPurchasePayload::default())
            .unwrap();
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_product_missing_price_rejected() {
        let client = RecordingClient::new(true);
        let event = json!({"properties": {"products": [{"product_id": "x"}]}});
        let err = TrackPurchase::new()
            .run(&client, &settings(), &event, None)
            .unwrap_err();
        assert!(err.to_string().contains("price"));
        assert!(client.calls().is_empty());
    }
}
