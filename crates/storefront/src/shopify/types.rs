//! Domain types for the Shopify Storefront API cart.
//!
//! These deserialize straight from Storefront API JSON (camelCase, with
//! connections flattened to `Vec`s) and serialize as mutation inputs.

use serde::{Deserialize, Deserializer, Serialize};

use optica_core::Price;

// =============================================================================
// Money and Images
// =============================================================================

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Display string such as "$129.00".
    ///
    /// Falls back to the raw amount if Shopify sent something unparseable.
    #[must_use]
    pub fn display(&self) -> String {
        Price::parse(&self.amount, &self.currency_code).map_or_else(
            |_| format!("{} {}", self.amount, self.currency_code),
            |price| price.display(),
        )
    }
}

/// Variant image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Custom attribute (key-value pair).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: Option<String>,
}

/// Input for custom attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeInput {
    pub key: String,
    pub value: String,
}

/// Merchandise in a cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMerchandise {
    /// Variant ID.
    pub id: String,
    /// Variant title ("Default Title" for single-variant products).
    pub title: String,
    /// Variant image.
    pub image: Option<Image>,
    /// Parent product info.
    pub product: CartMerchandiseProduct,
}

/// Parent product of a cart line's variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMerchandiseProduct {
    pub handle: String,
    pub title: String,
}

/// Cost for a cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineCost {
    /// Price per unit.
    pub amount_per_quantity: Money,
    /// Total (after discounts).
    pub total_amount: Money,
}

/// Subscription plan a line was bought under.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellingPlanAllocation {
    pub selling_plan: SellingPlanRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellingPlanRef {
    pub id: String,
}

/// A line item in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Cart line ID.
    pub id: String,
    pub quantity: i64,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    pub cost: CartLineCost,
    pub merchandise: CartMerchandise,
    /// Present for subscription lines (e.g. monthly contact lens deliveries).
    pub selling_plan_allocation: Option<SellingPlanAllocation>,
}

impl CartLine {
    /// Input that adds this same line to another cart.
    #[must_use]
    pub fn to_input(&self) -> CartLineInput {
        let attributes: Vec<AttributeInput> = self
            .attributes
            .iter()
            .filter_map(|a| {
                a.value.as_ref().map(|value| AttributeInput {
                    key: a.key.clone(),
                    value: value.clone(),
                })
            })
            .collect();

        CartLineInput {
            merchandise_id: self.merchandise.id.clone(),
            quantity: self.quantity,
            attributes: (!attributes.is_empty()).then_some(attributes),
            selling_plan_id: self
                .selling_plan_allocation
                .as_ref()
                .map(|a| a.selling_plan.id.clone()),
        }
    }
}

/// Cart cost summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartCost {
    /// Subtotal before tax/shipping.
    #[serde(rename = "subtotalAmount")]
    pub subtotal: Money,
    /// Total amount.
    #[serde(rename = "totalAmount")]
    pub total: Money,
}

/// A shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart ID.
    pub id: String,
    /// Checkout URL.
    pub checkout_url: String,
    /// Total item quantity.
    pub total_quantity: i64,
    /// Cart cost summary.
    pub cost: CartCost,
    /// Cart lines.
    #[serde(deserialize_with = "deserialize_nodes")]
    pub lines: Vec<CartLine>,
}

/// Input for adding a line to cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: String,
    /// Quantity to add.
    pub quantity: i64,
    /// Custom attributes (prescription details, lens power, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeInput>>,
    /// Selling plan ID (for subscriptions).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selling_plan_id: Option<String>,
}

/// Input for updating a cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineUpdateInput {
    /// Cart line ID.
    pub id: String,
    /// New quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

/// User error from cart mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartUserError {
    /// Error code.
    pub code: Option<String>,
    /// Field path that caused the error.
    pub field: Option<Vec<String>>,
    /// Human-readable error message.
    pub message: String,
}

/// Flatten a GraphQL connection (`{ "nodes": [...] }`) into its nodes.
fn deserialize_nodes<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    struct Connection<T> {
        nodes: Vec<T>,
    }

    Connection::<T>::deserialize(deserializer).map(|c| c.nodes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CART_JSON: &str = r#"{
        "id": "gid://shopify/Cart/c1",
        "checkoutUrl": "https://optica.example/checkouts/c1",
        "totalQuantity": 3,
        "cost": {
            "subtotalAmount": { "amount": "188.0", "currencyCode": "USD" },
            "totalAmount": { "amount": "188.0", "currencyCode": "USD" }
        },
        "lines": { "nodes": [
            {
                "id": "gid://shopify/CartLine/1",
                "quantity": 1,
                "attributes": [{ "key": "Lens", "value": "Blue light" }, { "key": "Empty", "value": null }],
                "cost": {
                    "amountPerQuantity": { "amount": "129.0", "currencyCode": "USD" },
                    "totalAmount": { "amount": "129.0", "currencyCode": "USD" }
                },
                "merchandise": {
                    "id": "gid://shopify/ProductVariant/11",
                    "title": "Tortoise",
                    "image": { "url": "https://cdn.shopify.com/t.jpg", "altText": null },
                    "product": { "handle": "round-frame", "title": "Round Frame" }
                },
                "sellingPlanAllocation": null
            },
            {
                "id": "gid://shopify/CartLine/2",
                "quantity": 2,
                "cost": {
                    "amountPerQuantity": { "amount": "29.5", "currencyCode": "USD" },
                    "totalAmount": { "amount": "59.0", "currencyCode": "USD" }
                },
                "merchandise": {
                    "id": "gid://shopify/ProductVariant/22",
                    "title": "Default Title",
                    "image": null,
                    "product": { "handle": "daily-lenses", "title": "Daily Lenses" }
                },
                "sellingPlanAllocation": { "sellingPlan": { "id": "gid://shopify/SellingPlan/5" } }
            }
        ]}
    }"#;

    #[test]
    fn test_cart_deserializes_connection() {
        let cart: Cart = serde_json::from_str(CART_JSON).unwrap();
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.total_quantity, 3);
        assert_eq!(cart.cost.subtotal.display(), "$188.00");
    }

    #[test]
    fn test_line_to_input_keeps_attributes_and_plan() {
        let cart: Cart = serde_json::from_str(CART_JSON).unwrap();

        let first = cart.lines.first().unwrap().to_input();
        assert_eq!(first.merchandise_id, "gid://shopify/ProductVariant/11");
        assert_eq!(
            first.attributes,
            Some(vec![AttributeInput {
                key: "Lens".to_string(),
                value: "Blue light".to_string(),
            }])
        );
        assert_eq!(first.selling_plan_id, None);

        let second = cart.lines.get(1).unwrap().to_input();
        assert_eq!(second.quantity, 2);
        assert_eq!(second.attributes, None);
        assert_eq!(
            second.selling_plan_id.as_deref(),
            Some("gid://shopify/SellingPlan/5")
        );
    }

    #[test]
    fn test_line_input_serializes_camel_case() {
        let input = CartLineInput {
            merchandise_id: "gid://shopify/ProductVariant/1".to_string(),
            quantity: 1,
            attributes: None,
            selling_plan_id: None,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["merchandiseId"], "gid://shopify/ProductVariant/1");
        assert!(value.get("sellingPlanId").is_none());
    }

    #[test]
    fn test_money_display_fallback() {
        let money = Money {
            amount: "n/a".to_string(),
            currency_code: "USD".to_string(),
        };
        assert_eq!(money.display(), "n/a USD");
    }
}
