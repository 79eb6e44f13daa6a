//! Order and checkout models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{amount, OrderId, ProductId};
use crate::error::Error;

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether no further status change is expected.
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidArgument(format!("unknown order status: {s}")))
    }
}

/// How an order is paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    Card,
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" => Ok(PaymentMethod::Cod),
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            other => Err(Error::InvalidArgument(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub full_name: String,
    pub order_status: OrderStatus,
    pub order_status_display: Option<String>,
    pub payment_method: PaymentMethod,
    pub payment_method_display: Option<String>,
    pub transaction_id: Option<String>,
    #[serde(deserialize_with = "amount::deserialize")]
    pub total_amount: f64,
    pub items: Vec<OrderItem>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Status label, preferring the service's display text.
    pub fn status_label(&self) -> &str {
        self.order_status_display
            .as_deref()
            .unwrap_or(self.order_status.as_str())
    }
}

/// One line of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderItem {
    pub product: Option<ProductId>,
    pub product_name: String,
    #[serde(deserialize_with = "amount::deserialize")]
    pub product_price: f64,
    pub quantity: u32,
    #[serde(deserialize_with = "amount::deserialize")]
    pub subtotal: f64,
}

/// Response to order creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderCreated {
    #[serde(default)]
    pub message: Option<String>,
    pub order: Order,
}

/// Card details; checked locally and never sent to the service.
#[derive(Clone, Default)]
pub struct CardDetails {
    pub card_number: String,
    pub card_name: String,
    pub expiry: String,
    pub cvv: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CardDetails { .. }")
    }
}

/// Delivery details and payment choice submitted at checkout.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub payment_method: PaymentMethod,
    /// Filled in when the order is placed; empty for cash on delivery.
    pub transaction_id: String,
    #[serde(skip)]
    pub card: CardDetails,
    #[serde(skip)]
    pub upi_id: String,
}

/// Admin status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub order_status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parse() {
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("lost".parse::<OrderStatus>().is_err());
        assert!(OrderStatus::Cancelled.is_final());
    }

    #[test]
    fn test_order_payload() {
        let order: Order = serde_json::from_value(json!({
            "id": 12,
            "order_number": "ORD-0012",
            "order_status": "processing",
            "payment_method": "upi",
            "total_amount": "499.00",
            "created_at": "2024-05-01T10:00:00Z",
            "items": [{"product_name": "Cap", "product_price": "499.00", "quantity": 1, "subtotal": "499.00"}]
        }))
        .unwrap();

        assert_eq!(order.order_status, OrderStatus::Processing);
        assert_eq!(order.payment_method, PaymentMethod::Upi);
        assert_eq!(order.status_label(), "processing");
        assert_eq!(order.items.len(), 1);
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_checkout_form_hides_payment_secrets() {
        let form = CheckoutForm {
            payment_method: PaymentMethod::Card,
            card: CardDetails {
                card_number: "4111".into(),
                ..Default::default()
            },
            upi_id: "me@upi".into(),
            ..Default::default()
        };

        let body = serde_json::to_value(&form).unwrap();
        assert_eq!(body["payment_method"], "card");
        assert!(body.get("card").is_none());
        assert!(body.get("upi_id").is_none());
    }
}
