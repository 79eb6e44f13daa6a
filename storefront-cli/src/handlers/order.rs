//! Order handlers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use storefront::models::OrderItem;
use storefront::{CheckoutForm, Order, OrderId, OrderStatus, StorefrontClient};

use crate::output::{format_price, format_time, PlainPrint, TableRow};

/// Order summary.
#[derive(Debug, Clone, Serialize)]
pub struct OrderInfo {
    pub id: i64,
    pub number: String,
    pub customer: String,
    pub status: String,
    pub closed: bool,
    pub payment: String,
    pub total: f64,
    pub date: String,
    pub items: Vec<OrderLine>,
}

impl From<&Order> for OrderInfo {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id.get(),
            number: o.order_number.clone(),
            customer: o.full_name.clone(),
            status: o.status_label().to_string(),
            closed: o.order_status.is_final(),
            payment: o
                .payment_method_display
                .clone()
                .unwrap_or_else(|| o.payment_method.as_str().to_uppercase()),
            total: o.total_amount,
            date: format_time(o.created_at),
            items: o.items.iter().map(OrderLine::from).collect(),
        }
    }
}

impl TableRow for OrderInfo {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Number", "Status", "Payment", "Total", "Date"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.number.clone(),
            self.status.clone(),
            self.payment.clone(),
            format_price(self.total),
            self.date.clone(),
        ]
    }
}

impl PlainPrint for OrderInfo {
    fn plain_print(&self) {
        println!(
            "[{}] {} {} {}",
            self.id.to_string().cyan(),
            self.number.bold(),
            if self.closed {
                self.status.dimmed()
            } else {
                self.status.yellow()
            },
            format_price(self.total).green()
        );
        println!("   {} | {}", self.payment, self.date.dimmed());
        for line in &self.items {
            println!(
                "   - {} x{} {}",
                line.name,
                line.quantity,
                format_price(line.subtotal).dimmed()
            );
        }
    }
}

/// One order line.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub subtotal: f64,
}

impl From<&OrderItem> for OrderLine {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.product_name.clone(),
            price: item.product_price,
            quantity: item.quantity,
            subtotal: item.subtotal,
        }
    }
}

pub async fn list(client: &StorefrontClient) -> Result<Vec<OrderInfo>> {
    let orders = client.orders().list().await?;
    Ok(orders.iter().map(OrderInfo::from).collect())
}

pub async fn show(client: &StorefrontClient, id: OrderId) -> Result<OrderInfo> {
    let order = client.orders().get(id).await?;
    Ok(OrderInfo::from(&order))
}

/// Place an order; the cart counts as empty afterwards.
pub async fn checkout(client: &StorefrontClient, form: &CheckoutForm) -> Result<OrderInfo> {
    let order = client.orders().create(form).await?;
    Ok(OrderInfo::from(&order))
}

pub async fn cancel(client: &StorefrontClient, id: OrderId) -> Result<()> {
    client.orders().cancel(id).await?;
    Ok(())
}

pub async fn admin_all(client: &StorefrontClient) -> Result<Vec<OrderInfo>> {
    let orders = client.orders().admin_all().await?;
    Ok(orders.iter().map(OrderInfo::from).collect())
}

pub async fn update_status(
    client: &StorefrontClient,
    id: OrderId,
    status: OrderStatus,
) -> Result<()> {
    client.orders().update_status(id, status).await?;
    Ok(())
}
