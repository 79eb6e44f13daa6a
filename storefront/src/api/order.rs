//! Order API.

use std::sync::Arc;

use reqwest::Method;

use crate::{
    client::ClientInner,
    error::Result,
    models::{CheckoutForm, Order, OrderCreated, OrderId, OrderStatus, StatusUpdate},
    validation,
};

/// API for orders.
pub struct OrderApi {
    client: Arc<ClientInner>,
}

impl OrderApi {
    pub(crate) fn new(client: Arc<ClientInner>) -> Self {
        Self { client }
    }

    /// The user's orders.
    pub async fn list(&self) -> Result<Vec<Order>> {
        self.client.get("orders/").await
    }

    /// Order details.
    pub async fn get(&self, id: impl Into<OrderId>) -> Result<Order> {
        let id = id.into();
        self.client.get(&format!("orders/{id}/")).await
    }

    /// Place an order from the current cart.
    ///
    /// The form is validated locally first. Prepaid orders get a client-side
    /// transaction reference when none is set.
    pub async fn create(&self, form: &CheckoutForm) -> Result<Order> {
        validation::checkout(form)?;

        let mut form = form.clone();
        if form.transaction_id.is_empty() {
            form.transaction_id = validation::transaction_id(form.payment_method);
        }

        let request = self
            .client
            .request(Method::POST, "orders/create/")?
            .json(&form)?;
        let created: OrderCreated = self.client.call(request).await?;
        self.client.session.set_cart_count(0);
        Ok(created.order)
    }

    /// Cancel an order.
    pub async fn cancel(&self, id: impl Into<OrderId>) -> Result<()> {
        let id = id.into();
        let request = self
            .client
            .request(Method::PUT, &format!("orders/{id}/cancel/"))?;
        self.client.call_unit(request).await
    }

    /// Every order (admin).
    pub async fn admin_all(&self) -> Result<Vec<Order>> {
        self.client.get("orders/admin/all/").await
    }

    /// Set an order's status (admin).
    pub async fn update_status(&self, id: impl Into<OrderId>, status: OrderStatus) -> Result<()> {
        let id = id.into();
        let request = self
            .client
            .request(Method::PUT, &format!("orders/admin/{id}/update/"))?
            .json(&StatusUpdate {
                order_status: status,
            })?;
        self.client.call_unit(request).await
    }
}
