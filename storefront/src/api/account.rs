//! Account endpoints. Session-changing calls are wrapped by the session store.

use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};

use crate::{
    client::ClientInner,
    error::{Error, Result},
    models::{AuthPayload, Credentials, PasswordChange, ProfileUpdate, Registration, User},
};

/// Raw account endpoints.
pub(crate) struct AccountApi {
    client: Arc<ClientInner>,
}

impl AccountApi {
    pub(crate) fn new(client: Arc<ClientInner>) -> Self {
        Self { client }
    }

    pub async fn register(&self, registration: &Registration) -> Result<AuthPayload> {
        let request = self
            .client
            .request(Method::POST, "accounts/register/")?
            .json(registration)?;
        self.client.call(request).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthPayload> {
        let request = self
            .client
            .request(Method::POST, "accounts/login/")?
            .json(credentials)?;
        self.client.call(request).await
    }

    /// Ask the service to invalidate a refresh token.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let request = self
            .client
            .request(Method::POST, "accounts/logout/")?
            .json(&json!({ "refresh_token": refresh_token }))?;
        self.client.call_unit(request).await
    }

    pub async fn profile(&self) -> Result<User> {
        let value: Value = self.client.get("accounts/profile/").await?;
        user_from(value)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let request = self
            .client
            .request(Method::PUT, "accounts/profile/update/")?
            .json(update)?;
        let value: Value = self.client.call(request).await?;
        user_from(value)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<()> {
        let request = self
            .client
            .request(Method::POST, "accounts/change-password/")?
            .json(change)?;
        self.client.call_unit(request).await
    }
}

/// Profile endpoints answer either with the user or with `{ "user": ... }`.
fn user_from(mut value: Value) -> Result<User> {
    let user = if value.get("user").is_some_and(Value::is_object) {
        value["user"].take()
    } else {
        value
    };
    if user.get("id").is_none() {
        return Err(Error::missing("user.id"));
    }
    serde_json::from_value(user).map_err(Error::Json)
}
