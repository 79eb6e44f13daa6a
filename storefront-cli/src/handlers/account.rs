//! Account handlers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use storefront::models::{PasswordChange, ProfileUpdate};
use storefront::{Credentials, Registration, Session, StorefrontClient, User};

use crate::output::{PlainPrint, TableRow};

/// Signed-in user.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub admin: bool,
}

impl From<&User> for UserInfo {
    fn from(u: &User) -> Self {
        let name = [u.field("first_name"), u.field("last_name")]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            id: u.id.get(),
            username: u.username.clone(),
            name,
            email: u.email.clone(),
            admin: u.is_admin,
        }
    }
}

impl TableRow for UserInfo {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Username", "Name", "Email", "Role"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.username.clone(),
            self.name.clone(),
            self.email.clone(),
            role(self.admin).to_string(),
        ]
    }
}

impl PlainPrint for UserInfo {
    fn plain_print(&self) {
        println!(
            "[{}] {} {}",
            self.id.to_string().cyan(),
            self.username.bold(),
            format!("({})", role(self.admin)).dimmed()
        );
        if !self.name.is_empty() {
            println!("   {}", self.name);
        }
        if !self.email.is_empty() {
            println!("   {}", self.email.dimmed());
        }
    }
}

fn role(admin: bool) -> &'static str {
    if admin {
        "admin"
    } else {
        "customer"
    }
}

fn signed_in(session: &Session) -> Option<UserInfo> {
    session.user().map(UserInfo::from)
}

pub async fn login(client: &StorefrontClient, username: &str, password: &str) -> Result<Option<UserInfo>> {
    let session = client
        .session()
        .login(&Credentials::new(username, password))
        .await?;
    Ok(signed_in(&session))
}

pub async fn register(client: &StorefrontClient, form: &Registration) -> Result<Option<UserInfo>> {
    let session = client.session().register(form).await?;
    Ok(signed_in(&session))
}

pub async fn logout(client: &StorefrontClient) {
    client.session().logout().await;
}

/// The stored user, without contacting the service.
pub fn status(client: &StorefrontClient) -> Option<UserInfo> {
    signed_in(&client.session().get_session())
}

/// The profile as the service currently has it.
pub async fn profile(client: &StorefrontClient) -> Result<UserInfo> {
    let user = client.session().refresh_profile().await?;
    Ok(UserInfo::from(&user))
}

pub async fn update_profile(client: &StorefrontClient, update: &ProfileUpdate) -> Result<UserInfo> {
    let user = client.session().update_profile(update).await?;
    Ok(UserInfo::from(&user))
}

pub async fn change_password(client: &StorefrontClient, old: &str, new: &str) -> Result<()> {
    client
        .session()
        .change_password(&PasswordChange {
            old_password: old.to_owned(),
            new_password: new.to_owned(),
        })
        .await?;
    Ok(())
}
