//! Account commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use storefront::models::ProfileUpdate;
use storefront::{Registration, Route};

use crate::handlers::account as handlers;
use crate::output::{print_item, print_navigation, OutputFormat};
use crate::shell::{Reported, Shell};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in
    Login {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Password
        #[arg(short, long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
        /// Password confirmation
        #[arg(long)]
        confirm: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },

    /// Sign out
    Logout,

    /// Show the stored session
    Status,

    /// Fetch the profile from the service
    Profile,

    /// Edit profile fields
    Update {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },

    /// Change the account password
    Passwd {
        /// Current password
        #[arg(long)]
        old: String,
        /// New password
        #[arg(long)]
        new: String,
    },
}

pub async fn handle(action: AuthAction, shell: &mut Shell, format: OutputFormat) -> Result<()> {
    match action {
        AuthAction::Login { username, password } => {
            // The notifier already told the user what went wrong.
            let user = handlers::login(shell.client(), &username, &password)
                .await
                .map_err(reported)?;
            if let Some(user) = user {
                print_item(user, format);
            }
            print_navigation(Route::Home);
            Ok(())
        }
        AuthAction::Register {
            username,
            email,
            password,
            confirm,
            first_name,
            last_name,
        } => {
            let form = Registration {
                username,
                email,
                password,
                confirm_password: confirm,
                first_name,
                last_name,
            };
            let user = handlers::register(shell.client(), &form)
                .await
                .map_err(reported)?;
            if let Some(user) = user {
                print_item(user, format);
            }
            print_navigation(Route::Home);
            Ok(())
        }
        AuthAction::Logout => {
            handlers::logout(shell.client()).await;
            print_navigation(Route::Login);
            Ok(())
        }
        AuthAction::Status => {
            match handlers::status(shell.client()) {
                Some(user) => print_item(user, format),
                None => println!("{}", "Not logged in".dimmed()),
            }
            Ok(())
        }
        AuthAction::Profile => {
            let outcome = shell
                .visit(Route::Home, |client| async move {
                    handlers::profile(&client).await
                })
                .await?;
            if let Some(user) = outcome.done() {
                print_item(user, format);
            }
            Ok(())
        }
        AuthAction::Update {
            email,
            first_name,
            last_name,
            phone,
            address,
        } => {
            let update = ProfileUpdate {
                email,
                first_name,
                last_name,
                phone,
                address,
            };
            let outcome = shell
                .visit(Route::Home, |client| async move {
                    handlers::update_profile(&client, &update).await
                })
                .await?;
            if let Some(user) = outcome.done() {
                println!("{}", "Profile updated".green());
                print_item(user, format);
            }
            Ok(())
        }
        AuthAction::Passwd { old, new } => {
            let outcome = shell
                .visit(Route::Home, |client| async move {
                    handlers::change_password(&client, &old, &new).await
                })
                .await?;
            if outcome.done().is_some() {
                println!("{}", "Password changed".green());
            }
            Ok(())
        }
    }
}

fn reported(error: anyhow::Error) -> Reported {
    tracing::debug!("{error:#}");
    Reported
}
