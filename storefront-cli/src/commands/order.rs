//! Order and checkout commands.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;
use storefront::models::CardDetails;
use storefront::{CheckoutForm, OrderId, PaymentMethod, Route};

use crate::handlers::order as handlers;
use crate::output::{print_item, print_navigation, print_table, OutputFormat};
use crate::shell::Shell;

#[derive(Subcommand)]
pub enum OrderAction {
    /// List your orders
    #[command(alias = "ls")]
    List,

    /// Show an order
    Show {
        /// Order ID
        id: OrderId,
    },

    /// Place an order for the current cart
    Checkout(CheckoutArgs),

    /// Cancel an order
    Cancel {
        /// Order ID
        id: OrderId,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Payment {
    /// Cash on delivery
    Cod,
    Card,
    Upi,
}

impl From<Payment> for PaymentMethod {
    fn from(p: Payment) -> Self {
        match p {
            Payment::Cod => PaymentMethod::Cod,
            Payment::Card => PaymentMethod::Card,
            Payment::Upi => PaymentMethod::Upi,
        }
    }
}

#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    pincode: String,
    #[arg(long, value_enum, default_value = "cod")]
    payment: Payment,
    #[arg(long, default_value = "")]
    card_number: String,
    #[arg(long, default_value = "")]
    card_name: String,
    /// MM/YY
    #[arg(long, default_value = "")]
    expiry: String,
    #[arg(long, default_value = "", hide_env_values = true, env = "STOREFRONT_CARD_CVV")]
    cvv: String,
    #[arg(long, default_value = "")]
    upi_id: String,
}

impl From<CheckoutArgs> for CheckoutForm {
    fn from(args: CheckoutArgs) -> Self {
        CheckoutForm {
            full_name: args.full_name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            city: args.city,
            state: args.state,
            pincode: args.pincode,
            payment_method: args.payment.into(),
            card: CardDetails {
                card_number: args.card_number,
                card_name: args.card_name,
                expiry: args.expiry,
                cvv: args.cvv,
            },
            upi_id: args.upi_id,
            ..Default::default()
        }
    }
}

pub async fn handle(action: OrderAction, shell: &mut Shell, format: OutputFormat) -> Result<()> {
    match action {
        OrderAction::List => {
            let outcome = shell
                .visit(Route::Orders, |client| async move { handlers::list(&client).await })
                .await?;
            if let Some(orders) = outcome.done() {
                print_table(orders, format);
            }
        }
        OrderAction::Show { id } => {
            let outcome = shell
                .visit(Route::Orders, |client| async move {
                    handlers::show(&client, id).await
                })
                .await?;
            if let Some(order) = outcome.done() {
                print_item(order, format);
            }
        }
        OrderAction::Checkout(args) => {
            let form = CheckoutForm::from(args);
            let outcome = shell
                .visit(Route::Checkout, |client| async move {
                    handlers::checkout(&client, &form).await
                })
                .await?;
            if let Some(order) = outcome.done() {
                println!("{}", "Order placed successfully!".green().bold());
                print_item(order, format);
                print_navigation(Route::OrderSuccess);
            }
        }
        OrderAction::Cancel { id } => {
            let outcome = shell
                .visit(Route::Orders, |client| async move {
                    handlers::cancel(&client, id).await
                })
                .await?;
            if outcome.done().is_some() {
                println!("{}", "Order cancelled".green());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: CheckoutArgs,
    }

    #[test]
    fn test_checkout_args_to_form() {
        let wrapper = Wrapper::parse_from([
            "checkout",
            "--full-name",
            "Alice Doe",
            "--email",
            "alice@example.com",
            "--phone",
            "5550100",
            "--address",
            "1 Main St",
            "--city",
            "Pune",
            "--state",
            "MH",
            "--pincode",
            "411001",
            "--payment",
            "upi",
            "--upi-id",
            "alice@upi",
        ]);

        let form = CheckoutForm::from(wrapper.args);
        assert_eq!(form.payment_method, PaymentMethod::Upi);
        assert_eq!(form.upi_id, "alice@upi");
        assert!(form.transaction_id.is_empty());
        assert!(storefront::validation::checkout(&form).is_ok());
    }
}
