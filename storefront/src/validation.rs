//! Checks that run before a request is issued.

use rand::Rng;

use crate::error::{Error, Result};
use crate::models::{CheckoutForm, NewReview, PaymentMethod, Registration};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Sign-up form: required fields present and passwords match.
pub fn registration(form: &Registration) -> Result<()> {
    if blank(&form.username) || blank(&form.email) || form.password.is_empty() {
        return Err(Error::validation("Please fill all required fields"));
    }
    if form.password != form.confirm_password {
        return Err(Error::validation("Passwords do not match"));
    }
    Ok(())
}

/// Checkout form: delivery details, then the fields the payment method needs.
pub fn checkout(form: &CheckoutForm) -> Result<()> {
    let delivery = [
        &form.full_name,
        &form.email,
        &form.phone,
        &form.address,
        &form.city,
        &form.state,
        &form.pincode,
    ];
    if delivery.iter().any(|f| blank(f)) {
        return Err(Error::validation("Please fill all delivery details"));
    }

    match form.payment_method {
        PaymentMethod::Card => {
            let card = &form.card;
            let fields = [&card.card_number, &card.card_name, &card.expiry, &card.cvv];
            if fields.iter().any(|f| blank(f)) {
                return Err(Error::validation("Please fill all card details"));
            }
        }
        PaymentMethod::Upi if blank(&form.upi_id) => {
            return Err(Error::validation("Please enter UPI ID"));
        }
        PaymentMethod::Upi | PaymentMethod::Cod => {}
    }
    Ok(())
}

/// Review: rating between one and five stars.
pub fn review(review: &NewReview) -> Result<()> {
    if !(1..=5).contains(&review.rating) {
        return Err(Error::validation("Rating must be between 1 and 5"));
    }
    Ok(())
}

/// Cart quantity: at least one.
pub fn quantity(quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(Error::validation("Quantity must be at least 1"));
    }
    Ok(())
}

/// Client-side transaction reference for prepaid orders; empty for cash on delivery.
pub fn transaction_id(method: PaymentMethod) -> String {
    if method == PaymentMethod::Cod {
        return String::new();
    }

    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("TXN{}{}", chrono::Utc::now().timestamp_millis(), suffix).to_uppercase()
}
