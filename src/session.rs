// Per-visitor booking session: cart plus display preferences
//
// Built when a visitor arrives and dropped when they leave; nothing here is
// shared between sessions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cart::{Cart, CartLineItem, RemovalPolicy};
use crate::submission::{BookingSubmission, CustomerContact};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum Language {
    #[default]
    En,
    Es,
}

/// Currency used to render amounts. Prices are always authored in MXN;
/// `Usd` carries the MXN→USD rate used for display only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub enum Currency {
    #[default]
    Mxn,
    Usd { rate: f64 },
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Mxn => "MXN",
            Currency::Usd { .. } => "USD",
        }
    }

    pub fn convert(&self, home_amount: f64) -> f64 {
        match self {
            Currency::Mxn => home_amount,
            Currency::Usd { rate } => home_amount * rate,
        }
    }

    /// Formats an MXN amount in this currency, e.g. `$1,140 MXN` or `$57.00 USD`.
    pub fn format(&self, home_amount: f64) -> String {
        let amount = self.convert(home_amount);
        match self {
            Currency::Mxn => format!("${} MXN", group_thousands(amount.round() as i64)),
            Currency::Usd { .. } => {
                let cents = (amount * 100.0).round() as i64;
                format!(
                    "${}.{:02} USD",
                    group_thousands(cents / 100),
                    (cents % 100).abs()
                )
            }
        }
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionPreferences {
    pub currency: Currency,
    pub language: Language,
    pub removal_policy: RemovalPolicy,
}

#[derive(Debug)]
pub struct BookingSession {
    cart: Cart,
    currency: Currency,
    language: Language,
}

impl BookingSession {
    pub fn new(preferences: SessionPreferences) -> Self {
        Self {
            cart: Cart::new(preferences.removal_policy),
            currency: preferences.currency,
            language: preferences.language,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn set_currency(&mut self, currency: Currency) {
        self.currency = currency;
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn display_amount(&self, home_amount: f64) -> String {
        self.currency.format(home_amount)
    }

    /// Turns the cart into a submission and empties it.
    /// Returns `None` when there is nothing to book.
    pub fn checkout(&mut self, contact: CustomerContact) -> Option<BookingSubmission> {
        if self.cart.is_empty() {
            return None;
        }

        let items = self.cart.drain();
        let submission = BookingSubmission::new(contact, items, self.language);
        debug!(reference = %submission.reference, "Checked out cart");
        Some(submission)
    }

    /// Ends the session, returning whatever was still in the cart.
    pub fn close(self) -> Vec<CartLineItem> {
        let mut cart = self.cart;
        cart.drain()
    }
}
