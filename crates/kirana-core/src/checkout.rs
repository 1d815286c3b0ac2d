//! Pre-I/O checkout validation and order construction.
//!
//! Everything here is local and synchronous: an order draft either comes out
//! whole or the submission is refused with a message naming the missing
//! field, before any store write or external call is attempted.

use serde::Deserialize;
use thiserror::Error;

use crate::cart::Cart;
use crate::order::{GeoPoint, NewOrder};

/// Delivery details as entered by the shopper.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub mobile: String,
    /// House / flat number; optional.
    #[serde(default)]
    pub house: String,
    /// Area / landmark.
    #[serde(default)]
    pub area: String,
}

/// Checkout refusals, surfaced verbatim to the shopper.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("please enter your name")]
    MissingName,

    #[error("please enter your mobile number")]
    MissingMobile,

    #[error("delivery location is missing; capture your location before placing the order")]
    MissingLocation,

    #[error("cart is empty")]
    EmptyCart,
}

/// Composes the delivery address: `house + ", " + area` when a house number
/// was supplied, otherwise the area alone.
#[must_use]
pub fn compose_address(house: &str, area: &str) -> String {
    let house = house.trim();
    let area = area.trim();
    if house.is_empty() {
        area.to_string()
    } else {
        format!("{house}, {area}")
    }
}

/// Validates the form and builds the order draft from a cart snapshot.
///
/// The total is computed here from the submitted lines, so it always equals
/// the sum of line subtotals; line prices themselves are taken from the
/// cart as-is (client-authoritative, matching the deployed system).
///
/// # Errors
///
/// Returns a [`CheckoutError`] naming the first missing requirement: name,
/// mobile, location, or a non-empty cart.
pub fn build_order(
    form: &CheckoutForm,
    location: Option<GeoPoint>,
    payment_method: &str,
    cart: &Cart,
) -> Result<NewOrder, CheckoutError> {
    if form.name.trim().is_empty() {
        return Err(CheckoutError::MissingName);
    }
    if form.mobile.trim().is_empty() {
        return Err(CheckoutError::MissingMobile);
    }
    let location = location.ok_or(CheckoutError::MissingLocation)?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    Ok(NewOrder {
        customer_name: form.name.trim().to_string(),
        mobile: form.mobile.trim().to_string(),
        address: compose_address(&form.house, &form.area),
        location,
        items: cart.line_items(),
        total: cart.total(),
        payment_method: payment_method.to_string(),
    })
}
