use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::LineItem;
use crate::product::{Product, Unit};

/// One cart line: a snapshot of the product fields that matter for display
/// and ordering, plus a quantity. At most one line exists per product id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    pub pack_size: Option<String>,
    #[serde(default)]
    pub unit: Unit,
    pub image_url: String,
    pub qty: u32,
}

/// The shopper's in-memory cart. Entirely client-local: it is never
/// persisted and is cleared after a successful order submission.
///
/// The cart is an explicitly owned value; callers hold it and pass it to
/// checkout rather than sharing it through ambient state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cart from submitted lines, merging duplicate product ids
    /// by summing quantities and dropping zero-quantity lines.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            if line.qty == 0 {
                continue;
            }
            match cart.lines.iter_mut().find(|l| l.product_id == line.product_id) {
                Some(existing) => existing.qty = existing.qty.saturating_add(line.qty),
                None => cart.lines.push(line),
            }
        }
        cart
    }

    /// Adds one unit of `product`: increments the existing line or appends
    /// a new line with quantity 1.
    pub fn add(&mut self, product: &Product) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.qty = line.qty.saturating_add(1);
            return;
        }
        self.lines.push(CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            cost_price: product.cost_price,
            pack_size: product.pack_size.clone(),
            unit: product.unit,
            image_url: product.image_url.clone(),
            qty: 1,
        });
    }

    /// Removes one unit of the product with `product_id`; the line is
    /// dropped entirely when its quantity reaches zero. Unknown ids are a
    /// no-op.
    pub fn remove(&mut self, product_id: &str) {
        if let Some(pos) = self.lines.iter().position(|l| l.product_id == product_id) {
            if self.lines[pos].qty <= 1 {
                self.lines.remove(pos);
            } else {
                self.lines[pos].qty -= 1;
            }
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of `price × qty` over current lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(|l| l.price * Decimal::from(l.qty))
            .sum()
    }

    /// Sum of quantities over current lines, saturating at `u32::MAX`.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines
            .iter()
            .map(|l| l.qty)
            .fold(0, u32::saturating_add)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity currently in the cart for `product_id` (0 if absent).
    #[must_use]
    pub fn qty_of(&self, product_id: &str) -> u32 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map_or(0, |l| l.qty)
    }

    /// Snapshots the cart into order line items.
    #[must_use]
    pub fn line_items(&self) -> Vec<LineItem> {
        self.lines
            .iter()
            .map(|l| LineItem {
                name: l.name.clone(),
                qty: l.qty,
                price: l.price,
                cost_price: l.cost_price,
                pack_size: l.pack_size.clone(),
                unit: l.unit,
                image_url: l.image_url.clone(),
            })
            .collect()
    }
}
