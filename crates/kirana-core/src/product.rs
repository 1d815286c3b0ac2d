use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Measurement unit a product is sold in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kg,
    #[serde(rename = "g")]
    G,
    #[serde(rename = "L")]
    L,
    #[serde(rename = "ml")]
    Ml,
    #[serde(rename = "pkt")]
    Pkt,
    #[default]
    #[serde(rename = "pcs")]
    Pcs,
}

impl Unit {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::L => "L",
            Unit::Ml => "ml",
            Unit::Pkt => "pkt",
            Unit::Pcs => "pcs",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Unit {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kg" => Ok(Unit::Kg),
            "g" => Ok(Unit::G),
            "l" => Ok(Unit::L),
            "ml" => Ok(Unit::Ml),
            "pkt" => Ok(Unit::Pkt),
            "pcs" => Ok(Unit::Pcs),
            other => Err(ProductError::UnknownUnit(other.to_string())),
        }
    }
}

/// Validation failures for product writes. Surfaced directly to the admin
/// before anything reaches the store.
#[derive(Debug, Error)]
pub enum ProductError {
    #[error("product name is required")]
    MissingName,

    #[error("product price must be greater than zero")]
    InvalidPrice,

    #[error("product category is required")]
    MissingCategory,

    #[error("image link must start with http:// or https://: \"{0}\"")]
    InvalidImageLink(String),

    #[error(
        "\"{0}\" is a search-results page, not a direct image link; \
         copy the image address instead"
    )]
    IndirectImageLink(String),

    #[error("unknown unit \"{0}\" (expected kg, g, L, ml, pkt or pcs)")]
    UnknownUnit(String),
}

/// A product as submitted by the admin console, before the store assigns
/// the derived key and creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    /// Purchase cost. `None` means unknown; consumers fall back to 80% of
    /// the selling price.
    pub cost_price: Option<Decimal>,
    /// Free-text category (e.g. "Atta", "Soaps").
    pub category: String,
    /// Display pack size, e.g. `"1 kg"` or `"500"`.
    pub pack_size: Option<String>,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub stock: i32,
    pub image_url: String,
}

impl NewProduct {
    /// The derived store key for this product. Saving two products with the
    /// same name overwrites rather than duplicates.
    #[must_use]
    pub fn id(&self) -> String {
        derive_product_id(&self.name)
    }

    /// Checks required fields and the image link before any write is
    /// attempted.
    ///
    /// # Errors
    ///
    /// Returns the first applicable [`ProductError`]: missing name, price
    /// not above zero, missing category, or a malformed/indirect image link.
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::MissingName);
        }
        if self.price <= Decimal::ZERO {
            return Err(ProductError::InvalidPrice);
        }
        if self.category.trim().is_empty() {
            return Err(ProductError::MissingCategory);
        }
        validate_image_url(&self.image_url)
    }
}

/// A stored product, as read back from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Derived key: slug of the name.
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    pub category: String,
    pub pack_size: Option<String>,
    pub unit: Unit,
    pub stock: i32,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Cost price, falling back to 80% of the selling price when unset.
    #[must_use]
    pub fn effective_cost(&self) -> Decimal {
        self.cost_price
            .unwrap_or_else(|| self.price * Decimal::new(8, 1))
    }
}

/// Derives the stable store key from a product name: lower-cased, runs of
/// non-alphanumeric characters collapsed to a single hyphen, no leading or
/// trailing hyphens. `"Tata Salt"` becomes `"tata-salt"`.
#[must_use]
pub fn derive_product_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !id.is_empty() {
                id.push('-');
            }
            pending_hyphen = false;
            id.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    id
}

/// URL fragments that identify a search-results page rather than a direct
/// image file. Admins habitually paste these from an image search.
const INDIRECT_LINK_MARKERS: [&str; 4] = [
    "google.com/search",
    "google.com/imgres",
    "images.app.goo.gl",
    "bing.com/images/search",
];

/// Rejects image references that are not plausible direct links.
///
/// # Errors
///
/// - [`ProductError::InvalidImageLink`] when the value is not an
///   `http(s)://` URL.
/// - [`ProductError::IndirectImageLink`] when the URL matches a known
///   search-results pattern.
pub fn validate_image_url(url: &str) -> Result<(), ProductError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ProductError::InvalidImageLink(url.to_string()));
    }
    if INDIRECT_LINK_MARKERS.iter().any(|m| url.contains(m)) {
        return Err(ProductError::IndirectImageLink(url.to_string()));
    }
    Ok(())
}

/// The category list shown to shoppers: the implicit "All" wildcard followed
/// by each distinct non-empty category in first-seen order.
#[must_use]
pub fn product_categories(products: &[Product]) -> Vec<String> {
    let mut categories = vec!["All".to_string()];
    for p in products {
        let c = p.category.trim();
        if !c.is_empty() && !categories.iter().any(|known| known == c) {
            categories.push(c.to_string());
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, category: &str) -> Product {
        Product {
            id: derive_product_id(name),
            name: name.to_string(),
            price: Decimal::new(100, 0),
            cost_price: None,
            category: category.to_string(),
            pack_size: None,
            unit: Unit::Pcs,
            stock: 5,
            image_url: "https://cdn.example.com/p.jpg".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn derive_product_id_slugifies() {
        assert_eq!(derive_product_id("Tata Salt"), "tata-salt");
        assert_eq!(derive_product_id("  Aashirvaad Atta (5kg) "), "aashirvaad-atta-5kg");
        assert_eq!(derive_product_id("Maggi 2-Minute Noodles"), "maggi-2-minute-noodles");
        assert_eq!(derive_product_id("!!!"), "");
    }

    #[test]
    fn same_name_derives_same_id() {
        let a = NewProduct {
            name: "Tata Salt".to_string(),
            price: Decimal::new(25, 0),
            cost_price: None,
            category: "Grocery".to_string(),
            pack_size: Some("1 kg".to_string()),
            unit: Unit::Pkt,
            stock: 10,
            image_url: "https://cdn.example.com/salt.jpg".to_string(),
        };
        let mut b = a.clone();
        b.price = Decimal::new(28, 0);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut p = NewProduct {
            name: String::new(),
            price: Decimal::new(25, 0),
            cost_price: None,
            category: "Grocery".to_string(),
            pack_size: None,
            unit: Unit::Pcs,
            stock: 0,
            image_url: "https://cdn.example.com/x.jpg".to_string(),
        };
        assert!(matches!(p.validate(), Err(ProductError::MissingName)));

        p.name = "Salt".to_string();
        p.price = Decimal::ZERO;
        assert!(matches!(p.validate(), Err(ProductError::InvalidPrice)));

        p.price = Decimal::new(25, 0);
        p.category = "  ".to_string();
        assert!(matches!(p.validate(), Err(ProductError::MissingCategory)));
    }

    #[test]
    fn validate_image_url_rejects_search_pages() {
        let err = validate_image_url("https://www.google.com/search?q=salt&tbm=isch");
        assert!(matches!(err, Err(ProductError::IndirectImageLink(_))));

        let err = validate_image_url("https://images.app.goo.gl/abc123");
        assert!(matches!(err, Err(ProductError::IndirectImageLink(_))));

        assert!(validate_image_url("https://cdn.example.com/salt.jpg").is_ok());
    }

    #[test]
    fn validate_image_url_rejects_non_http() {
        let err = validate_image_url("ftp://example.com/x.jpg");
        assert!(matches!(err, Err(ProductError::InvalidImageLink(_))));
    }

    #[test]
    fn effective_cost_falls_back_to_80_percent() {
        let mut p = sample("Salt", "Grocery");
        assert_eq!(p.effective_cost(), Decimal::new(80, 0));
        p.cost_price = Some(Decimal::new(72, 0));
        assert_eq!(p.effective_cost(), Decimal::new(72, 0));
    }

    #[test]
    fn categories_are_distinct_with_all_prefix() {
        let products = vec![
            sample("Salt", "Grocery"),
            sample("Soap", "Soaps"),
            sample("Sugar", "Grocery"),
            sample("Mystery", "  "),
        ];
        assert_eq!(product_categories(&products), vec!["All", "Grocery", "Soaps"]);
    }

    #[test]
    fn unit_round_trips_through_strings() {
        for unit in [Unit::Kg, Unit::G, Unit::L, Unit::Ml, Unit::Pkt, Unit::Pcs] {
            assert_eq!(unit.as_str().parse::<Unit>().unwrap(), unit);
        }
        assert!("dozen".parse::<Unit>().is_err());
    }
}
