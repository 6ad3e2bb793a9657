//! Catalog record types.

use serde::{Deserialize, Serialize};

/// A product listed in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// One of `jewelry`, `invites`, `outfits`, `gifts`, `stationery`.
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub description: String,
    /// Price in INR.
    pub price: f64,
    pub vendor_id: String,
    pub vendor_name: String,
    /// City of the vendor, or `Multiple` for products shipped from anywhere.
    pub city: String,
    pub style: String,
    /// Jewelry only.
    #[serde(default)]
    pub weight: Option<String>,
    pub lead_time_days: u32,
    #[serde(default)]
    pub min_quantity: Option<u32>,
    pub rating: f64,
    #[serde(default)]
    pub images: Vec<String>,
    pub source: String,
}

impl Product {
    /// Text that free-form queries are matched against, lowercased.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.name,
            self.description,
            self.category,
            self.subcategory.as_deref().unwrap_or(""),
            self.vendor_name
        )
        .to_lowercase()
    }

    /// Whether the product is only made after an order is placed.
    pub fn is_made_to_order(&self) -> bool {
        self.lead_time_days > 14
    }
}

/// A vendor that can be contacted through the concierge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub rating: f64,
    /// Human readable, e.g. `4 hours`.
    pub response_time: String,
    pub cities: Vec<String>,
}

/// Shipping zone derived from an Indian postal pincode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryZone {
    Metro,
    Tier1,
    Tier2,
    Remote,
}

const METRO_PREFIXES: [&str; 6] = ["11", "40", "56", "60", "70", "50"];
const TIER1_PREFIXES: [&str; 6] = ["38", "41", "30", "22", "16", "68"];

impl DeliveryZone {
    /// Classify a pincode by its leading digits.
    pub fn from_pincode(pincode: &str) -> Self {
        let prefix = pincode.get(..2).unwrap_or(pincode);
        if METRO_PREFIXES.contains(&prefix) {
            return Self::Metro;
        }
        if TIER1_PREFIXES.contains(&prefix) {
            return Self::Tier1;
        }
        match pincode.chars().next() {
            Some('4'..='7') => Self::Tier2,
            _ => Self::Remote,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metro => "metro",
            Self::Tier1 => "tier1",
            Self::Tier2 => "tier2",
            Self::Remote => "remote",
        }
    }
}

impl std::fmt::Display for DeliveryZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shipping characteristics of a zone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ZoneInfo {
    pub additional_days: u32,
}
