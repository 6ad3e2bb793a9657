//! In-memory catalog backed by a JSON document.

use crate::{DeliveryZone, Error, Product, Result, Vendor, ZoneInfo};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    products: Vec<Product>,
    vendors: Vec<Vendor>,
    delivery_zones: HashMap<DeliveryZone, ZoneInfo>,
}

/// Read-only product and vendor directory.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    vendors: Vec<Vendor>,
    zones: HashMap<DeliveryZone, ZoneInfo>,
}

impl Catalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Load a catalog document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse a catalog document.
    ///
    /// Every delivery zone must have an entry so shipping estimates never
    /// fall through.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        for zone in [
            DeliveryZone::Metro,
            DeliveryZone::Tier1,
            DeliveryZone::Tier2,
            DeliveryZone::Remote,
        ] {
            if !doc.delivery_zones.contains_key(&zone) {
                return Err(Error::MissingZone(zone.as_str()));
            }
        }
        Ok(Self {
            products: doc.products,
            vendors: doc.vendors,
            zones: doc.delivery_zones,
        })
    }

    /// All products in document order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn vendor(&self, id: &str) -> Option<&Vendor> {
        self.vendors.iter().find(|v| v.id == id)
    }

    /// Extra shipping days for a zone.
    pub fn shipping_days(&self, zone: DeliveryZone) -> u32 {
        self.zones
            .get(&zone)
            .map(|z| z.additional_days)
            .unwrap_or_default()
    }
}
