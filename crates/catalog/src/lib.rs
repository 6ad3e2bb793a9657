//! Static wedding catalog for the concierge.
//!
//! This crate holds the read-only data set the concierge tools search over:
//! products (jewelry, invitations, outfits, gifts, stationery), the vendors
//! that sell them, and the shipping zones used for delivery estimates.
//!
//! # Overview
//!
//! - [`Catalog`] is the lookup interface. [`Catalog::builtin`] parses the
//!   document embedded at build time; [`Catalog::load`] reads one from disk.
//! - [`Product`] and [`Vendor`] are the records, deserialized as-is from the
//!   JSON document.
//! - [`DeliveryZone`] classifies an Indian pincode into metro / tier1 /
//!   tier2 / remote.
//! - [`format_price`] and [`format_inr`] render rupee amounts the way the
//!   chat replies show them.
//!
//! # Example
//!
//! ```
//! use catalog::{Catalog, DeliveryZone};
//!
//! let catalog = Catalog::builtin()?;
//! let set = catalog.product("J001").expect("builtin product");
//! let zone = DeliveryZone::from_pincode("400001");
//! let days = set.lead_time_days + catalog.shipping_days(zone);
//! assert!(days > set.lead_time_days);
//! # Ok::<(), catalog::Error>(())
//! ```

mod catalog;
mod error;
mod model;
mod price;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use model::{DeliveryZone, Product, Vendor, ZoneInfo};
pub use price::{format_inr, format_price};
