//! `get_delivery_date`

use super::{Tool, ToolError, optional_str, required_str};
use catalog::{Catalog, DeliveryZone, Product};
use chrono::{Days, Local, NaiveDate};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Lead times above this many days mean the item is made to order.
const MADE_TO_ORDER_DAYS: u32 = 7;

/// Jewelry arriving sooner than this can be expedited.
const EXPRESS_WINDOW_DAYS: u32 = 14;

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryEstimate {
    pub item_id: String,
    pub item_name: String,
    pub pincode: String,
    pub zone: DeliveryZone,
    pub base_lead_time_days: u32,
    pub shipping_days: u32,
    pub total_days: u32,
    pub estimated_date: NaiveDate,
    pub formatted_date: String,
    pub is_feasible: bool,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_buffer: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feasibility_message: Option<String>,
}

/// Estimate when `product` reaches `pincode` if ordered on `today`.
pub fn estimate_delivery(
    catalog: &Catalog,
    product: &Product,
    pincode: &str,
    today: NaiveDate,
) -> DeliveryEstimate {
    let zone = DeliveryZone::from_pincode(pincode);
    let shipping_days = catalog.shipping_days(zone);
    let total_days = product.lead_time_days + shipping_days;
    let estimated_date = today
        .checked_add_days(Days::new(u64::from(total_days)))
        .unwrap_or(today);

    DeliveryEstimate {
        item_id: product.id.clone(),
        item_name: product.name.clone(),
        pincode: pincode.to_string(),
        zone,
        base_lead_time_days: product.lead_time_days,
        shipping_days,
        total_days,
        estimated_date,
        formatted_date: estimated_date.format("%A, %-d %B %Y").to_string(),
        is_feasible: true,
        notes: delivery_notes(product, zone, total_days),
        target_date: None,
        days_buffer: None,
        feasibility_message: None,
    }
}

impl DeliveryEstimate {
    /// Compare the estimate against the date the item is needed by.
    pub fn against(mut self, target: NaiveDate) -> Self {
        let buffer = (target - self.estimated_date).num_days();
        self.target_date = Some(target);
        self.days_buffer = Some(buffer);
        self.is_feasible = buffer >= 0;
        self.feasibility_message = Some(if buffer >= 0 {
            format!("Yes, delivery is possible with {buffer} days to spare.")
        } else {
            format!(
                "Delivery would be {} days late. Consider expedited options or alternative products.",
                buffer.abs()
            )
        });
        self
    }
}

fn delivery_notes(product: &Product, zone: DeliveryZone, total_days: u32) -> String {
    let mut notes: Vec<String> = Vec::new();
    if product.lead_time_days > MADE_TO_ORDER_DAYS {
        notes.push(
            "This is a made-to-order item and requires additional preparation time.".to_string(),
        );
    }
    if zone == DeliveryZone::Remote {
        notes.push("Remote location - delivery may take longer than estimated.".to_string());
    }
    if product.category == "jewelry" && total_days < EXPRESS_WINDOW_DAYS {
        notes.push(
            "Express delivery available for jewelry items with additional charges.".to_string(),
        );
    }
    if let Some(min) = product.min_quantity {
        notes.push(format!("Minimum order quantity: {min} pieces."));
    }
    notes.join(" ")
}

fn valid_pincode(pincode: &str) -> bool {
    pincode.len() == 6 && pincode.bytes().all(|b| b.is_ascii_digit())
}

pub struct DeliveryTool {
    catalog: Arc<Catalog>,
}

impl DeliveryTool {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl Tool for DeliveryTool {
    fn name(&self) -> &'static str {
        "get_delivery_date"
    }

    fn description(&self) -> &'static str {
        "Check estimated delivery date for a product to a specific pincode. Use this when users ask about delivery timelines or whether an order will arrive on time."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item_id": { "type": "string", "description": "Product ID from search results" },
                "pincode": { "type": "string", "description": "6-digit Indian postal pincode for delivery" },
                "target_date": {
                    "type": "string",
                    "description": "Optional date the item is needed by (YYYY-MM-DD)"
                }
            },
            "required": ["item_id", "pincode"]
        })
    }

    fn execute(&self, args: &Value) -> Result<Value, ToolError> {
        let item_id = required_str(args, "item_id")?;
        // Models sometimes send the pincode as a number.
        let pincode = match args.get("pincode") {
            Some(Value::Number(n)) => n.to_string(),
            _ => required_str(args, "pincode")?.trim().to_string(),
        };
        if !valid_pincode(&pincode) {
            return Err(ToolError::InvalidInput(format!(
                "Invalid pincode {pincode}. Please provide a 6-digit Indian pincode."
            )));
        }
        let target = optional_str(args, "target_date")
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                    ToolError::InvalidInput(format!(
                        "Invalid target_date {raw}. Use the YYYY-MM-DD format."
                    ))
                })
            })
            .transpose()?;

        let Some(product) = self.catalog.product(item_id) else {
            return Ok(json!({
                "error": true,
                "message": format!("Product with ID {item_id} not found"),
                "is_feasible": false,
            }));
        };

        let today = Local::now().date_naive();
        let mut estimate = estimate_delivery(&self.catalog, product, &pincode, today);
        if let Some(target) = target {
            estimate = estimate.against(target);
        }
        serde_json::to_value(estimate).map_err(|e| ToolError::Execution(e.to_string()))
    }
}
