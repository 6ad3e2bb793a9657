//! `get_item_details`

use super::{Tool, ToolError, required_str};
use catalog::{Catalog, format_price};
use serde_json::{Value, json};
use std::sync::Arc;

pub struct ItemDetailsTool {
    catalog: Arc<Catalog>,
}

impl ItemDetailsTool {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl Tool for ItemDetailsTool {
    fn name(&self) -> &'static str {
        "get_item_details"
    }

    fn description(&self) -> &'static str {
        "Get complete details about a specific product including description, vendor information, and pricing."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item_id": { "type": "string", "description": "Product ID to get details for" }
            },
            "required": ["item_id"]
        })
    }

    fn execute(&self, args: &Value) -> Result<Value, ToolError> {
        let item_id = required_str(args, "item_id")?;
        let Some(product) = self.catalog.product(item_id) else {
            return Ok(json!({
                "error": true,
                "message": format!("Product with ID {item_id} not found"),
            }));
        };

        let vendor = self.catalog.vendor(&product.vendor_id).map(|v| {
            json!({
                "id": v.id,
                "name": v.name,
                "rating": v.rating,
                "response_time": v.response_time,
                "cities": v.cities,
            })
        });
        let availability = if product.is_made_to_order() {
            "made_to_order"
        } else {
            "in_stock"
        };

        Ok(json!({
            "id": product.id,
            "name": product.name,
            "price": product.price,
            "formatted_price": format_price(product.price),
            "category": product.category,
            "subcategory": product.subcategory,
            "description": product.description,
            "style": product.style,
            "weight": product.weight,
            "images": product.images,
            "lead_time_days": product.lead_time_days,
            "min_quantity": product.min_quantity.unwrap_or(1),
            "rating": product.rating,
            "vendor": vendor,
            "availability": availability,
            "source": product.source,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> ItemDetailsTool {
        ItemDetailsTool::new(Arc::new(Catalog::builtin().unwrap()))
    }

    #[test]
    fn includes_vendor_block() {
        let details = tool().execute(&json!({"item_id": "J002"})).unwrap();
        assert_eq!(details["vendor"]["name"], "Shringar Jewels");
        assert_eq!(details["availability"], "in_stock");
        assert_eq!(details["min_quantity"], 1);
    }

    #[test]
    fn long_lead_time_is_made_to_order() {
        let details = tool().execute(&json!({"item_id": "O001"})).unwrap();
        assert_eq!(details["availability"], "made_to_order");
        assert_eq!(details["weight"], Value::Null);
    }

    #[test]
    fn unknown_item() {
        let details = tool().execute(&json!({"item_id": "nope"})).unwrap();
        assert_eq!(details["error"], true);
        assert_eq!(details["message"], "Product with ID nope not found");
    }
}
