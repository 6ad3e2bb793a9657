//! `send_contact_vendor`

use super::{Tool, ToolError, required_str};
use catalog::Catalog;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

const PREVIEW_CHARS: usize = 100;

/// Forwards an inquiry to a vendor. Dispatch is recorded in the log; no
/// email or SMS gateway is wired in.
pub struct ContactVendorTool {
    catalog: Arc<Catalog>,
}

impl ContactVendorTool {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

fn preview(message: &str) -> String {
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

impl Tool for ContactVendorTool {
    fn name(&self) -> &'static str {
        "send_contact_vendor"
    }

    fn description(&self) -> &'static str {
        "Send an inquiry message to a vendor on behalf of the user. Use when users want to contact a vendor for custom orders, questions, or appointments."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "vendor_id": { "type": "string", "description": "Vendor ID to contact" },
                "message": {
                    "type": "string",
                    "description": "Message to send to the vendor including user requirements"
                }
            },
            "required": ["vendor_id", "message"]
        })
    }

    fn side_effecting(&self) -> bool {
        true
    }

    fn execute(&self, args: &Value) -> Result<Value, ToolError> {
        let vendor_id = required_str(args, "vendor_id")?;
        let message = required_str(args, "message")?;

        let Some(vendor) = self.catalog.vendor(vendor_id) else {
            return Ok(json!({
                "success": false,
                "error": true,
                "message": format!("Vendor with ID {vendor_id} not found"),
            }));
        };

        let id = Uuid::new_v4().simple().to_string();
        let confirmation_id = format!("INQ-{}", id[..8].to_uppercase());

        tracing::info!(
            vendor = %vendor.id,
            vendor_name = %vendor.name,
            confirmation = %confirmation_id,
            message,
            "vendor inquiry sent"
        );

        Ok(json!({
            "success": true,
            "confirmation_id": confirmation_id,
            "vendor_name": vendor.name,
            "expected_response_time": vendor.response_time,
            "message_preview": preview(message),
            "next_steps": format!(
                "{} typically responds within {}. You'll receive their response via email.",
                vendor.name, vendor.response_time
            ),
        }))
    }
}
