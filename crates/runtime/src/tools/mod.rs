//! Concierge tools and the registry that dispatches them.
//!
//! Every tool is synchronous and works against in-process data only: the
//! product catalog and the shortlist store.

mod delivery;
mod details;
pub mod errors;
mod ledger;
mod moodboard;
mod registry;
mod search;
mod shortlist;
mod vendor;

pub use delivery::{DeliveryTool, estimate_delivery};
pub use details::ItemDetailsTool;
pub use errors::ToolError;
pub use ledger::IdempotencyLedger;
pub use moodboard::MoodboardTool;
pub use registry::ToolRegistry;
pub use search::SearchTool;
pub use shortlist::{SaveShortlistTool, ShareShortlistTool, ViewShortlistTool};
pub use vendor::ContactVendorTool;

use crate::llm::ToolSpec;
use serde_json::Value;

/// A named capability the model may call mid-conversation.
pub trait Tool: Send + Sync {
    /// Name the model uses to call this tool.
    fn name(&self) -> &'static str;

    /// Description shown to the model.
    fn description(&self) -> &'static str;

    /// JSON Schema for the arguments.
    fn parameters(&self) -> Value;

    /// Whether running this tool changes something outside the process
    /// (messages sent, records written).
    fn side_effecting(&self) -> bool {
        false
    }

    fn execute(&self, args: &Value) -> Result<Value, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ToolError::InvalidInput(format!("Missing required argument: {key}")))
}

fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn optional_f64(args: &Value, key: &str) -> Option<f64> {
    match args.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}
