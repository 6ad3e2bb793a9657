//! Tool registry: ordered tool set, schema listing and never-failing dispatch.

use super::{
    ContactVendorTool, DeliveryTool, IdempotencyLedger, ItemDetailsTool, MoodboardTool,
    SaveShortlistTool, SearchTool, ShareShortlistTool, Tool, ToolError, ViewShortlistTool,
};
use crate::llm::ToolSpec;
use catalog::Catalog;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use storage::ShortlistStore;

/// A fixed, ordered set of tools built at startup.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    specs: Vec<ToolSpec>,
    ledger: IdempotencyLedger,
}

impl ToolRegistry {
    /// Registry over an explicit tool list, in the given order.
    pub fn new(tools: Vec<Box<dyn Tool>>) -> Self {
        let specs = tools.iter().map(|t| t.spec()).collect();
        Self {
            tools,
            specs,
            ledger: IdempotencyLedger::default(),
        }
    }

    /// The concierge's standard tools.
    pub fn concierge(catalog: Arc<Catalog>, shortlists: Arc<ShortlistStore>) -> Self {
        Self::new(vec![
            Box::new(SearchTool::new(catalog.clone())),
            Box::new(DeliveryTool::new(catalog.clone())),
            Box::new(ItemDetailsTool::new(catalog.clone())),
            Box::new(ContactVendorTool::new(catalog)),
            Box::new(MoodboardTool),
            Box::new(SaveShortlistTool::new(shortlists.clone())),
            Box::new(ViewShortlistTool::new(shortlists.clone())),
            Box::new(ShareShortlistTool::new(shortlists)),
        ])
    }

    /// Tool schemas in declaration order.
    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Run a tool. Every failure comes back as `{error: true, message}`.
    pub fn execute(&self, name: &str, args: &Value) -> Map<String, Value> {
        let Some(tool) = self.find(name) else {
            tracing::warn!(tool = name, "model requested unknown tool");
            return error_result(&ToolError::NotFound(name.to_string()));
        };
        run(tool, args)
    }

    /// Like [`execute`](Self::execute), but side-effecting tools run at most
    /// once per `(exchange, name, args)`; replays get the recorded result.
    pub fn execute_keyed(&self, name: &str, args: &Value, exchange: &str) -> Map<String, Value> {
        match self.find(name) {
            Some(tool) if tool.side_effecting() => {
                self.ledger.get_or_run(exchange, name, args, || run(tool, args))
            }
            _ => self.execute(name, args),
        }
    }
}

fn run(tool: &dyn Tool, args: &Value) -> Map<String, Value> {
    tracing::debug!(tool = tool.name(), %args, "executing tool");
    match tool.execute(args) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            let mut map = Map::new();
            map.insert("result".to_string(), other);
            map
        }
        Err(e) => {
            tracing::warn!(tool = tool.name(), error = %e, "tool failed");
            error_result(&e)
        }
    }
}

fn error_result(error: &ToolError) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("error".to_string(), json!(true));
    map.insert("message".to_string(), json!(error.to_string()));
    map
}
