//! `save_to_shortlist`, `view_shortlist` and `share_shortlist`

use super::{Tool, ToolError, optional_f64, optional_str, required_str};
use catalog::format_inr;
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use storage::{Shortlist, ShortlistItem, ShortlistOptions, ShortlistStore};

fn not_found(id: &str) -> Value {
    json!({ "error": true, "message": format!("Shortlist {id} not found") })
}

fn parse_item(raw: &Value) -> Result<ShortlistItem, ToolError> {
    let id = required_str(raw, "id")?;
    Ok(ShortlistItem {
        id: id.to_string(),
        name: optional_str(raw, "name").unwrap_or(id).to_string(),
        price: optional_f64(raw, "price").unwrap_or_default(),
        vendor: optional_str(raw, "vendor").map(str::to_string),
        category: optional_str(raw, "category").map(str::to_string),
        style: optional_str(raw, "style").map(str::to_string),
    })
}

fn item_summary(item: &ShortlistItem, with_style: bool) -> Value {
    let mut summary = json!({
        "name": item.name,
        "price": format_inr(item.price),
        "vendor": item.vendor,
        "category": item.category,
    });
    if with_style {
        summary["style"] = json!(item.style);
    }
    summary
}

pub struct SaveShortlistTool {
    store: Arc<ShortlistStore>,
}

impl SaveShortlistTool {
    pub fn new(store: Arc<ShortlistStore>) -> Self {
        Self { store }
    }
}

impl Tool for SaveShortlistTool {
    fn name(&self) -> &'static str {
        "save_to_shortlist"
    }

    fn description(&self) -> &'static str {
        "Save products to a shareable shortlist. Creates a new shortlist, or adds to an existing one when shortlist_id is given."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "items": {
                    "type": "array",
                    "description": "Products to save",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "name": { "type": "string" },
                            "price": { "type": "number" },
                            "category": { "type": "string" },
                            "vendor": { "type": "string" },
                            "style": { "type": "string" }
                        },
                        "required": ["id", "name"]
                    }
                },
                "shortlist_id": { "type": "string", "description": "Existing shortlist to add to" },
                "title": { "type": "string", "description": "Title for a new shortlist" },
                "style": { "type": "string", "description": "Overall style of the shortlist" },
                "budget": { "type": "number", "description": "Total budget in INR" }
            },
            "required": ["items"]
        })
    }

    fn side_effecting(&self) -> bool {
        true
    }

    fn execute(&self, args: &Value) -> Result<Value, ToolError> {
        let raw_items = args
            .get("items")
            .and_then(Value::as_array)
            .filter(|items| !items.is_empty());
        let Some(raw_items) = raw_items else {
            return Ok(json!({
                "error": true,
                "message": "No items to save. Provide at least one item.",
            }));
        };
        let items = raw_items
            .iter()
            .map(parse_item)
            .collect::<Result<Vec<_>, _>>()?;
        let saved = items.len();

        let shortlist = match optional_str(args, "shortlist_id") {
            Some(id) => {
                for item in items {
                    if self.store.add(id, item).is_err() {
                        return Ok(not_found(id));
                    }
                }
                match self.store.get(id) {
                    Some(shortlist) => shortlist,
                    None => return Ok(not_found(id)),
                }
            }
            None => {
                let owner = format!("guest_{}", Utc::now().timestamp_millis());
                let options = ShortlistOptions {
                    title: optional_str(args, "title").map(str::to_string),
                    style: optional_str(args, "style").map(str::to_string),
                    budget: optional_f64(args, "budget"),
                };
                self.store.create(owner, items, options)
            }
        };

        let link = shortlist.shareable_link();
        Ok(json!({
            "success": true,
            "message": format!("✅ Saved {saved} item(s) to shortlist"),
            "shortlist": {
                "id": shortlist.id,
                "title": shortlist.title,
                "itemCount": shortlist.items.len(),
                "totalPrice": format_inr(shortlist.total_price()),
                "shareableLink": link,
                "items": shortlist.items.iter().map(|i| item_summary(i, false)).collect::<Vec<_>>(),
            },
            "conversionMessage": format!(
                "💝 Your shortlist is saved! Share this link with your partner or family:\n{link}\n\nCreate a free WeddingEase account to:\n✓ Access shortlist anytime\n✓ Compare with partner\n✓ Get vendor introductions\n✓ Track budget"
            ),
            "nextSteps": [
                "Create a free account to save this shortlist permanently",
                format!("Share shortlist link: {link}"),
                "View delivery dates for selected items",
                "Contact vendors directly from shortlist",
            ],
        }))
    }
}

pub struct ViewShortlistTool {
    store: Arc<ShortlistStore>,
}

impl ViewShortlistTool {
    pub fn new(store: Arc<ShortlistStore>) -> Self {
        Self { store }
    }
}

impl Tool for ViewShortlistTool {
    fn name(&self) -> &'static str {
        "view_shortlist"
    }

    fn description(&self) -> &'static str {
        "Show the items, total price and link of a saved shortlist."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "shortlist_id": { "type": "string", "description": "Shortlist ID (SL-...)" }
            },
            "required": ["shortlist_id"]
        })
    }

    fn execute(&self, args: &Value) -> Result<Value, ToolError> {
        let id = required_str(args, "shortlist_id")?;
        let Some(shortlist) = self.store.get(id) else {
            return Ok(not_found(id));
        };

        Ok(json!({
            "success": true,
            "shortlist": {
                "id": shortlist.id,
                "title": shortlist.title,
                "style": shortlist.style,
                "itemCount": shortlist.items.len(),
                "totalPrice": format_inr(shortlist.total_price()),
                "items": shortlist.items.iter().map(|i| item_summary(i, true)).collect::<Vec<_>>(),
                "createdAt": shortlist.created_at.format("%d/%m/%Y").to_string(),
                "shareableLink": shortlist.shareable_link(),
            },
        }))
    }
}

pub struct ShareShortlistTool {
    store: Arc<ShortlistStore>,
}

impl ShareShortlistTool {
    pub fn new(store: Arc<ShortlistStore>) -> Self {
        Self { store }
    }
}

fn share_details(shortlist: &Shortlist) -> Value {
    let comparison = shortlist.comparison_link();
    json!({
        "shortlistId": shortlist.id,
        "title": shortlist.title,
        "itemCount": shortlist.items.len(),
        "totalPrice": format_inr(shortlist.total_price()),
        "shareableLink": shortlist.shareable_link(),
        "comparisonLink": comparison,
        "shareMessage": format!("Check out my wedding picks! {comparison}"),
        "categories": shortlist.categories().join(", "),
    })
}

impl Tool for ShareShortlistTool {
    fn name(&self) -> &'static str {
        "share_shortlist"
    }

    fn description(&self) -> &'static str {
        "Make a shortlist public and get a link the user can share with their partner or family."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "shortlist_id": { "type": "string", "description": "Shortlist ID (SL-...)" }
            },
            "required": ["shortlist_id"]
        })
    }

    fn side_effecting(&self) -> bool {
        true
    }

    fn execute(&self, args: &Value) -> Result<Value, ToolError> {
        let id = required_str(args, "shortlist_id")?;
        let Ok(shortlist) = self.store.make_public(id) else {
            return Ok(not_found(id));
        };
        let comparison = shortlist.comparison_link();

        Ok(json!({
            "success": true,
            "message": "✅ Shortlist is now shareable!",
            "shareDetails": share_details(&shortlist),
            "instructions": [
                format!("Share this link with your partner: {comparison}"),
                "Your partner can add their feedback",
                "Compare preferences side-by-side",
                "Finalize choices together",
            ],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Value {
        json!([
            {"id": "J001", "name": "Rani Haar Kundan Bridal Set", "price": 285000, "category": "jewelry", "vendor": "Kundan Kala House"},
            {"id": "I001", "name": "Royal Laser-cut Invitation Box", "price": "850", "category": "invites"}
        ])
    }

    #[test]
    fn save_creates_a_shortlist() {
        let store = Arc::new(ShortlistStore::new());
        let result = SaveShortlistTool::new(store.clone())
            .execute(&json!({"items": items(), "title": "Mehendi picks"}))
            .unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["shortlist"]["title"], "Mehendi picks");
        assert_eq!(result["shortlist"]["itemCount"], 2);
        assert_eq!(result["shortlist"]["totalPrice"], "₹2,85,850");
        let id = result["shortlist"]["id"].as_str().unwrap();
        assert!(store.get(id).is_some());
    }

    #[test]
    fn save_into_existing_deduplicates() {
        let store = Arc::new(ShortlistStore::new());
        let tool = SaveShortlistTool::new(store.clone());
        let created = tool.execute(&json!({"items": items()})).unwrap();
        let id = created["shortlist"]["id"].as_str().unwrap();

        let again = tool
            .execute(&json!({"items": items(), "shortlist_id": id}))
            .unwrap();
        assert_eq!(again["shortlist"]["itemCount"], 2);
    }

    #[test]
    fn save_requires_items() {
        let store = Arc::new(ShortlistStore::new());
        let result = SaveShortlistTool::new(store)
            .execute(&json!({"items": []}))
            .unwrap();
        assert_eq!(result["error"], true);
    }

    #[test]
    fn save_into_missing_shortlist() {
        let store = Arc::new(ShortlistStore::new());
        let result = SaveShortlistTool::new(store)
            .execute(&json!({"items": items(), "shortlist_id": "SL-missing"}))
            .unwrap();
        assert_eq!(result["message"], "Shortlist SL-missing not found");
    }

    #[test]
    fn view_and_share() {
        let store = Arc::new(ShortlistStore::new());
        let created = SaveShortlistTool::new(store.clone())
            .execute(&json!({"items": items()}))
            .unwrap();
        let id = created["shortlist"]["id"].as_str().unwrap();

        let viewed = ViewShortlistTool::new(store.clone())
            .execute(&json!({"shortlist_id": id}))
            .unwrap();
        assert_eq!(viewed["shortlist"]["style"], "mixed");
        assert_eq!(viewed["shortlist"]["items"][1]["price"], "₹850");

        let shared = ShareShortlistTool::new(store.clone())
            .execute(&json!({"shortlist_id": id}))
            .unwrap();
        assert_eq!(shared["shareDetails"]["categories"], "jewelry, invites");
        assert!(store.get(id).unwrap().is_public);
    }
}
