//! `search_catalog`

use super::{Tool, ToolError, optional_f64, optional_str, required_str};
use catalog::{Catalog, Product, format_price};
use serde_json::{Value, json};
use std::sync::Arc;

const MAX_RESULTS: usize = 5;

pub struct SearchTool {
    catalog: Arc<Catalog>,
}

impl SearchTool {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[derive(Debug, Default)]
struct Filters<'a> {
    category: Option<&'a str>,
    budget_min: Option<f64>,
    budget_max: Option<f64>,
    city: Option<&'a str>,
    style: Option<&'a str>,
    weight: Option<&'a str>,
}

impl<'a> Filters<'a> {
    fn from_args(filters: Option<&'a Value>) -> Self {
        let Some(filters) = filters else {
            return Self::default();
        };
        Self {
            category: optional_str(filters, "category"),
            budget_min: optional_f64(filters, "budget_min"),
            budget_max: optional_f64(filters, "budget_max"),
            city: optional_str(filters, "city"),
            style: optional_str(filters, "style"),
            weight: optional_str(filters, "weight"),
        }
    }

    fn matches(&self, p: &Product) -> bool {
        if let Some(category) = self.category {
            if p.category != category.to_lowercase() {
                return false;
            }
        }
        if self.budget_min.is_some_and(|min| p.price < min) {
            return false;
        }
        if self.budget_max.is_some_and(|max| p.price > max) {
            return false;
        }
        if let Some(city) = self.city {
            if !p.city.eq_ignore_ascii_case(city) && p.city != "Multiple" {
                return false;
            }
        }
        if let Some(style) = self.style {
            if p.style != style.to_lowercase() {
                return false;
            }
        }
        if let (Some(weight), Some(product_weight)) = (self.weight, p.weight.as_deref()) {
            if product_weight != weight.to_lowercase() {
                return false;
            }
        }
        true
    }
}

impl Tool for SearchTool {
    fn name(&self) -> &'static str {
        "search_catalog"
    }

    fn description(&self) -> &'static str {
        "Search for wedding products and vendors. Use this to find jewelry, invitations, outfits, gifts, or stationery based on user preferences like budget, city, style, and category."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query describing what the user is looking for (e.g., \"kundan bridal jewelry\", \"luxury invitations\", \"pastel lehenga\")"
                },
                "filters": {
                    "type": "object",
                    "description": "Optional filters to narrow down results",
                    "properties": {
                        "category": {
                            "type": "string",
                            "enum": ["jewelry", "invites", "outfits", "gifts", "stationery"],
                            "description": "Product category"
                        },
                        "budget_min": { "type": "number", "description": "Minimum budget in INR" },
                        "budget_max": { "type": "number", "description": "Maximum budget in INR" },
                        "city": {
                            "type": "string",
                            "description": "City for vendor/product availability (e.g., \"Mumbai\", \"Delhi\", \"Ahmedabad\")"
                        },
                        "style": {
                            "type": "string",
                            "enum": ["traditional", "modern", "fusion"],
                            "description": "Style preference"
                        },
                        "weight": {
                            "type": "string",
                            "enum": ["light", "medium", "heavy"],
                            "description": "Weight preference for jewelry"
                        }
                    }
                }
            },
            "required": ["query"]
        })
    }

    fn execute(&self, args: &Value) -> Result<Value, ToolError> {
        let query = required_str(args, "query")?;
        let needle = query.to_lowercase();
        let raw_filters = args.get("filters").filter(|f| f.is_object());
        let filters = Filters::from_args(raw_filters);

        let mut matches: Vec<&Product> = self
            .catalog
            .products()
            .iter()
            .filter(|p| p.search_text().contains(&needle))
            .filter(|p| filters.matches(p))
            .collect();
        // Stable sort keeps catalog order among equal ratings.
        matches.sort_by(|a, b| b.rating.total_cmp(&a.rating));

        let results: Vec<Value> = matches
            .iter()
            .take(MAX_RESULTS)
            .map(|p| {
                json!({
                    "id": p.id,
                    "name": p.name,
                    "price": p.price,
                    "formatted_price": format_price(p.price),
                    "category": p.category,
                    "vendor": p.vendor_name,
                    "city": p.city,
                    "style": p.style,
                    "rating": p.rating,
                    "lead_time_days": p.lead_time_days,
                    "source": p.source,
                })
            })
            .collect();

        Ok(json!({
            "results": results,
            "total_count": matches.len(),
            "query": query,
            "filters_applied": raw_filters.cloned().unwrap_or_else(|| json!({})),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> SearchTool {
        SearchTool::new(Arc::new(Catalog::builtin().unwrap()))
    }

    fn ids(result: &Value) -> Vec<String> {
        result["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn jewelry_sorted_by_rating() {
        let result = tool()
            .execute(&json!({"query": "jewelry", "filters": {"category": "jewelry"}}))
            .unwrap();
        assert_eq!(ids(&result), ["J001", "J003", "J002", "J005", "J004"]);
        assert_eq!(result["total_count"], 6);
        assert_eq!(result["results"][0]["formatted_price"], "₹2.9 Lakh");
        assert_eq!(result["filters_applied"]["category"], "jewelry");
    }

    #[test]
    fn budget_and_city_filters() {
        let result = tool()
            .execute(&json!({
                "query": "jewelry",
                "filters": {"budget_max": 150000, "city": "jaipur"}
            }))
            .unwrap();
        for r in result["results"].as_array().unwrap() {
            assert!(r["price"].as_f64().unwrap() <= 150_000.0);
            assert!(matches!(r["city"].as_str(), Some("Jaipur") | Some("Multiple")));
        }
    }

    #[test]
    fn query_is_case_insensitive() {
        let result = tool().execute(&json!({"query": "KUNDAN"})).unwrap();
        assert!(ids(&result).contains(&"J001".to_string()));
    }

    #[test]
    fn no_matches() {
        let result = tool().execute(&json!({"query": "spaceship"})).unwrap();
        assert_eq!(result["total_count"], 0);
        assert!(result["results"].as_array().unwrap().is_empty());
        assert_eq!(result["filters_applied"], json!({}));
    }

    #[test]
    fn query_is_required() {
        assert!(matches!(
            tool().execute(&json!({"filters": {}})),
            Err(ToolError::InvalidInput(_))
        ));
    }
}
