//! Deterministic keyword responder used when no model can answer.

use crate::llm::Usage;
use crate::orchestrator::Reply;
use crate::tools::ToolRegistry;
use serde_json::{Map, Value, json};
use storage::ToolInvocation;

/// `model_used` for replies produced here.
pub const FALLBACK_MODEL: &str = "fallback";

const JEWELRY_WORDS: [&str; 4] = ["jewelry", "jewel", "kundan", "gold"];
const INVITE_WORDS: [&str; 3] = ["invite", "invitation", "card"];
const DELIVERY_WORDS: [&str; 4] = ["deliver", "within", "week", "time"];

const DELIVERY_REPLY: &str = "I can definitely help check delivery timelines! 📦

To give you accurate estimates, I need:
1. **What product** are you looking at? (or I can search based on your requirements)
2. **Your delivery pincode** - this helps calculate exact shipping times
3. **Your deadline** - when do you need items delivered?

For example, most jewelry items take 7-14 days, while custom invitations might need 10-14 days depending on quantity.

Share these details and I'll check if your timeline is realistic!";

const WELCOME_REPLY: &str = "Namaste! 🙏 Welcome to WeddingEase - I'm your AI wedding shopping concierge.

I can help you with:
- 💍 **Jewelry** - Bridal sets, kundan, polki, temple jewelry
- 💌 **Invitations** - Printed, digital, eco-friendly options
- 👗 **Outfits** - Lehengas, sherwanis, designer wear
- 🎁 **Gifts** - Return gifts, wedding favors
- 📝 **Stationery** - Complete suites, monograms

**What are you shopping for today?**

To give you the best recommendations, it helps to know:
- Your approximate budget
- The city you're based in
- Your wedding date (if set)
- Your style preference (traditional/modern/fusion)

Feel free to ask me anything - like \"I need traditional jewelry under ₹3 Lakhs in Ahmedabad\" and I'll find perfect options for you!";

/// Answer `message` without a model. Same reply shape as a live answer.
pub fn respond(registry: &ToolRegistry, message: &str) -> Reply {
    let lower = message.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if mentions(&JEWELRY_WORDS) {
        let args = json!({"query": "jewelry", "filters": {"category": "jewelry"}});
        let result = registry.execute("search_catalog", &args);
        let listing = listing(&result, |p| {
            format!(
                "   - Price: {}\n   - Vendor: {} ({})\n   - Style: {} | Rating: ⭐ {}\n   - [Source: {}]",
                field(p, "formatted_price"),
                field(p, "vendor"),
                field(p, "city"),
                field(p, "style"),
                field(p, "rating"),
                field(p, "source"),
            )
        });
        let text = format!(
            "I'd love to help you find the perfect wedding jewelry! 💍

Based on what's available, here are some stunning options:

{listing}

To give you more personalized recommendations, could you tell me:
1. What's your budget range?
2. Which city are you shopping in?
3. Do you prefer traditional, modern, or fusion styles?
4. Any specific pieces you're looking for (bridal set, earrings, bangles)?"
        );
        return reply(text, vec![invocation("search_catalog", args, result)]);
    }

    if mentions(&INVITE_WORDS) {
        let args = json!({"query": "invitation", "filters": {"category": "invites"}});
        let result = registry.execute("search_catalog", &args);
        let listing = listing(&result, |p| {
            format!(
                "   - Price: {} per piece\n   - Vendor: {}\n   - Style: {} | Lead time: {} days\n   - [Source: {}]",
                field(p, "formatted_price"),
                field(p, "vendor"),
                field(p, "style"),
                field(p, "lead_time_days"),
                field(p, "source"),
            )
        });
        let text = format!(
            "Wedding invitations set the tone for your celebration! 💌

Here are some beautiful options:

{listing}

A few questions to help narrow down:
1. How many invites do you need?
2. What's your budget per invite?
3. When do you need them delivered and to which city?
4. Preference for printed, digital, or both?"
        );
        return reply(text, vec![invocation("search_catalog", args, result)]);
    }

    if mentions(&DELIVERY_WORDS) {
        return reply(DELIVERY_REPLY.to_string(), Vec::new());
    }

    reply(WELCOME_REPLY.to_string(), Vec::new())
}

fn reply(message: String, tool_calls: Vec<ToolInvocation>) -> Reply {
    Reply {
        message,
        tool_calls,
        model_used: FALLBACK_MODEL.to_string(),
        usage: Usage::default(),
    }
}

fn invocation(tool: &str, args: Value, result: Map<String, Value>) -> ToolInvocation {
    ToolInvocation {
        tool: tool.to_string(),
        args,
        result: Value::Object(result),
    }
}

/// Numbered `**n. name**` entries, one block per search hit.
fn listing(result: &Map<String, Value>, details: impl Fn(&Value) -> String) -> String {
    result
        .get("results")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .enumerate()
                .map(|(i, p)| format!("**{}. {}**\n{}", i + 1, field(p, "name"), details(p)))
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .unwrap_or_default()
}

fn field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Catalog;
    use std::sync::Arc;
    use storage::ShortlistStore;

    fn registry() -> ToolRegistry {
        ToolRegistry::concierge(
            Arc::new(Catalog::builtin().unwrap()),
            Arc::new(ShortlistStore::new()),
        )
    }

    #[test]
    fn jewelry_lists_top_rated_pieces() {
        let reply = respond(&registry(), "Show me kundan sets");
        assert_eq!(reply.model_used, "fallback");
        assert_eq!(reply.usage, Usage::default());
        assert_eq!(reply.tool_calls.len(), 1);

        let call = &reply.tool_calls[0];
        assert_eq!(call.tool, "search_catalog");
        assert_eq!(
            call.args,
            json!({"query": "jewelry", "filters": {"category": "jewelry"}})
        );
        let hits = call.result["results"].as_array().unwrap();
        assert_eq!(hits.len(), 5);
        assert!(hits.iter().all(|h| h["category"] == "jewelry"));

        assert!(reply.message.starts_with("I'd love to help you find the perfect wedding jewelry!"));
        assert!(reply.message.contains("**1. "));
        assert!(reply.message.contains("**5. "));
        assert!(!reply.message.contains("**6. "));
        assert!(reply.message.contains("Rating: ⭐ 4.9"));
    }

    #[test]
    fn invitations_search_the_invites_category() {
        let reply = respond(&registry(), "Need wedding cards for 300 guests");
        let call = &reply.tool_calls[0];
        assert_eq!(call.args["filters"]["category"], "invites");
        assert!(reply.message.contains("per piece"));
        assert!(reply.message.contains("Lead time: "));
    }

    #[test]
    fn jewelry_wins_over_invitations() {
        let reply = respond(&registry(), "gold foil invitation card");
        assert_eq!(reply.tool_calls[0].args["query"], "jewelry");
    }

    #[test]
    fn delivery_checklist_calls_no_tools() {
        let reply = respond(&registry(), "Can it arrive within two weeks?");
        assert!(reply.tool_calls.is_empty());
        assert!(reply.message.contains("delivery pincode"));
    }

    #[test]
    fn anything_else_gets_the_welcome() {
        let reply = respond(&registry(), "hello");
        assert!(reply.tool_calls.is_empty());
        assert!(reply.message.starts_with("Namaste!"));
    }
}
