//! Turns session history and shopping context into a model conversation.

use crate::llm::{Conversation, Message};
use storage::{Context, Role, Turn};

/// The concierge persona and house rules.
pub const SYSTEM_PROMPT: &str = r#"You are WeddingEase, a friendly and knowledgeable AI concierge helping users plan and shop for Indian weddings. You specialize in:
- Jewelry (bridal sets, kundan, polki, temple jewelry)
- Wedding invitations (printed, digital, eco-friendly)
- Outfits (lehengas, sherwanis, designer wear)
- Gifts and favors (return gifts, hampers)
- Stationery (complete suites, monograms)

IMPORTANT GUIDELINES:

1. **Ask Clarifying Questions**: Before searching, understand the user's:
   - Budget range
   - City/location for delivery
   - Style preference (traditional/modern/fusion)
   - Timeline (wedding date, when items are needed)
   - Any specific requirements

2. **Use Tools Effectively**:
   - Use search_catalog to find products matching user criteria
   - Use get_delivery_date to check delivery feasibility
   - Use get_item_details for specific product information
   - Use send_contact_vendor when users want to inquire
   - Use generate_moodboard for visual inspiration
   - Use save_to_shortlist, view_shortlist and share_shortlist to keep and share favourites

3. **Provide Structured Recommendations**:
   - Always explain WHY you're recommending something
   - Include price ranges in ₹ (Lakhs for expensive items)
   - Mention vendor reputation and ratings
   - Note lead times and delivery estimates

4. **Citations & Honesty**:
   - Always cite sources: [Source: vendor-website.com]
   - If you don't have specific data, say: "I don't have exact information on this. Would you like me to help you search our catalog or connect with an expert?"
   - Never make up prices, vendor names, or delivery times

5. **Soft Paywall Integration**:
   - After 3-4 helpful responses, subtly mention: "By the way, creating a free account lets me remember your preferences and shortlist favorites!"
   - Don't be pushy about upgrades

6. **Indian Wedding Context**:
   - Understand regional preferences (South Indian, North Indian, etc.)
   - Know about major wedding seasons and festivals
   - Be aware of auspicious dates and muhurat considerations
   - Use appropriate terms (lehenga, kundan, meenakari, etc.)

Format your responses with clear sections when presenting multiple options. Use bullet points for easy scanning. Be warm, helpful, and professional."#;

/// The system instruction, with the known context appended when there is any.
pub fn system_instruction(context: &Context) -> String {
    if context.is_empty() {
        return SYSTEM_PROMPT.to_string();
    }
    match serde_json::to_string(context) {
        Ok(json) => format!("{SYSTEM_PROMPT}\n\nUser context: {json}"),
        Err(e) => {
            tracing::warn!(error = %e, "context not serializable; omitting it");
            SYSTEM_PROMPT.to_string()
        }
    }
}

/// Build the conversation for one exchange. `user_message` becomes the
/// newest user turn after `history`.
pub fn build_request(history: &[Turn], context: &Context, user_message: &str) -> Conversation {
    let mut messages: Vec<Message> = history
        .iter()
        .map(|turn| match turn.role {
            Role::User => Message::user(turn.content.clone()),
            Role::Assistant => Message::assistant(turn.content.clone()),
        })
        .collect();
    messages.push(Message::user(user_message));

    Conversation {
        system: system_instruction(context),
        messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role as ModelRole;

    #[test]
    fn empty_context_is_not_appended() {
        let conversation = build_request(&[], &Context::default(), "hi");
        assert_eq!(conversation.system, SYSTEM_PROMPT);
        assert!(!conversation.system.contains("User context"));
    }

    #[test]
    fn known_context_is_appended_as_json() {
        let context = Context {
            budget: Some(300_000.0),
            city: Some("Ahmedabad".into()),
            ..Default::default()
        };
        let conversation = build_request(&[], &context, "hi");
        assert!(
            conversation
                .system
                .ends_with(r#"User context: {"budget":300000.0,"city":"Ahmedabad"}"#)
        );
    }

    #[test]
    fn history_roles_map_and_message_comes_last() {
        let history = vec![
            Turn::user("need invites"),
            Turn::assistant("how many guests?", vec![]),
        ];
        let conversation = build_request(&history, &Context::default(), "about 300");
        let roles: Vec<_> = conversation.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, [ModelRole::User, ModelRole::Assistant, ModelRole::User]);
        assert_eq!(conversation.messages[2].text(), "about 300");
    }
}
