//! Pull budget, city and style preferences out of free text.

use regex::Regex;
use std::sync::LazyLock;
use storage::Context;

const CITIES: [&str; 9] = [
    "delhi",
    "mumbai",
    "bangalore",
    "chennai",
    "kolkata",
    "hyderabad",
    "ahmedabad",
    "pune",
    "jaipur",
];

static BUDGET: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)₹?\s*(\d+(?:,\d+)*(?:\.\d+)?)\s*(lakh|lac|k|thousand|crore)?").ok()
});

/// Preferences mentioned in a single message. Fields not mentioned are unset.
pub fn extract_context(message: &str) -> Context {
    let lower = message.to_lowercase();
    Context {
        budget: extract_budget(message),
        city: CITIES
            .iter()
            .find(|city| lower.contains(*city))
            .map(|city| title_case(city)),
        style: extract_style(&lower).map(str::to_string),
        ..Default::default()
    }
}

/// The first number in the message, scaled by its unit word.
fn extract_budget(message: &str) -> Option<f64> {
    let captures = BUDGET.as_ref()?.captures(message)?;
    let amount: f64 = captures.get(1)?.as_str().replace(',', "").parse().ok()?;
    let multiplier = match captures
        .get(2)
        .map(|m| m.as_str().to_lowercase())
        .as_deref()
    {
        Some("lakh" | "lac") => 100_000.0,
        Some("k" | "thousand") => 1_000.0,
        Some("crore") => 10_000_000.0,
        _ => 1.0,
    };
    Some(amount * multiplier)
}

fn extract_style(lower: &str) -> Option<&'static str> {
    if lower.contains("traditional") {
        Some("traditional")
    } else if lower.contains("modern") || lower.contains("contemporary") {
        Some("modern")
    } else if lower.contains("fusion") || lower.contains("indo-western") {
        Some("fusion")
    } else {
        None
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
