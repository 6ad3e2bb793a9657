//! INR price formatting.

/// Compact rupee format used in listings: `₹2.9 Lakh`, `₹45K`, `₹850`.
pub fn format_price(price: f64) -> String {
    if price >= 100_000.0 {
        format!("₹{:.1} Lakh", price / 100_000.0)
    } else if price >= 1_000.0 {
        format!("₹{:.0}K", price / 1_000.0)
    } else {
        format!("₹{price}")
    }
}

/// Full rupee amount with Indian digit grouping: `₹12,34,567`.
///
/// The amount is rounded to whole rupees.
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    // Last three digits form one group, the rest are grouped in twos.
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        format!("{},{tail}", groups.join(","))
    };

    if negative {
        format!("-₹{grouped}")
    } else {
        format!("₹{grouped}")
    }
}
