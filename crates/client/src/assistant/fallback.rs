//! Canned replies for when the remote assistant is unavailable.
//!
//! Rules are checked in order against the lower-cased message and the first
//! rule with a matching keyword wins.

const RULES: [(&[&str], &str); 6] = [
    (
        &["medicine", "prescription"],
        "You can request medicines or upload prescriptions through our services. Would you like me to direct you to the appropriate page?",
    ),
    (
        &["emergency", "urgent"],
        "For emergency requests, please use our emergency services page. We prioritize urgent medication needs.",
    ),
    (
        &["price", "cost"],
        "Product prices vary. You can check our products page for detailed pricing information.",
    ),
    (
        &["delivery", "shipping"],
        "We offer delivery services for all orders. Standard delivery takes 2-3 business days, with express options available.",
    ),
    (
        &["hours", "open"],
        "Our opening hours are Monday-Friday 8:00-17:00, Saturday 9:30-17:30, and Sunday 8:30-16:00.",
    ),
    (
        &["contact", "phone"],
        "You can contact us at support@medicart.com or call +880-XXXX-XXXX during business hours.",
    ),
];

/// Reply used when no rule matches.
pub const DEFAULT_REPLY: &str = "I'm here to help with MediCart services. You can ask about medicines, prescriptions, consultations, or our other services.";

/// Pick the canned reply for `message`.
#[must_use]
pub fn fallback_reply(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(DEFAULT_REPLY, |(_, reply)| *reply)
}
