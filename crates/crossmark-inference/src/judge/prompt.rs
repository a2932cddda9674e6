//! Prompt construction for the match judge.

use crossmark_core::MarketRecord;

/// System prompt sent with every judge request.
pub const SYSTEM_PROMPT: &str =
    "You are a strict JSON judge. Respond ONLY with a valid JSON object matching the schema.";

/// Placeholder for a missing description.
const NOT_AVAILABLE: &str = "N/A";

fn or_na(s: &str) -> &str {
    if s.trim().is_empty() {
        NOT_AVAILABLE
    } else {
        s
    }
}

fn venue_label(record: &MarketRecord, fallback: &str) -> String {
    if record.source.is_empty() {
        fallback.to_string()
    } else {
        record.source.clone()
    }
}

/// Build the user prompt comparing `left` and `right`.
pub fn build_match_prompt(left: &MarketRecord, right: &MarketRecord) -> String {
    format!(
        r#"Compare these two prediction market events. Your goal is to determine if they
are the EXACT SAME betting market.

=== Market A ({left_venue}) ===
Title: {left_title}
Description: {left_desc}

=== Market B ({right_venue}) ===
Title: {right_title}
Rules: {right_desc}

CRITERIA FOR MATCH:
1. SAME Event (e.g. same election, same game).
2. SAME Condition (e.g. both ask if X wins, or if X > 100).
3. SAME Entities (e.g. Bitcoin vs Bitcoin, not Bitcoin vs Ethereum).
4. SAME Dates/Numbers (if year is 2024 in A and 2025 in B, it is NOT a match).

IMPORTANT:
- Ignore phrasing differences (e.g. "Will X happen?" vs "If X happens...").
- Look for the CORE outcome. If Market A asks "Will X happen?" and Market B
  says "If X happens, Yes", they are a MATCH.

If they are different in ANY critical way (dates, teams, logic), return "match": false.
Be skeptical. Most pairs are NOT matches.

Reply ONLY with a JSON object:
{{
    "reason": "short explanation of why they match or not",
    "match": boolean,
    "confidence": float (0.0 to 1.0)
}}"#,
        left_venue = venue_label(left, "A"),
        left_title = left.event,
        left_desc = or_na(&left.description),
        right_venue = venue_label(right, "B"),
        right_title = right.event,
        right_desc = or_na(&right.description),
    )
}
