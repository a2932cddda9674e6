//! Venue payload normalization.
//!
//! Scrapers hand over either records that are already normalized (they carry
//! an `event` field) or raw venue payloads. [`normalize_input`] tells them
//! apart and routes raw payloads through the venue's [`Normalizer`].

use serde_json::Value;
use tracing::warn;

use crate::models::MarketRecord;
use crate::traits::Normalizer;

/// Kalshi titles shorter than this get their primary rule appended.
const KALSHI_SHORT_TITLE: usize = 20;

/// Read a string field, treating `null` and non-strings as absent.
fn str_field<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// True when the payload is already in normalized form.
pub fn is_normalized(raw: &Value) -> bool {
    raw.as_object().is_some_and(|o| o.contains_key("event"))
}

/// Normalize one payload, detecting normalized records by their `event` field.
pub fn normalize_input(raw: &Value, normalizer: &dyn Normalizer) -> Option<MarketRecord> {
    if !raw.is_object() {
        warn!(venue = normalizer.venue(), "Dropping non-object market payload");
        return None;
    }
    if is_normalized(raw) {
        return match serde_json::from_value::<MarketRecord>(raw.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(venue = normalizer.venue(), error = %e, "Dropping malformed normalized record");
                None
            }
        };
    }
    normalizer.normalize(raw)
}

/// Normalize a batch, dropping payloads that cannot be interpreted.
pub fn normalize_all(raw: &[Value], normalizer: &dyn Normalizer) -> Vec<MarketRecord> {
    raw.iter()
        .filter_map(|item| normalize_input(item, normalizer))
        .collect()
}

/// Normalizer for Polymarket gamma-API market payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolymarketNormalizer;

impl Normalizer for PolymarketNormalizer {
    fn venue(&self) -> &str {
        "Polymarket"
    }

    fn normalize(&self, raw: &Value) -> Option<MarketRecord> {
        raw.as_object()?;

        // Prefer the parent event's title over the market question
        let event_title = raw
            .get("events")
            .and_then(Value::as_array)
            .and_then(|events| events.first())
            .and_then(|first| str_field(first, "title"));
        let title = event_title
            .or_else(|| str_field(raw, "question"))
            .or_else(|| str_field(raw, "event"))
            .unwrap_or_default();

        let slug = str_field(raw, "slug").map(str::to_string).or_else(|| {
            str_field(raw, "url")
                .and_then(|u| u.trim_end_matches('/').rsplit('/').next())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        });
        let url = match &slug {
            Some(slug) => format!("https://polymarket.com/event/{}", slug),
            None => str_field(raw, "url").unwrap_or_default().to_string(),
        };

        Some(MarketRecord {
            event: title.to_string(),
            description: str_field(raw, "description").unwrap_or_default().to_string(),
            source: str_field(raw, "source").unwrap_or("Polymarket").to_string(),
            url,
            id: slug,
        })
    }
}

/// Normalizer for Kalshi trade-API market payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct KalshiNormalizer;

impl Normalizer for KalshiNormalizer {
    fn venue(&self) -> &str {
        "Kalshi"
    }

    fn normalize(&self, raw: &Value) -> Option<MarketRecord> {
        raw.as_object()?;

        let title = str_field(raw, "title").unwrap_or_default();
        let rule = str_field(raw, "rules_primary").unwrap_or_default();
        let ticker = str_field(raw, "ticker").unwrap_or_default();

        // "Who will ..." titles name no outcome; the rule does
        let event = if title.to_lowercase().contains("who will")
            || title.chars().count() < KALSHI_SHORT_TITLE
        {
            format!("{} ({})", title, rule).trim().to_string()
        } else {
            title.to_string()
        };
        let event = if event.is_empty() || event == "()" {
            str_field(raw, "event").unwrap_or_default().to_string()
        } else {
            event
        };

        let description = if rule.is_empty() {
            str_field(raw, "description").unwrap_or_default()
        } else {
            rule
        };

        Some(MarketRecord {
            event,
            description: description.to_string(),
            source: str_field(raw, "source").unwrap_or("Kalshi").to_string(),
            url: format!("https://kalshi.com/markets/{}", ticker),
            id: (!ticker.is_empty()).then(|| ticker.to_string()),
        })
    }
}

/// Look up a normalizer by venue name (case-insensitive).
pub fn normalizer_for(venue: &str) -> Option<Box<dyn Normalizer>> {
    match venue.to_lowercase().as_str() {
        "polymarket" | "poly" => Some(Box::new(PolymarketNormalizer)),
        "kalshi" => Some(Box::new(KalshiNormalizer)),
        _ => None,
    }
}
