//! Market sources backed by JSON files on disk.

use std::path::PathBuf;

use async_trait::async_trait;
use clap::ValueEnum;
use serde_json::Value;
use tracing::{info, warn};

use crossmark_core::{
    normalize_all, Error, KalshiNormalizer, MarketRecord, MarketSource, Normalizer,
    PolymarketNormalizer, Result,
};

/// Shape of the records in an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VenueFormat {
    /// Raw Polymarket gamma-API market payloads.
    Polymarket,
    /// Raw Kalshi trade-API market payloads.
    Kalshi,
    /// Records already in `{event, description, source, url}` form.
    Normalized,
}

impl VenueFormat {
    fn normalizer(self) -> Option<Box<dyn Normalizer>> {
        match self {
            Self::Polymarket => Some(Box::new(PolymarketNormalizer)),
            Self::Kalshi => Some(Box::new(KalshiNormalizer)),
            Self::Normalized => None,
        }
    }
}

/// A JSON array of market payloads in one file.
///
/// The file may also be an object wrapping the array under `markets`, the
/// way both venues page their list endpoints.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    format: VenueFormat,
    name: String,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>, format: VenueFormat) -> Self {
        let path = path.into();
        let name = match format {
            VenueFormat::Polymarket => "Polymarket".to_string(),
            VenueFormat::Kalshi => "Kalshi".to_string(),
            VenueFormat::Normalized => path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("normalized")
                .to_string(),
        };
        Self { path, format, name }
    }
}

fn payloads(document: Value) -> Result<Vec<Value>> {
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("markets") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(Error::Source(
                "expected a JSON array or an object with a `markets` array".to_string(),
            )),
        },
        _ => Err(Error::Source("expected a JSON array of markets".to_string())),
    }
}

fn deserialize_records(items: &[Value]) -> Vec<MarketRecord> {
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<MarketRecord>(item.clone()) {
            Ok(record) if !record.text().is_empty() => Some(record),
            Ok(_) => {
                warn!("Dropping record with no title or description");
                None
            }
            Err(e) => {
                warn!(error = %e, "Dropping malformed record");
                None
            }
        })
        .collect()
}

#[async_trait]
impl MarketSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_markets(&self) -> Result<Vec<MarketRecord>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            Error::Source(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        let document: Value = serde_json::from_slice(&bytes)?;
        let items = payloads(document)?;

        let records = match self.format.normalizer() {
            Some(normalizer) => normalize_all(&items, normalizer.as_ref()),
            None => deserialize_records(&items),
        };

        info!(
            venue = %self.name,
            path = %self.path.display(),
            payloads = items.len(),
            doc_count = records.len(),
            "Loaded markets"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_json(value: &Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", value).unwrap();
        file
    }

    #[tokio::test]
    async fn test_kalshi_file_is_normalized() {
        let file = write_json(&serde_json::json!({
            "markets": [
                {"title": "Fed Rate Hike 2025", "rules_primary": "federal funds rate increases", "ticker": "KXFED-25"},
                "not a market"
            ]
        }));
        let source = JsonFileSource::new(file.path(), VenueFormat::Kalshi);
        let records = source.fetch_markets().await.unwrap();

        assert_eq!(source.name(), "Kalshi");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key(), "KXFED-25");
        assert_eq!(records[0].source, "Kalshi");
    }

    #[tokio::test]
    async fn test_normalized_file_drops_empty_records() {
        let file = write_json(&serde_json::json!([
            {"event": "Fed rate hike in 2025?", "description": null, "source": "Polymarket", "url": "https://polymarket.com/event/x"},
            {"event": "", "description": ""},
            {"event": 7}
        ]));
        let records = JsonFileSource::new(file.path(), VenueFormat::Normalized)
            .fetch_markets()
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, "Fed rate hike in 2025?");
    }

    #[tokio::test]
    async fn test_missing_file_is_source_error() {
        let source = JsonFileSource::new("/nonexistent/markets.json", VenueFormat::Polymarket);
        let err = source.fetch_markets().await.unwrap_err();
        assert!(matches!(err, Error::Source(_)));
    }

    #[tokio::test]
    async fn test_scalar_document_rejected() {
        let file = write_json(&serde_json::json!(42));
        let err = JsonFileSource::new(file.path(), VenueFormat::Kalshi)
            .fetch_markets()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }
}
