//! Stock database snapshot: market tag -> code -> issuer record.
//!
//! Loaded once at startup and only read afterwards. Market tags and codes
//! keep the order they have in the file, and lookups walk them in that order.

use crate::cninfo::CninfoError;
use crate::models::{IssuerRecord, Market};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

/// Raw entry as stored in `stocks.json`
#[derive(Debug, Deserialize)]
struct StockEntry {
    #[serde(rename = "orgId")]
    org_id: String,
    /// Short Chinese display name
    #[serde(default)]
    zwjc: Option<String>,
}

/// Issuers of one market tag
#[derive(Debug, Clone)]
pub struct MarketListing {
    pub tag: String,
    pub market: Market,
    pub issuers: Vec<IssuerRecord>,
}

impl MarketListing {
    pub fn get(&self, code: &str) -> Option<&IssuerRecord> {
        self.issuers.iter().find(|issuer| issuer.code == code)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StockDatabase {
    listings: Vec<MarketListing>,
}

impl StockDatabase {
    /// Load the snapshot from disk. A missing file yields an empty database.
    pub fn load(path: &Path) -> Result<Self, CninfoError> {
        if !path.exists() {
            warn!("Stock database not found at {}, continuing with an empty database", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let database = Self::from_json_str(&content).map_err(|source| CninfoError::StockDatabase {
            path: path.display().to_string(),
            source,
        })?;

        info!(
            "Loaded {} stocks across {} markets from {}",
            database.len(),
            database.listings.len(),
            path.display()
        );
        Ok(database)
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        // `Map` preserves insertion order (serde_json `preserve_order`)
        let raw: Map<String, Value> = serde_json::from_str(content)?;

        let mut listings = Vec::new();
        for (tag, entries) in raw {
            let Some(market) = Market::from_tag(&tag) else {
                warn!("Skipping unknown market tag '{}' in stock database", tag);
                continue;
            };

            let entries: Map<String, Value> = serde_json::from_value(entries)?;
            let mut issuers = Vec::with_capacity(entries.len());
            for (code, entry) in entries {
                let entry: StockEntry = serde_json::from_value(entry)?;
                issuers.push(IssuerRecord {
                    name: entry.zwjc.unwrap_or_else(|| code.clone()),
                    code,
                    org_id: entry.org_id,
                    market,
                });
            }

            debug!("Market tag {} ({}): {} stocks", tag, market, issuers.len());
            listings.push(MarketListing { tag, market, issuers });
        }

        Ok(Self { listings })
    }

    pub fn listings(&self) -> &[MarketListing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.iter().map(|l| l.issuers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exact code lookup across all markets, in file order
    pub fn find_by_code(&self, code: &str) -> Option<&IssuerRecord> {
        self.listings.iter().find_map(|l| l.get(code))
    }

    /// Exact display-name lookup across all markets, in file order
    pub fn find_by_name(&self, name: &str) -> Option<&IssuerRecord> {
        self.listings
            .iter()
            .flat_map(|l| l.issuers.iter())
            .find(|issuer| issuer.name == name)
    }

    /// Whether `code` is listed under `market`
    pub fn is_listed_in(&self, market: Market, code: &str) -> bool {
        self.listings
            .iter()
            .any(|l| l.market == market && l.get(code).is_some())
    }
}
