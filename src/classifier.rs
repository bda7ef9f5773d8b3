//! Resolve a user-supplied stock code or name to an issuer and market

use crate::cninfo::CninfoError;
use crate::models::{IssuerRecord, Market};
use crate::stocks::StockDatabase;
use tracing::debug;

/// Hong Kong codes are five characters with one of these prefixes
const HONGKONG_PREFIXES: [&str; 4] = ["00", "01", "02", "09"];
/// Leading digits of six-character A-share codes
const MAINLAND_LEADING_DIGITS: [char; 3] = ['0', '3', '6'];

/// Find the issuer for `input`, first by exact code, then by exact display name.
pub fn classify<'a>(db: &'a StockDatabase, input: &str) -> Result<&'a IssuerRecord, CninfoError> {
    let input = input.trim();

    if let Some(issuer) = db.find_by_code(input) {
        debug!("Resolved {} by code ({})", input, issuer.market);
        return Ok(issuer);
    }

    if let Some(issuer) = db.find_by_name(input) {
        debug!("Resolved {} by name to {} ({})", input, issuer.code, issuer.market);
        return Ok(issuer);
    }

    Err(CninfoError::StockNotFound {
        input: input.to_string(),
        market_hint: detect_market(db, input),
    })
}

/// Market of `code`: database listing wins, otherwise the code shape decides.
pub fn detect_market(db: &StockDatabase, code: &str) -> Market {
    if db.is_listed_in(Market::HongKong, code) {
        return Market::HongKong;
    }
    if db.is_listed_in(Market::Mainland, code) {
        return Market::Mainland;
    }
    infer_market(code)
}

/// Structural guess from the code alone. Never fails; defaults to mainland.
pub fn infer_market(code: &str) -> Market {
    let len = code.chars().count();
    if len == 5 && HONGKONG_PREFIXES.iter().any(|p| code.starts_with(p)) {
        return Market::HongKong;
    }
    if len == 6 && code.starts_with(MAINLAND_LEADING_DIGITS) {
        return Market::Mainland;
    }
    Market::Mainland
}
