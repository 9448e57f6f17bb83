use serde::{Deserialize, Serialize};

use super::DataOrigin;

/// A symbol ranked by market capitalization, before traded value is joined in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCapRanking {
    pub symbol: String,
    pub market_cap: f64,
}

/// Final treemap row: market cap and traded value joined on `symbol`
///
/// Field names match the on-disk ranking cache format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolRanking {
    pub symbol: String,
    pub market_cap: f64,
    #[serde(rename = "total_value")]
    pub traded_value: f64,
}

impl SymbolRanking {
    pub fn new(symbol: impl Into<String>, market_cap: f64, traded_value: f64) -> Self {
        Self {
            symbol: symbol.into(),
            market_cap,
            traded_value,
        }
    }

    /// Copy with unusable numbers coerced to 0
    pub fn normalized(&self) -> Self {
        Self {
            symbol: self.symbol.clone(),
            market_cap: finite_or_zero(self.market_cap),
            traded_value: finite_or_zero(self.traded_value),
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Which per-symbol attribute failed to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolAttribute {
    MarketCap,
    TradedValue,
}

/// A per-symbol upstream failure captured during a fan-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub attribute: SymbolAttribute,
    pub reason: String,
}

/// Merged ranking for a symbol group (treemap view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRanking {
    pub group_code: String,
    pub rankings: Vec<SymbolRanking>,
    pub origin: DataOrigin,
    /// Symbols that failed during this request; empty for cache hits
    pub failures: Vec<SymbolFailure>,
}

impl GroupRanking {
    pub fn is_empty(&self) -> bool {
        self.rankings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_coerces_non_finite() {
        let ranking = SymbolRanking::new("VCB", f64::NAN, f64::INFINITY).normalized();
        assert_eq!(ranking, SymbolRanking::new("VCB", 0.0, 0.0));

        let ranking = SymbolRanking::new("FPT", 1.5e14, 2.0e11).normalized();
        assert_eq!(ranking, SymbolRanking::new("FPT", 1.5e14, 2.0e11));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(SymbolRanking::new("ABC", 1234.5, 6789.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"symbol": "ABC", "market_cap": 1234.5, "total_value": 6789.0})
        );
    }
}
