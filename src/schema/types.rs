use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::schema::error::ValidationError;
use crate::schema::validator;

/// The fields of a market snapshot, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    MarketId,
    Timestamp,
    YesPrice,
    NoPrice,
    Volume24h,
    Liquidity,
    Category,
    OddsChange,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::MarketId,
        Field::Timestamp,
        Field::YesPrice,
        Field::NoPrice,
        Field::Volume24h,
        Field::Liquidity,
        Field::Category,
        Field::OddsChange,
    ];

    /// Key used for this field in input mappings and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::MarketId => "market_id",
            Field::Timestamp => "timestamp",
            Field::YesPrice => "yes_price",
            Field::NoPrice => "no_price",
            Field::Volume24h => "volume_24h",
            Field::Liquidity => "liquidity",
            Field::Category => "category",
            Field::OddsChange => "odds_change",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated prediction-market data point.
///
/// Only [`RecordValidator`](crate::schema::RecordValidator) builds these, and
/// deserializing goes through the same validation, so every value in
/// circulation satisfies the field constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct MarketSnapshot {
    market_id: String,
    timestamp: DateTime<Utc>,
    yes_price: f64,
    no_price: f64,
    volume_24h: f64,
    liquidity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    odds_change: Option<f64>,
}

impl MarketSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        market_id: String,
        timestamp: DateTime<Utc>,
        yes_price: f64,
        no_price: f64,
        volume_24h: f64,
        liquidity: f64,
        category: Option<String>,
        odds_change: Option<f64>,
    ) -> Self {
        Self {
            market_id,
            timestamp,
            yes_price,
            no_price,
            volume_24h,
            liquidity,
            category,
            odds_change,
        }
    }

    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    /// Collection time (UTC)
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn yes_price(&self) -> f64 {
        self.yes_price
    }

    pub fn no_price(&self) -> f64 {
        self.no_price
    }

    /// 24h traded volume in USD
    pub fn volume_24h(&self) -> f64 {
        self.volume_24h
    }

    /// Total market liquidity in USD
    pub fn liquidity(&self) -> f64 {
        self.liquidity
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Percentage change of the odds over the last 5 minutes
    pub fn odds_change(&self) -> Option<f64> {
        self.odds_change
    }

    /// Serialize back into the input mapping shape accepted by the validator
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(Field::MarketId.as_str().into(), Value::from(self.market_id.clone()));
        map.insert(Field::Timestamp.as_str().into(), Value::from(self.timestamp.to_rfc3339()));
        map.insert(Field::YesPrice.as_str().into(), Value::from(self.yes_price));
        map.insert(Field::NoPrice.as_str().into(), Value::from(self.no_price));
        map.insert(Field::Volume24h.as_str().into(), Value::from(self.volume_24h));
        map.insert(Field::Liquidity.as_str().into(), Value::from(self.liquidity));
        if let Some(category) = &self.category {
            map.insert(Field::Category.as_str().into(), Value::from(category.clone()));
        }
        if let Some(odds_change) = self.odds_change {
            map.insert(Field::OddsChange.as_str().into(), Value::from(odds_change));
        }
        map
    }
}

impl TryFrom<Map<String, Value>> for MarketSnapshot {
    type Error = ValidationError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        validator::validate(&map)
    }
}

impl TryFrom<&Map<String, Value>> for MarketSnapshot {
    type Error = ValidationError;

    fn try_from(map: &Map<String, Value>) -> Result<Self, Self::Error> {
        validator::validate(map)
    }
}
