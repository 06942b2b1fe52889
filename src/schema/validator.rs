use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

use crate::schema::coerce;
use crate::schema::error::{Bound, CoercionFailure, FieldError, ValidationError};
use crate::schema::types::{Field, MarketSnapshot};

/// Semantic type a raw value is coerced into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty text
    Identifier,
    Text,
    Timestamp,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    pub field: Field,
    pub kind: FieldKind,
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FieldRule {
    const fn required(field: Field, kind: FieldKind, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            field,
            kind,
            required: true,
            min,
            max,
        }
    }

    const fn optional(field: Field, kind: FieldKind, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            field,
            kind,
            required: false,
            min,
            max,
        }
    }

    /// First bound `value` violates, lower checked before upper
    pub fn violated_bound(&self, value: f64) -> Option<Bound> {
        match (self.min, self.max) {
            (Some(min), _) if value < min => Some(Bound::Lower(min)),
            (_, Some(max)) if value > max => Some(Bound::Upper(max)),
            _ => None,
        }
    }
}

/// Constraint table for [`MarketSnapshot`]. Bounds are inclusive.
pub static RULES: [FieldRule; 8] = [
    FieldRule::required(Field::MarketId, FieldKind::Identifier, None, None),
    FieldRule::required(Field::Timestamp, FieldKind::Timestamp, None, None),
    FieldRule::required(Field::YesPrice, FieldKind::Number, Some(0.0), Some(1.0)),
    FieldRule::required(Field::NoPrice, FieldKind::Number, Some(0.0), Some(1.0)),
    FieldRule::required(Field::Volume24h, FieldKind::Number, Some(0.0), None),
    FieldRule::required(Field::Liquidity, FieldKind::Number, Some(0.0), None),
    FieldRule::optional(Field::Category, FieldKind::Text, None, None),
    FieldRule::optional(Field::OddsChange, FieldKind::Number, Some(-100.0), Some(100.0)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Report every violated constraint
    #[default]
    Aggregate,
    /// Stop at the first violated constraint
    FailFast,
}

impl FromStr for ValidationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aggregate" => Ok(ValidationMode::Aggregate),
            "fail_fast" | "fail-fast" | "failfast" => Ok(ValidationMode::FailFast),
            other => anyhow::bail!("Unknown validation mode: {}", other),
        }
    }
}

/// Validates raw records into [`MarketSnapshot`]s.
///
/// Stateless: one instance can be shared across threads and reused for any
/// number of records.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator {
    mode: ValidationMode,
}

impl RecordValidator {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Validate a candidate record.
    ///
    /// Checks run in a fixed order: presence of required fields, coercion of
    /// required fields, bounds of required fields, then optional fields
    /// (coercion and bounds). Keys outside the schema are ignored.
    pub fn validate(&self, input: &Map<String, Value>) -> Result<MarketSnapshot, ValidationError> {
        let mut report = Report::new(self.mode);
        let mut coerced = Coerced::default();
        let required = || RULES.iter().filter(|rule| rule.required);

        // 1. Presence
        for rule in required() {
            if !input.contains_key(rule.field.as_str()) {
                report.push(FieldError::MissingField { field: rule.field })?;
            }
        }

        // 2. Coercion
        for rule in required() {
            if let Some(raw) = input.get(rule.field.as_str()) {
                match coerce_value(rule.kind, raw) {
                    Ok(value) => coerced.insert(rule.field, value),
                    Err(reason) => report.push(FieldError::TypeCoercion {
                        field: rule.field,
                        reason,
                        value: raw.clone(),
                    })?,
                }
            }
        }

        // 3. Bounds
        for rule in required() {
            if let Some(value) = coerced.number(rule.field) {
                check_bounds(rule, value, &mut report)?;
            }
        }

        // 4. Optional fields; explicit null counts as absent
        for rule in RULES.iter().filter(|rule| !rule.required) {
            let raw = match input.get(rule.field.as_str()) {
                Some(Value::Null) | None => continue,
                Some(raw) => raw,
            };
            match coerce_value(rule.kind, raw) {
                Ok(value) => {
                    if let CoercedValue::Number(number) = value {
                        check_bounds(rule, number, &mut report)?;
                    }
                    coerced.insert(rule.field, value);
                }
                Err(reason) => report.push(FieldError::TypeCoercion {
                    field: rule.field,
                    reason,
                    value: raw.clone(),
                })?,
            }
        }

        // Every required field left unset above has a matching issue
        match coerced.into_snapshot() {
            Some(snapshot) if report.is_clean() => Ok(snapshot),
            _ => {
                let err = report.into_error();
                debug!("Market snapshot rejected with {} issue(s)", err.issue_count());
                Err(err)
            }
        }
    }
}

/// Validate with the default (aggregating) validator
pub fn validate(input: &Map<String, Value>) -> Result<MarketSnapshot, ValidationError> {
    RecordValidator::default().validate(input)
}

fn check_bounds(rule: &FieldRule, value: f64, report: &mut Report) -> Result<(), ValidationError> {
    match rule.violated_bound(value) {
        Some(bound) => report.push(FieldError::RangeViolation {
            field: rule.field,
            value,
            bound,
        }),
        None => Ok(()),
    }
}

fn coerce_value(kind: FieldKind, raw: &Value) -> Result<CoercedValue, CoercionFailure> {
    match kind {
        FieldKind::Identifier => coerce::to_identifier(raw).map(CoercedValue::Text),
        FieldKind::Text => coerce::to_text(raw).map(CoercedValue::Text),
        FieldKind::Timestamp => coerce::to_timestamp(raw).map(CoercedValue::Instant),
        FieldKind::Number => coerce::to_number(raw).map(CoercedValue::Number),
    }
}

struct Report {
    mode: ValidationMode,
    issues: Vec<FieldError>,
}

impl Report {
    fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            issues: Vec::new(),
        }
    }

    /// Record an issue; errors out immediately in fail-fast mode
    fn push(&mut self, issue: FieldError) -> Result<(), ValidationError> {
        self.issues.push(issue);
        match self.mode {
            ValidationMode::Aggregate => Ok(()),
            ValidationMode::FailFast => Err(ValidationError::new(std::mem::take(&mut self.issues))),
        }
    }

    fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn into_error(self) -> ValidationError {
        ValidationError::new(self.issues)
    }
}

enum CoercedValue {
    Text(String),
    Instant(DateTime<Utc>),
    Number(f64),
}

#[derive(Default)]
struct Coerced {
    values: BTreeMap<Field, CoercedValue>,
}

impl Coerced {
    fn insert(&mut self, field: Field, value: CoercedValue) {
        self.values.insert(field, value);
    }

    fn number(&self, field: Field) -> Option<f64> {
        match self.values.get(&field) {
            Some(CoercedValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    fn take_text(&mut self, field: Field) -> Option<String> {
        match self.values.remove(&field) {
            Some(CoercedValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    fn take_instant(&mut self, field: Field) -> Option<DateTime<Utc>> {
        match self.values.remove(&field) {
            Some(CoercedValue::Instant(dt)) => Some(dt),
            _ => None,
        }
    }

    fn into_snapshot(mut self) -> Option<MarketSnapshot> {
        Some(MarketSnapshot::new(
            self.take_text(Field::MarketId)?,
            self.take_instant(Field::Timestamp)?,
            self.number(Field::YesPrice)?,
            self.number(Field::NoPrice)?,
            self.number(Field::Volume24h)?,
            self.number(Field::Liquidity)?,
            self.take_text(Field::Category),
            self.number(Field::OddsChange),
        ))
    }
}
