use serde_json::Value;
use std::fmt;

use crate::schema::types::Field;

/// Constraint kind a field failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Required,
    Type,
    Min,
    Max,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Type => "type",
            Rule::Min => "min",
            Rule::Max => "max",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive limit a numeric field fell outside of
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Lower(f64),
    Upper(f64),
}

impl Bound {
    pub fn limit(&self) -> f64 {
        match self {
            Bound::Lower(limit) | Bound::Upper(limit) => *limit,
        }
    }

    pub fn rule(&self) -> Rule {
        match self {
            Bound::Lower(_) => Rule::Min,
            Bound::Upper(_) => Rule::Max,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Lower(limit) => write!(f, "must not be less than {}", limit),
            Bound::Upper(limit) => write!(f, "must not be greater than {}", limit),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionFailure {
    NotANumber,
    NotADateTime,
    NotAString,
    Empty,
    Null,
}

impl fmt::Display for CoercionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            CoercionFailure::NotANumber => "not a valid number",
            CoercionFailure::NotADateTime => "not a valid date-time",
            CoercionFailure::NotAString => "not a valid string",
            CoercionFailure::Empty => "must not be empty",
            CoercionFailure::Null => "null is not an allowed value",
        };
        f.write_str(reason)
    }
}

/// A single violated constraint on one field
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("field {field} is required")]
    MissingField { field: Field },

    #[error("field {field}: {reason} (got {value})")]
    TypeCoercion {
        field: Field,
        reason: CoercionFailure,
        value: Value,
    },

    #[error("field {field} {bound} (got {value})")]
    RangeViolation { field: Field, value: f64, bound: Bound },
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::MissingField { field }
            | FieldError::TypeCoercion { field, .. }
            | FieldError::RangeViolation { field, .. } => *field,
        }
    }

    pub fn rule(&self) -> Rule {
        match self {
            FieldError::MissingField { .. } => Rule::Required,
            FieldError::TypeCoercion { .. } => Rule::Type,
            FieldError::RangeViolation { bound, .. } => bound.rule(),
        }
    }
}

/// Rejection of a candidate record, listing every violated constraint found.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    issues: Vec<FieldError>,
}

impl ValidationError {
    pub(crate) fn new(issues: Vec<FieldError>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[FieldError] {
        &self.issues
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Distinct failing fields, in the order they were reported
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        for issue in &self.issues {
            if !fields.contains(&issue.field()) {
                fields.push(issue.field());
            }
        }
        fields
    }

    pub fn for_field(&self, field: Field) -> impl Iterator<Item = &FieldError> {
        self.issues.iter().filter(move |issue| issue.field() == field)
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.for_field(field).next().is_some()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.issues.len() == 1 { "" } else { "s" };
        write!(
            f,
            "{} validation error{} for MarketSnapshot",
            self.issues.len(),
            plural
        )?;
        for issue in &self.issues {
            write!(f, "\n  {}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
