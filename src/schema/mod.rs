mod coerce;
pub mod error;
pub mod types;
pub mod validator;

pub use error::{Bound, CoercionFailure, FieldError, Rule, ValidationError};
pub use types::{Field, MarketSnapshot};
pub use validator::{validate, FieldKind, FieldRule, RecordValidator, ValidationMode, RULES};
