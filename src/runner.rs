use anyhow::Result;
use serde_json::Value;
use tracing::{info, warn};

use crate::monitoring::logger::CsvLogger;
use crate::schema::RecordValidator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub validated: usize,
    pub rejected: usize,
}

/// Validate every record, logging each outcome.
///
/// Rejections are expected and only counted; an error is returned only when
/// the CSV report cannot be written.
pub fn validate_all(
    validator: &RecordValidator,
    records: &[Value],
    logger: Option<&CsvLogger>,
) -> Result<Summary> {
    let mut summary = Summary::default();

    for (index, record) in records.iter().enumerate() {
        let Some(input) = record.as_object() else {
            warn!("Record {} is not a JSON object, skipping", index);
            summary.rejected += 1;
            if let Some(logger) = logger {
                logger.log_malformed(index)?;
            }
            continue;
        };

        match validator.validate(input) {
            Ok(snapshot) => {
                info!(
                    "Record {} passed validation: {}",
                    index,
                    serde_json::to_string(&snapshot)?
                );
                summary.validated += 1;
                if let Some(logger) = logger {
                    logger.log_accepted(index, &snapshot)?;
                }
            }
            Err(e) => {
                warn!("Record {} failed validation: {}", index, e);
                summary.rejected += 1;
                if let Some(logger) = logger {
                    let market_id = input.get("market_id").and_then(Value::as_str);
                    logger.log_rejected(index, market_id, &e)?;
                }
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::demo_records;
    use crate::schema::ValidationMode;
    use serde_json::json;

    #[test]
    fn test_demo_summary() {
        let summary = validate_all(&RecordValidator::default(), &demo_records(), None).unwrap();
        assert_eq!(summary, Summary { validated: 1, rejected: 1 });
    }

    #[test]
    fn test_non_objects_are_rejected() {
        let records = vec![json!(42), json!("market"), json!({})];
        let validator = RecordValidator::new(ValidationMode::FailFast);

        let summary = validate_all(&validator, &records, None).unwrap();
        assert_eq!(summary, Summary { validated: 0, rejected: 3 });
    }

    #[test]
    fn test_outcomes_written_to_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv").to_str().unwrap().to_string();
        let logger = CsvLogger::new(path.clone()).unwrap();

        let mut records = demo_records();
        records.push(json!(null));
        validate_all(&RecordValidator::default(), &records, Some(&logger)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let statuses: Vec<&str> = contents
            .lines()
            .skip(1)
            .map(|row| row.split(',').nth(3).unwrap())
            .collect();
        assert_eq!(statuses, vec!["accepted", "rejected", "malformed"]);
    }
}
