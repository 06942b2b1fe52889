use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use crate::schema::{MarketSnapshot, ValidationError};

/// Appends one row per validated record to a CSV report
pub struct CsvLogger {
    log_path: String,
}

impl CsvLogger {
    pub fn new(log_path: String) -> Result<Self> {
        // Create CSV file with headers if it doesn't exist
        if !std::path::Path::new(&log_path).exists() {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .open(&log_path)?;
            
            writeln!(
                file,
                "timestamp,record_index,market_id,status,issue_count,fields"
            )?;
        }
        
        Ok(Self { log_path })
    }
    
    /// Log an accepted record
    pub fn log_accepted(&self, index: usize, snapshot: &MarketSnapshot) -> Result<()> {
        self.append(index, snapshot.market_id(), "accepted", 0, "")
    }
    
    /// Log a rejected record with the fields that failed
    pub fn log_rejected(
        &self,
        index: usize,
        market_id: Option<&str>,
        error: &ValidationError,
    ) -> Result<()> {
        let fields = error
            .fields()
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(";");
        
        self.append(
            index,
            market_id.unwrap_or(""),
            "rejected",
            error.issue_count(),
            &fields,
        )
    }
    
    /// Log an entry that was not a JSON object at all
    pub fn log_malformed(&self, index: usize) -> Result<()> {
        self.append(index, "", "malformed", 1, "")
    }
    
    fn append(
        &self,
        index: usize,
        market_id: &str,
        status: &str,
        issue_count: usize,
        fields: &str,
    ) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.log_path)?;
        
        writeln!(
            file,
            "{},{},{},{},{},{}",
            Utc::now().to_rfc3339(),
            index,
            escape(market_id),
            status,
            issue_count,
            fields
        )?;
        
        Ok(())
    }
}

/// Quote a CSV cell if it contains a delimiter, quote or newline
fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use serde_json::json;
    
    fn log_path(dir: &tempfile::TempDir) -> String {
        dir.path().join("validation_log.csv").to_str().unwrap().to_string()
    }
    
    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_path(&dir);
        
        CsvLogger::new(path.clone()).unwrap();
        CsvLogger::new(path.clone()).unwrap();
        
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "timestamp,record_index,market_id,status,issue_count,fields\n");
    }
    
    #[test]
    fn test_logs_accepted_and_rejected_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_path(&dir);
        let logger = CsvLogger::new(path.clone()).unwrap();
        
        let good = json!({
            "market_id": "us-president-2024",
            "timestamp": "2024-01-01T00:00:00Z",
            "yes_price": 0.55,
            "no_price": 0.45,
            "volume_24h": 125000.0,
            "liquidity": 500000.0
        });
        let snapshot = schema::validate(good.as_object().unwrap()).unwrap();
        logger.log_accepted(0, &snapshot).unwrap();
        
        let mut bad = good.as_object().unwrap().clone();
        bad.insert("yes_price".to_string(), json!(1.2));
        bad.insert("odds_change".to_string(), json!(200));
        let err = schema::validate(&bad).unwrap_err();
        logger.log_rejected(1, Some("us-president-2024"), &err).unwrap();
        
        let contents = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = contents.lines().collect();
        
        assert_eq!(rows.len(), 3);
        assert!(rows[1].ends_with(",0,us-president-2024,accepted,0,"));
        assert!(rows[2].ends_with(",1,us-president-2024,rejected,2,yes_price;odds_change"));
    }
    
    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
