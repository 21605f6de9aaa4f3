// CSV export of interest-over-time tables
use crate::domain::trend::TrendTable;
use anyhow::Context;

pub const CSV_FILENAME: &str = "interest_over_time.csv";

/// `Date` followed by one column per keyword, one line per row.
pub fn interest_csv(table: &TrendTable) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Date".to_string()];
    header.extend(table.keywords().iter().cloned());
    writer.write_record(&header)?;

    for row in table.rows() {
        let mut record = vec![row.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()];
        record.extend(row.values.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }

    writer.into_inner().context("Failed to flush CSV writer")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trend::TrendRow;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_interest_csv() {
        let table = TrendTable::new(
            vec!["rust".into(), "data, science".into()],
            vec![
                TrendRow::new(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(), vec![40.0, 7.5], false),
                TrendRow::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), vec![100.0, 0.0], false),
            ],
        )
        .unwrap();

        let csv = String::from_utf8(interest_csv(&table).unwrap()).unwrap();
        assert_eq!(
            csv,
            "Date,rust,\"data, science\"\n2024-01-01T00:00:00,100,0\n2024-01-02T00:00:00,40,7.5\n"
        );
    }
}
