//! Export ranked selection matches to CSV.
//!
//! One row per match, in rank order, easy to open in a spreadsheet.

use std::path::Path;

use crate::domain::SelectionMatch;
use crate::error::AppError;

/// Write selection matches to a CSV file.
pub fn write_matches_csv(path: &Path, matches: &[SelectionMatch]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record([
            "rank",
            "id",
            "name",
            "rpm",
            "h_at_point",
            "deviation_percent",
            "power_at_point",
            "eff_at_point",
            "q_max",
        ])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (rank, m) in matches.iter().enumerate() {
        let p = &m.pump;
        writer
            .write_record([
                (rank + 1).to_string(),
                p.id.map(|id| id.to_string()).unwrap_or_default(),
                p.name.clone(),
                m.rpm.clone().unwrap_or_default(),
                format!("{:.4}", m.h_at_point),
                format!("{:.4}", m.deviation_percent),
                m.power_at_point.map(|v| format!("{v:.4}")).unwrap_or_default(),
                m.eff_at_point.map(|v| format!("{v:.4}")).unwrap_or_default(),
                format!("{:.4}", p.q_max),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PumpRecord;
    use tempfile::TempDir;

    #[test]
    fn writes_header_and_ranked_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("matches.csv");
        let matches = vec![SelectionMatch {
            pump: PumpRecord {
                id: Some(4),
                name: "NB 50-200".to_string(),
                q_max: 60.0,
                ..PumpRecord::default()
            },
            h_at_point: 41.0,
            deviation_percent: 2.5,
            power_at_point: Some(7.25),
            eff_at_point: None,
            rpm: Some("2900".to_string()),
        }];

        write_matches_csv(&path, &matches).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("rank,id,name,rpm,h_at_point,deviation_percent,power_at_point,eff_at_point,q_max")
        );
        assert_eq!(
            lines.next(),
            Some("1,4,NB 50-200,2900,41.0000,2.5000,7.2500,,60.0000")
        );
        assert_eq!(lines.next(), None);
    }
}
