use std::io::Write;

use super::domain::CandidateRecord;
use crate::scoring::RoleCatalog;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush export: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes one row per candidate with a score column per catalog role.
pub fn export_csv<W: Write>(
    candidates: &[CandidateRecord],
    catalog: &RoleCatalog,
    writer: W,
) -> Result<usize, ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec![
        "id".to_string(),
        "name".to_string(),
        "registered_at".to_string(),
    ];
    header.extend(catalog.names());
    csv.write_record(&header)?;

    for record in candidates {
        let mut row = vec![
            record.id.to_string(),
            record.name.clone(),
            record.registered_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        ];
        row.extend(
            catalog
                .iter()
                .map(|role| format!("{:.2}", record.score_for(&role.name))),
        );
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(candidates.len())
}
