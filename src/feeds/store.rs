//! Canonical table persistence.
//!
//! One semicolon CSV, written with a UTF-8 BOM so Excel opens it with the
//! right encoding, read back tolerantly. Analysts edit this file between
//! runs; everything it holds for untouched keys must survive a round trip.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::models::CanonicalRow;

use super::FeedError;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Load the stored table. A missing file is an empty table, not an error.
pub fn load_table(path: &Path) -> Result<Vec<CanonicalRow>, FeedError> {
    if !path.exists() {
        info!("No table at {}, starting fresh", path.display());
        return Ok(Vec::new());
    }

    let bytes = fs::read(path)?;
    let decoded = String::from_utf8_lossy(&bytes);
    let content = decoded.strip_prefix('\u{feff}').unwrap_or(&decoded);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: CanonicalRow = result?;
        rows.push(row);
    }
    info!("Table loaded: {} rows", rows.len());
    Ok(rows)
}

/// Write the whole table, replacing the previous file.
pub fn save_table(path: &Path, rows: &[CanonicalRow]) -> Result<(), FeedError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut buffer = Vec::new();
    buffer.extend_from_slice(UTF8_BOM);
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .from_writer(&mut buffer);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    fs::write(path, &buffer)?;
    info!("Table saved: {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(key: u32, series: &str, status: &str) -> CanonicalRow {
        CanonicalRow {
            key,
            series: series.to_string(),
            status: status.to_string(),
            product: "CRI".to_string(),
            issuer: "Fazenda Santa Fé".to_string(),
            final_rate: "CDI + 1,80%".to_string(),
            notes: "conferir; aguarda book".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let rows = vec![
            sample_row(1001, "1", "Registro Concedido"),
            sample_row(1001, "2", "Registro Concedido"),
            sample_row(2002, "", "Oferta Encerrada"),
        ];

        save_table(&path, &rows).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);

        let loaded = load_table(&path).unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn test_semicolon_inside_field_survives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let rows = vec![sample_row(7, "1", "Registro Concedido")];
        save_table(&path, &rows).unwrap();
        let loaded = load_table(&path).unwrap();
        assert_eq!(loaded[0].notes, "conferir; aguarda book");
    }

    #[test]
    fn test_missing_file_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let rows = load_table(&dir.path().join("never-written.csv")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/table.csv");
        save_table(&path, &[sample_row(1, "1", "Registro Concedido")]).unwrap();
        assert!(path.exists());
    }
}
