//! Loader for the regulator's bulk registry CSV.
//!
//! The download alternates between UTF-8 and Latin-1 depending on which
//! backend produced it, so the file is decoded leniently and the product
//! vocabulary downstream carries the resulting replacement-character
//! spellings. Headers may open with a BOM, plain or mojibake.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use crate::models::BulkRow;
use crate::reconcile::{normalize_status, simplify_product};

use super::FeedError;

/// Strip BOM artifacts a spreadsheet export leaves on the first header.
fn clean_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}')
        .replace("ï»¿", "")
        .trim()
        .to_string()
}

/// Read the bulk feed, keeping only rows with a parseable key and a
/// tracked product. The product code and status stored on each row are
/// already simplified and normalized.
pub fn load_bulk(path: &Path) -> Result<Vec<BulkRow>, FeedError> {
    if !path.exists() {
        return Err(FeedError::NotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path)?;
    let decoded = String::from_utf8_lossy(&bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(decoded.as_bytes());

    let columns: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, name)| (clean_header(name), idx))
        .collect();
    for required in ["Numero_Requerimento", "Valor_Mobiliario"] {
        if !columns.contains_key(required) {
            return Err(FeedError::MissingColumn(required.to_string()));
        }
    }

    let field = |record: &StringRecord, name: &str| -> String {
        columns
            .get(name)
            .and_then(|&idx| record.get(idx))
            .unwrap_or("")
            .to_string()
    };

    let mut rows = Vec::new();
    let mut bad_keys = 0usize;
    let mut untracked = 0usize;
    for record in reader.records() {
        let record = record?;

        let raw_key = field(&record, "Numero_Requerimento");
        let Ok(key) = raw_key.trim().parse::<u32>() else {
            debug!("Skipping row with unusable key {raw_key:?}");
            bad_keys += 1;
            continue;
        };

        let raw_product = field(&record, "Valor_Mobiliario");
        let Some(product) = simplify_product(&raw_product) else {
            untracked += 1;
            continue;
        };

        rows.push(BulkRow {
            key,
            issuer_name: field(&record, "Nome_Emissor"),
            product: product.to_string(),
            requested_volume: field(&record, "Valor_Total_Registrado"),
            lead_coordinator: field(&record, "Nome_Lider"),
            request_date: field(&record, "Data_requerimento"),
            registration_date: field(&record, "Data_Registro"),
            status: normalize_status(&field(&record, "Status_Requerimento")),
            incentivized: field(&record, "Titulo_incentivado"),
            debtors: field(&record, "Identificacao_devedores_coobrigados"),
            bookbuilding: field(&record, "Bookbuilding"),
            target_public: field(&record, "Publico_alvo"),
            issuance_number: field(&record, "Emissao"),
            offer_type: field(&record, "Tipo_Oferta"),
            distribution_regime: field(&record, "Regime_distribuicao"),
            initial_offer: field(&record, "Oferta_inicial"),
            communicating_vessels: field(&record, "Oferta_vasos_comunicantes"),
            sustainable: field(&record, "Titulo_classificado_como_sustentavel"),
            backing_type: field(&record, "Tipo_lastro"),
            fiduciary_regime: field(&record, "Regime_fiduciario"),
            guarantees: field(&record, "Descricao_garantias"),
            backing: field(&record, "Descricao_lastro"),
            proceeds_destination: field(&record, "Destinacao_recursos"),
            fiduciary_agent: field(&record, "Agente_fiduciario"),
        });
    }

    info!(
        "Bulk feed: {} tracked rows ({} untracked products, {} unusable keys)",
        rows.len(),
        untracked,
        bad_keys
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_feed(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_loads_and_simplifies() {
        let feed = write_feed(
            "\u{feff}Numero_Requerimento;Status_Requerimento;Valor_Mobiliario;Nome_Emissor;Bookbuilding\n\
             23267;Concedido;Debêntures Simples;ENERGIA ALFA S.A.;N\n\
             23268;Registro Concedido;Ações Ordinárias;OUTRA;S\n",
        );
        let rows = load_bulk(feed.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, 23267);
        assert_eq!(rows[0].product, "Debêntures");
        assert_eq!(rows[0].status, "Registro Concedido");
        assert_eq!(rows[0].issuer_name, "ENERGIA ALFA S.A.");
        assert!(rows[0].skips_bookbuilding());
    }

    #[test]
    fn test_replacement_character_product_still_tracked() {
        let feed = write_feed(
            "Numero_Requerimento;Status_Requerimento;Valor_Mobiliario\n\
             1;Registro Concedido;Deb\u{fffd}ntures\n",
        );
        let rows = load_bulk(feed.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product, "Debêntures");
    }

    #[test]
    fn test_bad_key_skipped() {
        let feed = write_feed(
            "Numero_Requerimento;Status_Requerimento;Valor_Mobiliario\n\
             ;Registro Concedido;CRI\n\
             42;Registro Concedido;CRI\n",
        );
        let rows = load_bulk(feed.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, 42);
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = load_bulk(Path::new("/nonexistent/feed.csv")).unwrap_err();
        assert!(matches!(err, FeedError::NotFound(_)));
    }

    #[test]
    fn test_missing_key_column_is_error() {
        let feed = write_feed("Status_Requerimento;Valor_Mobiliario\nConcedido;CRI\n");
        let err = load_bulk(feed.path()).unwrap_err();
        assert!(matches!(err, FeedError::MissingColumn(_)));
    }
}
