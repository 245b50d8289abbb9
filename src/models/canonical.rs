//! The curated tracking table, one row per offering series.
//!
//! Serde renames pin the exact column headers the spreadsheet has
//! always used, so a saved file opens unchanged in Excel and a
//! hand-edited file loads back without header drift.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    #[serde(rename = "Data Requerimento", default)]
    pub request_date: String,
    #[serde(rename = "Data Registro", default)]
    pub registration_date: String,
    /// Hand-maintained; the pipeline never writes it.
    #[serde(rename = "Data Book", default)]
    pub book_date: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    /// Record key, the join column across every feed.
    #[serde(rename = "Chave", default)]
    pub key: u32,
    #[serde(rename = "Público", default)]
    pub target_public: String,
    #[serde(rename = "Produto", default)]
    pub product: String,
    #[serde(rename = "Emissor", default)]
    pub issuer: String,
    #[serde(rename = "Coordenadores", default)]
    pub coordinators: String,
    #[serde(rename = "Nº Emissão", default)]
    pub issuance_number: String,
    #[serde(rename = "Série", default)]
    pub series: String,
    #[serde(rename = "Espécie", default)]
    pub species: String,
    #[serde(rename = "Rating", default)]
    pub rating: String,
    #[serde(rename = "Volume Inicial", default)]
    pub initial_volume: String,
    #[serde(rename = "Volume Final", default)]
    pub final_volume: String,
    #[serde(rename = "Data de Emissão", default)]
    pub issuance_date: String,
    #[serde(rename = "Data de Vencimento", default)]
    pub maturity_date: String,
    /// Term in years, two decimals, derived from the two dates above.
    #[serde(rename = "Prazo", default)]
    pub term: String,
    #[serde(rename = "Taxa Teto", default)]
    pub ceiling_rate: String,
    #[serde(rename = "Taxa Final", default)]
    pub final_rate: String,
    /// Law 12.431 tax-incentive flag.
    #[serde(rename = "12.431", default)]
    pub incentive_12431: String,
    /// Law 14.801 infrastructure-debenture flag.
    #[serde(rename = "14.801", default)]
    pub incentive_14801: String,
    /// Hand-maintained.
    #[serde(rename = "Venda", default)]
    pub sale: String,
    /// Hand-maintained.
    #[serde(rename = "Venda R$", default)]
    pub sale_amount: String,
    /// Hand-maintained.
    #[serde(rename = "Obs", default)]
    pub notes: String,
    #[serde(rename = "Tipo Oferta", default)]
    pub offer_type: String,
    #[serde(rename = "Regime Distribuição", default)]
    pub distribution_regime: String,
    #[serde(rename = "Bookbuilding", default)]
    pub bookbuilding: String,
    #[serde(rename = "IPO", default)]
    pub initial_offer: String,
    #[serde(rename = "Vasos Comunicantes", default)]
    pub communicating_vessels: String,
    #[serde(rename = "Sustentável", default)]
    pub sustainable: String,
    #[serde(rename = "Tipo Lastro", default)]
    pub backing_type: String,
    #[serde(rename = "Regime Fiduciário", default)]
    pub fiduciary_regime: String,
    #[serde(rename = "Garantias", default)]
    pub guarantees: String,
    #[serde(rename = "Lastro", default)]
    pub backing: String,
    #[serde(rename = "Destinação Recursos", default)]
    pub proceeds_destination: String,
    #[serde(rename = "Agente Fiduciário", default)]
    pub fiduciary_agent: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_survive_round_trip() {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .from_writer(Vec::new());
        let row = CanonicalRow {
            key: 1234,
            status: "Registro Concedido".to_string(),
            product: "CRI".to_string(),
            ..Default::default()
        };
        writer.serialize(&row).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("Data Requerimento;Data Registro;Data Book;Status;Chave"));
        assert!(header.ends_with("Lastro;Destinação Recursos;Agente Fiduciário"));

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(text.as_bytes());
        let back: CanonicalRow = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(back, row);
    }
}
