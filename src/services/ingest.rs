use crate::models::{AnimalInput, Column, RawTable};
use csv::ReaderBuilder;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading uploaded sheets
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Empty file")]
    EmptyUpload,

    #[error("Upload of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::EmptyUpload => "empty_upload",
            IngestError::TooLarge { .. } => "upload_too_large",
            IngestError::Csv(_) => "csv_parse_error",
            IngestError::Io { .. } => "io_error",
        }
    }

    pub fn is_user_error(&self) -> bool {
        !matches!(self, IngestError::Io { .. })
    }
}

/// Parse CSV bytes into a raw table
///
/// Headers are normalized, cells trimmed, and ragged rows accepted.
pub fn parse_csv(bytes: &[u8], max_bytes: usize) -> Result<RawTable, IngestError> {
    if bytes.len() > max_bytes {
        return Err(IngestError::TooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(IngestError::EmptyUpload);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    let table = RawTable::new(&headers, rows);
    tracing::info!(rows = table.len(), columns = table.headers.len(), "Parsed uploaded sheet");
    Ok(table)
}

/// Read a CSV file from disk (used for the bundled example dataset)
pub fn load_csv_file(path: &Path, max_bytes: usize) -> Result<RawTable, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_csv(&bytes, max_bytes)
}

/// Build a table from animals sent as JSON
pub fn table_from_animals(animals: &[AnimalInput]) -> RawTable {
    let headers = [
        Column::Id.name(),
        Column::Sex.name(),
        Column::Genotype.name(),
        Column::Age.name(),
        Column::BirthDate.name(),
        Column::ReferenceDate.name(),
    ];
    let rows = animals
        .iter()
        .map(|a| {
            vec![
                a.animal_id.clone(),
                a.sex.clone(),
                a.genotype.clone(),
                a.age.as_ref().map(ToString::to_string).unwrap_or_default(),
                a.dob.clone().unwrap_or_default(),
                a.today.clone().unwrap_or_default(),
            ]
        })
        .collect();
    RawTable::new(&headers, rows)
}

/// Sorted distinct non-empty genotypes found in the table
pub fn available_genotypes(table: &RawTable) -> Vec<String> {
    let Some(col) = table.column_index(Column::Genotype) else {
        return Vec::new();
    };
    (0..table.len())
        .map(|row| table.cell(row, col))
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Rows as header → value maps, for echoing an upload back to the client
pub fn rows_as_maps(table: &RawTable) -> Vec<BTreeMap<String, String>> {
    (0..table.len())
        .map(|row| {
            table
                .headers
                .iter()
                .enumerate()
                .map(|(col, header)| (header.clone(), table.cell(row, col).to_string()))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    #[test]
    fn test_parse_csv_normalizes_headers() {
        let data = "\u{feff}Animal ID No., Sex ,Genotype,Age (w)\nA1, Male ,WT,10\n\nA2,Female,KO\n";
        let table = parse_csv(data.as_bytes(), 1024).unwrap();

        assert_eq!(table.headers, vec!["animal_id_no.", "sex", "genotype", "age_(w)"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 1), "Male");
        assert_eq!(table.cell(1, 3), "");
    }

    #[test]
    fn test_empty_upload() {
        assert!(matches!(parse_csv(b"  \n", 1024), Err(IngestError::EmptyUpload)));
    }

    #[test]
    fn test_too_large() {
        let err = parse_csv(b"id,sex\nA,M\n", 4).unwrap_err();
        assert_eq!(err.kind(), "upload_too_large");
    }

    #[test]
    fn test_table_from_animals() {
        let animals = vec![AnimalInput {
            animal_id: "A1".to_string(),
            sex: "F".to_string(),
            genotype: "KO".to_string(),
            age: Some(CellValue::Integer(7)),
            dob: None,
            today: None,
        }];
        let table = table_from_animals(&animals);
        assert_eq!(table.column_index(Column::Id), Some(0));
        assert_eq!(table.cell(0, 3), "7");
        assert_eq!(table.cell(0, 4), "");
    }

    #[test]
    fn test_available_genotypes_sorted_unique() {
        let data = "id,sex,genotype,age\nA,M,WT,1\nB,M,KO,1\nC,F,WT,1\nD,F,,1\n";
        let table = parse_csv(data.as_bytes(), 1024).unwrap();
        assert_eq!(available_genotypes(&table), vec!["KO", "WT"]);
    }
}
