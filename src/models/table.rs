use serde::{Deserialize, Serialize};

/// Logical columns understood by the normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Sex,
    Genotype,
    Age,
    BirthDate,
    ReferenceDate,
}

impl Column {
    /// Canonical name reported in schema errors
    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "animal_id",
            Column::Sex => "sex",
            Column::Genotype => "genotype",
            Column::Age => "age",
            Column::BirthDate => "dob",
            Column::ReferenceDate => "today",
        }
    }

    /// Normalized header spellings accepted for this column
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Id => &["animal_id", "id", "animal_id_no.", "animal_id_no"],
            Column::Sex => &["sex"],
            Column::Genotype => &["genotype"],
            Column::Age => &["age", "age_(w)", "age_w", "age_weeks"],
            Column::BirthDate => &["dob", "birth_date", "date_of_birth"],
            Column::ReferenceDate => &["today", "reference_date"],
        }
    }
}

/// Lower-case, trim and replace inner spaces with underscores
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Uniform row set produced by the ingestion collaborators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new<H: AsRef<str>>(headers: &[H], rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers.iter().map(|h| normalize_header(h.as_ref())).collect(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first header matching one of the column's aliases
    pub fn column_index(&self, column: Column) -> Option<usize> {
        column
            .aliases()
            .iter()
            .find_map(|alias| self.headers.iter().position(|h| h == alias))
    }

    /// Trimmed cell value; short rows read as empty
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|v| v.trim())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header(" Animal ID No. "), "animal_id_no.");
        assert_eq!(normalize_header("Age (w)"), "age_(w)");
        assert_eq!(normalize_header("\u{feff}Sex"), "sex");
    }

    #[test]
    fn test_column_aliases_resolve() {
        let table = RawTable::new(&["Animal ID No.", "Sex", "Genotype", "Age (w)", "DOB", "Today"], vec![]);
        assert_eq!(table.column_index(Column::Id), Some(0));
        assert_eq!(table.column_index(Column::Age), Some(3));
        assert_eq!(table.column_index(Column::ReferenceDate), Some(5));
    }

    #[test]
    fn test_short_rows_read_empty() {
        let table = RawTable::new(&["id", "sex"], vec![vec!["A".to_string()]]);
        assert_eq!(table.cell(0, 0), "A");
        assert_eq!(table.cell(0, 1), "");
        assert_eq!(table.cell(5, 0), "");
    }
}
