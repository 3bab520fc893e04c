use crate::core::error::CohortError;
use crate::models::{AnimalRecord, Column, RawTable, Sex};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};

/// Day-first formats accepted for birth and reference dates, ISO last.
/// Two-digit years are tried first so `%Y` does not read them as year 24.
const DATE_FORMATS: &[&str] = &["%d/%m/%y", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// Key used to drop duplicate rows (first occurrence wins)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupKey {
    /// Distribution mode
    Id,
    /// Pairing mode
    IdAndSex,
}

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub dedup: DedupKey,
    /// Keep only these genotypes; `None` keeps everything
    pub genotypes: Option<BTreeSet<String>>,
}

impl NormalizeOptions {
    pub fn new(dedup: DedupKey) -> Self {
        Self {
            dedup,
            genotypes: None,
        }
    }

    pub fn with_genotypes<I, S>(mut self, genotypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genotypes = Some(genotypes.into_iter().map(Into::into).collect());
        self
    }
}

struct ColumnMap {
    id: usize,
    sex: usize,
    genotype: usize,
    age: Option<usize>,
    birth: Option<usize>,
    reference: Option<usize>,
}

impl ColumnMap {
    fn resolve(table: &RawTable) -> Result<Self, CohortError> {
        let id = table.column_index(Column::Id);
        let sex = table.column_index(Column::Sex);
        let genotype = table.column_index(Column::Genotype);
        let age = table.column_index(Column::Age);
        let birth = table.column_index(Column::BirthDate);
        let reference = table.column_index(Column::ReferenceDate);

        let mut missing = Vec::new();
        for (column, found) in [(Column::Id, id), (Column::Sex, sex), (Column::Genotype, genotype)] {
            if found.is_none() {
                missing.push(column.name().to_string());
            }
        }
        // Age may be derived, but only when both dates are there
        if age.is_none() && (birth.is_none() || reference.is_none()) {
            missing.push(Column::Age.name().to_string());
            if birth.is_none() {
                missing.push(Column::BirthDate.name().to_string());
            }
            if reference.is_none() {
                missing.push(Column::ReferenceDate.name().to_string());
            }
        }

        match (id, sex, genotype) {
            (Some(id), Some(sex), Some(genotype)) if missing.is_empty() => Ok(Self {
                id,
                sex,
                genotype,
                age,
                birth,
                reference,
            }),
            _ => Err(CohortError::Schema { missing }),
        }
    }
}

/// Validate, deduplicate and type the rows of a raw table
///
/// Rows are processed in their original order. Nothing is returned unless
/// every remaining row validates.
pub fn normalize(table: &RawTable, options: &NormalizeOptions) -> Result<Vec<AnimalRecord>, CohortError> {
    let columns = ColumnMap::resolve(table)?;

    let mut seen: HashSet<(String, Option<Sex>)> = HashSet::new();
    let mut kept: Vec<usize> = Vec::with_capacity(table.len());

    for row in 0..table.len() {
        let id = table.cell(row, columns.id);
        let sex = Sex::parse(table.cell(row, columns.sex));
        let key = match options.dedup {
            DedupKey::Id => (id.to_string(), None),
            DedupKey::IdAndSex => (id.to_string(), Some(sex)),
        };
        if !seen.insert(key) {
            continue;
        }

        if let Some(genotypes) = &options.genotypes {
            if !genotypes.contains(table.cell(row, columns.genotype)) {
                continue;
            }
        }
        kept.push(row);
    }

    tracing::debug!(
        input_rows = table.len(),
        remaining = kept.len(),
        "Deduplicated and filtered animal rows"
    );

    let derive_age = match columns.age {
        None => true,
        Some(col) => kept.iter().any(|&row| table.cell(row, col).is_empty()),
    };

    let mut records = Vec::with_capacity(kept.len());
    for &row in &kept {
        let id = table.cell(row, columns.id);
        if id.is_empty() {
            return Err(CohortError::MissingValue {
                row: row + 1,
                column: Column::Id.name().to_string(),
            });
        }
        let genotype = table.cell(row, columns.genotype);
        if genotype.is_empty() {
            return Err(CohortError::MissingValue {
                row: row + 1,
                column: Column::Genotype.name().to_string(),
            });
        }

        let age_weeks = if derive_age {
            derived_age(table, row, id, &columns)?
        } else {
            // derive_age is false only when the age column exists
            let col = columns.age.ok_or_else(|| CohortError::Internal("age column vanished".to_string()))?;
            parse_age(id, table.cell(row, col))?
        };

        records.push(AnimalRecord {
            id: id.to_string(),
            sex: Sex::parse(table.cell(row, columns.sex)),
            genotype: genotype.to_string(),
            age_weeks,
        });
    }

    if derive_age {
        tracing::info!("Calculated age in weeks from birth and reference dates");
    }

    Ok(records)
}

fn derived_age(table: &RawTable, row: usize, id: &str, columns: &ColumnMap) -> Result<u32, CohortError> {
    let (birth_col, reference_col) = match (columns.birth, columns.reference) {
        (Some(b), Some(r)) => (b, r),
        _ => {
            let mut missing = Vec::new();
            if columns.birth.is_none() {
                missing.push(Column::BirthDate.name().to_string());
            }
            if columns.reference.is_none() {
                missing.push(Column::ReferenceDate.name().to_string());
            }
            return Err(CohortError::Schema { missing });
        }
    };

    let birth = parse_date(id, Column::BirthDate, table.cell(row, birth_col))?;
    let reference = parse_date(id, Column::ReferenceDate, table.cell(row, reference_col))?;
    age_in_weeks(birth, reference).ok_or_else(|| CohortError::InvalidAge {
        id: id.to_string(),
        value: format!("{} days (born after reference date)", (reference - birth).num_days()),
    })
}

/// Whole weeks between two dates, `None` if the birth date is later
pub fn age_in_weeks(birth: NaiveDate, reference: NaiveDate) -> Option<u32> {
    let days = (reference - birth).num_days();
    if days < 0 {
        return None;
    }
    u32::try_from(days.div_euclid(7)).ok()
}

/// Parse a day-first date cell
pub fn parse_date(id: &str, column: Column, raw: &str) -> Result<NaiveDate, CohortError> {
    let value = raw.trim();
    // Spreadsheet exports often append a midnight time component
    let date_part = value.split_whitespace().next().unwrap_or("");
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        .ok_or_else(|| CohortError::DateParse {
            id: id.to_string(),
            column: column.name().to_string(),
            value: value.to_string(),
        })
}

/// Coerce an age cell to whole weeks
pub fn parse_age(id: &str, raw: &str) -> Result<u32, CohortError> {
    let invalid = || CohortError::InvalidAge {
        id: id.to_string(),
        value: raw.to_string(),
    };

    if let Ok(weeks) = raw.parse::<u32>() {
        return Ok(weeks);
    }
    let value: f64 = raw.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 || value > u32::MAX as f64 {
        return Err(invalid());
    }
    Ok(value.floor() as u32)
}
