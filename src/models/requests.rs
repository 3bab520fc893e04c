use crate::core::pipeline::ProcessMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Spreadsheet cell sent as JSON: either a number or text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Number(v) => write!(f, "{}", v),
            CellValue::Text(v) => f.write_str(v),
        }
    }
}

/// One animal row supplied directly in a request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalInput {
    #[serde(rename = "animalId", alias = "animal_id")]
    pub animal_id: String,
    pub sex: String,
    pub genotype: String,
    #[serde(default)]
    pub age: Option<CellValue>,
    #[serde(default, alias = "DOB")]
    pub dob: Option<String>,
    #[serde(default)]
    pub today: Option<String>,
}

/// Request to distribute or pair a cohort
///
/// Animals come from `animals`, from `csv` text, or from the bundled
/// example dataset when `useExample` is set or neither is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProcessRequest {
    #[serde(default)]
    pub animals: Vec<AnimalInput>,
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default, rename = "useExample", alias = "use_example")]
    pub use_example: bool,
    #[validate(range(min = 1, max = 1000))]
    #[serde(default, rename = "numGroups", alias = "num_groups")]
    pub num_groups: Option<usize>,
    #[serde(default, rename = "groupNames", alias = "group_names")]
    pub group_names: Option<Vec<String>>,
    #[serde(default, rename = "ageLeeway", alias = "age_leeway")]
    pub age_leeway: Option<u32>,
    #[validate(length(min = 1))]
    #[serde(default, rename = "selectedGenotypes", alias = "selected_genotypes")]
    pub selected_genotypes: Option<Vec<String>>,
    #[serde(default, rename = "genotypeFilter", alias = "genotype_filter")]
    pub genotype_filter: Option<String>,
    #[serde(default)]
    pub mode: ProcessMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_snake_and_camel_case() {
        let body = r#"{
            "animals": [{"animal_id": "A1", "sex": "M", "genotype": "WT", "age": 10}],
            "numGroups": 2,
            "age_leeway": 3,
            "selectedGenotypes": ["WT"],
            "mode": "pair"
        }"#;
        let req: ProcessRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.animals[0].animal_id, "A1");
        assert_eq!(req.animals[0].age, Some(CellValue::Integer(10)));
        assert_eq!(req.num_groups, Some(2));
        assert_eq!(req.age_leeway, Some(3));
        assert_eq!(req.mode, ProcessMode::Pair);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_genotype_selection_fails_validation() {
        let req = ProcessRequest {
            selected_genotypes: Some(vec![]),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_zero_groups_fails_validation() {
        let req = ProcessRequest {
            num_groups: Some(0),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
