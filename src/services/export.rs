use crate::core::pipeline::{Assignment, ProcessOutcome};
use crate::models::{AnimalRecord, GroupSummary};
use csv::{Writer, WriterBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush CSV buffer: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// All group assignments in one sheet
///
/// Distribution mode lists one animal per row; pairing mode one pair per row.
pub fn groups_csv(outcome: &ProcessOutcome) -> Result<String, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());

    match &outcome.assignment {
        Assignment::Distribution(result) => {
            writer.write_record(["Group Name", "Animal No.", "Animal ID", "Sex", "Genotype", "Age (w)"])?;
            for group in &result.groups {
                for (idx, animal) in group.members.iter().enumerate() {
                    writer.write_record([
                        group.name.clone(),
                        (idx + 1).to_string(),
                        animal.id.clone(),
                        animal.sex.to_string(),
                        animal.genotype.clone(),
                        animal.age_weeks.to_string(),
                    ])?;
                }
            }
        }
        Assignment::Pairing(pairing) => {
            writer.write_record([
                "Group Name",
                "Pair No.",
                "Animal 1 ID",
                "Animal 1 Sex",
                "Animal 1 Genotype",
                "Animal 1 Age (w)",
                "Animal 2 ID",
                "Animal 2 Sex",
                "Animal 2 Genotype",
                "Animal 2 Age (w)",
                "Age Difference",
            ])?;
            for group in &pairing.groups {
                for (idx, pair) in group.members.iter().enumerate() {
                    writer.write_record([
                        group.name.clone(),
                        (idx + 1).to_string(),
                        pair.first.id.clone(),
                        pair.first.sex.to_string(),
                        pair.first.genotype.clone(),
                        pair.first.age_weeks.to_string(),
                        pair.second.id.clone(),
                        pair.second.sex.to_string(),
                        pair.second.genotype.clone(),
                        pair.second.age_weeks.to_string(),
                        pair.age_difference.to_string(),
                    ])?;
                }
            }
        }
    }

    finish(writer)
}

/// Animals left without a partner
pub fn unpaired_csv(unpaired: &[AnimalRecord]) -> Result<String, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(["Animal ID", "Sex", "Genotype", "Age (w)"])?;
    for animal in unpaired {
        writer.write_record([
            animal.id.clone(),
            animal.sex.to_string(),
            animal.genotype.clone(),
            animal.age_weeks.to_string(),
        ])?;
    }
    finish(writer)
}

/// Group totals followed by the per-age breakdown, separated by a blank row
pub fn summary_csv(summaries: &[GroupSummary]) -> Result<String, ExportError> {
    // Two tables of different widths share the sheet
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    writer.write_record(["Group Name", "Number of Animals", "Males", "Females"])?;
    for summary in summaries {
        writer.write_record([
            summary.name.clone(),
            summary.total.to_string(),
            summary.males.to_string(),
            summary.females.to_string(),
        ])?;
    }

    writer.write_record([""])?;
    writer.write_record(["Group Name", "Age (w)", "Males", "Females"])?;
    for summary in summaries {
        for (age, counts) in &summary.age_histogram {
            writer.write_record([
                summary.name.clone(),
                age.to_string(),
                counts.males.to_string(),
                counts.females.to_string(),
            ])?;
        }
    }

    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::{Pipeline, ProcessConfig, ProcessMode};
    use crate::models::{RawTable, Sex};

    fn outcome(genotypes: &[&str]) -> ProcessOutcome {
        let rows = vec![
            vec!["A", "Male", "WT", "10"],
            vec!["B", "Male", "KO", "11"],
            vec!["C", "Female", "WT", "9"],
        ];
        let table = RawTable::new(
            &["id", "sex", "genotype", "age"],
            rows.into_iter().map(|r| r.into_iter().map(String::from).collect()).collect(),
        );
        let config = ProcessConfig {
            group_names: vec!["G1".to_string(), "G2".to_string()],
            age_leeway_weeks: 2,
            selected_genotypes: genotypes.iter().map(|g| g.to_string()).collect(),
            mode: ProcessMode::Auto,
        };
        Pipeline::new().run(&table, config).unwrap()
    }

    #[test]
    fn test_distribution_groups_csv() {
        let csv = groups_csv(&outcome(&["WT"])).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Group Name,Animal No.,Animal ID,Sex,Genotype,Age (w)");
        assert_eq!(lines[1], "G1,1,C,Female,WT,9");
        assert_eq!(lines[2], "G2,1,A,Male,WT,10");
    }

    #[test]
    fn test_pairing_groups_csv() {
        let csv = groups_csv(&outcome(&["WT", "KO"])).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "G1,1,A,Male,WT,10,B,Male,KO,11,1");
    }

    #[test]
    fn test_unpaired_csv() {
        let csv = unpaired_csv(&[AnimalRecord::new("C", Sex::Female, "WT", 9)]).unwrap();
        assert_eq!(csv, "Animal ID,Sex,Genotype,Age (w)\nC,Female,WT,9\n");
    }

    #[test]
    fn test_summary_csv_has_both_tables() {
        let out = outcome(&["WT"]);
        let csv = summary_csv(&out.summaries).unwrap();
        assert!(csv.starts_with("Group Name,Number of Animals,Males,Females\nG1,1,0,1\nG2,1,1,0\n"));
        assert!(csv.contains("Group Name,Age (w),Males,Females\nG1,9,0,1\nG2,10,1,0\n"));
    }
}
