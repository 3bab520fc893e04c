// Service exports
pub mod export;
pub mod ingest;

pub use export::{groups_csv, summary_csv, unpaired_csv, ExportError};
pub use ingest::{available_genotypes, load_csv_file, parse_csv, rows_as_maps, table_from_animals, IngestError};
