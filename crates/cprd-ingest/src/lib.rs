//! File ingestion for the CPRD pipeline: delimited-table reading, master
//! dictionaries, medication reference tables and extract discovery.

pub mod dictionary;
pub mod discovery;
pub mod error;
pub mod reference;
pub mod table;

pub use dictionary::{
    DiagnosisSchema, ProductSchema, diagnosis_schema, load_diagnosis_dictionary,
    load_product_dictionary, product_schema,
};
pub use discovery::{discover_part_files, part_number};
pub use error::{IngestError, Result};
pub use reference::{load_reference_dir, load_reference_file};
pub use table::{DelimTable, detect_delimiter, read_table, read_table_auto};
