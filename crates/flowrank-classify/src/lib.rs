//! Classifier output handling.
//!
//! Parses the structured record an upstream classifier LLM produces,
//! fills defaults so downstream stages never see missing keys, and
//! extracts/validates the embedded search instruction.

pub mod instruction;
pub mod parser;
pub mod types;

pub use instruction::{extract_search_instruction, SearchInstruction};
pub use parser::{parse_classifier_output, validate_record, ParsedClassifier};
pub use types::{Category, ClassifierRecord};
