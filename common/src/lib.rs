//! Marking Scheme Common Library
//!
//! パーサー・検証・取込で共有される型と、I/Oを伴わない処理

pub mod types;
pub mod text;
pub mod validator;

pub use types::{JudgementDescriptor, RawDescriptor, ValidatedDescriptor};
pub use text::{detect_encoding_issues, extract_skill_name_from_filename, normalize};
pub use validator::{
    BatchValidation, InvalidRecord, RecordWarnings, ValidationOutcome, Validator,
    DEFAULT_SOURCE_TAG,
};
