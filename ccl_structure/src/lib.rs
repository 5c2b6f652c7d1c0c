// Internal modules
pub mod catalog;
pub mod config;
pub mod error;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod syntax;
pub mod utils;

// Re-export key types for library consumers
pub use catalog::{CatalogError, IncludeResolver, StructureCatalog};
pub use error::{ParserError, ParserResult};
pub use file_processor::{scan_file, scan_files, FileProcessorError, FileScanReport};
pub use grammar::{DataType, MemberKind, Structure, StructureMember};
pub use syntax::{
    parse_declaration, scan_source, DeclarationOutcome, StructureError, StructureParser,
};
