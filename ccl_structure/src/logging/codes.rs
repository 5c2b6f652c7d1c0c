//! Error and success codes with their classification metadata
//!
//! Every error enum in the workspace maps its variants onto one of these
//! codes, and the registry below answers severity/category/halt questions
//! for both the enums and the logged events.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Declaration text (coalescing and item tokenizing) error codes
pub mod declaration {
    use super::Code;

    pub const UNBALANCED_PARENTHESES: Code = Code::new("E100");
    pub const UNRECOGNIZED_ITEM: Code = Code::new("E101");
    pub const INVALID_LEVEL: Code = Code::new("E102");
    pub const MISSING_TYPE_TOKEN: Code = Code::new("E103");
    pub const UNTERMINATED_OCCURS: Code = Code::new("E104");
    pub const DECLARATION_TOO_LONG: Code = Code::new("E105");
    pub const MISSING_DECLARATION_NAME: Code = Code::new("E106");
    pub const NAME_TOO_LONG: Code = Code::new("E107");
}

/// Data type resolution error codes
pub mod data_type {
    use super::Code;

    pub const INVALID_DATA_TYPE: Code = Code::new("E120");
    pub const INVALID_CHARACTER_LENGTH: Code = Code::new("E121");
}

/// Structure building error codes
pub mod structure {
    use super::Code;

    pub const ORPHANED_MEMBER: Code = Code::new("E140");
    pub const INVALID_OCCURS_CLAUSE: Code = Code::new("E141");
    pub const LEVEL_TOO_DEEP: Code = Code::new("E142");
    pub const LEVEL_INVARIANT_VIOLATION: Code = Code::new("E143");
    pub const INVALID_SUBROUTINE: Code = Code::new("E145");
    pub const INVALID_DOCUMENTATION: Code = Code::new("E146");
}

/// Structure catalog error codes
pub mod catalog {
    use super::Code;

    pub const UNKNOWN_STRUCTURE: Code = Code::new("E160");
    pub const INCLUDE_CYCLE: Code = Code::new("E161");
    pub const UNRESOLVED_INCLUDE: Code = Code::new("E162");
}

/// Runtime record error codes
pub mod record {
    use super::Code;

    pub const FIELD_NOT_FOUND: Code = Code::new("E200");
    pub const TYPE_MISMATCH: Code = Code::new("E201");
    pub const VALUE_OUT_OF_RANGE: Code = Code::new("E202");
    pub const VALUE_TOO_LONG: Code = Code::new("E203");
    pub const NOT_BOOLEAN: Code = Code::new("E204");
    pub const INDEX_OUT_OF_BOUNDS: Code = Code::new("E205");
    pub const UNRESOLVED_INCLUDE_MEMBER: Code = Code::new("E206");
    pub const DUPLICATE_FIELD: Code = Code::new("E207");
    pub const LIST_CAPACITY_EXCEEDED: Code = Code::new("E208");
    pub const INVALID_FIELD_DEFINITION: Code = Code::new("E209");
}

/// Reply ingestion error codes
pub mod reply {
    use super::Code;

    pub const MALFORMED_JSON: Code = Code::new("E220");
    pub const MISSING_RECORD: Code = Code::new("E221");
    pub const MISSING_FIELD: Code = Code::new("E222");
    pub const INVALID_DATE: Code = Code::new("E223");
    pub const LIST_SIZE_MISMATCH: Code = Code::new("E224");
    pub const INVALID_VALUE: Code = Code::new("E225");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");

    pub const DECLARATION_COALESCED: Code = Code::new("I020");
    pub const STRUCTURE_BUILT: Code = Code::new("I040");
    pub const SOURCE_SCAN_COMPLETE: Code = Code::new("I041");
    pub const CATALOG_UPDATED: Code = Code::new("I060");

    pub const RECORD_CREATED: Code = Code::new("I080");
    pub const SETTER_COMMANDS_GENERATED: Code = Code::new("I081");
    pub const REPLY_INGESTED: Code = Code::new("I082");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();
        let mut add = |code: Code,
                       category: &'static str,
                       severity: Severity,
                       recoverable: bool,
                       requires_halt: bool,
                       description: &'static str,
                       recommended_action: &'static str| {
            registry.insert(
                code.as_str(),
                ErrorMetadata {
                    code: code.as_str(),
                    category,
                    severity,
                    recoverable,
                    requires_halt,
                    description,
                    recommended_action,
                },
            );
        };

        // System
        add(
            system::INTERNAL_ERROR,
            "System",
            Severity::Critical,
            false,
            true,
            "Critical internal error",
            "File a bug report with the failing declaration",
        );
        add(
            system::INITIALIZATION_FAILURE,
            "System",
            Severity::Critical,
            false,
            true,
            "Logging or configuration initialization failure",
            "Check CCL_* environment variables and configuration files",
        );

        // File processing
        add(
            file_processing::FILE_NOT_FOUND,
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "File not found at specified path",
            "Check file path and ensure file exists",
        );
        add(
            file_processing::INVALID_EXTENSION,
            "FileProcessing",
            Severity::Low,
            true,
            false,
            "File does not have a CCL source extension",
            "Use a .prg, .inc, .sub or .ccl file or disable the extension requirement",
        );
        add(
            file_processing::FILE_TOO_LARGE,
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "File exceeds maximum size or line limit",
            "Split the source file",
        );
        add(
            file_processing::EMPTY_FILE,
            "FileProcessing",
            Severity::Low,
            true,
            false,
            "File is empty",
            "Provide a file with content",
        );
        add(
            file_processing::PERMISSION_DENIED,
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "Permission denied accessing file",
            "Check file permissions",
        );
        add(
            file_processing::INVALID_ENCODING,
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "File is not valid UTF-8",
            "Convert the source file to UTF-8",
        );
        add(
            file_processing::IO_ERROR,
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "I/O error reading file",
            "Check disk and file system health",
        );
        add(
            file_processing::INVALID_PATH,
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "Path is empty or not a regular file",
            "Provide the path of a regular file",
        );

        // Declaration text
        add(
            declaration::UNBALANCED_PARENTHESES,
            "Declaration",
            Severity::High,
            true,
            false,
            "Declaration parentheses never balance before end of input",
            "Close the record declaration with ')'",
        );
        add(
            declaration::UNRECOGNIZED_ITEM,
            "Declaration",
            Severity::High,
            true,
            false,
            "Text inside a declaration is neither a leveled item nor an include",
            "Write items as '<level> <name> = <type>' or '%i <path>'",
        );
        add(
            declaration::INVALID_LEVEL,
            "Declaration",
            Severity::High,
            true,
            false,
            "Level number is not a valid integer",
            "Use small positive level numbers",
        );
        add(
            declaration::MISSING_TYPE_TOKEN,
            "Declaration",
            Severity::High,
            true,
            false,
            "Item has '=' but no type token",
            "Add a type after '=' (e.g. vc, i4, c25)",
        );
        add(
            declaration::UNTERMINATED_OCCURS,
            "Declaration",
            Severity::High,
            true,
            false,
            "Occurs clause is missing its closing ']'",
            "Close the occurs clause",
        );
        add(
            declaration::DECLARATION_TOO_LONG,
            "Declaration",
            Severity::Medium,
            true,
            false,
            "Declaration exceeds the maximum coalesced length",
            "Check for a missing ')'",
        );
        add(
            declaration::MISSING_DECLARATION_NAME,
            "Declaration",
            Severity::High,
            true,
            false,
            "Declaration has no record name before '('",
            "Write the declaration as 'record <name> ( ... )'",
        );
        add(
            declaration::NAME_TOO_LONG,
            "Declaration",
            Severity::Medium,
            true,
            false,
            "Member name or include path exceeds the maximum length",
            "Shorten the name",
        );

        // Data types
        add(
            data_type::INVALID_DATA_TYPE,
            "DataType",
            Severity::High,
            true,
            false,
            "Unrecognized primitive type token",
            "Use one of the CCL primitive types (vc, i2, i4, f8, dq8, cN, ...)",
        );
        add(
            data_type::INVALID_CHARACTER_LENGTH,
            "DataType",
            Severity::High,
            true,
            false,
            "Character length is zero or not a number",
            "Use a positive length such as c25",
        );

        // Structure building
        add(
            structure::ORPHANED_MEMBER,
            "Structure",
            Severity::High,
            true,
            false,
            "Nested member has no open parent to attach to",
            "Start the declaration at level 1",
        );
        add(
            structure::INVALID_OCCURS_CLAUSE,
            "Structure",
            Severity::High,
            true,
            false,
            "Occurs clause is neither '*' nor an integer count",
            "Use [*] for growable lists or [N] for fixed lists",
        );
        add(
            structure::LEVEL_TOO_DEEP,
            "Structure",
            Severity::Medium,
            true,
            false,
            "Level number exceeds the maximum nesting level",
            "Flatten the declaration",
        );
        add(
            structure::LEVEL_INVARIANT_VIOLATION,
            "Structure",
            Severity::Critical,
            false,
            true,
            "A child member's level is not greater than its parent's",
            "File a bug report with the failing declaration",
        );
        add(
            structure::INVALID_SUBROUTINE,
            "Structure",
            Severity::High,
            true,
            false,
            "Subroutine declaration could not be parsed",
            "Check the subroutine declaration syntax",
        );
        add(
            structure::INVALID_DOCUMENTATION,
            "Structure",
            Severity::Low,
            true,
            false,
            "Documentation block could not be parsed",
            "Check the documentation comment syntax",
        );

        // Catalog
        add(
            catalog::UNKNOWN_STRUCTURE,
            "Catalog",
            Severity::Medium,
            true,
            false,
            "No structure with that name in the catalog",
            "Load the source that declares the structure",
        );
        add(
            catalog::INCLUDE_CYCLE,
            "Catalog",
            Severity::High,
            true,
            false,
            "Include resolution revisits an include already being expanded",
            "Remove the circular include",
        );
        add(
            catalog::UNRESOLVED_INCLUDE,
            "Catalog",
            Severity::Medium,
            true,
            false,
            "Include resolver returned nothing for an include path",
            "Make the include available to the resolver",
        );

        // Runtime records
        add(
            record::FIELD_NOT_FOUND,
            "Record",
            Severity::High,
            true,
            false,
            "Record has no field with that name",
            "Check the field name against the record structure",
        );
        add(
            record::TYPE_MISMATCH,
            "Record",
            Severity::High,
            true,
            false,
            "Accessor does not match the field's declared type",
            "Use the accessor for the field's declared type",
        );
        add(
            record::VALUE_OUT_OF_RANGE,
            "Record",
            Severity::High,
            true,
            false,
            "Value does not fit the field's integer width",
            "Use a value within the field type's range",
        );
        add(
            record::VALUE_TOO_LONG,
            "Record",
            Severity::High,
            true,
            false,
            "Value is longer than the character field",
            "Truncate the value or widen the field",
        );
        add(
            record::NOT_BOOLEAN,
            "Record",
            Severity::Medium,
            true,
            false,
            "I2 value is neither 0 nor 1",
            "Read the field with the I2 accessor",
        );
        add(
            record::INDEX_OUT_OF_BOUNDS,
            "Record",
            Severity::High,
            true,
            false,
            "List index outside the list",
            "Check the list size before indexing",
        );
        add(
            record::UNRESOLVED_INCLUDE_MEMBER,
            "Record",
            Severity::High,
            true,
            false,
            "Structure still contains an unresolved include",
            "Resolve includes through the structure catalog first",
        );
        add(
            record::DUPLICATE_FIELD,
            "Record",
            Severity::High,
            true,
            false,
            "Two fields of one structure share a name",
            "Rename one of the fields",
        );
        add(
            record::LIST_CAPACITY_EXCEEDED,
            "Record",
            Severity::Medium,
            true,
            false,
            "List exceeds the number of records it may hold",
            "Check the reply for runaway lists or reduce nested occurs counts",
        );
        add(
            record::INVALID_FIELD_DEFINITION,
            "Record",
            Severity::High,
            true,
            false,
            "Field definition cannot hold any value",
            "Give character fields a positive length",
        );

        // Reply ingestion
        add(
            reply::MALFORMED_JSON,
            "Reply",
            Severity::High,
            true,
            false,
            "Reply is not valid JSON",
            "Check the script's JSON output",
        );
        add(
            reply::MISSING_RECORD,
            "Reply",
            Severity::High,
            true,
            false,
            "Reply JSON does not contain the record",
            "Check the record name used by the script",
        );
        add(
            reply::MISSING_FIELD,
            "Reply",
            Severity::High,
            true,
            false,
            "Reply JSON lacks a field the structure declares",
            "Keep the reply structure in sync with the script",
        );
        add(
            reply::INVALID_DATE,
            "Reply",
            Severity::Medium,
            true,
            false,
            "Date value does not match /Date(...)/",
            "Emit dates with CCL's JSON date format",
        );
        add(
            reply::LIST_SIZE_MISMATCH,
            "Reply",
            Severity::High,
            true,
            false,
            "Fixed-length list size differs from the reply",
            "Keep the fixed list size in sync with the script",
        );
        add(
            reply::INVALID_VALUE,
            "Reply",
            Severity::High,
            true,
            false,
            "Reply value has the wrong JSON type for its field",
            "Check the field's declared type",
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_code_is_registered() {
        let codes = [
            declaration::UNBALANCED_PARENTHESES,
            declaration::UNRECOGNIZED_ITEM,
            data_type::INVALID_DATA_TYPE,
            structure::ORPHANED_MEMBER,
            structure::INVALID_OCCURS_CLAUSE,
            catalog::INCLUDE_CYCLE,
            record::FIELD_NOT_FOUND,
            record::NOT_BOOLEAN,
            reply::INVALID_DATE,
        ];

        for code in codes {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_category("E120"), "DataType");
        assert_eq!(get_severity("E143"), Severity::Critical);
        assert!(requires_halt("E143"));
        assert!(is_recoverable("E101"));
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("Z999"), "Unknown error");
        assert_eq!(get_category("Z999"), "Unknown");
        assert!(!requires_halt("Z999"));
    }
}
