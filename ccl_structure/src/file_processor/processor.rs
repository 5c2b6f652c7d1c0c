//! CCL source file reading with compile-time limits and global logging

use crate::config::constants::compile_time::file_processing::{
    CCL_EXTENSIONS, LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected one of .prg/.inc/.sub/.ccl, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::InvalidExtension { .. } => codes::file_processing::INVALID_EXTENSION,
            Self::FileTooLarge { .. } | Self::TooManyLines { .. } => {
                codes::file_processing::FILE_TOO_LARGE
            }
            Self::EmptyFile => codes::file_processing::EMPTY_FILE,
            Self::PermissionDenied { .. } => codes::file_processing::PERMISSION_DENIED,
            Self::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
            Self::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

/// Kind of CCL source, by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `.prg` program
    Program,
    /// `.inc` include file
    Include,
    /// `.sub` subroutine file
    Subroutine,
    /// `.ccl` generic source
    Generic,
}

impl SourceKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "prg" => Some(Self::Program),
            "inc" => Some(Self::Include),
            "sub" => Some(Self::Subroutine),
            "ccl" => Some(Self::Generic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Program => "program",
            Self::Include => "include",
            Self::Subroutine => "subroutine",
            Self::Generic => "ccl",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical file path
    pub path: PathBuf,
    pub size: u64,
    /// Lower-cased extension, if any
    pub extension: Option<String>,
    pub line_count: usize,
    pub source_kind: Option<SourceKind>,
    pub modified: Option<std::time::SystemTime>,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        human_readable(self.size)
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }

    pub fn is_ccl_file(&self) -> bool {
        self.source_kind.is_some()
    }

    pub fn is_include_file(&self) -> bool {
        self.source_kind == Some(SourceKind::Include)
    }
}

fn human_readable(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Source text and metadata of one processed file
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: std::time::Duration,
}

impl FileProcessingResult {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    /// Only whitespace
    pub fn is_effectively_empty(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Characters per millisecond
    pub fn processing_rate(&self) -> f64 {
        let duration_ms = self.processing_duration.as_secs_f64() * 1000.0;
        if duration_ms > 0.0 {
            self.char_count() as f64 / duration_ms
        } else {
            0.0
        }
    }
}

pub struct FileProcessor {
    /// Reject files without a CCL source extension
    pub require_ccl_extension: bool,
    /// Log size/line/duration metrics on success
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_ccl_extension: false,
            enable_performance_logging: true,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_ccl_extension: prefs.require_ccl_extension,
            enable_performance_logging: prefs.enable_performance_logging,
        }
    }

    pub fn with_ccl_extension_required(mut self, required: bool) -> Self {
        self.require_ccl_extension = required;
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    /// Read a source file after path, size, extension, encoding and
    /// line-count checks
    pub fn process_file(
        &self,
        file_path: &str,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let start_time = std::time::Instant::now();

        log_debug!("Starting file processing", "file" => file_path);

        let path = self.validate_path(file_path)?;
        let mut metadata = self.get_metadata(&path)?;
        self.validate_file(&metadata, file_path)?;
        let source = self.read_file(&path, file_path)?;

        let line_count = source.lines().count();
        if line_count > MAX_LINE_COUNT {
            let error = FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT,
            };
            log_error!(error.error_code(), "File exceeds maximum line count",
                "file" => file_path,
                "lines" => line_count,
                "max_lines" => MAX_LINE_COUNT
            );
            return Err(error);
        }
        metadata.line_count = line_count;

        let result = FileProcessingResult {
            source,
            metadata,
            processing_duration: start_time.elapsed(),
        };

        self.log_processing_success(&result, file_path);

        Ok(result)
    }

    fn log_processing_success(&self, result: &FileProcessingResult, file_path: &str) {
        let duration_ms = format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0);
        let kind = result
            .metadata
            .source_kind
            .map(|k| k.as_str())
            .unwrap_or("unknown");

        if self.enable_performance_logging {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully with performance metrics",
                "file" => file_path,
                "kind" => kind,
                "size_bytes" => result.metadata.size,
                "size_human" => result.metadata.human_readable_size(),
                "lines" => result.metadata.line_count,
                "chars" => result.char_count(),
                "duration_ms" => duration_ms,
                "chars_per_ms" => format!("{:.2}", result.processing_rate()),
                "is_large_file" => result.metadata.is_large_file()
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully",
                "file" => file_path,
                "kind" => kind,
                "lines" => result.metadata.line_count
            );
        }
    }

    fn validate_path(&self, file_path: &str) -> Result<PathBuf, FileProcessorError> {
        if file_path.is_empty() {
            let error = FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "Empty file path provided");
            return Err(error);
        }

        let path = Path::new(file_path);

        if !path.exists() {
            let error = FileProcessorError::FileNotFound {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "File not found", "path" => file_path);
            return Err(error);
        }

        if !path.is_file() {
            let error = FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "Path is not a file", "path" => file_path);
            return Err(error);
        }

        path.canonicalize().map_err(|e| {
            let error = FileProcessorError::IoError {
                message: format!("Failed to resolve path '{}': {}", file_path, e),
            };
            log_error!(error.error_code(), "Failed to canonicalize path",
                "path" => file_path,
                "io_error" => e
            );
            error
        })
    }

    fn get_metadata(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let metadata = fs::metadata(path).map_err(|e| {
            let error = match e.kind() {
                std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                    path: path.display().to_string(),
                },
                _ => FileProcessorError::IoError {
                    message: format!("Failed to read metadata for '{}': {}", path.display(), e),
                },
            };
            log_error!(error.error_code(), "Failed to read file metadata",
                "path" => path.display(),
                "io_error" => e
            );
            error
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());
        let source_kind = extension.as_deref().and_then(SourceKind::from_extension);

        let file_metadata = FileMetadata {
            path: path.to_path_buf(),
            size: metadata.len(),
            extension,
            line_count: 0,
            source_kind,
            modified: metadata.modified().ok(),
        };

        log_debug!("File metadata collected",
            "size_bytes" => file_metadata.size,
            "extension" => file_metadata.extension.as_deref().unwrap_or("none"),
            "is_ccl" => file_metadata.is_ccl_file()
        );

        Ok(file_metadata)
    }

    fn validate_file(
        &self,
        metadata: &FileMetadata,
        file_path: &str,
    ) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            };
            log_error!(error.error_code(), "File exceeds maximum size limit",
                "file" => file_path,
                "size_human" => metadata.human_readable_size(),
                "limit_human" => human_readable(MAX_FILE_SIZE)
            );
            return Err(error);
        }

        if metadata.size == 0 {
            let error = FileProcessorError::EmptyFile;
            log_error!(error.error_code(), "File is empty", "file" => file_path);
            return Err(error);
        }

        if self.require_ccl_extension && !metadata.is_ccl_file() {
            let error = FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            };
            log_error!(error.error_code(), "File does not have a CCL source extension",
                "file" => file_path,
                "extension" => metadata.extension.as_deref().unwrap_or("none"),
                "allowed" => CCL_EXTENSIONS.join(",")
            );
            return Err(error);
        }

        Ok(())
    }

    fn read_file(&self, path: &Path, file_path: &str) -> Result<String, FileProcessorError> {
        fs::read_to_string(path).map_err(|e| {
            let error = match e.kind() {
                std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                    path: path.display().to_string(),
                },
                std::io::ErrorKind::InvalidData => FileProcessorError::InvalidEncoding {
                    path: path.display().to_string(),
                },
                _ => FileProcessorError::IoError {
                    message: format!("Failed to read file '{}': {}", path.display(), e),
                },
            };
            log_error!(error.error_code(), "Failed to read file",
                "file" => file_path,
                "error" => error
            );
            error
        })
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const PROGRAM: &str = "drop program demo go\ncreate program demo\nend go\n";

    #[test]
    fn test_process_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("demo.prg");
        fs::write(&file_path, PROGRAM).unwrap();

        let result = FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap();

        assert_eq!(result.metadata.line_count, 3);
        assert_eq!(result.metadata.source_kind, Some(SourceKind::Program));
        assert!(result.metadata.is_ccl_file());
        assert_eq!(result.char_count(), PROGRAM.chars().count());
        assert!(!result.is_effectively_empty());
    }

    #[test]
    fn test_include_extension_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("STATUS.INC");
        fs::write(&file_path, "1 status = c1\n").unwrap();

        let result = FileProcessor::new()
            .with_ccl_extension_required(true)
            .process_file(file_path.to_str().unwrap())
            .unwrap();

        assert!(result.metadata.is_include_file());
    }

    #[test]
    fn test_file_not_found() {
        match FileProcessor::new().process_file("missing.prg").unwrap_err() {
            FileProcessorError::FileNotFound { .. } => {}
            _ => panic!("Expected FileNotFound error"),
        }
    }

    #[test]
    fn test_directory_is_invalid_path() {
        let dir = tempdir().unwrap();

        match FileProcessor::new()
            .process_file(dir.path().to_str().unwrap())
            .unwrap_err()
        {
            FileProcessorError::InvalidPath { .. } => {}
            _ => panic!("Expected InvalidPath error"),
        }
    }

    #[test]
    fn test_file_size_limit() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("large.prg");
        fs::write(&file_path, "a".repeat((MAX_FILE_SIZE + 1) as usize)).unwrap();

        match FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap_err()
        {
            FileProcessorError::FileTooLarge { size, max_size } => {
                assert!(size > MAX_FILE_SIZE);
                assert_eq!(max_size, MAX_FILE_SIZE);
            }
            _ => panic!("Expected FileTooLarge error"),
        }
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("notes.txt");
        fs::write(&file_path, "content").unwrap();

        let result = FileProcessor::new()
            .with_ccl_extension_required(true)
            .process_file(file_path.to_str().unwrap());

        match result.unwrap_err() {
            FileProcessorError::InvalidExtension { extension } => {
                assert_eq!(extension.as_deref(), Some("txt"));
            }
            _ => panic!("Expected InvalidExtension error"),
        }
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("empty.prg");
        fs::write(&file_path, "").unwrap();

        match FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap_err()
        {
            FileProcessorError::EmptyFile => {}
            _ => panic!("Expected EmptyFile error"),
        }
    }

    #[test]
    fn test_invalid_encoding() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("latin1.prg");
        fs::write(&file_path, [b'a', 0xff, 0xfe, b'\n']).unwrap();

        match FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap_err()
        {
            FileProcessorError::InvalidEncoding { .. } => {}
            _ => panic!("Expected InvalidEncoding error"),
        }
    }

    #[test]
    fn test_too_many_lines() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("many_lines.prg");
        fs::write(&file_path, "x\n".repeat(MAX_LINE_COUNT + 1)).unwrap();

        match FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap_err()
        {
            FileProcessorError::TooManyLines { lines, max_lines } => {
                assert_eq!(lines, MAX_LINE_COUNT + 1);
                assert_eq!(max_lines, MAX_LINE_COUNT);
            }
            _ => panic!("Expected TooManyLines error"),
        }
    }

    #[test]
    fn test_error_methods() {
        let error = FileProcessorError::FileNotFound {
            path: "demo.prg".to_string(),
        };

        assert_eq!(error.error_code().as_str(), "E005");
        assert_eq!(error.category(), "FileProcessing");
        assert_eq!(error.severity(), "Medium");
        assert!(!error.is_recoverable());
        assert!(error.requires_halt());
    }

    #[test]
    fn test_human_readable_size() {
        assert_eq!(human_readable(512), "512 B");
        assert_eq!(human_readable(2048), "2.00 KB");
        assert_eq!(human_readable(LARGE_FILE_THRESHOLD), "1.00 MB");
    }

    #[test]
    fn test_from_preferences() {
        let prefs = FileProcessorPreferences {
            require_ccl_extension: true,
            enable_performance_logging: false,
        };

        let processor = FileProcessor::from_preferences(&prefs);
        assert!(processor.require_ccl_extension);
        assert!(!processor.enable_performance_logging);
    }
}
