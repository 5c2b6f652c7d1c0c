//! File processing for CCL sources
//!
//! Reads source files under compile-time size and line limits, and scans
//! them for record declarations with the file set as the logging context.

mod processor;

use crate::config::constants::compile_time::file_processing::{LARGE_FILE_THRESHOLD, MAX_FILE_SIZE};
use crate::config::runtime::{DeclarationPreferences, FileProcessorPreferences};
use crate::logging;
use crate::syntax::{scan_source_with_parser, DeclarationOutcome, StructureParser};
use crate::{log_info, log_success};
use std::path::PathBuf;

pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError, SourceKind,
};

/// Declarations found in one file
#[derive(Debug, Clone)]
pub struct FileScanReport {
    pub metadata: FileMetadata,
    pub outcomes: Vec<DeclarationOutcome>,
}

impl FileScanReport {
    pub fn structure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.structure_count()
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }
}

/// Read a file with default settings
pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

pub fn get_large_file_threshold() -> u64 {
    LARGE_FILE_THRESHOLD
}

/// Read `file_path` and parse every record declaration in it, using the
/// environment's preferences. Errors logged meanwhile are attributed to the
/// file.
pub fn scan_file(file_path: &str) -> Result<FileScanReport, FileProcessorError> {
    scan_file_with(
        file_path,
        &FileProcessor::from_preferences(&FileProcessorPreferences::default()),
        &StructureParser::with_preferences(DeclarationPreferences::default()),
    )
}

pub fn scan_file_with(
    file_path: &str,
    processor: &FileProcessor,
    parser: &StructureParser,
) -> Result<FileScanReport, FileProcessorError> {
    scan_file_with_id(file_path, 0, processor, parser)
}

/// Scan several files in order. A file that cannot be read is reported in
/// place and does not stop the batch.
pub fn scan_files(
    file_paths: &[&str],
) -> Vec<(String, Result<FileScanReport, FileProcessorError>)> {
    let processor = FileProcessor::from_preferences(&FileProcessorPreferences::default());
    let parser = StructureParser::new();

    let reports: Vec<_> = file_paths
        .iter()
        .enumerate()
        .map(|(file_id, path)| {
            (
                path.to_string(),
                scan_file_with_id(path, file_id, &processor, &parser),
            )
        })
        .collect();

    log_info!("Batch scan complete",
        "files" => reports.len(),
        "unreadable" => reports.iter().filter(|(_, r)| r.is_err()).count()
    );

    reports
}

fn scan_file_with_id(
    file_path: &str,
    file_id: usize,
    processor: &FileProcessor,
    parser: &StructureParser,
) -> Result<FileScanReport, FileProcessorError> {
    logging::with_file_context(PathBuf::from(file_path), file_id, || {
        let file = processor.process_file(file_path)?;
        let outcomes = scan_source_with_parser(&file.source, parser);

        let report = FileScanReport {
            metadata: file.metadata,
            outcomes,
        };

        log_success!(
            crate::logging::codes::success::SOURCE_SCAN_COMPLETE,
            "File scanned for record declarations",
            "file" => file_path,
            "structures" => report.structure_count(),
            "failures" => report.failure_count()
        );

        Ok(report)
    })
}
