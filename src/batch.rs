//! Folder-wide batch operations.
//!
//! Each runner scans one input folder, applies an operation to every matching
//! image in parallel, and returns a [`BatchReport`] with one [`FileOutcome`]
//! per file. A file that fails never aborts the batch: its error is recorded
//! in the report and the remaining files are still processed.
//!
//! | Runner | Files | Writes |
//! |---|---|---|
//! | [`run_grayscale`] | png, jpg, jpeg | `<stem>_grayscale.<ext>` |
//! | [`run_black_and_white`] | png, jpg, jpeg | `<stem>_bw.<ext>` |
//! | [`run_resize`] | png, jpg, jpeg, bmp, gif | overwrites the original |
//!
//! Converters skip files that already carry a conversion suffix, so running
//! a conversion twice does not produce `photo_grayscale_grayscale.png`.
//!
//! Reports keep scan order. Workers run on the global rayon pool, sized by
//! `processing.max_processes`.

use crate::config::AppConfig;
use crate::imaging::{
    AspectPreset, ColorReduction, ImageBackend, PresetError, convert_image, resize_to_preset,
};
use crate::naming::is_derived;
use crate::scan::{self, ImageSet, ScanError};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("No image files found in {0}")]
    NoImagesFound(PathBuf),
    #[error(transparent)]
    Preset(#[from] PresetError),
}

/// Which batch produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Grayscale,
    BlackAndWhite,
    Pdf,
    Resize,
}

impl Operation {
    pub fn label(self) -> &'static str {
        match self {
            Operation::Grayscale => "Grayscale",
            Operation::BlackAndWhite => "Black and White",
            Operation::Pdf => "PDF",
            Operation::Resize => "Resize",
        }
    }
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    /// A file was written (conversion output, or the resized original).
    Written { output: PathBuf },
    /// The image became a page of the PDF (1-based).
    Placed { page: usize },
    /// The file was intentionally left alone.
    Skipped { reason: String },
    /// Processing failed; the batch continued.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl FileOutcome {
    pub fn written(source: &Path, output: PathBuf) -> Self {
        Self {
            source: source.to_path_buf(),
            outcome: Outcome::Written { output },
        }
    }

    pub fn placed(source: &Path, page: usize) -> Self {
        Self {
            source: source.to_path_buf(),
            outcome: Outcome::Placed { page },
        }
    }

    pub fn skipped(source: &Path, reason: impl Into<String>) -> Self {
        Self {
            source: source.to_path_buf(),
            outcome: Outcome::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn failed(source: &Path, error: impl std::fmt::Display) -> Self {
        Self {
            source: source.to_path_buf(),
            outcome: Outcome::Failed {
                error: error.to_string(),
            },
        }
    }
}

/// Per-file results of one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub operation: Operation,
    pub directory: PathBuf,
    pub outcomes: Vec<FileOutcome>,
    /// The single output file, for operations that produce one (PDF).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl BatchReport {
    pub fn new(operation: Operation, directory: &Path) -> Self {
        Self {
            operation,
            directory: directory.to_path_buf(),
            outcomes: Vec::new(),
            output: None,
        }
    }

    /// Files written or placed.
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Written { .. } | Outcome::Placed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Failed { .. }))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Turn a report with no input files into [`BatchError::NoImagesFound`].
    ///
    /// Converters return an empty report for an empty folder; the CLI uses
    /// this to exit non-zero while the interactive menu prints a message.
    pub fn require_inputs(self) -> Result<Self, BatchError> {
        if self.outcomes.is_empty() {
            return Err(BatchError::NoImagesFound(self.directory));
        }
        Ok(self)
    }
}

/// Write a grayscale copy of every png/jpg/jpeg file in `dir`.
pub fn run_grayscale(
    backend: &impl ImageBackend,
    dir: &Path,
    config: &AppConfig,
) -> Result<BatchReport, BatchError> {
    run_conversion(
        backend,
        dir,
        config,
        Operation::Grayscale,
        ColorReduction::Grayscale,
        &config.grayscale.suffix,
    )
}

/// Write a thresholded black-and-white copy of every png/jpg/jpeg file in `dir`.
pub fn run_black_and_white(
    backend: &impl ImageBackend,
    dir: &Path,
    config: &AppConfig,
) -> Result<BatchReport, BatchError> {
    run_conversion(
        backend,
        dir,
        config,
        Operation::BlackAndWhite,
        ColorReduction::Threshold(config.black_and_white.threshold),
        &config.black_and_white.suffix,
    )
}

fn run_conversion(
    backend: &impl ImageBackend,
    dir: &Path,
    config: &AppConfig,
    operation: Operation,
    reduction: ColorReduction,
    suffix: &str,
) -> Result<BatchReport, BatchError> {
    let files = scan::scan_images(dir, ImageSet::Conversion, config.scan.sort_by_name)?;
    let derived = config.derived_suffixes();
    let quality = config.images.quality();

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|source| {
            if is_derived(source, &derived) {
                return FileOutcome::skipped(source, "already a converted file");
            }
            match convert_image(backend, source, reduction, suffix, quality) {
                Ok(output) => FileOutcome::written(source, output),
                Err(e) => {
                    tracing::warn!(source = %source.display(), error = %e, "Conversion failed");
                    FileOutcome::failed(source, e)
                }
            }
        })
        .collect();

    let mut report = BatchReport::new(operation, dir);
    report.outcomes = outcomes;
    tracing::info!(
        operation = operation.label(),
        written = report.succeeded(),
        skipped = report.skipped(),
        failed = report.failed(),
        "Batch finished"
    );
    Ok(report)
}

/// Stretch every png/jpg/jpeg/bmp/gif file in `dir` to `preset`, overwriting
/// the originals.
///
/// Callers are responsible for confirming the overwrite with the user.
pub fn run_resize(
    backend: &impl ImageBackend,
    dir: &Path,
    preset: AspectPreset,
    config: &AppConfig,
) -> Result<BatchReport, BatchError> {
    let files = scan::scan_images(dir, ImageSet::Document, config.scan.sort_by_name)?;
    if files.is_empty() {
        return Err(BatchError::NoImagesFound(dir.to_path_buf()));
    }
    let quality = config.images.quality();

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|source| match resize_to_preset(backend, source, preset, quality) {
            Ok((width, height)) => {
                tracing::debug!(source = %source.display(), width, height, "Resized");
                FileOutcome::written(source, source.clone())
            }
            Err(e) => {
                tracing::warn!(source = %source.display(), error = %e, "Resize failed");
                FileOutcome::failed(source, e)
            }
        })
        .collect();

    let mut report = BatchReport::new(Operation::Resize, dir);
    report.outcomes = outcomes;
    tracing::info!(
        preset = %preset,
        written = report.succeeded(),
        failed = report.failed(),
        "Resize finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use std::fs;
    use tempfile::TempDir;

    fn folder(names: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for name in names {
            fs::write(tmp.path().join(name), b"").unwrap();
        }
        tmp
    }

    fn sorted_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.scan.sort_by_name = true;
        config
    }

    #[test]
    fn grayscale_writes_suffixed_siblings() {
        let tmp = folder(&["a.png", "b.jpg", "c.gif", "notes.txt"]);
        let backend = MockBackend::with_dimensions(&[("a.png", 10, 10), ("b.jpg", 10, 10)]);

        let report = run_grayscale(&backend, tmp.path(), &sorted_config()).unwrap();

        assert_eq!(report.operation, Operation::Grayscale);
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(
            report.outcomes[0].outcome,
            Outcome::Written {
                output: tmp.path().join("a_grayscale.png")
            }
        );
        assert_eq!(
            report.outcomes[1].outcome,
            Outcome::Written {
                output: tmp.path().join("b_grayscale.jpg")
            }
        );
    }

    #[test]
    fn black_and_white_uses_configured_threshold() {
        let tmp = folder(&["a.png"]);
        let backend = MockBackend::with_dimensions(&[("a.png", 10, 10)]);
        let mut config = sorted_config();
        config.black_and_white.threshold = 200;

        let report = run_black_and_white(&backend, tmp.path(), &config).unwrap();

        assert_eq!(report.succeeded(), 1);
        let ops = backend.get_operations();
        assert!(matches!(
            &ops[0],
            RecordedOp::Convert { reduction: ColorReduction::Threshold(200), output, .. }
                if output.ends_with("a_bw.png")
        ));
    }

    #[test]
    fn undecodable_file_fails_without_aborting() {
        let tmp = folder(&["a.png", "broken.png", "c.png"]);
        let backend = MockBackend::with_dimensions(&[("a.png", 10, 10), ("c.png", 10, 10)]);

        let report = run_grayscale(&backend, tmp.path(), &sorted_config()).unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.has_failures());
        assert!(matches!(report.outcomes[1].outcome, Outcome::Failed { .. }));
    }

    #[test]
    fn converted_files_are_skipped() {
        let tmp = folder(&["a.png", "a_grayscale.png", "a_bw.png"]);
        let backend = MockBackend::with_dimensions(&[("a.png", 10, 10)]);

        let report = run_grayscale(&backend, tmp.path(), &sorted_config()).unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(backend.get_operations().len(), 1);
    }

    #[test]
    fn conversion_of_empty_folder_is_empty_report() {
        let tmp = folder(&[]);
        let report = run_grayscale(&MockBackend::new(), tmp.path(), &sorted_config()).unwrap();
        assert!(report.outcomes.is_empty());
        assert!(!report.has_failures());
    }

    #[test]
    fn require_inputs_rejects_empty_report() {
        let tmp = folder(&["notes.txt"]);
        let report = run_black_and_white(&MockBackend::new(), tmp.path(), &sorted_config()).unwrap();

        let err = report.require_inputs().unwrap_err();
        assert!(matches!(&err, BatchError::NoImagesFound(dir) if dir == tmp.path()));
        assert!(err.to_string().contains(&tmp.path().display().to_string()));
    }

    #[test]
    fn require_inputs_keeps_report_with_only_skips() {
        let tmp = folder(&["a_grayscale.png"]);
        let report = run_grayscale(&MockBackend::new(), tmp.path(), &sorted_config())
            .unwrap()
            .require_inputs()
            .unwrap();
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn conversion_of_missing_folder_is_scan_error() {
        let tmp = TempDir::new().unwrap();
        let result = run_grayscale(
            &MockBackend::new(),
            &tmp.path().join("missing"),
            &sorted_config(),
        );
        assert!(matches!(
            result,
            Err(BatchError::Scan(ScanError::DirectoryNotFound(_)))
        ));
    }

    #[test]
    fn resize_overwrites_every_document_image() {
        let tmp = folder(&["a.png", "b.bmp", "c.gif", "d.txt"]);
        let backend = MockBackend::with_dimensions(&[
            ("a.png", 200, 100),
            ("b.bmp", 100, 200),
            ("c.gif", 300, 300),
        ]);
        let preset = AspectPreset::by_id(6).unwrap();

        let report = run_resize(&backend, tmp.path(), preset, &sorted_config()).unwrap();

        assert_eq!(report.succeeded(), 3);
        for outcome in &report.outcomes {
            assert_eq!(
                outcome.outcome,
                Outcome::Written {
                    output: outcome.source.clone()
                }
            );
        }
        let mut resizes: Vec<(u32, u32)> = backend
            .get_operations()
            .into_iter()
            .filter_map(|op| match op {
                RecordedOp::Resize { width, height, .. } => Some((width, height)),
                _ => None,
            })
            .collect();
        resizes.sort();
        // The short side is stretched to match the long one
        assert_eq!(resizes, vec![(200, 200), (200, 200), (300, 300)]);
    }

    #[test]
    fn resize_empty_folder_is_no_images_found() {
        let tmp = folder(&["readme.txt"]);
        let result = run_resize(
            &MockBackend::new(),
            tmp.path(),
            AspectPreset::by_id(1).unwrap(),
            &sorted_config(),
        );
        assert!(matches!(result, Err(BatchError::NoImagesFound(_))));
    }

    #[test]
    fn resize_records_failures() {
        let tmp = folder(&["good.png", "bad.png"]);
        let backend = MockBackend::with_dimensions(&[("good.png", 40, 30)]);

        let report = run_resize(
            &backend,
            tmp.path(),
            AspectPreset::by_id(1).unwrap(),
            &sorted_config(),
        )
        .unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn report_serializes_with_status_tag() {
        let mut report = BatchReport::new(Operation::BlackAndWhite, Path::new("/in"));
        report.outcomes.push(FileOutcome::skipped(Path::new("/in/a_bw.png"), "already a converted file"));
        report.outcomes.push(FileOutcome::failed(Path::new("/in/b.png"), "boom"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["operation"], "black-and-white");
        assert_eq!(json["outcomes"][0]["status"], "skipped");
        assert_eq!(json["outcomes"][0]["source"], "/in/a_bw.png");
        assert_eq!(json["outcomes"][1]["error"], "boom");
        assert!(json.get("output").is_none());
    }
}
