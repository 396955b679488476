//! Images-to-PDF compositor.
//!
//! Every image in a folder becomes one page of a single PDF. Pages all share
//! one paper size; each image is shrunk to fit (never enlarged) and centered,
//! so opposite margins are equal.
//!
//! ## Pipeline
//!
//! ```text
//! scan folder ─► identify ─► place (fit + center) ─► encode JPEG ─► append page ─► save
//!                └──────────── parallel, per image ─────────────┘   └─ sequential ─┘
//! ```
//!
//! Per-image preparation runs on the rayon pool; pages are appended in scan
//! order afterwards. An image that cannot be decoded is logged, recorded as
//! failed, and left out. If every image fails the PDF is still written, with
//! zero pages.
//!
//! ## PDF structure
//!
//! Built directly with `lopdf`. Each page holds one image XObject with the
//! JPEG bytes embedded as-is (`DCTDecode`), drawn by a `q cm Do Q` content
//! stream. Coordinates are PDF points with the origin at the lower-left
//! corner. With `pdf.downsample` on (the default) the image is resampled so
//! one pixel maps to one point.

use crate::batch::{BatchReport, FileOutcome, Operation};
use crate::config::{AppConfig, PdfConfig};
use crate::imaging::{
    BackendError, EncodedImage, FitPolicy, ImageBackend, PageImageParams, Quality,
    calculate_centered_offset, calculate_contain_dimensions, calculate_fit_dimensions,
    get_dimensions,
};
use crate::scan::{self, ImageSet, ScanError};
use lopdf::content::{Content, Operation as PdfOp};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("No image files found in {0}")]
    NoImagesFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Page dimensions in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// 210 × 297 mm.
    pub const A4: PageSize = PageSize {
        width: 595.2755905511812,
        height: 841.8897637795277,
    };

    pub fn as_tuple(self) -> (f64, f64) {
        (self.width, self.height)
    }
}

/// Named paper sizes selectable in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PaperSize {
    pub fn page_size(self) -> PageSize {
        match self {
            PaperSize::A3 => PageSize {
                width: 841.8897637795277,
                height: 1190.5511811023623,
            },
            PaperSize::A4 => PageSize::A4,
            PaperSize::A5 => PageSize {
                width: 419.5275590551181,
                height: 595.2755905511812,
            },
            PaperSize::Letter => PageSize {
                width: 612.0,
                height: 792.0,
            },
            PaperSize::Legal => PageSize {
                width: 612.0,
                height: 1008.0,
            },
        }
    }
}

/// Where and how large an image is drawn on its page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Drawn width in points.
    pub width: u32,
    /// Drawn height in points.
    pub height: u32,
    /// Lower-left corner, from the page's lower-left corner.
    pub x: f64,
    pub y: f64,
}

impl Placement {
    /// Whether the drawn image extends past the page edge.
    pub fn overflows(&self, page: PageSize) -> bool {
        self.width as f64 > page.width || self.height as f64 > page.height
    }
}

/// Fit an image of `source` pixels onto `page` and center it.
///
/// Degenerate fits (e.g. a 10000×1 strip) are clamped to at least 1pt per axis.
pub fn place_image(source: (u32, u32), page: PageSize, policy: FitPolicy) -> Placement {
    let bounds = page.as_tuple();
    let (width, height) = match policy {
        FitPolicy::Contain => calculate_contain_dimensions(source, bounds),
        FitPolicy::SingleAxis => calculate_fit_dimensions(source, bounds),
    };
    let (width, height) = (width.max(1), height.max(1));
    let (x, y) = calculate_centered_offset((width, height), bounds);
    Placement {
        width,
        height,
        x,
        y,
    }
}

/// Resolved compositor settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfSettings {
    pub page: PageSize,
    pub fit: FitPolicy,
    pub downsample: bool,
    pub quality: Quality,
}

impl PdfSettings {
    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            page: config.page_size.page_size(),
            fit: config.fit,
            downsample: config.downsample,
            quality: config.quality(),
        }
    }
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self::from_config(&PdfConfig::default())
    }
}

/// An image decoded, placed and encoded, ready to become a page.
#[derive(Debug, Clone)]
pub struct PreparedPage {
    pub source: PathBuf,
    pub placement: Placement,
    pub image: EncodedImage,
}

/// Identify, place and encode one image.
pub fn prepare_page(
    backend: &impl ImageBackend,
    source: &Path,
    settings: &PdfSettings,
) -> Result<PreparedPage, BackendError> {
    let dimensions = get_dimensions(backend, source)?;
    let placement = place_image(dimensions, settings.page, settings.fit);
    if placement.overflows(settings.page) {
        tracing::warn!(
            source = %source.display(),
            width = placement.width,
            height = placement.height,
            "Image overflows the page"
        );
    }

    let (width, height) = if settings.downsample {
        (placement.width, placement.height)
    } else {
        dimensions
    };
    let image = backend.encode_page_image(&PageImageParams {
        source: source.to_path_buf(),
        width,
        height,
        quality: settings.quality,
    })?;

    tracing::debug!(
        source = %source.display(),
        width = placement.width,
        height = placement.height,
        x = placement.x,
        y = placement.y,
        "Placed image"
    );
    Ok(PreparedPage {
        source: source.to_path_buf(),
        placement,
        image,
    })
}

/// A PDF under construction. Pages are appended one at a time; the page tree
/// and catalog are written when the document is finished.
pub struct PdfDocument {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    page_size: PageSize,
}

impl PdfDocument {
    pub fn new(page_size: PageSize) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            page_size,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Append a page showing `image` at `placement`.
    pub fn add_image_page(
        &mut self,
        image: &EncodedImage,
        placement: &Placement,
    ) -> Result<(), PdfError> {
        let xobject = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
                "Filter" => "DCTDecode",
            },
            image.data.clone(),
        );
        let image_id = self.doc.add_object(xobject);

        let content = Content {
            operations: vec![
                PdfOp::new("q", vec![]),
                PdfOp::new(
                    "cm",
                    vec![
                        (placement.width as f32).into(),
                        Object::Integer(0),
                        Object::Integer(0),
                        (placement.height as f32).into(),
                        (placement.x as f32).into(),
                        (placement.y as f32).into(),
                    ],
                ),
                PdfOp::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                PdfOp::new("Q", vec![]),
            ],
        };
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.encode()?));

        let media_box: Vec<Object> = vec![
            Object::Integer(0),
            Object::Integer(0),
            (self.page_size.width as f32).into(),
            (self.page_size.height as f32).into(),
        ];
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media_box,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Write the page tree and catalog. Consumes the builder.
    pub fn finish(mut self) -> Document {
        let kids: Vec<Object> = self.page_ids.iter().map(|id| (*id).into()).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc
    }

    /// Finish the document and write it to `path`.
    pub fn save(self, path: &Path) -> Result<(), PdfError> {
        let mut doc = self.finish();
        doc.save(path)?;
        Ok(())
    }
}

/// A built document with the per-image outcomes, in input order.
pub struct BuiltDocument {
    pub document: PdfDocument,
    pub outcomes: Vec<FileOutcome>,
}

/// Compose one page per image in `paths`, in order.
///
/// `dir` is the folder the images were listed from. Fails with
/// [`PdfError::NoImagesFound`] for it when `paths` is empty. Images that fail
/// to decode are recorded and skipped.
pub fn build_document(
    backend: &impl ImageBackend,
    dir: &Path,
    paths: &[PathBuf],
    settings: &PdfSettings,
) -> Result<BuiltDocument, PdfError> {
    if paths.is_empty() {
        return Err(PdfError::NoImagesFound(dir.to_path_buf()));
    }
    tracing::debug!(dir = %dir.display(), count = paths.len(), "Building PDF");

    let prepared: Vec<Result<PreparedPage, BackendError>> = paths
        .par_iter()
        .map(|path| prepare_page(backend, path, settings))
        .collect();

    let mut document = PdfDocument::new(settings.page);
    let mut outcomes = Vec::with_capacity(paths.len());
    for (path, result) in paths.iter().zip(prepared) {
        match result {
            Ok(page) => {
                document.add_image_page(&page.image, &page.placement)?;
                outcomes.push(FileOutcome::placed(path, document.page_count()));
            }
            Err(e) => {
                tracing::warn!(source = %path.display(), error = %e, "Skipping image");
                outcomes.push(FileOutcome::failed(path, e));
            }
        }
    }

    Ok(BuiltDocument { document, outcomes })
}

/// Where the PDF for `dir` is written unless an explicit path is given.
pub fn pdf_output_path(dir: &Path, config: &PdfConfig) -> PathBuf {
    dir.join(&config.output_name)
}

/// Combine every png/jpg/jpeg/bmp/gif image in `dir` into one PDF.
///
/// The configured `pdf.append_image` is added as the last page when it
/// exists. Writes to `output`, or to `<dir>/<pdf.output_name>`.
pub fn images_to_pdf(
    backend: &impl ImageBackend,
    dir: &Path,
    output: Option<&Path>,
    config: &AppConfig,
) -> Result<BatchReport, PdfError> {
    let mut paths = scan::scan_images(dir, ImageSet::Document, config.scan.sort_by_name)?;

    if let Some(extra) = &config.pdf.append_image {
        if extra.is_file() {
            paths.push(extra.clone());
        } else {
            tracing::warn!(path = %extra.display(), "Append image not found, ignoring");
        }
    }

    let settings = PdfSettings::from_config(&config.pdf);
    let built = build_document(backend, dir, &paths, &settings)?;

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| pdf_output_path(dir, &config.pdf));
    let pages = built.document.page_count();
    built.document.save(&output_path)?;
    tracing::info!(output = %output_path.display(), pages, "PDF written");

    let mut report = BatchReport::new(Operation::Pdf, dir);
    report.outcomes = built.outcomes;
    report.output = Some(output_path);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Outcome;
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

    /// Operands of the `cm` operator on each page, in page order.
    fn page_transforms(path: &Path) -> Vec<Vec<f32>> {
        let doc = Document::load(path).unwrap();
        doc.get_pages()
            .values()
            .map(|page_id| {
                let data = doc.get_page_content(*page_id).unwrap();
                let content = Content::decode(&data).unwrap();
                let cm = content
                    .operations
                    .iter()
                    .find(|op| op.operator == "cm")
                    .unwrap();
                cm.operands.iter().map(|o| o.as_float().unwrap()).collect()
            })
            .collect()
    }

    fn media_box(doc: &Document, page_id: ObjectId) -> Vec<f32> {
        doc.get_object(page_id)
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_float().unwrap())
            .collect()
    }

    // =========================================================================
    // Placement
    // =========================================================================

    #[test]
    fn wide_image_on_a4_is_centered_vertically() {
        let p = place_image((4000, 2000), PageSize::A4, FitPolicy::Contain);
        assert_eq!((p.width, p.height), (595, 297));
        assert!((p.x - 0.1378).abs() < 0.001);
        assert!((p.y - 272.44).abs() < 0.01);
    }

    #[test]
    fn small_image_is_not_enlarged() {
        let p = place_image((200, 100), PageSize::A4, FitPolicy::Contain);
        assert_eq!((p.width, p.height), (200, 100));
        assert!((p.x - (PageSize::A4.width - 200.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn margins_are_equal() {
        let page = PageSize::A4;
        let p = place_image((1000, 3000), page, FitPolicy::Contain);
        let right = page.width - p.x - p.width as f64;
        let top = page.height - p.y - p.height as f64;
        assert!((p.x - right).abs() < 1e-9);
        assert!((p.y - top).abs() < 1e-9);
    }

    #[test]
    fn single_axis_can_overflow() {
        // Barely-landscape image: width-limited, height stays too tall
        let p = place_image((1000, 999), PageSize { width: 500.0, height: 300.0 }, FitPolicy::SingleAxis);
        assert_eq!(p.width, 500);
        assert!(p.overflows(PageSize { width: 500.0, height: 300.0 }));
        assert!(p.y < 0.0);
    }

    #[test]
    fn single_axis_overflow_still_places_the_page() {
        let page = PageSize { width: 500.0, height: 300.0 };
        let backend = MockBackend::with_dimensions(&[("square.png", 1000, 999)]);
        let settings = PdfSettings {
            page,
            fit: FitPolicy::SingleAxis,
            ..PdfSettings::default()
        };

        let prepared = prepare_page(&backend, Path::new("/in/square.png"), &settings).unwrap();

        assert!(prepared.placement.overflows(page));
        assert_eq!((prepared.placement.width, prepared.placement.height), (500, 499));
        assert!(backend.get_operations().iter().any(|op| matches!(
            op,
            RecordedOp::EncodePage { width: 500, height: 499, .. }
        )));
    }

    #[test]
    fn contain_never_overflows() {
        let page = PageSize { width: 500.0, height: 300.0 };
        let p = place_image((1000, 999), page, FitPolicy::Contain);
        assert!(!p.overflows(page));
    }

    #[test]
    fn degenerate_strip_gets_at_least_one_point() {
        let p = place_image((100_000, 1), PageSize::A4, FitPolicy::Contain);
        assert_eq!(p.height, 1);
    }

    #[test]
    fn paper_sizes_are_portrait() {
        for paper in [
            PaperSize::A3,
            PaperSize::A4,
            PaperSize::A5,
            PaperSize::Letter,
            PaperSize::Legal,
        ] {
            let size = paper.page_size();
            assert!(size.height > size.width, "{paper:?}");
        }
        assert_eq!(PaperSize::default().page_size(), PageSize::A4);
    }

    // =========================================================================
    // build_document
    // =========================================================================

    #[test]
    fn build_empty_list_is_no_images_found() {
        let result = build_document(
            &MockBackend::new(),
            Path::new("/in"),
            &[],
            &PdfSettings::default(),
        );
        let err = result.err().unwrap();
        assert!(matches!(&err, PdfError::NoImagesFound(dir) if dir == Path::new("/in")));
        assert_eq!(err.to_string(), "No image files found in /in");
    }

    #[test]
    fn build_skips_undecodable_images() {
        let backend = MockBackend::with_dimensions(&[("a.png", 100, 100), ("c.jpg", 50, 80)]);
        let paths: Vec<PathBuf> = ["/in/a.png", "/in/b.png", "/in/c.jpg"]
            .iter()
            .map(PathBuf::from)
            .collect();

        let built =
            build_document(&backend, Path::new("/in"), &paths, &PdfSettings::default()).unwrap();

        assert_eq!(built.document.page_count(), 2);
        assert_eq!(built.outcomes[0].outcome, Outcome::Placed { page: 1 });
        assert!(matches!(built.outcomes[1].outcome, Outcome::Failed { .. }));
        assert_eq!(built.outcomes[2].outcome, Outcome::Placed { page: 2 });
    }

    #[test]
    fn downsample_encodes_at_placed_size() {
        let backend = MockBackend::with_dimensions(&[("a.png", 4000, 2000)]);
        build_document(
            &backend,
            Path::new("/in"),
            &[PathBuf::from("/in/a.png")],
            &PdfSettings::default(),
        )
        .unwrap();

        assert!(backend.get_operations().iter().any(|op| matches!(
            op,
            RecordedOp::EncodePage { width: 595, height: 297, quality: 90, .. }
        )));
    }

    #[test]
    fn without_downsample_encodes_full_resolution() {
        let backend = MockBackend::with_dimensions(&[("a.png", 4000, 2000)]);
        let settings = PdfSettings {
            downsample: false,
            ..PdfSettings::default()
        };
        build_document(
            &backend,
            Path::new("/in"),
            &[PathBuf::from("/in/a.png")],
            &settings,
        )
        .unwrap();

        assert!(backend.get_operations().iter().any(|op| matches!(
            op,
            RecordedOp::EncodePage { width: 4000, height: 2000, .. }
        )));
    }

    // =========================================================================
    // images_to_pdf
    // =========================================================================

    #[test]
    fn writes_one_page_per_valid_image() {
        let tmp = folder(&["a.png", "b.png", "c.jpg", "d.txt"]);
        let backend = MockBackend::with_dimensions(&[
            ("a.png", 4000, 2000),
            ("c.jpg", 100, 100),
        ]);

        let report = images_to_pdf(&backend, tmp.path(), None, &sorted_config()).unwrap();

        let output = tmp.path().join("output.pdf");
        assert_eq!(report.output.as_deref(), Some(output.as_path()));
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);

        let doc = Document::load(&output).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);
        for page_id in pages.values() {
            let mb = media_box(&doc, *page_id);
            assert!((mb[2] - 595.2756).abs() < 0.01);
            assert!((mb[3] - 841.8898).abs() < 0.01);
        }
    }

    #[test]
    fn pages_are_centered() {
        let tmp = folder(&["a.png", "b.png"]);
        let backend = MockBackend::with_dimensions(&[("a.png", 4000, 2000), ("b.png", 200, 100)]);

        images_to_pdf(&backend, tmp.path(), None, &sorted_config()).unwrap();

        let transforms = page_transforms(&tmp.path().join("output.pdf"));
        assert_eq!(transforms.len(), 2);

        let a = &transforms[0];
        assert_eq!((a[0], a[3]), (595.0, 297.0));
        assert!(a[4].abs() < 0.2);
        assert!((a[5] - 272.44).abs() < 0.01);

        let b = &transforms[1];
        assert_eq!((b[0], b[3]), (200.0, 100.0));
        assert!((b[4] - 197.64).abs() < 0.01);
        assert!((b[5] - 370.94).abs() < 0.01);
    }

    #[test]
    fn empty_folder_writes_nothing() {
        let tmp = folder(&["notes.txt"]);
        let result = images_to_pdf(&MockBackend::new(), tmp.path(), None, &sorted_config());

        assert!(matches!(result, Err(PdfError::NoImagesFound(_))));
        assert!(!tmp.path().join("output.pdf").exists());
    }

    #[test]
    fn all_images_failing_still_writes_empty_pdf() {
        let tmp = folder(&["a.png", "b.gif"]);
        let report = images_to_pdf(&MockBackend::new(), tmp.path(), None, &sorted_config()).unwrap();

        assert_eq!(report.failed(), 2);
        let doc = Document::load(tmp.path().join("output.pdf")).unwrap();
        assert!(doc.get_pages().is_empty());
    }

    #[test]
    fn explicit_output_path_and_name() {
        let tmp = folder(&["a.png"]);
        let out_dir = TempDir::new().unwrap();
        let explicit = out_dir.path().join("album.pdf");
        let backend = MockBackend::with_dimensions(&[("a.png", 10, 10)]);

        images_to_pdf(&backend, tmp.path(), Some(&explicit), &sorted_config()).unwrap();
        assert!(explicit.exists());
        assert!(!tmp.path().join("output.pdf").exists());

        let mut config = sorted_config();
        config.pdf.output_name = "named.pdf".into();
        images_to_pdf(&backend, tmp.path(), None, &config).unwrap();
        assert!(tmp.path().join("named.pdf").exists());
    }

    #[test]
    fn append_image_becomes_last_page() {
        let tmp = folder(&["a.png"]);
        let stamp_dir = TempDir::new().unwrap();
        let stamp = stamp_dir.path().join("stamp.png");
        fs::write(&stamp, b"").unwrap();
        let backend = MockBackend::with_dimensions(&[("a.png", 10, 10), ("stamp.png", 20, 20)]);

        let mut config = sorted_config();
        config.pdf.append_image = Some(stamp.clone());
        let report = images_to_pdf(&backend, tmp.path(), None, &config).unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.outcomes[1].source, stamp);
        assert_eq!(report.outcomes[1].outcome, Outcome::Placed { page: 2 });
    }

    #[test]
    fn missing_append_image_is_ignored() {
        let tmp = folder(&["a.png"]);
        let backend = MockBackend::with_dimensions(&[("a.png", 10, 10)]);
        let mut config = sorted_config();
        config.pdf.append_image = Some(tmp.path().join("nope.png"));

        let report = images_to_pdf(&backend, tmp.path(), None, &config).unwrap();
        assert_eq!(report.outcomes.len(), 1);
    }

    #[test]
    fn append_image_alone_counts_as_input() {
        let tmp = folder(&[]);
        let stamp = tmp.path().join("stamp.txt");
        fs::write(&stamp, b"").unwrap();
        let backend = MockBackend::with_dimensions(&[("stamp.txt", 10, 10)]);
        let mut config = sorted_config();
        config.pdf.append_image = Some(stamp);

        let report = images_to_pdf(&backend, tmp.path(), None, &config).unwrap();
        assert_eq!(report.succeeded(), 1);
    }
}
