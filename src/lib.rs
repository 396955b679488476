//! # imgbatch
//!
//! Batch image operations on a folder: grayscale copies, thresholded
//! black-and-white copies, a one-image-per-page PDF, and an in-place stretch
//! to a preset aspect ratio.
//!
//! # Architecture
//!
//! Every operation follows the same flow:
//!
//! ```text
//! scan folder ─► per-image work (rayon) ─► BatchReport ─► output / JSON
//! ```
//!
//! Pixel work goes through the [`imaging::ImageBackend`] trait, so batch and
//! compositor logic is tested against a recording mock while production uses
//! the pure-Rust [`imaging::RustBackend`]. Dimension math lives in pure
//! functions with no I/O.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists the image files directly inside a folder |
//! | [`imaging`] | Fit/preset math, aspect presets, backend trait, `image`-crate backend |
//! | [`naming`] | `<stem><suffix>.<ext>` names for converted files |
//! | [`batch`] | Grayscale, black-and-white and resize runners; per-file outcomes |
//! | [`pdf`] | Page placement and PDF assembly with `lopdf` |
//! | [`config`] | Layered `imgbatch.toml` loading, merging and validation |
//! | [`output`] | Plain-text formatting of batch reports |
//! | [`session`] | Interactive menu loop |
//!
//! # Design Decisions
//!
//! ## Failures Are Per File
//!
//! One unreadable image never aborts a batch. Each file gets a
//! [`batch::FileOutcome`]; only folder-level problems (missing folder, no
//! images for a PDF, invalid preset) are errors.
//!
//! ## Fit Policy
//!
//! PDF pages use `contain` fitting by default, so the whole image is always
//! on the page. The `single-axis` policy scales landscape images by width and
//! portrait images by height only; it can overflow the page and logs a
//! warning when it does.
//!
//! ## Resize Is Destructive
//!
//! The preset resize overwrites its inputs and does not preserve aspect
//! ratio. The interactive menu asks for confirmation and the `resize`
//! command requires `--yes`, unless `resize.confirm_overwrite` is off.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pdf;
pub mod scan;
pub mod session;
