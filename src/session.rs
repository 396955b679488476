//! Interactive menu loop.
//!
//! Running `imgbatch` with no subcommand starts a session: it asks for an
//! input folder, then repeatedly offers the four batch operations on that
//! folder until the user exits.
//!
//! ```text
//! Enter the input directory path : photos
//! Output location: photos
//! What's gonna be:
//! 1. Grayscale
//! 2. Black and White
//! 3. PDF
//! 4. Resize
//! 0. Exit
//! What's gonna be: 3
//! PDF: photos
//! 001 cat.png → page 1
//! PDF saved as: photos/output.pdf (1 page)
//! ```
//!
//! Typing `ex` at a folder prompt quits. End of input quits at any prompt.
//! The folder's `imgbatch.toml` is re-read for every operation, so edits
//! take effect without restarting.
//!
//! The loop is generic over its reader and writer so tests can drive it
//! with scripted input.

use crate::batch::{self, BatchError, BatchReport};
use crate::config;
use crate::imaging::{AspectPreset, ImageBackend};
use crate::output::{format_batch_report, format_menu, format_presets};
use crate::pdf::{self, PdfError};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

const QUIT_WORD: &str = "ex";
const NO_IMAGES: &str = "No images found in the specified folder.";

/// State of one interactive run.
pub struct Session<'a, B: ImageBackend> {
    backend: &'a B,
    /// User config layer; the folder layer is merged on top per operation.
    base: toml::Value,
    folder: Option<PathBuf>,
}

/// What the loop should do after handling one menu choice.
enum Step {
    Continue,
    Exit,
}

impl<'a, B: ImageBackend> Session<'a, B> {
    pub fn new(backend: &'a B, base: toml::Value) -> Self {
        Self {
            backend,
            base,
            folder: None,
        }
    }

    /// The folder chosen at the start of the session, once valid.
    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    /// Run the session to completion.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> io::Result<()> {
        let Some(folder) = self.ask_folder(&mut input, &mut out)? else {
            return Ok(());
        };
        tracing::debug!(folder = %folder.display(), "Session folder selected");
        self.folder = Some(folder.clone());

        loop {
            for line in format_menu(&folder) {
                writeln!(out, "{}", line)?;
            }
            let Some(choice) = prompt(&mut input, &mut out, "What's gonna be: ")? else {
                return Ok(());
            };
            match self.handle_choice(choice.trim(), &folder, &mut input, &mut out)? {
                Step::Continue => {}
                Step::Exit => return Ok(()),
            }
        }
    }

    /// Prompt until an existing directory is entered. `None` means quit.
    fn ask_folder<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        out: &mut W,
    ) -> io::Result<Option<PathBuf>> {
        let mut message = "Enter the input directory path : ";
        loop {
            let Some(answer) = prompt(input, out, message)? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.eq_ignore_ascii_case(QUIT_WORD) {
                writeln!(out, "Take care.")?;
                return Ok(None);
            }
            let path = PathBuf::from(answer);
            if !answer.is_empty() && path.is_dir() {
                return Ok(Some(path));
            }
            writeln!(
                out,
                "The specified directory does not exist. Please enter a valid directory path."
            )?;
            message = "Enter the input directory path (type 'ex' to quit): ";
        }
    }

    fn handle_choice<R: BufRead, W: Write>(
        &self,
        choice: &str,
        folder: &Path,
        input: &mut R,
        out: &mut W,
    ) -> io::Result<Step> {
        if choice == "0" {
            writeln!(out, "Exiting the program.")?;
            return Ok(Step::Exit);
        }
        if !matches!(choice, "1" | "2" | "3" | "4") {
            writeln!(out, "Invalid choice. Please enter 1, 2, 3, 4, or 0.")?;
            return Ok(Step::Continue);
        }

        let config = match config::config_for_folder(&self.base, folder) {
            Ok(config) => config,
            Err(e) => {
                writeln!(out, "Config error: {}", e)?;
                return Ok(Step::Continue);
            }
        };

        let result = match choice {
            "1" => batch::run_grayscale(self.backend, folder, &config),
            "2" => batch::run_black_and_white(self.backend, folder, &config),
            "3" => {
                let report = pdf::images_to_pdf(self.backend, folder, None, &config);
                return write_pdf_result(report, out).map(|_| Step::Continue);
            }
            _ => {
                let Some(preset) = ask_preset(input, out)? else {
                    return Ok(Step::Exit);
                };
                let Some(preset) = preset else {
                    return Ok(Step::Continue);
                };
                if config.resize.confirm_overwrite && !confirm_overwrite(input, out, folder)? {
                    writeln!(out, "Resize cancelled.")?;
                    return Ok(Step::Continue);
                }
                batch::run_resize(self.backend, folder, preset, &config)
            }
        };
        write_batch_result(result, out)?;
        Ok(Step::Continue)
    }
}

/// Write `message` without a newline and read one line.
///
/// Returns `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> io::Result<Option<String>> {
    write!(out, "{}", message)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Ask for a preset number. Outer `None` is end of input; inner `None` is an
/// invalid choice that has already been reported.
fn ask_preset<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<Option<AspectPreset>>> {
    for line in format_presets() {
        writeln!(out, "{}", line)?;
    }
    let Some(answer) = prompt(input, out, "Select format (1-10): ")? else {
        return Ok(None);
    };
    match answer.parse::<AspectPreset>() {
        Ok(preset) => Ok(Some(Some(preset))),
        Err(e) => {
            writeln!(out, "{}", e)?;
            Ok(Some(None))
        }
    }
}

fn confirm_overwrite<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    folder: &Path,
) -> io::Result<bool> {
    let message = format!(
        "Resize overwrites the original images in {}. Continue? [y/N]: ",
        folder.display()
    );
    let answer = prompt(input, out, &message)?.unwrap_or_default();
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES" | "Yes"))
}

fn write_report<W: Write>(report: &BatchReport, out: &mut W) -> io::Result<()> {
    for line in format_batch_report(report) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn write_batch_result<W: Write>(result: Result<BatchReport, BatchError>, out: &mut W) -> io::Result<()> {
    match result {
        Ok(report) => write_report(&report, out),
        Err(BatchError::NoImagesFound(_)) => writeln!(out, "{}", NO_IMAGES),
        Err(e) => {
            tracing::warn!(error = %e, "Batch failed");
            writeln!(out, "Error: {}", e)
        }
    }
}

fn write_pdf_result<W: Write>(result: Result<BatchReport, PdfError>, out: &mut W) -> io::Result<()> {
    match result {
        Ok(report) => write_report(&report, out),
        Err(PdfError::NoImagesFound(_)) => writeln!(out, "{}", NO_IMAGES),
        Err(e) => {
            tracing::warn!(error = %e, "PDF failed");
            writeln!(out, "Error: {}", e)
        }
    }
}
