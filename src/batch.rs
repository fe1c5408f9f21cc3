use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::watermark::compositor::OUTPUT_SUFFIX;
use crate::watermark::{Compositor, DEFAULT_JPEG_QUALITY, FontLoader, WatermarkSpec};

/// Lowercase extensions picked up from the source directory
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// How many per-file errors the summary report lists
pub const MAX_REPORTED_ERRORS: usize = 5;

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// True for files written by an earlier run (`<stem>_wm.<ext>`)
pub fn is_watermark_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.ends_with(OUTPUT_SUFFIX))
        .unwrap_or(false)
}

/// List supported images directly inside `directory`, sorted by path
pub fn find_images(directory: &Path, skip_watermarked: bool) -> std::io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::other)?;
        let path = entry.path();

        // `Path::is_file` follows symlinks, the entry's own file type does not
        if !path.is_file() || !is_supported_image(path) {
            continue;
        }

        if skip_watermarked && is_watermark_output(path) {
            debug!("Skipping earlier output {:?}", path);
            continue;
        }

        images.push(path.to_path_buf());
    }

    images.sort();
    Ok(images)
}

/// Result of processing one source file
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub result: Result<PathBuf, String>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    FileStarted {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    FileFinished {
        completed: usize,
        total: usize,
        outcome: FileOutcome,
    },
    Finished {
        summary: BatchSummary,
    },
}

impl BatchEvent {
    /// Share of the batch already done, in percent
    pub fn progress_percent(&self) -> f64 {
        match self {
            BatchEvent::Started { .. } => 0.0,
            BatchEvent::FileStarted { index, total, .. } => {
                *index as f64 / (*total).max(1) as f64 * 100.0
            }
            BatchEvent::FileFinished {
                completed, total, ..
            } => *completed as f64 / (*total).max(1) as f64 * 100.0,
            BatchEvent::Finished { .. } => 100.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    /// `"<file name>: <message>"` for every failed file
    pub errors: Vec<String>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    fn record(&mut self, outcome: &FileOutcome) {
        match &outcome.result {
            Ok(_) => self.succeeded += 1,
            Err(message) => self
                .errors
                .push(format!("{}: {}", outcome.file_name(), message)),
        }
    }

    /// Human readable end-of-batch report listing at most five errors
    pub fn report(&self) -> String {
        if self.is_success() {
            return format!("All {} images processed successfully", self.succeeded);
        }

        let mut report = format!(
            "Processed {} of {} images; errors in {} files:",
            self.succeeded,
            self.total,
            self.failed()
        );
        for error in self.errors.iter().take(MAX_REPORTED_ERRORS) {
            report.push('\n');
            report.push_str(error);
        }
        if self.failed() > MAX_REPORTED_ERRORS {
            report.push_str(&format!(
                "\n... and {} more",
                self.failed() - MAX_REPORTED_ERRORS
            ));
        }
        report
    }
}

/// A list of files to watermark with one spec
#[derive(Debug, Clone)]
pub struct BatchJob {
    files: Vec<PathBuf>,
    spec: WatermarkSpec,
    fonts: FontLoader,
    jpeg_quality: u8,
}

impl BatchJob {
    pub fn new(spec: WatermarkSpec, files: Vec<PathBuf>) -> Self {
        Self {
            files,
            spec,
            fonts: FontLoader::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_fonts(mut self, fonts: FontLoader) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_jpeg_quality(mut self, jpeg_quality: u8) -> Self {
        self.jpeg_quality = jpeg_quality;
        self
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Process every file in order, reporting progress through `on_event`.
    ///
    /// A failing file is recorded and the batch moves on.
    pub fn run<F>(&self, mut on_event: F) -> BatchSummary
    where
        F: FnMut(BatchEvent),
    {
        let total = self.files.len();
        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };

        info!(
            "Watermarking {} file(s) with {:?} watermark at {}",
            total,
            self.spec.kind(),
            self.spec.position
        );
        on_event(BatchEvent::Started { total });

        // The font or watermark image is loaded once for the whole run
        let compositor = Compositor::prepare(self.spec.clone(), &self.fonts, self.jpeg_quality);
        if let Err(e) = &compositor {
            warn!("Watermark could not be prepared: {}", e);
        }

        for (index, source) in self.files.iter().enumerate() {
            on_event(BatchEvent::FileStarted {
                index,
                total,
                path: source.clone(),
            });

            let result = match &compositor {
                Ok(compositor) => compositor
                    .process_file(source)
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };

            match &result {
                Ok(output) => info!("Watermarked {:?} -> {:?}", source, output),
                Err(message) => warn!("Failed to watermark {:?}: {}", source, message),
            }

            let outcome = FileOutcome {
                source: source.clone(),
                result,
            };
            summary.record(&outcome);
            on_event(BatchEvent::FileFinished {
                completed: index + 1,
                total,
                outcome,
            });
        }

        info!(
            "Batch finished: {} succeeded, {} failed",
            summary.succeeded,
            summary.failed()
        );
        on_event(BatchEvent::Finished {
            summary: summary.clone(),
        });
        summary
    }

    /// Run on a blocking worker thread, streaming events over a channel
    pub fn spawn(self) -> (JoinHandle<BatchSummary>, mpsc::UnboundedReceiver<BatchEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let handle = tokio::task::spawn_blocking(move || {
            self.run(|event| {
                // A dropped receiver only means nobody is watching progress
                let _ = sender.send(event);
            })
        });

        (handle, receiver)
    }
}
