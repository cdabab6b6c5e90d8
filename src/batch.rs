//! Batch builds for the CLI.
//!
//! Builds one triple per input in parallel and writes each part to the
//! output directory:
//!
//! ```text
//! out/
//! ├── dawn.full.jpg        # part 0, source bytes untouched
//! ├── dawn.preview.jpg     # part 1
//! └── dawn.info.json       # part 2
//! ```
//!
//! Inputs are files, directories (expanded to the image files directly
//! inside them), or `-` for standard input. A failed input is reported and
//! skipped; it never stops the rest of the batch.
//!
//! Builds run on the global [rayon](https://docs.rs/rayon) pool. Progress is
//! reported through an optional channel so the caller decides how to print.

use crate::builder::TripleBuilder;
use crate::imaging::{ImageBackend, supported_input_extensions};
use crate::info::InfoRecord;
use crate::parts::{ImageTriple, PartKind};
use crate::source::ImageSource;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Standard input can only be used once per batch")]
    RepeatedStdin,
    #[error("No image files found in {0}")]
    EmptyDirectory(PathBuf),
}

/// One thing to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchInput {
    Path(PathBuf),
    Stdin,
}

impl BatchInput {
    pub fn label(&self) -> String {
        match self {
            BatchInput::Path(path) => path.display().to_string(),
            BatchInput::Stdin => "<stdin>".to_string(),
        }
    }

    fn stem(&self) -> String {
        match self {
            BatchInput::Path(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string()),
            BatchInput::Stdin => "stdin".to_string(),
        }
    }

    fn to_source(&self) -> ImageSource {
        match self {
            BatchInput::Path(path) => ImageSource::from_path(path),
            BatchInput::Stdin => ImageSource::from_reader(io::stdin(), None),
        }
    }
}

/// A part written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPart {
    pub kind: PartKind,
    pub path: PathBuf,
    pub len: usize,
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Built {
        /// 1-based position of the input.
        index: usize,
        input: String,
        info: Option<InfoRecord>,
        parts: Vec<WrittenPart>,
    },
    Failed {
        index: usize,
        input: String,
        error: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub built: usize,
    pub failed: usize,
}

/// Turn command-line arguments into concrete inputs.
///
/// `-` means standard input and may appear once. Directories expand to
/// their image files with a supported extension, sorted by name.
pub fn collect_inputs(args: &[PathBuf]) -> Result<Vec<BatchInput>, BatchError> {
    let mut inputs = Vec::new();
    let mut saw_stdin = false;

    for arg in args {
        if arg.as_os_str() == "-" {
            if saw_stdin {
                return Err(BatchError::RepeatedStdin);
            }
            saw_stdin = true;
            inputs.push(BatchInput::Stdin);
        } else if arg.is_dir() {
            let images = list_images(arg)?;
            if images.is_empty() {
                return Err(BatchError::EmptyDirectory(arg.clone()));
            }
            inputs.extend(images.into_iter().map(BatchInput::Path));
        } else {
            // Missing files are reported by the build itself
            inputs.push(BatchInput::Path(arg.clone()));
        }
    }
    Ok(inputs)
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>, io::Error> {
    let supported = supported_input_extensions();
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| supported.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false);
        if matches && path.is_file() {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// Assign each input a unique output stem.
///
/// Repeated stems get a numeric suffix: `photo`, `photo-2`, `photo-3`.
fn output_stems(inputs: &[BatchInput]) -> Vec<String> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let base = input.stem();
            let mut stem = base.clone();
            let mut n = 1;
            while !taken.insert(stem.clone()) {
                n += 1;
                stem = format!("{base}-{n}");
            }
            stem
        })
        .collect()
}

fn file_name(stem: &str, kind: PartKind) -> String {
    let ext = match kind {
        PartKind::Full | PartKind::Preview => "jpg",
        PartKind::Info => "json",
    };
    format!("{stem}.{}.{ext}", kind.label())
}

/// Write all three parts of a triple as `<stem>.<part>.<ext>`.
pub fn write_triple(
    triple: &ImageTriple,
    out_dir: &Path,
    stem: &str,
) -> Result<Vec<WrittenPart>, io::Error> {
    triple
        .parts()
        .iter()
        .map(|part| {
            let path = out_dir.join(file_name(stem, part.kind()));
            fs::write(&path, part.bytes())?;
            Ok(WrittenPart {
                kind: part.kind(),
                path,
                len: part.len(),
            })
        })
        .collect()
}

/// Build and write every input. Individual failures are counted, not fatal.
pub fn run_batch<B: ImageBackend>(
    builder: &TripleBuilder<B>,
    inputs: &[BatchInput],
    out_dir: &Path,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    fs::create_dir_all(out_dir)?;
    let stems = output_stems(inputs);

    let outcomes: Vec<bool> = inputs
        .par_iter()
        .zip(stems.par_iter())
        .enumerate()
        .map_with(events, |events, (i, (input, stem))| {
            let label = input.label();
            debug!(input = %label, stem = %stem, "building");

            let result = builder
                .build(input.to_source())
                .map_err(|e| e.to_string())
                .and_then(|triple| {
                    let parts = write_triple(&triple, out_dir, stem).map_err(|e| e.to_string())?;
                    Ok((InfoRecord::parse(triple.info().bytes()).ok(), parts))
                });

            let (ok, event) = match result {
                Ok((info, parts)) => (
                    true,
                    BatchEvent::Built {
                        index: i + 1,
                        input: label,
                        info,
                        parts,
                    },
                ),
                Err(error) => {
                    warn!(input = %label, error = %error, "build failed");
                    (
                        false,
                        BatchEvent::Failed {
                            index: i + 1,
                            input: label,
                            error,
                        },
                    )
                }
            };
            if let Some(tx) = events {
                // Receiver gone means nobody is listening; keep building
                tx.send(event).ok();
            }
            ok
        })
        .collect();

    let built = outcomes.iter().filter(|ok| **ok).count();
    Ok(BatchSummary {
        built,
        failed: outcomes.len() - built,
    })
}
