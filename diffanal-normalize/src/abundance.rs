//! Reading Kallisto-style abundance tables, plain or gzip compressed.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::consts::{ABUNDANCE_FILE_STEM, EST_COUNTS_COLUMN, TARGET_ID_COLUMN};
use crate::errors::NormalizeError;

///
/// Get a reader for either a gzip'd or plain file.
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>, NormalizeError> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path)?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// One sample's estimated counts, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Abundance {
    pub sample: String,
    pub target_ids: Vec<String>,
    pub est_counts: Vec<f64>,
}

///
/// Derive a sample name from an abundance file path.
///
/// Kallisto writes `<sample>/abundance.tsv`, so for that file name the
/// directory is used; otherwise the file name up to its first dot.
///
pub fn sample_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();

    if stem == ABUNDANCE_FILE_STEM {
        if let Some(dir) = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|d| d.to_str())
        {
            return dir.to_string();
        }
    }
    stem.to_string()
}

///
/// Read `target_id` and `est_counts` from an abundance table.
///
/// A header line starting with `target_id` is skipped; blank lines are
/// ignored.
///
pub fn read_abundance(path: &Path) -> Result<Abundance, NormalizeError> {
    let reader = get_dynamic_reader(path)?;

    let mut target_ids = Vec::new();
    let mut est_counts = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if line_no == 1 && fields[0] == TARGET_ID_COLUMN {
            continue;
        }
        if fields.len() <= EST_COUNTS_COLUMN {
            return Err(NormalizeError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message: format!(
                    "expected at least {} columns, found {}",
                    EST_COUNTS_COLUMN + 1,
                    fields.len()
                ),
            });
        }

        let count: f64 = fields[EST_COUNTS_COLUMN]
            .trim()
            .parse()
            .map_err(|e| NormalizeError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message: format!("est_counts {:?}: {}", fields[EST_COUNTS_COLUMN], e),
            })?;
        if !count.is_finite() || count < 0.0 {
            return Err(NormalizeError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message: format!("est_counts must be a non-negative number, got {}", count),
            });
        }

        target_ids.push(fields[0].to_string());
        est_counts.push(count);
    }

    Ok(Abundance {
        sample: sample_name(path),
        target_ids,
        est_counts,
    })
}
