use std::io::Write;
use std::path::Path;

use log::info;

use crate::abundance::read_abundance;
use crate::errors::NormalizeError;
use crate::size_factors::size_factors;

///
/// Counts for a set of targets across samples. `counts[t][s]` is the count
/// of target `t` in sample `s`.
///
#[derive(Debug, Clone, PartialEq)]
pub struct CountTable {
    pub target_ids: Vec<String>,
    pub samples: Vec<String>,
    pub counts: Vec<Vec<f64>>,
}

impl CountTable {
    ///
    /// Load one abundance table per sample. Every table must list the same
    /// targets in the same order.
    ///
    pub fn from_abundance_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, NormalizeError> {
        let (first, rest) = paths.split_first().ok_or(NormalizeError::EmptyInput)?;

        let first = read_abundance(first.as_ref())?;
        let mut samples = vec![first.sample];
        let mut counts: Vec<Vec<f64>> = first.est_counts.iter().map(|&c| vec![c]).collect();
        let target_ids = first.target_ids;

        for path in rest {
            let path = path.as_ref();
            let abundance = read_abundance(path)?;
            if abundance.target_ids.len() != target_ids.len() {
                return Err(NormalizeError::MismatchedTargetCount {
                    path: path.to_path_buf(),
                    expected: target_ids.len(),
                    found: abundance.target_ids.len(),
                });
            }
            if let Some((expected, found)) = target_ids
                .iter()
                .zip(abundance.target_ids.iter())
                .find(|(a, b)| a != b)
            {
                return Err(NormalizeError::MismatchedTargets {
                    path: path.to_path_buf(),
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }

            for (row, &count) in counts.iter_mut().zip(abundance.est_counts.iter()) {
                row.push(count);
            }
            samples.push(abundance.sample);
        }

        info!(
            "Loaded {} targets across {} samples",
            target_ids.len(),
            samples.len()
        );

        Ok(CountTable {
            target_ids,
            samples,
            counts,
        })
    }

    pub fn n_targets(&self) -> usize {
        self.target_ids.len()
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    ///
    /// Divide every count by its sample's median-of-ratios size factor.
    ///
    pub fn normalize(&self) -> Result<CountTable, NormalizeError> {
        let factors = size_factors(self)?;
        for (sample, factor) in self.samples.iter().zip(factors.iter()) {
            info!("Size factor for {}: {:.5}", sample, factor);
        }

        let counts = self
            .counts
            .iter()
            .map(|row| row.iter().zip(factors.iter()).map(|(c, f)| c / f).collect())
            .collect();

        Ok(CountTable {
            target_ids: self.target_ids.clone(),
            samples: self.samples.clone(),
            counts,
        })
    }

    /// Write the table as TSV with a `target_id` header.
    pub fn write_tsv<W: Write>(&self, mut writer: W) -> Result<(), NormalizeError> {
        writeln!(writer, "target_id\t{}", self.samples.join("\t"))?;
        for (target, row) in self.target_ids.iter().zip(self.counts.iter()) {
            let values: Vec<String> = row.iter().map(|c| format!("{:.5}", c)).collect();
            writeln!(writer, "{}\t{}", target, values.join("\t"))?;
        }
        writer.flush()?;
        Ok(())
    }
}
