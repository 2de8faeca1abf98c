//! Reading and writing per-state potential files.
//!
//! A potential file has one `state weight` pair per line, separated by
//! whitespace. Blank lines are skipped. States do not have to be listed in
//! order or exhaustively: the resulting vector is as long as the highest
//! listed state plus one, and unlisted states hold `zero()`. A later line for
//! the same state replaces an earlier one.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::debug;

use crate::automaton::{StateId, MAX_STATES};
use crate::semiring::{Semiring, WeightParseError};

/// Failure while reading a potential file.
#[derive(Debug, thiserror::Error)]
pub enum PotentialError {
    /// The file could not be opened or read.
    #[error("{name}: {source}")]
    Io {
        /// File name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The caller asked for a weight type the reader was not built for.
    #[error("{name}: potentials requested as {requested} weights but read as {actual}")]
    WeightTypeMismatch {
        /// File name.
        name: String,
        /// Weight type asked for.
        requested: String,
        /// Weight type of the reader.
        actual: &'static str,
    },
    /// A line does not have exactly two columns.
    #[error("{name}:{line}: bad number of columns ({columns})")]
    BadColumns {
        /// File name.
        name: String,
        /// 1-based line number.
        line: usize,
        /// Column count found.
        columns: usize,
    },
    /// The state column is not a state id.
    #[error("{name}:{line}: bad state id {text:?}")]
    BadState {
        /// File name.
        name: String,
        /// 1-based line number.
        line: usize,
        /// Offending text.
        text: String,
    },
    /// The state id is at or above [`MAX_STATES`].
    #[error("{name}:{line}: state id {state} exceeds the limit of {limit} states", limit = MAX_STATES)]
    StateOutOfRange {
        /// File name.
        name: String,
        /// 1-based line number.
        line: usize,
        /// Offending state id.
        state: StateId,
    },
    /// The weight column does not parse as the weight type.
    #[error("{name}:{line}: {source}")]
    BadWeight {
        /// File name.
        name: String,
        /// 1-based line number.
        line: usize,
        /// Parse failure.
        #[source]
        source: WeightParseError,
    },
}

/// Read potentials of weight type `W` from `reader`.
///
/// `weight_type` must name `W` (see [`Semiring::type_name`]); `name` is used
/// in error messages.
pub fn read_potentials<W: Semiring, R: BufRead>(
    weight_type: &str,
    reader: R,
    name: &str,
) -> Result<Vec<W>, PotentialError> {
    if weight_type != W::type_name() {
        return Err(PotentialError::WeightTypeMismatch {
            name: name.to_string(),
            requested: weight_type.to_string(),
            actual: W::type_name(),
        });
    }

    let mut potentials: Vec<W> = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| PotentialError::Io { name: name.to_string(), source })?;

        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.is_empty() {
            continue;
        }
        if columns.len() != 2 {
            return Err(PotentialError::BadColumns {
                name: name.to_string(),
                line: line_no,
                columns: columns.len(),
            });
        }

        let state: StateId = columns[0].parse().map_err(|_| PotentialError::BadState {
            name: name.to_string(),
            line: line_no,
            text: columns[0].to_string(),
        })?;
        let index = state as usize;
        if index >= MAX_STATES {
            return Err(PotentialError::StateOutOfRange { name: name.to_string(), line: line_no, state });
        }
        let weight: W = columns[1].parse().map_err(|source| PotentialError::BadWeight {
            name: name.to_string(),
            line: line_no,
            source,
        })?;

        if potentials.len() <= index {
            potentials.resize(index + 1, W::zero());
        }
        potentials[index] = weight;
    }

    debug!(name, count = potentials.len(), weight_type, "read potentials");
    Ok(potentials)
}

/// Read potentials of weight type `W` from the file at `path`.
pub fn read_potentials_file<W: Semiring>(
    weight_type: &str,
    path: &Path,
) -> Result<Vec<W>, PotentialError> {
    let name = path.display().to_string();
    let file = File::open(path).map_err(|source| PotentialError::Io { name: name.clone(), source })?;
    read_potentials(weight_type, BufReader::new(file), &name)
}

/// Write one `state\tweight` line per potential.
pub fn write_potentials<W: Semiring, Wr: Write>(mut writer: Wr, potentials: &[W]) -> io::Result<()> {
    for (state, weight) in potentials.iter().enumerate() {
        writeln!(writer, "{}\t{}", state, weight)?;
    }
    writer.flush()
}
