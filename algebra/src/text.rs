//! AT&T-style text format for weighted automata.
//!
//! ```text
//! 0   1   3   3   0.5     # arc: src dst input output [weight]
//! 1   2   4   4
//! 2   1.25                # final: state [weight]
//! ```
//!
//! The source state of the first line is the start state. An omitted weight
//! is `one()`. Weights are parsed with the weight type's `FromStr`, so any
//! weight whose text form has no whitespace can be read.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::debug;

use crate::automaton::{
    Automaton, Label, MutableAutomaton, StateId, VectorAutomaton, MAX_STATES, NO_STATE,
};
use crate::semiring::{Semiring, WeightParseError};

/// Failure while reading an automaton in text form.
#[derive(Debug, thiserror::Error)]
pub enum TextFormatError {
    /// The input could not be opened or read.
    #[error("{name}: {source}")]
    Io {
        /// Input name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A line has a column count that is neither an arc nor a final weight.
    #[error("{name}:{line}: bad number of columns ({columns})")]
    BadColumns {
        /// Input name.
        name: String,
        /// 1-based line number.
        line: usize,
        /// Column count found.
        columns: usize,
    },
    /// A state id column does not parse.
    #[error("{name}:{line}: bad state id {text:?}")]
    BadState {
        /// Input name.
        name: String,
        /// 1-based line number.
        line: usize,
        /// Offending text.
        text: String,
    },
    /// A state id is at or above [`MAX_STATES`].
    #[error("{name}:{line}: state id {state} exceeds the limit of {limit} states", limit = MAX_STATES)]
    StateOutOfRange {
        /// Input name.
        name: String,
        /// 1-based line number.
        line: usize,
        /// Offending state id.
        state: StateId,
    },
    /// A label column does not parse.
    #[error("{name}:{line}: bad label {text:?}")]
    BadLabel {
        /// Input name.
        name: String,
        /// 1-based line number.
        line: usize,
        /// Offending text.
        text: String,
    },
    /// A weight column does not parse as the weight type.
    #[error("{name}:{line}: {source}")]
    BadWeight {
        /// Input name.
        name: String,
        /// 1-based line number.
        line: usize,
        /// Parse failure.
        #[source]
        source: WeightParseError,
    },
}

struct LineContext<'a> {
    name: &'a str,
    line: usize,
}

impl LineContext<'_> {
    fn state(&self, text: &str) -> Result<StateId, TextFormatError> {
        match text.parse::<StateId>() {
            Ok(state) if (state as usize) < MAX_STATES => Ok(state),
            Ok(state) => Err(TextFormatError::StateOutOfRange {
                name: self.name.to_string(),
                line: self.line,
                state,
            }),
            Err(_) => Err(TextFormatError::BadState {
                name: self.name.to_string(),
                line: self.line,
                text: text.to_string(),
            }),
        }
    }

    fn label(&self, text: &str) -> Result<Label, TextFormatError> {
        text.parse::<Label>().map_err(|_| TextFormatError::BadLabel {
            name: self.name.to_string(),
            line: self.line,
            text: text.to_string(),
        })
    }

    fn weight<W: Semiring>(&self, text: Option<&&str>) -> Result<W, TextFormatError> {
        match text {
            None => Ok(W::one()),
            Some(text) => text.parse::<W>().map_err(|source| TextFormatError::BadWeight {
                name: self.name.to_string(),
                line: self.line,
                source,
            }),
        }
    }
}

/// Read an automaton from `reader`; `name` is used in error messages.
pub fn read_text<W: Semiring, R: BufRead>(
    reader: R,
    name: &str,
) -> Result<VectorAutomaton<W>, TextFormatError> {
    let mut fst = VectorAutomaton::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| TextFormatError::Io { name: name.to_string(), source })?;
        let ctx = LineContext { name, line: idx + 1 };

        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.is_empty() {
            continue;
        }

        let from = ctx.state(columns[0])?;
        match columns.len() {
            4 | 5 => {
                let to = ctx.state(columns[1])?;
                let input = ctx.label(columns[2])?;
                let output = ctx.label(columns[3])?;
                let weight = ctx.weight::<W>(columns.get(4))?;
                fst.ensure_state(from.max(to));
                fst.add_arc(from, to, input, output, weight);
            },
            1 | 2 => {
                let weight = ctx.weight::<W>(columns.get(1))?;
                fst.ensure_state(from);
                fst.set_final(from, weight);
            },
            n => {
                return Err(TextFormatError::BadColumns {
                    name: name.to_string(),
                    line: ctx.line,
                    columns: n,
                })
            },
        }

        if fst.start() == NO_STATE {
            fst.set_start(from);
        }
    }

    debug!(
        name,
        states = fst.num_states(),
        transitions = fst.num_transitions(),
        weight_type = W::type_name(),
        "read automaton"
    );
    Ok(fst)
}

/// Read an automaton from the file at `path`.
pub fn read_text_file<W: Semiring>(path: &Path) -> Result<VectorAutomaton<W>, TextFormatError> {
    let name = path.display().to_string();
    let file = File::open(path).map_err(|source| TextFormatError::Io { name: name.clone(), source })?;
    read_text(BufReader::new(file), &name)
}

/// Write `fst` in text form.
///
/// The start state's lines come first so the output reads back with the same
/// start state. `one()` weights are omitted and only final states get a final
/// line. An automaton without a start state writes nothing.
pub fn write_text<A: Automaton, Wr: Write>(fst: &A, mut writer: Wr) -> io::Result<()> {
    let start = fst.start();
    if start == NO_STATE {
        return writer.flush();
    }

    let order = std::iter::once(start).chain(fst.states().filter(|&s| s != start));
    for state in order {
        for t in fst.transitions(state) {
            if t.weight.is_one() {
                writeln!(writer, "{}\t{}\t{}\t{}", state, t.to, t.input, t.output)?;
            } else {
                writeln!(writer, "{}\t{}\t{}\t{}\t{}", state, t.to, t.input, t.output, t.weight)?;
            }
        }
        let final_weight = fst.final_weight(state);
        if final_weight.is_one() {
            writeln!(writer, "{}", state)?;
        } else if !final_weight.is_zero() {
            writeln!(writer, "{}\t{}", state, final_weight)?;
        }
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::TropicalWeight;
    use crate::sparse_power::SparsePowerWeight;

    type T = TropicalWeight;

    fn read(text: &str) -> Result<VectorAutomaton<T>, TextFormatError> {
        read_text::<T, _>(text.as_bytes(), "test.fst")
    }

    fn render<A: Automaton>(fst: &A) -> String {
        let mut buf = Vec::new();
        write_text(fst, &mut buf).expect("write to vec");
        String::from_utf8(buf).expect("utf-8 output")
    }

    #[test]
    fn test_read_arcs_and_finals() {
        let fst = read("0 1 3 3 0.5\n1 2 4 5\n\n2 1.25\n1\n").expect("valid text");
        assert_eq!(fst.start(), 0);
        assert_eq!(fst.num_states(), 3);
        assert_eq!(fst.transitions(0)[0].weight, T::new(0.5));
        assert_eq!(fst.transitions(1)[0].weight, T::one());
        assert_eq!(fst.transitions(1)[0].output, 5);
        assert_eq!(*fst.final_weight(2), T::new(1.25));
        assert_eq!(*fst.final_weight(1), T::one());
        assert!(!fst.is_final(0));
    }

    #[test]
    fn test_first_line_source_is_start() {
        let fst = read("3 0 1 1\n0 0\n").expect("valid text");
        assert_eq!(fst.start(), 3);
        assert_eq!(fst.num_states(), 4);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert!(matches!(
            read("0 1 1 1\n0 1 1\n"),
            Err(TextFormatError::BadColumns { line: 2, columns: 3, .. })
        ));
        assert!(matches!(read("x 1 1 1\n"), Err(TextFormatError::BadState { line: 1, .. })));
        assert!(matches!(read("0 1 a 1\n"), Err(TextFormatError::BadLabel { line: 1, .. })));
        assert!(matches!(read("0\n0 1 1 1 w\n"), Err(TextFormatError::BadWeight { line: 2, .. })));
    }

    #[test]
    fn test_huge_state_ids_are_rejected() {
        assert!(matches!(
            read("0 4000000000 1 1\n"),
            Err(TextFormatError::StateOutOfRange { line: 1, state: 4000000000, .. })
        ));
        assert!(matches!(
            read("0 1 1 1\n4294967295\n"),
            Err(TextFormatError::StateOutOfRange { line: 2, .. })
        ));
        assert!(matches!(read("100000000000 1\n"), Err(TextFormatError::BadState { line: 1, .. })));
    }

    #[test]
    fn test_write_puts_start_first_and_omits_one() {
        let mut fst = VectorAutomaton::<T>::new();
        fst.ensure_state(2);
        fst.set_start(1);
        fst.add_arc(0, 2, 1, 1, T::new(2.0));
        fst.add_arc(1, 0, 3, 4, T::one());
        fst.set_final(2, T::one());
        fst.set_final(0, T::new(0.5));

        let text = render(&fst);
        assert_eq!(text, "1\t0\t3\t4\n0\t2\t1\t1\t2\n0\t0.5\n2\n");
        assert_eq!(read(&text).expect("reads back"), fst);
    }

    #[test]
    fn test_empty_input() {
        let fst = read("").expect("empty text");
        assert_eq!(fst.num_states(), 0);
        assert_eq!(render(&fst), "");
    }

    #[test]
    fn test_power_weights() {
        type P = SparsePowerWeight<T, i32>;
        let fst = read_text::<P, _>("0 1 1 1 Infinity,1,2\n1 0,1,3\n".as_bytes(), "p.fst")
            .expect("valid text");
        assert_eq!(*fst.transitions(0)[0].weight.get(&1), T::new(2.0));
        assert_eq!(*fst.final_weight(1).get(&0), T::new(0.0));
        assert_eq!(*fst.final_weight(1).get(&1), T::new(3.0));
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.fst");
        std::fs::write(&path, "0 1 2 2 1\n1\n").expect("write automaton");
        let fst = read_text_file::<T>(&path).expect("valid file");
        assert_eq!(fst.num_transitions(), 1);
        assert!(matches!(
            read_text_file::<T>(&dir.path().join("missing.fst")),
            Err(TextFormatError::Io { .. })
        ));
    }
}
