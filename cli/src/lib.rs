//! Command-line reweighting of weighted automata.
//!
//! `wfst-reweight` reads an automaton in text form and a potential file,
//! reweights the automaton toward the initial state (or the final states with
//! `--to-final`) and writes the result in text form.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wfst_algebra::potentials::read_potentials_file;
use wfst_algebra::reweight::{reweight, ReweightType};
use wfst_algebra::semiring::{LogWeight, Semiring, TropicalWeight};
use wfst_algebra::sparse_power::SparsePowerWeight;
use wfst_algebra::text::{read_text_file, write_text};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "WFST_LOG";

/// Weight types accepted by `--weight-type`.
pub const WEIGHT_TYPES: [&str; 4] = ["tropical", "log", "tropical_^n", "log_^n"];

/// Reweight a weighted automaton according to per-state potentials.
#[derive(Parser, Debug)]
#[command(name = "wfst-reweight")]
#[command(about = "Reweight a weighted automaton according to per-state potentials", long_about = None)]
pub struct Args {
    /// Push weight toward the final states instead of the initial state
    #[arg(long)]
    pub to_final: bool,

    /// Weight type of the automaton and the potentials
    #[arg(long, value_name = "TYPE", default_value = "tropical")]
    pub weight_type: String,

    /// Automaton in text form
    #[arg(value_name = "IN")]
    pub input: PathBuf,

    /// Potential file (`state weight` per line)
    #[arg(value_name = "POTENTIALS")]
    pub potentials: PathBuf,

    /// Output file (`-` or omitted for stdout)
    #[arg(value_name = "OUT")]
    pub output: Option<PathBuf>,
}

/// Install a stderr subscriber filtered by `WFST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

/// Run the command: read, reweight, and write.
pub fn run(args: &Args) -> Result<()> {
    let reweight_type = ReweightType::from_to_final(args.to_final);
    let rendered = match args.weight_type.as_str() {
        "tropical" => reweight_files::<TropicalWeight>(args, reweight_type)?,
        "log" => reweight_files::<LogWeight>(args, reweight_type)?,
        "tropical_^n" => reweight_files::<SparsePowerWeight<TropicalWeight>>(args, reweight_type)?,
        "log_^n" => reweight_files::<SparsePowerWeight<LogWeight>>(args, reweight_type)?,
        other => bail!(
            "unsupported weight type {:?} (expected one of {})",
            other,
            WEIGHT_TYPES.join(", ")
        ),
    };

    write_output(args.output.as_deref(), &rendered)
}

/// Read both inputs as weight type `W`, reweight, and render the result.
fn reweight_files<W: Semiring>(args: &Args, reweight_type: ReweightType) -> Result<String> {
    let mut fst = read_text_file::<W>(&args.input)
        .with_context(|| format!("failed to read automaton {}", args.input.display()))?;
    let potentials = read_potentials_file::<W>(&args.weight_type, &args.potentials)
        .with_context(|| format!("failed to read potentials {}", args.potentials.display()))?;

    reweight(&mut fst, &potentials, reweight_type).context("failed to reweight automaton")?;
    info!(
        input = %args.input.display(),
        direction = ?reweight_type,
        weight_type = W::type_name(),
        "reweighted automaton"
    );

    let mut buf = Vec::new();
    write_text(&fst, &mut buf).context("failed to render automaton")?;
    String::from_utf8(buf).context("rendered automaton is not UTF-8")
}

/// Write `rendered` to stdout, or to `path` through a temporary file in the
/// same directory that replaces `path` only once fully written.
fn write_output(path: Option<&Path>, rendered: &str) -> Result<()> {
    let path = match path {
        Some(path) if path != Path::new("-") => path,
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes()).context("failed to write to stdout")?;
            return stdout.flush().context("failed to write to stdout");
        },
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(rendered.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    debug!(output = %path.display(), bytes = rendered.len(), "wrote output");
    Ok(())
}
