use anyhow::Result;
use clap::Parser;
use wfst_cli::{init_tracing, run, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();
    run(&args)
}
