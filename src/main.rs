use std::time::Instant;

use clap::Parser;
use iconpipe::{Args, Pipeline, as_overhead};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.graph {
        print!("{}", args.task.plan());
        return Ok(());
    }

    #[cfg(feature = "logging")]
    iconpipe::init_logging()?;

    let s = Instant::now();
    let config = args.config();
    let pipeline = Pipeline::new(&config)?;
    let diagnostics = pipeline.run(args.task)?;

    for (name, duration) in diagnostics.timeline() {
        tracing::debug!("{name}: {duration:.2?}");
    }
    tracing::info!("Finished '{}' {}", args.task, as_overhead(s));

    Ok(())
}
