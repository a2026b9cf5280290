use clap::Parser;
use img_index::args::Args;
use img_index::indexer::Indexer;
use img_index::sink::{ConsoleSink, LogSink, ProgressSink};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let sink: Box<dyn ProgressSink> = if args.log {
        Box::new(LogSink)
    } else {
        Box::new(ConsoleSink)
    };

    let indexer = Indexer::new(args.into_config()?, &sink);

    // Per-directory failures are already reported; only root setup aborts the run
    let stats = indexer.index()?;
    for line in stats.summary() {
        sink.info(&line);
    }

    Ok(())
}
