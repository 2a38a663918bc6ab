//! attrforge's main application entry point.
//! Parses command-line arguments, resolves the run configuration and
//! forwards the core's report to the console.

use attrforge::{
    cli::{get_args, Args},
    config::GeneratorConfig,
    error::{default_error_handler, Result},
    processor::Processor,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Off
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Resolves the configuration, runs the pipeline and prints the report.
fn run(args: Args) -> Result<()> {
    let config = GeneratorConfig::resolve(&args)?;
    let report = Processor::new(&config).run()?;

    for line in &report.report_lines {
        println!("{line}");
    }
    println!("{}", report.summary());
    Ok(())
}
