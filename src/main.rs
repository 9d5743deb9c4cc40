use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use pcbus::cli::{Cli, Commands, RunArgs};
use pcbus::config::Config;
use pcbus::coordination::SignalBus;
use pcbus::domain::Signal;
use pcbus::pipeline::{
    CommandSource, ExitReason, Pipeline, RunReport, ScriptSource, StdinSource, run_baseline,
};

fn setup_logging(verbose: bool, default_level: &str) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if verbose {
        builder.target(env_logger::Target::Stderr).init();
        return Ok(());
    }

    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pcbus")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("pcbus.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn print_banner(capacity: usize) {
    println!("{}", "=========================".cyan());
    println!("Producer-Consumer with queue capacity = {}", capacity);
    println!("{}", "=========================".cyan());
    println!("Process handling:");
    println!("  {}  pause producer    {}  resume producer", "p".yellow(), "P".green());
    println!("  {}  pause consumer    {}  resume consumer", "c".yellow(), "C".green());
    println!("  {}  terminate", "b".red());
}

fn print_report(report: &RunReport) {
    match report.exit {
        ExitReason::Completed => println!("{}", "Done!".green()),
        ExitReason::Terminated(signal) => println!("{} ({})", "Terminated".red(), signal),
    }
    println!("  produced: {}", report.produced);
    if let Some(consumed) = &report.consumed {
        println!("  consumed: {}", consumed.len());
    }
    println!(
        "  producer done: {}, consumer done: {}",
        report.flags.producer_done, report.flags.consumer_done
    );
    println!(
        "  bus: {} published, {} put back, max hops {}",
        report.bus.published, report.bus.put_back, report.bus.max_hops
    );
}

async fn run_pipeline<S: CommandSource + 'static>(pipeline: Pipeline, source: S) -> Result<RunReport> {
    let bus = pipeline.bus();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, publishing halt");
            bus.publish(Signal::Halt);
        }
    });

    let report = pipeline.run(source).await.context("Pipeline run failed");
    interrupt.abort();
    report
}

async fn handle_run_command(args: &RunArgs, config: &Config) -> Result<()> {
    let pipeline_config = config.pipeline_config(args.capacity, args.total, args.idle_us)?;
    info!("Running pipeline: {:?}", pipeline_config);

    let bus = Arc::new(SignalBus::with_backoff(config.republish_backoff()));
    let pipeline = Pipeline::new(pipeline_config, bus).context("Failed to build pipeline")?;

    let report = match &args.script {
        Some(path) => {
            let source = ScriptSource::from_file(path)
                .context(format!("Failed to read script {}", path.display()))?;
            run_pipeline(pipeline, source).await?
        }
        None => {
            print_banner(pipeline_config.capacity);
            run_pipeline(pipeline, StdinSource::spawn()).await?
        }
    };

    print_report(&report);
    Ok(())
}

async fn handle_baseline_command(capacity: Option<usize>, total: Option<u64>, config: &Config) -> Result<()> {
    let pipeline_config = config.pipeline_config(capacity, total, None)?;
    info!("Running baseline: {:?}", pipeline_config);

    let consumed = run_baseline(pipeline_config.capacity, pipeline_config.total)
        .await
        .context("Baseline run failed")?;

    println!("{}", "Done!".green());
    println!("  consumed: {}", consumed.len());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    match &cli.command {
        None => handle_run_command(&RunArgs::default(), config).await,
        Some(Commands::Run(args)) => handle_run_command(args, config).await,
        Some(Commands::Baseline { capacity, total }) => handle_baseline_command(*capacity, *total, config).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging before any pipeline work
    let level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    setup_logging(cli.is_verbose(), &level).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
