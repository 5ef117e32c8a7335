use afad_processor::cli::Args;
use afad_processor::metadata::all_event_metadata;
use afad_processor::processor::{BatchProcessor, BatchReport};
use afad_processor::report::{events_frame, failures_frame, stations_frame, write_frame};
use afad_processor::{AfadError, Direction, PeakReading};
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::process;

fn main() {
    let args = Args::parse();
    init_tracing(&args);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = run(&args) => result,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(anyhow::anyhow!("Processing interrupted by user"))
            }
        }
    });

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

fn init_tracing(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("afad_processor={}", args.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

async fn run(args: &Args) -> Result<()> {
    let config = args.to_config();
    let processor = BatchProcessor::new(config).context("Invalid configuration")?;

    println!("{}", "AFAD strong-motion summary".bright_green().bold());
    for root in &processor.config().data_roots {
        println!("  {} {}", "Data root:".bright_cyan(), root.display());
    }

    let catalog = processor.discover().await?;
    println!(
        "  {} {} events, {} record files",
        "Found".bright_green(),
        catalog.event_count().to_string().bright_white().bold(),
        catalog.file_count().to_string().bright_white().bold()
    );

    if args.list_only {
        let events = all_event_metadata(&catalog);
        for event in &events {
            println!(
                "  {}  {} {}  {} stations",
                event.event_id.to_string().bright_white(),
                event.date_label(),
                event.time_label(),
                event.station_count
            );
        }
        if let Some(path) = &args.events_output {
            write_frame(&mut events_frame(&events)?, path)?;
        }
        return Ok(());
    }

    let report = match args.event_ids() {
        Some(events) => processor.process_events(events).await?,
        None => processor.process_all().await?,
    };

    print_report(&report);
    write_outputs(args, &report, processor.config().sampling_rate_hz)?;

    Ok(())
}

fn format_peak(reading: &PeakReading) -> ColoredString {
    match reading {
        PeakReading::Measured { pga, .. } => format!("{:>10.4}", pga).normal(),
        PeakReading::Reported { pga } => format!("{:>10.4}", pga).bright_blue(),
        PeakReading::NoData { reason } => format!("{:>10}", reason.as_str()).bright_red(),
    }
}

fn print_report(report: &BatchReport) {
    for event in &report.events {
        println!(
            "\n{} {} ({} {})",
            "Event".bright_yellow(),
            event.metadata.event_id.to_string().bright_white().bold(),
            event.metadata.date_label(),
            event.metadata.time_label()
        );
        println!(
            "  {:<10} {:>10} {:>10} {:>10}",
            "Station",
            format!("PGA_{}", Direction::North.axis_label()),
            format!("PGA_{}", Direction::East.axis_label()),
            format!("PGA_{}", Direction::Up.axis_label())
        );
        for row in &event.table.rows {
            println!(
                "  {:<10} {} {} {}",
                row.station.as_str(),
                format_peak(&row.north),
                format_peak(&row.east),
                format_peak(&row.up)
            );
        }
    }

    let stats = &report.stats;
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Events:".bright_cyan(),
        stats.events_processed.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Stations:".bright_cyan(),
        stats.stations_processed.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Records measured:".bright_cyan(),
        stats.records_measured.to_string().bright_white().bold()
    );
    if stats.records_failed > 0 {
        println!(
            "  {} {}",
            "Records without data:".bright_red(),
            stats.records_failed.to_string().bright_red().bold()
        );
    }
}

fn write_outputs(
    args: &Args,
    report: &BatchReport,
    sampling_rate_hz: f64,
) -> Result<(), AfadError> {
    if let Some(path) = &args.output {
        write_frame(
            &mut stations_frame(&report.station_rows(), sampling_rate_hz)?,
            path,
        )?;
    }
    if let Some(path) = &args.events_output {
        write_frame(&mut events_frame(&report.metadata())?, path)?;
    }
    if let Some(path) = &args.failures_output {
        write_frame(&mut failures_frame(&report.failures())?, path)?;
    }
    Ok(())
}
