use anyhow::{anyhow, Context, Result};
use clap::Parser;
use env_logger::Env;
use freerooms::calendar::read_calendar_file;
use freerooms::cli::{Cli, Commands};
use freerooms::import::{classify_period, group_name, EventClassifier, ImportOptions, Importer};
use freerooms::rooms::{free_audiences, FreeAudienceFilter};
use freerooms::{Config, JsonStorage, Period};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging with custom format
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Import { dir, stop_on_error } => {
            let dir = dir.unwrap_or_else(|| config.schedule_dir.clone());
            run_import(config, dir, stop_on_error).await
        }
        Commands::Inspect { file } => inspect(&file),
        Commands::FreeRooms { weekday, period, week_type, building, floor } => {
            let storage = JsonStorage::open(&config.storage.path)?;
            let filter = FreeAudienceFilter {
                week_day: weekday,
                period: Period::new(period).ok_or_else(|| anyhow!("invalid period {}", period))?,
                week_type,
                building,
                floor,
            };
            let rooms = free_audiences(&storage, &filter)?;
            if rooms.is_empty() {
                println!("No free rooms found.");
            }
            for room in rooms {
                println!("{:<8} {:<4} floor {}", room.label(), room.building, room.floor);
            }
            Ok(())
        }
    }
}

async fn run_import(config: Config, dir: PathBuf, stop_on_error: bool) -> Result<()> {
    let cancel = Arc::new(AtomicBool::new(false));

    let signal_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current file");
            signal_flag.store(true, Ordering::SeqCst);
        }
    });

    let report = tokio::task::spawn_blocking(move || -> Result<_> {
        let mut storage = JsonStorage::open(&config.storage.path)?;
        let mut options = ImportOptions::new(config.import.utc_offset_hours)?;
        options.stop_on_error = stop_on_error || config.import.stop_on_error;

        let mut importer = Importer::new(&mut storage, options)?;
        let report = importer
            .import_dir(&dir, &cancel)
            .with_context(|| format!("Failed to import {}", dir.display()))?;
        Ok(report)
    })
    .await??;

    let schedules: usize = report.imported.iter().map(|(_, r)| r.schedules_written).sum();
    info!(
        "Imported {} files ({} schedule rows), {} failed{}",
        report.imported.len(),
        schedules,
        report.failed.len(),
        if report.cancelled { ", cancelled" } else { "" }
    );
    for (path, e) in &report.failed {
        error!("{}: {}", path.display(), e);
    }

    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("{} calendar files failed to import", report.failed.len()))
    }
}

fn inspect(file: &Path) -> Result<()> {
    let calendar = read_calendar_file(file)?;
    let classifier = EventClassifier::new()?;

    match group_name(calendar.name.as_deref()) {
        Ok(group) => println!("Group: {}", group),
        Err(e) => println!("Group: <invalid> ({})", e),
    }

    for raw in calendar.events {
        let label = format!(
            "{} @ {}",
            raw.name.as_deref().unwrap_or("<no name>"),
            raw.location.as_deref().unwrap_or("<no location>")
        );
        match classifier.classify(raw) {
            None => println!("  skip     {}", label),
            Some(event) => match classify_period(&event.start, &event.end) {
                Some(period) => println!(
                    "  {} #{}   {} (interval {})",
                    event.start.format("%a"),
                    period,
                    label,
                    event.interval.map_or_else(|| "-".to_string(), |i| i.to_string())
                ),
                None => println!("  no slot  {} ({} - {})", label, event.start, event.end),
            },
        }
    }
    Ok(())
}
