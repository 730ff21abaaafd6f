use crate::models::{Building, WeekType};
use chrono::Weekday;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// freerooms - import group timetables and find empty rooms
#[derive(Debug, Parser)]
#[command(name = "freerooms")]
#[command(about = "Import group timetables from ICS files and find empty rooms", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import every ICS file in a directory
    Import {
        /// Directory to import (defaults to schedule_dir from the config)
        dir: Option<PathBuf>,

        /// Stop at the first file that fails to import
        #[arg(long)]
        stop_on_error: bool,
    },

    /// Show how the events of one ICS file would be classified
    Inspect {
        #[arg(required = true)]
        file: PathBuf,
    },

    /// List rooms with no class in a slot
    #[command(alias = "free")]
    FreeRooms {
        /// Day of week (mon, tue, ...)
        #[arg(long, value_parser = parse_weekday)]
        weekday: Weekday,

        /// Class period, 1-7
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=7))]
        period: u8,

        /// Week parity (odd/even, чс/зн)
        #[arg(long, value_parser = parse_week_type)]
        week_type: WeekType,

        /// Building (улк/гз)
        #[arg(long, value_parser = parse_building)]
        building: Option<Building>,

        /// Floor number
        #[arg(long)]
        floor: Option<u32>,
    },
}

fn parse_weekday(s: &str) -> Result<Weekday, String> {
    s.parse::<Weekday>().map_err(|_| format!("unknown weekday: {}", s))
}

fn parse_week_type(s: &str) -> Result<WeekType, String> {
    s.parse()
}

fn parse_building(s: &str) -> Result<Building, String> {
    s.parse()
}
