use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one fetch cycle and store the result.
    Fetch(FetchArgs),
    /// Print the stored site data.
    Show(ShowArgs),
    /// Describe a workout the way the homepage would.
    Workout(WorkoutArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// YAML config with sheet URLs and API settings.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding `siteData/latest.json`.
    #[arg(long, default_value = "homepage-data")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Directory holding `siteData/latest.json`.
    #[arg(long, default_value = "homepage-data")]
    pub data_dir: PathBuf,

    /// Print the rendered sentence instead of the JSON document.
    #[arg(long, default_value_t = false)]
    pub narrative: bool,
}

#[derive(Debug, Args)]
pub struct WorkoutArgs {
    /// Activity name as recorded, e.g. "45 min Pop Ride with Cody".
    #[arg(long)]
    pub name: String,

    /// Activity type tag such as Run, Ride or WeightTraining.
    #[arg(long = "type")]
    pub activity_type: Option<String>,

    /// Distance with unit, e.g. "3.1 miles".
    #[arg(long)]
    pub distance: Option<String>,

    /// Display duration, e.g. "45m".
    #[arg(long)]
    pub duration: Option<String>,

    /// Energy output in kilojoules.
    #[arg(long)]
    pub output_kj: Option<f64>,
}
