use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "slotbox")]
#[command(about = "Slot configuration CLI", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and display the persisted slot
    Show,
    /// List the available providers and their operations
    Providers,
    /// Apply edits and persist the slot
    Save(SaveArgs),
    /// Submit a one-off test run against the current configuration
    Test(TestArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct SaveArgs {
    /// Display name for the slot
    #[arg(long)]
    pub title: Option<String>,

    /// Provider slug
    #[arg(long)]
    pub provider: Option<String>,

    /// Operation slug
    #[arg(long)]
    pub operation: Option<String>,

    #[arg(long)]
    pub prompt: Option<String>,

    /// Aspect ratio, e.g. "16:9"
    #[arg(long)]
    pub aspect_ratio: Option<String>,

    /// Resolution tier, e.g. "2K"
    #[arg(long)]
    pub resolution: Option<String>,

    /// Attach a template image from this path
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Drop the stored template binding
    #[arg(long)]
    pub remove_template: bool,
}

#[derive(clap::Args, Debug)]
pub struct TestArgs {
    #[command(flatten)]
    pub edits: SaveArgs,

    /// Test image to process
    #[arg(long)]
    pub image: PathBuf,
}
