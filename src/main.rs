mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use commands::convert::convert_command;
use commands::export::export_command;
use commands::jump::jump_command;
use commands::list::list_command;
use std::error::Error;
use std::path::PathBuf;
use waze2gpx::MergeMode;

#[derive(Parser)]
#[command(
    name = "waze2gpx",
    version,
    about = "Convert Waze account activity exports to GPX, GeoJSON and KML"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Convert the trips in a time window to a single output format")]
    Convert {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        window: WindowArgs,

        #[arg(long, value_enum, default_value_t = MergeMode::SeparateTracks)]
        merge_mode: MergeMode,

        #[arg(long, value_enum, default_value_t = OutputFormat::Gpx)]
        format: OutputFormat,

        #[arg(short, long, help = "Write to this file instead of stdout")]
        output: Option<PathBuf>,
    },

    #[command(about = "Write GPX, GeoJSON and KML files with generated names")]
    Export {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        window: WindowArgs,

        #[arg(long, value_enum, default_value_t = MergeMode::SeparateTracks)]
        merge_mode: MergeMode,

        #[arg(long, help = "Directory to write the files to")]
        output_dir: PathBuf,
    },

    #[command(about = "List the trips in a time window")]
    List {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        window: WindowArgs,
    },

    #[command(about = "Find the start time of the trip before or after an instant")]
    Jump {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, help = "Instant to search from")]
        from: String,

        #[arg(long, value_enum, default_value_t = Direction::Next)]
        direction: Direction,
    },
}

#[derive(Args)]
pub struct InputArgs {
    #[arg(help = "Export files to read; stdin is read when none are given")]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct WindowArgs {
    #[arg(long, help = "Earliest trip start to include (default: first trip)")]
    pub start: Option<String>,

    #[arg(long, help = "Latest trip start to include (default: last trip)")]
    pub end: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Gpx,
    Geojson,
    Kml,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Gpx => "gpx",
            OutputFormat::Geojson => "geojson",
            OutputFormat::Kml => "kml",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Next,
    Prev,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Convert {
            input,
            window,
            merge_mode,
            format,
            output,
        } => convert_command(&input, &window, merge_mode, format, output.as_deref()),
        Commands::Export {
            input,
            window,
            merge_mode,
            output_dir,
        } => export_command(&input, &window, merge_mode, &output_dir),
        Commands::List { input, window } => list_command(&input, &window),
        Commands::Jump {
            input,
            from,
            direction,
        } => jump_command(&input, &from, direction),
    }
}
