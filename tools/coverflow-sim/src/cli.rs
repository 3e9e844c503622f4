use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// Drive the Coverflow animator on the host and capture what it paints.
#[derive(Parser, Debug)]
#[command(name = "coverflow-sim", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format for all subcommands.
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub output: OutputFormat,

    /// Animator configuration file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a command script without a render thread and save the final
    /// frame as PNG.
    Snapshot(SnapshotArgs),

    /// Start the render thread and read command tokens from stdin.
    Run(RunArgs),
}

/// Synthetic screen and window set.
#[derive(Args, Debug, Clone)]
pub struct SceneArgs {
    /// Screen width in pixels.
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Screen height in pixels.
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Number of full-screen client windows.
    #[arg(long, default_value_t = 3)]
    pub windows: u32,

    /// Add a decoration bar along the top edge.
    #[arg(long)]
    pub decoration: bool,
}

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    /// Comma-separated command tokens, e.g. "go(),right()".
    #[arg(long, default_value = "go()")]
    pub script: String,

    /// Frames to render after each command; runs until idle when omitted.
    #[arg(long)]
    pub frames: Option<u32>,

    /// PNG file to write.
    #[arg(long, short)]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    /// Serve the reserved-region protocol on this Unix socket. Overrides
    /// `socket_path` from the config file.
    #[arg(long)]
    pub socket: Option<PathBuf>,
}
