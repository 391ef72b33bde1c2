use clap::{Parser, Subcommand};
use lyricstudio_core::DEFAULT_SESSION_FILE_NAME;
use std::path::PathBuf;

/// Time lyrics against audio, export LRC and build render cues
#[derive(Parser, Debug)]
#[command(name = "lyricstudio", author, version, about)]
pub struct Cli {
    /// Session file holding the lyrics being edited
    #[arg(long, global = true, default_value = DEFAULT_SESSION_FILE_NAME)]
    pub session: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replace the lyrics with the timed lines of an LRC file
    Import { file: PathBuf },
    /// Replace the lyrics with untimed lines from a text file ("-" reads stdin)
    Paste { file: PathBuf },
    /// List lines in display order
    List,
    /// Edit single lines
    #[command(subcommand)]
    Line(LineCommand),
    /// Write the lyrics as an LRC file
    Export {
        /// Directory to write into (defaults to the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Name the file lyrics.lrc instead of "<title> - <artist>.lrc"
        #[arg(long)]
        legacy_name: bool,
        /// Print the LRC text instead of writing a file
        #[arg(long, conflicts_with = "out")]
        stdout: bool,
    },
    /// Print the render input (cues, frame size, length) as JSON
    Cues {
        /// Audio duration in seconds, if not known from the session
        #[arg(long)]
        duration: Option<f64>,
        /// Use the 720x1280 vertical layout
        #[arg(long)]
        vertical: bool,
    },
    /// Show the line that is active at a playback position
    Active {
        /// Playback position in seconds
        #[arg(long)]
        at: f64,
    },
    /// Check whether the lyrics can be saved, previewed and jumped through
    Check,
    /// Manage projects on the backend
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Load a project's lyrics and audio metadata into the session
    Pull {
        #[arg(long)]
        project: String,
    },
    /// Save the session's lyrics to a project
    Push {
        /// Project id (defaults to the session's project)
        #[arg(long)]
        project: Option<String>,
    },
    /// Keep saving the session to a project until interrupted
    Watch {
        /// Project id (defaults to the session's project)
        #[arg(long)]
        project: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LineCommand {
    /// Add a line timed at a playback position
    Add {
        text: String,
        /// Playback position in seconds
        #[arg(long)]
        at: f64,
        /// Insert after this line id instead of appending
        #[arg(long)]
        after: Option<u32>,
    },
    /// Change a line's text or timestamp
    Edit {
        id: u32,
        #[arg(long)]
        text: Option<String>,
        /// New timestamp in seconds
        #[arg(long, conflicts_with = "clear")]
        at: Option<f64>,
        /// Remove the timestamp
        #[arg(long)]
        clear: bool,
    },
    /// Delete a line
    Delete { id: u32 },
    /// Move a line to a position in display order
    Move { id: u32, index: usize },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Create a project and link it to the session
    Create { name: String },
    /// Show a project
    Show { id: String },
    /// Rename a project
    Rename { id: String, name: String },
    /// Delete a project
    Delete { id: String },
}
