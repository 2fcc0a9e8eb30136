use clap::{Parser, Subcommand, ValueEnum};
use once_cell::sync::Lazy;
use std::path::PathBuf;

static LONG_VERSION: Lazy<String> = Lazy::new(|| {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");

    if GIT_HASH.is_empty() {
        VERSION.to_string()
    } else {
        format!("{} ({} {})", VERSION, GIT_HASH, GIT_COMMIT_DATE)
    }
});

#[derive(Parser, Debug)]
#[command(name = "hackmd")]
#[command(about = "Manage your HackMD notes from the terminal", long_about = None)]
#[command(version, long_version = LONG_VERSION.as_str())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage authentication
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Manage teams
    #[command(subcommand)]
    Team(TeamCommands),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Manage notes
    #[command(subcommand)]
    Note(NoteCommands),

    /// Manage note templates
    #[command(subcommand)]
    Template(TemplateCommands),
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Authenticate with the HackMD API
    Login {
        /// API token (will prompt if not provided)
        #[arg(long)]
        token: Option<String>,

        /// Profile name to store the token under
        #[arg(long, default_value = "default")]
        profile: String,
    },

    /// Show authentication status
    Status,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// List your teams
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = TeamFormat::Table)]
        format: TeamFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key (e.g. default.team)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// Create a new note
    Create {
        /// Note title
        #[arg(short, long)]
        title: String,

        /// Note content
        #[arg(short, long, conflicts_with = "template")]
        content: Option<String>,

        /// Render content from a stored template
        #[arg(long)]
        template: Option<String>,

        /// Template variable (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
    },

    /// List your notes
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = NoteFormat::Table)]
        format: NoteFormat,

        /// Maximum number of notes to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Print the content of a note
    Get {
        /// Note id
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List available templates
    List,

    /// Seed the built-in templates
    Init,

    /// Create or replace a template (content from --file or stdin)
    Create {
        /// Template name
        name: String,

        /// Read content from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeamFormat {
    Table,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteFormat {
    Table,
    Json,
    Csv,
}
