use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

use fireside_core::{FiresideSort, OutlineItemKind, TagSort};

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Parser)]
#[command(name = "fireside")]
#[command(about = "fireside - browse, tag and compose the Fireside Archive")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses config file value or defaults to 'warn'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/fireside/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file (overrides config file and FIRESIDE_DB_PATH)
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the sample families, firesides, snippets and deepening
    Seed,

    /// Inspect and maintain tags
    #[command(subcommand)]
    Tags(TagsCommands),

    /// Manage snippets
    #[command(subcommand)]
    Snippet(SnippetCommands),

    /// Manage deepenings
    #[command(subcommand)]
    Deepening(DeepeningCommands),

    /// Manage firesides
    #[command(subcommand)]
    Fireside(FiresideCommands),

    /// Manage fireside families
    #[command(subcommand)]
    Family(FamilyCommands),

    /// Compose outlines
    #[command(subcommand)]
    Outline(OutlineCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum TagsCommands {
    /// List every tag with its reference count
    List {
        /// Sort by name or count
        #[arg(short, long, default_value = "name")]
        sort: TagSort,
    },

    /// Show one tag (case-insensitive name, or @id)
    Show { tag: String },

    /// Delete a tag record; references to it are left on their entities
    Delete { tag: String },

    /// Recompute every count from the live references
    Recount,
}

/// Tag entries: NAME[:WEIGHT[:DISTANCE]] or @ID[:WEIGHT[:DISTANCE]]
#[derive(Args, Debug, Clone, Default)]
pub struct TagArgs {
    /// Tag entry; repeat for several tags
    #[arg(short = 't', long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
}

#[derive(Subcommand)]
pub enum SnippetCommands {
    /// Create a snippet
    Add {
        #[arg(long)]
        fireside: String,

        #[arg(short, long)]
        name: String,

        /// Markdown body
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Read the markdown body from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Position within the fireside
        #[arg(long, default_value_t = 1.0)]
        order: f64,

        /// Hide from public listings
        #[arg(long)]
        private: bool,

        #[command(flatten)]
        tags: TagArgs,
    },

    /// Change a snippet; tags are replaced only when --tag or --clear-tags is given
    Edit {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long)]
        order: Option<f64>,

        /// public or private
        #[arg(long)]
        visibility: Option<fireside_core::Visibility>,

        #[command(flatten)]
        tags: TagArgs,

        /// Remove every tag
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },

    /// Delete a snippet and release its tags
    Delete { id: String },

    /// List snippets
    List {
        /// Only this fireside, in reading order
        #[arg(long)]
        fireside: Option<String>,

        /// Only public snippets (requires --fireside)
        #[arg(long, requires = "fireside")]
        public: bool,

        /// Case-insensitive search over name and text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a snippet with its tags and deepenings
    Show { id: String },
}

#[derive(Subcommand)]
pub enum DeepeningCommands {
    /// Attach a deepening to a snippet
    Add {
        #[arg(long)]
        snippet: String,

        #[arg(short, long)]
        name: String,

        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        #[arg(long)]
        file: Option<PathBuf>,

        /// Media id; repeat for several
        #[arg(long = "media")]
        media_ids: Vec<String>,

        #[command(flatten)]
        tags: TagArgs,
    },

    /// Delete a deepening and release its tags
    Delete { id: String },

    /// List the deepenings of a snippet
    List {
        #[arg(long)]
        snippet: String,
    },
}

#[derive(Subcommand)]
pub enum FiresideCommands {
    /// List firesides
    List {
        #[arg(short, long)]
        search: Option<String>,

        /// Only this family id
        #[arg(long)]
        family: Option<String>,

        /// date (newest first) or name
        #[arg(long, default_value = "date")]
        sort: FiresideSort,
    },

    /// Create a fireside
    Add {
        /// Family id
        #[arg(long)]
        family: String,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: String,

        /// YYYY-MM-DD; defaults to today
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum FamilyCommands {
    /// Create a fireside family
    Add {
        #[arg(long)]
        uid: String,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: String,
    },

    /// List families
    List,
}

#[derive(Subcommand)]
pub enum OutlineCommands {
    /// List outlines of a user, or the public ones
    List {
        #[arg(long, conflicts_with = "public", required_unless_present = "public")]
        user: Option<String>,

        #[arg(long)]
        public: bool,
    },

    /// Create an empty outline
    Create {
        #[arg(long)]
        user: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        public: bool,
    },

    /// Append a snippet or deepening to an outline
    AddItem {
        outline: String,

        /// snippet or deepening
        #[arg(long)]
        kind: OutlineItemKind,

        /// Id of the snippet or deepening
        #[arg(long = "ref")]
        ref_id: String,

        /// Nest under this item id
        #[arg(long)]
        parent: Option<String>,
    },

    /// Remove an item (and its children)
    RemoveItem { outline: String, item: String },

    /// Show or hide an item; hidden items hide their children too
    Toggle { outline: String, item: String },

    /// Print an outline as an indented tree
    Show { outline: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize a new config file
    Init {
        /// Path for the config file (defaults to ~/.config/fireside/config.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite existing config file
        #[arg(short = 'F', long)]
        force: bool,
    },

    /// Show the current effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fireside", "tags", "list", "--sort", "count", "--format", "json", "--db-path", "x.db",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.db_path, Some(PathBuf::from("x.db")));
        assert!(matches!(
            cli.command,
            Commands::Tags(TagsCommands::List { sort: TagSort::Count })
        ));
    }

    #[test]
    fn test_snippet_add_requires_text_or_file() {
        let result = Cli::try_parse_from([
            "fireside", "snippet", "add", "--fireside", "f1", "--name", "Purpose",
        ]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "fireside", "snippet", "add", "--fireside", "f1", "--name", "Purpose",
            "--text", "# Why", "-t", "Purpose:8", "-t", "Creation",
        ])
        .unwrap();
        match cli.command {
            Commands::Snippet(SnippetCommands::Add { tags, .. }) => {
                assert_eq!(tags.tags, vec!["Purpose:8", "Creation"]);
            }
            _ => panic!("expected snippet add"),
        }
    }
}
