// src/cli/args.rs
use crate::domain::{NoteKind, NoteOrder, SortKey};
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to the note database (overrides config and environment)
    #[arg(short, long, value_name = "DATABASE", global = true)]
    pub database: Option<PathBuf>,

    /// Path to config file (default: <config dir>/studynotes/config.toml)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a default config file (to --config or the default location)
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Create a note as the signed-in user
    #[command(group(ArgGroup::new("body").args(["content", "content_file"])))]
    Create {
        #[arg(value_name = "TITLE")]
        title: String,

        /// Markdown content
        #[arg(long)]
        content: Option<String>,

        /// Read markdown content from a file
        #[arg(long, value_name = "PATH")]
        content_file: Option<PathBuf>,

        /// Note type: markdown, pdf or image
        #[arg(short = 't', long = "type", default_value = "markdown")]
        kind: NoteKind,

        /// Attachment for pdf and image notes
        #[arg(short, long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Tag (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        #[arg(short, long)]
        subject: Option<String>,

        /// Only the author can see the note
        #[arg(long)]
        private: bool,
    },

    /// Show a note in the browser and count the view
    #[command(group(ArgGroup::new("output").args(["json", "html"])))]
    View {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        /// Print the note as JSON instead of opening the browser
        #[arg(long)]
        json: bool,

        /// Print the HTML page instead of opening the browser
        #[arg(long)]
        html: bool,
    },

    /// Like a note
    Like {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Withdraw a like
    Unlike {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Change fields of one of your notes
    #[command(group(ArgGroup::new("visibility").args(["public", "private"])))]
    Edit {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        /// Replace the tags (repeatable)
        #[arg(long = "tag", value_name = "TAG", conflicts_with = "clear_tags")]
        tags: Vec<String>,

        #[arg(long)]
        clear_tags: bool,

        #[arg(short, long, conflicts_with = "clear_subject")]
        subject: Option<String>,

        #[arg(long)]
        clear_subject: bool,

        #[arg(long)]
        public: bool,

        #[arg(long)]
        private: bool,
    },

    /// Delete one of your notes
    Delete {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// List notes; public notes unless --mine
    List {
        /// Your own notes, public and private
        #[arg(long)]
        mine: bool,

        #[arg(short, long)]
        subject: Option<String>,

        /// Notes carrying any of these tags (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// recent or popular
        #[arg(short, long, default_value = "recent")]
        order: NoteOrder,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Search public notes (or your own with --mine)
    Search {
        /// Text matched against title, content, author and tags
        #[arg(value_name = "QUERY")]
        query: Option<String>,

        #[arg(long)]
        mine: bool,

        /// Exact tag, or "all"
        #[arg(long)]
        tag: Option<String>,

        /// Exact subject, or "all"
        #[arg(short, long)]
        subject: Option<String>,

        /// popular, recent or title
        #[arg(long, default_value = "popular")]
        sort: SortKey,
    },

    /// Most used tags
    Tags {
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Most used subjects
    Subjects {
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Totals over your notes
    Stats,

    /// Sign in and show the stored profile
    Whoami,
}
