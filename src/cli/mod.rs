use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ptl-editor")]
#[command(author, version, about = "Terminal translation editor for Pootle-style servers", long_about = None)]
pub struct Cli {
    /// Use this fragment instead of the saved one (e.g. "filter=fuzzy&unit=12")
    #[arg(long, global = true)]
    pub hash: Option<String>,

    /// Server base URL, overriding the config file
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the unit table for the saved fragment
    Browse,

    /// Edit a specific unit
    Goto {
        /// Unit id
        uid: u64,
    },

    /// Move to the next unit
    Next,

    /// Move to the previous unit
    Prev,

    /// Jump to a page of results
    Page {
        number: u32,
    },

    /// Filter units by status (all, incomplete, untranslated, fuzzy, suggestions, checks, ...)
    Filter {
        name: String,

        /// Quality check to filter by when the status is "checks"
        #[arg(long)]
        check: Option<String>,
    },

    /// Search units; inline `in:source` style tokens pick the fields
    Search {
        /// Words to search for; no words clears the search
        text: Vec<String>,

        /// Fields to search in when the text has none (source, target, notes, locations)
        #[arg(long = "in", value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Submit a translation for the unit being edited and move on
    Submit(SubmitArgs),

    /// Post a suggestion for the unit being edited and move on
    Suggest(SubmitArgs),

    /// Show more context rows around the unit
    Context,

    /// Look up translation memory matches
    Tm,

    /// Machine translate the unit being edited
    Mt {
        /// Provider name (google, apertium)
        #[arg(default_value = "google")]
        provider: String,
    },

    /// Copy the source text into the targets
    Copy,

    /// Accept a suggestion
    Accept {
        suggestion: u64,
    },

    /// Reject a suggestion
    Reject {
        suggestion: u64,
    },

    /// Mark a failing quality check as a false positive
    RejectCheck {
        check: u64,
    },

    /// Render the highlighted difference between two strings
    Diff {
        old: String,
        new: String,

        /// Print the annotated HTML instead of colored text
        #[arg(long, default_value_t = false)]
        html: bool,
    },

    /// Show how a string is masked before machine translation
    Mask {
        text: String,
    },

    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    /// One value per plural form
    #[arg(required = true)]
    pub targets: Vec<String>,

    /// Mark the translation as fuzzy
    #[arg(long, default_value_t = false)]
    pub fuzzy: bool,

    /// Answer to a CAPTCHA challenge from a previous attempt
    #[arg(long)]
    pub captcha_answer: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., server.base_url)
        key: String,
        /// Value to set
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show config file path
    Path,

    /// Edit config file with default editor
    Edit,
}
