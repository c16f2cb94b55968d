// Command-line interface: the HTTP server plus local corpus queries

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cookmate")]
#[command(about = "Cookmate - recipe search and recommendations", long_about = None)]
pub struct Cli {
    /// Recipe CSV file (overrides CORPUS_PATH)
    #[arg(long, global = true)]
    pub corpus: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Search recipes by free text
    Search {
        /// Search query
        query: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Recommend recipes by ingredients or by a recipe name
    Recommend {
        /// Comma-separated ingredient list
        #[arg(long, conflicts_with = "recipe", required_unless_present = "recipe")]
        ingredients: Option<String>,

        /// Name of a recipe to find similar ones for
        #[arg(long)]
        recipe: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show a recipe by ID
    Show {
        /// Recipe ID
        recipe_id: i64,
    },

    /// List the dietary, allergy and cuisine filter labels
    Options,

    /// Suggest spellings for comma-separated ingredient text
    Suggest {
        /// Ingredient text
        text: String,
    },

    /// Export the corpus term dictionary, one term per line
    Vocab {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Filters shared by search and recommendations
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Dietary labels, comma-separated (e.g. vegan,gluten-free)
    #[arg(long)]
    pub dietary: Option<String>,

    /// Allergy labels, comma-separated (e.g. nuts,soy)
    #[arg(long)]
    pub allergies: Option<String>,

    /// Cuisines, comma-separated (e.g. italian,mexican)
    #[arg(long)]
    pub cuisine: Option<String>,

    /// Maximum calories per serving
    #[arg(long)]
    pub max_calories: Option<f64>,

    /// Maximum total time in minutes
    #[arg(long)]
    pub max_time: Option<u32>,
}
