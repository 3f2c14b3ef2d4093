use clap::Subcommand;
use std::path::PathBuf;

pub mod config_cmd;
pub mod extract;
pub mod import;
pub mod list;
pub mod models;
mod session;

#[derive(Subcommand)]
pub enum Commands {
    /// List PK3 contents
    List {
        /// PK3 file
        #[arg(short, long)]
        source: PathBuf,

        /// Show detailed info (sizes, compression ratio, timestamps)
        #[arg(short, long)]
        detailed: bool,

        /// Only list files matching glob pattern (e.g., "*.skin")
        #[arg(long)]
        filter: Option<String>,

        /// Only show count of matching files
        #[arg(short, long)]
        count: bool,
    },

    /// Extract a PK3 file
    Extract {
        /// Source PK3 file
        #[arg(short, long)]
        source: PathBuf,

        /// Output directory
        #[arg(short, long)]
        destination: PathBuf,

        /// Only extract files matching glob pattern (repeatable)
        #[arg(long, conflicts_with = "file")]
        filter: Vec<String>,

        /// Extract specific files by internal path (repeatable)
        #[arg(long, conflicts_with = "filter")]
        file: Vec<String>,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// List player models found under the game folder
    Models {
        /// Case-insensitive name filter
        search: Option<String>,

        /// Also report archives that could not be read
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the skins of a model
    Skins {
        /// Model name
        model: String,
    },

    /// Stage a model and skin in the working cache
    Import {
        /// Model name
        model: String,

        /// Skin path (defaults to model_default.skin or the first skin)
        #[arg(short, long)]
        skin: Option<String>,
    },

    /// Switch the staged model to another skin
    Skin {
        /// Model name
        model: String,

        /// Skin path or label (e.g. "blue")
        skin: String,
    },

    /// Copy the staged textures to a folder
    SaveTextures {
        /// Output folder (defaults to the saved texture folder)
        #[arg(short, long)]
        destination: Option<PathBuf>,
    },

    /// Show or change saved settings
    Config {
        #[command(subcommand)]
        command: config_cmd::ConfigCommands,
    },
}

impl Commands {
    pub fn execute(&self, game_path: Option<&str>) -> anyhow::Result<()> {
        match self {
            Commands::List {
                source,
                detailed,
                filter,
                count,
            } => list::execute(source, *detailed, filter.as_deref(), *count),
            Commands::Extract {
                source,
                destination,
                filter,
                file,
                quiet,
            } => extract::execute(source, destination, filter, file, !*quiet),
            Commands::Models { search, verbose } => {
                models::list_models(game_path, search.as_deref().unwrap_or_default(), *verbose)
            }
            Commands::Skins { model } => models::list_skins(game_path, model),
            Commands::Import { model, skin } => import::import(game_path, model, skin.as_deref()),
            Commands::Skin { model, skin } => import::apply_skin(game_path, model, skin),
            Commands::SaveTextures { destination } => {
                import::save_textures(game_path, destination.as_deref())
            }
            Commands::Config { command } => command.execute(),
        }
    }
}
