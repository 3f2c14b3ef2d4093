//! CLI commands for saved settings

use clap::Subcommand;

use crate::config::Config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the saved settings
    Show,

    /// Set the game folder
    SetGamePath {
        /// Game folder (its `base` subfolder is used when present)
        path: String,
    },

    /// Set the folder textures are saved to
    SetTextureDir {
        path: String,
    },

    /// Set the working cache folder (relative paths live under the game folder)
    SetCacheFolder {
        path: String,
    },
}

impl ConfigCommands {
    pub fn execute(&self) -> anyhow::Result<()> {
        let mut config = Config::load();
        match self {
            ConfigCommands::Show => {
                if let Some(path) = Config::config_path() {
                    println!("# {}", path.display());
                }
                println!("{}", serde_json::to_string_pretty(&config)?);
                return Ok(());
            }
            ConfigCommands::SetGamePath { path } => {
                config.game_path = Some(path.clone());
                if let Ok(root) = config.scan_root()
                    && !root.is_dir()
                {
                    eprintln!("Warning: {} does not exist", root.display());
                }
            }
            ConfigCommands::SetTextureDir { path } => config.texture_save_dir = Some(path.clone()),
            ConfigCommands::SetCacheFolder { path } => {
                config.cache_folder.clone_from(path);
                config.validate_cache_folder()?;
            }
        }
        config.save()?;
        println!("Saved");
        Ok(())
    }
}
