//! CLI commands for browsing models and skins

use console::style;

use super::session::{open_browser, scan};
use crate::cli::progress::print_warning;

pub fn list_models(game_path: Option<&str>, search: &str, verbose: bool) -> anyhow::Result<()> {
    let mut browser = open_browser(game_path);
    scan(&mut browser)?;

    let models = browser.list_models(search)?;
    if models.is_empty() {
        println!("No models found");
    } else {
        println!("{:<24}  {:>5}  SOURCE", "MODEL", "SKINS");
        for model in &models {
            println!("{:<24}  {:>5}  {}", model.name, model.skin_count, model.source);
        }
        println!();
        println!("{} models", models.len());
    }

    if verbose {
        for skipped in browser.index()?.skipped_archives() {
            print_warning(&format!("Skipped {}: {}", skipped.path.display(), skipped.reason));
        }
    }
    Ok(())
}

pub fn list_skins(game_path: Option<&str>, model: &str) -> anyhow::Result<()> {
    let mut browser = open_browser(game_path);
    scan(&mut browser)?;

    let default = browser.default_skin(model)?;
    let skins = browser.skins(model)?;
    if skins.is_empty() {
        println!("{model} has no skins");
        return Ok(());
    }

    for skin in skins {
        let marker = if default.as_deref() == Some(skin.path.as_str()) { "*" } else { " " };
        println!("{marker} {:<16} {}", style(&skin.label).bold(), skin.path);
    }
    Ok(())
}
