//! Shared setup for commands that work on the game folder

use crate::browser::ModelBrowser;
use crate::cli::progress::simple_spinner;
use crate::config::Config;
use crate::utils::normalize_rel;

/// Browser over the saved settings, with an optional one-off game path.
pub fn open_browser(game_path: Option<&str>) -> ModelBrowser {
    let mut browser = ModelBrowser::new(Config::load());
    if let Some(path) = game_path {
        browser.set_game_path(path);
    }
    browser
}

/// Build the index behind a spinner.
pub fn scan(browser: &mut ModelBrowser) -> anyhow::Result<()> {
    let pb = simple_spinner("Scanning game folder...");
    let result = browser.index_with_progress(&|progress| {
        let msg = match &progress.current_file {
            Some(file) => format!("{} {}", progress.phase.as_str(), file),
            None => progress.phase.as_str().to_string(),
        };
        pb.set_message(msg);
    });
    pb.finish_and_clear();
    result?;
    Ok(())
}

/// Persist the last model/skin choice without saving a one-off game path.
pub fn remember(browser: &ModelBrowser) -> anyhow::Result<()> {
    let mut saved = Config::load();
    saved.last_model.clone_from(&browser.config().last_model);
    saved.last_skin.clone_from(&browser.config().last_skin);
    saved.save()?;
    Ok(())
}

/// Accept either a skin path or its display label.
pub fn skin_path(browser: &mut ModelBrowser, model: &str, arg: &str) -> anyhow::Result<String> {
    let wanted = normalize_rel(arg);
    browser
        .skins(model)?
        .into_iter()
        .find(|s| normalize_rel(&s.path) == wanted || s.label.eq_ignore_ascii_case(arg))
        .map(|s| s.path)
        .ok_or_else(|| anyhow::anyhow!("model {model} has no skin {arg}"))
}
