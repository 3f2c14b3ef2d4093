//! CLI commands for staging models in the working cache

use std::path::Path;
use std::time::Instant;

use super::session::{open_browser, remember, scan, skin_path};
use crate::browser::ImportReport;
use crate::cli::progress::{DISK, LOOKING_GLASS, PACKAGE, print_done, print_step, print_warning};

pub fn import(game_path: Option<&str>, model: &str, skin: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut browser = open_browser(game_path);

    print_step(1, 2, LOOKING_GLASS, "Scanning game folder...");
    scan(&mut browser)?;
    let skin = match skin {
        Some(arg) => Some(skin_path(&mut browser, model, arg)?),
        None => None,
    };

    print_step(2, 2, PACKAGE, &format!("Staging {model}..."));
    let report = browser.import(model, skin.as_deref())?;
    print_report(&report);
    remember(&browser)?;

    print_done(start.elapsed());
    Ok(())
}

pub fn apply_skin(game_path: Option<&str>, model: &str, skin: &str) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut browser = open_browser(game_path);

    print_step(1, 2, LOOKING_GLASS, "Scanning game folder...");
    scan(&mut browser)?;
    let skin = skin_path(&mut browser, model, skin)?;

    print_step(2, 2, PACKAGE, &format!("Applying {skin}..."));
    let report = browser.apply_skin(model, &skin)?;
    print_report(&report);
    remember(&browser)?;

    print_done(start.elapsed());
    Ok(())
}

pub fn save_textures(game_path: Option<&str>, destination: Option<&Path>) -> anyhow::Result<()> {
    let mut browser = open_browser(game_path);
    print_step(1, 1, DISK, "Saving cached textures...");
    let copied = browser.save_textures(destination)?;
    println!("Saved {copied} textures");
    Ok(())
}

fn print_report(report: &ImportReport) {
    println!("Model:  {}", report.model_path.display());
    println!("Skin:   {} ({})", report.skin, report.skin_suffix);
    println!("Cache:  {}", report.cache_root.display());
    println!("Textures: {}", report.texture_map.len());
    for (from, to) in &report.renames {
        println!("  {from} -> {to}");
    }
    for missing in &report.missing {
        println!("  missing: {missing}");
    }
    for warning in report.warnings() {
        print_warning(&warning);
    }
}
