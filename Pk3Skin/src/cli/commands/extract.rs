//! CLI command for PK3 extraction

use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{PACKAGE, print_done, print_step, simple_bar};
use crate::pk3::{Pk3Operations, Pk3Phase};

pub fn execute(
    source: &Path,
    destination: &Path,
    filters: &[String],
    files: &[String],
    progress: bool,
) -> anyhow::Result<()> {
    let start = Instant::now();

    if !files.is_empty() {
        let written = Pk3Operations::extract_files(source, destination, files)?;
        println!("Extracted {written} file(s)");
        return Ok(());
    }

    if progress {
        print_step(1, 1, PACKAGE, &format!("Extracting {}...", source.display()));
    }
    let pb = simple_bar(0, "Extracting");
    if !progress {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let written = Pk3Operations::extract_matching(source, destination, filters, &|p| {
        if p.phase == Pk3Phase::WritingFiles {
            pb.set_length(p.total as u64);
            pb.set_position(p.current as u64);
        }
    })?;
    pb.finish_and_clear();

    println!("Extracted {written} file(s) to {}", destination.display());
    if progress {
        print_done(start.elapsed());
    }
    Ok(())
}
