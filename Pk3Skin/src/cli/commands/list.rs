//! CLI command for listing PK3 contents

use std::path::Path;

use crate::pk3::{Pk3Operations, member_matches};

/// Format byte size for human-readable output
fn format_size(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else {
        format!("{bytes}")
    }
}

pub fn execute(
    source: &Path,
    detailed: bool,
    filter: Option<&str>,
    count: bool,
) -> anyhow::Result<()> {
    if detailed {
        let entries: Vec<_> = Pk3Operations::list_detailed(source)?
            .into_iter()
            .filter(|e| member_matches(filter.as_slice(), &e.path))
            .collect();

        if count {
            println!("{}", entries.len());
            return Ok(());
        }

        println!(
            "{:>10}  {:>10}  {:>6}  {:<16}  PATH",
            "SIZE", "COMPRESSED", "SAVED", "MODIFIED"
        );
        for entry in &entries {
            let modified = entry
                .modified
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            println!(
                "{:>10}  {:>10}  {:>5.1}%  {:<16}  {}",
                format_size(entry.size),
                format_size(entry.compressed_size),
                entry.ratio(),
                modified,
                entry.path
            );
        }

        let total: u64 = entries.iter().map(|e| e.size).sum();
        let compressed: u64 = entries.iter().map(|e| e.compressed_size).sum();
        println!();
        println!(
            "{} files, {} total ({} compressed)",
            entries.len(),
            format_size(total),
            format_size(compressed)
        );
    } else {
        let files: Vec<_> = Pk3Operations::list(source)?
            .into_iter()
            .filter(|f| member_matches(filter.as_slice(), f))
            .collect();

        if count {
            println!("{}", files.len());
            return Ok(());
        }
        for file in files {
            println!("{file}");
        }
    }

    Ok(())
}
