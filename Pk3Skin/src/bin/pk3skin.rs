//! pk3skin command-line binary

fn main() -> anyhow::Result<()> {
    pk3skin::cli::run_cli()
}
