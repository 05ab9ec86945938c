fn main() -> anyhow::Result<()> {
    wikiscribe::cli::run_cli()
}
