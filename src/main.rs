fn main() -> anyhow::Result<()> {
    log_criteria::run()
}
