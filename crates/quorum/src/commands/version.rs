pub fn run() -> anyhow::Result<()> {
    println!("quorum {}", env!("CARGO_PKG_VERSION"));
    println!("Lifecycle reconciliation for governance forum topics and on-chain votes");
    Ok(())
}
