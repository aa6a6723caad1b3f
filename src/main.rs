use anyhow::Context;

fn main() -> anyhow::Result<()> {
    maskpaint::run().context("maskpaint failed")?;
    Ok(())
}
