use anyhow::Result;
use calman_provider_google::GoogleSource;

pub async fn run() -> Result<()> {
    let mut source = GoogleSource::new();
    source.authenticate_interactive().await?;

    println!("\nAuthenticated with Google.");
    println!("Run `calman week` to see your calendar.");
    Ok(())
}
