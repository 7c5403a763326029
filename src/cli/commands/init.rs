//! Init command - first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Taler Setup");
    println!();

    // Data directory
    let data_dir = settings.data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    // Configuration file
    let config_path = Settings::default_config_path();
    if !config_path.exists() {
        settings.save_to(&config_path)?;
        Output::success(&format!("Wrote default config: {}", config_path.display()));
    } else {
        Output::info(&format!("Config exists: {}", config_path.display()));
    }

    // Credentials
    if std::env::var("GOOGLE_API_KEY").is_err() {
        Output::warning("GOOGLE_API_KEY environment variable is not set.");
        println!();
        println!("  Taler needs a Google Cloud API key for speech recognition.");
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style("export GOOGLE_API_KEY='...'").green());
    } else {
        Output::success("Google API key is configured!");
    }

    println!();
    Output::info("Run 'taler doctor' to verify external tools.");
    Ok(())
}
