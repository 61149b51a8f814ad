use anyhow::Result;
use fmd_io::{config, Config};
use std::path::Path;

fn effective_path(explicit: Option<&Path>) -> std::path::PathBuf {
    explicit.map_or_else(config::config_file_path, Path::to_path_buf)
}

/// Show the current effective configuration.
pub fn show_config(config: &Config, explicit: Option<&Path>) -> Result<()> {
    let path = effective_path(explicit);

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", path.display());
    println!(
        "File exists: {}\n",
        if path.exists() { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    println!("  estimator: {}", config.estimator);
    println!("  block_size: {}", config.block_size);
    println!("  tolerance: {:e}", config.tolerance);
    println!("  logging.level: {}", config.logging.level);
    println!("  logging.coloured: {}", config.logging.coloured);
    println!("  logging.report_caller: {}", config.logging.report_caller);

    println!("\nPriority: CLI args > ENV vars (FMD_*) > Config file > Defaults");

    Ok(())
}

/// Show the config file path.
pub fn show_path(explicit: Option<&Path>) -> Result<()> {
    println!("{}", effective_path(explicit).display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults, at `explicit` when given.
pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let config_path = effective_path(explicit);
    let created = config::ensure_config_file_at(&config_path)?;

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure fmd.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
