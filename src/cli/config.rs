use crate::error::Result;
use crate::settings::{save_settings, settings_path, Settings};

pub fn show(settings: &Settings) -> Result<()> {
    println!("Settings:     {}", settings_path().display());
    println!("Delimiter:    {:?}", settings.delimiter);
    println!("Result file:  {}", settings.result_file);
    println!(
        "Log file:     {}",
        settings.log_file.as_deref().unwrap_or("(console only)")
    );
    println!("Log level:    {}", settings.log_level);
    Ok(())
}

/// Apply the given changes to a copy of `settings`.
pub fn apply(
    settings: &Settings,
    delimiter: Option<String>,
    result_file: Option<String>,
    log_file: Option<String>,
    log_level: Option<String>,
) -> Settings {
    let mut updated = settings.clone();
    if let Some(d) = delimiter {
        updated.delimiter = d;
    }
    if let Some(r) = result_file {
        updated.result_file = r;
    }
    if let Some(l) = log_file {
        updated.log_file = if l == "none" { None } else { Some(l) };
    }
    if let Some(l) = log_level {
        updated.log_level = l;
    }
    updated
}

pub fn set(
    settings: &Settings,
    delimiter: Option<String>,
    result_file: Option<String>,
    log_file: Option<String>,
    log_level: Option<String>,
) -> Result<()> {
    let updated = apply(settings, delimiter, result_file, log_file, log_level);
    save_settings(&updated)?;
    println!("Saved {}", settings_path().display());
    Ok(())
}
