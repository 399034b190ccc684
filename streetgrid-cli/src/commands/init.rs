//! Init command - write a default configuration file.

use std::path::{Path, PathBuf};

use clap::Args;

use streetgrid::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Arguments for the init command.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Config file to write (default: ~/.streetgrid/config.ini)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Run the init command.
pub fn run(args: InitArgs) -> Result<(), CliError> {
    let path = args.path.unwrap_or_else(config_file_path);
    write_default_config(&path, args.force)?;

    println!("Wrote default configuration: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set access_token under [api], or export API_TOKEN");
    println!("  2. Run: streetgrid query --place \"<name>\" --output images.geojson");

    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        )));
    }
    ConfigFile::default().save_to(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_loadable_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        write_default_config(&path, false).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, ConfigFile::default());
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[query]\nzoom = 16\n").unwrap();

        assert!(matches!(
            write_default_config(&path, false),
            Err(CliError::Config(_))
        ));
        write_default_config(&path, true).unwrap();
        assert_eq!(ConfigFile::load_from(&path).unwrap(), ConfigFile::default());
    }
}
