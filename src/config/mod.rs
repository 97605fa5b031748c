pub mod cli;
pub mod map_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use map_config::MapConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "dp-map")]
#[command(about = "Renders evacuation shelters, AEDs and flood/tsunami hazard overlays onto one HTML map")]
pub struct CliArgs {
    /// Path to a TOML configuration file; built-in defaults are used without one
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory the HTML file is written to
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Name of the HTML file
    #[arg(long)]
    pub output_file: Option<String>,

    /// HTTP timeout for dataset downloads, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Put dataset text into popups without HTML escaping
    #[arg(long)]
    pub raw_popups: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Log elapsed time and memory after each phase
    #[arg(long)]
    pub monitor: bool,

    /// Show what would be fetched and written without doing it
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliArgs {
    /// Loads the configuration file (or the defaults) and applies command-line overrides.
    pub fn load_config(&self) -> Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::from_file(path)?,
            None => MapConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut MapConfig) {
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(file) = &self.output_file {
            config.output.file_name = file.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.http.timeout_seconds = secs;
        }
        if self.raw_popups {
            config.map.escape_popup_text = false;
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_file_values() {
        let args = CliArgs::parse_from([
            "dp-map",
            "--output-dir",
            "/tmp/maps",
            "--output-file",
            "miyazaki.html",
            "--timeout-secs",
            "5",
            "--raw-popups",
        ]);

        let config = args.load_config().unwrap();

        assert_eq!(config.output.directory, "/tmp/maps");
        assert_eq!(config.output.file_name, "miyazaki.html");
        assert_eq!(config.http.timeout_seconds, 5);
        assert!(!config.map.escape_popup_text);
    }

    #[test]
    fn test_no_flags_keeps_defaults() {
        let args = CliArgs::parse_from(["dp-map"]);
        let config = args.load_config().unwrap();
        assert_eq!(config.output_file(), std::path::Path::new(".").join("dp_map.html").to_string_lossy());
        assert!(config.map.escape_popup_text);
    }
}
