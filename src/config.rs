//! Command-line parsing and layered settings.
//!
//! Settings are resolved from, in increasing priority: built-in defaults, a
//! TOML file, `TILE_FORGE_*` environment variables and explicit CLI flags.

use crate::error::AppError;
use clap::{Parser, ValueEnum};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use wfc_core::{EntropyHeuristic, PropagationOrder};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tile-forge.toml";

/// Prefix of the environment variables read into [`Settings`].
pub const ENV_PREFIX: &str = "TILE_FORGE_";

/// Represents the different visualization modes available.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum VisualizationMode {
    /// No rendering.
    None,
    /// Colored blocks printed to stdout once the grid is resolved.
    #[default]
    Terminal,
}

/// Work-list order of the propagator, as exposed on the command line.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PropagationOrderArg {
    /// Most recently changed cell first.
    #[default]
    DepthFirst,
    /// Oldest changed cell first.
    BreadthFirst,
}

impl From<PropagationOrderArg> for PropagationOrder {
    fn from(value: PropagationOrderArg) -> Self {
        match value {
            PropagationOrderArg::DepthFirst => Self::DepthFirst,
            PropagationOrderArg::BreadthFirst => Self::BreadthFirst,
        }
    }
}

/// Cell selection heuristic, as exposed on the command line.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EntropyHeuristicArg {
    /// Fewest remaining candidates.
    #[default]
    Count,
    /// Weighted Shannon entropy.
    Shannon,
}

impl From<EntropyHeuristicArg> for EntropyHeuristic {
    fn from(value: EntropyHeuristicArg) -> Self {
        match value {
            EntropyHeuristicArg::Count => Self::Count,
            EntropyHeuristicArg::Shannon => Self::Shannon,
        }
    }
}

/// Log level for the whole application.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GlobalLogLevel {
    /// Everything, including per-cell propagation steps.
    Trace,
    /// Per-collapse details.
    Debug,
    /// Run milestones.
    #[default]
    Info,
    /// Restarts and recoverable problems.
    Warn,
    /// Failures only.
    Error,
}

/// Log level for the periodic progress reports.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressLogLevel {
    /// Trace
    Trace,
    /// Debug
    Debug,
    /// Info
    #[default]
    Info,
    /// Warn
    Warn,
}

/// Command-line interface of `tile-forge`.
///
/// Every option is optional so that unset flags fall through to the
/// config file, the environment, and finally the defaults.
#[derive(Parser, Serialize, Debug, Default)]
#[command(
    name = "tile-forge",
    author,
    version,
    about = "Fill a 2D grid with tiles under neighbor constraints"
)]
pub struct Cli {
    /// TOML config file. Defaults to `tile-forge.toml` when present.
    #[arg(short, long, value_name = "FILE")]
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// RON rule file defining the tiles. Uses the built-in terrain set if omitted.
    #[arg(short, long, value_name = "FILE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_file: Option<PathBuf>,

    /// Width of the grid.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,

    /// Height of the grid.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<usize>,

    /// Seed for the first attempt; later attempts use the following seeds.
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Number of runs to try before giving up on contradictions.
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,

    /// Maximum collapses per attempt.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u64>,

    /// Save resolved tile ids as text.
    #[arg(short, long, value_name = "FILE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// Save resolved tiles as CSV.
    #[arg(long, value_name = "FILE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_output: Option<PathBuf>,

    /// Report progress every interval (e.g. "1s", "500ms").
    #[arg(long, value_name = "DURATION")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_progress_interval: Option<String>,

    /// Choose the visualization mode.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization_mode: Option<VisualizationMode>,

    /// Propagation work-list order.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propagation_order: Option<PropagationOrderArg>,

    /// Heuristic used to choose the next cell.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy_heuristic: Option<EntropyHeuristicArg>,

    /// Global log level. `RUST_LOG` still takes precedence.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_log_level: Option<GlobalLogLevel>,

    /// Log level of progress reports.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_log_level: Option<ProgressLogLevel>,
}

/// Fully resolved application settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// RON rule file; `None` selects the built-in terrain catalog.
    pub rule_file: Option<PathBuf>,
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Seed of the first attempt. Drawn at random when unset.
    pub seed: Option<u64>,
    /// Runs to try before giving up on contradictions.
    pub attempts: u32,
    /// Maximum collapses per attempt. Defaults to the cell count.
    pub max_iterations: Option<u64>,
    /// Text output of the resolved tile ids.
    pub output_path: Option<PathBuf>,
    /// CSV output of the resolved tiles.
    pub csv_output: Option<PathBuf>,
    /// Progress reporting interval in humantime syntax.
    pub report_progress_interval: Option<String>,
    /// Rendering of the final grid.
    pub visualization_mode: VisualizationMode,
    /// Propagation work-list order.
    pub propagation_order: PropagationOrderArg,
    /// Cell selection heuristic.
    pub entropy_heuristic: EntropyHeuristicArg,
    /// Global log level.
    pub global_log_level: GlobalLogLevel,
    /// Progress report log level.
    pub progress_log_level: ProgressLogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rule_file: None,
            width: 32,
            height: 16,
            seed: None,
            attempts: 5,
            max_iterations: None,
            output_path: None,
            csv_output: None,
            report_progress_interval: None,
            visualization_mode: VisualizationMode::default(),
            propagation_order: PropagationOrderArg::default(),
            entropy_heuristic: EntropyHeuristicArg::default(),
            global_log_level: GlobalLogLevel::default(),
            progress_log_level: ProgressLogLevel::default(),
        }
    }
}

impl Settings {
    /// Resolves settings for `cli`, reading its config file and the process environment.
    pub fn load(cli: &Cli) -> Result<Self, AppError> {
        let config_file = match &cli.config {
            Some(path) if !path.exists() => {
                return Err(AppError::Config(format!(
                    "Config file {} does not exist",
                    path.display()
                )));
            }
            Some(path) => path.clone(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        Self::from_figment(Self::figment(cli, &config_file))
    }

    /// Builds the provider stack without extracting it.
    ///
    /// A missing TOML file contributes nothing.
    pub fn figment(cli: &Cli, config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(cli))
    }

    /// Extracts and validates settings from `figment`.
    pub fn from_figment(figment: Figment) -> Result<Self, AppError> {
        let settings: Self = figment
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.width == 0 || self.height == 0 {
            return Err(AppError::Config(format!(
                "Grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.attempts == 0 {
            return Err(AppError::Config("attempts must be at least 1".to_string()));
        }
        self.progress_interval().map(|_| ())
    }

    /// Parsed progress interval, if progress reporting is enabled.
    pub fn progress_interval(&self) -> Result<Option<Duration>, AppError> {
        self.report_progress_interval
            .as_deref()
            .map(|raw| {
                humantime::parse_duration(raw).map_err(|e| {
                    AppError::Config(format!("Invalid report_progress_interval '{raw}': {e}"))
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(args: &[&str], toml: Option<&str>) -> Result<Settings, AppError> {
        let cli = Cli::try_parse_from(args).map_err(|e| AppError::Config(e.to_string()))?;
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        if let Some(contents) = toml {
            std::fs::write(&path, contents)?;
        }
        // Skips the environment layer so ambient TILE_FORGE_* variables cannot leak in.
        Settings::from_figment(
            Figment::from(Serialized::defaults(Settings::default()))
                .merge(Toml::file(&path))
                .merge(Serialized::defaults(&cli)),
        )
    }

    #[test]
    fn test_defaults() {
        let settings = resolve(&["tile-forge"], None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.progress_interval().unwrap(), None);
    }

    #[test]
    fn test_basic_args() {
        let settings = resolve(
            &[
                "tile-forge",
                "--rule-file",
                "rules.ron",
                "--width",
                "20",
                "--output-path",
                "out.txt",
                "--seed",
                "7",
            ],
            None,
        )
        .unwrap();
        assert_eq!(settings.rule_file, Some(PathBuf::from("rules.ron")));
        assert_eq!(settings.width, 20);
        assert_eq!(settings.height, 16);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.output_path, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn test_file_values_are_overridden_by_flags() {
        let toml = r#"
            width = 8
            height = 4
            attempts = 2
            visualization_mode = "none"
            propagation_order = "breadth-first"
        "#;
        let settings = resolve(&["tile-forge", "--height", "9"], Some(toml)).unwrap();
        assert_eq!(settings.width, 8);
        assert_eq!(settings.height, 9);
        assert_eq!(settings.attempts, 2);
        assert_eq!(settings.visualization_mode, VisualizationMode::None);
        assert_eq!(settings.propagation_order, PropagationOrderArg::BreadthFirst);
    }

    #[test]
    fn test_progress_interval() {
        let settings = resolve(
            &["tile-forge", "--report-progress-interval", "2s"],
            None,
        )
        .unwrap();
        assert_eq!(
            settings.progress_interval().unwrap(),
            Some(Duration::from_secs(2))
        );

        let bad = resolve(
            &["tile-forge", "--report-progress-interval", "soon"],
            None,
        );
        assert!(matches!(bad, Err(AppError::Config(_))));
    }

    #[test]
    fn test_value_enums() {
        let settings = resolve(
            &[
                "tile-forge",
                "--visualization-mode",
                "none",
                "--entropy-heuristic",
                "shannon",
                "--global-log-level",
                "warn",
            ],
            None,
        )
        .unwrap();
        assert_eq!(settings.visualization_mode, VisualizationMode::None);
        assert_eq!(settings.entropy_heuristic, EntropyHeuristicArg::Shannon);
        assert_eq!(settings.global_log_level, GlobalLogLevel::Warn);

        assert!(Cli::try_parse_from(["tile-forge", "--visualization-mode", "window"]).is_err());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            resolve(&["tile-forge", "--width", "0"], None),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            resolve(&["tile-forge", "--attempts", "0"], None),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            resolve(&["tile-forge"], Some("width = \"wide\"")),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let cli = Cli::try_parse_from(["tile-forge", "--config", "/no/such/tile-forge.toml"])
            .unwrap();
        assert!(matches!(Settings::load(&cli), Err(AppError::Config(_))));
    }
}
