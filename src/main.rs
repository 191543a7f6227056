// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use chm_translator::app_config::{self, Config, TranslationProvider};
use chm_translator::{Controller, RunOutcome};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Google,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Google => TranslationProvider::Google,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for translate-archive
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// translate-archive - Translate compiled HTML help archives
///
/// Decompiles a CHM archive, translates the text of its pages and the labels of its
/// table of contents and index, and compiles a new archive.
#[derive(Parser, Debug)]
#[command(name = "translate-archive")]
#[command(version)]
#[command(about = "Translate compiled HTML help archives (CHM)")]
#[command(long_about = "translate-archive decompiles a CHM help archive, translates its pages and navigation, and compiles the result.

EXAMPLES:
    translate-archive manual.chm                    # Writes '[EN] manual.chm' next to the input
    translate-archive manual.chm out/manual.chm     # Explicit output path
    translate-archive -s zh -t en manual.chm        # Translate from Chinese to English
    translate-archive -p ollama -m mistral a.chm    # Use a local Ollama model
    translate-archive -r /docs                      # Translate every archive below /docs
    translate-archive completions bash > ta.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

EXTERNAL TOOLS:
    Windows:   hh.exe -decompile / hhc.exe (HTML Help Workshop)
    Elsewhere: extract_chmLib (chmlib) / chmcmd (Free Pascal)

SUPPORTED PROVIDERS:
    google    - Google Translate (no key needed; set api_key to use the v2 API)
    ollama    - Local Ollama server")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input archive, or directory with --recursive
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output archive (single archive mode only)
    #[arg(value_name = "OUTPUT_PATH")]
    output_path: Option<PathBuf>,

    /// Translate every archive found below INPUT_PATH
    #[arg(short, long)]
    recursive: bool,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'ja', 'zh', 'de')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌",
            Level::Warn => "🚧",
            Level::Info => " ",
            Level::Debug => "🔍",
            Level::Trace => "📋",
        }
    }

    // @returns: ANSI colour code for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the max level is narrowed once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "translate-archive", &mut std::io::stdout());
        return Ok(());
    }

    let has_failures = run_translate(cli).await?;
    if has_failures {
        std::process::exit(1);
    }

    Ok(())
}

/// Load the configuration file, creating it with defaults when it does not exist
fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path).context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        Ok(config)
    }
}

/// Apply command line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, options: &CommandLineOptions) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

/// Run the translation; returns whether any archive failed
async fn run_translate(options: CommandLineOptions) -> Result<bool> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let input_path = options
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

    let mut config = load_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(level_filter(&config.log_level));

    let controller = Controller::new(config)?.with_force_overwrite(options.force_overwrite);

    if options.recursive {
        if !input_path.is_dir() {
            return Err(anyhow!("--recursive expects a directory: {:?}", input_path));
        }
        if options.output_path.is_some() {
            warn!("OUTPUT_PATH is ignored in recursive mode");
        }

        let summary = controller.run_folder(&input_path).await?;
        return Ok(summary.has_failures());
    }

    if input_path.is_dir() {
        return Err(anyhow!("{:?} is a directory, use --recursive to process it", input_path));
    }

    match controller.run(&input_path, options.output_path.as_deref()).await? {
        RunOutcome::Translated(report) => {
            info!("Translated archive written to {:?}", report.output);
        }
        RunOutcome::Skipped(output) => {
            info!("Nothing to do, {:?} already exists", output);
        }
    }

    Ok(false)
}
