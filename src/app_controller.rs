use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::archive::{Compiler, Decompiler, ExternalTool};
use crate::encoding::EncodingResolver;
use crate::file_utils::FileManager;
use crate::pipeline::{ArchiveTranslator, PipelineOptions, PipelineReport};
use crate::providers::{self, Provider};
use crate::translation::{RetryingProvider, TranslationCache, TranslationClient};

// @module: Application controller for archive translation

/// Extension of compiled help archives
const ARCHIVE_EXTENSION: &str = "chm";

/// What a single-archive run did
#[derive(Debug)]
pub enum RunOutcome {
    /// The archive was translated and compiled
    Translated(PipelineReport),
    /// The output already existed and overwriting was not forced
    Skipped(PathBuf),
}

/// Totals of a recursive run
#[derive(Debug, Default)]
pub struct FolderSummary {
    pub succeeded: usize,
    pub skipped: usize,
    // @field: Failed archives with the error that stopped them
    pub failed: Vec<(PathBuf, String)>,
}

impl FolderSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Main application controller for archive translation
#[derive(Debug)]
pub struct Controller {
    // @field: App configuration
    config: Config,
    translator: ArchiveTranslator,
    force_overwrite: bool,
    show_progress: bool,
}

impl Controller {
    /// Create a controller from configuration: validates the external tools and builds
    /// the configured provider
    pub fn new(config: Config) -> Result<Self> {
        let decompiler = ExternalTool::from_config("decompiler", &config.tools.decompiler);
        let compiler = ExternalTool::from_config("compiler", &config.tools.compiler);
        let decompiler_path = decompiler.validate()?;
        let compiler_path = compiler.validate()?;
        debug!("Decompiler: {:?}, compiler: {:?}", decompiler_path, compiler_path);

        let provider = providers::from_config(&config.translation)?;
        Ok(Self::with_components(config, Arc::new(decompiler), Arc::new(compiler), provider)?.with_progress(true))
    }

    // @method: Create a controller around the given collaborators
    pub fn with_components(
        config: Config,
        decompiler: Arc<dyn Decompiler>,
        compiler: Arc<dyn Compiler>,
        provider: Arc<dyn Provider>,
    ) -> Result<Self> {
        let options = PipelineOptions::from_config(&config).context("Invalid archive settings")?;
        let resolver = EncodingResolver::with_source_encoding(config.archive.source_encoding.as_deref())
            .context("Invalid source encoding")?;
        let client = Arc::new(Self::build_client(&config, provider));

        Ok(Self {
            translator: ArchiveTranslator::new(decompiler, compiler, client, resolver, options),
            config,
            force_overwrite: false,
            show_progress: false,
        })
    }

    pub fn with_force_overwrite(mut self, force_overwrite: bool) -> Self {
        self.force_overwrite = force_overwrite;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self.translator = self.translator.with_progress(show_progress);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Wrap the provider with retries, then pacing, deadline and cache
    fn build_client(config: &Config, provider: Arc<dyn Provider>) -> TranslationClient {
        let common = &config.translation.common;
        let backoff = Duration::from_millis(common.retry_backoff_ms);
        let retrying: Arc<dyn Provider> = Arc::new(RetryingProvider::new(provider, common.retry_count, backoff));

        let deadline = client_deadline(config.translation.get_timeout_secs(), common.retry_count, backoff);

        TranslationClient::new(retrying)
            .with_timeout(deadline)
            .with_request_delay(Duration::from_millis(common.rate_limit_delay_ms))
            .with_cache(TranslationCache::new(common.cache_enabled))
    }

    /// Default output path: the input's name with the output prefix, beside the input
    pub fn output_path_for(&self, input_file: &Path) -> PathBuf {
        FileManager::generate_output_path(input_file, &self.config.output_prefix())
    }

    /// Translate one archive to `output_file`, or next to the input when `None`
    pub async fn run(&self, input_file: &Path, output_file: Option<&Path>) -> Result<RunOutcome> {
        let start_time = std::time::Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = output_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.output_path_for(input_file));
        if output_path == input_file {
            return Err(anyhow!("Output path is the input file: {:?}", input_file));
        }
        if output_path.exists() && !self.force_overwrite {
            warn!(
                "Skipping {:?}, translation already exists (use -f to force overwrite)",
                input_file
            );
            return Ok(RunOutcome::Skipped(output_path));
        }

        info!(
            "Translating {:?} from {} to {} with {}",
            input_file,
            self.config.source_language,
            self.config.target_language,
            self.config.translation.provider.display_name()
        );

        let options = self.translator.options();
        debug!(
            "Pages: {:?}, output encoding {}, {} at a time",
            options.page_extensions,
            options.output_encoding.name(),
            options.concurrent_pages
        );

        let report = self
            .translator
            .translate_archive(input_file, &output_path)
            .await
            .with_context(|| format!("Failed to translate {:?}", input_file))?;

        let client = self.translator.client();
        let cache_stats = client.cache().stats();
        let client_stats = client.stats();
        info!(
            "Done in {}: {} requests, {} failures, cache hit rate {:.0}%",
            Self::format_duration(start_time.elapsed()),
            client_stats.requests,
            client_stats.failures,
            cache_stats.hit_rate() * 100.0
        );
        if report.failed_strings() > 0 {
            warn!("{} strings kept their original text", report.failed_strings());
        }
        info!("Output written to {:?}", report.output);

        Ok(RunOutcome::Translated(report))
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Translate every archive below `input_dir`.
    /// Archives that already carry the output prefix are not inputs; archives whose
    /// output exists are skipped unless overwriting is forced. A failed archive does not
    /// stop the run.
    pub async fn run_folder(&self, input_dir: &Path) -> Result<FolderSummary> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let prefix = self.config.output_prefix();
        let archives: Vec<PathBuf> = FileManager::find_files(input_dir, ARCHIVE_EXTENSION)?
            .into_iter()
            .filter(|path| {
                let is_output = !prefix.is_empty()
                    && path
                        .file_name()
                        .is_some_and(|name| name.to_string_lossy().starts_with(&prefix));
                if is_output {
                    debug!("Ignoring translated archive {:?}", path);
                }
                !is_output
            })
            .collect();

        if archives.is_empty() {
            return Err(anyhow!("No archives found in directory: {:?}", input_dir));
        }

        let folder_pb = if self.show_progress {
            let progress_bar = ProgressBar::new(archives.len() as u64);
            let template_result = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
                .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            progress_bar.set_style(template_result.progress_chars("█▓▒░"));
            progress_bar
        } else {
            ProgressBar::hidden()
        };
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();

        for archive in &archives {
            let file_name = archive
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.run(archive, None).await {
                Ok(RunOutcome::Translated(_)) => summary.succeeded += 1,
                Ok(RunOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed.push((archive.clone(), format!("{:#}", e)));
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed in {}: {} processed, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.succeeded,
            summary.skipped,
            summary.failed.len()
        );
        for (archive, reason) in &summary.failed {
            error!("  {:?}: {}", archive, reason);
        }

        Ok(summary)
    }
}

/// Every attempt may take the provider timeout, plus the backoff sleeps between them
fn client_deadline(timeout_secs: u64, retry_count: u32, backoff: Duration) -> Duration {
    let retries = retry_count.min(16);
    Duration::from_secs(timeout_secs)
        .saturating_mul(retries + 1)
        .saturating_add(backoff.saturating_mul((1u32 << retries) - 1))
}
