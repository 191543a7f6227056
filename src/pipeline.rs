/*!
 * End-to-end translation of one help archive.
 *
 * The pipeline owns the order of the stages:
 *
 * 1. create a temporary workspace
 * 2. decompile the archive into `expanded/` and canonicalise the navigation files
 * 3. translate every page into `translated/`
 * 4. translate the labels of the contents and index files
 * 5. copy every other file unchanged
 * 6. write the project manifest and compile it into the output archive
 *
 * Any stage error aborts the archive and the workspace is removed on every path.
 * Translation failures of single strings never abort anything; the original text is
 * kept and counted in the report.
 */

use encoding_rs::Encoding;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::archive::{
    ArchiveCompiler, ArchiveExpander, AssetCopier, AssetReport, CompileOutcome, Compiler, Decompiler, Manifest,
    Workspace,
};
use crate::encoding::{self, EncodingResolver};
use crate::errors::{ArchiveError, EncodingError};
use crate::file_utils::{FileKind, FileManager};
use crate::language_utils;
use crate::translation::{NavigationTranslator, PageReport, PageTranslator, TranslationClient};

/// File name used for the compiled archive when the input has none
const FALLBACK_COMPILED_NAME: &str = "translated.chm";

/// Settings of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub source_language: String,
    pub target_language: String,
    // @field: Extensions translated as pages
    pub page_extensions: Vec<String>,
    pub output_encoding: &'static Encoding,
    // @field: Pages translated at the same time, at least 1
    pub concurrent_pages: usize,
    // @field: Parent directory of the workspace; system temp dir when None
    pub workspace_root: Option<PathBuf>,
    pub full_text_search: bool,
}

impl PipelineOptions {
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            page_extensions: vec!["html".to_string(), "htm".to_string()],
            output_encoding: encoding::default_output_encoding(),
            concurrent_pages: 1,
            workspace_root: None,
            full_text_search: true,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, EncodingError> {
        Ok(Self {
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            page_extensions: config.archive.page_extensions.clone(),
            output_encoding: encoding::resolve_label(&config.archive.output_encoding)?.output_encoding(),
            concurrent_pages: config.archive.concurrent_pages.max(1),
            workspace_root: config.archive.workspace_root.clone(),
            full_text_search: config.archive.full_text_search,
        })
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }
}

/// What happened to one archive
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub output: PathBuf,
    // @field: Pages written to the translated tree
    pub pages: usize,
    // @field: Pages and navigation files copied unchanged because they could not be decoded
    pub undecodable: Vec<PathBuf>,
    pub navigation_files: usize,
    // @field: Text nodes of all pages
    pub page_text: PageReport,
    // @field: Labels of all navigation files
    pub labels: PageReport,
    pub assets: AssetReport,
    pub compile: CompileOutcome,
}

impl PipelineReport {
    /// Strings that kept their original text after a failed translation
    pub fn failed_strings(&self) -> usize {
        self.page_text.failed + self.labels.failed
    }
}

/// Outcome of rewriting one file into the translated tree
#[derive(Debug)]
enum FileOutcome {
    Translated(PageReport),
    CopiedUndecodable(PathBuf),
}

/// Translates help archives end to end
#[derive(Debug)]
pub struct ArchiveTranslator {
    expander: ArchiveExpander,
    compiler: ArchiveCompiler,
    client: Arc<TranslationClient>,
    resolver: EncodingResolver,
    options: PipelineOptions,
    show_progress: bool,
}

impl ArchiveTranslator {
    pub fn new(
        decompiler: Arc<dyn Decompiler>,
        compiler: Arc<dyn Compiler>,
        client: Arc<TranslationClient>,
        resolver: EncodingResolver,
        options: PipelineOptions,
    ) -> Self {
        Self {
            expander: ArchiveExpander::new(decompiler),
            compiler: ArchiveCompiler::new(compiler),
            client,
            resolver,
            options,
            show_progress: false,
        }
    }

    /// Show a progress bar over the pages of each archive
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn client(&self) -> &Arc<TranslationClient> {
        &self.client
    }

    /// Translate the archive at `input` and write the compiled result to `output`.
    ///
    /// The input file is never modified. On error no output is written.
    pub async fn translate_archive(&self, input: &Path, output: &Path) -> Result<PipelineReport, ArchiveError> {
        if !input.is_file() {
            return Err(ArchiveError::io(
                input,
                std::io::Error::new(std::io::ErrorKind::NotFound, "input archive not found"),
            ));
        }

        let workspace = Workspace::create(self.options.workspace_root.as_deref())?;

        let expanded = self.expander.expand(input, &workspace).await?;
        debug!(
            "Expanded {} files (contents: {:?}, index: {:?})",
            expanded.file_count, expanded.contents_file, expanded.index_file
        );

        let mut pages = Vec::new();
        let mut navigation = Vec::new();
        for file in FileManager::relative_files(workspace.expanded())? {
            if FileManager::is_archive_internal(&file) {
                continue;
            }
            match FileManager::classify(&file, &self.options.page_extensions) {
                FileKind::Page => pages.push(file),
                kind if kind.is_navigation() => navigation.push(file),
                _ => {}
            }
        }
        info!("Translating {} pages and {} navigation files", pages.len(), navigation.len());

        let mut report = PipelineReport {
            output: output.to_path_buf(),
            pages: 0,
            undecodable: Vec::new(),
            navigation_files: 0,
            page_text: PageReport::default(),
            labels: PageReport::default(),
            assets: AssetReport::default(),
            compile: CompileOutcome::Clean,
        };

        self.translate_pages(&pages, &workspace, &mut report).await?;
        self.translate_navigation(&navigation, &workspace, &mut report).await?;

        report.assets = AssetCopier::new(self.options.page_extensions.clone())
            .copy(workspace.expanded(), workspace.translated())?;

        let compiled_name = input
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| FALLBACK_COMPILED_NAME.to_string());
        let manifest = Manifest::scan(workspace.translated(), &compiled_name, &self.options.page_extensions)?
            .with_language(language_utils::locale_id(&self.options.target_language).map(str::to_string))
            .with_full_text_search(self.options.full_text_search);
        let project = manifest.write(workspace.translated())?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
        }
        let produced = workspace.translated().join(&compiled_name);
        report.compile = self.compiler.compile(&project, &produced, output).await?;

        workspace.close()?;

        info!(
            "Translated {} pages ({} strings, {} kept original) and {} labels",
            report.pages,
            report.page_text.translated,
            report.page_text.failed,
            report.labels.translated
        );
        if !report.undecodable.is_empty() {
            warn!("{} files could not be decoded and were copied unchanged", report.undecodable.len());
        }

        Ok(report)
    }

    async fn translate_pages(
        &self,
        pages: &[PathBuf],
        workspace: &Workspace,
        report: &mut PipelineReport,
    ) -> Result<(), ArchiveError> {
        let translator = PageTranslator::new(
            Arc::clone(&self.client),
            &self.options.source_language,
            &self.options.target_language,
        )
        .with_output_encoding(self.options.output_encoding);

        let progress = self.page_progress(pages.len() as u64);

        let mut outcomes = stream::iter(pages.iter().map(|page| {
            let translator = &translator;
            let progress = &progress;
            async move {
                progress.set_message(page.to_string_lossy().to_string());
                let outcome = self
                    .rewrite_file(page, workspace, |bytes| async move {
                        translator.translate_bytes(&bytes, &self.resolver).await
                    })
                    .await;
                progress.inc(1);
                outcome
            }
        }))
        .buffered(self.options.concurrent_pages.max(1));

        while let Some(outcome) = outcomes.next().await {
            report.pages += 1;
            match outcome? {
                FileOutcome::Translated(page_report) => report.page_text.merge(page_report),
                FileOutcome::CopiedUndecodable(path) => report.undecodable.push(path),
            }
        }

        progress.finish_and_clear();
        Ok(())
    }

    async fn translate_navigation(
        &self,
        files: &[PathBuf],
        workspace: &Workspace,
        report: &mut PipelineReport,
    ) -> Result<(), ArchiveError> {
        let translator = NavigationTranslator::new(
            Arc::clone(&self.client),
            &self.options.source_language,
            &self.options.target_language,
        )
        .with_output_encoding(self.options.output_encoding);

        for file in files {
            let outcome = self
                .rewrite_file(file, workspace, |bytes| {
                    let translator = &translator;
                    async move { translator.translate_bytes(&bytes, &self.resolver).await }
                })
                .await?;

            report.navigation_files += 1;
            match outcome {
                FileOutcome::Translated(labels) => report.labels.merge(labels),
                FileOutcome::CopiedUndecodable(path) => report.undecodable.push(path),
            }
        }

        Ok(())
    }

    /// Read `relative` from the expanded zone, transform it and write it to the translated
    /// zone. A file that cannot be decoded is copied byte for byte.
    async fn rewrite_file<F, Fut>(
        &self,
        relative: &Path,
        workspace: &Workspace,
        transform: F,
    ) -> Result<FileOutcome, ArchiveError>
    where
        F: FnOnce(Vec<u8>) -> Fut,
        Fut: std::future::Future<Output = Result<(Vec<u8>, PageReport), EncodingError>>,
    {
        let source = workspace.expanded().join(relative);
        let destination = workspace.translated().join(relative);

        let bytes = tokio::fs::read(&source)
            .await
            .map_err(|e| ArchiveError::io(&source, e))?;

        match transform(bytes).await {
            Ok((translated, file_report)) => {
                FileManager::write_bytes(&destination, &translated)?;
                debug!(
                    "{:?}: {} translated, {} kept original",
                    relative, file_report.translated, file_report.failed
                );
                Ok(FileOutcome::Translated(file_report))
            }
            Err(e) => {
                warn!("Copying {:?} unchanged: {}", relative, e);
                FileManager::copy_file(&source, &destination)?;
                Ok(FileOutcome::CopiedUndecodable(relative.to_path_buf()))
            }
        }
    }

    fn page_progress(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(total);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }
}
