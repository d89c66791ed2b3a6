//! CLI Tooling
//!
//! Command-line interface for building and maintaining the directory index.

use crate::catalogue::{CatalogueResolver, CatalogueService, HttpCatalogueService};
use crate::config::{AppConfig, ConfigLoader};
use crate::coverage::CoveragePass;
use crate::dedup::{self, deduplicate_directory};
use crate::deposit::{document_id_for, DepositEvents, DepositProcessor};
use crate::error::ApiError;
use crate::index::{open_sink, IndexDocument, PartialUpdate, SinkReport};
use crate::spot::{path_slug, SpotMapping, SpotResolver};
use crate::summary::{render_table, RunSummary};
use crate::tree::{DirectoryRecord, ReadmeReader, ReadmeStore, RecordBuilder, TreeWalker};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// archive-dirs - directory index builder for the archive browser
#[derive(Parser)]
#[command(name = "archive-dirs")]
#[command(about = "Build and maintain the archive directory index")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Load configuration and fold the logging flags into it
    pub fn load_config(&self) -> Result<AppConfig, ApiError> {
        let mut config = ConfigLoader::resolve(self.config.as_deref())?;
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk a directory and write its records and readmes
    Walk {
        /// Directory to walk
        dir: PathBuf,
        /// Directory receiving `<spot>_directories.txt` and `<spot>_readmes.json`
        output_dir: PathBuf,
    },
    /// Deduplicate walk output and index records that have metadata
    IndexDirs,
    /// Retry catalogue resolution for records missing metadata
    ImproveCoverage,
    /// Push captured readmes to the index
    UpdateReadmes,
    /// Apply deposit events to the index
    ApplyDeposits {
        /// JSON file with `mkdir`, `rmdir`, `symlink` and `readme` path lists
        events: PathBuf,
        /// Also refresh the record of every spot root
        #[arg(long)]
        spot_roots: bool,
        /// Write the per-operation report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Walk { .. } => "walk",
        Commands::IndexDirs => "index-dirs",
        Commands::ImproveCoverage => "improve-coverage",
        Commands::UpdateReadmes => "update-readmes",
        Commands::ApplyDeposits { .. } => "apply-deposits",
    }
}

/// Shared state for one command run
pub struct CliContext {
    config: AppConfig,
    spots: SpotMapping,
    catalogue: CatalogueResolver,
}

impl CliContext {
    /// Build the spot mapping and catalogue resolver described by `config`
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let spots = match &config.archive.spot_file {
            Some(path) => SpotMapping::load(path, config.archive.roots.clone())?,
            None => SpotMapping::new(config.archive.roots.clone()),
        };

        let service: Option<Box<dyn CatalogueService>> = if config.catalogue.live_lookups {
            Some(Box::new(HttpCatalogueService::new(
                &config.catalogue.api_url,
                Duration::from_secs(config.catalogue.timeout_secs),
            )?))
        } else {
            None
        };
        let catalogue = Self::open_catalogue(&config, service)?;
        Ok(Self::with_parts(config, spots, catalogue))
    }

    /// Assemble a context from already-built parts
    pub fn with_parts(config: AppConfig, spots: SpotMapping, catalogue: CatalogueResolver) -> Self {
        Self {
            config,
            spots,
            catalogue,
        }
    }

    /// Resolver over the configured snapshot, or an empty mapping
    pub fn open_catalogue(
        config: &AppConfig,
        service: Option<Box<dyn CatalogueService>>,
    ) -> Result<CatalogueResolver, ApiError> {
        match &config.catalogue.mapping_snapshot {
            Some(path) => CatalogueResolver::load(path, service),
            None => Ok(CatalogueResolver::new(Default::default(), service)),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalogue(&self) -> &CatalogueResolver {
        &self.catalogue
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        info!(command = command_name(command), "Running command");
        let result = match command {
            Commands::Walk { dir, output_dir } => self.handle_walk(dir, output_dir),
            Commands::IndexDirs => self.handle_index_dirs(),
            Commands::ImproveCoverage => self.handle_improve_coverage(),
            Commands::UpdateReadmes => self.handle_update_readmes(),
            Commands::ApplyDeposits {
                events,
                spot_roots,
                report,
            } => self.handle_apply_deposits(events, *spot_roots, report.as_deref()),
        };

        // Titles found before a failure are kept.
        match self.catalogue.persist() {
            Ok(true) => {
                info!(entries = self.catalogue.mapping_len(), "Catalogue mapping snapshot updated")
            }
            Ok(false) => {}
            Err(e) if result.is_ok() => return Err(e),
            Err(e) => warn!(error = %e, "Failed to persist catalogue mapping snapshot"),
        }
        result
    }

    fn builder(&self) -> RecordBuilder<'_> {
        RecordBuilder::new(
            &self.spots,
            &self.catalogue,
            ReadmeReader::new(self.config.walker.readme_decoding),
        )
    }

    fn handle_walk(&self, dir: &Path, output_dir: &Path) -> Result<String, ApiError> {
        let root = trim_trailing_separator(dir);
        let builder = self.builder();
        let walker = TreeWalker::new(&builder, self.config.walker);
        let mut walk = walker.walk(&root)?;

        let name = self.spots.spot(&root).unwrap_or_else(|| path_slug(&root));
        std::fs::create_dir_all(output_dir)?;
        let records_path = output_dir.join(format!("{}_directories.txt", name));
        let readmes_path = output_dir.join(format!("{}_readmes.json", name));

        let mut writer = BufWriter::new(File::create(&records_path)?);
        let mut summary = RunSummary::default();
        for record in walk.by_ref() {
            summary.observe(&record);
            writeln!(writer, "{}", record.to_line()?)?;
        }
        writer.flush()?;

        let stats = walk.stats();
        let readmes = walk.into_readmes();
        summary.readmes = readmes.len();
        std::fs::write(&readmes_path, serde_json::to_string(&readmes)?)?;

        info!(
            root = %root.display(),
            directories = stats.directories,
            link_roots = stats.link_roots,
            skipped = stats.skipped_entries,
            "Walk complete"
        );
        Ok(format!(
            "{}\nRecords: {}\nReadmes: {}",
            summary,
            records_path.display(),
            readmes_path.display()
        ))
    }

    fn handle_index_dirs(&self) -> Result<String, ApiError> {
        self.config.validate()?;
        let processing = self.config.processing_directory()?;
        let outcome = deduplicate_directory(processing, self.config.files.worker_count)?;

        write_record_lines(&self.config.files.missing_metadata_file, &outcome.missing)?;

        let documents: Vec<IndexDocument> = outcome
            .complete
            .into_iter()
            .map(|record| IndexDocument::from_record(record, self.config.index.identity))
            .collect();
        let mut sink = open_sink(&self.config.index)?;
        let report = sink.upsert(&documents)?;

        let stats = outcome.stats;
        Ok(render_table(
            "Index directories",
            &[
                ("Record files read", stats.files.to_string()),
                ("Unreadable files", stats.unreadable_files.to_string()),
                ("Unique records", stats.unique_lines.to_string()),
                ("Indexed (with metadata)", stats.complete.to_string()),
                ("Missing metadata", stats.missing.to_string()),
                ("Unparsable lines", stats.skipped.to_string()),
                ("Sink", report.to_string()),
            ],
        ))
    }

    fn handle_improve_coverage(&self) -> Result<String, ApiError> {
        self.config.validate()?;
        let missing = read_record_lines(&self.config.files.missing_metadata_file)?;

        let outcome = CoveragePass::new(&self.catalogue).run(missing);
        match &self.config.catalogue.mapping_snapshot {
            Some(path) => self.catalogue.save_to(path)?,
            None => warn!("No mapping snapshot configured, coverage results are not kept"),
        }
        write_record_lines(&self.config.files.reduced_missing_file, &outcome.unresolved)?;

        let documents: Vec<IndexDocument> = outcome
            .resolved
            .iter()
            .chain(outcome.unresolved.iter())
            .cloned()
            .map(|record| IndexDocument::from_record(record, self.config.index.identity))
            .collect();
        let mut sink = open_sink(&self.config.index)?;
        let report = sink.upsert(&documents)?;

        let stats = outcome.stats;
        Ok(render_table(
            "Improve coverage",
            &[
                ("Records missing metadata", stats.input.to_string()),
                ("Depth iterations", stats.iterations.to_string()),
                ("Live lookups", stats.live_lookups.to_string()),
                ("Improved", stats.resolved.to_string()),
                ("Still missing", stats.unresolved.to_string()),
                ("Sink", report.to_string()),
            ],
        ))
    }

    fn handle_update_readmes(&self) -> Result<String, ApiError> {
        self.config.validate()?;
        let processing = self.config.processing_directory()?;
        let mut sink = open_sink(&self.config.index)?;
        let builder = self.builder();
        let identity = self.config.index.identity;

        let mut files = 0;
        let mut totals = SinkReport::default();
        for path in dedup::list_files(processing, "json")? {
            let Some(store) = read_readme_store(&path) else {
                continue;
            };
            files += 1;
            let updates: Vec<PartialUpdate> = store
                .iter()
                .map(|(dir, text)| {
                    let id = document_id_for(&builder, identity, Path::new(dir));
                    PartialUpdate::readme(id, text.clone())
                })
                .collect();
            totals.merge(sink.update(&updates)?);
        }

        Ok(render_table(
            "Update readmes",
            &[
                ("Readme files read", files.to_string()),
                ("Sink", totals.to_string()),
            ],
        ))
    }

    fn handle_apply_deposits(
        &self,
        events_path: &Path,
        refresh_spot_roots: bool,
        report_path: Option<&Path>,
    ) -> Result<String, ApiError> {
        self.config.validate()?;
        let events = DepositEvents::load(events_path)?;
        let roots = if refresh_spot_roots {
            self.spots.spot_roots()
        } else {
            Vec::new()
        };

        let builder = self.builder();
        let processor = DepositProcessor::new(&builder, self.config.index.identity);
        let mut sink = open_sink(&self.config.index)?;
        let report = processor.apply(&events, &roots, sink.as_mut())?;

        if let Some(path) = report_path {
            report.write_to(path)?;
        }
        Ok(report.to_string())
    }
}

/// `dir` without trailing separators, keeping `/` itself
fn trim_trailing_separator(dir: &Path) -> PathBuf {
    let text = dir.to_string_lossy();
    let trimmed = text.trim_end_matches('/');
    if trimmed.is_empty() && text.starts_with('/') {
        PathBuf::from("/")
    } else {
        PathBuf::from(trimmed)
    }
}

fn write_record_lines(path: &Path, records: &[DirectoryRecord]) -> Result<(), ApiError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        writeln!(writer, "{}", record.to_line()?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Records from an NDJSON file; unparsable lines are logged and dropped
fn read_record_lines(path: &Path) -> Result<Vec<DirectoryRecord>, ApiError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ApiError::InvalidInput(format!("Cannot read {}: {}", path.display(), e))
    })?;
    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match DirectoryRecord::from_line(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unparsable record line");
                None
            }
        })
        .collect())
}

fn read_readme_store(path: &Path) -> Option<ReadmeStore> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Skipping unreadable readme file");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Skipping unparsable readme file");
            None
        }
    }
}
