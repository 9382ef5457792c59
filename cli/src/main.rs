#![allow(clippy::print_stderr, clippy::print_stdout)]
use crate::cli::{Args, Command};
use anyhow::{bail, Context};
use clap::Parser;
use lsq::ingest::{IngestOptions, IngestSummary, LogIngestor};
use lsq::io::log::LogParserOptions;
use lsq::partition::{
    FileDatasetWriter, LoaderRegistry, RdfRepresentationResolver, RdfSource, ResolverOptions,
    SourceFormat,
};
use lsq::regroup::{union_datasets, write_datasets};
use lsq::store::{MemQueryRecordStore, QueryRecordStore};
use oxrdfio::RdfFormat;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{stdin, stdout, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Args::parse();
    match matches.command {
        Command::Extract {
            from_file,
            strict,
            analyze,
            base,
        } => {
            let mut options = IngestOptions::default()
                .with_log_options(LogParserOptions::default().with_strict(strict))
                .with_analysis(analyze);
            if let Some(base) = base {
                options = options.with_base_iri(base);
            }
            extract(from_file, options).await
        }
        Command::Regroup {
            from_file,
            from_format,
            to_file,
            to_format,
            partition_size,
        } => {
            let from_format = from_format.map(|format| SourceFormat::from_name(&format));
            let sources = from_file
                .into_iter()
                .map(|file| {
                    let format = match &from_format {
                        Some(format) => format.clone(),
                        None => rdf_format_from_path(&file)?.into(),
                    };
                    Ok(RdfSource::from_path(file, format))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let to_format = if let Some(format) = to_format {
                rdf_format_from_name(&format)?
            } else {
                rdf_format_from_path(&to_file)?
            };
            let mut options = ResolverOptions::default();
            if let Some(partition_size) = partition_size {
                options = options.with_partition_size(partition_size);
            }

            // The output is only created once every input is loaded, so it may replace an input.
            let resolver = RdfRepresentationResolver::new(LoaderRegistry::global(), options);
            let datasets = union_datasets(&resolver, &sources)
                .context("Failed to load the input files")?;
            let mut writer = FileDatasetWriter::create(&to_file, to_format)
                .with_context(|| format!("Failed to create {}", to_file.display()))?;
            let summary = write_datasets(datasets, &mut writer)
                .with_context(|| format!("Failed to write {}", to_file.display()))?;
            eprintln!(
                "{} triples written into {} graphs",
                summary.triples, summary.graphs
            );
            Ok(())
        }
    }
}

async fn extract(from_file: Option<PathBuf>, options: IngestOptions) -> anyhow::Result<()> {
    let analyze = options.analyze;
    let store = Arc::new(MemQueryRecordStore::new());
    let ingestor = LogIngestor::new(Arc::clone(&store), options);
    let summary = if let Some(file) = from_file {
        let reader = BufReader::new(
            File::open(&file).with_context(|| format!("Failed to open {}", file.display()))?,
        );
        ingestor.ingest(reader).await?
    } else {
        ingestor.ingest(stdin().lock()).await?
    };

    let mut output = BufWriter::new(stdout().lock());
    for hash in store.hashes() {
        let Some(record) = store.get(&hash).await? else {
            continue;
        };
        let text = escape_text(record.text().unwrap_or_default());
        if analyze {
            let patterns = record
                .structural_features()
                .map_or_else(|| "-".to_owned(), |f| f.triple_pattern_count().to_string());
            writeln!(output, "{hash}\t{patterns}\t{text}")?;
        } else {
            writeln!(output, "{hash}\t{text}")?;
        }
    }
    output.flush()?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &IngestSummary) {
    eprintln!(
        "{} lines, {} skipped, {} without query, {} sightings of {} distinct queries",
        summary.lines,
        summary.skipped_lines,
        summary.entries_without_query,
        summary.sightings,
        summary.new_records
    );
    if summary.invalid_queries > 0 {
        eprintln!("{} queries could not be parsed", summary.invalid_queries);
    }
}

/// Keeps one record per output line.
fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn format_from_path<T>(
    path: &Path,
    from_extension: impl FnOnce(&str) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    if let Some(ext) = path.extension().and_then(OsStr::to_str) {
        from_extension(ext).map_err(|e| {
            e.context(format!(
                "Not able to guess the file format from file name extension '{ext}'"
            ))
        })
    } else {
        bail!(
            "The path {} has no extension to guess a file format from",
            path.display()
        )
    }
}

fn rdf_format_from_path(path: &Path) -> anyhow::Result<RdfFormat> {
    format_from_path(path, |ext| {
        RdfFormat::from_extension(ext)
            .with_context(|| format!("The file extension '{ext}' is unknown"))
    })
}

fn rdf_format_from_name(name: &str) -> anyhow::Result<RdfFormat> {
    if let Some(t) = RdfFormat::from_extension(name) {
        return Ok(t);
    }
    if let Some(t) = RdfFormat::from_media_type(name) {
        return Ok(t);
    }
    bail!("The file format '{name}' is unknown")
}
