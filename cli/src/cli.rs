use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "lsq")]
/// Linked SPARQL Queries command line toolkit
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract the distinct SPARQL queries of an access log
    ///
    /// Prints one line per distinct query with its hash and its text, separated by a tab.
    Extract {
        /// Log file to read
        ///
        /// If no file is given, stdin is read.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        from_file: Option<PathBuf>,
        /// Fail on lines that are not valid log entries instead of skipping them
        #[arg(long)]
        strict: bool,
        /// Also print the number of triple patterns of each query
        #[arg(long)]
        analyze: bool,
        /// Base IRI for parsing the queries
        #[arg(long, requires = "analyze", value_hint = ValueHint::Url)]
        base: Option<String>,
    },
    /// Regroup an RDF dump into one named graph per resource
    ///
    /// Triples are grouped by subject and named after it, quads keep their graph.
    Regroup {
        /// File to read
        ///
        /// Can be repeated. The graphs of all files are written together.
        #[arg(short, long, required = true, value_hint = ValueHint::FilePath)]
        from_file: Vec<PathBuf>,
        /// The format of the files to read
        ///
        /// It can be an extension like "nt" or a MIME type like "application/n-triples".
        ///
        /// By default the format is guessed from each input file extension.
        #[arg(long)]
        from_format: Option<String>,
        /// File to write
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        to_file: PathBuf,
        /// The format of the file to write
        ///
        /// By default the format is guessed from the target file extension.
        #[arg(long)]
        to_format: Option<String>,
        /// Number of triples per partition while grouping
        #[arg(long)]
        partition_size: Option<usize>,
    },
}
