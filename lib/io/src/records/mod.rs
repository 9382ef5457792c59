//! Streaming of RDF resource records.
//!
//! A dump of query records is a sequence of RDF statements. The [RecordParser] groups them into
//! [ResourceRecord]s, each of which holds the statements about a single resource:
//!
//! - Consecutive statements in the same named graph form one record. The record is named after
//!   the graph.
//! - Consecutive statements in the default graph with the same subject form one record.
//!
//! Parsing is lazy. The source is opened when the first record is requested, and only as much of
//! the input is read as is required for producing the requested records.

mod source;

use crate::error::RecordStreamError;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use lsq_model::{GraphName, Quad, Subject, Triple};
use oxiri::Iri;
use oxrdfio::{RdfFormat, RdfParseError, RdfParser, TokioAsyncReaderQuadParser};
pub use source::{BytesSource, FileSource, FnSource, InputSource};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::AsyncRead;

/// The statements about a single resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRecord {
    /// The resource the record is about.
    pub resource: Subject,
    /// The graph the statements were read from.
    pub graph_name: GraphName,
    pub triples: Vec<Triple>,
}

impl ResourceRecord {
    /// Returns the statements of this record as quads in [Self::graph_name].
    pub fn into_quads(self) -> impl Iterator<Item = Quad> {
        let graph_name = self.graph_name;
        self.triples
            .into_iter()
            .map(move |triple| triple.in_graph(graph_name.clone()))
    }
}

/// Options of a [RecordParser].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordParserOptions {
    /// The serialization of the input.
    pub format: RdfFormat,
    /// The IRI against which relative IRIs are resolved.
    pub base_iri: Option<String>,
    /// Terminate the stream on the first malformed statement instead of skipping it.
    pub fail_fast: bool,
}

impl Default for RecordParserOptions {
    fn default() -> Self {
        Self {
            format: RdfFormat::TriG,
            base_iri: None,
            fail_fast: false,
        }
    }
}

impl RecordParserOptions {
    #[must_use]
    pub fn with_format(mut self, format: RdfFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Builds the RDF parser. The base IRI is validated for every format, including the
    /// line-based ones that do not resolve relative IRIs.
    fn rdf_parser(&self) -> Result<RdfParser, RecordStreamError> {
        let parser = RdfParser::from_format(self.format);
        let Some(iri) = &self.base_iri else {
            return Ok(parser);
        };
        let invalid = |error| RecordStreamError::InvalidBaseIri {
            iri: iri.clone(),
            error,
        };
        Iri::parse(iri.as_str()).map_err(invalid)?;
        parser.with_base_iri(iri.as_str()).map_err(invalid)
    }
}

/// Parses [InputSource]s into streams of [ResourceRecord]s.
#[derive(Clone, Debug, Default)]
pub struct RecordParser {
    options: RecordParserOptions,
}

impl RecordParser {
    pub fn new(options: RecordParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RecordParserOptions {
        &self.options
    }

    /// Returns a lazy stream of the records of `source`.
    ///
    /// Every call opens the source anew, hence each stream starts at the beginning of the input.
    pub fn parse<S: InputSource + 'static>(&self, source: Arc<S>) -> ResourceRecordStream {
        let malformed = Arc::new(AtomicUsize::new(0));
        let state = ParseState::Pending {
            source,
            options: self.options.clone(),
            malformed: Arc::clone(&malformed),
        };
        ResourceRecordStream {
            inner: futures::stream::unfold(state, advance::<S>).fuse().boxed(),
            malformed,
        }
    }
}

/// A stream of [ResourceRecord]s.
///
/// Dropping the stream releases the underlying reader.
pub struct ResourceRecordStream {
    inner: BoxStream<'static, Result<ResourceRecord, RecordStreamError>>,
    malformed: Arc<AtomicUsize>,
}

impl ResourceRecordStream {
    /// The number of malformed statements that have been skipped so far.
    pub fn malformed_count(&self) -> usize {
        self.malformed.load(Ordering::Relaxed)
    }

    /// Collects all records of the stream.
    ///
    /// # Errors
    ///
    /// Returns the first error of the stream.
    pub async fn try_collect_to_vec(mut self) -> Result<Vec<ResourceRecord>, RecordStreamError> {
        let mut result = Vec::new();
        while let Some(record) = self.next().await {
            result.push(record?);
        }
        Ok(result)
    }
}

impl Stream for ResourceRecordStream {
    type Item = Result<ResourceRecord, RecordStreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

enum ParseState<S: InputSource> {
    Pending {
        source: Arc<S>,
        options: RecordParserOptions,
        malformed: Arc<AtomicUsize>,
    },
    Reading(RecordReader<S::Reader>),
    Done,
}

async fn advance<S: InputSource>(
    state: ParseState<S>,
) -> Option<(Result<ResourceRecord, RecordStreamError>, ParseState<S>)> {
    let mut reader = match state {
        ParseState::Pending {
            source,
            options,
            malformed,
        } => {
            let parser = match options.rdf_parser() {
                Ok(parser) => parser,
                Err(error) => return Some((Err(error), ParseState::Done)),
            };
            let input = match source.open().await {
                Ok(input) => input,
                Err(error) => {
                    tracing::warn!(%error, "Failed to open record source");
                    return Some((
                        Err(RecordStreamError::ResourceAcquisition(error)),
                        ParseState::Done,
                    ));
                }
            };
            tracing::debug!(format = %options.format, "Opened record source");
            RecordReader {
                parser: parser.for_tokio_async_reader(input),
                lookahead: None,
                fail_fast: options.fail_fast,
                malformed,
            }
        }
        ParseState::Reading(reader) => reader,
        ParseState::Done => return None,
    };

    match reader.next_record().await {
        Ok(Some(record)) => Some((Ok(record), ParseState::Reading(reader))),
        Ok(None) => None,
        // Malformed statements only surface here in fail-fast mode.
        Err(error) => Some((Err(error), ParseState::Done)),
    }
}

struct RecordReader<R: AsyncRead + Unpin> {
    parser: TokioAsyncReaderQuadParser<R>,
    lookahead: Option<Quad>,
    fail_fast: bool,
    malformed: Arc<AtomicUsize>,
}

impl<R: AsyncRead + Unpin> RecordReader<R> {
    async fn next_record(&mut self) -> Result<Option<ResourceRecord>, RecordStreamError> {
        let first = match self.lookahead.take() {
            Some(quad) => quad,
            None => match self.next_quad().await? {
                Some(quad) => quad,
                None => return Ok(None),
            },
        };

        let resource = record_resource(&first);
        let graph_name = first.graph_name.clone();
        let mut triples = vec![Triple::from(first)];
        while let Some(quad) = self.next_quad().await? {
            let same_record = quad.graph_name == graph_name
                && (!graph_name.is_default_graph() || quad.subject == resource);
            if !same_record {
                self.lookahead = Some(quad);
                break;
            }
            triples.push(quad.into());
        }

        Ok(Some(ResourceRecord {
            resource,
            graph_name,
            triples,
        }))
    }

    async fn next_quad(&mut self) -> Result<Option<Quad>, RecordStreamError> {
        loop {
            match self.parser.next().await {
                None => return Ok(None),
                Some(Ok(quad)) => return Ok(Some(quad)),
                Some(Err(RdfParseError::Io(error))) => {
                    return Err(RecordStreamError::ResourceAcquisition(error))
                }
                Some(Err(error)) => {
                    if self.fail_fast {
                        return Err(RecordStreamError::Malformed(error));
                    }
                    self.malformed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(%error, "Skipping malformed RDF statement");
                }
            }
        }
    }
}

fn record_resource(quad: &Quad) -> Subject {
    match &quad.graph_name {
        GraphName::NamedNode(node) => Subject::NamedNode(node.clone()),
        GraphName::BlankNode(node) => Subject::BlankNode(node.clone()),
        GraphName::DefaultGraph => quad.subject.clone(),
    }
}
