#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use futures::StreamExt;
use lsq_io::records::{
    BytesSource, FileSource, FnSource, RecordParser, RecordParserOptions, ResourceRecord,
};
use lsq_io::RecordStreamError;
use lsq_model::{GraphName, NamedNode, Subject};
use oxrdfio::RdfFormat;
use std::error::Error;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

const TRIG: &str = r#"
@prefix ex: <http://example.com/> .

GRAPH ex:q1 {
    ex:q1 ex:text "SELECT * { ?s ?p ?o }" ;
        ex:hash "h1" .
    ex:run1 ex:resultCount 3 .
}
GRAPH ex:q2 {
    ex:q2 ex:text "ASK {}" .
}
ex:a ex:p 1 .
ex:a ex:p 2 .
ex:b ex:p 3 .
"#;

/// Statistics shared between a [CountingReader] and the test.
#[derive(Default)]
struct ReadStats {
    opens: AtomicUsize,
    reads: AtomicUsize,
    bytes: AtomicUsize,
    drops: AtomicUsize,
}

/// Serves `data` in small chunks and keeps track of how it is used.
struct CountingReader {
    data: Arc<[u8]>,
    position: usize,
    stats: Arc<ReadStats>,
}

const CHUNK_SIZE: usize = 1024;

impl AsyncRead for CountingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        let end = (this.position + CHUNK_SIZE.min(buf.remaining())).min(this.data.len());
        buf.put_slice(&this.data[this.position..end]);
        this.stats.reads.fetch_add(1, Ordering::SeqCst);
        this.stats
            .bytes
            .fetch_add(end - this.position, Ordering::SeqCst);
        this.position = end;
        Poll::Ready(Ok(()))
    }
}

impl Drop for CountingReader {
    fn drop(&mut self) {
        self.stats.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Always fails to read.
struct BrokenReader;

impl AsyncRead for BrokenReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset",
        )))
    }
}

type CountingFactory = Box<dyn Fn() -> io::Result<CountingReader> + Send + Sync>;

fn counting_source(data: String) -> (Arc<FnSource<CountingFactory>>, Arc<ReadStats>) {
    let data: Arc<[u8]> = data.into_bytes().into();
    let stats = Arc::new(ReadStats::default());
    let factory_stats = Arc::clone(&stats);
    let factory: CountingFactory = Box::new(move || {
        factory_stats.opens.fetch_add(1, Ordering::SeqCst);
        Ok(CountingReader {
            data: Arc::clone(&data),
            position: 0,
            stats: Arc::clone(&factory_stats),
        })
    });
    (Arc::new(FnSource::new(factory)), stats)
}

fn large_ntriples(subjects: usize) -> String {
    (0..subjects)
        .map(|i| {
            format!(
                "<http://example.com/s{i}> <http://example.com/p> \"{i}\" .\n\
                 <http://example.com/s{i}> <http://example.com/q> \"x\" .\n"
            )
        })
        .collect()
}

fn ntriples_parser() -> RecordParser {
    RecordParser::new(RecordParserOptions::default().with_format(RdfFormat::NTriples))
}

fn ex(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{name}"))
}

#[tokio::test]
async fn test_group_records() -> Result<(), Box<dyn Error>> {
    let source = Arc::new(BytesSource::new(TRIG.as_bytes().to_vec()));
    let records = RecordParser::default()
        .parse(source)
        .try_collect_to_vec()
        .await?;

    let summary: Vec<_> = records
        .iter()
        .map(|record: &ResourceRecord| (record.resource.clone(), record.triples.len()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Subject::from(ex("q1")), 3),
            (Subject::from(ex("q2")), 1),
            (Subject::from(ex("a")), 2),
            (Subject::from(ex("b")), 1),
        ]
    );
    assert_eq!(records[0].graph_name, GraphName::from(ex("q1")));
    assert_eq!(records[2].graph_name, GraphName::DefaultGraph);
    Ok(())
}

#[tokio::test]
async fn test_into_quads_keeps_graph() -> Result<(), Box<dyn Error>> {
    let source = Arc::new(BytesSource::new(TRIG.as_bytes().to_vec()));
    let records = RecordParser::default()
        .parse(source)
        .try_collect_to_vec()
        .await?;

    let graph_names: Vec<_> = records[0]
        .clone()
        .into_quads()
        .map(|quad| quad.graph_name)
        .collect();
    assert_eq!(graph_names, vec![GraphName::from(ex("q1")); 3]);
    Ok(())
}

#[tokio::test]
async fn test_open_is_deferred() {
    let (source, stats) = counting_source(large_ntriples(10));
    let mut stream = ntriples_parser().parse(source);
    assert_eq!(stats.opens.load(Ordering::SeqCst), 0);

    let first = stream.next().await;
    assert!(matches!(first, Some(Ok(_))));
    assert_eq!(stats.opens.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_early_drop_releases_reader() {
    let data = large_ntriples(10_000);
    let total = data.len();
    let (source, stats) = counting_source(data);

    let mut stream = ntriples_parser().parse(source);
    for _ in 0..3 {
        let record = stream.next().await;
        assert!(matches!(record, Some(Ok(record)) if record.triples.len() == 2));
    }
    drop(stream);

    let reads = stats.reads.load(Ordering::SeqCst);
    assert_eq!(stats.drops.load(Ordering::SeqCst), 1);
    assert!(stats.bytes.load(Ordering::SeqCst) < total / 2);
    assert_eq!(stats.reads.load(Ordering::SeqCst), reads);
}

#[tokio::test]
async fn test_exhaustion_releases_reader_once() {
    let (source, stats) = counting_source(large_ntriples(100));
    let mut stream = ntriples_parser().parse(source);

    let mut count = 0;
    while let Some(record) = stream.next().await {
        assert!(record.is_ok());
        count += 1;
    }
    assert_eq!(count, 100);
    assert_eq!(stats.drops.load(Ordering::SeqCst), 1);

    drop(stream);
    assert_eq!(stats.drops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_parse_reopens_source() -> Result<(), Box<dyn Error>> {
    let (source, stats) = counting_source(large_ntriples(5));
    let parser = ntriples_parser();

    let first = parser.parse(Arc::clone(&source)).try_collect_to_vec().await?;
    let second = parser.parse(source).try_collect_to_vec().await?;

    assert_eq!(first, second);
    assert_eq!(first.len(), 5);
    assert_eq!(stats.opens.load(Ordering::SeqCst), 2);
    assert_eq!(stats.drops.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn test_missing_file_is_fatal() {
    let source = Arc::new(FileSource::new("/this/file/does/not/exist.trig"));
    let mut stream = RecordParser::default().parse(source);

    let error = match stream.next().await {
        Some(Err(error)) => error,
        other => panic!("expected an error, got {other:?}"),
    };
    assert!(error.is_fatal());
    assert!(matches!(error, RecordStreamError::ResourceAcquisition(_)));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_read_error_is_fatal() {
    let source = Arc::new(FnSource::new(|| Ok::<_, io::Error>(BrokenReader)));
    let mut stream = ntriples_parser().parse(source);

    let first = stream.next().await;
    assert!(matches!(
        first,
        Some(Err(RecordStreamError::ResourceAcquisition(_)))
    ));
    assert!(stream.next().await.is_none());
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_malformed_statements_are_skipped() {
    let data = "<http://example.com/s1> <http://example.com/p> \"a\" .\n\
                <http://example.com/s1> <http://example.com/p> \"b\" .\n\
                <http://example.com/s1> <http://example.com/p> .\n\
                <http://example.com/s2> <http://example.com/p> \"c\" .\n";
    let source = Arc::new(BytesSource::new(data.as_bytes().to_vec()));
    let mut stream = ntriples_parser().parse(source);

    let mut sizes = Vec::new();
    while let Some(record) = stream.next().await {
        match record {
            Ok(record) => sizes.push(record.triples.len()),
            Err(error) => panic!("unexpected error: {error}"),
        }
    }
    assert_eq!(sizes, vec![2, 1]);
    assert_eq!(stream.malformed_count(), 1);
}

#[tokio::test]
async fn test_fail_fast_terminates_on_malformed_statement() {
    let data = "<http://example.com/s1> <http://example.com/p> .\n\
                <http://example.com/s2> <http://example.com/p> \"c\" .\n";
    let source = Arc::new(BytesSource::new(data.as_bytes().to_vec()));
    let parser = RecordParser::new(
        RecordParserOptions::default()
            .with_format(RdfFormat::NTriples)
            .with_fail_fast(true),
    );
    let mut stream = parser.parse(source);

    let error = match stream.next().await {
        Some(Err(error)) => error,
        other => panic!("expected an error, got {other:?}"),
    };
    assert!(!error.is_fatal());
    assert!(matches!(error, RecordStreamError::Malformed(_)));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_invalid_base_iri_does_not_open_source() {
    for format in [RdfFormat::NTriples, RdfFormat::NQuads, RdfFormat::Turtle] {
        let (source, stats) = counting_source(large_ntriples(1));
        let parser = RecordParser::new(
            RecordParserOptions::default()
                .with_format(format)
                .with_base_iri("not an iri"),
        );
        let mut stream = parser.parse(source);

        assert!(matches!(
            stream.next().await,
            Some(Err(RecordStreamError::InvalidBaseIri { .. }))
        ));
        assert!(stream.next().await.is_none());
        assert_eq!(stats.opens.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_relative_iris_are_resolved() -> Result<(), Box<dyn Error>> {
    let data = "<s> <p> <o> .\n";
    let source = Arc::new(BytesSource::new(data.as_bytes().to_vec()));
    let parser = RecordParser::new(
        RecordParserOptions::default()
            .with_format(RdfFormat::Turtle)
            .with_base_iri("http://example.com/"),
    );
    let records = parser.parse(source).try_collect_to_vec().await?;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].resource, Subject::from(ex("s")));
    Ok(())
}
