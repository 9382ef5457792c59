use async_trait::async_trait;
use std::io;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncRead;

/// A re-openable source of bytes.
///
/// A source is opened once per parse. Opening is deferred until the first record is requested
/// and the reader is dropped as soon as the record stream ends or is dropped.
#[async_trait]
pub trait InputSource: Send + Sync {
    /// The reader returned by [Self::open].
    type Reader: AsyncRead + Unpin + Send + 'static;

    /// Opens a fresh reader positioned at the start of the input.
    async fn open(&self) -> io::Result<Self::Reader>;
}

/// Reads the input from a file.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl InputSource for FileSource {
    type Reader = tokio::fs::File;

    async fn open(&self) -> io::Result<Self::Reader> {
        tokio::fs::File::open(&self.path).await
    }
}

/// Reads the input from an in-memory buffer.
#[derive(Clone, Debug)]
pub struct BytesSource {
    bytes: Arc<[u8]>,
}

impl BytesSource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl InputSource for BytesSource {
    type Reader = Cursor<Arc<[u8]>>;

    async fn open(&self) -> io::Result<Self::Reader> {
        Ok(Cursor::new(Arc::clone(&self.bytes)))
    }
}

/// Obtains a reader from a factory function.
pub struct FnSource<F>(F);

impl<F> FnSource<F> {
    pub fn new(factory: F) -> Self {
        Self(factory)
    }
}

#[async_trait]
impl<F, R> InputSource for FnSource<F>
where
    F: Fn() -> io::Result<R> + Send + Sync,
    R: AsyncRead + Unpin + Send + 'static,
{
    type Reader = R;

    async fn open(&self) -> io::Result<Self::Reader> {
        (self.0)()
    }
}
