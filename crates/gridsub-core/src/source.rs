//! Line sources feeding the processor
//!
//! A [`LineSource`] yields raw lines (terminator included) one at a time.
//! [`ReaderSource`] wraps any buffered async reader and ends with the data;
//! `TailSource` follows a log file that the decoder is still writing and
//! never ends on its own. Either way [`run`] drives the processor until the
//! source is exhausted or the future is dropped.

use crate::error::Result;
use crate::processor::{Processor, ProcessorStats};
use crate::sink::BlockSink;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, instrument};

#[cfg(feature = "tail")]
pub use tail::{StartPosition, TailSource};

/// Source of raw log lines
#[async_trait]
pub trait LineSource: Send {
    /// Next complete line, or `None` once the source is exhausted
    async fn next_line(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Lines from a finite buffered reader
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: AsyncBufRead + Unpin + Send> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> LineSource for ReaderSource<R> {
    async fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let read = self.reader.read_until(b'\n', &mut line).await?;
        Ok((read > 0).then_some(line))
    }
}

/// Feed every line of a source through the processor
///
/// Returns the run statistics once the source is exhausted. Dropping the
/// future cancels the run between lines; blocks already emitted are
/// complete on the sink.
#[instrument(skip_all)]
pub async fn run<S, L>(source: &mut L, processor: &mut Processor<S>) -> Result<ProcessorStats>
where
    S: BlockSink + Send,
    L: LineSource + ?Sized,
{
    info!("Processing started");

    while let Some(line) = source.next_line().await? {
        processor.process_line(&line)?;
    }

    debug!("Source exhausted");
    Ok(processor.stats().clone())
}

#[cfg(feature = "tail")]
mod tail {
    use super::LineSource;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::io::SeekFrom;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tokio::fs::File;
    use tokio::io::{AsyncReadExt, AsyncSeekExt};
    use tracing::{debug, info, warn};

    pub(super) const READ_CHUNK: usize = 8 * 1024;

    /// Where following starts
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub enum StartPosition {
        #[default]
        FromStart,
        FromEnd,
    }

    /// Follows a growing file, polling for new data
    #[derive(Debug)]
    pub struct TailSource {
        path: PathBuf,
        file: File,
        position: u64,
        buffer: Vec<u8>,
        chunk: Box<[u8]>,
        poll_interval: Duration,
    }

    impl TailSource {
        pub async fn open(
            path: impl AsRef<Path>,
            start: StartPosition,
            poll_interval: Duration,
        ) -> Result<Self> {
            let path = path.as_ref().to_path_buf();
            let mut file = File::open(&path).await?;
            let position = match start {
                StartPosition::FromStart => 0,
                StartPosition::FromEnd => file.seek(SeekFrom::End(0)).await?,
            };

            info!(path = %path.display(), position, "Following file");

            Ok(Self {
                path,
                file,
                position,
                buffer: Vec::new(),
                chunk: vec![0u8; READ_CHUNK].into_boxed_slice(),
                poll_interval,
            })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Take one complete line out of the buffer
        fn take_line(&mut self) -> Option<Vec<u8>> {
            let end = self.buffer.iter().position(|&b| b == b'\n')?;
            let rest = self.buffer.split_off(end + 1);
            Some(std::mem::replace(&mut self.buffer, rest))
        }

        /// Start over if the file was truncated under us
        async fn check_truncation(&mut self) -> Result<()> {
            let len = self.file.metadata().await?.len();
            if len < self.position {
                warn!(path = %self.path.display(), len, "File truncated, restarting from the beginning");
                self.position = self.file.seek(SeekFrom::Start(0)).await?;
                self.buffer.clear();
            }
            Ok(())
        }
    }

    #[async_trait]
    impl LineSource for TailSource {
        async fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
            loop {
                if let Some(line) = self.take_line() {
                    return Ok(Some(line));
                }

                let read = self.file.read(&mut self.chunk).await?;
                if read == 0 {
                    tokio::time::sleep(self.poll_interval).await;
                    self.check_truncation().await?;
                    continue;
                }

                self.position += read as u64;
                self.buffer.extend_from_slice(&self.chunk[..read]);
                debug!(read, buffered = self.buffer.len(), "Read from followed file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sink::MemorySink;

    const LOG: &str = "filename:out.srt\n\
        start_time-00:00:01,000\tend_time-00:00:02,000\n\
        text[0]:HELLO                           \n\
        color[0]:00000000000000000000000000000000\n\
        font[0]:RRRRRRRRRRRRRRRRRRRRRRRRRRRRRRRR\n\
        ***END OF FRAME***\n";

    #[tokio::test]
    async fn test_reader_source_lines() {
        let mut source = ReaderSource::new(&b"one\ntwo\r\nthree"[..]);
        assert_eq!(source.next_line().await.unwrap(), Some(b"one\n".to_vec()));
        assert_eq!(source.next_line().await.unwrap(), Some(b"two\r\n".to_vec()));
        assert_eq!(source.next_line().await.unwrap(), Some(b"three".to_vec()));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_run_to_end() {
        let mut source = ReaderSource::new(LOG.as_bytes());
        let mut processor = Processor::new(MemorySink::new(), &Config::default()).unwrap();

        let stats = run(&mut source, &mut processor).await.unwrap();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.blocks_written, 1);

        let (sink, _) = processor.finish();
        assert_eq!(
            sink.text("out.srt").unwrap(),
            "1\n00:00:01,000 --> 00:00:02,000\nHELLO\n\n"
        );
    }

    #[cfg(feature = "tail")]
    #[tokio::test]
    async fn test_tail_holds_back_partial_line() {
        use std::io::Write;
        use std::time::Duration;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first\nsec").unwrap();
        file.flush().unwrap();

        let mut source = TailSource::open(
            file.path(),
            StartPosition::FromStart,
            Duration::from_millis(10),
        )
        .await
        .unwrap();
        assert_eq!(source.next_line().await.unwrap(), Some(b"first\n".to_vec()));

        let pending = tokio::time::timeout(Duration::from_millis(50), source.next_line()).await;
        assert!(pending.is_err(), "partial line must not be returned");

        write!(file, "ond\n").unwrap();
        file.flush().unwrap();
        let line = tokio::time::timeout(Duration::from_secs(2), source.next_line())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(line, Some(b"second\n".to_vec()));
    }

    #[cfg(feature = "tail")]
    #[tokio::test]
    async fn test_tail_lines_longer_than_one_read() {
        use std::io::Write;
        use std::time::Duration;

        let long = "x".repeat(tail::READ_CHUNK * 2 + 17);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{long}").unwrap();
        writeln!(file, "short").unwrap();
        file.flush().unwrap();

        let mut source = TailSource::open(
            file.path(),
            StartPosition::FromStart,
            Duration::from_millis(10),
        )
        .await
        .unwrap();

        let first = source.next_line().await.unwrap().unwrap();
        assert_eq!(first.len(), long.len() + 1);
        assert_eq!(source.next_line().await.unwrap(), Some(b"short\n".to_vec()));
    }

    #[cfg(feature = "tail")]
    #[tokio::test]
    async fn test_tail_from_end_skips_existing() {
        use std::io::Write;
        use std::time::Duration;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "old").unwrap();
        file.flush().unwrap();

        let mut source = TailSource::open(
            file.path(),
            StartPosition::FromEnd,
            Duration::from_millis(10),
        )
        .await
        .unwrap();

        writeln!(file, "new").unwrap();
        file.flush().unwrap();
        let line = tokio::time::timeout(Duration::from_secs(2), source.next_line())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(line, Some(b"new\n".to_vec()));
    }
}
