//! Streaming file bodies.

use futures::stream::Stream;
use futures::stream;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

/// Chunk size for streamed request bodies.
const CHUNK_SIZE: usize = 64 * 1024;

/// Turns an open file into a chunked byte stream suitable for a request
/// body, without ever holding the whole file in memory.
///
/// When `progress` is given, the cumulative number of bytes handed to the
/// transport is sent after every chunk; a dropped receiver is ignored.
pub fn file_stream(
    file: File,
    progress: Option<mpsc::UnboundedSender<u64>>,
) -> impl Stream<Item = std::io::Result<Vec<u8>>> + Send {
    stream::unfold((file, 0u64, progress), |(mut file, sent, progress)| async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        match file.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                let sent = sent + n as u64;
                if let Some(tx) = &progress {
                    let _ = tx.send(sent);
                }
                Some((Ok(buf), (file, sent, progress)))
            }
            Err(e) => Some((Err(e), (file, sent, progress))),
        }
    })
}
