//! JSON Lines output of meeting records.

use std::io::Write;

use clayton_meetings_meeting_models::Meeting;
use tokio::sync::mpsc;

/// Writes one JSON object per line.
pub struct JsonLinesWriter<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> JsonLinesWriter<W> {
    pub const fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Serializes `meeting` followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if serialization or the write fails.
    pub fn write(&mut self, meeting: &Meeting) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.inner, meeting)?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the flush fails.
    pub fn finish(mut self) -> std::io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Writes every meeting received on `rx` until all senders are gone.
///
/// A write error closes the receiver, so a crawl blocked on a full channel
/// gets a send error and stops.
///
/// # Errors
///
/// Returns the first I/O error from the writer.
pub async fn drain<W: Write>(
    mut rx: mpsc::Receiver<Meeting>,
    writer: &mut JsonLinesWriter<W>,
) -> std::io::Result<()> {
    while let Some(meeting) = rx.recv().await {
        if let Err(e) = writer.write(&meeting) {
            rx.close();
            return Err(e);
        }
    }
    Ok(())
}
