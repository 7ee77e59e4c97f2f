// Line-oriented decoder for the terminal binary.
//
// Hardware QR scanners in keyboard-wedge mode type the payload followed by
// a newline, so reading stdin lines covers both a real wedge scanner and
// manual entry. Camera-based decoding stays behind the same trait and is
// provided by whatever front end embeds this crate.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::scanner::traits::QrDecoder;
use crate::scanner::types::{DecodeEvent, DecodedPayload, ScanError};

#[derive(Default)]
pub struct StdinDecoder {
    reader: Option<JoinHandle<()>>,
}

impl StdinDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn abort_reader(&mut self) {
        if let Some(task) = self.reader.take() {
            task.abort();
        }
    }
}

#[async_trait]
impl QrDecoder for StdinDecoder {
    async fn has_camera(&self) -> Result<bool, ScanError> {
        // stdin is always attached for the terminal front end
        Ok(true)
    }

    async fn open(&mut self) -> Result<mpsc::Receiver<DecodeEvent>, ScanError> {
        let (sender, receiver) = mpsc::channel(8);
        let task = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let payload = line.trim();
                        if payload.is_empty() {
                            continue;
                        }
                        if sender
                            .send(DecodeEvent::Decoded(DecodedPayload::new(payload)))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        debug!(error = %err, "stdin read failed");
                        break;
                    }
                }
            }
        });
        self.reader = Some(task);
        Ok(receiver)
    }

    async fn pause(&mut self) {
        // A line terminal has no frame stream to suspend.
    }

    async fn resume(&mut self) {}

    async fn close(&mut self) {
        self.abort_reader();
    }

    fn dispose(&mut self) {
        self.abort_reader();
    }
}
