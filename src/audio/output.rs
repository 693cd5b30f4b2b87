//! Rodio-backed audio output
//!
//! rodio's output stream handle is not `Send`, so a dedicated worker thread
//! owns the device and receives playback jobs over a channel. The handle to
//! the active sink is shared, which lets `stop` halt playback from any
//! thread while the worker is sleeping on the clip.

use crate::audio::AudioOutput;
use crate::{ReciteError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use crossbeam_channel::{unbounded, Sender};
use parking_lot::Mutex;
use rodio::{Decoder, OutputStreamBuilder, Sink};
use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info};

enum PlayJob {
    Play {
        audio: Bytes,
        done: oneshot::Sender<Result<()>>,
    },
    Shutdown,
}

/// Plays WAV/MP3 clips through the default output device
pub struct RodioOutput {
    jobs_tx: Sender<PlayJob>,
    active_sink: Arc<Mutex<Option<Sink>>>,
}

impl RodioOutput {
    /// Open the default output device and start the playback worker
    pub fn new() -> Result<Self> {
        let (jobs_tx, jobs_rx) = unbounded();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let active_sink = Arc::new(Mutex::new(None::<Sink>));
        let sink_slot = Arc::clone(&active_sink);

        thread::spawn(move || {
            let stream = match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(ReciteError::PlaybackError(format!(
                        "failed to open output device: {e}"
                    ))));
                    return;
                }
            };

            info!("Audio output worker started");

            while let Ok(job) = jobs_rx.recv() {
                match job {
                    PlayJob::Play { audio, done } => {
                        let source = match Decoder::new(Cursor::new(audio.to_vec())) {
                            Ok(source) => source,
                            Err(e) => {
                                let _ = done.send(Err(ReciteError::PlaybackError(format!(
                                    "failed to decode audio: {e}"
                                ))));
                                continue;
                            }
                        };

                        let sink = Sink::connect_new(stream.mixer());
                        sink.append(source);
                        *sink_slot.lock() = Some(sink);

                        // Sleep until the clip drains or stop() takes the sink.
                        loop {
                            let finished = match sink_slot.lock().as_ref() {
                                Some(sink) => sink.empty(),
                                None => true,
                            };
                            if finished {
                                break;
                            }
                            thread::sleep(Duration::from_millis(20));
                        }

                        *sink_slot.lock() = None;
                        let _ = done.send(Ok(()));
                    }
                    PlayJob::Shutdown => break,
                }
            }

            debug!("Audio output worker stopped");
        });

        ready_rx
            .recv()
            .map_err(|_| ReciteError::PlaybackError("audio output worker exited during startup".into()))??;

        Ok(Self {
            jobs_tx,
            active_sink,
        })
    }
}

#[async_trait]
impl AudioOutput for RodioOutput {
    async fn play(&self, audio: Bytes) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.jobs_tx
            .send(PlayJob::Play {
                audio,
                done: done_tx,
            })
            .map_err(|_| ReciteError::PlaybackError("audio output worker terminated".into()))?;

        done_rx
            .await
            .map_err(|_| ReciteError::PlaybackError("audio output worker dropped the clip".into()))?
    }

    fn stop(&self) {
        if let Some(sink) = self.active_sink.lock().take() {
            sink.stop();
        }
    }
}

impl Drop for RodioOutput {
    fn drop(&mut self) {
        let _ = self.jobs_tx.send(PlayJob::Shutdown);
    }
}
