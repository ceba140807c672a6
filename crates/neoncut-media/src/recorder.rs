// crates/neoncut-media/src/recorder.rs
//
// Streaming recorders. A recorder is started with a fixed frame budget and a
// channel; encoded bytes leave as `RecorderEvent::Data` chunks while frames
// are still being pushed, and `Stopped` marks the end of the stream.
//
// APNG backend:
//   RGB8, one `fcTL` + image chunk per frame, frame delay 1/fps. The frame
//   count is written into `acTL` up front, so `stop` pads a short capture by
//   repeating the last frame (black when nothing was captured) and frames
//   past the budget are dropped.
//
// Abort:
//   `abort` raises a shared discard flag. The chunk writer then drops every
//   buffered and future byte instead of sending it, so a failed export never
//   leaks a partial file onto the channel.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, ensure, Context, Result};
use crossbeam_channel::Sender;
use tracing::{debug, trace};

use crate::surface::Surface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordSpec {
    pub width:       u32,
    pub height:      u32,
    pub fps:         u32,
    pub frame_count: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RecorderEvent {
    Data(Vec<u8>),
    Stopped,
}

pub trait MediaRecorder: Send {
    fn mime_type(&self) -> &'static str;
    fn file_extension(&self) -> &'static str;
    fn start(&mut self, spec: RecordSpec, tx: Sender<RecorderEvent>) -> Result<()>;
    fn push_frame(&mut self, frame: &Surface) -> Result<()>;
    /// Flush everything and send `Stopped`.
    fn stop(&mut self) -> Result<()>;
    /// Release resources without emitting anything further.
    fn abort(&mut self);
}

// ── Chunk writer ─────────────────────────────────────────────────────────────

/// `Write` sink that batches bytes into `chunk_size` pieces on a channel.
pub struct ChunkWriter {
    buf:        Vec<u8>,
    chunk_size: usize,
    tx:         Sender<RecorderEvent>,
    discard:    Arc<AtomicBool>,
}

impl ChunkWriter {
    pub fn new(tx: Sender<RecorderEvent>, chunk_size: usize, discard: Arc<AtomicBool>) -> Self {
        let chunk_size = chunk_size.max(1);
        Self { buf: Vec::with_capacity(chunk_size), chunk_size, tx, discard }
    }

    fn emit(&mut self) -> io::Result<()> {
        if self.discard.load(Ordering::Relaxed) {
            self.buf.clear();
            return Ok(());
        }
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = std::mem::replace(&mut self.buf, Vec::with_capacity(self.chunk_size));
        trace!(bytes = chunk.len(), "recorder chunk");
        self.tx.send(RecorderEvent::Data(chunk))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "recorder channel closed"))
    }
}

impl Write for ChunkWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        while self.buf.len() >= self.chunk_size && !self.discard.load(Ordering::Relaxed) {
            let rest = self.buf.split_off(self.chunk_size);
            let full = std::mem::replace(&mut self.buf, rest);
            self.tx.send(RecorderEvent::Data(full))
                .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "recorder channel closed"))?;
        }
        if self.discard.load(Ordering::Relaxed) {
            self.buf.clear();
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit()
    }
}

impl Drop for ChunkWriter {
    fn drop(&mut self) {
        let _ = self.emit();
    }
}

// ── APNG ─────────────────────────────────────────────────────────────────────

struct ActiveApng {
    writer:  png::Writer<ChunkWriter>,
    spec:    RecordSpec,
    written: u32,
    last:    Option<Vec<u8>>,
    tx:      Sender<RecorderEvent>,
    discard: Arc<AtomicBool>,
}

pub struct ApngRecorder {
    chunk_size: usize,
    active:     Option<ActiveApng>,
}

impl ApngRecorder {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size, active: None }
    }

    pub fn frames_written(&self) -> u32 {
        self.active.as_ref().map_or(0, |a| a.written)
    }
}

impl MediaRecorder for ApngRecorder {
    fn mime_type(&self) -> &'static str {
        "image/apng"
    }

    fn file_extension(&self) -> &'static str {
        "png"
    }

    fn start(&mut self, spec: RecordSpec, tx: Sender<RecorderEvent>) -> Result<()> {
        ensure!(self.active.is_none(), "recorder already started");
        ensure!(spec.width > 0 && spec.height > 0, "empty frame size {}x{}", spec.width, spec.height);
        ensure!(spec.frame_count > 0, "frame budget must be at least 1");
        let fps = u16::try_from(spec.fps).ok().filter(|f| *f > 0)
            .with_context(|| format!("fps {} out of range", spec.fps))?;

        let discard = Arc::new(AtomicBool::new(false));
        let sink = ChunkWriter::new(tx.clone(), self.chunk_size, discard.clone());

        let mut encoder = png::Encoder::new(sink, spec.width, spec.height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_animated(spec.frame_count, 0).context("configure APNG animation")?;
        encoder.set_frame_delay(1, fps).context("configure APNG frame delay")?;
        let writer = encoder.write_header().context("write APNG header")?;

        debug!(w = spec.width, h = spec.height, fps = spec.fps, frames = spec.frame_count, "APNG recorder started");
        self.active = Some(ActiveApng { writer, spec, written: 0, last: None, tx, discard });
        Ok(())
    }

    fn push_frame(&mut self, frame: &Surface) -> Result<()> {
        let Some(a) = self.active.as_mut() else {
            bail!("recorder not started");
        };
        ensure!(
            frame.width == a.spec.width && frame.height == a.spec.height,
            "frame is {}x{}, recorder expects {}x{}",
            frame.width, frame.height, a.spec.width, a.spec.height,
        );
        if a.written >= a.spec.frame_count {
            trace!(budget = a.spec.frame_count, "frame past budget dropped");
            return Ok(());
        }
        let rgb = frame.to_rgb();
        a.writer.write_image_data(&rgb)
            .with_context(|| format!("write APNG frame {}", a.written))?;
        a.written += 1;
        a.last = Some(rgb);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let Some(mut a) = self.active.take() else {
            bail!("recorder not started");
        };
        let filler = a.last.take().unwrap_or_else(|| {
            vec![0u8; a.spec.width as usize * a.spec.height as usize * 3]
        });
        let padded = a.spec.frame_count - a.written;
        while a.written < a.spec.frame_count {
            a.writer.write_image_data(&filler)
                .with_context(|| format!("write APNG padding frame {}", a.written))?;
            a.written += 1;
        }
        a.writer.finish().context("finish APNG stream")?;
        debug!(frames = a.written, padded, "APNG recorder stopped");
        a.tx.send(RecorderEvent::Stopped).context("recorder channel closed")?;
        Ok(())
    }

    fn abort(&mut self) {
        if let Some(a) = self.active.take() {
            a.discard.store(true, Ordering::Relaxed);
            debug!(frames = a.written, "APNG recorder aborted");
        }
    }
}
