//! Drawable targets the engine presents frames to.
//!
//! A surface is handed to the simulation thread once and owned by it from
//! then on. The thread that created it only ever sees finished frames,
//! never the surface itself.

use std::fmt;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::render::PixelBuffer;

/// A fixed-size output target.
pub trait Surface: Send {
    /// Logical (width, height) in pixels.
    fn size(&self) -> (usize, usize);

    /// Receive a finished frame of exactly `size()` pixels.
    fn present(&mut self, frame: &PixelBuffer);
}

/// Keeps the most recent frame in memory. Used headless and in tests.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    width: usize,
    height: usize,
    last: Option<PixelBuffer>,
    presented: usize,
}

impl MemorySurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            last: None,
            presented: 0,
        }
    }

    pub fn last_frame(&self) -> Option<&PixelBuffer> {
        self.last.as_ref()
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn present(&mut self, frame: &PixelBuffer) {
        self.last = Some(frame.clone());
        self.presented += 1;
    }
}

/// Frames a display may have pending before the oldest is evicted.
pub const FRAME_QUEUE: usize = 2;

/// Forwards frames over a bounded channel to whoever displays them.
///
/// If the display side falls behind, the oldest pending frame is evicted
/// so the newest one always gets through; the simulation itself never
/// waits on the display.
pub struct ChannelSurface {
    width: usize,
    height: usize,
    tx: Sender<PixelBuffer>,
    stale: Receiver<PixelBuffer>,
    waker: Option<Box<dyn Fn() + Send>>,
}

impl ChannelSurface {
    /// Create the surface and the receiving end for the display thread.
    pub fn new(width: usize, height: usize) -> (Self, Receiver<PixelBuffer>) {
        let (tx, rx) = crossbeam_channel::bounded(FRAME_QUEUE);
        (
            Self {
                width,
                height,
                tx,
                stale: rx.clone(),
                waker: None,
            },
            rx,
        )
    }

    /// Callback run after each delivered frame (e.g. request a repaint).
    pub fn with_waker<F: Fn() + Send + 'static>(mut self, waker: F) -> Self {
        self.waker = Some(Box::new(waker));
        self
    }
}

impl fmt::Debug for ChannelSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Surface for ChannelSurface {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn present(&mut self, frame: &PixelBuffer) {
        let mut frame = frame.clone();
        loop {
            match self.tx.try_send(frame) {
                Ok(()) => {
                    if let Some(wake) = &self.waker {
                        wake();
                    }
                    return;
                }
                Err(TrySendError::Full(back)) => {
                    log::trace!("display behind, evicting oldest frame");
                    let _ = self.stale.try_recv();
                    frame = back;
                }
                Err(TrySendError::Disconnected(_)) => {
                    log::trace!("display gone, frame dropped");
                    return;
                }
            }
        }
    }
}
