use std::sync::mpsc::{Receiver, SyncSender, sync_channel};

use crate::foundation::error::StippleResult;
use crate::sampling::decode::{DecodedImage, ImageSource, load_source};

/// One-shot completion handle for a decode.
///
/// It has its own single-slot channel, so a busy input queue can never crowd the result out.
/// Dropping it without delivering counts as a decode failure.
#[derive(Debug)]
pub struct DecodeSender {
    tx: SyncSender<StippleResult<DecodedImage>>,
}

impl DecodeSender {
    /// Hand the result to the engine. Returns false if the engine is gone.
    pub fn deliver(self, result: StippleResult<DecodedImage>) -> bool {
        self.tx.send(result).is_ok()
    }
}

pub(crate) fn decode_channel() -> (DecodeSender, Receiver<StippleResult<DecodedImage>>) {
    let (tx, rx) = sync_channel(1);
    (DecodeSender { tx }, rx)
}

/// Starts decoding an image and reports completion through `done`.
///
/// The engine picks the result up on its next pump.
pub trait ImageDecoder {
    fn decode(&mut self, source: ImageSource, done: DecodeSender);
}

/// Decodes on the calling thread; the result is ready before `decode` returns.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineDecoder;

impl ImageDecoder for InlineDecoder {
    fn decode(&mut self, source: ImageSource, done: DecodeSender) {
        if !done.deliver(load_source(&source)) {
            tracing::debug!("engine went away before the image was decoded");
        }
    }
}

/// Decodes on a background thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadDecoder;

impl ImageDecoder for ThreadDecoder {
    fn decode(&mut self, source: ImageSource, done: DecodeSender) {
        std::thread::spawn(move || {
            if !done.deliver(load_source(&source)) {
                tracing::debug!("engine went away before the image finished decoding");
            }
        });
    }
}
