use std::collections::VecDeque;

/// Opaque id of one requested frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host-provided "next frame" primitive.
pub trait FrameScheduler {
    /// Ask for one callback on the next frame.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request. Unknown or already-fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Queue-backed scheduler for hosts that pace frames themselves (headless runs, simple windows).
#[derive(Debug, Default)]
pub struct HeadlessScheduler {
    next_id: u64,
    queue: VecDeque<FrameHandle>,
}

impl HeadlessScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that have not fired or been cancelled.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Fire the oldest request, if any.
    pub fn next_due(&mut self) -> Option<FrameHandle> {
        self.queue.pop_front()
    }

    /// Fire every request made before this call; requests made while handling them wait for
    /// the next frame.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        self.queue.drain(..).collect()
    }
}

impl FrameScheduler for HeadlessScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.queue.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.queue.retain(|h| *h != handle);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/schedule.rs"]
mod tests;
