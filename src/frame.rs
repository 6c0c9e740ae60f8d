//! Frame-callback scheduling.
//!
//! The animation loop never busy-waits: each frame asks the host for exactly one
//! next frame through a [`FrameScheduler`]. Requests carry an id so a callback that
//! arrives after its request was cancelled can be recognised and ignored.

use std::sync::Arc;

use winit::window::Window;

/// Identifies one requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequest(pub u64);

/// A cancellable "call me on the next frame" primitive
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequest;
    /// Cancels a request; unknown or already delivered requests are ignored
    fn cancel_frame(&mut self, request: FrameRequest);
    /// Requests not yet delivered or cancelled
    fn pending(&self) -> usize;
}

/// Scheduler whose frames are delivered explicitly by the caller.
///
/// Used by headless hosts and tests: [`next_due`](ManualFrameScheduler::next_due)
/// hands out the oldest pending request, which the host then passes to
/// `Lifecycle::on_frame`.
#[derive(Debug, Default)]
pub struct ManualFrameScheduler {
    next_id: u64,
    pending: Vec<FrameRequest>,
    requested_total: u64,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the oldest pending request
    pub fn next_due(&mut self) -> Option<FrameRequest> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub fn is_pending(&self, request: FrameRequest) -> bool {
        self.pending.contains(&request)
    }

    /// Requests made over the scheduler's lifetime
    pub fn requested_total(&self) -> u64 {
        self.requested_total
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        self.requested_total += 1;
        let request = FrameRequest(self.next_id);
        self.pending.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.pending.retain(|r| *r != request);
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Schedules frames through winit's `request_redraw`.
///
/// A redraw event cannot be withdrawn once requested, so cancelling only forgets the
/// request; the lifecycle then treats the late `RedrawRequested` as stale.
#[derive(Debug)]
pub struct RedrawScheduler {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<FrameRequest>,
}

impl RedrawScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            pending: None,
        }
    }

    /// The request a `RedrawRequested` event would deliver
    pub fn take_due(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        if let Some(existing) = self.pending {
            return existing;
        }
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }

    fn pending(&self) -> usize {
        usize::from(self.pending.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_request_and_cancel() {
        let mut scheduler = ManualFrameScheduler::new();
        let a = scheduler.request_frame();
        let b = scheduler.request_frame();
        assert_ne!(a, b);
        assert_eq!(scheduler.pending(), 2);

        scheduler.cancel_frame(a);
        scheduler.cancel_frame(a);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.next_due(), Some(b));
        assert_eq!(scheduler.next_due(), None);
        assert_eq!(scheduler.requested_total(), 2);
    }
}
