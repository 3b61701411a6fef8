//! Per-slide progress notifications.
//!
//! The build calls [`Progress::slide_queued`] once for every slide it has
//! registered, in input order, on the thread running the build.

use tokio::sync::mpsc::UnboundedSender;

/// Message sent on a progress channel; carries nothing beyond "one step done".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideQueued;

pub trait Progress {
    fn slide_queued(&mut self);
}

/// No notifications.
impl Progress for () {
    fn slide_queued(&mut self) {}
}

impl<F: FnMut()> Progress for F {
    fn slide_queued(&mut self) {
        self()
    }
}

/// A closed receiver is ignored; the build keeps going.
impl Progress for UnboundedSender<SlideQueued> {
    fn slide_queued(&mut self) {
        let _ = self.send(SlideQueued);
    }
}
