// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// UI-thread event queue
///
/// Native tray and menu callbacks may fire on a platform thread. They never
/// touch launcher state; they post a UiEvent and return. The UI thread is the
/// single consumer and applies events in arrival order.

use crossbeam_channel::{Receiver, Sender};

use crate::glgm_menu::TrayAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    // Posted by the native tray and window only
    #[cfg_attr(not(feature = "native"), allow(dead_code))]
    TrayActivated,
    MenuAction(TrayAction),
    #[cfg_attr(not(feature = "native"), allow(dead_code))]
    CloseRequested,
    #[cfg_attr(not(feature = "native"), allow(dead_code))]
    FocusLost,
}

/// Fire-and-forget posting onto the UI thread
pub trait UiDispatch: Send + Sync {
    fn post(&self, event: UiEvent);
}

pub struct UiQueue {
    tx: Sender<UiEvent>,
    rx: Receiver<UiEvent>,
}

#[derive(Clone)]
pub struct UiSender {
    tx: Sender<UiEvent>,
}

impl UiQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        UiQueue { tx, rx }
    }

    pub fn sender(&self) -> UiSender {
        UiSender { tx: self.tx.clone() }
    }

    /// Everything posted so far, in order; never blocks
    pub fn drain(&self) -> Vec<UiEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for UiQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl UiDispatch for UiSender {
    fn post(&self, event: UiEvent) {
        // The receiver lives as long as the UI loop; a failed send means shutdown
        if self.tx.send(event).is_err() {
            log::debug!("QUEUE: UI loop gone, event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_cross_thread_posts_arrive_in_order() {
        let queue = UiQueue::new();
        let sender = queue.sender();

        let handle = thread::spawn(move || {
            sender.post(UiEvent::TrayActivated);
            sender.post(UiEvent::MenuAction(TrayAction::Quit));
        });
        handle.join().unwrap();

        assert_eq!(queue.drain(), vec![
            UiEvent::TrayActivated,
            UiEvent::MenuAction(TrayAction::Quit),
        ]);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_post_after_queue_dropped_is_silent() {
        let queue = UiQueue::new();
        let sender = queue.sender();
        drop(queue);
        sender.post(UiEvent::CloseRequested);
    }
}
