use crossbeam_channel::{unbounded, Receiver, Sender};
use netvis_core::VertexId;
use serde::{Deserialize, Serialize};

/// Notifications the canvas publishes to its host.
///
/// Batch operations publish at most one `SelectionChanged`, after every
/// individual change in the batch has been applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CanvasEvent {
    SelectionChanged,
    VertexClicked(VertexId),
    VertexDoubleClicked(VertexId),
    VerticesMoved {
        vertices: Vec<VertexId>,
    },
    /// An asynchronous layout pass has started.
    LayingOutGraph,
    /// The pass finished.  On failure `error` carries the message and the
    /// previous drawing is kept.
    GraphLaidOut {
        error: Option<String>,
    },
    ZoomChanged {
        zoom: f64,
    },
    TranslationChanged {
        x: f64,
        y: f64,
    },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: Sender<CanvasEvent>,
    rx: Receiver<CanvasEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<CanvasEvent> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<CanvasEvent> {
        self.rx.clone()
    }

    pub fn publish(&self, event: CanvasEvent) {
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener.
    /// This is useful for processing events in the UI loop.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Trait for components that respond to canvas events.
pub trait EventListener {
    fn handle_event(&mut self, event: &CanvasEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus_publish_receive() {
        let bus = EventBus::new();
        let sender = bus.sender();
        let receiver = bus.receiver();

        sender.send(CanvasEvent::VertexClicked(VertexId(123))).unwrap();

        match receiver.recv().unwrap() {
            CanvasEvent::VertexClicked(id) => assert_eq!(id.0, 123),
            other => panic!("Expected VertexClicked, got {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_to_drains_pending_events() {
        struct Counter {
            selection_changes: usize,
            laid_out_errors: Vec<Option<String>>,
        }
        impl EventListener for Counter {
            fn handle_event(&mut self, event: &CanvasEvent) {
                match event {
                    CanvasEvent::SelectionChanged => self.selection_changes += 1,
                    CanvasEvent::GraphLaidOut { error } => {
                        self.laid_out_errors.push(error.clone())
                    }
                    _ => {}
                }
            }
        }

        let bus = EventBus::new();
        bus.publish(CanvasEvent::SelectionChanged);
        bus.publish(CanvasEvent::GraphLaidOut { error: None });
        bus.publish(CanvasEvent::GraphLaidOut {
            error: Some("out of memory".into()),
        });

        let mut counter = Counter {
            selection_changes: 0,
            laid_out_errors: Vec::new(),
        };
        bus.dispatch_to(&mut counter);

        assert_eq!(counter.selection_changes, 1);
        assert_eq!(
            counter.laid_out_errors,
            vec![None, Some("out of memory".to_string())]
        );

        // A second dispatch finds nothing.
        bus.dispatch_to(&mut counter);
        assert_eq!(counter.selection_changes, 1);
    }
}
