use crate::types::{InputEvent, MutationRecord, TimerId, TriggerId};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Everything the controller reacts to, delivered on one queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Activate(TriggerId),
    Input(InputEvent),
    Mutations(Vec<MutationRecord>),
    Tick(TimerId),
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Activate(_) => "activate",
            Self::Input(_) => "input",
            Self::Mutations(_) => "mutations",
            Self::Tick(_) => "tick",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventSender {
    tx: UnboundedSender<UiEvent>,
}

impl EventSender {
    /// Queue an event. Events sent after the queue is gone are dropped.
    pub fn send(&self, event: UiEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug)]
pub struct EventQueue {
    rx: UnboundedReceiver<UiEvent>,
}

impl EventQueue {
    pub fn try_next(&mut self) -> Option<UiEvent> {
        self.rx.try_recv().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

pub fn event_queue() -> (EventSender, EventQueue) {
    let (tx, rx) = unbounded_channel();
    (EventSender { tx }, EventQueue { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_preserves_send_order_across_clones() {
        let (tx, mut queue) = event_queue();
        let other = tx.clone();
        tx.send(UiEvent::Activate(TriggerId::Record));
        other.send(UiEvent::Tick(TimerId(3)));
        tx.send(UiEvent::Activate(TriggerId::Playback));

        assert_eq!(queue.try_next(), Some(UiEvent::Activate(TriggerId::Record)));
        assert_eq!(queue.try_next(), Some(UiEvent::Tick(TimerId(3))));
        assert_eq!(
            queue.try_next().map(|event| event.name()),
            Some("activate")
        );
        assert!(queue.is_empty());
        assert_eq!(queue.try_next(), None);
    }

    #[test]
    fn send_after_queue_dropped_is_silent() {
        let (tx, queue) = event_queue();
        drop(queue);
        tx.send(UiEvent::Tick(TimerId(1)));
    }
}
