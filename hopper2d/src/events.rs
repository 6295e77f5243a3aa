//! Outward notifications from the simulation core.
//!
//! Entity code pushes fire-and-forget events into a channel-backed queue
//! while a tick runs; the orchestrator drains them after the tick. There
//! are no re-entrant callbacks, so the fixed update order of a tick is
//! the only ordering that matters.

/// One-way notification emitted during a logic tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// The player stomped an enemy.
    EnemyDefeated,
    /// A special patrol finished dying, arming any special collectibles.
    SpecialEnemyDefeated,
    /// A collectible was picked up. Fired at most once per block.
    ItemCollected { special: bool },
    /// The player finished its death sequence and respawned.
    PlayerDied,
    /// The player reached a level exit.
    LevelAdvance,
}

/// Cheap-to-clone sender handed to every entity that can emit events.
#[derive(Clone, Debug)]
pub struct EventSink {
    sender: crossbeam_channel::Sender<GameEvent>,
}

impl EventSink {
    pub fn emit(&self, event: GameEvent) {
        // The queue owns the matching receiver for the lifetime of the
        // simulation, so a send can only fail during teardown.
        let _ = self.sender.send(event);
    }
}

/// Collects events for the frame until the orchestrator drains them.
#[derive(Debug)]
pub struct EventQueue {
    sender: crossbeam_channel::Sender<GameEvent>,
    receiver: crossbeam_channel::Receiver<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    pub fn sink(&self) -> EventSink {
        EventSink {
            sender: self.sender.clone(),
        }
    }

    /// Drain everything emitted since the last call, in emission order.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_emission_order() {
        let mut queue = EventQueue::new();
        let sink = queue.sink();
        sink.emit(GameEvent::EnemyDefeated);
        sink.emit(GameEvent::ItemCollected { special: false });
        sink.emit(GameEvent::LevelAdvance);
        assert_eq!(
            queue.drain_events(),
            vec![
                GameEvent::EnemyDefeated,
                GameEvent::ItemCollected { special: false },
                GameEvent::LevelAdvance,
            ]
        );
        assert!(queue.drain_events().is_empty());
    }

    #[test]
    fn sinks_stay_usable_across_drains() {
        let mut queue = EventQueue::new();
        let sink = queue.sink();
        sink.emit(GameEvent::PlayerDied);
        queue.drain_events();
        sink.emit(GameEvent::PlayerDied);
        assert_eq!(queue.drain_events(), vec![GameEvent::PlayerDied]);
    }
}
