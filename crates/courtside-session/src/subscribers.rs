//! Change listeners.
//!
//! Listeners are called synchronously, in subscription order, after each
//! successful mutation. They receive the game and the event by shared
//! reference and cannot reach the session, so a listener cannot trigger a
//! nested mutation.

use courtside_core::event::GameEvent;
use courtside_core::game::Game;

/// Callback invoked for every event of the current game.
pub type Listener = Box<dyn FnMut(&Game, &GameEvent)>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns whether `id` was subscribed.
    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub(crate) fn notify(&mut self, game: &Game, event: &GameEvent) {
        for (_, listener) in &mut self.listeners {
            listener(game, event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use courtside_core::prelude::{demo_game, IdGenerator};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let game = demo_game(
            &mut IdGenerator::from_seed(0),
            Utc.timestamp_millis_opt(0).unwrap(),
        );
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut subs = Subscribers::default();

        let log = Rc::clone(&calls);
        let a = subs.subscribe(Box::new(move |_, _| log.borrow_mut().push("a")));
        let log = Rc::clone(&calls);
        subs.subscribe(Box::new(move |_, _| log.borrow_mut().push("b")));

        subs.notify(&game, &GameEvent::SettingsChanged);
        assert!(subs.unsubscribe(a));
        assert!(!subs.unsubscribe(a));
        subs.notify(&game, &GameEvent::SettingsChanged);

        assert_eq!(*calls.borrow(), vec!["a", "b", "b"]);
        assert_eq!(subs.len(), 1);
    }
}
