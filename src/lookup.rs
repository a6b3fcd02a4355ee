//! Player lookup context used to resolve ids that are not in a group roster.
//!
//! The directory is passed explicitly to whoever needs it. Cached entries are
//! only dropped by [`PlayerDirectory::invalidate`] and [`PlayerDirectory::refresh`].

use std::cell::RefCell;
use std::collections::HashMap;

use crate::group::GameGroup;
use crate::player::{Player, PlayerId};

/// Resolves a player id to its record.
pub trait PlayerLookup {
    fn lookup(&self, id: &str) -> Option<Player>;
}

impl PlayerLookup for [Player] {
    fn lookup(&self, id: &str) -> Option<Player> {
        self.iter().find(|p| p.id == id).cloned()
    }
}

impl PlayerLookup for Vec<Player> {
    fn lookup(&self, id: &str) -> Option<Player> {
        self.as_slice().lookup(id)
    }
}

impl PlayerLookup for GameGroup {
    fn lookup(&self, id: &str) -> Option<Player> {
        self.player(id).cloned()
    }
}

impl<T: PlayerLookup + ?Sized> PlayerLookup for &T {
    fn lookup(&self, id: &str) -> Option<Player> {
        (**self).lookup(id)
    }
}

/// Read-through cache of registered players plus ad-hoc guest players.
///
/// Guests are held until removed. Registered players are loaded from the
/// source on first use, including misses, and then served from the cache.
pub struct PlayerDirectory<S> {
    source: S,
    guests: HashMap<PlayerId, Player>,
    registered: RefCell<HashMap<PlayerId, Option<Player>>>,
}

impl<S: PlayerLookup> PlayerDirectory<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            guests: HashMap::new(),
            registered: RefCell::new(HashMap::new()),
        }
    }

    pub fn add_guest(&mut self, player: Player) {
        self.guests.insert(player.id.clone(), player);
    }

    pub fn remove_guest(&mut self, id: &str) -> Option<Player> {
        self.guests.remove(id)
    }

    pub fn guests(&self) -> impl Iterator<Item = &Player> {
        self.guests.values()
    }

    /// Forgets the cached entry for `id`; the next lookup reads the source again.
    pub fn invalidate(&self, id: &str) {
        self.registered.borrow_mut().remove(id);
    }

    /// Forgets every cached registered player.
    pub fn refresh(&self) {
        self.registered.borrow_mut().clear();
    }

    pub fn cached_len(&self) -> usize {
        self.registered.borrow().len()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Replaces the source and drops everything cached from the old one.
    pub fn set_source(&mut self, source: S) {
        self.source = source;
        self.refresh();
    }
}

impl<S: PlayerLookup> PlayerLookup for PlayerDirectory<S> {
    fn lookup(&self, id: &str) -> Option<Player> {
        if let Some(guest) = self.guests.get(id) {
            return Some(guest.clone());
        }
        if let Some(cached) = self.registered.borrow().get(id) {
            return cached.clone();
        }
        let loaded = self.source.lookup(id);
        self.registered
            .borrow_mut()
            .insert(id.to_string(), loaded.clone());
        loaded
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct CountingSource {
        players: Vec<Player>,
        reads: Cell<usize>,
    }

    impl PlayerLookup for CountingSource {
        fn lookup(&self, id: &str) -> Option<Player> {
            self.reads.set(self.reads.get() + 1);
            self.players.lookup(id)
        }
    }

    fn directory() -> PlayerDirectory<CountingSource> {
        PlayerDirectory::new(CountingSource {
            players: vec![Player::new("p1", "Paula", "Pohl")],
            reads: Cell::new(0),
        })
    }

    #[test]
    fn reads_through_once_per_id() {
        let dir = directory();
        assert_eq!(dir.lookup("p1").map(|p| p.firstname), Some("Paula".to_string()));
        assert!(dir.lookup("p1").is_some());
        assert!(dir.lookup("missing").is_none());
        assert!(dir.lookup("missing").is_none());
        assert_eq!(dir.source().reads.get(), 2);
        assert_eq!(dir.cached_len(), 2);
    }

    #[test]
    fn invalidate_and_refresh_force_reloads() {
        let dir = directory();
        dir.lookup("p1");
        dir.invalidate("p1");
        dir.lookup("p1");
        assert_eq!(dir.source().reads.get(), 2);
        dir.refresh();
        assert_eq!(dir.cached_len(), 0);
        dir.lookup("p1");
        assert_eq!(dir.source().reads.get(), 3);
    }

    #[test]
    fn guests_shadow_the_source() {
        let mut dir = directory();
        dir.add_guest(Player::new("p1", "Gast", ""));
        assert_eq!(dir.lookup("p1").map(|p| p.firstname), Some("Gast".to_string()));
        assert_eq!(dir.source().reads.get(), 0);
        dir.remove_guest("p1");
        assert_eq!(dir.lookup("p1").map(|p| p.firstname), Some("Paula".to_string()));
    }
}
