use crate::session::{GameId, Message, Peer};
use dashmap::{mapref::entry::Entry, DashMap};
use tracing::{instrument, trace};

/// The live connections attached to each game.
///
/// Operations on different games never contend for the same entry, and a
/// broadcast only holds the entry long enough to take a snapshot of its peers.
#[derive(Debug, Default)]
pub struct Registry {
    games: DashMap<GameId, Vec<Peer>>,
}

impl Registry {
    /// Attaches a peer to a game, unless already attached.
    #[instrument(level = "trace", skip(self, peer), fields(%peer))]
    pub fn attach(&self, game: GameId, peer: Peer) {
        let mut peers = self.games.entry(game).or_default();
        if !peers.contains(&peer) {
            peers.push(peer);
        }
    }

    /// Detaches a peer from a game, forgetting the game once nobody is left.
    #[instrument(level = "trace", skip(self, peer), fields(%peer))]
    pub fn detach(&self, game: GameId, peer: &Peer) {
        if let Entry::Occupied(mut e) = self.games.entry(game) {
            e.get_mut().retain(|p| p != peer);
            if e.get().is_empty() {
                e.remove();
            }
        }
    }

    /// Detaches a peer from every game it is attached to.
    pub fn detach_all(&self, peer: &Peer) -> Vec<GameId> {
        let games: Vec<_> = self
            .games
            .iter()
            .filter(|e| e.value().contains(peer))
            .map(|e| *e.key())
            .collect();

        for &game in &games {
            self.detach(game, peer);
        }

        games
    }

    /// A snapshot of the peers attached to a game.
    pub fn peers(&self, game: GameId) -> Vec<Peer> {
        self.games
            .get(&game)
            .map(|peers| peers.clone())
            .unwrap_or_default()
    }

    /// Whether the game has any peers attached.
    pub fn contains(&self, game: GameId) -> bool {
        self.games.contains_key(&game)
    }

    /// The number of games with peers attached.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Sends a message to every open peer of a game, except `excluded`.
    ///
    /// Returns the number of peers the message was delivered to.
    #[instrument(level = "trace", skip(self, excluded, msg))]
    pub fn broadcast(&self, game: GameId, excluded: Option<&Peer>, msg: &Message) -> usize {
        let mut delivered = 0;

        for peer in self.peers(game) {
            if Some(&peer) == excluded {
                continue;
            }

            if peer.send(msg.clone()) {
                delivered += 1;
            } else {
                trace!(%peer, "skipping unreachable connection");
            }
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn attach_is_idempotent() {
        let registry = Registry::default();
        let (peer, _rx) = Peer::new();

        registry.attach(1, peer.clone());
        registry.attach(1, peer.clone());

        assert_eq!(registry.peers(1), vec![peer]);
    }

    #[test]
    fn detaching_the_last_peer_removes_the_game() {
        let registry = Registry::default();
        let (a, _ra) = Peer::new();
        let (b, _rb) = Peer::new();

        registry.attach(1, a.clone());
        registry.attach(1, b.clone());

        registry.detach(1, &a);
        assert!(registry.contains(1));

        registry.detach(1, &b);
        assert!(!registry.contains(1));
        assert!(registry.is_empty());
    }

    #[test]
    fn detaching_unknown_peer_is_a_no_op() {
        let registry = Registry::default();
        let (a, _ra) = Peer::new();
        let (b, _rb) = Peer::new();

        registry.attach(1, a.clone());
        registry.detach(1, &b);
        registry.detach(2, &a);

        assert_eq!(registry.peers(1), vec![a]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn detach_all_removes_peer_from_every_game() {
        let registry = Registry::default();
        let (a, _ra) = Peer::new();
        let (b, _rb) = Peer::new();

        registry.attach(1, a.clone());
        registry.attach(2, a.clone());
        registry.attach(2, b.clone());

        let mut games = registry.detach_all(&a);
        games.sort();

        assert_eq!(games, vec![1, 2]);
        assert!(!registry.contains(1));
        assert_eq!(registry.peers(2), vec![b]);
    }

    #[test]
    fn broadcast_skips_the_excluded_peer() {
        let registry = Registry::default();
        let (a, mut ra) = Peer::new();
        let (b, mut rb) = Peer::new();

        registry.attach(1, a.clone());
        registry.attach(1, b);

        let msg = Message::notification("hello");
        assert_eq!(registry.broadcast(1, Some(&a), &msg), 1);

        assert!(ra.try_recv().is_err());
        assert_eq!(rb.try_recv(), Ok(msg));
    }

    #[test]
    fn broadcast_skips_closed_peers() {
        let registry = Registry::default();
        let (a, ra) = Peer::new();
        let (b, mut rb) = Peer::new();

        registry.attach(1, a);
        registry.attach(1, b);
        drop(ra);

        let msg = Message::notification("hello");
        assert_eq!(registry.broadcast(1, None, &msg), 1);
        assert_eq!(rb.try_recv(), Ok(msg));
    }

    #[test]
    fn broadcast_skips_lagging_peers() {
        let registry = Registry::default();
        let (a, mut ra) = Peer::with_backlog(1);
        let (b, mut rb) = Peer::new();

        registry.attach(1, a);
        registry.attach(1, b);

        assert_eq!(registry.broadcast(1, None, &Message::notification("first")), 2);
        assert_eq!(registry.broadcast(1, None, &Message::notification("second")), 1);

        assert_eq!(ra.try_recv(), Ok(Message::notification("first")));
        assert!(ra.try_recv().is_err());
        assert_eq!(rb.try_recv(), Ok(Message::notification("first")));
        assert_eq!(rb.try_recv(), Ok(Message::notification("second")));
    }

    #[test]
    fn broadcast_is_scoped_to_the_game() {
        let registry = Registry::default();
        let (a, _ra) = Peer::new();
        let (b, mut rb) = Peer::new();

        registry.attach(1, a);
        registry.attach(2, b);

        assert_eq!(registry.broadcast(1, None, &Message::notification("hi")), 1);
        assert!(rb.try_recv().is_err());
    }

    #[proptest]
    fn concurrent_attach_and_detach_leaves_no_entries(
        #[strategy(1usize..16)] n: usize,
        #[strategy(0u32..4)] game: GameId,
    ) {
        let registry = Registry::default();
        let peers: Vec<_> = (0..n).map(|_| Peer::new()).collect();

        std::thread::scope(|s| {
            for (peer, _) in &peers {
                let registry = &registry;
                s.spawn(move || {
                    registry.attach(game, peer.clone());
                    registry.broadcast(game, Some(peer), &Message::notification("hi"));
                    registry.detach(game, peer);
                });
            }
        });

        assert!(registry.is_empty());
    }
}
