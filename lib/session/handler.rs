use crate::chess::{Color, Move, Outcome};
use crate::session::{Command, GameId, GameRecord, Identity, Message, Peer, Registry, Request};
use crate::session::{RuleViolation, SessionError, Store};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// Applies commands to games and keeps their connections in sync.
///
/// Commands on the same game are handled one at a time, from loading the record
/// to broadcasting the result, while different games proceed independently.
#[derive(Debug)]
pub struct Handler<S, I> {
    store: S,
    identity: I,
    registry: Registry,
    locks: DashMap<GameId, Arc<Mutex<()>>>,
}

impl<S: Store, I: Identity> Handler<S, I> {
    pub fn new(store: S, identity: I) -> Self {
        Handler {
            store,
            identity,
            registry: Registry::default(),
            locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handles a raw inbound frame, reporting any failure back to the peer.
    #[instrument(level = "debug", skip(self, peer, frame), fields(%peer))]
    pub async fn receive(&self, peer: &Peer, frame: &str) {
        let result = match serde_json::from_str(frame) {
            Ok(req) => self.handle(peer, req).await,
            Err(e) => Err(SessionError::Protocol(e)),
        };

        if let Err(e) = result {
            if e.is_fault() {
                error!(%peer, "{}", e);
                peer.send(Message::error("server error"));
            } else {
                warn!(%peer, "{}", e);
                peer.send(Message::error(e));
            }
        }
    }

    /// Handles a [`Request`] on behalf of a peer.
    #[instrument(level = "debug", skip(self, peer, req), fields(%peer, game = req.game_id), err)]
    pub async fn handle(&self, peer: &Peer, req: Request) -> Result<(), SessionError> {
        let username = match self.identity.resolve(&req.auth_token).await {
            Some(username) => username,
            None => return Err(SessionError::Unauthorized),
        };

        let id = req.game_id;
        let lock = self.locks.entry(id).or_default().clone();

        let result = {
            let _guard = lock.lock().await;
            self.dispatch(peer, &username, id, req.command).await
        };

        drop(lock);
        self.locks.remove_if(&id, |_, l| Arc::strong_count(l) == 1);

        result
    }

    /// Forgets a closed connection.
    ///
    /// Seated players keep their seats, closing a connection is not a resignation.
    #[instrument(level = "debug", skip(self, peer), fields(%peer))]
    pub fn disconnect(&self, peer: &Peer) {
        let games = self.registry.detach_all(peer);
        debug!(?games, "connection closed");
    }

    async fn dispatch(
        &self,
        peer: &Peer,
        username: &str,
        id: GameId,
        command: Command,
    ) -> Result<(), SessionError> {
        let mut record = match self.store.load(id).await? {
            Some(record) => record,
            None => return Err(SessionError::NotFound(id)),
        };

        match command {
            Command::Connect { color } => self.connect(peer, username, &record, color),
            Command::MakeMove { action, color } => {
                self.registry.attach(id, peer.clone());
                self.make_move(peer, username, &mut record, action, color)
                    .await
            }
            Command::Leave { color } => self.leave(peer, username, &mut record, color).await,
            Command::Resign { color } => {
                self.registry.attach(id, peer.clone());
                self.resign(username, &mut record, color).await
            }
        }
    }

    fn connect(
        &self,
        peer: &Peer,
        username: &str,
        record: &GameRecord,
        color: Option<Color>,
    ) -> Result<(), SessionError> {
        if let Some(side) = color {
            if record.seat(side) != Some(username) {
                return Err(RuleViolation::NotSeated(side).into());
            }
        }

        self.registry.attach(record.id(), peer.clone());
        peer.send(Message::load_game(record));

        let note = match color {
            Some(side) => format!("{username} is playing {side}"),
            None => format!("{username} is watching the game"),
        };

        info!(game = record.id(), "{}", note);
        self.registry
            .broadcast(record.id(), Some(peer), &Message::notification(note));

        Ok(())
    }

    async fn make_move(
        &self,
        peer: &Peer,
        username: &str,
        record: &mut GameRecord,
        m: Move,
        color: Option<Color>,
    ) -> Result<(), SessionError> {
        if !record.is_active() {
            return Err(RuleViolation::GameOver.into());
        }

        let turn = record.game().turn();
        let side = color.unwrap_or(turn);

        if side != turn {
            return Err(RuleViolation::NotYourTurn.into());
        }

        if record.seat(side) != Some(username) {
            return Err(RuleViolation::NotSeated(side).into());
        }

        if matches!(record.game().board().color_on(m.whence()), Some(c) if c != side) {
            return Err(RuleViolation::WrongPiece.into());
        }

        if record.game().is_stalemate(side) {
            record.conclude(Outcome::Stalemate)?;
            self.store.save(record).await?;

            let note = format!("{} is in stalemate, the game is a draw", player(record, side));
            info!(game = record.id(), "{}", note);
            self.registry
                .broadcast(record.id(), None, &Message::notification(note));

            return Ok(());
        }

        record.game_mut().play(m)?;

        let opponent = !side;
        let alert = match Outcome::of(record.game()) {
            Some(o @ Outcome::Checkmate(_)) => {
                record.conclude(o)?;
                let note = format!("{} is in checkmate, {username} wins", player(record, opponent));
                info!(game = record.id(), "{}", note);
                Some(note)
            }
            _ if record.game().is_check(opponent) => {
                Some(format!("{} is in check", player(record, opponent)))
            }
            _ => None,
        };

        self.store.save(record).await?;

        let note = format!(
            "{username} made a move from {} to {}",
            m.whence(),
            m.whither()
        );

        peer.send(Message::load_game(record));
        self.registry
            .broadcast(record.id(), Some(peer), &Message::notification(note));
        self.registry
            .broadcast(record.id(), Some(peer), &Message::load_game(record));

        if let Some(alert) = alert {
            self.registry
                .broadcast(record.id(), None, &Message::notification(alert));
        }

        Ok(())
    }

    async fn leave(
        &self,
        peer: &Peer,
        username: &str,
        record: &mut GameRecord,
        color: Option<Color>,
    ) -> Result<(), SessionError> {
        let seats: Vec<_> = record
            .seats_of(username)
            .filter(|&c| color.map_or(true, |side| side == c))
            .collect();

        for &side in &seats {
            record.vacate(side);
        }

        if !seats.is_empty() {
            self.store.save(record).await?;
        }

        let note = if seats.is_empty() {
            format!("{username} left the game and is no longer watching")
        } else {
            let sides: Vec<_> = seats.iter().map(Color::to_string).collect();
            format!("{username} left the game and is no longer playing {}", sides.join(" and "))
        };

        self.registry
            .broadcast(record.id(), Some(peer), &Message::notification(note));
        self.registry.detach(record.id(), peer);

        Ok(())
    }

    async fn resign(
        &self,
        username: &str,
        record: &mut GameRecord,
        color: Option<Color>,
    ) -> Result<(), SessionError> {
        if !record.is_active() {
            return Err(RuleViolation::GameOver.into());
        }

        let seats: Vec<_> = record
            .seats_of(username)
            .filter(|&c| color.map_or(true, |side| side == c))
            .collect();

        let turn = record.game().turn();
        let side = match seats[..] {
            [] => return Err(RuleViolation::CannotResign.into()),
            [side] => side,
            _ => turn,
        };

        record.conclude(Outcome::Resignation(side))?;
        self.store.save(record).await?;

        let note = format!("{username} resigned as {side}, the game is over");
        info!(game = record.id(), "{}", note);
        self.registry
            .broadcast(record.id(), None, &Message::notification(note));

        Ok(())
    }
}

/// Names the player on the given side, by username if seated.
fn player(record: &GameRecord, side: Color) -> String {
    match record.seat(side) {
        Some(username) => format!("{username} ({side})"),
        None => side.to_string(),
    }
}
