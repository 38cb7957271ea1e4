use crate::session::{GameId, GameRecord};
use async_trait::async_trait;
use dashmap::DashMap;
use derive_more::{Display, Error};
use tracing::instrument;

/// The reason why the [`Store`] could not be accessed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "storage failure: {}", _0)]
pub struct StoreError(#[error(not(source))] pub String);

/// Where [`GameRecord`]s are kept.
///
/// Each operation is atomic at the granularity of a single record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    /// Loads the record of a game, if it exists.
    async fn load(&self, id: GameId) -> Result<Option<GameRecord>, StoreError>;

    /// Saves a record, replacing any previous version.
    async fn save(&self, record: &GameRecord) -> Result<(), StoreError>;
}

/// A [`Store`] kept in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<GameId, GameRecord>,
}

impl MemoryStore {
    pub fn new(records: impl IntoIterator<Item = GameRecord>) -> Self {
        MemoryStore {
            records: records.into_iter().map(|r| (r.id(), r)).collect(),
        }
    }

    /// The number of records kept.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    #[instrument(level = "trace", skip(self), err)]
    async fn load(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        Ok(self.records.get(&id).map(|r| r.clone()))
    }

    #[instrument(level = "trace", skip(self, record), fields(id = record.id()), err)]
    async fn save(&self, record: &GameRecord) -> Result<(), StoreError> {
        self.records.insert(record.id(), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{Color, Outcome};
    use tokio::runtime;

    #[test]
    fn load_returns_none_for_unknown_game() -> Result<(), Box<dyn std::error::Error>> {
        let rt = runtime::Builder::new_current_thread().build()?;
        let store = MemoryStore::default();
        assert_eq!(rt.block_on(store.load(1))?, None);
        Ok(())
    }

    #[test]
    fn load_returns_the_last_saved_version() -> Result<(), Box<dyn std::error::Error>> {
        let rt = runtime::Builder::new_current_thread().build()?;
        let store = MemoryStore::new([GameRecord::new(1, "casual")]);

        let mut record = GameRecord::new(1, "casual").with_seat(Color::White, "alice");
        record.conclude(Outcome::Resignation(Color::White))?;
        rt.block_on(store.save(&record))?;

        assert_eq!(rt.block_on(store.load(1))?, Some(record));
        assert_eq!(store.len(), 1);
        Ok(())
    }
}
