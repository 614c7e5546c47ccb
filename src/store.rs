//! The single source of truth for the journal's catches.

use std::collections::HashSet;

use log::{debug, info};

use crate::{
    id::{IdGenerator, IdScheme},
    intake::ValidatedCatchInput,
    models::{seed_catches, CatchId, CatchRecord},
    storage::{CatchRepository, Storage},
};

/// Gets told about the full collection after every mutation.
pub trait CatchObserver {
    fn catches_changed(&mut self, catches: &[CatchRecord]);
}

pub struct CatchStore {
    catches: Vec<CatchRecord>,
    ids: Box<dyn IdGenerator + Send>,
    observers: Vec<Box<dyn CatchObserver + Send>>,
}

impl std::fmt::Debug for CatchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatchStore")
            .field("catches", &self.catches)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl CatchStore {
    /// A store holding `catches` as is, newest first, without observers.
    pub fn new(catches: Vec<CatchRecord>, ids: Box<dyn IdGenerator + Send>) -> Self {
        Self {
            catches,
            ids,
            observers: Vec::new(),
        }
    }

    /// Load the stored collection or fall back to the seed catches, then keep
    /// `repository` up to date with every change.
    pub fn initialize<S>(repository: CatchRepository<S>, scheme: IdScheme) -> Self
    where
        S: Storage + Send + 'static,
    {
        let catches = match repository.load() {
            Some(catches) => {
                info!("Loaded {} stored catches", catches.len());
                catches
            }
            None => {
                info!("Starting from the example catches");
                seed_catches()
            }
        };

        let ids = scheme.generator(&catches);
        let mut store = Self::new(catches, ids);
        store.observe(repository);
        store
    }

    pub fn observe(&mut self, observer: impl CatchObserver + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn add(&mut self, draft: ValidatedCatchInput) -> CatchRecord {
        let existing: HashSet<&CatchId> = self.catches.iter().map(|c| &c.id).collect();
        let id = loop {
            let id = self.ids.next_id();
            if !existing.contains(&id) {
                break id;
            }
            debug!("Generated id {id} is taken, drawing another");
        };

        let record = draft.into_record(id);
        info!("Logged {record}");

        self.catches.insert(0, record.clone());
        self.notify();

        record
    }

    /// Remove the catch with `id`. Returns whether one was removed.
    pub fn remove(&mut self, id: &CatchId) -> bool {
        let before = self.catches.len();
        self.catches.retain(|c| &c.id != id);
        let removed = self.catches.len() != before;

        if removed {
            info!("Removed catch {id}");
        } else {
            debug!("No catch {id} to remove");
        }

        self.notify();
        removed
    }

    pub fn list(&self) -> Vec<CatchRecord> {
        self.catches.clone()
    }

    pub fn catches(&self) -> &[CatchRecord] {
        &self.catches
    }

    pub fn get(&self, id: &CatchId) -> Option<&CatchRecord> {
        self.catches.iter().find(|c| &c.id == id)
    }

    fn notify(&mut self) {
        for observer in &mut self.observers {
            observer.catches_changed(&self.catches);
        }
    }
}
