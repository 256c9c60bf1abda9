use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::{
    error::{AppError, AppResult},
    models::{Draft, Movie, MovieId, bootstrap_movies},
    slot::CatalogSlot,
};

pub const DELETE_PROMPT: &str = "Delete this movie?";

/// Synchronous yes/no prompt consulted before a record is removed.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Removal {
    Removed(Movie),
    Declined,
}

/// In-memory catalog mirrored to a durable slot after every mutation.
pub struct CatalogStore<S> {
    slot: S,
    movies: Vec<Movie>,
}

impl<S: CatalogSlot> CatalogStore<S> {
    /// Loads the slot, falling back to the bootstrap catalog when it is
    /// absent or unreadable.
    pub fn hydrate(slot: S) -> Self {
        let movies = match slot.load() {
            Ok(Some(movies)) => {
                let movies = dedup_ids(drop_invalid(movies));
                info!(count = movies.len(), "catalog hydrated from slot");
                movies
            },
            Ok(None) => {
                info!("catalog slot empty, seeding bootstrap movies");
                bootstrap_movies()
            },
            Err(err) => {
                warn!(
                    error = %format!("{err:#}"),
                    "catalog slot unreadable, seeding bootstrap movies"
                );
                bootstrap_movies()
            },
        };
        Self { slot, movies }
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn get(&self, id: MovieId) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id == id)
    }

    #[cfg(test)]
    pub fn slot(&self) -> &S {
        &self.slot
    }

    #[cfg(test)]
    pub fn slot_mut(&mut self) -> &mut S {
        &mut self.slot
    }

    pub fn add(&mut self, draft: Draft) -> AppResult<Movie> {
        let movie = Movie::from_draft(self.next_id()?, draft);
        let mut next = self.movies.clone();
        next.push(movie.clone());
        self.persist(next)?;
        debug!(id = movie.id, title = %movie.title, "movie added");
        Ok(movie)
    }

    pub fn update(&mut self, id: MovieId, draft: Draft) -> AppResult<Movie> {
        let Some(pos) = self.position(id) else {
            warn!(id, "update target missing");
            return Err(AppError::NotFound(id));
        };
        let movie = Movie::from_draft(id, draft);
        let mut next = self.movies.clone();
        next[pos] = movie.clone();
        self.persist(next)?;
        debug!(id, title = %movie.title, "movie updated");
        Ok(movie)
    }

    pub fn remove(&mut self, id: MovieId, confirm: &mut impl Confirm) -> AppResult<Removal> {
        let Some(pos) = self.position(id) else {
            warn!(id, "delete target missing");
            return Err(AppError::NotFound(id));
        };
        if !confirm.confirm(DELETE_PROMPT) {
            debug!(id, "delete declined");
            return Ok(Removal::Declined);
        }
        let mut next = self.movies.clone();
        let removed = next.remove(pos);
        self.persist(next)?;
        debug!(id, "movie removed");
        Ok(Removal::Removed(removed))
    }

    /// Writes `next` to the slot and only then adopts it, so a failed write
    /// leaves the catalog as it was. Empty catalogs are written too.
    fn persist(&mut self, next: Vec<Movie>) -> AppResult<()> {
        self.slot.save(&next)?;
        self.movies = next;
        Ok(())
    }

    fn position(&self, id: MovieId) -> Option<usize> {
        self.movies.iter().position(|m| m.id == id)
    }

    /// Millisecond timestamp, bumped past the largest id in use.
    fn next_id(&self) -> AppResult<MovieId> {
        let now = jiff::Timestamp::now().as_millisecond();
        match self.movies.iter().map(|m| m.id).max() {
            Some(max) if max >= now => {
                max.checked_add(1).ok_or(AppError::InvalidState("no movie ids left"))
            },
            _ => Ok(now),
        }
    }
}

fn drop_invalid(movies: Vec<Movie>) -> Vec<Movie> {
    let before = movies.len();
    let movies: Vec<Movie> =
        movies.into_iter().filter(|m| Draft::from_movie(m).validate().is_ok()).collect();
    if movies.len() != before {
        warn!(dropped = before - movies.len(), "invalid records in catalog slot");
    }
    movies
}

fn dedup_ids(movies: Vec<Movie>) -> Vec<Movie> {
    let mut seen = HashSet::new();
    let before = movies.len();
    let movies: Vec<Movie> = movies.into_iter().filter(|m| seen.insert(m.id)).collect();
    if movies.len() != before {
        warn!(dropped = before - movies.len(), "duplicate ids in catalog slot");
    }
    movies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::MemorySlot;

    fn draft(title: &str, rating: u8) -> Draft {
        Draft { title: title.to_string(), rating, image: None }
    }

    fn seeded() -> CatalogStore<MemorySlot> {
        CatalogStore::hydrate(MemorySlot::new())
    }

    fn ids(store: &CatalogStore<MemorySlot>) -> Vec<MovieId> {
        store.movies().iter().map(|m| m.id).collect()
    }

    #[test]
    fn empty_slot_seeds_bootstrap() {
        let store = seeded();
        assert_eq!(ids(&store), vec![1, 2, 3, 4]);
        assert_eq!(store.slot().writes(), 0);
    }

    #[test]
    fn corrupt_slot_falls_back_to_bootstrap() {
        let store = CatalogStore::hydrate(MemorySlot::with_raw("[{\"id\":"));
        assert_eq!(ids(&store), vec![1, 2, 3, 4]);
    }

    #[test]
    fn hydrate_drops_duplicate_ids() {
        let raw = r#"[{"id":9,"title":"A","rating":1},{"id":9,"title":"B","rating":2}]"#;
        let store = CatalogStore::hydrate(MemorySlot::with_raw(raw));
        assert_eq!(store.movies().len(), 1);
        assert_eq!(store.movies()[0].title, "A");
    }

    #[test]
    fn hydrate_drops_invalid_records() {
        let raw = r#"[{"id":1,"title":"","rating":3},{"id":2,"title":"Heat","rating":0},
            {"id":3,"title":"Alien","rating":9},{"id":4,"title":"Ran","rating":5}]"#;
        let store = CatalogStore::hydrate(MemorySlot::with_raw(raw));
        assert_eq!(ids(&store), vec![4]);
    }

    #[test]
    fn add_refuses_when_ids_run_out() {
        let raw = format!(r#"[{{"id":{},"title":"Last","rating":1}}]"#, i64::MAX);
        let mut store = CatalogStore::hydrate(MemorySlot::with_raw(raw));
        assert_eq!(ids(&store), vec![i64::MAX]);

        assert!(matches!(store.add(draft("Dune", 5)), Err(AppError::InvalidState(_))));
        assert_eq!(store.movies().len(), 1);
        assert_eq!(store.slot().writes(), 0);
    }

    #[test]
    fn add_then_remove_scenario() {
        let mut store = seeded();
        let dune = store.add(draft("Dune", 5)).expect("add");
        assert_eq!(store.movies().len(), 5);
        assert!(![1, 2, 3, 4].contains(&dune.id));
        assert_eq!(store.movies()[4], dune);
        assert_eq!((dune.title.as_str(), dune.rating, dune.image.as_deref()), ("Dune", 5, None));

        let removal = store.remove(2, &mut |_: &str| true).expect("remove");
        assert!(matches!(removal, Removal::Removed(m) if m.id == 2));
        assert_eq!(ids(&store), vec![1, 3, 4, dune.id]);
    }

    #[test]
    fn add_then_remove_restores_previous_catalog() {
        let mut store = seeded();
        let before = store.movies().to_vec();
        let added = store.add(draft("Alien", 4)).expect("add");
        store.remove(added.id, &mut |_: &str| true).expect("remove");
        assert_eq!(store.movies(), before.as_slice());
    }

    #[test]
    fn ids_stay_unique_across_rapid_adds() {
        let mut store = seeded();
        for n in 0..50 {
            store.add(draft(&format!("Movie {n}"), 3)).expect("add");
        }
        let unique: HashSet<_> = ids(&store).into_iter().collect();
        assert_eq!(unique.len(), store.movies().len());
    }

    #[test]
    fn update_preserves_id_and_position_and_is_idempotent() {
        let mut store = seeded();
        let edit = Draft { title: "Tenet".into(), rating: 3, image: Some("data:x".into()) };
        let first = store.update(3, edit.clone()).expect("update");
        let snapshot = store.movies().to_vec();
        let second = store.update(3, edit).expect("update again");

        assert_eq!(first, second);
        assert_eq!(store.movies(), snapshot.as_slice());
        assert_eq!(store.movies()[2].id, 3);
        assert_eq!(store.movies()[2].title, "Tenet");
        assert_eq!(store.movies()[2].image.as_deref(), Some("data:x"));
    }

    #[test]
    fn missing_ids_are_not_found() {
        let mut store = seeded();
        assert!(matches!(store.update(99, draft("X", 1)), Err(AppError::NotFound(99))));

        let mut asked = false;
        let result = store.remove(99, &mut |_: &str| {
            asked = true;
            true
        });
        assert!(matches!(result, Err(AppError::NotFound(99))));
        assert!(!asked);
        assert_eq!(store.slot().writes(), 0);
    }

    #[test]
    fn declined_delete_changes_nothing() {
        let mut store = seeded();
        let mut prompt = String::new();
        let removal = store
            .remove(1, &mut |p: &str| {
                prompt = p.to_string();
                false
            })
            .expect("remove");
        assert_eq!(removal, Removal::Declined);
        assert_eq!(prompt, DELETE_PROMPT);
        assert_eq!(store.movies().len(), 4);
        assert_eq!(store.slot().writes(), 0);
    }

    #[test]
    fn deleting_everything_persists_empty_catalog() {
        let mut store = seeded();
        for id in 1..=4 {
            store.remove(id, &mut |_: &str| true).expect("remove");
        }
        assert_eq!(store.slot().raw(), Some("[]"));

        let slot = store.slot().clone();
        let rehydrated = CatalogStore::hydrate(slot);
        assert!(rehydrated.movies().is_empty());
    }

    #[test]
    fn failed_write_leaves_catalog_untouched() {
        let mut store = seeded();
        store.slot_mut().fail_writes();

        assert!(matches!(store.add(draft("Dune", 5)), Err(AppError::Storage(_))));
        assert!(store.remove(1, &mut |_: &str| true).is_err());
        assert!(store.update(2, draft("Batman", 1)).is_err());
        assert_eq!(store.movies(), bootstrap_movies().as_slice());
    }

    #[test]
    fn every_mutation_is_written_through() {
        let mut store = seeded();
        let dune = store.add(draft("Dune", 5)).expect("add");
        store.update(dune.id, draft("Dune: Part Two", 5)).expect("update");

        let rehydrated = CatalogStore::hydrate(store.slot().clone());
        assert_eq!(rehydrated.movies(), store.movies());
        assert_eq!(store.slot().writes(), 2);
    }
}
