use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    catalog::{CatalogStore, Confirm, Removal},
    error::{AppError, AppResult},
    image,
    models::{Draft, Movie, MovieId},
    slot::CatalogSlot,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    Browsing,
    /// `None` while creating, the record being changed while updating.
    Editing(Option<Movie>),
}

/// Routes catalog intents to the store and tracks which view is showing.
pub struct Controller<S> {
    store: CatalogStore<S>,
    mode: Mode,
    draft: Draft,
    decoding: Option<JoinHandle<AppResult<String>>>,
}

impl<S: CatalogSlot> Controller<S> {
    pub fn new(store: CatalogStore<S>) -> Self {
        Self { store, mode: Mode::Browsing, draft: Draft::default(), decoding: None }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn store(&self) -> &CatalogStore<S> {
        &self.store
    }

    pub fn open_add(&mut self) {
        self.abort_decode();
        self.draft = Draft::default();
        self.mode = Mode::Editing(None);
    }

    pub fn open_edit(&mut self, id: MovieId) -> AppResult<()> {
        let movie = self.store.get(id).cloned().ok_or(AppError::NotFound(id))?;
        self.abort_decode();
        self.draft = Draft::from_movie(&movie);
        self.mode = Mode::Editing(Some(movie));
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_rating(&mut self, rating: u8) {
        self.draft.rating = rating;
    }

    /// Starts decoding a poster in the background. Only the most recent
    /// attachment is kept.
    pub fn attach_image(&mut self, bytes: Vec<u8>, content_type: impl Into<String>) {
        self.abort_decode();
        self.decoding = Some(tokio::spawn(image::decode(bytes, content_type.into())));
    }

    #[cfg(test)]
    pub fn is_decoding(&self) -> bool {
        self.decoding.is_some()
    }

    /// Waits for the pending decode, if any. On failure the draft keeps its
    /// previous image.
    pub async fn settle_image(&mut self) -> AppResult<()> {
        let Some(handle) = self.decoding.take() else {
            return Ok(());
        };
        let url = handle.await.map_err(|err| AppError::Decode(err.to_string()))??;
        self.draft.image = Some(url);
        Ok(())
    }

    pub async fn save(&mut self) -> AppResult<Movie> {
        let Mode::Editing(target) = &self.mode else {
            return Err(AppError::InvalidState("no movie is being edited"));
        };
        let target = target.as_ref().map(|m| m.id);

        self.settle_image().await?;
        let draft = self.draft.normalized()?;

        let movie = match target {
            Some(id) => self.store.update(id, draft)?,
            None => self.store.add(draft)?,
        };
        debug!(id = movie.id, "draft saved");
        self.close();
        Ok(movie)
    }

    pub fn cancel(&mut self) {
        self.abort_decode();
        self.close();
    }

    pub fn delete(&mut self, id: MovieId, confirm: &mut impl Confirm) -> AppResult<Removal> {
        if self.mode != Mode::Browsing {
            return Err(AppError::InvalidState("finish editing before deleting"));
        }
        self.store.remove(id, confirm)
    }

    fn close(&mut self) {
        self.draft = Draft::default();
        self.mode = Mode::Browsing;
    }

    fn abort_decode(&mut self) {
        if let Some(handle) = self.decoding.take() {
            warn!("discarding pending image decode");
            handle.abort();
        }
    }
}
