use anyhow::Context;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::{
    entities::movie,
    error::AppResult,
    models::{Draft, Movie},
};

/// Data access for the `movies` table.
#[derive(Clone)]
pub struct MovieRepo {
    db: DatabaseConnection,
}

impl MovieRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[cfg(test)]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn list(&self) -> AppResult<Vec<Movie>> {
        movie::Entity::find()
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_movie)
            .collect()
    }

    pub async fn insert(&self, draft: Draft) -> AppResult<Movie> {
        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(draft.title),
            rating: Set(i32::from(draft.rating)),
            image: Set(draft.image),
        }
        .insert(&self.db)
        .await?;

        tracing::debug!(id = model.id, "movie row inserted");
        to_movie(model)
    }
}

fn to_movie(model: movie::Model) -> AppResult<Movie> {
    let rating = u8::try_from(model.rating)
        .with_context(|| format!("movie {} has rating {}", model.id, model.rating))?;
    Ok(Movie { id: i64::from(model.id), title: model.title, rating, image: model.image })
}
