use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, AppResult};

pub type MovieId = i64;

pub const MAX_RATING: u8 = 5;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub rating: u8,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub image: Option<String>,
}

impl Movie {
    pub fn from_draft(id: MovieId, draft: Draft) -> Self {
        Self { id, title: draft.title, rating: draft.rating, image: draft.image }
    }
}

/// Unsaved form content for a movie being created or edited.
///
/// A `rating` of `0` means "not yet rated" and never reaches storage.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct Draft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub rating: u8,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub image: Option<String>,
}

impl Draft {
    pub fn from_movie(movie: &Movie) -> Self {
        Self { title: movie.title.clone(), rating: movie.rating, image: movie.image.clone() }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Please enter movie title".to_string()));
        }
        if self.rating == 0 {
            return Err(AppError::Validation("Please select rating".to_string()));
        }
        if self.rating > MAX_RATING {
            return Err(AppError::Validation(format!(
                "Rating must be between 1 and {MAX_RATING}"
            )));
        }
        Ok(())
    }

    /// Validated copy with surrounding whitespace stripped from the title.
    pub fn normalized(&self) -> AppResult<Self> {
        self.validate()?;
        Ok(Self { title: self.title.trim().to_string(), ..self.clone() })
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Catalog used when the durable slot has nothing usable.
pub fn bootstrap_movies() -> Vec<Movie> {
    [
        (1, "Inception", 5, "/public/Inception.jpg"),
        (2, "The Dark Knight", 5, "/public/darkKnight.jpg"),
        (3, "Interstellar", 4, "/public/Interstaller.jpg"),
        (4, "Avengers Endgame", 4, "/public/Endgame.jpg"),
    ]
    .into_iter()
    .map(|(id, title, rating, image)| Movie {
        id,
        title: title.to_string(),
        rating,
        image: Some(image.to_string()),
    })
    .collect()
}
