use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    catalog::Removal,
    controller::Mode,
    error::{AppError, AppResult, PageError},
    models::{Draft, Movie, MovieId},
    templates,
};

pub fn router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    Router::new()
        .route("/", get(index))
        .route("/catalog/add", post(open_add))
        .route("/catalog/{id}/edit", post(open_edit))
        .route("/catalog/save", post(save))
        .route("/catalog/cancel", post(cancel))
        .route("/catalog/{id}/delete", get(confirm_delete).post(delete))
        .route("/movies", get(list_movies).post(create_movie))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let catalog = state.catalog.lock().await;
    let body = match catalog.mode() {
        Mode::Browsing => templates::list_page(catalog.store().movies()),
        Mode::Editing(target) => templates::form_page(target.as_ref(), catalog.draft(), None),
    };
    Html(body)
}

pub async fn open_add(State(state): State<Arc<AppState>>) -> Redirect {
    state.catalog.lock().await.open_add();
    Redirect::to("/")
}

pub async fn open_edit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<MovieId>,
) -> Result<Redirect, PageError> {
    state.catalog.lock().await.open_edit(id)?;
    Ok(Redirect::to("/"))
}

/// Applies the submitted form fields to the draft, then saves. Validation
/// and decode failures re-render the form with the message. Nothing is
/// applied unless a form is open.
pub async fn save(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, PageError> {
    let mut catalog = state.catalog.lock().await;
    if catalog.mode() == &Mode::Browsing {
        return Err(AppError::InvalidState("no movie is being edited").into());
    }

    while let Some(field) = multipart.next_field().await.map_err(AppError::from)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => {
                let title = field.text().await.map_err(AppError::from)?;
                catalog.set_title(title);
            },
            "rating" => {
                let raw = field.text().await.map_err(AppError::from)?;
                catalog.set_rating(raw.trim().parse().unwrap_or(0));
            },
            "image" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(AppError::from)?;
                if !bytes.is_empty() {
                    catalog.attach_image(bytes.to_vec(), content_type);
                }
            },
            _ => {},
        }
    }

    match catalog.save().await {
        Ok(movie) => {
            tracing::info!(id = movie.id, title = %movie.title, "catalog entry saved");
            Ok(Redirect::to("/").into_response())
        },
        Err(err @ (AppError::Validation(_) | AppError::Decode(_))) => {
            let Mode::Editing(target) = catalog.mode() else {
                return Err(err.into());
            };
            let notice = err.to_string();
            let body =
                templates::form_page(target.as_ref(), catalog.draft(), Some(notice.as_str()));
            Ok((err.status(), Html(body)).into_response())
        },
        Err(err) => Err(err.into()),
    }
}

pub async fn cancel(State(state): State<Arc<AppState>>) -> Redirect {
    state.catalog.lock().await.cancel();
    Redirect::to("/")
}

pub async fn confirm_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<MovieId>,
) -> Result<Html<String>, PageError> {
    let catalog = state.catalog.lock().await;
    let movie = catalog.store().get(id).ok_or(AppError::NotFound(id))?;
    Ok(Html(templates::confirm_page(movie)))
}

#[derive(Debug, Deserialize)]
pub struct DeleteAnswer {
    answer: String,
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<MovieId>,
    Form(form): Form<DeleteAnswer>,
) -> Result<Redirect, PageError> {
    let accepted = form.answer.eq_ignore_ascii_case("yes");
    let removal = state.catalog.lock().await.delete(id, &mut |_: &str| accepted)?;
    if let Removal::Removed(movie) = removal {
        tracing::info!(id = movie.id, title = %movie.title, "catalog entry removed");
    }
    Ok(Redirect::to("/"))
}

pub async fn list_movies(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Movie>>> {
    let movies = state.movies.list().await?;
    tracing::debug!(count = movies.len(), "listed movies");
    Ok(Json(movies))
}

/// A movie body sent either as JSON or as an urlencoded form.
pub struct MovieBody(pub Draft);

impl<S: Send + Sync> FromRequest<S> for MovieBody {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));
        if is_form {
            let Form(draft) = Form::<Draft>::from_request(req, state).await?;
            Ok(Self(draft))
        } else {
            let Json(draft) = Json::<Draft>::from_request(req, state).await?;
            Ok(Self(draft))
        }
    }
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    MovieBody(draft): MovieBody,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let movie = state.movies.insert(draft.normalized()?).await?;
    tracing::info!(id = movie.id, title = %movie.title, "movie created");
    Ok((StatusCode::CREATED, Json(movie)))
}
