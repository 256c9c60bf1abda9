use maud::{DOCTYPE, Markup, html};

use crate::{
    catalog::DELETE_PROMPT,
    models::{Draft, MAX_RATING, Movie},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";
const PLACEHOLDER: &str = "🎬";

pub fn list_page(movies: &[Movie]) -> String {
    page(
        "Movies",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-5xl mx-auto px-6 py-10" {
                    h1 class="text-3xl font-bold text-gray-900" { "Movies" }

                    @if movies.is_empty() {
                        div class="mt-10 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "No movies yet." }
                        }
                    } @else {
                        div class="mt-10 grid gap-6 sm:grid-cols-2 lg:grid-cols-3" {
                            @for movie in movies {
                                (movie_card(movie))
                            }
                        }
                    }

                    form class="mt-10 text-center" method="post" action="/catalog/add" {
                        button class="rounded-md bg-blue-600 px-6 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Add movies" }
                    }
                }
            }
        },
    )
}

/// Create form when `editing` is `None`, update form otherwise.
pub fn form_page(editing: Option<&Movie>, draft: &Draft, notice: Option<&str>) -> String {
    let (heading, submit) =
        if editing.is_some() { ("Update Movie", "Update") } else { ("Add New Movie", "Add Movie") };

    page(
        heading,
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-xl mx-auto px-6 py-10" {
                    form method="post" action="/catalog/cancel" {
                        button class="text-sm text-blue-600 hover:text-blue-800" type="submit" { "← Back to Movies" }
                    }

                    div class="mt-6 bg-white shadow rounded-lg p-8" {
                        h2 class="text-2xl font-bold text-gray-900" { (heading) }

                        @if let Some(notice) = notice {
                            p class="mt-4 rounded-md bg-red-50 px-3 py-2 text-sm text-red-700" role="alert" { (notice) }
                        }

                        form class="mt-6 space-y-6" method="post" action="/catalog/save" enctype="multipart/form-data" {
                            div {
                                label class="block text-sm font-medium text-gray-700" for="title" { "Movie Title" }
                                input class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2" type="text" name="title" id="title" value=(draft.title) placeholder="Enter movie name";
                            }

                            fieldset {
                                legend class="block text-sm font-medium text-gray-700" { "Rating" }
                                div class="mt-2 flex gap-3" {
                                    @for star in 1..=MAX_RATING {
                                        label class="text-2xl text-yellow-500" {
                                            input type="radio" name="rating" value=(star) checked[draft.rating == star];
                                            (star_glyph(star <= draft.rating))
                                        }
                                    }
                                }
                            }

                            div {
                                label class="block text-sm font-medium text-gray-700" for="image" { "Movie Poster" }
                                input class="mt-2 w-full" type="file" name="image" id="image" accept="image/*";
                                @if let Some(image) = &draft.image {
                                    img class="mt-4 max-h-64 rounded" src=(image) alt="Preview";
                                }
                            }

                            div class="flex gap-3" {
                                button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { (submit) }
                                button class="rounded-md border border-gray-300 px-4 py-2 text-gray-700" type="submit" formaction="/catalog/cancel" formenctype="application/x-www-form-urlencoded" { "Cancel" }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn confirm_page(movie: &Movie) -> String {
    let action = format!("/catalog/{}/delete", movie.id);
    page(
        "Delete movie",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-md w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8 text-center" {
                        h1 class="text-xl font-semibold text-gray-900" { (DELETE_PROMPT) }
                        p class="mt-2 text-gray-600" { (movie.title) }
                        form class="mt-6 flex justify-center gap-3" method="post" action=(action) {
                            button class="rounded-md bg-red-600 px-4 py-2 font-semibold text-white" type="submit" name="answer" value="yes" { "OK" }
                            button class="rounded-md border border-gray-300 px-4 py-2 text-gray-700" type="submit" name="answer" value="no" { "Cancel" }
                        }
                    }
                }
            }
        },
    )
}

pub fn error_page(message: &str) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Error" }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

fn movie_card(movie: &Movie) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg overflow-hidden" {
            div class="flex h-64 items-center justify-center bg-gray-100" {
                @if let Some(image) = &movie.image {
                    img class="h-full w-full object-cover" src=(image) alt=(movie.title);
                } @else {
                    span class="text-6xl" { (PLACEHOLDER) }
                }
            }
            div class="p-4" {
                p class="font-semibold text-gray-900" { "Title: " (movie.title) }
                p class="mt-1" {
                    span class="text-sm text-gray-500" { "Rating:" }
                    @for star in 1..=MAX_RATING {
                        span class=(if star <= movie.rating { "text-yellow-500" } else { "text-gray-300" }) {
                            (star_glyph(true))
                        }
                    }
                }
                div class="mt-4 flex gap-2" {
                    form method="post" action=(format!("/catalog/{}/edit", movie.id)) {
                        button class="rounded-md bg-blue-600 px-3 py-1 text-sm text-white" type="submit" { "Update" }
                    }
                    a class="rounded-md bg-red-600 px-3 py-1 text-sm text-white" href=(format!("/catalog/{}/delete", movie.id)) { "Remove" }
                }
            }
        }
    }
}

fn star_glyph(filled: bool) -> &'static str {
    if filled { "★" } else { "☆" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bootstrap_movies;

    #[test]
    fn cards_fall_back_to_placeholder() {
        let movies = vec![Movie { id: 1, title: "Heat".into(), rating: 2, image: None }];
        let html = list_page(&movies);
        assert!(html.contains(PLACEHOLDER));
        assert!(html.contains("Title: Heat"));
        assert_eq!(html.matches("text-yellow-500").count(), 2);
    }

    #[test]
    fn cards_show_poster_when_present() {
        let html = list_page(&bootstrap_movies());
        assert!(html.contains(r#"src="/public/Inception.jpg""#));
        assert!(!html.contains(PLACEHOLDER));
    }

    #[test]
    fn form_heading_follows_target() {
        let draft = Draft::default();
        assert!(form_page(None, &draft, None).contains("Add New Movie"));

        let movie = &bootstrap_movies()[0];
        let html = form_page(Some(movie), &Draft::from_movie(movie), Some("Please select rating"));
        assert!(html.contains("Update Movie"));
        assert!(html.contains("Please select rating"));
        assert!(html.contains(r#"value="Inception""#));
    }

    #[test]
    fn titles_are_escaped() {
        let movies = vec![Movie { id: 5, title: "<script>".into(), rating: 1, image: None }];
        assert!(list_page(&movies).contains("&lt;script&gt;"));
    }
}
