use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Redirect},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::client::IMAGE_FIELD;
use crate::controller::FormController;
use crate::preview::decode_data_url;
use crate::render::{render_page, View};
use crate::state::SelectedFile;

#[derive(Clone)]
pub struct AppState {
    pub controller: FormController,
}

pub fn router(controller: FormController, max_upload_bytes: usize) -> Router {
    let state = Arc::new(AppState { controller });

    Router::new()
        .route("/", get(index))
        .route("/view", get(current_view))
        .route("/preview", get(preview_image))
        .route("/select", post(select_image))
        .route("/submit", post(submit))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.controller.with_view(render_page))
}

async fn current_view(State(state): State<Arc<AppState>>) -> Json<View> {
    Json(state.controller.view())
}

async fn preview_image(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, StatusCode> {
    let (mime, bytes) = state
        .controller
        .with_view(|view| view.preview.as_deref().and_then(decode_data_url))
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok((
        [
            (header::CONTENT_TYPE, mime),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        bytes,
    ))
}

async fn select_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Redirect, (StatusCode, String)> {
    let mut selected = None;

    while let Some(field) = multipart.next_field().await.map_err(reject)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        // Browsers send an empty part with no file name when nothing is chosen.
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_owned);
        let data = field.bytes().await.map_err(reject)?;

        if !name.is_empty() {
            selected = Some(SelectedFile::new(name, content_type, data));
        }
        break;
    }

    state.controller.select_file(selected).await;
    Ok(Redirect::to("/"))
}

async fn submit(State(state): State<Arc<AppState>>) -> Redirect {
    state.controller.submit().await;
    Redirect::to("/")
}

fn reject(err: MultipartError) -> (StatusCode, String) {
    tracing::warn!("rejecting upload: {err}");
    (err.status(), err.body_text())
}
