use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use garde::Validate;
use tracing::debug;

use crate::{
    AppState,
    error::{AppError, AppJson, AppPath, AppQuery, AppResult, FieldErrors},
    models::{CreateFilmeDto, FilmeResponse, ListQuery, ReadFilmeDto, UpdateFilmeDto},
    patch::PatchDocument,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/m1", get(list_filmes).post(create_filme))
        .route("/m2", get(list_all_filmes).post(create_filmes))
        .route("/m3", get(list_all_filmes_traced).post(create_filme_from_record))
        .route("/m4", get(list_all_filme_records))
        .route("/{id}", get(get_filme).put(update_filme).patch(patch_filme).delete(delete_filme))
        .with_state(state)
}

pub async fn list_filmes(
    State(state): State<Arc<AppState>>,
    AppQuery(q): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<ReadFilmeDto>>> {
    let (skip, take) = q.resolve(state.config.default_take, state.config.max_take);
    let films = state.store.list(skip, take).await?;
    Ok(Json(films.into_iter().map(ReadFilmeDto::from).collect()))
}

pub async fn get_filme(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<ReadFilmeDto>> {
    let filme = state.store.get(id).await?;
    Ok(Json(filme.into()))
}

pub async fn list_all_filmes(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<FilmeResponse>>> {
    let films = state.store.all().await?;
    Ok(Json(films.into_iter().map(FilmeResponse::from).collect()))
}

pub async fn list_all_filmes_traced(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<FilmeResponse>>> {
    let films = state.store.all().await?;
    for filme in &films {
        debug!(?filme, "filme");
    }
    Ok(Json(films.into_iter().map(FilmeResponse::from).collect()))
}

pub async fn list_all_filme_records(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<FilmeResponse>>> {
    list_all_filmes(State(state)).await
}

pub async fn create_filme(
    State(state): State<Arc<AppState>>,
    AppJson(dto): AppJson<CreateFilmeDto>,
) -> AppResult<impl IntoResponse> {
    dto.validate()?;
    let filme = state.store.create(dto).await?;
    Ok(created(format!("/{}", filme.id), Json(FilmeResponse::from(filme))))
}

pub async fn create_filmes(
    State(state): State<Arc<AppState>>,
    AppJson(dtos): AppJson<Vec<CreateFilmeDto>>,
) -> AppResult<impl IntoResponse> {
    let mut errors = FieldErrors::new();
    for (i, dto) in dtos.iter().enumerate() {
        if let Err(report) = dto.validate() {
            errors.extend_report(&format!("[{i}]"), &report);
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let films = state.store.create_many(dtos).await?;
    let ids = films.iter().map(|f| format!("ids={}", f.id)).collect::<Vec<_>>().join("&");
    let body: Vec<FilmeResponse> = films.into_iter().map(FilmeResponse::from).collect();
    Ok(created(format!("/m3?{ids}"), Json(body)))
}

/// Accepts the full record shape; a client supplied `id` is ignored.
pub async fn create_filme_from_record(
    state: State<Arc<AppState>>,
    body: AppJson<CreateFilmeDto>,
) -> AppResult<impl IntoResponse> {
    create_filme(state, body).await
}

pub async fn update_filme(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
    AppJson(dto): AppJson<UpdateFilmeDto>,
) -> AppResult<StatusCode> {
    dto.validate()?;
    state.store.update(id, dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn patch_filme(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<PatchDocument>,
) -> AppResult<StatusCode> {
    let current = state.store.get(id).await?;

    let mut projection = serde_json::to_value(UpdateFilmeDto::from(&current))
        .map_err(|e| AppError::Internal(e.into()))?;
    patch
        .apply(&mut projection)
        .map_err(|e| FieldErrors::single(e.path(), e.to_string()))?;
    let patched: UpdateFilmeDto = serde_json::from_value(projection)
        .map_err(|e| FieldErrors::single("body", e.to_string()))?;
    patched.validate()?;

    debug!(id, operations = patch.0.len(), "applying patch");
    state.store.write(current, patched).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_filme(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn created(location: String, body: impl IntoResponse) -> impl IntoResponse {
    (StatusCode::CREATED, [(header::LOCATION, location)], body)
}
