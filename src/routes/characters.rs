use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::RosterRepository;
use crate::error::{AppError, Result};
use crate::models::{Character, CharacterDraft};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListCharactersParams {
    /// Optional exact-match role filter
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListCharactersResponse {
    pub characters: Vec<Character>,
}

#[derive(Debug, Serialize)]
pub struct CreateCharacterResponse {
    pub id: u64,
    pub name: String,
    pub role: String,
    pub level: i32,
}

#[derive(Debug, Serialize)]
pub struct DeleteCharacterResponse {
    pub deleted: bool,
}

/// List characters, optionally filtered by role
pub async fn list_characters(
    State(state): State<AppState>,
    Query(params): Query<ListCharactersParams>,
) -> Result<Json<ListCharactersResponse>> {
    let repo = RosterRepository::new(state.db.clone());

    let characters = match params.role {
        Some(ref role) => repo.characters_by_role(role).await?,
        None => repo.all_characters().await?,
    };

    Ok(Json(ListCharactersResponse { characters }))
}

/// Create a new character owned by the configured account
///
/// The character consumes one of the account's slots; creation fails with
/// 409 when the account has no slots remaining or the name is already taken,
/// and with 404 when the owning account row is missing.
pub async fn create_character(
    State(state): State<AppState>,
    Json(draft): Json<CharacterDraft>,
) -> Result<(StatusCode, Json<CreateCharacterResponse>)> {
    let repo = RosterRepository::new(state.db.clone());

    let name = draft.name.clone();
    let role = draft.role.clone();
    let level = draft.level;

    let id = repo
        .create_character(&state.config.seed_account, draft)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCharacterResponse {
            id,
            name,
            role,
            level,
        }),
    ))
}

/// Fetch a single character by id
pub async fn get_character(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Character>> {
    let repo = RosterRepository::new(state.db.clone());
    let character = repo.character_by_id(id).await?;

    Ok(Json(character))
}

/// Replace a character's name, role and level
///
/// Returns 404 when no character matches the id. The owning account's
/// slot count is never touched by an update.
pub async fn update_character(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(draft): Json<CharacterDraft>,
) -> Result<Json<Character>> {
    let repo = RosterRepository::new(state.db.clone());

    let affected = repo.update_character(id, draft).await?;
    if affected == 0 {
        return Err(AppError::CharacterNotFound);
    }

    let character = repo.character_by_id(id).await?;
    Ok(Json(character))
}

/// Delete a character by id, restoring a slot to the owning account
///
/// Deleting an unknown id is not an error; the response reports
/// `deleted: false` and nothing changes.
pub async fn delete_character(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteCharacterResponse>> {
    let repo = RosterRepository::new(state.db.clone());

    let removed = repo
        .delete_character(&state.config.seed_account, id)
        .await?;

    Ok(Json(DeleteCharacterResponse {
        deleted: removed == 1,
    }))
}
