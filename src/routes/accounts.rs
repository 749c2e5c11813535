use axum::{extract::State, Json};
use serde::Serialize;

use crate::db::RosterRepository;
use crate::error::Result;
use crate::models::Account;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ListAccountsResponse {
    pub accounts: Vec<Account>,
}

/// List all accounts with their remaining character slots
pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<ListAccountsResponse>> {
    let repo = RosterRepository::new(state.db.clone());
    let accounts = repo.all_accounts().await?;

    Ok(Json(ListAccountsResponse { accounts }))
}
