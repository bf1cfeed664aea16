//! Rider account routes.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use cycleon_core::validation::validate_top_up;
use cycleon_core::{Account, CoreError, Money, RideRecord, ValidationError};
use cycleon_db::DbError;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::ApiJson;
use crate::AppState;

/// An account together with its ride ledger.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(flatten)]
    pub account: Account,
    pub ride_history: Vec<RideRecord>,
}

/// `GET /api/auth` - the caller's account, active ride and history.
pub async fn current_user(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserView>, ApiError> {
    let account = state
        .db
        .accounts()
        .get(&user.user_id)
        .await?
        .ok_or_else(|| CoreError::AccountNotFound(user.user_id.clone()))?;
    let ride_history = state.db.ride_history().list_for_user(&user.user_id).await?;

    Ok(Json(UserView {
        account,
        ride_history,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBalanceRequest {
    #[serde(default)]
    pub value_to_add: Value,
}

/// Accepts `10`, `10.5` or `"10.50"`.
fn parse_top_up(value: &Value) -> Result<Money, ValidationError> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Null => {
            return Err(ValidationError::Required {
                field: "valueToAdd".to_string(),
            })
        }
        _ => String::new(),
    };

    let amount = Money::parse_units(&text).map_err(|e| match e {
        ValidationError::InvalidFormat { reason, .. } => ValidationError::InvalidFormat {
            field: "valueToAdd".to_string(),
            reason,
        },
        other => other,
    })?;
    validate_top_up(amount)?;
    Ok(amount)
}

/// `PUT /api/users/addBalance` - atomic increment of the caller's balance.
pub async fn add_balance(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddBalanceRequest>,
) -> Result<Json<Account>, ApiError> {
    let amount = parse_top_up(&request.value_to_add)?;

    let account = state
        .db
        .accounts()
        .top_up(&user.user_id, amount)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => ApiError::Rule(CoreError::AccountNotFound(user.user_id.clone())),
            DbError::BalanceOutOfRange { .. } => ApiError::Rule(CoreError::BalanceLimitExceeded),
            other => other.into(),
        })?;

    info!(user_id = %user.user_id, amount = %amount, balance = %account.balance(), "Balance topped up");
    Ok(Json(account))
}
