use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::errors::SplitxError;

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct MembershipRequest {
    pub member_name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AddExpenseRequest {
    /// Accepted as a JSON number or a decimal string.
    #[schema(value_type = f64, example = 90.0)]
    pub amount: Decimal,
    pub paid_by: String,
    pub description: Option<String>,
    pub split_between: Option<Vec<String>>,
}

/// `from` / `to` are accepted as aliases of `payer` / `receiver`.
#[derive(Deserialize, ToSchema)]
pub struct AddTransactionRequest {
    #[serde(alias = "from")]
    pub payer: String,
    #[serde(alias = "to")]
    pub receiver: String,
    /// Accepted as a JSON number or a decimal string.
    #[schema(value_type = f64, example = 30.0)]
    pub amount: Decimal,
}

/// `payer` / `receiver` are accepted as aliases of `from` / `to`.
#[derive(Deserialize, ToSchema)]
pub struct RecordSettlementRequest {
    #[serde(alias = "payer")]
    pub from: String,
    #[serde(alias = "receiver")]
    pub to: String,
    /// Accepted as a JSON number or a decimal string.
    #[schema(value_type = f64, example = 30.0)]
    pub amount: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// JSON body extractor whose rejections use the `{"error": ...}` shape.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ValidJson(value))
    }
}

pub enum ApiError {
    Service(SplitxError),
    Body(JsonRejection),
}

impl From<SplitxError> for ApiError {
    fn from(err: SplitxError) -> Self {
        ApiError::Service(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            ApiError::Body(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::Service(err) => service_error(err),
        };
        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}

fn service_error(err: SplitxError) -> (StatusCode, String) {
    match err {
        SplitxError::GroupNotFound(id) => (StatusCode::NOT_FOUND, format!("Group {} not found", id)),
        SplitxError::ExpenseNotFound(id) => (StatusCode::NOT_FOUND, format!("Expense {} not found", id)),
        SplitxError::SettlementRecordNotFound(id) => {
            (StatusCode::NOT_FOUND, format!("Settlement record {} not found", id))
        }
        SplitxError::SettlementAlreadyConfirmed(id) => {
            (StatusCode::CONFLICT, format!("Settlement record {} is already settled", id))
        }
        SplitxError::MemberNotFound(name) => {
            (StatusCode::NOT_FOUND, format!("Member {} not found in this group", name))
        }
        SplitxError::DuplicateMember(name) => {
            (StatusCode::CONFLICT, format!("Member {} is already in this group", name))
        }
        SplitxError::NoActiveMembers => (StatusCode::BAD_REQUEST, "No active members in this group".to_string()),
        SplitxError::InvalidInput(field, detail) => (
            StatusCode::BAD_REQUEST,
            format!("Invalid input for {}: {}", field, detail.description),
        ),
        SplitxError::ComputationError(msg) => {
            log::error!("Settlement computation failed: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Settlement could not be computed".to_string(),
            )
        }
        SplitxError::StorageError(msg) | SplitxError::LoggingError(msg) | SplitxError::CacheError(msg) => {
            log::error!("Internal failure: {}", msg);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
        }
    }
}
