use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Expense {
    pub id: String,
    pub group_id: String,
    /// Exact decimal, serialized as a JSON string.
    #[schema(value_type = String, example = "90.00")]
    pub amount: Decimal,
    pub paid_by: String,
    pub description: Option<String>,
    /// Members the expense is shared between, captured when it was recorded.
    /// Empty for expenses that follow the group's live membership.
    #[serde(default)]
    pub split_between: Vec<String>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub date: DateTime<Utc>,
}
