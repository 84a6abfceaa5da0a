use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Money that already moved directly between two members.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: String,
    pub group_id: String,
    pub payer: String,
    pub receiver: String,
    /// Exact decimal, serialized as a JSON string.
    #[schema(value_type = String, example = "30.00")]
    pub amount: Decimal,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub date: DateTime<Utc>,
}
