use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A repayment one member owes another, tracked until the receiver marks it settled.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SettlementRecord {
    pub id: String,
    pub group_id: String,
    /// Member paying the debt off.
    pub from: String,
    /// Member being repaid.
    pub to: String,
    /// Exact decimal, serialized as a JSON string.
    #[schema(value_type = String, example = "30.00")]
    pub amount: Decimal,
    pub settled: bool,
    /// Netting transaction booked when the record was settled.
    pub transaction_id: Option<String>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Option<String>, example = "2024-06-02T08:00:00Z")]
    pub settled_at: Option<DateTime<Utc>>,
}
