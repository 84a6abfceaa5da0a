use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Ordered identity -> signed balance. Positive is owed, negative owes.
pub type BalanceMap = IndexMap<String, Decimal>;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SettlementTransfer {
    pub from: String,
    pub to: String,
    /// Exact decimal, serialized as a JSON string.
    #[schema(value_type = String, example = "30")]
    pub amount: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SettlementStep {
    pub action: String,
    /// Creditor and debtor balances before the transfer, as decimal strings.
    #[schema(value_type = Object)]
    pub before: BalanceMap,
    #[schema(value_type = Object)]
    pub after: BalanceMap,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResult {
    /// Net balance per member as a decimal string; positive is owed.
    #[schema(value_type = Object, example = json!({"A": "60", "B": "-30", "C": "-30"}))]
    pub final_balances: BalanceMap,
    pub settlements: Vec<SettlementTransfer>,
    pub settlement_steps: Vec<SettlementStep>,
}

impl SettlementResult {
    pub fn balance_of(&self, member: &str) -> Decimal {
        self.final_balances.get(member).copied().unwrap_or(Decimal::ZERO)
    }
}
