use crate::core::errors::SplitxError;
use crate::core::models::{
    expense::Expense, group::Group, settlement_record::SettlementRecord, transaction::Transaction,
};
use async_trait::async_trait;

/// In-place edit applied to a stored group while the store holds it locked.
pub type GroupUpdate = Box<dyn FnOnce(&mut Group) -> Result<(), SplitxError> + Send>;

/// What a persistence layer has to provide for the ledger and the settlement engine.
///
/// Listings come back in recording order; the engine's output order depends on it.
/// Records that belong to a group are only stored while that group exists.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_group(&self, group: Group) -> Result<(), SplitxError>;
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, SplitxError>;
    /// Applies `update` atomically and returns the stored result.
    ///
    /// Fails with `GroupNotFound` when the group does not exist, and leaves the
    /// group untouched when `update` returns an error.
    async fn update_group(&self, group_id: &str, update: GroupUpdate) -> Result<Group, SplitxError>;
    async fn list_groups(&self) -> Result<Vec<Group>, SplitxError>;
    /// Removes the group together with its expenses, transactions and settlement records.
    async fn delete_group(&self, group_id: &str) -> Result<(), SplitxError>;
    async fn save_expense(&self, expense: Expense) -> Result<(), SplitxError>;
    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, SplitxError>;
    async fn delete_expense(&self, expense_id: &str) -> Result<(), SplitxError>;
    async fn get_expenses(&self, group_id: &str) -> Result<Vec<Expense>, SplitxError>;
    async fn save_transaction(&self, transaction: Transaction) -> Result<(), SplitxError>;
    async fn get_transactions(&self, group_id: &str) -> Result<Vec<Transaction>, SplitxError>;
    async fn save_settlement_record(&self, record: SettlementRecord) -> Result<(), SplitxError>;
    async fn get_settlement_record(&self, record_id: &str) -> Result<Option<SettlementRecord>, SplitxError>;
    async fn get_settlement_records(&self, group_id: &str) -> Result<Vec<SettlementRecord>, SplitxError>;
    /// Marks a pending record settled and books `transaction` in the same step.
    ///
    /// Fails with `SettlementAlreadyConfirmed` if the record was settled already.
    async fn settle_record(
        &self,
        record_id: &str,
        transaction: Transaction,
    ) -> Result<SettlementRecord, SplitxError>;
}

pub mod in_memory;
