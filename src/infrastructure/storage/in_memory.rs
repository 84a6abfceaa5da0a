use crate::core::errors::SplitxError;
use crate::core::models::{
    expense::Expense, group::Group, settlement_record::SettlementRecord, transaction::Transaction,
};
use crate::infrastructure::storage::{GroupUpdate, Storage};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Insertion-ordered maps so listings keep recording order.
///
/// Locks are always taken in field order (groups first) so a cascading
/// delete cannot interleave with a write that checks its group.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    groups: Arc<RwLock<IndexMap<String, Group>>>,
    expenses: Arc<RwLock<IndexMap<String, Expense>>>,
    transactions: Arc<RwLock<IndexMap<String, Transaction>>>,
    settlement_records: Arc<RwLock<IndexMap<String, SettlementRecord>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }
}

fn require_group(groups: &IndexMap<String, Group>, group_id: &str) -> Result<(), SplitxError> {
    if groups.contains_key(group_id) {
        Ok(())
    } else {
        Err(SplitxError::GroupNotFound(group_id.to_string()))
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_group(&self, group: Group) -> Result<(), SplitxError> {
        let mut groups = self.groups.write().await;
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, SplitxError> {
        let groups = self.groups.read().await;
        Ok(groups.get(group_id).cloned())
    }

    async fn update_group(&self, group_id: &str, update: GroupUpdate) -> Result<Group, SplitxError> {
        let mut groups = self.groups.write().await;
        let stored = groups
            .get_mut(group_id)
            .ok_or_else(|| SplitxError::GroupNotFound(group_id.to_string()))?;
        // edit a copy so a failed update leaves the stored group as it was
        let mut group = stored.clone();
        update(&mut group)?;
        *stored = group.clone();
        Ok(group)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, SplitxError> {
        let groups = self.groups.read().await;
        Ok(groups.values().cloned().collect())
    }

    async fn delete_group(&self, group_id: &str) -> Result<(), SplitxError> {
        let mut groups = self.groups.write().await;
        let mut expenses = self.expenses.write().await;
        let mut transactions = self.transactions.write().await;
        let mut records = self.settlement_records.write().await;
        groups.shift_remove(group_id);
        expenses.retain(|_, e| e.group_id != group_id);
        transactions.retain(|_, t| t.group_id != group_id);
        records.retain(|_, r| r.group_id != group_id);
        Ok(())
    }

    async fn save_expense(&self, expense: Expense) -> Result<(), SplitxError> {
        let groups = self.groups.read().await;
        require_group(&groups, &expense.group_id)?;
        let mut expenses = self.expenses.write().await;
        expenses.insert(expense.id.clone(), expense);
        Ok(())
    }

    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, SplitxError> {
        let expenses = self.expenses.read().await;
        Ok(expenses.get(expense_id).cloned())
    }

    async fn delete_expense(&self, expense_id: &str) -> Result<(), SplitxError> {
        let mut expenses = self.expenses.write().await;
        expenses.shift_remove(expense_id);
        Ok(())
    }

    async fn get_expenses(&self, group_id: &str) -> Result<Vec<Expense>, SplitxError> {
        let expenses = self.expenses.read().await;
        Ok(expenses.values().filter(|e| e.group_id == group_id).cloned().collect())
    }

    async fn save_transaction(&self, transaction: Transaction) -> Result<(), SplitxError> {
        let groups = self.groups.read().await;
        require_group(&groups, &transaction.group_id)?;
        let mut transactions = self.transactions.write().await;
        transactions.insert(transaction.id.clone(), transaction);
        Ok(())
    }

    async fn get_transactions(&self, group_id: &str) -> Result<Vec<Transaction>, SplitxError> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .values()
            .filter(|t| t.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn save_settlement_record(&self, record: SettlementRecord) -> Result<(), SplitxError> {
        let groups = self.groups.read().await;
        require_group(&groups, &record.group_id)?;
        let mut records = self.settlement_records.write().await;
        records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn get_settlement_record(&self, record_id: &str) -> Result<Option<SettlementRecord>, SplitxError> {
        let records = self.settlement_records.read().await;
        Ok(records.get(record_id).cloned())
    }

    async fn get_settlement_records(&self, group_id: &str) -> Result<Vec<SettlementRecord>, SplitxError> {
        let records = self.settlement_records.read().await;
        Ok(records.values().filter(|r| r.group_id == group_id).cloned().collect())
    }

    async fn settle_record(
        &self,
        record_id: &str,
        transaction: Transaction,
    ) -> Result<SettlementRecord, SplitxError> {
        let groups = self.groups.read().await;
        let mut transactions = self.transactions.write().await;
        let mut records = self.settlement_records.write().await;

        let record = records
            .get_mut(record_id)
            .ok_or_else(|| SplitxError::SettlementRecordNotFound(record_id.to_string()))?;
        require_group(&groups, &record.group_id)?;
        if record.settled {
            return Err(SplitxError::SettlementAlreadyConfirmed(record_id.to_string()));
        }

        record.settled = true;
        record.transaction_id = Some(transaction.id.clone());
        record.settled_at = Some(transaction.date);
        let settled = record.clone();
        transactions.insert(transaction.id.clone(), transaction);
        Ok(settled)
    }
}
