use crate::constants::{
    EXPENSE_ADDED, EXPENSE_DELETED, GROUP_CREATED, GROUP_DELETED, MAX_AMOUNT, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
    MEMBER_JOINED, MEMBER_LEFT, SETTLEMENT_CONFIRMED, SETTLEMENT_QUERIED, SETTLEMENT_RECORDED, TRANSACTION_ADDED,
};
use crate::core::engine::SettlementEngine;
use crate::core::errors::SplitxError;
use crate::core::models::{
    audit::AppLog,
    expense::Expense,
    group::{Group, Member},
    settlement::SettlementResult,
    settlement_record::SettlementRecord,
    transaction::Transaction,
};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashSet;
use std::time::Duration;
use uuid::Uuid;

pub struct SplitxService<L: LoggingService, S: Storage, C: Cache> {
    storage: S,
    logging: L,
    cache: C,
    engine: SettlementEngine,
    settlement_ttl: Duration,
}

impl<L: LoggingService, S: Storage, C: Cache> SplitxService<L, S, C> {
    pub fn new(storage: S, logging: L, cache: C, engine: SettlementEngine, settlement_ttl: Duration) -> Self {
        SplitxService {
            storage,
            logging,
            cache,
            engine,
            settlement_ttl,
        }
    }

    pub fn engine(&self) -> &SettlementEngine {
        &self.engine
    }

    async fn require_group(&self, group_id: &str) -> Result<Group, SplitxError> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or_else(|| SplitxError::GroupNotFound(group_id.to_string()))
    }

    fn require_member(&self, group: &Group, name: &str) -> Result<(), SplitxError> {
        if !group.has_member(name) {
            warn!("{} is not a member of group {}", name, group.id);
            return Err(SplitxError::MemberNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Records the action and drops the group's cached settlement.
    async fn record_change(
        &self,
        group_id: &str,
        action: &str,
        details: serde_json::Value,
    ) -> Result<(), SplitxError> {
        self.cache.invalidate_settlement(group_id).await?;
        self.logging.log_action(action, details, Some(group_id)).await
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), SplitxError> {
        if value.trim().is_empty() {
            return Err(SplitxError::invalid(
                field,
                format!("Invalid {}", field),
                format!("{} cannot be empty", field),
            ));
        }
        if value.chars().count() > max_length {
            return Err(SplitxError::invalid(
                field,
                format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(SplitxError::invalid(
                field,
                format!("Invalid {}", field),
                format!("{} contains invalid characters", field),
            ));
        }
        Ok(())
    }

    fn validate_amount_input(&self, field: &str, amount: Decimal) -> Result<(), SplitxError> {
        if amount <= Decimal::ZERO {
            return Err(SplitxError::invalid(
                field,
                "Invalid Amount",
                "Amount must be greater than 0",
            ));
        }
        if amount > Decimal::from(MAX_AMOUNT) {
            return Err(SplitxError::invalid(
                field,
                "Amount Too Large",
                format!("Amount cannot exceed {}", MAX_AMOUNT),
            ));
        }
        let scale = self.engine.scale();
        if amount.round_dp(scale) != amount {
            return Err(SplitxError::invalid(
                field,
                "Invalid Amount",
                format!("Amount cannot have more than {} decimal places", scale),
            ));
        }
        Ok(())
    }

    fn normalize_names(&self, field: &str, names: Vec<String>) -> Result<Vec<String>, SplitxError> {
        let mut seen = HashSet::with_capacity(names.len());
        let mut normalized = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim().to_string();
            self.validate_string_input(field, &name, MAX_NAME_LENGTH)?;
            if !seen.insert(name.clone()) {
                return Err(SplitxError::DuplicateMember(name));
            }
            normalized.push(name);
        }
        Ok(normalized)
    }

    // GROUPS

    pub async fn create_group(&self, name: String, members: Vec<String>) -> Result<Group, SplitxError> {
        let name = name.trim().to_string();
        self.validate_string_input("name", &name, MAX_NAME_LENGTH)?;
        let members = self.normalize_names("members", members)?;

        let group = Group {
            id: Uuid::new_v4().to_string(),
            name,
            members: members.into_iter().map(Member::active).collect(),
            created_at: Utc::now(),
        };
        self.storage.save_group(group.clone()).await?;
        info!("Created group {} with {} members", group.id, group.members.len());

        self.logging
            .log_action(
                GROUP_CREATED,
                json!({
                    "group_id": group.id,
                    "name": group.name,
                    "members": group.members.iter().map(|m| m.name.clone()).collect::<Vec<_>>()
                }),
                Some(&group.id),
            )
            .await?;

        Ok(group)
    }

    pub async fn get_group(&self, group_id: &str) -> Result<Group, SplitxError> {
        self.require_group(group_id).await
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, SplitxError> {
        self.storage.list_groups().await
    }

    pub async fn delete_group(&self, group_id: &str) -> Result<(), SplitxError> {
        let group = self.require_group(group_id).await?;
        self.storage.delete_group(group_id).await?;
        info!("Deleted group {} and its records", group_id);

        self.record_change(group_id, GROUP_DELETED, json!({ "group_id": group_id, "name": group.name }))
            .await
    }

    /// Adds the member as active, or reactivates them if they left earlier.
    pub async fn join_group(&self, group_id: &str, member_name: &str) -> Result<Group, SplitxError> {
        let member_name = member_name.trim();
        self.validate_string_input("member_name", member_name, MAX_NAME_LENGTH)?;
        let name = member_name.to_string();
        let group = self
            .storage
            .update_group(
                group_id,
                Box::new(move |group: &mut Group| -> Result<(), SplitxError> {
                    match group.find_member_mut(&name) {
                        Some(member) => member.is_active = true,
                        None => group.members.push(Member::active(name)),
                    }
                    Ok(())
                }),
            )
            .await?;
        debug!("{} joined group {}", member_name, group_id);

        self.record_change(
            group_id,
            MEMBER_JOINED,
            json!({ "group_id": group_id, "member_name": member_name }),
        )
        .await?;
        Ok(group)
    }

    /// Marks the member inactive; their past records stay in the ledger.
    pub async fn leave_group(&self, group_id: &str, member_name: &str) -> Result<Group, SplitxError> {
        let member_name = member_name.trim();
        self.validate_string_input("member_name", member_name, MAX_NAME_LENGTH)?;
        let name = member_name.to_string();
        let group = self
            .storage
            .update_group(
                group_id,
                Box::new(move |group: &mut Group| -> Result<(), SplitxError> {
                    let member = group
                        .find_member_mut(&name)
                        .ok_or_else(|| SplitxError::MemberNotFound(name.clone()))?;
                    member.is_active = false;
                    Ok(())
                }),
            )
            .await?;
        debug!("{} left group {}", member_name, group_id);

        self.record_change(
            group_id,
            MEMBER_LEFT,
            json!({ "group_id": group_id, "member_name": member_name }),
        )
        .await?;
        Ok(group)
    }

    // EXPENSES

    /// Records an expense and snapshots who it is split between.
    ///
    /// Without an explicit `split_between` the snapshot is the group's
    /// currently active members.
    pub async fn add_expense(
        &self,
        group_id: &str,
        amount: Decimal,
        paid_by: &str,
        description: Option<String>,
        split_between: Option<Vec<String>>,
    ) -> Result<Expense, SplitxError> {
        let group = self.require_group(group_id).await?;
        let paid_by = paid_by.trim();
        self.validate_string_input("paid_by", paid_by, MAX_NAME_LENGTH)?;
        self.require_member(&group, paid_by)?;
        self.validate_amount_input("amount", amount)?;

        let description = match description.map(|d| d.trim().to_string()) {
            Some(d) if d.is_empty() => None,
            Some(d) => {
                self.validate_string_input("description", &d, MAX_DESCRIPTION_LENGTH)?;
                Some(d)
            }
            None => None,
        };

        let split_between = match split_between {
            Some(names) if !names.is_empty() => {
                let names = self.normalize_names("split_between", names)?;
                for name in &names {
                    self.require_member(&group, name)?;
                }
                names
            }
            _ => group.active_members(),
        };
        if split_between.is_empty() {
            warn!("Rejected expense in group {}: no active members", group_id);
            return Err(SplitxError::NoActiveMembers);
        }

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.to_string(),
            amount,
            paid_by: paid_by.to_string(),
            description,
            split_between,
            date: Utc::now(),
        };
        self.storage.save_expense(expense.clone()).await?;
        info!("Added expense {} of {} to group {}", expense.id, amount, group_id);

        self.record_change(
            group_id,
            EXPENSE_ADDED,
            json!({
                "expense_id": expense.id,
                "amount": expense.amount,
                "paid_by": expense.paid_by,
                "split_between": expense.split_between
            }),
        )
        .await?;
        Ok(expense)
    }

    pub async fn list_expenses(&self, group_id: &str) -> Result<Vec<Expense>, SplitxError> {
        self.require_group(group_id).await?;
        self.storage.get_expenses(group_id).await
    }

    pub async fn delete_expense(&self, expense_id: &str) -> Result<(), SplitxError> {
        let expense = self
            .storage
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| SplitxError::ExpenseNotFound(expense_id.to_string()))?;
        self.storage.delete_expense(expense_id).await?;
        info!("Deleted expense {} from group {}", expense_id, expense.group_id);

        self.record_change(
            &expense.group_id,
            EXPENSE_DELETED,
            json!({ "expense_id": expense_id, "amount": expense.amount }),
        )
        .await
    }

    // TRANSACTIONS

    pub async fn add_transaction(
        &self,
        group_id: &str,
        payer: &str,
        receiver: &str,
        amount: Decimal,
    ) -> Result<Transaction, SplitxError> {
        let group = self.require_group(group_id).await?;
        let (payer, receiver) = (payer.trim(), receiver.trim());
        self.validate_string_input("payer", payer, MAX_NAME_LENGTH)?;
        self.validate_string_input("receiver", receiver, MAX_NAME_LENGTH)?;
        if payer == receiver {
            return Err(SplitxError::invalid(
                "receiver",
                "Invalid receiver",
                "payer and receiver must be different members",
            ));
        }
        self.require_member(&group, payer)?;
        self.require_member(&group, receiver)?;
        self.validate_amount_input("amount", amount)?;

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.to_string(),
            payer: payer.to_string(),
            receiver: receiver.to_string(),
            amount,
            date: Utc::now(),
        };
        self.storage.save_transaction(transaction.clone()).await?;
        info!(
            "Recorded transaction {}: {} paid {} {}",
            transaction.id, payer, receiver, amount
        );

        self.record_change(
            group_id,
            TRANSACTION_ADDED,
            json!({
                "transaction_id": transaction.id,
                "payer": transaction.payer,
                "receiver": transaction.receiver,
                "amount": transaction.amount
            }),
        )
        .await?;
        Ok(transaction)
    }

    pub async fn list_transactions(&self, group_id: &str) -> Result<Vec<Transaction>, SplitxError> {
        self.require_group(group_id).await?;
        self.storage.get_transactions(group_id).await
    }

    // SETTLEMENTS

    /// Net balances and the suggested transfers for a group.
    ///
    /// A computed result is cached only if no mutation of the group was
    /// recorded while its inputs were being read.
    pub async fn get_settlements(&self, group_id: &str) -> Result<SettlementResult, SplitxError> {
        if let Some(cached) = self.cache.get_settlement(group_id).await? {
            debug!("Serving cached settlement for group {}", group_id);
            self.log_settlement_query(group_id, &cached, true).await?;
            return Ok(cached);
        }

        let generation = self.cache.settlement_generation(group_id).await?;
        let group = self.require_group(group_id).await?;
        let expenses = self.storage.get_expenses(group_id).await?;
        let transactions = self.storage.get_transactions(group_id).await?;
        let result = self
            .engine
            .compute(&group.active_members(), &expenses, &transactions)
            .map_err(|e| {
                warn!("Settlement for group {} failed: {}", group_id, e);
                e
            })?;

        let stored = self
            .cache
            .save_settlement(group_id, generation, &result, self.settlement_ttl)
            .await?;
        if !stored {
            debug!("Group {} changed during settlement; result not cached", group_id);
        }
        self.log_settlement_query(group_id, &result, false).await?;

        Ok(result)
    }

    async fn log_settlement_query(
        &self,
        group_id: &str,
        result: &SettlementResult,
        cached: bool,
    ) -> Result<(), SplitxError> {
        self.logging
            .log_action(
                SETTLEMENT_QUERIED,
                json!({
                    "group_id": group_id,
                    "transfers": result.settlements.len(),
                    "cached": cached
                }),
                Some(group_id),
            )
            .await
    }

    /// Records a repayment `from` owes `to`; it stays pending until settled.
    pub async fn record_settlement(
        &self,
        group_id: &str,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<SettlementRecord, SplitxError> {
        let group = self.require_group(group_id).await?;
        let (from, to) = (from.trim(), to.trim());
        self.validate_string_input("from", from, MAX_NAME_LENGTH)?;
        self.validate_string_input("to", to, MAX_NAME_LENGTH)?;
        if from == to {
            return Err(SplitxError::invalid(
                "to",
                "Invalid receiver",
                "a member cannot settle with themselves",
            ));
        }
        self.require_member(&group, from)?;
        self.require_member(&group, to)?;
        self.validate_amount_input("amount", amount)?;

        let record = SettlementRecord {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            amount,
            settled: false,
            transaction_id: None,
            created_at: Utc::now(),
            settled_at: None,
        };
        self.storage.save_settlement_record(record.clone()).await?;
        info!("Recorded pending settlement {}: {} owes {} {}", record.id, from, to, amount);

        self.logging
            .log_action(
                SETTLEMENT_RECORDED,
                json!({
                    "settlement_id": record.id,
                    "from": record.from,
                    "to": record.to,
                    "amount": record.amount
                }),
                Some(group_id),
            )
            .await?;
        Ok(record)
    }

    pub async fn list_settlement_records(&self, group_id: &str) -> Result<Vec<SettlementRecord>, SplitxError> {
        self.require_group(group_id).await?;
        self.storage.get_settlement_records(group_id).await
    }

    /// Marks a pending record settled and nets the repayment into the ledger.
    ///
    /// The ledger debits a transaction's payer, so the repayment is booked with
    /// the creditor as payer and the debtor as receiver. That moves both
    /// balances toward zero by the settled amount.
    pub async fn settle_record(&self, record_id: &str) -> Result<SettlementRecord, SplitxError> {
        let record = self
            .storage
            .get_settlement_record(record_id)
            .await?
            .ok_or_else(|| SplitxError::SettlementRecordNotFound(record_id.to_string()))?;
        if record.settled {
            return Err(SplitxError::SettlementAlreadyConfirmed(record_id.to_string()));
        }

        let netting = Transaction {
            id: Uuid::new_v4().to_string(),
            group_id: record.group_id.clone(),
            payer: record.to.clone(),
            receiver: record.from.clone(),
            amount: record.amount,
            date: Utc::now(),
        };
        let settled = self.storage.settle_record(record_id, netting).await?;
        info!("Settlement {} confirmed in group {}", record_id, settled.group_id);

        self.record_change(
            &settled.group_id,
            SETTLEMENT_CONFIRMED,
            json!({
                "settlement_id": settled.id,
                "transaction_id": settled.transaction_id,
                "amount": settled.amount
            }),
        )
        .await?;
        Ok(settled)
    }

    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, SplitxError> {
        self.logging.get_logs().await
    }

    /// Action history of one group. Entries outlive the group itself.
    pub async fn get_group_logs(&self, group_id: &str) -> Result<Vec<AppLog>, SplitxError> {
        self.logging.get_group_logs(group_id).await
    }
}
