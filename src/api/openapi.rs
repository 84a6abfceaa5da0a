use utoipa::OpenApi;

use crate::{
    api::models::{
        AddExpenseRequest, AddTransactionRequest, CreateGroupRequest, ErrorResponse, MembershipRequest,
        MessageResponse, RecordSettlementRequest,
    },
    core::models::{
        audit::AppLog,
        expense::Expense,
        group::{Group, Member},
        settlement::{SettlementResult, SettlementStep, SettlementTransfer},
        settlement_record::SettlementRecord,
        transaction::Transaction,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::create_group,
        super::handlers::list_groups,
        super::handlers::get_group,
        super::handlers::delete_group,
        super::handlers::join_group,
        super::handlers::leave_group,
        super::handlers::add_expense,
        super::handlers::list_expenses,
        super::handlers::delete_expense,
        super::handlers::add_transaction,
        super::handlers::list_transactions,
        super::handlers::get_settlements,
        super::handlers::record_settlement,
        super::handlers::list_settlement_records,
        super::handlers::settle_record,
        super::handlers::get_group_logs,
        super::handlers::get_app_logs
    ),
    components(schemas(
        CreateGroupRequest,
        MembershipRequest,
        AddExpenseRequest,
        AddTransactionRequest,
        RecordSettlementRequest,
        MessageResponse,
        ErrorResponse,
        Group,
        Member,
        Expense,
        Transaction,
        SettlementResult,
        SettlementTransfer,
        SettlementStep,
        SettlementRecord,
        AppLog
    )),
    info(
        title = "SplitX API",
        description = "Group expense ledger with debt settlement. Money amounts in responses are exact decimals serialized as JSON strings; requests accept numbers or strings.",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
