use crate::{
    api::models::*,
    core::{
        models::{
            audit::AppLog, expense::Expense, group::Group, settlement::SettlementResult,
            settlement_record::SettlementRecord, transaction::Transaction,
        },
        services::SplitxService,
    },
    infrastructure::{
        cache::in_memory::InMemoryCache, logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

pub type AppService = SplitxService<InMemoryLogging, InMemoryStorage, InMemoryCache>;

// Define API routes
pub fn api_routes(service: Arc<AppService>) -> Router {
    Router::new()
        .route("/groups", post(create_group).get(list_groups))
        .route("/groups/{group_id}", get(get_group).delete(delete_group))
        .route("/groups/{group_id}/join", post(join_group))
        .route("/groups/{group_id}/leave", post(leave_group))
        .route("/groups/{group_id}/expenses", post(add_expense).get(list_expenses))
        .route("/expenses/{expense_id}", delete(delete_expense))
        .route(
            "/groups/{group_id}/transactions",
            post(add_transaction).get(list_transactions),
        )
        .route("/groups/{group_id}/settlements", get(get_settlements))
        .route(
            "/groups/{group_id}/settlement-records",
            post(record_settlement).get(list_settlement_records),
        )
        .route("/settlement-records/{record_id}/settle", put(settle_record))
        .route("/groups/{group_id}/logs", get(get_group_logs))
        .route("/logs", get(get_app_logs))
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created successfully", body = Group),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 409, description = "Duplicate member name", body = ErrorResponse)
    )
)]
pub(crate) async fn create_group(
    State(service): State<Arc<AppService>>,
    ValidJson(req): ValidJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let group = service.create_group(req.name, req.members).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/api/groups",
    responses(
        (status = 200, description = "All groups", body = [Group])
    )
)]
pub(crate) async fn list_groups(State(service): State<Arc<AppService>>) -> Result<Json<Vec<Group>>, ApiError> {
    Ok(Json(service.list_groups().await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}",
    params(
        ("group_id" = String, Path, description = "ID of the group to retrieve")
    ),
    responses(
        (status = 200, description = "Group retrieved successfully", body = Group),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_group(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Group>, ApiError> {
    Ok(Json(service.get_group(&group_id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{group_id}",
    params(
        ("group_id" = String, Path, description = "ID of the group to delete")
    ),
    responses(
        (status = 200, description = "Group and its records deleted", body = MessageResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_group(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_group(&group_id).await?;
    Ok(Json(MessageResponse {
        message: "Group and associated data deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/join",
    request_body = MembershipRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group to join")
    ),
    responses(
        (status = 200, description = "Member joined or reactivated", body = Group),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn join_group(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ValidJson(req): ValidJson<MembershipRequest>,
) -> Result<Json<Group>, ApiError> {
    Ok(Json(service.join_group(&group_id, &req.member_name).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/leave",
    request_body = MembershipRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group to leave")
    ),
    responses(
        (status = 200, description = "Member marked inactive", body = Group),
        (status = 404, description = "Group or member not found", body = ErrorResponse)
    )
)]
pub(crate) async fn leave_group(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ValidJson(req): ValidJson<MembershipRequest>,
) -> Result<Json<Group>, ApiError> {
    Ok(Json(service.leave_group(&group_id, &req.member_name).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/expenses",
    request_body = AddExpenseRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group the expense belongs to")
    ),
    responses(
        (status = 201, description = "Expense recorded", body = Expense),
        (status = 400, description = "Invalid amount or no active members", body = ErrorResponse),
        (status = 404, description = "Group or member not found", body = ErrorResponse)
    )
)]
pub(crate) async fn add_expense(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ValidJson(req): ValidJson<AddExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let expense = service
        .add_expense(&group_id, req.amount, &req.paid_by, req.description, req.split_between)
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/expenses",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Expenses in recording order", body = [Expense]),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn list_expenses(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    Ok(Json(service.list_expenses(&group_id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{expense_id}",
    params(
        ("expense_id" = String, Path, description = "ID of the expense to delete")
    ),
    responses(
        (status = 200, description = "Expense deleted", body = MessageResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_expense(
    State(service): State<Arc<AppService>>,
    Path(expense_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_expense(&expense_id).await?;
    Ok(Json(MessageResponse {
        message: "Expense deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/transactions",
    request_body = AddTransactionRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 201, description = "Transaction recorded", body = Transaction),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Group or member not found", body = ErrorResponse)
    )
)]
pub(crate) async fn add_transaction(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ValidJson(req): ValidJson<AddTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let transaction = service
        .add_transaction(&group_id, &req.payer, &req.receiver, req.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/transactions",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Transactions in recording order", body = [Transaction]),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn list_transactions(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    Ok(Json(service.list_transactions(&group_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/settlements",
    params(
        ("group_id" = String, Path, description = "ID of the group to settle")
    ),
    responses(
        (status = 200, description = "Final balances and suggested transfers", body = SettlementResult),
        (status = 400, description = "No active members to split between", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse),
        (status = 500, description = "Balances could not be reconciled", body = ErrorResponse)
    )
)]
pub(crate) async fn get_settlements(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<SettlementResult>, ApiError> {
    Ok(Json(service.get_settlements(&group_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/settlement-records",
    request_body = RecordSettlementRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 201, description = "Pending settlement recorded", body = SettlementRecord),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Group or member not found", body = ErrorResponse)
    )
)]
pub(crate) async fn record_settlement(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ValidJson(req): ValidJson<RecordSettlementRequest>,
) -> Result<(StatusCode, Json<SettlementRecord>), ApiError> {
    let record = service
        .record_settlement(&group_id, &req.from, &req.to, req.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/settlement-records",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Pending and settled records in recording order", body = [SettlementRecord]),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn list_settlement_records(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<SettlementRecord>>, ApiError> {
    Ok(Json(service.list_settlement_records(&group_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/settlement-records/{record_id}/settle",
    params(
        ("record_id" = String, Path, description = "ID of the settlement record")
    ),
    responses(
        (status = 200, description = "Record settled and netted into the ledger", body = SettlementRecord),
        (status = 404, description = "Settlement record not found", body = ErrorResponse),
        (status = 409, description = "Record already settled", body = ErrorResponse)
    )
)]
pub(crate) async fn settle_record(
    State(service): State<Arc<AppService>>,
    Path(record_id): Path<String>,
) -> Result<Json<SettlementRecord>, ApiError> {
    Ok(Json(service.settle_record(&record_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Application action log", body = [AppLog])
    )
)]
pub(crate) async fn get_app_logs(State(service): State<Arc<AppService>>) -> Result<Json<Vec<AppLog>>, ApiError> {
    Ok(Json(service.get_app_logs().await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/logs",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Actions recorded against the group", body = [AppLog])
    )
)]
pub(crate) async fn get_group_logs(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<AppLog>>, ApiError> {
    Ok(Json(service.get_group_logs(&group_id).await?))
}
