//! Project endpoints, including the `move`, `cancel` and `log_sale`
//! transitions.

use api_types::project::{
    CancelProject, LogSale, MoveProject, ProjectListQuery, ProjectNew, ProjectPatch as ApiPatch,
    ProjectView, SaleLogged, StageHistoryView, WorkLogNew, WorkLogView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    CancelCmd, Hours, LogSaleCmd, Money, ProjectDetail, ProjectInput, ProjectListFilter,
    ProjectPatch, ProjectStatus, SaleChannel, WorkLogInput, users, work_logs,
};
use uuid::Uuid;

use crate::{
    ServerError, hours, money, parse_decimal, parse_nullable, parse_optional,
    sales::sale_view, server::ServerState,
};

pub(crate) fn project_view(detail: ProjectDetail) -> ProjectView {
    let p = detail.project;
    ProjectView {
        id: p.id,
        name: p.name,
        template_id: p.template_id,
        template_name: detail.template_name,
        customer_id: p.customer_id,
        customer_name: detail.customer_name,
        workflow_id: p.workflow_id,
        workflow_name: detail.workflow_name,
        current_stage_id: p.current_stage_id,
        current_stage_name: detail.current_stage_name,
        status: p.status,
        quantity: p.quantity,
        due_date: p.due_date,
        estimated_hours: hours(p.estimated_hours),
        actual_hours: p.actual_hours.map(hours),
        expected_price: p.expected_price_minor.map(money),
        expected_currency: p.expected_currency,
        quoted_at: p.quoted_at,
        confirmed_at: p.confirmed_at,
        started_at: p.started_at,
        completed_at: p.completed_at,
        cancel_reason: p.cancel_reason,
        cancel_stage_id: p.cancel_stage_id,
        cancelled_at: p.cancelled_at,
        notes: p.notes,
        created_at: p.created_at,
        updated_at: p.updated_at,
    }
}

fn work_log_view(log: work_logs::Model) -> WorkLogView {
    WorkLogView {
        id: log.id,
        stage_id: log.stage_id,
        started_at: log.started_at,
        ended_at: log.ended_at,
        notes: log.notes,
    }
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<Vec<ProjectView>>, ServerError> {
    let status = query
        .status
        .as_deref()
        .map(ProjectStatus::try_from)
        .transpose()?;
    let filter = ProjectListFilter {
        status,
        customer_id: query.customer,
    };
    let rows = state.engine.projects(&user.username, filter).await?;
    Ok(Json(rows.into_iter().map(project_view).collect()))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectView>, ServerError> {
    let detail = state.engine.project(&user.username, id).await?;
    Ok(Json(project_view(detail)))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ProjectNew>,
) -> Result<(StatusCode, Json<ProjectView>), ServerError> {
    let input = ProjectInput {
        estimated_hours: parse_optional::<Hours>(
            payload.estimated_hours.as_ref(),
            "estimated_hours",
        )?,
        expected_price: parse_optional::<Money>(
            payload.expected_price.as_ref(),
            "expected_price",
        )?,
        template_id: payload.template_id,
        customer_id: payload.customer_id,
        name: payload.name,
        quantity: payload.quantity,
        due_date: payload.due_date,
        notes: payload.notes,
    };
    let detail = state.engine.create_project(&user.username, input).await?;
    Ok((StatusCode::CREATED, Json(project_view(detail))))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApiPatch>,
) -> Result<Json<ProjectView>, ServerError> {
    let patch = ProjectPatch {
        estimated_hours: parse_optional::<Hours>(
            payload.estimated_hours.as_ref(),
            "estimated_hours",
        )?,
        actual_hours: parse_nullable::<Hours>(
            payload.actual_hours.as_ref().map(Option::as_ref),
            "actual_hours",
        )?,
        expected_price: parse_nullable::<Money>(
            payload.expected_price.as_ref().map(Option::as_ref),
            "expected_price",
        )?,
        name: payload.name,
        template_id: payload.template_id,
        customer_id: payload.customer_id,
        quantity: payload.quantity,
        due_date: payload.due_date,
        notes: payload.notes,
    };
    let detail = state
        .engine
        .update_project(&user.username, id, patch)
        .await?;
    Ok(Json(project_view(detail)))
}

pub async fn delete(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_project(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_to_stage(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveProject>,
) -> Result<Json<ProjectView>, ServerError> {
    let detail = state
        .engine
        .move_project(&user.username, id, payload.stage_id)
        .await?;
    Ok(Json(project_view(detail)))
}

pub async fn cancel(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelProject>,
) -> Result<Json<ProjectView>, ServerError> {
    let cmd = CancelCmd {
        reason: payload.reason,
        notes: payload.notes,
        expected_price: parse_optional::<Money>(
            payload.expected_price.as_ref(),
            "expected_price",
        )?,
    };
    let detail = state
        .engine
        .cancel_project(&user.username, id, cmd)
        .await?;
    Ok(Json(project_view(detail)))
}

pub async fn log_sale(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LogSale>,
) -> Result<(StatusCode, Json<SaleLogged>), ServerError> {
    let price = payload
        .price
        .as_ref()
        .ok_or_else(|| ServerError::Generic("price is required".to_string()))?;
    let channel = SaleChannel::try_from(payload.channel.as_deref().unwrap_or_default())?;

    let mut cmd = LogSaleCmd::new(parse_decimal::<Money>(price, "price")?, channel);
    cmd.fees = parse_optional(payload.fees.as_ref(), "fees")?;
    cmd.sold_at = payload.sold_at;
    cmd.notes = payload.notes;
    cmd.platform_fees = parse_optional(payload.platform_fees.as_ref(), "platform_fees")?;
    cmd.shipping_cost = parse_optional(payload.shipping_cost.as_ref(), "shipping_cost")?;
    cmd.tax_amount = parse_optional(payload.tax_amount.as_ref(), "tax_amount")?;
    cmd.cost_of_goods = parse_optional(payload.cost_of_goods.as_ref(), "cost_of_goods")?;

    let logged = state.engine.log_sale(&user.username, id, cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(SaleLogged {
            project: project_view(logged.project),
            sale: sale_view(logged.sale),
        }),
    ))
}

pub async fn history(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StageHistoryView>>, ServerError> {
    let entries = state.engine.project_history(&user.username, id).await?;
    Ok(Json(
        entries
            .into_iter()
            .map(|e| StageHistoryView {
                id: e.entry.id,
                stage_id: e.entry.stage_id,
                stage_name: e.stage_name,
                entered_at: e.entry.entered_at,
            })
            .collect(),
    ))
}

pub async fn work_logs(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<WorkLogView>>, ServerError> {
    let logs = state.engine.work_logs(&user.username, id).await?;
    Ok(Json(logs.into_iter().map(work_log_view).collect()))
}

pub async fn add_work_log(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<WorkLogNew>,
) -> Result<(StatusCode, Json<WorkLogView>), ServerError> {
    let input = WorkLogInput {
        stage_id: payload.stage_id,
        started_at: payload.started_at,
        ended_at: payload.ended_at,
        notes: payload.notes,
    };
    let log = state.engine.add_work_log(&user.username, id, input).await?;
    Ok((StatusCode::CREATED, Json(work_log_view(log))))
}
