//! Workflow, stage and board endpoints.

use api_types::workflow::{
    Board, BoardColumn, StageUpsert, StageView, WorkflowUpsert, WorkflowView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{StageInput, WorkflowInput, WorkflowWithStages, users, workflow_stages};
use uuid::Uuid;

use crate::{ServerError, projects::project_view, server::ServerState};

fn stage_view(stage: workflow_stages::Model) -> StageView {
    StageView {
        id: stage.id,
        workflow_id: stage.workflow_id,
        name: stage.name,
        order: stage.position,
        role: stage.role,
        key: stage.key,
    }
}

fn stage_input(payload: StageUpsert) -> StageInput {
    StageInput {
        name: payload.name,
        order: payload.order,
        role: payload.role,
        key: payload.key,
    }
}

fn workflow_view(row: WorkflowWithStages) -> WorkflowView {
    let w = row.workflow;
    WorkflowView {
        id: w.id,
        name: w.name,
        description: w.description,
        is_default: w.is_default,
        is_active: w.is_active,
        stages: row.stages.into_iter().map(stage_view).collect(),
        created_at: w.created_at,
        updated_at: w.updated_at,
    }
}

fn workflow_input(payload: WorkflowUpsert) -> WorkflowInput {
    WorkflowInput {
        name: payload.name,
        description: payload.description,
        is_default: payload.is_default,
        is_active: payload.is_active,
        stages: payload
            .stages
            .map(|stages| stages.into_iter().map(stage_input).collect()),
    }
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<WorkflowView>>, ServerError> {
    let rows = state.engine.workflows(&user.username).await?;
    Ok(Json(rows.into_iter().map(workflow_view).collect()))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkflowView>, ServerError> {
    let row = state.engine.workflow(&user.username, id).await?;
    Ok(Json(workflow_view(row)))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<WorkflowUpsert>,
) -> Result<(StatusCode, Json<WorkflowView>), ServerError> {
    let row = state
        .engine
        .create_workflow(&user.username, workflow_input(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(workflow_view(row))))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<WorkflowUpsert>,
) -> Result<Json<WorkflowView>, ServerError> {
    let row = state
        .engine
        .update_workflow(&user.username, id, workflow_input(payload))
        .await?;
    Ok(Json(workflow_view(row)))
}

pub async fn delete(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_workflow(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_stages(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StageView>>, ServerError> {
    let stages = state.engine.stages(&user.username, id).await?;
    Ok(Json(stages.into_iter().map(stage_view).collect()))
}

pub async fn get_stage(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((id, stage_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<StageView>, ServerError> {
    let stage = state.engine.stage(&user.username, id, stage_id).await?;
    Ok(Json(stage_view(stage)))
}

pub async fn create_stage(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StageUpsert>,
) -> Result<(StatusCode, Json<StageView>), ServerError> {
    let stage = state
        .engine
        .create_stage(&user.username, id, stage_input(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(stage_view(stage))))
}

pub async fn update_stage(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((id, stage_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<StageUpsert>,
) -> Result<Json<StageView>, ServerError> {
    let stage = state
        .engine
        .update_stage(&user.username, id, stage_id, stage_input(payload))
        .await?;
    Ok(Json(stage_view(stage)))
}

pub async fn delete_stage(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((id, stage_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_stage(&user.username, id, stage_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn board(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Board>, ServerError> {
    let columns = state.engine.board(&user.username, id).await?;
    Ok(Json(Board {
        workflow_id: id,
        columns: columns
            .into_iter()
            .map(|column| BoardColumn {
                stage: stage_view(column.stage),
                projects: column.projects.into_iter().map(project_view).collect(),
            })
            .collect(),
    }))
}
