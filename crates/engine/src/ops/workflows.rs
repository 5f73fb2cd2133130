//! Workflows, their stages and the project board.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, ProjectStatus, ResultEngine, StageInput, WorkflowInput, projects,
    workflow_stages, workflows,
};

use super::{Engine, ProjectDetail, normalize_required_name, normalize_text, with_tx};

#[derive(Clone, Debug)]
pub struct WorkflowWithStages {
    pub workflow: workflows::Model,
    /// Ordered by `position`.
    pub stages: Vec<workflow_stages::Model>,
}

/// One stage of the board with the active projects sitting in it.
#[derive(Clone, Debug)]
pub struct BoardColumn {
    pub stage: workflow_stages::Model,
    pub projects: Vec<ProjectDetail>,
}

impl Engine {
    /// Lists active workflows ordered by name.
    pub async fn workflows(&self, user_id: &str) -> ResultEngine<Vec<WorkflowWithStages>> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let rows = workflows::Entity::find()
                .filter(workflows::Column::ShopId.eq(shop.id))
                .filter(workflows::Column::IsActive.eq(true))
                .order_by_asc(workflows::Column::Name)
                .all(&db_tx)
                .await?;
            let mut out = Vec::with_capacity(rows.len());
            for workflow in rows {
                let stages = self.stages_of(&db_tx, workflow.id).await?;
                out.push(WorkflowWithStages { workflow, stages });
            }
            Ok(out)
        })
    }

    pub async fn workflow(&self, user_id: &str, id: Uuid) -> ResultEngine<WorkflowWithStages> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let workflow = self.require_workflow(&db_tx, shop.id, id).await?;
            let stages = self.stages_of(&db_tx, workflow.id).await?;
            Ok(WorkflowWithStages { workflow, stages })
        })
    }

    /// Creates a workflow, optionally with its stages.
    pub async fn create_workflow(
        &self,
        user_id: &str,
        input: WorkflowInput,
    ) -> ResultEngine<WorkflowWithStages> {
        let name = normalize_required_name(input.name.as_deref().unwrap_or_default(), "workflow")?;
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.ensure_workflow_name_free(&db_tx, shop.id, &name, None)
                .await?;

            let now = Utc::now();
            let id = Uuid::new_v4();
            let model = workflows::ActiveModel {
                id: ActiveValue::Set(id),
                shop_id: ActiveValue::Set(shop.id),
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(normalize_text(
                    input.description.as_deref().unwrap_or_default(),
                )),
                is_default: ActiveValue::Set(input.is_default.unwrap_or(false)),
                is_active: ActiveValue::Set(input.is_active.unwrap_or(true)),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            let workflow = model.insert(&db_tx).await?;

            for stage in input.stages.unwrap_or_default() {
                self.insert_stage(&db_tx, id, stage).await?;
            }
            let stages = self.stages_of(&db_tx, id).await?;
            Ok(WorkflowWithStages { workflow, stages })
        })
    }

    pub async fn update_workflow(
        &self,
        user_id: &str,
        id: Uuid,
        input: WorkflowInput,
    ) -> ResultEngine<WorkflowWithStages> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let current = self.require_workflow(&db_tx, shop.id, id).await?;
            let mut model: workflows::ActiveModel = current.into();
            if let Some(name) = input.name.as_deref() {
                let name = normalize_required_name(name, "workflow")?;
                self.ensure_workflow_name_free(&db_tx, shop.id, &name, Some(id))
                    .await?;
                model.name = ActiveValue::Set(name);
            }
            if let Some(description) = input.description.as_deref() {
                model.description = ActiveValue::Set(normalize_text(description));
            }
            if let Some(is_default) = input.is_default {
                model.is_default = ActiveValue::Set(is_default);
            }
            if let Some(is_active) = input.is_active {
                model.is_active = ActiveValue::Set(is_active);
            }
            model.updated_at = ActiveValue::Set(Utc::now());
            let workflow = model.update(&db_tx).await?;
            let stages = self.stages_of(&db_tx, id).await?;
            Ok(WorkflowWithStages { workflow, stages })
        })
    }

    /// Deletes a workflow and its stages. Refused while any project uses it.
    pub async fn delete_workflow(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let workflow = self.require_workflow(&db_tx, shop.id, id).await?;
            let in_use = projects::Entity::find()
                .filter(projects::Column::WorkflowId.eq(id))
                .count(&db_tx)
                .await?;
            if in_use > 0 {
                return Err(EngineError::InvalidInput(format!(
                    "workflow '{}' is used by {in_use} project(s)",
                    workflow.name
                )));
            }
            workflows::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn stages(
        &self,
        user_id: &str,
        workflow_id: Uuid,
    ) -> ResultEngine<Vec<workflow_stages::Model>> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_workflow(&db_tx, shop.id, workflow_id).await?;
            self.stages_of(&db_tx, workflow_id).await
        })
    }

    pub async fn stage(
        &self,
        user_id: &str,
        workflow_id: Uuid,
        stage_id: Uuid,
    ) -> ResultEngine<workflow_stages::Model> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_workflow(&db_tx, shop.id, workflow_id).await?;
            self.require_stage_in_workflow(&db_tx, workflow_id, stage_id)
                .await
        })
    }

    pub async fn create_stage(
        &self,
        user_id: &str,
        workflow_id: Uuid,
        input: StageInput,
    ) -> ResultEngine<workflow_stages::Model> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_workflow(&db_tx, shop.id, workflow_id).await?;
            self.insert_stage(&db_tx, workflow_id, input).await
        })
    }

    pub async fn update_stage(
        &self,
        user_id: &str,
        workflow_id: Uuid,
        stage_id: Uuid,
        input: StageInput,
    ) -> ResultEngine<workflow_stages::Model> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_workflow(&db_tx, shop.id, workflow_id).await?;
            let current = self
                .require_stage_in_workflow(&db_tx, workflow_id, stage_id)
                .await?;
            let mut model: workflow_stages::ActiveModel = current.into();
            if let Some(name) = input.name.as_deref() {
                model.name = ActiveValue::Set(normalize_required_name(name, "stage")?);
            }
            if let Some(order) = input.order {
                let order = validate_order(order)?;
                self.ensure_order_free(&db_tx, workflow_id, order, Some(stage_id))
                    .await?;
                model.position = ActiveValue::Set(order);
            }
            if let Some(role) = input.role.as_deref() {
                model.role = ActiveValue::Set(normalize_text(role));
            }
            if let Some(key) = input.key.as_deref() {
                model.key = ActiveValue::Set(normalize_key(key));
            }
            Ok(model.update(&db_tx).await?)
        })
    }

    /// Deletes a stage. Refused while any project sits in it.
    pub async fn delete_stage(
        &self,
        user_id: &str,
        workflow_id: Uuid,
        stage_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_workflow(&db_tx, shop.id, workflow_id).await?;
            let stage = self
                .require_stage_in_workflow(&db_tx, workflow_id, stage_id)
                .await?;
            let in_use = projects::Entity::find()
                .filter(projects::Column::CurrentStageId.eq(stage_id))
                .count(&db_tx)
                .await?;
            if in_use > 0 {
                return Err(EngineError::InvalidInput(format!(
                    "stage '{}' still holds {in_use} project(s)",
                    stage.name
                )));
            }
            workflow_stages::Entity::delete_by_id(stage_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Builds the board: every stage in order with the active projects whose
    /// current stage it is.
    ///
    /// Projects are ordered by due date ascending with undated projects last,
    /// then by id. A project whose stage is not part of the workflow appears
    /// in no column.
    pub async fn board(&self, user_id: &str, workflow_id: Uuid) -> ResultEngine<Vec<BoardColumn>> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_workflow(&db_tx, shop.id, workflow_id).await?;
            let stages = self.stages_of(&db_tx, workflow_id).await?;

            let mut active = projects::Entity::find()
                .filter(projects::Column::ShopId.eq(shop.id))
                .filter(projects::Column::WorkflowId.eq(workflow_id))
                .filter(projects::Column::Status.eq(ProjectStatus::Active.as_str()))
                .all(&db_tx)
                .await?;
            active.sort_by_key(|p| (p.due_date.is_none(), p.due_date, p.id));
            let details = self.project_details(&db_tx, active).await?;

            let mut by_stage: HashMap<Uuid, Vec<ProjectDetail>> = HashMap::new();
            for detail in details {
                by_stage
                    .entry(detail.project.current_stage_id)
                    .or_default()
                    .push(detail);
            }

            Ok(stages
                .into_iter()
                .map(|stage| BoardColumn {
                    projects: by_stage.remove(&stage.id).unwrap_or_default(),
                    stage,
                })
                .collect())
        })
    }

    pub(super) async fn stages_of(
        &self,
        db: &DatabaseTransaction,
        workflow_id: Uuid,
    ) -> ResultEngine<Vec<workflow_stages::Model>> {
        Ok(workflow_stages::Entity::find()
            .filter(workflow_stages::Column::WorkflowId.eq(workflow_id))
            .order_by_asc(workflow_stages::Column::Position)
            .all(db)
            .await?)
    }

    pub(super) async fn require_stage_in_workflow(
        &self,
        db: &DatabaseTransaction,
        workflow_id: Uuid,
        stage_id: Uuid,
    ) -> ResultEngine<workflow_stages::Model> {
        workflow_stages::Entity::find_by_id(stage_id)
            .filter(workflow_stages::Column::WorkflowId.eq(workflow_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("stage not found".to_string()))
    }

    /// The shop's default workflow: active and flagged default. When more
    /// than one qualifies the oldest wins.
    pub(super) async fn default_workflow(
        &self,
        db: &DatabaseTransaction,
        shop_id: Uuid,
    ) -> ResultEngine<Option<workflows::Model>> {
        Ok(workflows::Entity::find()
            .filter(workflows::Column::ShopId.eq(shop_id))
            .filter(workflows::Column::IsDefault.eq(true))
            .filter(workflows::Column::IsActive.eq(true))
            .order_by_asc(workflows::Column::CreatedAt)
            .order_by_asc(workflows::Column::Id)
            .one(db)
            .await?)
    }

    async fn insert_stage(
        &self,
        db: &DatabaseTransaction,
        workflow_id: Uuid,
        input: StageInput,
    ) -> ResultEngine<workflow_stages::Model> {
        let name = normalize_required_name(input.name.as_deref().unwrap_or_default(), "stage")?;
        let order = match input.order {
            Some(order) => validate_order(order)?,
            None => self.next_order(db, workflow_id).await?,
        };
        self.ensure_order_free(db, workflow_id, order, None).await?;
        let model = workflow_stages::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            workflow_id: ActiveValue::Set(workflow_id),
            name: ActiveValue::Set(name),
            position: ActiveValue::Set(order),
            role: ActiveValue::Set(normalize_text(input.role.as_deref().unwrap_or_default())),
            key: ActiveValue::Set(normalize_key(input.key.as_deref().unwrap_or_default())),
        };
        Ok(model.insert(db).await?)
    }

    async fn next_order(&self, db: &DatabaseTransaction, workflow_id: Uuid) -> ResultEngine<i32> {
        let last = workflow_stages::Entity::find()
            .filter(workflow_stages::Column::WorkflowId.eq(workflow_id))
            .order_by_desc(workflow_stages::Column::Position)
            .one(db)
            .await?;
        Ok(last.map_or(0, |stage| stage.position + 1))
    }

    async fn ensure_order_free(
        &self,
        db: &DatabaseTransaction,
        workflow_id: Uuid,
        order: i32,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = workflow_stages::Entity::find()
            .filter(workflow_stages::Column::WorkflowId.eq(workflow_id))
            .filter(workflow_stages::Column::Position.eq(order));
        if let Some(stage_id) = except {
            query = query.filter(workflow_stages::Column::Id.ne(stage_id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(format!(
                "a stage with order {order} already exists in this workflow"
            )));
        }
        Ok(())
    }

    async fn ensure_workflow_name_free(
        &self,
        db: &DatabaseTransaction,
        shop_id: Uuid,
        name: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = workflows::Entity::find()
            .filter(workflows::Column::ShopId.eq(shop_id))
            .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
        if let Some(id) = except {
            query = query.filter(workflows::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(format!(
                "workflow '{name}' already exists"
            )));
        }
        Ok(())
    }
}

fn validate_order(order: i32) -> ResultEngine<i32> {
    if order < 0 {
        return Err(EngineError::InvalidInput(
            "order must not be negative".to_string(),
        ));
    }
    Ok(order)
}

/// Stage keys are matched by business rules, so they are stored lower case.
fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}
