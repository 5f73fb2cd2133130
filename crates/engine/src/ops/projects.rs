//! Projects and their state machine.
//!
//! ```text
//!           cancel           log_sale
//! cancelled <------ active ----------> completed
//!                    |  ^
//!                    +--+ move (stage only)
//! ```
//!
//! `move` changes the current stage and appends a history row but never the
//! status. `cancel` and `log_sale` change the status but never the stage.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    CancelCmd, EngineError, Hours, LogSaleCmd, Money, ProjectInput, ProjectPatch, ProjectStatus,
    ResultEngine, WorkLogInput, customers, product_templates, project_stage_history, projects,
    sales, util::append_note, util::ensure_positive_quantity, work_logs, workflow_stages,
    workflows,
};

use super::{Engine, normalize_optional_text, normalize_required_name, normalize_text, with_tx};

#[derive(Clone, Copy, Debug, Default)]
pub struct ProjectListFilter {
    pub status: Option<ProjectStatus>,
    pub customer_id: Option<Uuid>,
}

/// A project with the display names of what it references.
#[derive(Clone, Debug)]
pub struct ProjectDetail {
    pub project: projects::Model,
    pub template_name: Option<String>,
    pub customer_name: Option<String>,
    pub workflow_name: String,
    pub current_stage_name: String,
}

/// Outcome of [`Engine::log_sale`].
#[derive(Clone, Debug)]
pub struct SaleLogged {
    pub project: ProjectDetail,
    pub sale: sales::Model,
}

/// A stage history row with the stage's name.
#[derive(Clone, Debug)]
pub struct StageEntry {
    pub entry: project_stage_history::Model,
    pub stage_name: String,
}

impl Engine {
    /// Lists projects newest first.
    pub async fn projects(
        &self,
        user_id: &str,
        filter: ProjectListFilter,
    ) -> ResultEngine<Vec<ProjectDetail>> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let mut query = projects::Entity::find().filter(projects::Column::ShopId.eq(shop.id));
            if let Some(status) = filter.status {
                query = query.filter(projects::Column::Status.eq(status.as_str()));
            }
            if let Some(customer_id) = filter.customer_id {
                query = query.filter(projects::Column::CustomerId.eq(customer_id));
            }
            let rows = query
                .order_by_desc(projects::Column::CreatedAt)
                .order_by_desc(projects::Column::Id)
                .all(&db_tx)
                .await?;
            self.project_details(&db_tx, rows).await
        })
    }

    pub async fn project(&self, user_id: &str, id: Uuid) -> ResultEngine<ProjectDetail> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let project = self.require_project(&db_tx, shop.id, id).await?;
            self.project_detail(&db_tx, project).await
        })
    }

    /// Creates a project from a template.
    ///
    /// The workflow is the template's, falling back to the shop default; the
    /// project starts `active` in the workflow's first stage, and that stage
    /// is recorded as the first history entry. Hours and price default to
    /// the template values times the quantity.
    pub async fn create_project(
        &self,
        user_id: &str,
        input: ProjectInput,
    ) -> ResultEngine<ProjectDetail> {
        let template_id = input.template_id.ok_or_else(|| {
            EngineError::InvalidInput(
                "A product template is required to create a project.".to_string(),
            )
        })?;
        let quantity = ensure_positive_quantity(input.quantity.unwrap_or(1))?;
        if let Some(hours) = input.estimated_hours {
            hours.non_negative("estimated_hours")?;
        }
        if let Some(price) = input.expected_price {
            price.non_negative("expected_price")?;
        }

        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let template = self.require_template(&db_tx, shop.id, template_id).await?;
            if let Some(customer_id) = input.customer_id {
                self.require_customer(&db_tx, shop.id, customer_id).await?;
            }

            let workflow = match template.workflow_id {
                Some(workflow_id) => Some(self.require_workflow(&db_tx, shop.id, workflow_id).await?),
                None => self.default_workflow(&db_tx, shop.id).await?,
            };
            let workflow = workflow.ok_or_else(|| {
                EngineError::InvalidInput(
                    "No workflow is configured for this template or as a shop default."
                        .to_string(),
                )
            })?;
            let first_stage = self
                .stages_of(&db_tx, workflow.id)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    EngineError::InvalidInput("Selected workflow has no stages defined.".to_string())
                })?;

            let estimated_hours = match input.estimated_hours {
                Some(hours) if !hours.is_zero() => hours,
                _ => Hours::new(template.estimated_labor_hours)
                    .checked_times(i64::from(quantity))
                    .ok_or_else(|| {
                        EngineError::InvalidInput("estimated_hours too large".to_string())
                    })?,
            };
            let expected_price = match (input.expected_price, template.base_price_minor) {
                (Some(price), _) => Some(price),
                (None, Some(base)) => Some(
                    Money::new(base)
                        .checked_times(i64::from(quantity))
                        .ok_or_else(|| {
                            EngineError::InvalidInput("expected_price too large".to_string())
                        })?,
                ),
                (None, None) => None,
            };
            let name = match input.name.as_deref() {
                Some(name) => normalize_required_name(name, "project")?,
                None => template.name.clone(),
            };

            let now = Utc::now();
            let id = Uuid::new_v4();
            let model = projects::ActiveModel {
                id: ActiveValue::Set(id),
                shop_id: ActiveValue::Set(shop.id),
                template_id: ActiveValue::Set(Some(template.id)),
                workflow_id: ActiveValue::Set(workflow.id),
                current_stage_id: ActiveValue::Set(first_stage.id),
                customer_id: ActiveValue::Set(input.customer_id),
                name: ActiveValue::Set(name),
                quantity: ActiveValue::Set(quantity),
                due_date: ActiveValue::Set(input.due_date),
                quoted_at: ActiveValue::Set(None),
                confirmed_at: ActiveValue::Set(None),
                started_at: ActiveValue::Set(None),
                completed_at: ActiveValue::Set(None),
                estimated_hours: ActiveValue::Set(estimated_hours.minor()),
                actual_hours: ActiveValue::Set(None),
                status: ActiveValue::Set(ProjectStatus::Active.as_str().to_string()),
                expected_price_minor: ActiveValue::Set(expected_price.map(Money::minor)),
                expected_currency: ActiveValue::Set(shop.currency.clone()),
                cancel_reason: ActiveValue::Set(String::new()),
                cancel_stage_id: ActiveValue::Set(None),
                cancelled_at: ActiveValue::Set(None),
                notes: ActiveValue::Set(normalize_text(input.notes.as_deref().unwrap_or_default())),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            let project = model.insert(&db_tx).await?;
            record_stage_entry(&db_tx, id, first_stage.id).await?;

            tracing::info!(project_id = %id, stage = %first_stage.name, "project created");
            self.project_detail(&db_tx, project).await
        })
    }

    /// Edits the client-editable fields of a project.
    pub async fn update_project(
        &self,
        user_id: &str,
        id: Uuid,
        patch: ProjectPatch,
    ) -> ResultEngine<ProjectDetail> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let current = self.require_project(&db_tx, shop.id, id).await?;
            let mut model: projects::ActiveModel = current.into();

            if let Some(name) = patch.name.as_deref() {
                model.name = ActiveValue::Set(normalize_required_name(name, "project")?);
            }
            if let Some(template_id) = patch.template_id {
                self.require_template(&db_tx, shop.id, template_id).await?;
                model.template_id = ActiveValue::Set(Some(template_id));
            }
            if let Some(customer_id) = patch.customer_id {
                if let Some(customer_id) = customer_id {
                    self.require_customer(&db_tx, shop.id, customer_id).await?;
                }
                model.customer_id = ActiveValue::Set(customer_id);
            }
            if let Some(quantity) = patch.quantity {
                model.quantity = ActiveValue::Set(ensure_positive_quantity(quantity)?);
            }
            if let Some(due_date) = patch.due_date {
                model.due_date = ActiveValue::Set(due_date);
            }
            if let Some(hours) = patch.estimated_hours {
                model.estimated_hours =
                    ActiveValue::Set(hours.non_negative("estimated_hours")?.minor());
            }
            if let Some(hours) = patch.actual_hours {
                let hours = hours.map(|h| h.non_negative("actual_hours")).transpose()?;
                model.actual_hours = ActiveValue::Set(hours.map(Hours::minor));
            }
            if let Some(price) = patch.expected_price {
                let price = price.map(|p| p.non_negative("expected_price")).transpose()?;
                model.expected_price_minor = ActiveValue::Set(price.map(Money::minor));
            }
            if let Some(notes) = patch.notes.as_deref() {
                model.notes = ActiveValue::Set(normalize_text(notes));
            }
            model.updated_at = ActiveValue::Set(Utc::now());
            let project = model.update(&db_tx).await?;
            self.project_detail(&db_tx, project).await
        })
    }

    /// Deletes a project with its stage history and work logs. Sales keep
    /// their row with the project link cleared.
    pub async fn delete_project(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_project(&db_tx, shop.id, id).await?;

            sales::Entity::update_many()
                .col_expr(sales::Column::ProjectId, Expr::value(Option::<Uuid>::None))
                .filter(sales::Column::ProjectId.eq(id))
                .exec(&db_tx)
                .await?;
            project_stage_history::Entity::delete_many()
                .filter(project_stage_history::Column::ProjectId.eq(id))
                .exec(&db_tx)
                .await?;
            work_logs::Entity::delete_many()
                .filter(work_logs::Column::ProjectId.eq(id))
                .exec(&db_tx)
                .await?;
            projects::Entity::delete_by_id(id).exec(&db_tx).await?;
            tracing::info!(project_id = %id, "project deleted");
            Ok(())
        })
    }

    /// Moves an active project to another stage of its own workflow.
    ///
    /// Moving to the current stage is a no-op: no history row and
    /// `updated_at` is left untouched.
    pub async fn move_project(
        &self,
        user_id: &str,
        id: Uuid,
        stage_id: Uuid,
    ) -> ResultEngine<ProjectDetail> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let project = self.require_project(&db_tx, shop.id, id).await?;

            if project.project_status()? != ProjectStatus::Active {
                tracing::warn!(project_id = %id, status = %project.status, "move rejected");
                return Err(EngineError::InvalidTransition(
                    "Only active projects can be moved.".to_string(),
                ));
            }
            let target = workflow_stages::Entity::find_by_id(stage_id)
                .filter(workflow_stages::Column::WorkflowId.eq(project.workflow_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::InvalidInput(
                        "Target stage does not exist for this workflow.".to_string(),
                    )
                })?;

            if project.current_stage_id == target.id {
                return self.project_detail(&db_tx, project).await;
            }

            let mut model: projects::ActiveModel = project.into();
            model.current_stage_id = ActiveValue::Set(target.id);
            model.updated_at = ActiveValue::Set(Utc::now());
            let project = model.update(&db_tx).await?;
            record_stage_entry(&db_tx, id, target.id).await?;

            tracing::info!(project_id = %id, stage = %target.name, "project moved");
            self.project_detail(&db_tx, project).await
        })
    }

    /// Cancels an active project, remembering the stage it was in.
    ///
    /// Notes are appended to the existing ones, never replace them.
    pub async fn cancel_project(
        &self,
        user_id: &str,
        id: Uuid,
        cmd: CancelCmd,
    ) -> ResultEngine<ProjectDetail> {
        if let Some(price) = cmd.expected_price {
            price.non_negative("expected_price")?;
        }
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let project = self.require_project(&db_tx, shop.id, id).await?;

            if project.project_status()? != ProjectStatus::Active {
                tracing::warn!(project_id = %id, status = %project.status, "cancel rejected");
                return Err(EngineError::InvalidTransition(
                    "Only active projects can be cancelled.".to_string(),
                ));
            }

            let now = Utc::now();
            let notes = match normalize_optional_text(cmd.notes.as_deref()) {
                Some(note) => append_note(&project.notes, &format!("Cancellation note: {note}")),
                None => project.notes.clone(),
            };
            let stage_id = project.current_stage_id;

            let mut model: projects::ActiveModel = project.into();
            if let Some(price) = cmd.expected_price {
                model.expected_price_minor = ActiveValue::Set(Some(price.minor()));
            }
            if let Some(reason) = normalize_optional_text(cmd.reason.as_deref()) {
                model.cancel_reason = ActiveValue::Set(reason);
            }
            model.notes = ActiveValue::Set(notes);
            model.status = ActiveValue::Set(ProjectStatus::Cancelled.as_str().to_string());
            model.cancel_stage_id = ActiveValue::Set(Some(stage_id));
            model.cancelled_at = ActiveValue::Set(Some(now));
            model.updated_at = ActiveValue::Set(now);
            let project = model.update(&db_tx).await?;

            tracing::info!(project_id = %id, "project cancelled");
            self.project_detail(&db_tx, project).await
        })
    }

    /// Records the sale of an active project and completes it, atomically.
    ///
    /// Neither the stage nor `completed_at` change.
    pub async fn log_sale(
        &self,
        user_id: &str,
        id: Uuid,
        cmd: LogSaleCmd,
    ) -> ResultEngine<SaleLogged> {
        let price = cmd.price.non_negative("price")?;
        let fees = cmd.fees.map(|v| v.non_negative("fees")).transpose()?;
        let platform_fees = cmd
            .platform_fees
            .map(|v| v.non_negative("platform_fees"))
            .transpose()?;
        let shipping_cost = cmd
            .shipping_cost
            .map(|v| v.non_negative("shipping_cost"))
            .transpose()?;
        let tax_amount = cmd
            .tax_amount
            .map(|v| v.non_negative("tax_amount"))
            .transpose()?;
        let cost_of_goods = cmd
            .cost_of_goods
            .map(|v| v.non_negative("cost_of_goods"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let project = self.require_project(&db_tx, shop.id, id).await?;

            if project.project_status()? != ProjectStatus::Active {
                tracing::warn!(project_id = %id, status = %project.status, "log_sale rejected");
                return Err(EngineError::InvalidTransition(
                    "Only active projects can log a sale.".to_string(),
                ));
            }

            let now = Utc::now();
            let sale = sales::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                shop_id: ActiveValue::Set(shop.id),
                project_id: ActiveValue::Set(Some(project.id)),
                template_id: ActiveValue::Set(project.template_id),
                customer_id: ActiveValue::Set(project.customer_id),
                channel: ActiveValue::Set(cmd.channel.as_str().to_string()),
                price_minor: ActiveValue::Set(price.minor()),
                fees_minor: ActiveValue::Set(fees.map(Money::minor)),
                currency: ActiveValue::Set(project.expected_currency.clone()),
                sold_at: ActiveValue::Set(cmd.sold_at.unwrap_or(now)),
                notes: ActiveValue::Set(normalize_text(cmd.notes.as_deref().unwrap_or_default())),
                cost_of_goods_minor: ActiveValue::Set(cost_of_goods.map(Money::minor)),
                gross_margin_minor: ActiveValue::Set(
                    cost_of_goods.map(|cogs| (price - cogs).minor()),
                ),
                platform_fees_minor: ActiveValue::Set(platform_fees.map(Money::minor)),
                shipping_cost_minor: ActiveValue::Set(shipping_cost.map(Money::minor)),
                tax_amount_minor: ActiveValue::Set(tax_amount.map(Money::minor)),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            let sale = sale.insert(&db_tx).await?;

            let mut model: projects::ActiveModel = project.into();
            model.status = ActiveValue::Set(ProjectStatus::Completed.as_str().to_string());
            model.updated_at = ActiveValue::Set(now);
            let project = model.update(&db_tx).await?;

            tracing::info!(project_id = %id, sale_id = %sale.id, price = %price, "sale logged");
            let project = self.project_detail(&db_tx, project).await?;
            Ok(SaleLogged { project, sale })
        })
    }

    /// Stage history of a project, oldest first.
    pub async fn project_history(&self, user_id: &str, id: Uuid) -> ResultEngine<Vec<StageEntry>> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_project(&db_tx, shop.id, id).await?;
            let rows = project_stage_history::Entity::find()
                .filter(project_stage_history::Column::ProjectId.eq(id))
                .order_by_asc(project_stage_history::Column::EnteredAt)
                .all(&db_tx)
                .await?;
            let stage_ids: BTreeSet<Uuid> = rows.iter().map(|r| r.stage_id).collect();
            let names = stage_names(&db_tx, stage_ids).await?;
            Ok(rows
                .into_iter()
                .map(|entry| StageEntry {
                    stage_name: names.get(&entry.stage_id).cloned().unwrap_or_default(),
                    entry,
                })
                .collect())
        })
    }

    /// Work logs of a project ordered by start time.
    pub async fn work_logs(&self, user_id: &str, id: Uuid) -> ResultEngine<Vec<work_logs::Model>> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_project(&db_tx, shop.id, id).await?;
            Ok(work_logs::Entity::find()
                .filter(work_logs::Column::ProjectId.eq(id))
                .order_by_asc(work_logs::Column::StartedAt)
                .all(&db_tx)
                .await?)
        })
    }

    /// Adds a time entry. Entries may overlap.
    pub async fn add_work_log(
        &self,
        user_id: &str,
        id: Uuid,
        input: WorkLogInput,
    ) -> ResultEngine<work_logs::Model> {
        if input.ended_at < input.started_at {
            return Err(EngineError::InvalidInput(
                "ended_at must not be before started_at".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let project = self.require_project(&db_tx, shop.id, id).await?;
            if let Some(stage_id) = input.stage_id {
                match self
                    .require_stage_in_workflow(&db_tx, project.workflow_id, stage_id)
                    .await
                {
                    Err(EngineError::KeyNotFound(_)) => {
                        return Err(EngineError::InvalidInput(
                            "stage does not belong to the project's workflow".to_string(),
                        ));
                    }
                    other => other?,
                };
            }
            let now = Utc::now();
            let model = work_logs::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                project_id: ActiveValue::Set(id),
                stage_id: ActiveValue::Set(input.stage_id),
                started_at: ActiveValue::Set(input.started_at),
                ended_at: ActiveValue::Set(input.ended_at),
                notes: ActiveValue::Set(normalize_text(input.notes.as_deref().unwrap_or_default())),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            Ok(model.insert(&db_tx).await?)
        })
    }

    async fn project_detail(
        &self,
        db: &DatabaseTransaction,
        project: projects::Model,
    ) -> ResultEngine<ProjectDetail> {
        let mut details = self.project_details(db, vec![project]).await?;
        details
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound("project not found".to_string()))
    }

    /// Attaches template, customer, workflow and stage names to `rows`,
    /// preserving their order.
    pub(super) async fn project_details(
        &self,
        db: &DatabaseTransaction,
        rows: Vec<projects::Model>,
    ) -> ResultEngine<Vec<ProjectDetail>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let template_ids: BTreeSet<Uuid> = rows.iter().filter_map(|p| p.template_id).collect();
        let customer_ids: BTreeSet<Uuid> = rows.iter().filter_map(|p| p.customer_id).collect();
        let workflow_ids: BTreeSet<Uuid> = rows.iter().map(|p| p.workflow_id).collect();
        let stage_ids: BTreeSet<Uuid> = rows.iter().map(|p| p.current_stage_id).collect();

        let templates: HashMap<Uuid, String> = product_templates::Entity::find()
            .filter(product_templates::Column::Id.is_in(template_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();
        let customers: HashMap<Uuid, String> = customers::Entity::find()
            .filter(customers::Column::Id.is_in(customer_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let workflows: HashMap<Uuid, String> = workflows::Entity::find()
            .filter(workflows::Column::Id.is_in(workflow_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|w| (w.id, w.name))
            .collect();
        let stages = stage_names(db, stage_ids).await?;

        Ok(rows
            .into_iter()
            .map(|project| ProjectDetail {
                template_name: project.template_id.and_then(|id| templates.get(&id).cloned()),
                customer_name: project.customer_id.and_then(|id| customers.get(&id).cloned()),
                workflow_name: workflows.get(&project.workflow_id).cloned().unwrap_or_default(),
                current_stage_name: stages
                    .get(&project.current_stage_id)
                    .cloned()
                    .unwrap_or_default(),
                project,
            })
            .collect())
    }
}

async fn record_stage_entry(
    db: &DatabaseTransaction,
    project_id: Uuid,
    stage_id: Uuid,
) -> ResultEngine<()> {
    let entry = project_stage_history::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        project_id: ActiveValue::Set(project_id),
        stage_id: ActiveValue::Set(stage_id),
        entered_at: ActiveValue::Set(Utc::now()),
    };
    entry.insert(db).await?;
    Ok(())
}

async fn stage_names(
    db: &DatabaseTransaction,
    ids: BTreeSet<Uuid>,
) -> ResultEngine<HashMap<Uuid, String>> {
    Ok(workflow_stages::Entity::find()
        .filter(workflow_stages::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect())
}
