//! Units of work moving through a workflow.
//!
//! `status` is the business lifecycle (active, completed, cancelled). The
//! current stage is the operational position and the two move
//! independently: selling a project completes it without touching its
//! stage, and moving it into a "completed" stage does not complete it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled projects accept no further lifecycle
    /// transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }

    /// The only legal transitions are active -> completed and
    /// active -> cancelled.
    pub fn can_transition(self, to: ProjectStatus) -> bool {
        self == Self::Active && to.is_terminal()
    }
}

impl TryFrom<&str> for ProjectStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidInput(format!(
                "invalid project status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_id: Uuid,
    pub template_id: Option<Uuid>,
    pub workflow_id: Uuid,
    pub current_stage_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub name: String,
    pub quantity: i32,
    pub due_date: Option<Date>,
    pub quoted_at: Option<DateTimeUtc>,
    pub confirmed_at: Option<DateTimeUtc>,
    pub started_at: Option<DateTimeUtc>,
    pub completed_at: Option<DateTimeUtc>,
    /// Hundredths of an hour.
    pub estimated_hours: i64,
    pub actual_hours: Option<i64>,
    pub status: String,
    pub expected_price_minor: Option<i64>,
    pub expected_currency: String,
    pub cancel_reason: String,
    pub cancel_stage_id: Option<Uuid>,
    pub cancelled_at: Option<DateTimeUtc>,
    pub notes: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Stored lifecycle status. A value outside the known set is a storage
    /// fault, never an implicit `active`.
    pub fn project_status(&self) -> Result<ProjectStatus, EngineError> {
        ProjectStatus::try_from(self.status.as_str()).map_err(|_| {
            tracing::warn!(project_id = %self.id, status = %self.status, "unknown stored project status");
            EngineError::Database(DbErr::Type(format!(
                "unknown project status: {}",
                self.status
            )))
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shops::Entity",
        from = "Column::ShopId",
        to = "super::shops::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Shop,
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::workflows::Entity",
        from = "Column::WorkflowId",
        to = "super::workflows::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Workflow,
    #[sea_orm(
        belongs_to = "super::product_templates::Entity",
        from = "Column::TemplateId",
        to = "super::product_templates::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Template,
    #[sea_orm(has_many = "super::project_stage_history::Entity")]
    History,
    #[sea_orm(has_many = "super::work_logs::Entity")]
    WorkLogs,
}

impl Related<super::shops::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shop.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::workflows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workflow.def()
    }
}

impl Related<super::product_templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

impl Related<super::project_stage_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl Related<super::work_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::ProjectStatus;

    #[test]
    fn only_active_projects_transition() {
        use ProjectStatus::*;

        assert!(Active.can_transition(Completed));
        assert!(Active.can_transition(Cancelled));
        assert!(!Active.can_transition(Active));
        assert!(!Completed.can_transition(Cancelled));
        assert!(!Cancelled.can_transition(Completed));
        assert!(!Completed.can_transition(Active));
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            ProjectStatus::Active,
            ProjectStatus::Completed,
            ProjectStatus::Cancelled,
        ] {
            assert_eq!(ProjectStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(ProjectStatus::try_from("archived").is_err());
    }
}
