//! Ordered steps of a workflow.
//!
//! `key` is the semantic tag business rules look at ("idea", "completed",
//! "cancelled", ...). It never drives `Project::status` by itself.

use sea_orm::entity::prelude::*;

pub const KEY_COMPLETED: &str = "completed";
pub const KEY_CANCELLED: &str = "cancelled";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "workflow_stages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub name: String,
    /// Position inside the workflow, unique per workflow.
    pub position: i32,
    pub role: String,
    pub key: String,
}

impl Model {
    /// Stages whose key marks the end of the pipeline.
    pub fn is_terminal(&self) -> bool {
        matches!(self.key.as_str(), KEY_COMPLETED | KEY_CANCELLED)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workflows::Entity",
        from = "Column::WorkflowId",
        to = "super::workflows::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Workflow,
}

impl Related<super::workflows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workflow.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
