//! ShopOps engine: entities, tenant resolution and every business operation
//! of the shop backend.
//!
//! All operations hang off [`Engine`] and take the authenticated username;
//! the caller's shop is resolved inside the operation's transaction and every
//! query is filtered by it.

pub use commands::{
    BomItemInput, CancelCmd, ConsumableInput, CustomerInput, EquipmentInput, LogSaleCmd,
    MaterialInput, ProjectInput, ProjectPatch, ShopInput, StageInput, TemplateInput,
    WorkLogInput, WorkflowInput,
};
pub use error::EngineError;
pub use money::{Hours, MAX_MINOR, Money, Percent, Quantity};
pub use ops::{
    BoardColumn, BomLine, CustomerListFilter, CustomerWithMetrics, Engine, EngineBuilder,
    InsightsSummary, Me, ProjectCounts, ProjectDetail, ProjectListFilter, SaleListFilter,
    SaleLogged, StageEntry, TemplateDetail, WorkflowWithStages,
};
pub use projects::ProjectStatus;
pub use record_state::RecordState;
pub use sales::SaleChannel;
pub use search::{
    DueFilter, PriceFilter, PriceOp, SearchFilters, SearchHit, SearchQuery, SearchScope,
};
pub use shops::Theme;

pub mod bom_items;
pub mod consumables;
pub mod customers;
pub mod equipment;
pub mod materials;
pub mod product_templates;
pub mod project_stage_history;
pub mod projects;
pub mod sales;
pub mod shops;
pub mod template_equipment;
pub mod users;
pub mod work_logs;
pub mod workflow_stages;
pub mod workflows;

mod commands;
mod error;
mod money;
mod ops;
mod record_state;
mod search;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
