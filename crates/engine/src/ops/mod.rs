use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine};

mod customers;
mod insights;
mod inventory;
mod projects;
mod sales;
mod search;
mod templates;
mod tenancy;
mod workflows;

pub use customers::{CustomerListFilter, CustomerWithMetrics};
pub use insights::{InsightsSummary, ProjectCounts};
pub use projects::{ProjectDetail, ProjectListFilter, SaleLogged, StageEntry};
pub use sales::SaleListFilter;
pub use templates::{BomLine, TemplateDetail};
pub use tenancy::Me;
pub use workflows::{BoardColumn, WorkflowWithStages};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Trimmed text for non-null columns where empty is a valid value.
fn normalize_text(value: &str) -> String {
    value.trim().to_string()
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
