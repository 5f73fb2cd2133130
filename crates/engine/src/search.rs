//! Search intent parser.
//!
//! A query string is split on whitespace into:
//!
//! - an optional scope prefix on the first token (`customer:`, `project:`,
//!   `material:`, `consumable:`, `equipment:`), which limits the search to
//!   one entity type; the rest of that token joins the free text
//! - filters: `status:<s>`, `stage:<s>`, `due:today|overdue`, `tag:<s>`,
//!   `price<op><amount>` with `<op>` one of `<`, `<=`, `>`, `>=`, `=`
//! - everything else, which forms the free text
//!
//! `status`, `stage`, `due` and `price` only make sense for projects; when
//! any of them is present an unscoped query searches projects only. `tag`
//! matches the template category of projects and the category of
//! materials. A scoped query carrying a filter its entity type cannot
//! honour is rejected.

use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, Money, ProjectStatus, ResultEngine};

/// Maximum hits returned per entity type.
pub(crate) const PER_TYPE_LIMIT: u64 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchScope {
    #[default]
    All,
    Customers,
    Projects,
    Materials,
    Consumables,
    Equipment,
}

impl SearchScope {
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "customer" | "customers" => Some(Self::Customers),
            "project" | "projects" => Some(Self::Projects),
            "material" | "materials" => Some(Self::Materials),
            "consumable" | "consumables" => Some(Self::Consumables),
            "equipment" => Some(Self::Equipment),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Customers => "customer",
            Self::Projects => "project",
            Self::Materials => "material",
            Self::Consumables => "consumable",
            Self::Equipment => "equipment",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DueFilter {
    Today,
    Overdue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceFilter {
    pub op: PriceOp,
    pub amount: Money,
}

impl PriceFilter {
    pub fn matches(&self, value: Money) -> bool {
        match self.op {
            PriceOp::Lt => value < self.amount,
            PriceOp::Le => value <= self.amount,
            PriceOp::Gt => value > self.amount,
            PriceOp::Ge => value >= self.amount,
            PriceOp::Eq => value == self.amount,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub status: Option<ProjectStatus>,
    pub stage: Option<String>,
    pub due: Option<DueFilter>,
    pub tag: Option<String>,
    pub price: Option<PriceFilter>,
}

impl SearchFilters {
    fn project_only(&self) -> bool {
        self.status.is_some() || self.stage.is_some() || self.due.is_some() || self.price.is_some()
    }

    fn is_empty(&self) -> bool {
        !self.project_only() && self.tag.is_none()
    }

    /// First filter the searcher for `scope` does not support.
    fn unsupported_by(&self, scope: SearchScope) -> Option<&'static str> {
        if scope == SearchScope::All || scope == SearchScope::Projects {
            return None;
        }
        let present = [
            ("status", self.status.is_some()),
            ("stage", self.stage.is_some()),
            ("due", self.due.is_some()),
            ("price", self.price.is_some()),
            ("tag", self.tag.is_some() && scope != SearchScope::Materials),
        ];
        present
            .into_iter()
            .find_map(|(name, set)| set.then_some(name))
    }
}

/// Parsed search intent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub scope: SearchScope,
    pub text: String,
    pub filters: SearchFilters,
}

impl SearchQuery {
    pub fn parse(input: &str) -> ResultEngine<Self> {
        let mut query = SearchQuery::default();
        let mut words: Vec<&str> = Vec::new();

        for (index, token) in input.split_whitespace().enumerate() {
            if index == 0
                && let Some((prefix, rest)) = token.split_once(':')
                && let Some(scope) = SearchScope::from_prefix(&prefix.to_ascii_lowercase())
            {
                query.scope = scope;
                if !rest.is_empty() {
                    words.push(rest);
                }
                continue;
            }

            if !query.apply_filter(token)? {
                words.push(token);
            }
        }

        if let Some(filter) = query.filters.unsupported_by(query.scope) {
            return Err(EngineError::InvalidInput(format!(
                "{filter} filter does not apply to {} search",
                query.scope.label()
            )));
        }

        query.text = words.join(" ");
        Ok(query)
    }

    /// Consumes `token` if it is a filter. Returns `false` for plain text.
    fn apply_filter(&mut self, token: &str) -> ResultEngine<bool> {
        let lower = token.to_ascii_lowercase();

        if let Some(rest) = lower.strip_prefix("price") {
            let (op, amount) = if let Some(v) = rest.strip_prefix("<=") {
                (PriceOp::Le, v)
            } else if let Some(v) = rest.strip_prefix(">=") {
                (PriceOp::Ge, v)
            } else if let Some(v) = rest.strip_prefix('<') {
                (PriceOp::Lt, v)
            } else if let Some(v) = rest.strip_prefix('>') {
                (PriceOp::Gt, v)
            } else if let Some(v) = rest.strip_prefix('=') {
                (PriceOp::Eq, v)
            } else {
                return Ok(false);
            };
            let amount = Money::parse_field(amount, "price filter")?;
            self.filters.price = Some(PriceFilter { op, amount });
            return Ok(true);
        }

        let Some((key, value)) = token.split_once(':') else {
            return Ok(false);
        };
        if value.is_empty() {
            return Ok(false);
        }
        match key.to_ascii_lowercase().as_str() {
            "status" => {
                let status = ProjectStatus::try_from(value.to_ascii_lowercase().as_str())?;
                self.filters.status = Some(status);
            }
            "stage" => self.filters.stage = Some(value.to_string()),
            "tag" => self.filters.tag = Some(value.to_string()),
            "due" => {
                let due = match value.to_ascii_lowercase().as_str() {
                    "today" => DueFilter::Today,
                    "overdue" => DueFilter::Overdue,
                    other => {
                        return Err(EngineError::InvalidInput(format!(
                            "invalid due filter: {other} (expected today or overdue)"
                        )));
                    }
                };
                self.filters.due = Some(due);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// A query with neither text nor filters matches nothing.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.filters.is_empty()
    }

    /// Whether the searcher for `target` runs for this query.
    pub fn searches(&self, target: SearchScope) -> bool {
        if self.scope != SearchScope::All {
            return self.scope == target;
        }
        if self.filters.project_only() {
            return target == SearchScope::Projects;
        }
        if self.filters.tag.is_some() {
            return matches!(target, SearchScope::Projects | SearchScope::Materials);
        }
        true
    }
}

/// One search result, uniform across entity types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: Uuid,
    pub label: String,
    pub subtitle: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_searches_everything() {
        let query = SearchQuery::parse("  walnut   board ").unwrap();
        assert_eq!(query.scope, SearchScope::All);
        assert_eq!(query.text, "walnut board");
        assert!(query.filters.is_empty());
        assert!(query.searches(SearchScope::Customers));
        assert!(query.searches(SearchScope::Equipment));
    }

    #[test]
    fn scope_prefix_limits_entity_type() {
        let query = SearchQuery::parse("customer:jane doe").unwrap();
        assert_eq!(query.scope, SearchScope::Customers);
        assert_eq!(query.text, "jane doe");
        assert!(query.searches(SearchScope::Customers));
        assert!(!query.searches(SearchScope::Projects));

        let query = SearchQuery::parse("Materials: oak").unwrap();
        assert_eq!(query.scope, SearchScope::Materials);
        assert_eq!(query.text, "oak");
    }

    #[test]
    fn prefix_only_counts_on_first_token() {
        let query = SearchQuery::parse("oak customer:jane").unwrap();
        assert_eq!(query.scope, SearchScope::All);
        assert_eq!(query.text, "oak customer:jane");
    }

    #[test]
    fn filters_are_extracted() {
        let query =
            SearchQuery::parse("table status:active stage:build due:overdue price>=150.5").unwrap();
        assert_eq!(query.text, "table");
        assert_eq!(query.filters.status, Some(ProjectStatus::Active));
        assert_eq!(query.filters.stage.as_deref(), Some("build"));
        assert_eq!(query.filters.due, Some(DueFilter::Overdue));
        assert_eq!(
            query.filters.price,
            Some(PriceFilter {
                op: PriceOp::Ge,
                amount: Money::new(15050),
            })
        );
        assert!(query.searches(SearchScope::Projects));
        assert!(!query.searches(SearchScope::Customers));
    }

    #[test]
    fn tag_searches_projects_and_materials() {
        let query = SearchQuery::parse("tag:furniture").unwrap();
        assert!(query.text.is_empty());
        assert!(!query.is_empty());
        assert!(query.searches(SearchScope::Projects));
        assert!(query.searches(SearchScope::Materials));
        assert!(!query.searches(SearchScope::Consumables));
    }

    #[test]
    fn bad_filter_values_are_rejected() {
        assert!(SearchQuery::parse("status:archived").is_err());
        assert!(SearchQuery::parse("due:tomorrow").is_err());
        assert!(SearchQuery::parse("price<cheap").is_err());
    }

    #[test]
    fn scoped_query_rejects_foreign_filters() {
        let err = SearchQuery::parse("customer: status:cancelled").unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidInput(
                "status filter does not apply to customer search".to_string()
            )
        );
        assert!(SearchQuery::parse("equipment:saw price<10").is_err());
        assert!(SearchQuery::parse("consumable:glue tag:finishing").is_err());

        let query = SearchQuery::parse("material:oak tag:hardwood").unwrap();
        assert_eq!(query.filters.tag.as_deref(), Some("hardwood"));
        assert!(SearchQuery::parse("project:table status:active due:today").is_ok());
    }

    #[test]
    fn unknown_keys_stay_in_text() {
        let query = SearchQuery::parse("color:red pricey").unwrap();
        assert_eq!(query.text, "color:red pricey");
        assert!(query.filters.is_empty());
    }

    #[test]
    fn price_ops_compare() {
        let filter = PriceFilter {
            op: PriceOp::Lt,
            amount: Money::whole(100),
        };
        assert!(filter.matches(Money::whole(99)));
        assert!(!filter.matches(Money::whole(100)));
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(SearchQuery::parse("   ").unwrap().is_empty());
    }
}
