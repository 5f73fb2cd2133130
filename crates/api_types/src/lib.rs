use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use uuid::Uuid;

/// Decimal amount on the wire.
///
/// Serialized as a canonical string (`"200.00"`). Requests may send either a
/// string or a JSON number; the server parses the text into fixed-point
/// values and rejects anything that is not a plain decimal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Decimal(pub String);

impl Decimal {
    /// Wraps the display form of a fixed-point value.
    pub fn new(value: impl fmt::Display) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Decimal {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DecimalVisitor;

        impl de::Visitor<'_> for DecimalVisitor {
            type Value = Decimal;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal number or string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
                Ok(Decimal(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
                Ok(Decimal(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
                Ok(Decimal(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
                Ok(Decimal(v.to_string()))
            }
        }

        deserializer.deserialize_any(DecimalVisitor)
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) on nullable columns. Use with `#[serde(default)]`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
        pub message: String,
    }
}

pub mod shop {
    use super::*;

    /// Create or partially update the caller's shop.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ShopUpsert {
        pub name: Option<String>,
        pub contact_email: Option<String>,
        pub contact_phone: Option<String>,
        pub address_line1: Option<String>,
        pub address_line2: Option<String>,
        pub city: Option<String>,
        pub state: Option<String>,
        pub postal_code: Option<String>,
        pub country: Option<String>,
        pub website_url: Option<String>,
        pub instagram_handle: Option<String>,
        pub facebook_handle: Option<String>,
        pub timezone: Option<String>,
        pub currency: Option<String>,
        pub default_units: Option<String>,
        pub default_hourly_rate: Option<Decimal>,
        pub default_markup_pct: Option<Decimal>,
        pub default_payment_terms: Option<String>,
        pub default_project_type: Option<String>,
        /// `light`, `dark` or `system`.
        pub theme: Option<String>,
        pub tagline: Option<String>,
        pub description: Option<String>,
        pub shipping_zones_config: Option<serde_json::Value>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShopView {
        pub id: Uuid,
        pub name: String,
        pub contact_email: Option<String>,
        pub contact_phone: Option<String>,
        pub address_line1: Option<String>,
        pub address_line2: Option<String>,
        pub city: Option<String>,
        pub state: Option<String>,
        pub postal_code: Option<String>,
        pub country: String,
        pub website_url: Option<String>,
        pub instagram_handle: Option<String>,
        pub facebook_handle: Option<String>,
        pub timezone: String,
        pub currency: String,
        pub default_units: String,
        pub default_hourly_rate: Decimal,
        pub default_markup_pct: Decimal,
        pub default_payment_terms: String,
        pub default_project_type: Option<String>,
        pub theme: String,
        pub tagline: Option<String>,
        pub description: String,
        pub shipping_zones_config: serde_json::Value,
        pub joined_at: Option<DateTime<Utc>>,
        pub last_active_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShopSummary {
        pub id: Uuid,
        pub name: String,
        pub currency: String,
        pub timezone: String,
    }

    /// Identity of the authenticated caller.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Me {
        pub username: String,
        pub email: Option<String>,
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub shop: Option<ShopSummary>,
    }
}

pub mod customer {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CustomerUpsert {
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub channel: Option<String>,
        pub notes: Option<String>,
        pub address_line1: Option<String>,
        pub address_line2: Option<String>,
        pub city: Option<String>,
        pub state: Option<String>,
        pub postal_code: Option<String>,
        pub country: Option<String>,
        pub is_active: Option<bool>,
        pub is_vip: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CustomerListQuery {
        pub include_inactive: Option<bool>,
    }

    /// A customer with metrics derived from its projects and sales.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CustomerView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub phone: String,
        pub channel: String,
        pub notes: String,
        pub address_line1: String,
        pub address_line2: String,
        pub city: String,
        pub state: String,
        pub postal_code: String,
        pub country: String,
        pub is_active: bool,
        pub is_vip: bool,
        pub total_projects: u64,
        pub total_products: u64,
        pub total_sales: u64,
        pub lifetime_revenue: Decimal,
        pub completed_projects: u64,
        pub projects_this_year: u64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod inventory {
    use super::*;

    /// `?purge=true` turns a delete into a hard delete.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DeleteQuery {
        pub purge: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MaterialUpsert {
        pub name: Option<String>,
        pub category: Option<String>,
        pub unit: Option<String>,
        pub quantity: Option<Decimal>,
        pub cost_per_unit: Option<Decimal>,
        pub supplier_name: Option<String>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MaterialView {
        pub id: Uuid,
        pub name: String,
        pub category: String,
        pub unit: String,
        pub quantity: Decimal,
        pub cost_per_unit: Decimal,
        pub supplier_name: String,
        pub notes: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ConsumableUpsert {
        pub name: Option<String>,
        pub unit: Option<String>,
        pub cost_per_unit: Option<Decimal>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub quantity: Option<Option<Decimal>>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConsumableView {
        pub id: Uuid,
        pub name: String,
        pub unit: String,
        pub cost_per_unit: Decimal,
        pub quantity: Option<Decimal>,
        pub notes: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EquipmentUpsert {
        pub name: Option<String>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub purchase_date: Option<Option<NaiveDate>>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub purchase_cost: Option<Option<Decimal>>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EquipmentView {
        pub id: Uuid,
        pub name: String,
        pub purchase_date: Option<NaiveDate>,
        pub purchase_cost: Option<Decimal>,
        pub notes: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod template {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BomItemNew {
        pub material_id: Uuid,
        pub quantity: Decimal,
        /// Defaults to the material's unit.
        pub unit: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BomItemView {
        pub id: Uuid,
        pub material_id: Uuid,
        pub material_name: String,
        pub quantity: Decimal,
        pub unit: String,
    }

    /// `bom` and `equipment_ids` replace the current lists when present.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TemplateUpsert {
        pub name: Option<String>,
        pub description: Option<String>,
        pub category: Option<String>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub workflow_id: Option<Option<Uuid>>,
        pub estimated_labor_hours: Option<Decimal>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub hourly_rate: Option<Option<Decimal>>,
        pub estimated_consumables_cost: Option<Decimal>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub base_price: Option<Option<Decimal>>,
        pub bom: Option<Vec<BomItemNew>>,
        pub equipment_ids: Option<Vec<Uuid>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateView {
        pub id: Uuid,
        pub name: String,
        pub description: String,
        pub category: String,
        pub workflow_id: Option<Uuid>,
        pub estimated_labor_hours: Decimal,
        pub hourly_rate: Option<Decimal>,
        pub estimated_consumables_cost: Decimal,
        pub average_material_cost: Option<Decimal>,
        pub average_consumable_cost: Option<Decimal>,
        pub base_price: Option<Decimal>,
        pub bom: Vec<BomItemView>,
        pub equipment_ids: Vec<Uuid>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod workflow {
    use super::*;
    use crate::project::ProjectView;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StageUpsert {
        pub name: Option<String>,
        /// Position within the workflow, unique per workflow.
        pub order: Option<i32>,
        pub role: Option<String>,
        /// Semantic key such as `idea`, `build` or `completed`.
        pub key: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StageView {
        pub id: Uuid,
        pub workflow_id: Uuid,
        pub name: String,
        pub order: i32,
        pub role: String,
        pub key: String,
    }

    /// `stages` is only read on create.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct WorkflowUpsert {
        pub name: Option<String>,
        pub description: Option<String>,
        pub is_default: Option<bool>,
        pub is_active: Option<bool>,
        pub stages: Option<Vec<StageUpsert>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WorkflowView {
        pub id: Uuid,
        pub name: String,
        pub description: String,
        pub is_default: bool,
        pub is_active: bool,
        pub stages: Vec<StageView>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BoardColumn {
        pub stage: StageView,
        pub projects: Vec<ProjectView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Board {
        pub workflow_id: Uuid,
        pub columns: Vec<BoardColumn>,
    }
}

pub mod project {
    use super::*;
    use crate::sale::SaleView;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProjectListQuery {
        /// `active`, `completed` or `cancelled`.
        pub status: Option<String>,
        pub customer: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProjectNew {
        pub template_id: Option<Uuid>,
        pub customer_id: Option<Uuid>,
        pub name: Option<String>,
        pub quantity: Option<i32>,
        pub due_date: Option<NaiveDate>,
        pub estimated_hours: Option<Decimal>,
        pub expected_price: Option<Decimal>,
        pub notes: Option<String>,
    }

    /// Editable project fields. Workflow, stage and status only change
    /// through `move`, `cancel` and `log_sale`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProjectPatch {
        pub name: Option<String>,
        pub template_id: Option<Uuid>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub customer_id: Option<Option<Uuid>>,
        pub quantity: Option<i32>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub due_date: Option<Option<NaiveDate>>,
        pub estimated_hours: Option<Decimal>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub actual_hours: Option<Option<Decimal>>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub expected_price: Option<Option<Decimal>>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectView {
        pub id: Uuid,
        pub name: String,
        pub template_id: Option<Uuid>,
        pub template_name: Option<String>,
        pub customer_id: Option<Uuid>,
        pub customer_name: Option<String>,
        pub workflow_id: Uuid,
        pub workflow_name: String,
        pub current_stage_id: Uuid,
        pub current_stage_name: String,
        pub status: String,
        pub quantity: i32,
        pub due_date: Option<NaiveDate>,
        pub estimated_hours: Decimal,
        pub actual_hours: Option<Decimal>,
        pub expected_price: Option<Decimal>,
        pub expected_currency: String,
        pub quoted_at: Option<DateTime<Utc>>,
        pub confirmed_at: Option<DateTime<Utc>>,
        pub started_at: Option<DateTime<Utc>>,
        pub completed_at: Option<DateTime<Utc>>,
        pub cancel_reason: String,
        pub cancel_stage_id: Option<Uuid>,
        pub cancelled_at: Option<DateTime<Utc>>,
        pub notes: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MoveProject {
        pub stage_id: Uuid,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CancelProject {
        pub reason: Option<String>,
        pub notes: Option<String>,
        pub expected_price: Option<Decimal>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LogSale {
        pub price: Option<Decimal>,
        pub channel: Option<String>,
        pub fees: Option<Decimal>,
        pub sold_at: Option<DateTime<Utc>>,
        pub notes: Option<String>,
        pub platform_fees: Option<Decimal>,
        pub shipping_cost: Option<Decimal>,
        pub tax_amount: Option<Decimal>,
        pub cost_of_goods: Option<Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SaleLogged {
        pub project: ProjectView,
        pub sale: SaleView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StageHistoryView {
        pub id: Uuid,
        pub stage_id: Uuid,
        pub stage_name: String,
        pub entered_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WorkLogNew {
        pub stage_id: Option<Uuid>,
        pub started_at: DateTime<Utc>,
        pub ended_at: DateTime<Utc>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WorkLogView {
        pub id: Uuid,
        pub stage_id: Option<Uuid>,
        pub started_at: DateTime<Utc>,
        pub ended_at: DateTime<Utc>,
        pub notes: String,
    }
}

pub mod sale {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SaleListQuery {
        pub channel: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SaleView {
        pub id: Uuid,
        pub project_id: Option<Uuid>,
        pub template_id: Option<Uuid>,
        pub customer_id: Option<Uuid>,
        pub channel: String,
        pub price: Decimal,
        pub fees: Option<Decimal>,
        pub currency: String,
        pub sold_at: DateTime<Utc>,
        pub notes: String,
        pub cost_of_goods: Option<Decimal>,
        pub gross_margin: Option<Decimal>,
        pub platform_fees: Option<Decimal>,
        pub shipping_cost: Option<Decimal>,
        pub tax_amount: Option<Decimal>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod insights {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectCounts {
        pub active: u64,
        pub completed: u64,
        pub cancelled: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CostsAndMargins {
        pub total_cost_of_goods: Decimal,
        pub total_gross_margin: Decimal,
        pub total_platform_fees: Decimal,
        pub total_shipping_cost: Decimal,
        pub total_tax_amount: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Summary {
        pub currency: String,
        pub total_revenue: Decimal,
        pub total_fees: Decimal,
        pub net_revenue: Decimal,
        pub lost_revenue: Decimal,
        pub project_counts: ProjectCounts,
        pub costs_and_margins: CostsAndMargins,
    }
}

pub mod search {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SearchParams {
        pub q: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SearchResult {
        #[serde(rename = "type")]
        pub kind: String,
        pub id: Uuid,
        pub label: String,
        pub subtitle: String,
        pub url: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SearchResponse {
        pub results: Vec<SearchResult>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        amount: Decimal,
        #[serde(default, deserialize_with = "nullable")]
        cleared: Option<Option<Decimal>>,
        #[serde(default, deserialize_with = "nullable")]
        untouched: Option<Option<Decimal>>,
    }

    #[test]
    fn decimal_accepts_strings_and_numbers() {
        let w: Wrapper = serde_json::from_str(r#"{"amount": "12.50", "cleared": null}"#).unwrap();
        assert_eq!(w.amount.as_str(), "12.50");
        assert_eq!(w.cleared, Some(None));
        assert_eq!(w.untouched, None);

        let w: Wrapper = serde_json::from_str(r#"{"amount": 7}"#).unwrap();
        assert_eq!(w.amount.as_str(), "7");
        let w: Wrapper = serde_json::from_str(r#"{"amount": 7.25}"#).unwrap();
        assert_eq!(w.amount.as_str(), "7.25");
    }

    #[test]
    fn decimal_serializes_as_string() {
        let json = serde_json::to_string(&Decimal::from("200.00")).unwrap();
        assert_eq!(json, r#""200.00""#);
    }
}
