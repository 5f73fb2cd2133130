//! Command structs for engine operations.
//!
//! Create and update share one input type per resource: every field is
//! optional and `None` means "leave as is" on update or "use the default"
//! on create. `Option<Option<T>>` marks nullable columns, where
//! `Some(None)` clears the value.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{Hours, Money, Percent, Quantity, SaleChannel, Theme};

/// Shop profile and preferences.
#[derive(Clone, Debug, Default)]
pub struct ShopInput {
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
    pub default_hourly_rate: Option<Money>,
    pub default_markup_pct: Option<Percent>,
    pub default_payment_terms: Option<String>,
    pub default_project_type: Option<String>,
    pub theme: Option<Theme>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub shipping_zones_config: Option<serde_json::Value>,
}

impl ShopInput {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    #[must_use]
    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct CustomerInput {
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

impl CustomerInput {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MaterialInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<Quantity>,
    pub cost_per_unit: Option<Money>,
    pub supplier_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ConsumableInput {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub cost_per_unit: Option<Money>,
    pub quantity: Option<Option<Quantity>>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct EquipmentInput {
    pub name: Option<String>,
    pub purchase_date: Option<Option<NaiveDate>>,
    pub purchase_cost: Option<Option<Money>>,
    pub notes: Option<String>,
}

/// One bill-of-materials line. `unit` falls back to the material's unit.
#[derive(Clone, Debug)]
pub struct BomItemInput {
    pub material_id: Uuid,
    pub quantity: Quantity,
    pub unit: Option<String>,
}

/// Product template fields.
///
/// `bom` and `equipment_ids` replace the current lines/links wholesale when
/// present.
#[derive(Clone, Debug, Default)]
pub struct TemplateInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub workflow_id: Option<Option<Uuid>>,
    pub estimated_labor_hours: Option<Hours>,
    pub hourly_rate: Option<Option<Money>>,
    pub estimated_consumables_cost: Option<Money>,
    pub base_price: Option<Option<Money>>,
    pub bom: Option<Vec<BomItemInput>>,
    pub equipment_ids: Option<Vec<Uuid>>,
}

#[derive(Clone, Debug, Default)]
pub struct StageInput {
    pub name: Option<String>,
    pub order: Option<i32>,
    pub role: Option<String>,
    pub key: Option<String>,
}

impl StageInput {
    #[must_use]
    pub fn new(name: impl Into<String>, order: i32, key: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            order: Some(order),
            role: None,
            key: Some(key.into()),
        }
    }
}

/// Workflow fields. `stages` is only honoured on create.
#[derive(Clone, Debug, Default)]
pub struct WorkflowInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_default: Option<bool>,
    pub is_active: Option<bool>,
    pub stages: Option<Vec<StageInput>>,
}

/// Create a project from a template. The expected currency always follows
/// the shop currency.
#[derive(Clone, Debug, Default)]
pub struct ProjectInput {
    pub template_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub name: Option<String>,
    pub quantity: Option<i32>,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: Option<Hours>,
    pub expected_price: Option<Money>,
    pub notes: Option<String>,
}

impl ProjectInput {
    #[must_use]
    pub fn from_template(template_id: Uuid) -> Self {
        Self {
            template_id: Some(template_id),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn quantity(mut self, quantity: i32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    #[must_use]
    pub fn customer(mut self, customer_id: Uuid) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Fields a client may edit directly on a project. Workflow, stage,
/// status and lifecycle stamps only change through transitions.
#[derive(Clone, Debug, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub template_id: Option<Uuid>,
    pub customer_id: Option<Option<Uuid>>,
    pub quantity: Option<i32>,
    pub due_date: Option<Option<NaiveDate>>,
    pub estimated_hours: Option<Hours>,
    pub actual_hours: Option<Option<Hours>>,
    pub expected_price: Option<Option<Money>>,
    pub notes: Option<String>,
}

/// Cancel an active project.
#[derive(Clone, Debug, Default)]
pub struct CancelCmd {
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub expected_price: Option<Money>,
}

impl CancelCmd {
    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn expected_price(mut self, price: Money) -> Self {
        self.expected_price = Some(price);
        self
    }
}

/// Record the sale that completes an active project.
#[derive(Clone, Debug)]
pub struct LogSaleCmd {
    pub price: Money,
    pub channel: SaleChannel,
    pub fees: Option<Money>,
    pub sold_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub platform_fees: Option<Money>,
    pub shipping_cost: Option<Money>,
    pub tax_amount: Option<Money>,
    pub cost_of_goods: Option<Money>,
}

impl LogSaleCmd {
    #[must_use]
    pub fn new(price: Money, channel: SaleChannel) -> Self {
        Self {
            price,
            channel,
            fees: None,
            sold_at: None,
            notes: None,
            platform_fees: None,
            shipping_cost: None,
            tax_amount: None,
            cost_of_goods: None,
        }
    }

    #[must_use]
    pub fn fees(mut self, fees: Money) -> Self {
        self.fees = Some(fees);
        self
    }

    #[must_use]
    pub fn sold_at(mut self, sold_at: DateTime<Utc>) -> Self {
        self.sold_at = Some(sold_at);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn cost_of_goods(mut self, cost: Money) -> Self {
        self.cost_of_goods = Some(cost);
        self
    }
}

#[derive(Clone, Debug)]
pub struct WorkLogInput {
    pub stage_id: Option<Uuid>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub notes: Option<String>,
}
