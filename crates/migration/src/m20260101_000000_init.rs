//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: authentication principals
//! - `shops`: one tenant per user, root of every scoped row
//! - `customers`: people a shop sells to
//! - `materials`, `consumables`, `equipment`: inventory
//! - `workflows`, `workflow_stages`: ordered pipelines per shop
//! - `product_templates`, `template_equipment`, `bom_items`: sellable products
//! - `projects`, `project_stage_history`, `work_logs`: units of work
//! - `sales`: closed transactions

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Email,
    FirstName,
    LastName,
}

#[derive(Iden)]
enum Shops {
    Table,
    Id,
    Owner,
    Name,
    ContactEmail,
    ContactPhone,
    AddressLine1,
    AddressLine2,
    City,
    State,
    PostalCode,
    Country,
    WebsiteUrl,
    InstagramHandle,
    FacebookHandle,
    Timezone,
    Currency,
    DefaultUnits,
    DefaultHourlyRateMinor,
    DefaultMarkupPct,
    DefaultPaymentTerms,
    DefaultProjectType,
    Theme,
    Tagline,
    Description,
    ShippingZonesConfig,
    JoinedAt,
    LastActiveAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Customers {
    Table,
    Id,
    ShopId,
    Name,
    Email,
    Phone,
    Channel,
    Notes,
    AddressLine1,
    AddressLine2,
    City,
    State,
    PostalCode,
    Country,
    IsActive,
    IsVip,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Materials {
    Table,
    Id,
    ShopId,
    Name,
    Category,
    Unit,
    QuantityMilli,
    CostPerUnitMinor,
    SupplierName,
    Notes,
    State,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Consumables {
    Table,
    Id,
    ShopId,
    Name,
    Unit,
    CostPerUnitMinor,
    QuantityMilli,
    Notes,
    State,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Equipment {
    Table,
    Id,
    ShopId,
    Name,
    PurchaseDate,
    PurchaseCostMinor,
    Notes,
    State,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Workflows {
    Table,
    Id,
    ShopId,
    Name,
    Description,
    IsDefault,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum WorkflowStages {
    Table,
    Id,
    WorkflowId,
    Name,
    Position,
    Role,
    Key,
}

#[derive(Iden)]
enum ProductTemplates {
    Table,
    Id,
    ShopId,
    Name,
    Description,
    Category,
    WorkflowId,
    EstimatedLaborHours,
    HourlyRateMinor,
    EstimatedConsumablesCostMinor,
    AverageMaterialCostMinor,
    AverageConsumableCostMinor,
    BasePriceMinor,
    State,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TemplateEquipment {
    Table,
    TemplateId,
    EquipmentId,
}

#[derive(Iden)]
enum BomItems {
    Table,
    Id,
    TemplateId,
    MaterialId,
    QuantityMilli,
    Unit,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    ShopId,
    TemplateId,
    WorkflowId,
    CurrentStageId,
    CustomerId,
    Name,
    Quantity,
    DueDate,
    QuotedAt,
    ConfirmedAt,
    StartedAt,
    CompletedAt,
    EstimatedHours,
    ActualHours,
    Status,
    ExpectedPriceMinor,
    ExpectedCurrency,
    CancelReason,
    CancelStageId,
    CancelledAt,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProjectStageHistory {
    Table,
    Id,
    ProjectId,
    StageId,
    EnteredAt,
}

#[derive(Iden)]
enum WorkLogs {
    Table,
    Id,
    ProjectId,
    StageId,
    StartedAt,
    EndedAt,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Sales {
    Table,
    Id,
    ShopId,
    ProjectId,
    TemplateId,
    CustomerId,
    Channel,
    PriceMinor,
    FeesMinor,
    Currency,
    SoldAt,
    Notes,
    CostOfGoodsMinor,
    GrossMarginMinor,
    PlatformFeesMinor,
    ShippingCostMinor,
    TaxAmountMinor,
    CreatedAt,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::Email).string())
                    .col(ColumnDef::new(Users::FirstName).string())
                    .col(ColumnDef::new(Users::LastName).string())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Shops (one per owner)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Shops::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shops::Id).blob().not_null().primary_key())
                    .col(
                        ColumnDef::new(Shops::Owner)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Shops::Name).string().not_null())
                    .col(ColumnDef::new(Shops::ContactEmail).string())
                    .col(ColumnDef::new(Shops::ContactPhone).string())
                    .col(ColumnDef::new(Shops::AddressLine1).string())
                    .col(ColumnDef::new(Shops::AddressLine2).string())
                    .col(ColumnDef::new(Shops::City).string())
                    .col(ColumnDef::new(Shops::State).string())
                    .col(ColumnDef::new(Shops::PostalCode).string())
                    .col(
                        ColumnDef::new(Shops::Country)
                            .string()
                            .not_null()
                            .default("USA"),
                    )
                    .col(ColumnDef::new(Shops::WebsiteUrl).string())
                    .col(ColumnDef::new(Shops::InstagramHandle).string())
                    .col(ColumnDef::new(Shops::FacebookHandle).string())
                    .col(
                        ColumnDef::new(Shops::Timezone)
                            .string()
                            .not_null()
                            .default("America/Chicago"),
                    )
                    .col(
                        ColumnDef::new(Shops::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(Shops::DefaultUnits)
                            .string()
                            .not_null()
                            .default("imperial"),
                    )
                    .col(
                        ColumnDef::new(Shops::DefaultHourlyRateMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Shops::DefaultMarkupPct)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Shops::DefaultPaymentTerms)
                            .string()
                            .not_null()
                            .default("50/50"),
                    )
                    .col(ColumnDef::new(Shops::DefaultProjectType).string())
                    .col(
                        ColumnDef::new(Shops::Theme)
                            .string()
                            .not_null()
                            .default("system"),
                    )
                    .col(ColumnDef::new(Shops::Tagline).string())
                    .col(
                        ColumnDef::new(Shops::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Shops::ShippingZonesConfig).json().not_null())
                    .col(ColumnDef::new(Shops::JoinedAt).timestamp())
                    .col(ColumnDef::new(Shops::LastActiveAt).timestamp())
                    .col(ColumnDef::new(Shops::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Shops::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-shops-owner")
                            .from(Shops::Table, Shops::Owner)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Customers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::ShopId).blob().not_null())
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(ColumnDef::new(Customers::Email).string().not_null().default(""))
                    .col(ColumnDef::new(Customers::Phone).string().not_null().default(""))
                    .col(ColumnDef::new(Customers::Channel).string().not_null().default(""))
                    .col(ColumnDef::new(Customers::Notes).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Customers::AddressLine1)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Customers::AddressLine2)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Customers::City).string().not_null().default(""))
                    .col(ColumnDef::new(Customers::State).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Customers::PostalCode)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Customers::Country).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Customers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Customers::IsVip)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Customers::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-customers-shop_id")
                            .from(Customers::Table, Customers::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-customers-shop_id-name")
                    .table(Customers::Table)
                    .col(Customers::ShopId)
                    .col(Customers::Name)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Inventory
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Materials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Materials::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Materials::ShopId).blob().not_null())
                    .col(ColumnDef::new(Materials::Name).string().not_null())
                    .col(ColumnDef::new(Materials::Category).string().not_null().default(""))
                    .col(ColumnDef::new(Materials::Unit).string().not_null())
                    .col(
                        ColumnDef::new(Materials::QuantityMilli)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Materials::CostPerUnitMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Materials::SupplierName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Materials::Notes).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Materials::State)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Materials::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Materials::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-materials-shop_id")
                            .from(Materials::Table, Materials::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Consumables::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Consumables::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Consumables::ShopId).blob().not_null())
                    .col(ColumnDef::new(Consumables::Name).string().not_null())
                    .col(ColumnDef::new(Consumables::Unit).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Consumables::CostPerUnitMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Consumables::QuantityMilli).big_integer())
                    .col(ColumnDef::new(Consumables::Notes).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Consumables::State)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Consumables::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Consumables::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-consumables-shop_id")
                            .from(Consumables::Table, Consumables::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Equipment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Equipment::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Equipment::ShopId).blob().not_null())
                    .col(ColumnDef::new(Equipment::Name).string().not_null())
                    .col(ColumnDef::new(Equipment::PurchaseDate).date())
                    .col(ColumnDef::new(Equipment::PurchaseCostMinor).big_integer())
                    .col(ColumnDef::new(Equipment::Notes).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Equipment::State)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Equipment::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Equipment::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-equipment-shop_id")
                            .from(Equipment::Table, Equipment::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Workflows + stages
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Workflows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Workflows::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Workflows::ShopId).blob().not_null())
                    .col(ColumnDef::new(Workflows::Name).string().not_null())
                    .col(
                        ColumnDef::new(Workflows::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Workflows::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Workflows::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Workflows::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Workflows::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-workflows-shop_id")
                            .from(Workflows::Table, Workflows::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-workflows-shop_id-name-unique")
                    .table(Workflows::Table)
                    .col(Workflows::ShopId)
                    .col(Workflows::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkflowStages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkflowStages::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WorkflowStages::WorkflowId).blob().not_null())
                    .col(ColumnDef::new(WorkflowStages::Name).string().not_null())
                    .col(ColumnDef::new(WorkflowStages::Position).integer().not_null())
                    .col(
                        ColumnDef::new(WorkflowStages::Role)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(WorkflowStages::Key)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-workflow_stages-workflow_id")
                            .from(WorkflowStages::Table, WorkflowStages::WorkflowId)
                            .to(Workflows::Table, Workflows::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-workflow_stages-workflow_id-position-unique")
                    .table(WorkflowStages::Table)
                    .col(WorkflowStages::WorkflowId)
                    .col(WorkflowStages::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Product templates, equipment links, bill of materials
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ProductTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductTemplates::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProductTemplates::ShopId).blob().not_null())
                    .col(ColumnDef::new(ProductTemplates::Name).string().not_null())
                    .col(
                        ColumnDef::new(ProductTemplates::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ProductTemplates::Category)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ProductTemplates::WorkflowId).blob())
                    .col(
                        ColumnDef::new(ProductTemplates::EstimatedLaborHours)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ProductTemplates::HourlyRateMinor).big_integer())
                    .col(
                        ColumnDef::new(ProductTemplates::EstimatedConsumablesCostMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ProductTemplates::AverageMaterialCostMinor).big_integer())
                    .col(
                        ColumnDef::new(ProductTemplates::AverageConsumableCostMinor).big_integer(),
                    )
                    .col(ColumnDef::new(ProductTemplates::BasePriceMinor).big_integer())
                    .col(
                        ColumnDef::new(ProductTemplates::State)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(ProductTemplates::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductTemplates::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-product_templates-shop_id")
                            .from(ProductTemplates::Table, ProductTemplates::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-product_templates-workflow_id")
                            .from(ProductTemplates::Table, ProductTemplates::WorkflowId)
                            .to(Workflows::Table, Workflows::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TemplateEquipment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TemplateEquipment::TemplateId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TemplateEquipment::EquipmentId)
                            .blob()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(TemplateEquipment::TemplateId)
                            .col(TemplateEquipment::EquipmentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-template_equipment-template_id")
                            .from(TemplateEquipment::Table, TemplateEquipment::TemplateId)
                            .to(ProductTemplates::Table, ProductTemplates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-template_equipment-equipment_id")
                            .from(TemplateEquipment::Table, TemplateEquipment::EquipmentId)
                            .to(Equipment::Table, Equipment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BomItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BomItems::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(BomItems::TemplateId).blob().not_null())
                    .col(ColumnDef::new(BomItems::MaterialId).blob().not_null())
                    .col(ColumnDef::new(BomItems::QuantityMilli).big_integer().not_null())
                    .col(ColumnDef::new(BomItems::Unit).string().not_null().default(""))
                    .col(ColumnDef::new(BomItems::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(BomItems::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bom_items-template_id")
                            .from(BomItems::Table, BomItems::TemplateId)
                            .to(ProductTemplates::Table, ProductTemplates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bom_items-material_id")
                            .from(BomItems::Table, BomItems::MaterialId)
                            .to(Materials::Table, Materials::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Projects, stage history, work logs
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Projects::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Projects::ShopId).blob().not_null())
                    .col(ColumnDef::new(Projects::TemplateId).blob())
                    .col(ColumnDef::new(Projects::WorkflowId).blob().not_null())
                    .col(ColumnDef::new(Projects::CurrentStageId).blob().not_null())
                    .col(ColumnDef::new(Projects::CustomerId).blob())
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(
                        ColumnDef::new(Projects::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Projects::DueDate).date())
                    .col(ColumnDef::new(Projects::QuotedAt).timestamp())
                    .col(ColumnDef::new(Projects::ConfirmedAt).timestamp())
                    .col(ColumnDef::new(Projects::StartedAt).timestamp())
                    .col(ColumnDef::new(Projects::CompletedAt).timestamp())
                    .col(
                        ColumnDef::new(Projects::EstimatedHours)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Projects::ActualHours).big_integer())
                    .col(
                        ColumnDef::new(Projects::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Projects::ExpectedPriceMinor).big_integer())
                    .col(
                        ColumnDef::new(Projects::ExpectedCurrency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(Projects::CancelReason)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Projects::CancelStageId).blob())
                    .col(ColumnDef::new(Projects::CancelledAt).timestamp())
                    .col(ColumnDef::new(Projects::Notes).string().not_null().default(""))
                    .col(ColumnDef::new(Projects::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Projects::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-projects-shop_id")
                            .from(Projects::Table, Projects::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-projects-template_id")
                            .from(Projects::Table, Projects::TemplateId)
                            .to(ProductTemplates::Table, ProductTemplates::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-projects-workflow_id")
                            .from(Projects::Table, Projects::WorkflowId)
                            .to(Workflows::Table, Workflows::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-projects-current_stage_id")
                            .from(Projects::Table, Projects::CurrentStageId)
                            .to(WorkflowStages::Table, WorkflowStages::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-projects-customer_id")
                            .from(Projects::Table, Projects::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-projects-cancel_stage_id")
                            .from(Projects::Table, Projects::CancelStageId)
                            .to(WorkflowStages::Table, WorkflowStages::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-projects-shop_id-status")
                    .table(Projects::Table)
                    .col(Projects::ShopId)
                    .col(Projects::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectStageHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectStageHistory::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectStageHistory::ProjectId).blob().not_null())
                    .col(ColumnDef::new(ProjectStageHistory::StageId).blob().not_null())
                    .col(
                        ColumnDef::new(ProjectStageHistory::EnteredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-project_stage_history-project_id")
                            .from(ProjectStageHistory::Table, ProjectStageHistory::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-project_stage_history-stage_id")
                            .from(ProjectStageHistory::Table, ProjectStageHistory::StageId)
                            .to(WorkflowStages::Table, WorkflowStages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(WorkLogs::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(WorkLogs::ProjectId).blob().not_null())
                    .col(ColumnDef::new(WorkLogs::StageId).blob())
                    .col(ColumnDef::new(WorkLogs::StartedAt).timestamp().not_null())
                    .col(ColumnDef::new(WorkLogs::EndedAt).timestamp().not_null())
                    .col(ColumnDef::new(WorkLogs::Notes).string().not_null().default(""))
                    .col(ColumnDef::new(WorkLogs::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(WorkLogs::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-work_logs-project_id")
                            .from(WorkLogs::Table, WorkLogs::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-work_logs-stage_id")
                            .from(WorkLogs::Table, WorkLogs::StageId)
                            .to(WorkflowStages::Table, WorkflowStages::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Sales
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sales::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Sales::ShopId).blob().not_null())
                    .col(ColumnDef::new(Sales::ProjectId).blob())
                    .col(ColumnDef::new(Sales::TemplateId).blob())
                    .col(ColumnDef::new(Sales::CustomerId).blob())
                    .col(
                        ColumnDef::new(Sales::Channel)
                            .string()
                            .not_null()
                            .default("other"),
                    )
                    .col(ColumnDef::new(Sales::PriceMinor).big_integer().not_null())
                    .col(ColumnDef::new(Sales::FeesMinor).big_integer())
                    .col(
                        ColumnDef::new(Sales::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(Sales::SoldAt).timestamp().not_null())
                    .col(ColumnDef::new(Sales::Notes).string().not_null().default(""))
                    .col(ColumnDef::new(Sales::CostOfGoodsMinor).big_integer())
                    .col(ColumnDef::new(Sales::GrossMarginMinor).big_integer())
                    .col(ColumnDef::new(Sales::PlatformFeesMinor).big_integer())
                    .col(ColumnDef::new(Sales::ShippingCostMinor).big_integer())
                    .col(ColumnDef::new(Sales::TaxAmountMinor).big_integer())
                    .col(ColumnDef::new(Sales::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Sales::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sales-shop_id")
                            .from(Sales::Table, Sales::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sales-project_id")
                            .from(Sales::Table, Sales::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sales-template_id")
                            .from(Sales::Table, Sales::TemplateId)
                            .to(ProductTemplates::Table, ProductTemplates::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sales-customer_id")
                            .from(Sales::Table, Sales::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sales-shop_id-sold_at")
                    .table(Sales::Table)
                    .col(Sales::ShopId)
                    .col(Sales::SoldAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sales::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectStageHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BomItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TemplateEquipment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkflowStages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Workflows::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Equipment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Consumables::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Materials::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Shops::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
