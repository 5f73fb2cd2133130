mod common;

use common::{engine_with_db, shop_with_workflow};
use engine::{
    BomItemInput, ConsumableInput, EngineError, EquipmentInput, MaterialInput, Money,
    ProjectInput, Quantity, TemplateInput,
};

fn walnut() -> MaterialInput {
    MaterialInput {
        name: Some("Walnut board".to_string()),
        category: Some("Lumber".to_string()),
        unit: Some("bf".to_string()),
        quantity: Some("12.5".parse().unwrap()),
        cost_per_unit: Some(Money::whole(14)),
        ..Default::default()
    }
}

#[tokio::test]
async fn archived_inventory_is_hidden() {
    let (engine, _db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;

    let material = engine.create_material("alice", walnut()).await.unwrap();
    assert_eq!(material.quantity_milli, 12500);
    let consumable = engine
        .create_consumable(
            "alice",
            ConsumableInput {
                name: Some("Sandpaper".to_string()),
                unit: Some("sheet".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let saw = engine
        .create_equipment(
            "alice",
            EquipmentInput {
                name: Some("Table saw".to_string()),
                purchase_cost: Some(Some(Money::whole(900))),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    engine.archive_material("alice", material.id).await.unwrap();
    engine.archive_consumable("alice", consumable.id).await.unwrap();
    engine.archive_equipment("alice", saw.id).await.unwrap();

    assert!(engine.materials("alice").await.unwrap().is_empty());
    assert!(engine.consumables("alice").await.unwrap().is_empty());
    assert!(engine.equipment_list("alice").await.unwrap().is_empty());
    assert!(matches!(
        engine.material("alice", material.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));

    // Purge still reaches archived rows.
    engine.purge_equipment("alice", saw.id).await.unwrap();
    engine.purge_consumable("alice", consumable.id).await.unwrap();
}

#[tokio::test]
async fn material_requires_name_and_unit() {
    let (engine, _db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;

    let err = engine
        .create_material(
            "alice",
            MaterialInput {
                name: Some("  ".to_string()),
                unit: Some("bf".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = engine
        .create_material(
            "alice",
            MaterialInput {
                name: Some("Oak".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput("unit must not be empty".to_string())
    );

    let err = engine
        .create_material(
            "alice",
            MaterialInput {
                cost_per_unit: Some(Money::new(-1)),
                ..walnut()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn bom_reference_blocks_purge() {
    let (engine, _db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;
    let material = engine.create_material("alice", walnut()).await.unwrap();

    let template = engine
        .create_template(
            "alice",
            TemplateInput {
                name: Some("Cutting board".to_string()),
                bom: Some(vec![BomItemInput {
                    material_id: material.id,
                    quantity: Quantity::whole(2),
                    unit: None,
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(template.bom.len(), 1);
    assert_eq!(template.bom[0].item.unit, "bf");
    assert_eq!(template.bom[0].material_name, "Walnut board");

    let err = engine
        .purge_material("alice", material.id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput(
            "material 'Walnut board' is used by 1 bill of materials item(s)".to_string()
        )
    );

    engine
        .update_template(
            "alice",
            template.template.id,
            TemplateInput {
                bom: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    engine.purge_material("alice", material.id).await.unwrap();
}

#[tokio::test]
async fn template_links_and_bom_are_replaced() {
    let (engine, _db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;
    let oak = engine
        .create_material(
            "alice",
            MaterialInput {
                name: Some("Oak".to_string()),
                unit: Some("bf".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let saw = engine
        .create_equipment(
            "alice",
            EquipmentInput {
                name: Some("Saw".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let router = engine
        .create_equipment(
            "alice",
            EquipmentInput {
                name: Some("Router".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let template = engine
        .create_template(
            "alice",
            TemplateInput {
                name: Some("Shelf".to_string()),
                equipment_ids: Some(vec![saw.id, router.id]),
                bom: Some(vec![BomItemInput {
                    material_id: oak.id,
                    quantity: "0.5".parse().unwrap(),
                    unit: Some("ft".to_string()),
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(template.equipment_ids.len(), 2);
    assert_eq!(template.bom[0].item.unit, "ft");

    let updated = engine
        .update_template(
            "alice",
            template.template.id,
            TemplateInput {
                equipment_ids: Some(vec![router.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.equipment_ids, vec![router.id]);
    assert_eq!(updated.bom.len(), 1);

    let err = engine
        .update_template(
            "alice",
            template.template.id,
            TemplateInput {
                bom: Some(vec![BomItemInput {
                    material_id: oak.id,
                    quantity: Quantity::ZERO,
                    unit: None,
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn archived_template_cannot_start_projects() {
    let (engine, _db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;
    let template = common::template(&engine, "alice", "Stool", 40).await;

    engine
        .archive_template("alice", template.template.id)
        .await
        .unwrap();
    assert!(engine.templates("alice").await.unwrap().is_empty());
    let err = engine
        .create_project("alice", ProjectInput::from_template(template.template.id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
