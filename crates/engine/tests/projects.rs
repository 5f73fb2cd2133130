mod common;

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Statement};

use common::{engine_with_db, shop_with_workflow, template};
use engine::{
    CancelCmd, EngineError, LogSaleCmd, Money, ProjectInput, ProjectListFilter, ProjectPatch,
    ProjectStatus, SaleChannel, SaleListFilter, StageInput, WorkLogInput, WorkflowInput,
    project_stage_history, sales,
};

#[tokio::test]
async fn end_to_end_create_move_sell() {
    let (engine, db) = engine_with_db().await;
    let workflow = shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Walnut table", 100).await;

    let created = engine
        .create_project(
            "alice",
            ProjectInput::from_template(table.template.id).quantity(2),
        )
        .await
        .unwrap();
    let project = &created.project;
    assert_eq!(project.expected_price_minor, Some(20000));
    assert_eq!(Money::new(20000).to_string(), "200.00");
    assert_eq!(project.current_stage_id, workflow.stages[0].id);
    assert_eq!(project.project_status().unwrap(), ProjectStatus::Active);
    assert_eq!(project.expected_currency, "USD");
    assert_eq!(project.estimated_hours, 300);
    assert_eq!(project.name, "Walnut table");
    assert_eq!(created.current_stage_name, "Idea");

    let history = engine.project_history("alice", project.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].entry.stage_id, workflow.stages[0].id);

    let moved = engine
        .move_project("alice", project.id, workflow.stages[1].id)
        .await
        .unwrap();
    assert_eq!(moved.project.current_stage_id, workflow.stages[1].id);
    let history = engine.project_history("alice", project.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(
        history
            .iter()
            .any(|h| h.entry.stage_id == workflow.stages[1].id && h.stage_name == "Build")
    );

    let logged = engine
        .log_sale(
            "alice",
            project.id,
            LogSaleCmd::new("210.00".parse().unwrap(), SaleChannel::Etsy),
        )
        .await
        .unwrap();
    assert_eq!(logged.project.project.project_status().unwrap(), ProjectStatus::Completed);
    assert_eq!(logged.sale.price_minor, 21000);
    assert_eq!(logged.sale.channel, "etsy");
    assert_eq!(logged.sale.project_id, Some(project.id));
    assert_eq!(logged.sale.template_id, Some(table.template.id));
    // Selling does not touch the stage or the completion stamp.
    assert_eq!(logged.project.project.current_stage_id, workflow.stages[1].id);
    assert!(logged.project.project.completed_at.is_none());

    assert_eq!(sales::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn move_to_current_stage_is_a_no_op() {
    let (engine, db) = engine_with_db().await;
    let workflow = shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Table", 100).await;
    let project = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap()
        .project;

    let again = engine
        .move_project("alice", project.id, workflow.stages[0].id)
        .await
        .unwrap();
    assert_eq!(again.project.updated_at, project.updated_at);
    assert_eq!(
        project_stage_history::Entity::find().count(&db).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn move_outside_own_workflow_fails() {
    let (engine, _db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;
    let other = engine
        .create_workflow(
            "alice",
            WorkflowInput {
                name: Some("Signs".to_string()),
                stages: Some(vec![StageInput::new("Etch", 0, "build")]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let table = template(&engine, "alice", "Table", 100).await;
    let project = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap()
        .project;

    let err = engine
        .move_project("alice", project.id, other.stages[0].id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput("Target stage does not exist for this workflow.".to_string())
    );
}

#[tokio::test]
async fn moving_into_completed_stage_keeps_status() {
    let (engine, _db) = engine_with_db().await;
    let workflow = shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Table", 100).await;
    let project = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap()
        .project;

    let moved = engine
        .move_project("alice", project.id, workflow.stages[2].id)
        .await
        .unwrap();
    assert_eq!(moved.project.project_status().unwrap(), ProjectStatus::Active);
}

#[tokio::test]
async fn cancel_records_stage_and_appends_notes() {
    let (engine, _db) = engine_with_db().await;
    let workflow = shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Table", 100).await;
    let project = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap()
        .project;
    engine
        .update_project(
            "alice",
            project.id,
            ProjectPatch {
                notes: Some("Wants oak".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let cancelled = engine
        .cancel_project(
            "alice",
            project.id,
            CancelCmd::default()
                .reason("Client changed mind")
                .notes("Might rebook")
                .expected_price(Money::whole(80)),
        )
        .await
        .unwrap()
        .project;
    assert_eq!(cancelled.project_status().unwrap(), ProjectStatus::Cancelled);
    assert_eq!(cancelled.cancel_stage_id, Some(workflow.stages[0].id));
    assert_eq!(cancelled.cancel_reason, "Client changed mind");
    assert_eq!(cancelled.notes, "Wants oak\n\nCancellation note: Might rebook");
    assert_eq!(cancelled.expected_price_minor, Some(8000));
    assert!(cancelled.cancelled_at.is_some());

    let again = engine
        .cancel_project("alice", project.id, CancelCmd::default())
        .await
        .unwrap_err();
    assert!(matches!(again, EngineError::InvalidTransition(_)));

    let sale = engine
        .log_sale(
            "alice",
            project.id,
            LogSaleCmd::new(Money::whole(10), SaleChannel::Direct),
        )
        .await
        .unwrap_err();
    assert!(matches!(sale, EngineError::InvalidTransition(_)));

    let moved = engine
        .move_project("alice", project.id, workflow.stages[1].id)
        .await
        .unwrap_err();
    assert!(matches!(moved, EngineError::InvalidTransition(_)));
}

#[tokio::test]
async fn completed_project_rejects_second_sale_and_cancel() {
    let (engine, db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Table", 100).await;
    let project = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap()
        .project;

    engine
        .log_sale(
            "alice",
            project.id,
            LogSaleCmd::new(Money::whole(120), SaleChannel::Market).cost_of_goods(Money::whole(45)),
        )
        .await
        .unwrap();

    let err = engine
        .log_sale(
            "alice",
            project.id,
            LogSaleCmd::new(Money::whole(120), SaleChannel::Market),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
    let err = engine
        .cancel_project("alice", project.id, CancelCmd::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    let sales = engine
        .sales("alice", SaleListFilter::default())
        .await
        .unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].gross_margin_minor, Some(7500));
    assert_eq!(sales::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn create_requires_template_quantity_and_workflow() {
    let (engine, _db) = engine_with_db().await;
    engine
        .create_shop("alice", engine::ShopInput::named("Bare"))
        .await
        .unwrap();
    let table = template(&engine, "alice", "Table", 100).await;

    let err = engine
        .create_project("alice", ProjectInput::default())
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = engine
        .create_project(
            "alice",
            ProjectInput::from_template(table.template.id).quantity(0),
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput(
            "No workflow is configured for this template or as a shop default.".to_string()
        )
    );

    engine
        .create_workflow(
            "alice",
            WorkflowInput {
                name: Some("Empty".to_string()),
                is_default: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let err = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput("Selected workflow has no stages defined.".to_string())
    );
}

#[tokio::test]
async fn board_groups_active_projects_by_stage() {
    let (engine, _db) = engine_with_db().await;
    let workflow = shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Table", 100).await;
    let today = Utc::now().date_naive();

    let undated = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap()
        .project;
    let later = engine
        .create_project(
            "alice",
            ProjectInput::from_template(table.template.id).due_date(today + Duration::days(10)),
        )
        .await
        .unwrap()
        .project;
    let sooner = engine
        .create_project(
            "alice",
            ProjectInput::from_template(table.template.id).due_date(today + Duration::days(1)),
        )
        .await
        .unwrap()
        .project;
    let cancelled = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap()
        .project;
    engine
        .cancel_project("alice", cancelled.id, CancelCmd::default())
        .await
        .unwrap();
    engine
        .move_project("alice", later.id, workflow.stages[1].id)
        .await
        .unwrap();

    let board = engine.board("alice", workflow.workflow.id).await.unwrap();
    assert_eq!(board.len(), 3);
    let first: Vec<_> = board[0].projects.iter().map(|p| p.project.id).collect();
    assert_eq!(first, vec![sooner.id, undated.id]);
    let second: Vec<_> = board[1].projects.iter().map(|p| p.project.id).collect();
    assert_eq!(second, vec![later.id]);
    assert!(board[2].projects.is_empty());
    assert_eq!(board[2].stage.key, "completed");
}

#[tokio::test]
async fn list_filters_and_delete_cascades() {
    let (engine, _db) = engine_with_db().await;
    let workflow = shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Table", 100).await;
    let customer = engine
        .create_customer("alice", engine::CustomerInput::named("Jane"))
        .await
        .unwrap();

    let mine = engine
        .create_project(
            "alice",
            ProjectInput::from_template(table.template.id).customer(customer.id),
        )
        .await
        .unwrap()
        .project;
    let other = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap()
        .project;
    engine
        .log_sale(
            "alice",
            other.id,
            LogSaleCmd::new(Money::whole(90), SaleChannel::Other),
        )
        .await
        .unwrap();

    let by_customer = engine
        .projects(
            "alice",
            ProjectListFilter {
                customer_id: Some(customer.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_customer.len(), 1);
    assert_eq!(by_customer[0].customer_name.as_deref(), Some("Jane"));
    let completed = engine
        .projects(
            "alice",
            ProjectListFilter {
                status: Some(ProjectStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].project.id, other.id);

    let started = Utc::now();
    engine
        .add_work_log(
            "alice",
            mine.id,
            WorkLogInput {
                stage_id: Some(workflow.stages[0].id),
                started_at: started,
                ended_at: started + Duration::hours(2),
                notes: Some("glue-up".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(engine.work_logs("alice", mine.id).await.unwrap().len(), 1);

    engine.delete_project("alice", other.id).await.unwrap();
    let sales = engine
        .sales("alice", SaleListFilter::default())
        .await
        .unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].project_id, None);
    assert!(matches!(
        engine.project("alice", other.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn work_log_validation() {
    let (engine, _db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;
    let other = engine
        .create_workflow(
            "alice",
            WorkflowInput {
                name: Some("Other".to_string()),
                stages: Some(vec![StageInput::new("Only", 0, "")]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let table = template(&engine, "alice", "Table", 100).await;
    let project = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap()
        .project;
    let now = Utc::now();

    let backwards = engine
        .add_work_log(
            "alice",
            project.id,
            WorkLogInput {
                stage_id: None,
                started_at: now,
                ended_at: now - Duration::minutes(5),
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(backwards.is_validation());

    let foreign_stage = engine
        .add_work_log(
            "alice",
            project.id,
            WorkLogInput {
                stage_id: Some(other.stages[0].id),
                started_at: now,
                ended_at: now,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(foreign_stage.is_validation());
}

#[tokio::test]
async fn patch_changes_only_editable_fields() {
    let (engine, _db) = engine_with_db().await;
    let workflow = shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Table", 100).await;
    let project = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap()
        .project;
    let due = NaiveDate::from_ymd_opt(2030, 5, 1).unwrap();

    let patched = engine
        .update_project(
            "alice",
            project.id,
            ProjectPatch {
                name: Some("Big table".to_string()),
                quantity: Some(3),
                due_date: Some(Some(due)),
                expected_price: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .project;
    assert_eq!(patched.name, "Big table");
    assert_eq!(patched.quantity, 3);
    assert_eq!(patched.due_date, Some(due));
    assert_eq!(patched.expected_price_minor, None);
    assert_eq!(patched.current_stage_id, workflow.stages[0].id);
    assert_eq!(patched.project_status().unwrap(), ProjectStatus::Active);

    let err = engine
        .update_project(
            "alice",
            project.id,
            ProjectPatch {
                quantity: Some(-1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn unknown_stored_status_blocks_transitions() {
    let (engine, db) = engine_with_db().await;
    let workflow = shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Table", 100).await;
    let project = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap()
        .project;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "UPDATE projects SET status = 'paused'",
    ))
    .await
    .unwrap();

    let err = engine
        .move_project("alice", project.id, workflow.stages[1].id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));
    assert!(!err.is_validation());
    assert!(engine.insights_summary("alice").await.is_err());

    let history = project_stage_history::Entity::find().count(&db).await.unwrap();
    assert_eq!(history, 1);
}
