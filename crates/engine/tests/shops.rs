mod common;

use chrono::Utc;

use common::{add_user, engine_with_db, shop_with_workflow, template};
use engine::{
    CancelCmd, CustomerInput, CustomerListFilter, EngineError, LogSaleCmd, MAX_MINOR, Money,
    ProjectInput, SaleChannel, SearchQuery, ShopInput, Theme,
};

#[tokio::test]
async fn shop_defaults_and_uniqueness() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.shop("alice").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("Current user has no shop configured.".to_string())
    );
    let me = engine.me("alice").await.unwrap();
    assert!(me.shop.is_none());

    let shop = engine
        .create_shop("alice", ShopInput::named("Sawdust"))
        .await
        .unwrap();
    assert_eq!(shop.currency, "USD");
    assert_eq!(shop.timezone, "America/Chicago");
    assert_eq!(shop.country, "USA");
    assert_eq!(shop.theme, Theme::System.as_str());
    assert!(shop.joined_at.is_some());

    let err = engine
        .create_shop("alice", ShopInput::named("Second"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ExistingKey("Shop already exists for this user.".to_string())
    );

    let updated = engine
        .update_shop(
            "alice",
            ShopInput::default().currency("eur").timezone("Europe/Rome"),
        )
        .await
        .unwrap();
    assert_eq!(updated.currency, "EUR");
    assert_eq!(updated.name, "Sawdust");

    let err = engine
        .update_shop("alice", ShopInput::default().timezone("Mars/Olympus"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn authenticate_checks_password() {
    let (engine, _db) = engine_with_db().await;
    let user = engine.authenticate("Alice", "password").await.unwrap();
    assert_eq!(user.username, "alice");
    assert!(matches!(
        engine.authenticate("alice", "nope").await.unwrap_err(),
        EngineError::Forbidden(_)
    ));
}

#[tokio::test]
async fn tenants_are_isolated() {
    let (engine, db) = engine_with_db().await;
    add_user(&db, "bob").await;
    shop_with_workflow(&engine, "alice").await;
    shop_with_workflow(&engine, "bob").await;

    let table = template(&engine, "alice", "Table", 100).await;
    let project = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap()
        .project;
    let customer = engine
        .create_customer("alice", CustomerInput::named("Jane"))
        .await
        .unwrap();

    assert!(matches!(
        engine.project("bob", project.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.customer("bob", customer.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine
            .create_project("bob", ProjectInput::from_template(table.template.id))
            .await
            .unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(
        engine
            .projects("bob", Default::default())
            .await
            .unwrap()
            .is_empty()
    );
    let hits = engine
        .search("bob", &SearchQuery::parse("Table").unwrap())
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn customer_metrics_follow_projects_and_sales() {
    let (engine, _db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Table", 100).await;
    let jane = engine
        .create_customer("alice", CustomerInput::named("Jane"))
        .await
        .unwrap();
    let idle = engine
        .create_customer("alice", CustomerInput::named("Idle"))
        .await
        .unwrap();

    let first = engine
        .create_project(
            "alice",
            ProjectInput::from_template(table.template.id).customer(jane.id),
        )
        .await
        .unwrap()
        .project;
    engine
        .create_project(
            "alice",
            ProjectInput::from_template(table.template.id).customer(jane.id),
        )
        .await
        .unwrap();
    engine
        .log_sale(
            "alice",
            first.id,
            LogSaleCmd::new("210.00".parse().unwrap(), SaleChannel::Instagram),
        )
        .await
        .unwrap();

    let metrics = engine.customer("alice", jane.id).await.unwrap();
    assert_eq!(metrics.total_projects, 2);
    assert_eq!(metrics.total_products, 1);
    assert_eq!(metrics.total_sales, 1);
    assert_eq!(metrics.completed_projects, 1);
    assert_eq!(metrics.projects_this_year, 2);
    assert_eq!(metrics.lifetime_revenue.to_string(), "210.00");

    let idle = engine.customer("alice", idle.id).await.unwrap();
    assert_eq!(idle.total_projects, 0);
    assert_eq!(idle.lifetime_revenue, Money::ZERO);

    engine.deactivate_customer("alice", idle.customer.id).await.unwrap();
    let listed = engine
        .customers("alice", CustomerListFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    let all = engine
        .customers(
            "alice",
            CustomerListFilter {
                include_inactive: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn total_products_counts_project_templates_only() {
    let (engine, _db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Table", 100).await;
    let chair = template(&engine, "alice", "Chair", 40).await;
    let jane = engine
        .create_customer("alice", CustomerInput::named("Jane"))
        .await
        .unwrap();

    let sold = engine
        .create_project(
            "alice",
            ProjectInput::from_template(table.template.id).customer(jane.id),
        )
        .await
        .unwrap()
        .project;
    engine
        .create_project(
            "alice",
            ProjectInput::from_template(chair.template.id).customer(jane.id),
        )
        .await
        .unwrap();
    engine
        .log_sale(
            "alice",
            sold.id,
            LogSaleCmd::new(Money::whole(120), SaleChannel::Market),
        )
        .await
        .unwrap();
    assert_eq!(engine.customer("alice", jane.id).await.unwrap().total_products, 2);

    engine.delete_project("alice", sold.id).await.unwrap();
    let metrics = engine.customer("alice", jane.id).await.unwrap();
    assert_eq!(metrics.total_projects, 1);
    assert_eq!(metrics.total_products, 1);
    assert_eq!(metrics.total_sales, 1);
    assert_eq!(metrics.lifetime_revenue.to_string(), "120.00");
}

#[tokio::test]
async fn insights_sum_sales_and_lost_revenue() {
    let (engine, _db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Table", 100).await;

    let empty = engine.insights_summary("alice").await.unwrap();
    assert_eq!(empty.total_revenue, Money::ZERO);
    assert_eq!(empty.currency, "USD");

    for (price, fees) in [(100, 10), (50, 5)] {
        let project = engine
            .create_project("alice", ProjectInput::from_template(table.template.id))
            .await
            .unwrap()
            .project;
        engine
            .log_sale(
                "alice",
                project.id,
                LogSaleCmd::new(Money::whole(price), SaleChannel::Market)
                    .fees(Money::whole(fees))
                    .sold_at(Utc::now()),
            )
            .await
            .unwrap();
    }
    let lost = engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap()
        .project;
    engine
        .cancel_project("alice", lost.id, CancelCmd::default())
        .await
        .unwrap();
    engine
        .create_project("alice", ProjectInput::from_template(table.template.id))
        .await
        .unwrap();

    let summary = engine.insights_summary("alice").await.unwrap();
    assert_eq!(summary.total_revenue.to_string(), "150.00");
    assert_eq!(summary.total_fees.to_string(), "15.00");
    assert_eq!(summary.net_revenue.to_string(), "135.00");
    assert_eq!(summary.lost_revenue.to_string(), "100.00");
    assert_eq!(summary.project_counts.active, 1);
    assert_eq!(summary.project_counts.completed, 2);
    assert_eq!(summary.project_counts.cancelled, 1);
    assert_eq!(summary.total_gross_margin.to_string(), "150.00");
}

#[tokio::test]
async fn oversized_amounts_are_rejected_and_sums_stay_usable() {
    let (engine, _db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Table", 100).await;
    let jane = engine
        .create_customer("alice", CustomerInput::named("Jane"))
        .await
        .unwrap();

    let project = engine
        .create_project(
            "alice",
            ProjectInput::from_template(table.template.id).customer(jane.id),
        )
        .await
        .unwrap()
        .project;
    let err = engine
        .log_sale(
            "alice",
            project.id,
            LogSaleCmd::new(Money::new(50_000_000_000_000_000), SaleChannel::Etsy),
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());

    for _ in 0..2 {
        let project = engine
            .create_project(
                "alice",
                ProjectInput::from_template(table.template.id).customer(jane.id),
            )
            .await
            .unwrap()
            .project;
        engine
            .log_sale(
                "alice",
                project.id,
                LogSaleCmd::new(Money::new(MAX_MINOR), SaleChannel::Etsy).fees(Money::new(MAX_MINOR)),
            )
            .await
            .unwrap();
    }

    let summary = engine.insights_summary("alice").await.unwrap();
    assert_eq!(summary.total_revenue, Money::new(2 * MAX_MINOR));
    assert_eq!(summary.net_revenue, Money::ZERO);
    let metrics = engine.customer("alice", jane.id).await.unwrap();
    assert_eq!(metrics.lifetime_revenue.to_string(), "20000000000000.00");
}

#[tokio::test]
async fn search_text_matches_wildcards_literally() {
    let (engine, _db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;
    for name in ["Jane", "Bob", "50% Club"] {
        engine
            .create_customer("alice", CustomerInput::named(name))
            .await
            .unwrap();
    }

    let hits = engine
        .search("alice", &SearchQuery::parse("customer:%").unwrap())
        .await
        .unwrap();
    let labels: Vec<_> = hits.iter().map(|h| h.label.as_str()).collect();
    assert_eq!(labels, vec!["50% Club"]);

    let hits = engine
        .search("alice", &SearchQuery::parse("_o_").unwrap())
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn search_scopes_and_filters() {
    let (engine, _db) = engine_with_db().await;
    shop_with_workflow(&engine, "alice").await;
    let table = template(&engine, "alice", "Walnut table", 100).await;
    engine
        .create_customer("alice", CustomerInput::named("Walnut Street Cafe"))
        .await
        .unwrap();
    let today = Utc::now().date_naive();
    engine
        .create_project(
            "alice",
            ProjectInput::from_template(table.template.id).due_date(today - chrono::Duration::days(3)),
        )
        .await
        .unwrap();

    let all = engine
        .search("alice", &SearchQuery::parse("walnut").unwrap())
        .await
        .unwrap();
    let kinds: Vec<_> = all.iter().map(|h| h.kind).collect();
    assert_eq!(kinds, vec!["customer", "project"]);

    let projects = engine
        .search("alice", &SearchQuery::parse("projects: walnut").unwrap())
        .await
        .unwrap();
    assert_eq!(projects.len(), 1);
    assert!(projects[0].url.starts_with("/projects/"));

    let overdue = engine
        .search("alice", &SearchQuery::parse("due:overdue").unwrap())
        .await
        .unwrap();
    assert_eq!(overdue.len(), 1);

    let pricey = engine
        .search("alice", &SearchQuery::parse("price>500").unwrap())
        .await
        .unwrap();
    assert!(pricey.is_empty());

    let tagged = engine
        .search("alice", &SearchQuery::parse("tag:furniture").unwrap())
        .await
        .unwrap();
    assert_eq!(tagged.len(), 1);
}
