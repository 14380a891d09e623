//! Relational repository tests against in-memory SQLite.

mod fixtures;

use sea_orm::{ActiveValue, ColumnTrait, IntoActiveModel, JoinType, Order, Set, Value};

use common::AppError;
use persistence::pagination::total_pages;
use persistence::{
    with_condition, with_equal, with_join, with_limit, with_order, with_search, QueryOption,
    Repository,
};

use fixtures::{cake, fruit, new_record, record, setup};

const RECORDS: Repository<record::Entity> = Repository::new();

async fn seed(db: &sea_orm::DatabaseConnection) {
    let active = (1..=25).map(|i| new_record(&format!("active-{:02}", i), "active", i));
    let inactive = (1..=5).map(|i| new_record(&format!("inactive-{}", i), "inactive", i));
    let inserted = RECORDS
        .create_bulk(db, active.chain(inactive))
        .await
        .unwrap();
    assert_eq!(inserted, 30);
}

fn active_only() -> QueryOption<record::Entity> {
    with_equal::<record::Entity, _>(record::Column::Status, Some("active"))
}

#[tokio::test]
async fn test_find_with_pagination_counts_before_clipping() {
    let db = setup().await;
    seed(&db).await;

    let (rows, total) = RECORDS
        .find_with_pagination(
            &db,
            2,
            10,
            &[active_only(), with_order(record::Column::Id, Order::Asc)],
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 10);
    assert_eq!(total, 25);
    assert_eq!(total_pages(total, 10), 3);
    assert_eq!(rows.first().map(|r| r.name.as_str()), Some("active-11"));
    assert_eq!(rows.last().map(|r| r.name.as_str()), Some("active-20"));
}

#[tokio::test]
async fn test_find_with_pagination_without_page_returns_everything() {
    let db = setup().await;
    seed(&db).await;

    let (rows, total) = RECORDS
        .find_with_pagination(&db, 0, 10, &[active_only()])
        .await
        .unwrap();
    assert_eq!(rows.len(), 25);
    assert_eq!(total, 25);

    let (rows, total) = RECORDS
        .find_with_pagination(&db, 3, -1, &[active_only(), with_limit(4)])
        .await
        .unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(total, 25);
}

#[tokio::test]
async fn test_find_many_and_count_share_filters() {
    let db = setup().await;
    seed(&db).await;

    let options = [
        active_only(),
        with_condition(record::Column::Score.gt(20)),
        with_search::<record::Entity>(record::Column::Name, "active-2"),
    ];
    let rows = RECORDS.find_many(&db, &options).await.unwrap();
    let count = RECORDS.count(&db, &options).await.unwrap();

    assert_eq!(count, 5);
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|r| r.status == "active" && r.score > 20));
    assert_eq!(RECORDS.find_all(&db).await.unwrap().len(), 30);
}

#[tokio::test]
async fn test_search_matches_wildcards_literally() {
    let db = setup().await;
    RECORDS
        .create_bulk(
            &db,
            [
                new_record("promo 50% off", "active", 1),
                new_record("promo 500 off", "active", 2),
                new_record("code a_b", "active", 3),
                new_record("code axb", "active", 4),
            ],
        )
        .await
        .unwrap();

    let percent = RECORDS
        .find_many(&db, &[with_search::<record::Entity>(record::Column::Name, "50%")])
        .await
        .unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].name, "promo 50% off");

    let underscore = RECORDS
        .find_many(&db, &[with_search::<record::Entity>(record::Column::Name, "a_b")])
        .await
        .unwrap();
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].name, "code a_b");
}

#[tokio::test]
async fn test_create_then_find_one_round_trips() {
    let db = setup().await;

    let created = RECORDS
        .create(&db, new_record("alpha", "active", 7))
        .await
        .unwrap();
    let found = RECORDS
        .find_one(
            &db,
            &[with_equal::<record::Entity, _>(record::Column::Id, Some(created.id))],
        )
        .await
        .unwrap();

    assert_eq!(found, created);
    assert_eq!(found.name, "alpha");
    assert_eq!(found.score, 7);
}

#[tokio::test]
async fn test_find_one_missing_is_not_found() {
    let db = setup().await;
    let result = RECORDS
        .find_one(
            &db,
            &[with_equal::<record::Entity, _>(record::Column::Name, Some("ghost"))],
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_create_bulk_empty_is_noop() {
    let db = setup().await;
    let inserted = RECORDS
        .create_bulk(&db, Vec::<record::ActiveModel>::new())
        .await
        .unwrap();
    assert_eq!(inserted, 0);
}

#[tokio::test]
async fn test_update_one_writes_only_set_fields() {
    let db = setup().await;
    let created = RECORDS
        .create(&db, new_record("alpha", "active", 7))
        .await
        .unwrap();

    let patch = record::ActiveModel {
        id: ActiveValue::Unchanged(created.id),
        score: Set(99),
        ..Default::default()
    };
    let updated = RECORDS.update_one(&db, patch).await.unwrap();

    assert_eq!(updated.score, 99);
    assert_eq!(updated.name, "alpha");
    assert_eq!(updated.status, "active");
}

#[tokio::test]
async fn test_update_one_missing_row_is_not_found() {
    let db = setup().await;
    let patch = record::ActiveModel {
        id: ActiveValue::Unchanged(404),
        score: Set(1),
        ..Default::default()
    };
    let result = RECORDS.update_one(&db, patch).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_update_many_requires_filter_and_fields() {
    let db = setup().await;
    seed(&db).await;

    let unfiltered = RECORDS
        .update_many(
            &db,
            vec![(record::Column::Status, Value::from("archived"))],
            &[with_limit(3)],
        )
        .await;
    assert!(matches!(unfiltered, Err(AppError::Guard(_))));

    let no_fields = RECORDS.update_many(&db, Vec::new(), &[active_only()]).await;
    assert!(matches!(no_fields, Err(AppError::Guard(_))));

    // Neither refused call touched anything
    assert_eq!(RECORDS.count(&db, &[active_only()]).await.unwrap(), 25);

    let affected = RECORDS
        .update_many(
            &db,
            vec![(record::Column::Status, Value::from("archived"))],
            &[with_equal::<record::Entity, _>(
                record::Column::Status,
                Some("inactive"),
            )],
        )
        .await
        .unwrap();
    assert_eq!(affected, 5);

    let archived = with_equal::<record::Entity, _>(record::Column::Status, Some("archived"));
    assert_eq!(RECORDS.count(&db, &[archived]).await.unwrap(), 5);
}

#[tokio::test]
async fn test_save_upserts_by_primary_key() {
    let db = setup().await;
    let created = RECORDS
        .create(&db, new_record("alpha", "active", 1))
        .await
        .unwrap();

    let overwrite = record::ActiveModel {
        id: Set(created.id),
        name: Set("renamed".to_string()),
        status: Set("inactive".to_string()),
        score: Set(50),
    };
    RECORDS.save(&db, overwrite).await.unwrap();

    let fresh = record::ActiveModel {
        id: Set(100),
        name: Set("beta".to_string()),
        status: Set("active".to_string()),
        score: Set(2),
    };
    RECORDS.save(&db, fresh).await.unwrap();

    let rows = RECORDS
        .find_many(&db, &[with_order(record::Column::Id, Order::Asc)])
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "renamed");
    assert_eq!(rows[0].score, 50);
    assert_eq!(rows[1].id, 100);
}

#[tokio::test]
async fn test_delete_by_identity() {
    let db = setup().await;
    let created = RECORDS
        .create(&db, new_record("alpha", "active", 1))
        .await
        .unwrap();

    let deleted = RECORDS
        .delete(&db, created.clone().into_active_model())
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let again = RECORDS.delete(&db, created.into_active_model()).await.unwrap();
    assert_eq!(again, 0);
    assert_eq!(RECORDS.count(&db, &[]).await.unwrap(), 0);
}

async fn seed_cakes(db: &sea_orm::DatabaseConnection) {
    let cakes = Repository::<cake::Entity>::new();
    let fruits = Repository::<fruit::Entity>::new();

    for (id, name) in [(1, "apple pie"), (2, "plain sponge")] {
        cakes
            .create(
                db,
                cake::ActiveModel {
                    id: Set(id),
                    name: Set(name.to_string()),
                },
            )
            .await
            .unwrap();
    }
    fruits
        .create_bulk(
            db,
            [("apple", 1), ("cinnamon", 1)].map(|(name, cake_id)| fruit::ActiveModel {
                name: Set(name.to_string()),
                cake_id: Set(cake_id),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_find_with_related_preloads_children() {
    let db = setup().await;
    seed_cakes(&db).await;

    let cakes = Repository::<cake::Entity>::new()
        .find_with_related(
            &db,
            fruit::Entity,
            &[with_order(cake::Column::Id, Order::Asc)],
        )
        .await
        .unwrap();

    assert_eq!(cakes.len(), 2);
    assert_eq!(cakes[0].0.name, "apple pie");
    assert_eq!(cakes[0].1.len(), 2);
    assert!(cakes[1].1.is_empty());
}

#[tokio::test]
async fn test_join_filters_on_related_columns() {
    let db = setup().await;
    seed_cakes(&db).await;

    let cakes = Repository::<cake::Entity>::new()
        .find_many(
            &db,
            &[
                with_join(JoinType::InnerJoin, cake::Relation::Fruit),
                with_condition(fruit::Column::Name.eq("apple")),
            ],
        )
        .await
        .unwrap();

    assert_eq!(cakes.len(), 1);
    assert_eq!(cakes[0].id, 1);
}
