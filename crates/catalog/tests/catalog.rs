use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use catalog::{
    AppInput, Catalog, CatalogError, Category, CertificateInput, Price, ReviewChange,
    ReviewInput, StoreInput,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn catalog_with_db() -> (Catalog, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let media = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../target/test_media")
        .join(Uuid::new_v4().to_string());
    let catalog = Catalog::builder()
        .database(db.clone())
        .media_root(media)
        .build();
    (catalog, db)
}

fn app(name: &str) -> AppInput {
    AppInput {
        name: name.to_string(),
        category: "FR".to_string(),
        is_active: true,
        ..Default::default()
    }
}

fn store(name: &str, app_ids: Vec<i32>) -> StoreInput {
    StoreInput {
        name: name.to_string(),
        mother_company: "Holding".to_string(),
        app_ids,
        ..Default::default()
    }
}

fn certificate(app_id: i32, number: &str) -> CertificateInput {
    CertificateInput {
        app_id,
        certificate_name: "Quality".to_string(),
        certificate_number: number.to_string(),
        issued_by: "Board".to_string(),
        ..Default::default()
    }
}

async fn count(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

#[tokio::test]
async fn list_apps_is_ordered_by_id() {
    let (catalog, _db) = catalog_with_db().await;
    assert!(catalog.list_apps().await.unwrap().is_empty());

    let first = catalog.create_app(app("Masala")).await.unwrap();
    let second = catalog.create_app(app("Ginger")).await.unwrap();

    let apps = catalog.list_apps().await.unwrap();
    let ids: Vec<i32> = apps.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert!(first.id < second.id);
}

#[tokio::test]
async fn created_app_keeps_defaults_and_fields() {
    let (catalog, _db) = catalog_with_db().await;
    let created = catalog
        .create_app(AppInput {
            name: "  Lemon  ".to_string(),
            category: "SR".to_string(),
            description: Some("zesty".to_string()),
            is_active: false,
            price: "2.5".parse().unwrap(),
            image: None,
        })
        .await
        .unwrap();

    let loaded = catalog.app(created.id).await.unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.name, "Lemon");
    assert_eq!(loaded.category, Category::Senior);
    assert_eq!(loaded.price.to_string(), "2.50");
    assert_eq!(loaded.description, "zesty");
    assert_eq!(loaded.image, "");
    assert!(!loaded.is_active);

    let plain = catalog.create_app(app("Plain")).await.unwrap();
    assert_eq!(plain.price, Price::ZERO);
    assert_eq!(plain.description, "");
}

#[tokio::test]
async fn missing_app_is_not_found() {
    let (catalog, _db) = catalog_with_db().await;
    assert!(matches!(
        catalog.app(42).await,
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        catalog.app_detail(42).await,
        Err(CatalogError::NotFound(_))
    ));
    assert!(!catalog.app_exists(42).await.unwrap());
}

#[tokio::test]
async fn unknown_category_violates_constraint() {
    let (catalog, db) = catalog_with_db().await;
    let err = catalog
        .create_app(AppInput {
            category: "XX".to_string(),
            ..app("Bad")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::ConstraintViolation(_)));

    // The schema refuses it too.
    let backend = db.get_database_backend();
    let raw = db
        .execute(Statement::from_string(
            backend,
            "INSERT INTO app_entries (name, image, category, date_added, is_active, price_minor) \
             VALUES ('Raw', '', 'XX', '2025-01-01T00:00:00Z', 1, 0)"
                .to_string(),
        ))
        .await;
    assert!(raw.is_err());
    assert_eq!(count(&db, "app_entries").await, 0);
}

#[tokio::test]
async fn blank_or_long_name_violates_constraint() {
    let (catalog, _db) = catalog_with_db().await;
    assert!(matches!(
        catalog.create_app(app("   ")).await,
        Err(CatalogError::ConstraintViolation(_))
    ));
    assert!(matches!(
        catalog.create_app(app(&"x".repeat(101))).await,
        Err(CatalogError::ConstraintViolation(_))
    ));
}

#[tokio::test]
async fn update_app_keeps_image_unless_replaced() {
    let (catalog, _db) = catalog_with_db().await;
    let created = catalog
        .create_app(AppInput {
            image: Some("mini_apps/a.png".to_string()),
            ..app("Masala")
        })
        .await
        .unwrap();

    let updated = catalog
        .update_app(
            created.id,
            AppInput {
                category: "GR".to_string(),
                ..app("Masala Deluxe")
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Masala Deluxe");
    assert_eq!(updated.category, Category::Graduate);
    assert_eq!(updated.image, "mini_apps/a.png");
    assert_eq!(updated.date_added, created.date_added);

    assert!(matches!(
        catalog.update_app(999, app("Ghost")).await,
        Err(CatalogError::NotFound(_))
    ));
}

#[tokio::test]
async fn duplicate_certificate_number_violates_constraint() {
    let (catalog, _db) = catalog_with_db().await;
    let a = catalog.create_app(app("A")).await.unwrap();
    let b = catalog.create_app(app("B")).await.unwrap();

    catalog
        .create_certificate(certificate(a.id, "CERT-1"))
        .await
        .unwrap();
    let err = catalog
        .create_certificate(certificate(b.id, "CERT-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::ConstraintViolation(_)));
}

#[tokio::test]
async fn app_has_at_most_one_certificate() {
    let (catalog, _db) = catalog_with_db().await;
    let a = catalog.create_app(app("A")).await.unwrap();

    let first = catalog
        .create_certificate(certificate(a.id, "CERT-1"))
        .await
        .unwrap();
    assert!(matches!(
        catalog.create_certificate(certificate(a.id, "CERT-2")).await,
        Err(CatalogError::ConstraintViolation(_))
    ));

    // Re-saving the same certificate is not a conflict with itself.
    let updated = catalog
        .update_certificate(
            first.id,
            CertificateInput {
                issued_by: "Other board".to_string(),
                ..certificate(a.id, "CERT-1")
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.issued_by, "Other board");
    assert_eq!(updated.issue_date, first.issue_date);
    assert_eq!(
        catalog.certificate_for_app(a.id).await.unwrap(),
        Some(updated)
    );
}

#[tokio::test]
async fn delete_app_cascades_but_keeps_stores() {
    let (catalog, db) = catalog_with_db().await;
    let doomed = catalog.create_app(app("Doomed")).await.unwrap();
    let kept = catalog.create_app(app("Kept")).await.unwrap();
    let user = catalog.create_user("reviewer", "pw", false).await.unwrap();

    for rating in [3, 5] {
        catalog
            .add_review(ReviewInput {
                app_id: doomed.id,
                user_id: user.id,
                review_text: "nice".to_string(),
                rating,
            })
            .await
            .unwrap();
    }
    catalog
        .add_review(ReviewInput {
            app_id: kept.id,
            user_id: user.id,
            review_text: String::new(),
            rating: 0,
        })
        .await
        .unwrap();
    catalog
        .create_certificate(certificate(doomed.id, "CERT-9"))
        .await
        .unwrap();
    let shop = catalog
        .create_store(store("Shop", vec![doomed.id, kept.id]))
        .await
        .unwrap();

    catalog.delete_app(doomed.id).await.unwrap();

    assert!(matches!(
        catalog.app(doomed.id).await,
        Err(CatalogError::NotFound(_))
    ));
    assert!(catalog.reviews_for_app(doomed.id).await.unwrap().is_empty());
    assert_eq!(catalog.reviews_for_app(kept.id).await.unwrap().len(), 1);
    assert_eq!(catalog.certificate_for_app(doomed.id).await.unwrap(), None);
    assert_eq!(count(&db, "certificates").await, 0);

    assert_eq!(catalog.store(shop.id).await.unwrap(), shop);
    assert_eq!(catalog.store_app_ids(shop.id).await.unwrap(), vec![kept.id]);
    assert!(catalog.stores_carrying(doomed.id).await.unwrap().is_empty());

    assert!(matches!(
        catalog.delete_app(doomed.id).await,
        Err(CatalogError::NotFound(_))
    ));
}

#[tokio::test]
async fn stores_carrying_returns_exact_members() {
    let (catalog, _db) = catalog_with_db().await;
    let one = catalog.create_app(app("One")).await.unwrap();
    let two = catalog.create_app(app("Two")).await.unwrap();

    let north = catalog
        .create_store(store("North", vec![one.id]))
        .await
        .unwrap();
    let south = catalog
        .create_store(store("South", vec![one.id, two.id]))
        .await
        .unwrap();
    catalog
        .create_store(store("West", vec![two.id]))
        .await
        .unwrap();
    catalog.create_store(store("Empty", vec![])).await.unwrap();

    let carrying_one = catalog.stores_carrying(one.id).await.unwrap();
    assert_eq!(carrying_one, vec![north, south]);
    assert_eq!(catalog.stores_carrying(two.id).await.unwrap().len(), 2);
    assert!(catalog.stores_carrying(12345).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_store_replaces_app_set() {
    let (catalog, _db) = catalog_with_db().await;
    let one = catalog.create_app(app("One")).await.unwrap();
    let two = catalog.create_app(app("Two")).await.unwrap();
    let shop = catalog
        .create_store(store("Shop", vec![one.id]))
        .await
        .unwrap();

    let updated = catalog
        .update_store(
            shop.id,
            StoreInput {
                email: Some("shop@example.com".to_string()),
                ..store("Shop 2", vec![two.id])
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Shop 2");
    assert_eq!(updated.email.as_deref(), Some("shop@example.com"));
    assert_eq!(catalog.store_app_ids(shop.id).await.unwrap(), vec![two.id]);

    let err = catalog
        .update_store(shop.id, store("Shop 3", vec![two.id, 999]))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::ConstraintViolation(_)));
    // The failed write rolled back.
    assert_eq!(catalog.store(shop.id).await.unwrap().name, "Shop 2");
    assert_eq!(catalog.store_app_ids(shop.id).await.unwrap(), vec![two.id]);
}

#[tokio::test]
async fn delete_store_keeps_apps() {
    let (catalog, db) = catalog_with_db().await;
    let one = catalog.create_app(app("One")).await.unwrap();
    let shop = catalog
        .create_store(store("Shop", vec![one.id]))
        .await
        .unwrap();

    catalog.delete_store(shop.id).await.unwrap();
    assert_eq!(count(&db, "store_apps").await, 0);
    assert!(catalog.app(one.id).await.is_ok());
    assert!(matches!(
        catalog.delete_store(shop.id).await,
        Err(CatalogError::NotFound(_))
    ));
}

#[tokio::test]
async fn reviews_validate_rating_and_references() {
    let (catalog, _db) = catalog_with_db().await;
    let a = catalog.create_app(app("A")).await.unwrap();
    let user = catalog.create_user("ann", "pw", false).await.unwrap();

    let review = ReviewInput {
        app_id: a.id,
        user_id: user.id,
        review_text: "ok".to_string(),
        rating: 6,
    };
    assert!(matches!(
        catalog.add_review(review.clone()).await,
        Err(CatalogError::ConstraintViolation(_))
    ));
    assert!(matches!(
        catalog
            .add_review(ReviewInput {
                user_id: 999,
                rating: 4,
                ..review.clone()
            })
            .await,
        Err(CatalogError::ConstraintViolation(_))
    ));

    let saved = catalog
        .add_review(ReviewInput {
            rating: 4,
            ..review
        })
        .await
        .unwrap();
    assert_eq!(saved.username, "ann");
    assert_eq!(saved.rating, 4);
}

#[tokio::test]
async fn save_app_applies_inline_review_changes() {
    let (catalog, _db) = catalog_with_db().await;
    let user = catalog.create_user("ann", "pw", false).await.unwrap();
    let created = catalog
        .save_app(
            None,
            app("Inline"),
            vec![ReviewChange::Add(ReviewInput {
                app_id: 0,
                user_id: user.id,
                review_text: "first".to_string(),
                rating: 2,
            })],
        )
        .await
        .unwrap();

    let reviews = catalog.reviews_for_app(created.id).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].app_id, created.id);
    let first_id = reviews[0].id;

    catalog
        .save_app(
            Some(created.id),
            app("Inline"),
            vec![
                ReviewChange::Update(
                    first_id,
                    ReviewInput {
                        app_id: 0,
                        user_id: user.id,
                        review_text: "edited".to_string(),
                        rating: 5,
                    },
                ),
                ReviewChange::Add(ReviewInput {
                    app_id: 0,
                    user_id: user.id,
                    review_text: "second".to_string(),
                    rating: 1,
                }),
            ],
        )
        .await
        .unwrap();
    let reviews = catalog.reviews_for_app(created.id).await.unwrap();
    let texts: Vec<&str> = reviews.iter().map(|r| r.review_text.as_str()).collect();
    assert_eq!(texts, vec!["edited", "second"]);

    // A bad row rolls back the whole save, app fields included.
    let err = catalog
        .save_app(
            Some(created.id),
            app("Renamed"),
            vec![
                ReviewChange::Delete(first_id),
                ReviewChange::Add(ReviewInput {
                    app_id: 0,
                    user_id: user.id,
                    review_text: String::new(),
                    rating: 9,
                }),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::ConstraintViolation(_)));
    assert_eq!(catalog.app(created.id).await.unwrap().name, "Inline");
    assert_eq!(catalog.reviews_for_app(created.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn app_detail_collects_relations() {
    let (catalog, _db) = catalog_with_db().await;
    let a = catalog.create_app(app("A")).await.unwrap();
    let other = catalog.create_app(app("Other")).await.unwrap();
    let user = catalog.create_user("ann", "pw", false).await.unwrap();
    catalog
        .add_review(ReviewInput {
            app_id: a.id,
            user_id: user.id,
            review_text: "great".to_string(),
            rating: 5,
        })
        .await
        .unwrap();
    let cert = catalog
        .create_certificate(certificate(a.id, "C-1"))
        .await
        .unwrap();
    let shop = catalog
        .create_store(store("Shop", vec![a.id]))
        .await
        .unwrap();
    catalog
        .create_store(store("Elsewhere", vec![other.id]))
        .await
        .unwrap();

    let detail = catalog.app_detail(a.id).await.unwrap();
    assert_eq!(detail.app, a);
    assert_eq!(detail.reviews.len(), 1);
    assert_eq!(detail.reviews[0].username, "ann");
    assert_eq!(detail.certificate, Some(cert));
    assert_eq!(detail.stores, vec![shop]);

    let bare = catalog.app_detail(other.id).await.unwrap();
    assert!(bare.reviews.is_empty());
    assert_eq!(bare.certificate, None);
}

#[tokio::test]
async fn users_authenticate_and_cascade_reviews() {
    let (catalog, db) = catalog_with_db().await;
    let staff = catalog.create_user("admin", "s3cret", true).await.unwrap();
    assert!(staff.is_staff);

    assert!(matches!(
        catalog.create_user("admin", "other", false).await,
        Err(CatalogError::ConstraintViolation(_))
    ));
    assert_eq!(
        catalog.authenticate("admin", "s3cret").await.unwrap(),
        Some(staff.clone())
    );
    assert_eq!(catalog.authenticate("admin", "wrong").await.unwrap(), None);
    assert_eq!(catalog.authenticate("nobody", "s3cret").await.unwrap(), None);

    let a = catalog.create_app(app("A")).await.unwrap();
    catalog
        .add_review(ReviewInput {
            app_id: a.id,
            user_id: staff.id,
            review_text: String::new(),
            rating: 1,
        })
        .await
        .unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "DELETE FROM users WHERE id = ?",
        vec![staff.id.into()],
    ))
    .await
    .unwrap();
    assert_eq!(count(&db, "reviews").await, 0);
}

#[tokio::test]
async fn save_image_writes_under_media_root() {
    let (catalog, _db) = catalog_with_db().await;
    let relative = catalog.save_image("logo.PNG", b"\x89PNG").await.unwrap();
    assert!(relative.starts_with("mini_apps/"));
    assert!(relative.ends_with(".png"));

    let stored = std::fs::read(catalog.media_root().join(&relative)).unwrap();
    assert_eq!(stored, b"\x89PNG");

    assert!(matches!(
        catalog.save_image("notes.txt", b"hello").await,
        Err(CatalogError::Validation(_))
    ));
    assert!(matches!(
        catalog.save_image("empty.png", b"").await,
        Err(CatalogError::Validation(_))
    ));
}
