//! Tests for categories module
//!
//! These tests verify category CRUD behavior including:
//! - Request validation
//! - Duplicate name rejection
//! - Usage statistics aggregation
//! - Guarded deletion with force-detach

#[cfg(test)]
mod tests {
    use super::super::handlers;
    use super::super::models::{
        CreateCategoryRequest, DeleteCategoryParams, ListCategoriesParams, PaginationParams,
        UpdateCategoryRequest,
    };
    use crate::auth::tokens::TokenCodec;
    use crate::auth::{ActiveUser, User};
    use crate::common::config::JwtConfig;
    use crate::common::{ApiError, AppState, Validator};

    use axum::extract::{Extension, Json, Path, Query};
    use axum::http::StatusCode;
    use jsonwebtoken::Algorithm;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    async fn test_state() -> Arc<RwLock<AppState>> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("failed to open in-memory database");

        crate::common::migrations::run_migrations(&pool)
            .await
            .expect("migrations failed");

        let jwt_config = JwtConfig {
            secret_key: "test_secret_key".to_string(),
            algorithm: Algorithm::HS256,
            access_token_expire_minutes: 30,
            refresh_token_expire_days: 7,
        };

        Arc::new(RwLock::new(AppState {
            db: pool,
            http: reqwest::Client::new(),
            tokens: TokenCodec::new(jwt_config),
            oauth: None,
        }))
    }

    async fn seed_user(pool: &SqlitePool, email: &str) -> User {
        sqlx::query("INSERT INTO users (email, username, provider) VALUES (?, ?, 'local')")
            .bind(email)
            .bind(email.split('@').next().unwrap())
            .execute(pool)
            .await
            .unwrap();

        sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn insert_expense(pool: &SqlitePool, owner_id: i64, category_id: i64, amount: f64) {
        sqlx::query(
            r#"
            INSERT INTO expenses (name, currency, amount, category_id, owner_id, date)
            VALUES ('test expense', 'USD', ?, ?, ?, datetime('now'))
            "#,
        )
        .bind(amount)
        .bind(category_id)
        .bind(owner_id)
        .execute(pool)
        .await
        .unwrap();
    }

    fn list_params() -> Query<ListCategoriesParams> {
        Query(ListCategoriesParams {
            include_stats: None,
            skip: None,
            limit: None,
        })
    }

    #[test]
    fn test_create_category_validation() {
        let empty = CreateCategoryRequest {
            name: "   ".to_string(),
            description: None,
        };
        assert!(!empty.validate(&empty).is_valid);

        let too_long = CreateCategoryRequest {
            name: "x".repeat(300),
            description: None,
        };
        assert!(!too_long.validate(&too_long).is_valid);

        let valid = CreateCategoryRequest {
            name: "Subscriptions".to_string(),
            description: Some("Recurring services".to_string()),
        };
        assert!(valid.validate(&valid).is_valid);
    }

    #[test]
    fn test_update_category_validation() {
        let untouched = UpdateCategoryRequest {
            name: None,
            description: Some("new description".to_string()),
        };
        assert!(untouched.validate(&untouched).is_valid);

        let bad_name = UpdateCategoryRequest {
            name: Some("".to_string()),
            description: None,
        };
        assert!(!bad_name.validate(&bad_name).is_valid);
    }

    #[tokio::test]
    async fn test_default_categories_are_seeded() {
        let state = test_state().await;
        let app_state = state.read().await.clone();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
            .fetch_one(&app_state.db)
            .await
            .unwrap();
        assert_eq!(count, 16);

        let (food,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM categories WHERE name = 'Food & Dining'")
                .fetch_one(&app_state.db)
                .await
                .unwrap();
        assert_eq!(food, 1);
    }

    #[tokio::test]
    async fn test_create_category_rejects_duplicate_name() {
        let state = test_state().await;
        let app_state = state.read().await.clone();
        let user = seed_user(&app_state.db, "cat@example.com").await;

        let (status, Json(created)) = handlers::create_category(
            Extension(state.clone()),
            ActiveUser { user: user.clone() },
            Json(CreateCategoryRequest {
                name: "Test Category".to_string(),
                description: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.name, "Test Category");

        let result = handlers::create_category(
            Extension(state.clone()),
            ActiveUser { user },
            Json(CreateCategoryRequest {
                name: "Test Category".to_string(),
                description: Some("again".to_string()),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_get_category_not_found() {
        let state = test_state().await;
        let app_state = state.read().await.clone();
        let user = seed_user(&app_state.db, "missing@example.com").await;

        let result =
            handlers::get_category(Extension(state.clone()), ActiveUser { user }, Path(9999))
                .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_category_usage_statistics() {
        let state = test_state().await;
        let app_state = state.read().await.clone();
        let user = seed_user(&app_state.db, "stats@example.com").await;

        let (_, Json(category)) = handlers::create_category(
            Extension(state.clone()),
            ActiveUser { user: user.clone() },
            Json(CreateCategoryRequest {
                name: "Stats Category".to_string(),
                description: None,
            }),
        )
        .await
        .unwrap();

        insert_expense(&app_state.db, user.id, category.id, 12.5).await;
        insert_expense(&app_state.db, user.id, category.id, 7.5).await;

        let Json(with_stats) =
            handlers::get_category(Extension(state.clone()), ActiveUser { user }, Path(category.id))
                .await
                .unwrap();

        assert_eq!(with_stats.expense_count, 2);
        assert!((with_stats.total_amount - 20.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_update_category_rejects_name_conflict() {
        let state = test_state().await;
        let app_state = state.read().await.clone();
        let user = seed_user(&app_state.db, "rename@example.com").await;

        let (_, Json(category)) = handlers::create_category(
            Extension(state.clone()),
            ActiveUser { user: user.clone() },
            Json(CreateCategoryRequest {
                name: "Original Name".to_string(),
                description: None,
            }),
        )
        .await
        .unwrap();

        // "Travel" is one of the seeded defaults
        let result = handlers::update_category(
            Extension(state.clone()),
            ActiveUser { user: user.clone() },
            Path(category.id),
            Json(UpdateCategoryRequest {
                name: Some("Travel".to_string()),
                description: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));

        let Json(updated) = handlers::update_category(
            Extension(state.clone()),
            ActiveUser { user },
            Path(category.id),
            Json(UpdateCategoryRequest {
                name: Some("Renamed".to_string()),
                description: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Renamed");
    }

    #[tokio::test]
    async fn test_delete_category_guarded_by_expenses() {
        let state = test_state().await;
        let app_state = state.read().await.clone();
        let user = seed_user(&app_state.db, "delete@example.com").await;

        let (_, Json(category)) = handlers::create_category(
            Extension(state.clone()),
            ActiveUser { user: user.clone() },
            Json(CreateCategoryRequest {
                name: "Doomed Category".to_string(),
                description: None,
            }),
        )
        .await
        .unwrap();

        let owner_id = user.id;
        insert_expense(&app_state.db, owner_id, category.id, 42.0).await;

        let result = handlers::delete_category(
            Extension(state.clone()),
            ActiveUser { user: user.clone() },
            Path(category.id),
            Query(DeleteCategoryParams { force: None }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));

        let status = handlers::delete_category(
            Extension(state.clone()),
            ActiveUser { user },
            Path(category.id),
            Query(DeleteCategoryParams { force: Some(true) }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        // The expense survives with its category detached
        let (orphans,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM expenses WHERE category_id IS NULL AND owner_id = ?",
        )
        .bind(owner_id)
        .fetch_one(&app_state.db)
        .await
        .unwrap();
        assert_eq!(orphans, 1);

        let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories WHERE id = ?")
            .bind(category.id)
            .fetch_one(&app_state.db)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_category_expenses_are_owner_scoped() {
        let state = test_state().await;
        let app_state = state.read().await.clone();
        let owner = seed_user(&app_state.db, "mine@example.com").await;
        let other = seed_user(&app_state.db, "theirs@example.com").await;

        let (_, Json(category)) = handlers::create_category(
            Extension(state.clone()),
            ActiveUser {
                user: owner.clone(),
            },
            Json(CreateCategoryRequest {
                name: "Shared Category".to_string(),
                description: None,
            }),
        )
        .await
        .unwrap();

        insert_expense(&app_state.db, owner.id, category.id, 10.0).await;
        insert_expense(&app_state.db, other.id, category.id, 99.0).await;

        let Json(items) = handlers::get_category_expenses(
            Extension(state.clone()),
            ActiveUser { user: owner },
            Path(category.id),
            Query(PaginationParams {
                skip: None,
                limit: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount, Some(10.0));
        assert_eq!(items[0].category_name, "Shared Category");
    }

    #[tokio::test]
    async fn test_list_categories_rejects_bad_pagination() {
        let state = test_state().await;
        let app_state = state.read().await.clone();
        let user = seed_user(&app_state.db, "page@example.com").await;

        let result = handlers::get_categories(
            Extension(state.clone()),
            ActiveUser { user: user.clone() },
            Query(ListCategoriesParams {
                include_stats: None,
                skip: Some(-1),
                limit: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));

        let result = handlers::get_categories(
            Extension(state.clone()),
            ActiveUser { user },
            Query(ListCategoriesParams {
                include_stats: None,
                skip: None,
                limit: Some(5000),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_list_categories_ok() {
        let state = test_state().await;
        let app_state = state.read().await.clone();
        let user = seed_user(&app_state.db, "list@example.com").await;

        let result =
            handlers::get_categories(Extension(state.clone()), ActiveUser { user }, list_params())
                .await;
        assert!(result.is_ok());
    }
}
