//! Route configuration.

use axum::{extract::DefaultBodyLimit, http::HeaderValue, middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::ServiceConfig;

use crate::handlers::upload_handler::FILES_MOUNT;
use crate::handlers::{branch_routes, health_routes, upload_routes};
use crate::middleware::auth_middleware;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Request body ceiling for multipart uploads.
pub const MAX_UPLOAD_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.service);
    let files = ServeDir::new(&state.upload_dir);

    Router::new()
        // Health check (no auth)
        .nest("/health", health_routes())
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Branch routes (auth required)
        .nest(
            "/branches",
            branch_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Upload routes (auth required, larger bodies)
        .nest(
            "/uploads",
            upload_routes()
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                ))
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        // Stored files (public)
        .nest_service(FILES_MOUNT, files)
        .layer(cors)
        .with_state(state)
}

/// Permissive in dev mode, otherwise only the configured origins.
fn cors_layer(config: &ServiceConfig) -> CorsLayer {
    if config.mode.is_dev() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use common::{AppError, JwtConfig};
    use domain::{Branch, CreateManagement};
    use persistence::PaginatedResult;
    use storage::UploadResult;

    use super::*;
    use crate::auth::TokenUtil;
    use crate::infra::Database;
    use crate::service::{MockBranchService, MockUploadService};

    const SECRET: &str = "router-test-secret-long-enough-0123456789";

    fn tokens() -> TokenUtil {
        TokenUtil::new(&JwtConfig::new(SECRET, 60).unwrap())
    }

    fn bearer() -> String {
        format!("Bearer {}", tokens().create_access_token("tester").unwrap())
    }

    fn management(id: &str) -> Branch {
        Branch::management(
            CreateManagement {
                id: id.to_string(),
                name: "Klinik Pusat".to_string(),
                address: "Jl. Merdeka 1".to_string(),
                email: "pusat@klinik.example".to_string(),
            },
            "client-1",
        )
    }

    async fn app(branches: MockBranchService, uploads: MockUploadService) -> Router {
        let connection = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        create_router(AppState {
            branches: Arc::new(branches),
            uploads: Arc::new(uploads),
            tokens: Arc::new(tokens()),
            database: Database::from_connection(connection),
            document_store: None,
            service: ServiceConfig::default(),
            upload_dir: std::env::temp_dir(),
        })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn authed(method: &str, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, bearer())
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app(MockBranchService::new(), MockUploadService::new()).await;

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["services"]["database"]["status"], "healthy");
        assert!(json["services"].get("document_store").is_none());
    }

    #[tokio::test]
    async fn test_branches_require_token() {
        let app = app(MockBranchService::new(), MockUploadService::new()).await;

        let response = app
            .oneshot(Request::get("/branches").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let app = app(MockBranchService::new(), MockUploadService::new()).await;

        let response = app
            .oneshot(
                Request::get("/branches")
                    .header(header::AUTHORIZATION, "Bearer not-a-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_branches_envelope() {
        let mut branches = MockBranchService::new();
        branches
            .expect_list_branches()
            .withf(|filter, page, per_page| {
                filter.search.as_deref() == Some("pusat") && *page == 2 && *per_page == 10
            })
            .times(1)
            .returning(|_, page, per_page| {
                Ok(PaginatedResult::new(vec![management("MGT001")], 11, page, per_page))
            });
        let app = app(branches, MockUploadService::new()).await;

        let response = app
            .oneshot(
                authed("GET", "/branches?page=2&per_page=10&search=pusat")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], true);
        assert_eq!(json["resource"][0]["id"], "MGT001");
        assert_eq!(json["meta"]["totalItem"], 11);
        assert_eq!(json["meta"]["totalPage"], 2);
    }

    #[tokio::test]
    async fn test_add_management_created() {
        let mut branches = MockBranchService::new();
        branches
            .expect_add_management()
            .withf(|cmd| cmd.id == "MGT001")
            .times(1)
            .returning(|cmd| Ok(Branch::management(cmd, "client-1")));
        let app = app(branches, MockUploadService::new()).await;

        let body = serde_json::json!({
            "id": "MGT001",
            "name": "Klinik Pusat",
            "address": "Jl. Merdeka 1",
            "email": "pusat@klinik.example"
        });
        let response = app
            .oneshot(
                authed("POST", "/branches/management")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["code"], 201);
        assert_eq!(json["resource"]["upline"], "0");
        assert_eq!(json["resource"]["is_management"], true);
        assert_eq!(json["resource"]["city"], "Bandung");
    }

    #[tokio::test]
    async fn test_invalid_body_never_reaches_service() {
        let mut branches = MockBranchService::new();
        branches.expect_add_management().never();
        let app = app(branches, MockUploadService::new()).await;

        let body = serde_json::json!({
            "id": "MGT001",
            "name": "Klinik Pusat",
            "address": "Jl. Merdeka 1",
            "email": "not-an-email"
        });
        let response = app
            .oneshot(
                authed("POST", "/branches/management")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "Invalid email format");
    }

    #[tokio::test]
    async fn test_duplicate_id_is_conflict() {
        let mut branches = MockBranchService::new();
        branches
            .expect_add_branch()
            .returning(|cmd| Err(AppError::conflict(format!("Branch {}", cmd.id))));
        let app = app(branches, MockUploadService::new()).await;

        let body = serde_json::json!({
            "id": "CBG001",
            "name": "Klinik Dago",
            "address": "Jl. Dago 10",
            "email": "dago@klinik.example",
            "upline": "MGT001"
        });
        let response = app
            .oneshot(
                authed("POST", "/branches")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_missing_branch_is_not_found() {
        let mut branches = MockBranchService::new();
        branches
            .expect_get_branch()
            .withf(|id| id == "NOPE")
            .returning(|_| Err(AppError::NotFound));
        let app = app(branches, MockUploadService::new()).await;

        let response = app
            .oneshot(authed("GET", "/branches/NOPE").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_branch() {
        let mut branches = MockBranchService::new();
        branches
            .expect_delete_branch()
            .withf(|id| id == "CBG001")
            .times(1)
            .returning(|_| Ok(()));
        let app = app(branches, MockUploadService::new()).await;

        let response = app
            .oneshot(authed("DELETE", "/branches/CBG001").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_multipart_batch() {
        let mut uploads = MockUploadService::new();
        uploads
            .expect_upload()
            .withf(|files, base_url, uploaded_by| {
                files.len() == 2
                    && base_url == "https://api.example.com/files"
                    && uploaded_by == "tester"
            })
            .times(1)
            .returning(|files, base_url, _| {
                Ok(files
                    .into_iter()
                    .map(|file| UploadResult {
                        file_name: format!("generated-{}", file.file_name),
                        url: format!("{}/2026/10/16/generated-{}", base_url, file.file_name),
                        original_name: file.file_name,
                        content_type: file.content_type,
                        path: "uploads/2026/10/16".to_string(),
                        size: file.data.len() as u64,
                    })
                    .collect())
            });
        let app = app(MockBranchService::new(), uploads).await;

        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"a.png\"\r\nContent-Type: image/png\r\n\r\nAAAA\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"b.pdf\"\r\nContent-Type: application/pdf\r\n\r\nBBBBBB\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nignored\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let response = app
            .oneshot(
                authed("POST", "/uploads")
                    .header(header::HOST, "api.example.com")
                    .header("x-forwarded-proto", "https")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["resource"].as_array().unwrap().len(), 2);
        assert_eq!(json["resource"][0]["originalName"], "a.png");
        assert_eq!(json["resource"][0]["size"], 4);
    }

    #[tokio::test]
    async fn test_rejected_upload_is_bad_request() {
        let mut uploads = MockUploadService::new();
        uploads
            .expect_upload()
            .returning(|_, _, _| Err(AppError::upload_rejected("virus.exe: extension .exe is not allowed")));
        let app = app(MockBranchService::new(), uploads).await;

        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"virus.exe\"\r\n\r\nMZ\r\n--{b}--\r\n",
            b = boundary
        );
        let response = app
            .oneshot(
                authed("POST", "/uploads")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "UPLOAD_REJECTED");
    }

    #[tokio::test]
    async fn test_empty_file_input_is_no_files_submitted() {
        let mut uploads = MockUploadService::new();
        uploads
            .expect_upload()
            .withf(|files, _, _| files.is_empty())
            .times(1)
            .returning(|_, _, _| Err(AppError::NoFilesSubmitted));
        let app = app(MockBranchService::new(), uploads).await;

        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"\"\r\nContent-Type: application/octet-stream\r\n\r\n\r\n--{b}--\r\n",
            b = boundary
        );
        let response = app
            .oneshot(
                authed("POST", "/uploads")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NO_FILES_SUBMITTED");
    }

    #[tokio::test]
    async fn test_upload_listing_without_document_store() {
        let mut uploads = MockUploadService::new();
        uploads
            .expect_list_uploads()
            .returning(|_, _, _| Err(AppError::service_unavailable("document store")));
        let app = app(MockBranchService::new(), uploads).await;

        let response = app
            .oneshot(authed("GET", "/uploads").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = app(MockBranchService::new(), MockUploadService::new()).await;

        let response = app
            .oneshot(
                Request::get("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["paths"].get("/branches/{id}").is_some());
        assert!(json["paths"].get("/uploads").is_some());
    }
}
