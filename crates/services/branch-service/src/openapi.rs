//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::branch_handler::{
    CreateBranchRequest, CreateManagementRequest, UpdateBranchRequest,
};
use crate::handlers::health_handler::{HealthResponse, ServiceHealth, ServiceStatus};
use crate::handlers::upload_handler::UploadedFile;
use crate::repository::UploadRecord;
use crate::types::PageMeta;
use domain::BranchResponse;

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::health_check,
        crate::handlers::branch_handler::add_management,
        crate::handlers::branch_handler::add_branch,
        crate::handlers::branch_handler::list_branches,
        crate::handlers::branch_handler::get_branch,
        crate::handlers::branch_handler::update_branch,
        crate::handlers::branch_handler::delete_branch,
        crate::handlers::upload_handler::upload,
        crate::handlers::upload_handler::list_uploads,
    ),
    components(
        schemas(
            CreateManagementRequest,
            CreateBranchRequest,
            UpdateBranchRequest,
            BranchResponse,
            UploadedFile,
            UploadRecord,
            PageMeta,
            HealthResponse,
            ServiceStatus,
            ServiceHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Backend reachability"),
        (name = "Branches", description = "Management and branch records"),
        (name = "Uploads", description = "File uploads"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
