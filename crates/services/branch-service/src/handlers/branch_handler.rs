//! Branch handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use common::AppResult;
use domain::{
    Auth, BranchResponse, CreateBranch, CreateManagement, UpdateBranch, MAX_ADDRESS_LENGTH,
    MAX_BRANCH_ID_LENGTH, MAX_BRANCH_NAME_LENGTH, MAX_EMAIL_LENGTH,
};

use crate::extractors::ValidatedJson;
use crate::repository::BranchFilter;
use crate::state::AppState;
use crate::types::{ApiResponse, PaginationParams};

/// Management registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateManagementRequest {
    #[validate(length(min = 1, max = MAX_BRANCH_ID_LENGTH, message = "Id must be 1-10 characters"))]
    #[schema(example = "MGT001")]
    pub id: String,
    #[validate(length(min = 1, max = MAX_BRANCH_NAME_LENGTH, message = "Name is required"))]
    #[schema(example = "Klinik Sehat Pusat")]
    pub name: String,
    #[validate(length(min = 1, max = MAX_ADDRESS_LENGTH, message = "Address is required"))]
    #[schema(example = "Jl. Asia Afrika No. 1")]
    pub address: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = MAX_EMAIL_LENGTH, message = "Email is too long")
    )]
    #[schema(example = "pusat@klinik.example")]
    pub email: String,
}

impl From<CreateManagementRequest> for CreateManagement {
    fn from(req: CreateManagementRequest) -> Self {
        CreateManagement {
            id: req.id.trim().to_string(),
            name: req.name,
            address: req.address,
            email: req.email,
        }
    }
}

/// Branch registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBranchRequest {
    #[validate(length(min = 1, max = MAX_BRANCH_ID_LENGTH, message = "Id must be 1-10 characters"))]
    #[schema(example = "CBG001")]
    pub id: String,
    #[validate(length(min = 1, max = MAX_BRANCH_NAME_LENGTH, message = "Name is required"))]
    #[schema(example = "Klinik Sehat Dago")]
    pub name: String,
    #[validate(length(min = 1, max = MAX_ADDRESS_LENGTH, message = "Address is required"))]
    #[schema(example = "Jl. Ir. H. Juanda No. 10")]
    pub address: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = MAX_EMAIL_LENGTH, message = "Email is too long")
    )]
    #[schema(example = "dago@klinik.example")]
    pub email: String,
    /// Id of the management record this branch reports to
    #[validate(length(min = 1, max = MAX_BRANCH_ID_LENGTH, message = "Upline is required"))]
    #[schema(example = "MGT001")]
    pub upline: String,
}

impl From<CreateBranchRequest> for CreateBranch {
    fn from(req: CreateBranchRequest) -> Self {
        CreateBranch {
            id: req.id.trim().to_string(),
            name: req.name,
            address: req.address,
            email: req.email,
            upline: req.upline,
        }
    }
}

/// Branch update request, absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBranchRequest {
    #[validate(length(min = 1, max = MAX_BRANCH_NAME_LENGTH, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = MAX_ADDRESS_LENGTH, message = "Address cannot be empty"))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 100, message = "City cannot be empty"))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 25, message = "Contact cannot be empty"))]
    pub contact: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    pub coordinate: Option<String>,
    #[validate(length(max = 50))]
    pub whatsapp_number: Option<String>,
    pub logo: Option<String>,
}

impl From<UpdateBranchRequest> for UpdateBranch {
    fn from(req: UpdateBranchRequest) -> Self {
        UpdateBranch {
            name: req.name,
            address: req.address,
            city: req.city,
            contact: req.contact,
            email: req.email,
            coordinate: req.coordinate,
            whatsapp_number: req.whatsapp_number,
            logo: req.logo,
        }
    }
}

/// Create branch routes
pub fn branch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_branches).post(add_branch))
        .route("/management", post(add_management))
        .route(
            "/:id",
            get(get_branch).put(update_branch).delete(delete_branch),
        )
}

/// Register a management (head office) record
#[utoipa::path(
    post,
    path = "/branches/management",
    tag = "Branches",
    security(("bearer_auth" = [])),
    request_body = CreateManagementRequest,
    responses(
        (status = 201, description = "Management created", body = BranchResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Id already in use")
    )
)]
pub async fn add_management(
    Extension(auth): Extension<Auth>,
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateManagementRequest>,
) -> AppResult<ApiResponse<BranchResponse>> {
    tracing::debug!(uid = %auth.uid, id = %req.id, "Registering management");
    let branch = state.branches.add_management(req.into()).await?;
    Ok(ApiResponse::created(branch.into()))
}

/// Register a branch under a management record
#[utoipa::path(
    post,
    path = "/branches",
    tag = "Branches",
    security(("bearer_auth" = [])),
    request_body = CreateBranchRequest,
    responses(
        (status = 201, description = "Branch created", body = BranchResponse),
        (status = 400, description = "Validation error or unknown upline"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Id already in use")
    )
)]
pub async fn add_branch(
    Extension(auth): Extension<Auth>,
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateBranchRequest>,
) -> AppResult<ApiResponse<BranchResponse>> {
    tracing::debug!(uid = %auth.uid, id = %req.id, "Registering branch");
    let branch = state.branches.add_branch(req.into()).await?;
    Ok(ApiResponse::created(branch.into()))
}

/// List branches, one page at a time
#[utoipa::path(
    get,
    path = "/branches",
    tag = "Branches",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of branches", body = Vec<BranchResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_branches(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<ApiResponse<Vec<BranchResponse>>> {
    let filter = BranchFilter {
        search: params.search(),
        management: params.management,
    };
    let result = state
        .branches
        .list_branches(filter, params.page(), params.per_page())
        .await?;
    Ok(ApiResponse::page(result, BranchResponse::from))
}

/// Get branch by id
#[utoipa::path(
    get,
    path = "/branches/{id}",
    tag = "Branches",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Branch id")
    ),
    responses(
        (status = 200, description = "Branch", body = BranchResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Branch not found")
    )
)]
pub async fn get_branch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BranchResponse>> {
    let branch = state.branches.get_branch(&id).await?;
    Ok(ApiResponse::ok(branch.into()))
}

/// Update branch fields
#[utoipa::path(
    put,
    path = "/branches/{id}",
    tag = "Branches",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Branch id")
    ),
    request_body = UpdateBranchRequest,
    responses(
        (status = 200, description = "Branch updated", body = BranchResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Branch not found")
    )
)]
pub async fn update_branch(
    Extension(auth): Extension<Auth>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateBranchRequest>,
) -> AppResult<ApiResponse<BranchResponse>> {
    tracing::debug!(uid = %auth.uid, id = %id, "Updating branch");
    let branch = state.branches.update_branch(&id, req.into()).await?;
    Ok(ApiResponse::ok(branch.into()))
}

/// Soft delete a branch
#[utoipa::path(
    delete,
    path = "/branches/{id}",
    tag = "Branches",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Branch id")
    ),
    responses(
        (status = 200, description = "Branch deleted"),
        (status = 400, description = "Management still has active branches"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Branch not found")
    )
)]
pub async fn delete_branch(
    Extension(auth): Extension<Auth>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    tracing::debug!(uid = %auth.uid, id = %id, "Deleting branch");
    state.branches.delete_branch(&id).await?;
    Ok(ApiResponse::ok(()))
}
