//! Uniform JSON envelope for successful responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use persistence::{PageMetadata, PaginatedResult};

/// Page metadata as documented in the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u64,
    pub size: u64,
    pub total_item: u64,
    pub total_page: u64,
}

impl From<PageMetadata> for PageMeta {
    fn from(meta: PageMetadata) -> Self {
        Self {
            page: meta.page,
            size: meta.size,
            total_item: meta.total_item,
            total_page: meta.total_page,
        }
    }
}

/// `{status, message, code, resource, meta}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    pub message: String,
    pub code: u16,
    pub resource: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(resource: T) -> Self {
        Self::with_status(StatusCode::OK, resource)
    }

    pub fn created(resource: T) -> Self {
        Self::with_status(StatusCode::CREATED, resource)
    }

    fn with_status(status: StatusCode, resource: T) -> Self {
        Self {
            status: true,
            message: "Success".to_string(),
            code: status.as_u16(),
            resource,
            meta: None,
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// Envelope for one page, converting every record with `f`.
    pub fn page<U>(result: PaginatedResult<U>, f: impl FnMut(U) -> T) -> Self {
        let meta = result.metadata();
        let mut response = Self::ok(result.map(f).data);
        response.meta = Some(meta.into());
        response
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::ok("hello")).unwrap();
        assert_eq!(json["status"], true);
        assert_eq!(json["message"], "Success");
        assert_eq!(json["code"], 200);
        assert_eq!(json["resource"], "hello");
        assert!(json.get("meta").is_none());
    }

    #[test]
    fn test_page_envelope_carries_meta() {
        let result = PaginatedResult::new(vec![1, 2], 25, 2, 10);
        let json = serde_json::to_value(ApiResponse::page(result, |n| n * 10)).unwrap();

        assert_eq!(json["resource"], serde_json::json!([10, 20]));
        assert_eq!(json["meta"]["page"], 2);
        assert_eq!(json["meta"]["size"], 10);
        assert_eq!(json["meta"]["totalItem"], 25);
        assert_eq!(json["meta"]["totalPage"], 3);
    }

    #[test]
    fn test_created_status() {
        let response = ApiResponse::created(()).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
