use std::sync::Arc;

use poem_openapi::{OpenApi, payload::Json};

use business::domain::product::use_cases::get_all::GetAllProductsUseCase;
use business::domain::product::use_cases::ingest::{IngestProductsParams, IngestProductsUseCase};

use crate::api::error::{ErrorResponse, IntoErrorResponse};
use crate::api::product::dto::{IngestReportResponse, ProductResponse, UploadProductsRequest};
use crate::api::tags::ApiTags;

/// Cache-Control sent with catalog listings.
pub const CATALOG_CACHE_CONTROL: &str = "public, max-age=300, must-revalidate";

pub struct ProductApi {
    get_all_use_case: Arc<dyn GetAllProductsUseCase>,
    ingest_use_case: Arc<dyn IngestProductsUseCase>,
}

impl ProductApi {
    pub fn new(
        get_all_use_case: Arc<dyn GetAllProductsUseCase>,
        ingest_use_case: Arc<dyn IngestProductsUseCase>,
    ) -> Self {
        Self {
            get_all_use_case,
            ingest_use_case,
        }
    }
}

/// Product catalog API
///
/// Endpoints for listing the catalog and bulk-loading products.
#[OpenApi]
impl ProductApi {
    /// List all products
    ///
    /// Served from the cache when possible, otherwise from the database ordered by name.
    #[oai(path = "/products", method = "get", tag = "ApiTags::Products")]
    async fn get_all_products(&self) -> GetAllProductsResponse {
        match self.get_all_use_case.execute().await {
            Ok(products) => {
                let responses: Vec<ProductResponse> =
                    products.into_iter().map(|p| p.into()).collect();
                GetAllProductsResponse::Ok(Json(responses), CATALOG_CACHE_CONTROL.to_string())
            }
            Err(err) => {
                let (_status, json) = err.into_error_response();
                GetAllProductsResponse::InternalError(json)
            }
        }
    }

    /// Bulk upload products
    ///
    /// Upserts every row of a tabular upload by product name inside one transaction.
    /// Accepts either an object-storage notification or the table inline.
    #[oai(path = "/products/upload", method = "post", tag = "ApiTags::Products")]
    async fn upload_products(&self, body: Json<UploadProductsRequest>) -> UploadProductsResponse {
        let payload = match body.0.into_payload() {
            Ok(payload) => payload,
            Err(err) => {
                let (_status, json) = err.into_error_response();
                return UploadProductsResponse::BadRequest(json);
            }
        };

        match self
            .ingest_use_case
            .execute(IngestProductsParams { payload })
            .await
        {
            Ok(report) => UploadProductsResponse::Ok(Json(report.into())),
            Err(err) => {
                let (status, json) = err.into_error_response();
                match status.as_u16() {
                    400 => UploadProductsResponse::BadRequest(json),
                    _ => UploadProductsResponse::InternalError(json),
                }
            }
        }
    }
}

#[derive(poem_openapi::ApiResponse)]
pub enum GetAllProductsResponse {
    #[oai(status = 200)]
    Ok(
        Json<Vec<ProductResponse>>,
        #[oai(header = "Cache-Control")] String,
    ),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

#[derive(poem_openapi::ApiResponse)]
pub enum UploadProductsResponse {
    #[oai(status = 200)]
    Ok(Json<IngestReportResponse>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}
