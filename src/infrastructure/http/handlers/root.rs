//! Root Handler - 服务信息

use axum::Json;

use crate::infrastructure::http::dto::ServiceInfo;

/// GET /
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo::current())
}
