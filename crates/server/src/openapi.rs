use axum::Json;
use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse { pub status: String }

/// Create/update payload. `value` may be a JSON number or a numeric string.
#[derive(Serialize, ToSchema)]
pub struct GradeInputDoc {
    /// Target id, PUT only
    pub id: Option<u64>,
    pub student: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
}

#[derive(Serialize, ToSchema)]
pub struct GradeDoc {
    pub id: u64,
    pub student: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
    /// RFC 3339, refreshed on every create and update
    pub timestamp: String,
}

#[derive(Serialize, ToSchema)]
pub struct TopGradesDoc { pub grades: Vec<GradeDoc> }

#[derive(Serialize, ToSchema)]
pub struct ErrorDoc { pub error: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::grades::create_grade,
        crate::routes::grades::update_grade,
        crate::routes::grades::delete_grade,
        crate::routes::grades::get_grade,
        crate::routes::grades::total,
        crate::routes::grades::average,
        crate::routes::grades::top3,
    ),
    components(
        schemas(
            HealthResponse,
            GradeInputDoc,
            GradeDoc,
            TopGradesDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "system"),
        (name = "grades")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
