use actix_web::{HttpResponse, Responder, web};
use sqlx::SqlitePool;
use tracing::error;

use crate::model::{department::Department, job_title::JobTitle};

/// List departments
#[utoipa::path(
    get,
    path = "/api/departments",
    responses(
        (status = 200, description = "All departments", body = [Department])
    ),
    tag = "Reference"
)]
pub async fn list_departments(pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let departments = sqlx::query_as::<_, Department>("SELECT id, name FROM departments")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch departments");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(departments))
}

/// List job titles
#[utoipa::path(
    get,
    path = "/api/job-titles",
    responses(
        (status = 200, description = "All job titles", body = [JobTitle])
    ),
    tag = "Reference"
)]
pub async fn list_job_titles(pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let job_titles = sqlx::query_as::<_, JobTitle>("SELECT id, name FROM job_titles")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch job titles");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(job_titles))
}
