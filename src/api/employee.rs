use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;
use validator::Validate;

use crate::model::{department::Department, employee::Employee, job_title::JobTitle};

/// Request body shared by create and update; the wire contract is
/// camelCase, storage is snake_case.
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    #[schema(example = "Ann Lee")]
    pub full_name: String,
    #[schema(example = "ann@x.com", format = "email")]
    #[validate(email)]
    pub email: String,
    #[schema(example = 1)]
    pub department_id: i64,
    #[schema(example = 1)]
    pub job_title_id: i64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 4,
    "employeeId": "EMP004",
    "fullName": "Ann Lee",
    "email": "ann@x.com",
    "departmentId": 1,
    "jobTitleId": 1,
    "createdAt": "2024-03-01T09:00:00",
    "department": { "id": 1, "name": "Engineering" },
    "jobTitle": { "id": 1, "name": "Senior Developer" }
}))]
pub struct EmployeeResponse {
    pub id: i64,
    #[schema(example = "EMP004")]
    pub employee_id: String,
    #[schema(example = "Ann Lee")]
    pub full_name: String,
    #[schema(example = "ann@x.com")]
    pub email: String,
    pub department_id: i64,
    pub job_title_id: i64,
    #[schema(example = "2024-03-01T09:00:00", value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
    /// Joined department row; null only if the foreign key were dangling.
    pub department: Option<Department>,
    pub job_title: Option<JobTitle>,
}

impl EmployeeResponse {
    fn from_parts(row: Employee, department: Department, job_title: JobTitle) -> Self {
        Self {
            id: row.id,
            employee_id: row.employee_id,
            full_name: row.full_name,
            email: row.email,
            department_id: row.department_id,
            job_title_id: row.job_title_id,
            created_at: row.created_at,
            department: Some(department),
            job_title: Some(job_title),
        }
    }
}

/// Employee row joined with its reference names, as selected by
/// [`EMPLOYEE_SELECT`].
#[derive(sqlx::FromRow)]
struct EmployeeJoinRow {
    id: i64,
    employee_id: String,
    full_name: String,
    email: String,
    department_id: i64,
    job_title_id: i64,
    created_at: NaiveDateTime,
    department_name: Option<String>,
    job_title_name: Option<String>,
}

impl From<EmployeeJoinRow> for EmployeeResponse {
    fn from(row: EmployeeJoinRow) -> Self {
        let department = row.department_name.map(|name| Department {
            id: row.department_id,
            name,
        });
        let job_title = row.job_title_name.map(|name| JobTitle {
            id: row.job_title_id,
            name,
        });
        Self {
            id: row.id,
            employee_id: row.employee_id,
            full_name: row.full_name,
            email: row.email,
            department_id: row.department_id,
            job_title_id: row.job_title_id,
            created_at: row.created_at,
            department,
            job_title,
        }
    }
}

const EMPLOYEE_SELECT: &str = r#"
SELECT e.id, e.employee_id, e.full_name, e.email,
       e.department_id, e.job_title_id, e.created_at,
       d.name AS department_name, j.name AS job_title_name
FROM employees e
LEFT JOIN departments d ON d.id = e.department_id
LEFT JOIN job_titles j ON j.id = e.job_title_id
"#;

/// Formats the public employee code from the row's primary key. The key
/// comes from an AUTOINCREMENT column, so codes are never reissued after a
/// delete; widths past 999 simply grow.
fn employee_code(id: i64) -> String {
    format!("EMP{:03}", id)
}

/// 400 body for a failed [`Validate`] pass on the input DTO. Only the
/// email rule exists today, so the first offending field is the message.
fn validation_response(errors: &validator::ValidationErrors) -> HttpResponse {
    let field = errors
        .field_errors()
        .into_keys()
        .next()
        .unwrap_or_else(|| "body".into());
    HttpResponse::BadRequest().json(json!({
        "message": format!("Invalid {field} address"),
        "field": field
    }))
}

async fn fetch_department(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

async fn fetch_job_title(pool: &SqlitePool, id: i64) -> Result<Option<JobTitle>, sqlx::Error> {
    sqlx::query_as::<_, JobTitle>("SELECT id, name FROM job_titles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// List employees, newest first, each expanded with its department and job
/// title.
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All employees, newest first", body = [EmployeeResponse])
    ),
    tag = "Employee"
)]
pub async fn list_employees(pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let sql = format!("{EMPLOYEE_SELECT} ORDER BY e.created_at DESC, e.id DESC");

    let employees = sqlx::query_as::<_, EmployeeJoinRow>(&sql)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch employees");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(
        employees
            .into_iter()
            .map(EmployeeResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// Get employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(
        ("id" = i64, Path, description = "Employee primary key")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeResponse),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let sql = format!("{EMPLOYEE_SELECT} WHERE e.id = ?");

    let employee = sqlx::query_as::<_, EmployeeJoinRow>(&sql)
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to fetch employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match employee {
        Some(row) => Ok(HttpResponse::Ok().json(EmployeeResponse::from(row))),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Create employee
///
/// Assigns the next public employee code from the persisted id sequence and
/// returns the created row, expanded.
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = EmployeeInput,
    responses(
        (status = 201, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Malformed email", body = Object, example = json!({
            "message": "Invalid email address", "field": "email"
        })),
        (status = 404, description = "Department or job title not found", body = Object, example = json!({
            "message": "Department not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<SqlitePool>,
    payload: web::Json<EmployeeInput>,
) -> actix_web::Result<impl Responder> {
    let input = payload.into_inner();

    if let Err(errors) = input.validate() {
        return Ok(validation_response(&errors));
    }

    let Some(department) = fetch_department(pool.get_ref(), input.department_id)
        .await
        .map_err(|e| {
            error!(error = %e, department_id = input.department_id, "Failed to fetch department");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
    else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Department not found"
        })));
    };

    let Some(job_title) = fetch_job_title(pool.get_ref(), input.job_title_id)
        .await
        .map_err(|e| {
            error!(error = %e, job_title_id = input.job_title_id, "Failed to fetch job title");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
    else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Job title not found"
        })));
    };

    // The public code embeds the assigned primary key, so the row is
    // inserted with a placeholder and the code is set in the same
    // transaction.
    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (id, created_at): (i64, NaiveDateTime) = sqlx::query_as(
        r#"
        INSERT INTO employees (employee_id, full_name, email, department_id, job_title_id)
        VALUES ('', ?, ?, ?, ?)
        RETURNING id, created_at
        "#,
    )
    .bind(&input.full_name)
    .bind(&input.email)
    .bind(department.id)
    .bind(job_title.id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create employee");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let code = employee_code(id);
    sqlx::query("UPDATE employees SET employee_id = ? WHERE id = ?")
        .bind(&code)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to assign employee code");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit employee creation");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let row = Employee {
        id,
        employee_id: code,
        full_name: input.full_name,
        email: input.email,
        department_id: department.id,
        job_title_id: job_title.id,
        created_at,
    };

    Ok(HttpResponse::Created().json(EmployeeResponse::from_parts(row, department, job_title)))
}

/// Update employee
///
/// Replaces name, email, department, and job title; the public code and
/// creation time never change.
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(
        ("id" = i64, Path, description = "Employee primary key")
    ),
    request_body = EmployeeInput,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "Malformed email"),
        (status = 404, description = "Employee, department, or job title not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<EmployeeInput>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let input = payload.into_inner();

    if let Err(errors) = input.validate() {
        return Ok(validation_response(&errors));
    }

    let existing: Option<(String, NaiveDateTime)> =
        sqlx::query_as("SELECT employee_id, created_at FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, id, "Failed to fetch employee");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    let Some((code, created_at)) = existing else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    };

    let Some(department) = fetch_department(pool.get_ref(), input.department_id)
        .await
        .map_err(|e| {
            error!(error = %e, department_id = input.department_id, "Failed to fetch department");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
    else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Department not found"
        })));
    };

    let Some(job_title) = fetch_job_title(pool.get_ref(), input.job_title_id)
        .await
        .map_err(|e| {
            error!(error = %e, job_title_id = input.job_title_id, "Failed to fetch job title");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
    else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Job title not found"
        })));
    };

    sqlx::query(
        r#"
        UPDATE employees
        SET full_name = ?, email = ?, department_id = ?, job_title_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.full_name)
    .bind(&input.email)
    .bind(department.id)
    .bind(job_title.id)
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, id, "Failed to update employee");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let row = Employee {
        id,
        employee_id: code,
        full_name: input.full_name,
        email: input.email,
        department_id: department.id,
        job_title_id: job_title.id,
        created_at,
    };

    Ok(HttpResponse::Ok().json(EmployeeResponse::from_parts(row, department, job_title)))
}

/// Delete employee
///
/// Removes the employee and all of their attendance rows in one
/// transaction.
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(
        ("id" = i64, Path, description = "Employee primary key")
    ),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM employees WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to fetch employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if existing.is_none() {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    sqlx::query("DELETE FROM attendance WHERE employee_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete attendance records");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit employee deletion");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_code_is_zero_padded() {
        assert_eq!(employee_code(1), "EMP001");
        assert_eq!(employee_code(42), "EMP042");
        assert_eq!(employee_code(999), "EMP999");
    }

    #[test]
    fn employee_code_widens_past_three_digits() {
        assert_eq!(employee_code(1000), "EMP1000");
    }

    fn input_with_email(email: &str) -> EmployeeInput {
        EmployeeInput {
            full_name: "Ann Lee".to_string(),
            email: email.to_string(),
            department_id: 1,
            job_title_id: 1,
        }
    }

    #[test]
    fn accepts_plain_addresses() {
        assert!(input_with_email("ann@x.com").validate().is_ok());
        assert!(input_with_email("john.doe@example.com").validate().is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "not-an-email",
            "@example.com",
            "ann@.com",
            "ann@x..com",
            "ann@x.com@y.com",
            "ann lee@x.com",
            "",
        ] {
            let errors = input_with_email(email)
                .validate()
                .expect_err(&format!("{email:?} should be rejected"));
            assert!(errors.field_errors().contains_key("email"));
        }
    }

    #[test]
    fn validation_response_names_the_field() {
        let errors = input_with_email("ann@x..com").validate().unwrap_err();
        let resp = validation_response(&errors);
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
