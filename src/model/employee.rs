use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage row for the employees table. The public `employee_id` code is
/// derived from the primary key at creation time; `created_at` is filled by
/// the column default.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: i64,
    pub employee_id: String,
    pub full_name: String,
    pub email: String,
    pub department_id: i64,
    pub job_title_id: i64,
    pub created_at: NaiveDateTime,
}
