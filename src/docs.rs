use crate::api::attendance::{AttendanceResponse, MarkAttendance};
use crate::api::employee::{EmployeeInput, EmployeeResponse};
use crate::model::department::Department;
use crate::model::job_title::JobTitle;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Records API",
        version = "1.0.0",
        description = r#"
## HR Record-Keeping Backend

REST backend for a small HR system: an employee directory, daily attendance
marking, and seeded reference data, with the single-page frontend served
from the same process.

### 🔹 Key Features
- **Employee Directory**
  - Create, update, list, view, and delete employee profiles
  - Public employee codes (`EMP001`, `EMP002`, ...) assigned on creation
- **Daily Attendance**
  - One record per employee per calendar day
  - Re-marking a day overwrites the existing record
- **Reference Data**
  - Department and job title lookups, seeded at startup

### 📦 Response Format
- JSON-based RESTful responses
- Employee and attendance payloads use camelCase field names
- Employees embed their department and job title objects

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::list_attendance,
        crate::api::attendance::mark_attendance,

        crate::api::reference::list_departments,
        crate::api::reference::list_job_titles
    ),
    components(
        schemas(
            EmployeeInput,
            EmployeeResponse,
            MarkAttendance,
            AttendanceResponse,
            Department,
            JobTitle
        )
    ),
    tags(
        (name = "Employee", description = "Employee directory APIs"),
        (name = "Attendance", description = "Daily attendance APIs"),
        (name = "Reference", description = "Department and job title lookups"),
    )
)]
pub struct ApiDoc;
