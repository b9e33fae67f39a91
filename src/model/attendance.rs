use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Storage row for the attendance table. `day` is the calendar day of
/// `date`, kept as its own column so (employee_id, day) can carry a unique
/// constraint and serve as the upsert conflict target.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendance {
    pub id: i64,
    pub employee_id: i64,
    pub date: NaiveDateTime,
    pub day: NaiveDate,
    pub present: bool,
}
