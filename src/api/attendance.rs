use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::model::attendance::Attendance;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendance {
    #[schema(example = 4)]
    pub employee_id: i64,
    #[schema(example = "2024-03-01T09:00:00", value_type = String, format = "date-time")]
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date: NaiveDateTime,
    #[schema(example = true)]
    pub present: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 4)]
    pub employee_id: i64,
    #[schema(example = "2024-03-01T09:00:00", value_type = String, format = "date-time")]
    pub date: NaiveDateTime,
    #[schema(example = true)]
    pub present: bool,
}

impl From<Attendance> for AttendanceResponse {
    fn from(row: Attendance) -> Self {
        Self {
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            present: row.present,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    /// Filter by employee primary key
    pub employee_id: Option<i64>,
    /// Filter by calendar day; accepts an ISO date or datetime. Malformed
    /// values drop the filter instead of failing the request.
    pub date: Option<String>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Id(i64),
    Day(NaiveDate),
}

/// Parses an ISO-8601 timestamp, with or without fractional seconds or a
/// trailing offset. Offsets are not converted; attendance is keyed on the
/// wall-clock day as submitted.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_local());
    }
    None
}

/// Resolves a date filter to the calendar day it names: either a bare ISO
/// date or the day of any timestamp `parse_timestamp` accepts.
fn parse_filter_day(value: &str) -> Option<NaiveDate> {
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(day);
    }
    parse_timestamp(value).map(|ts| ts.date())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_timestamp(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid ISO datetime: {value}")))
}

/// List attendance records
///
/// Optionally filtered by employee and/or calendar day, newest first.
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Matching attendance records, newest first", body = [AttendanceResponse])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    pool: web::Data<SqlitePool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::Id(employee_id));
    }

    if let Some(raw) = query.date.as_deref() {
        match parse_filter_day(raw) {
            Some(day) => {
                where_sql.push_str(" AND day = ?");
                args.push(FilterValue::Day(day));
            }
            // Lenient by contract: a date we cannot parse drops the filter.
            None => debug!(date = raw, "Ignoring malformed date filter"),
        }
    }

    let sql = format!(
        "SELECT id, employee_id, date, day, present FROM attendance{} ORDER BY date DESC",
        where_sql
    );
    debug!(sql = %sql, "Fetching attendance");

    let mut data_q = sqlx::query_as::<_, Attendance>(&sql);
    for arg in args {
        data_q = match arg {
            FilterValue::Id(v) => data_q.bind(v),
            FilterValue::Day(d) => data_q.bind(d),
        };
    }

    let records = data_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(
        records
            .into_iter()
            .map(AttendanceResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// Mark attendance
///
/// Upserts the one record an employee may have per calendar day: the first
/// submission inserts, any later submission for the same day overwrites the
/// present flag and timestamp of the existing row.
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = MarkAttendance,
    responses(
        (status = 200, description = "Attendance recorded", body = AttendanceResponse),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    pool: web::Data<SqlitePool>,
    payload: web::Json<MarkAttendance>,
) -> actix_web::Result<impl Responder> {
    let record = payload.into_inner();

    let employee: Option<i64> = sqlx::query_scalar("SELECT id FROM employees WHERE id = ?")
        .bind(record.employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = record.employee_id, "Failed to fetch employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if employee.is_none() {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    // Single atomic statement: the unique (employee_id, day) pair turns a
    // same-day re-mark into an update, so duplicate submissions can never
    // produce two rows for one day.
    let row = sqlx::query_as::<_, Attendance>(
        r#"
        INSERT INTO attendance (employee_id, date, day, present)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (employee_id, day)
        DO UPDATE SET date = excluded.date, present = excluded.present
        RETURNING id, employee_id, date, day, present
        "#,
    )
    .bind(record.employee_id)
    .bind(record.date)
    .bind(record.date.date())
    .bind(record.present)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = record.employee_id, "Failed to record attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(AttendanceResponse::from(row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_naive_iso_timestamps() {
        let ts = parse_timestamp("2024-03-01T09:00:00").unwrap();
        assert_eq!(ts.to_string(), "2024-03-01 09:00:00");

        let ts = parse_timestamp("2024-03-01 09:00:00").unwrap();
        assert_eq!(ts.to_string(), "2024-03-01 09:00:00");
    }

    #[test]
    fn parses_fractional_seconds() {
        let ts = parse_timestamp("2024-03-01T23:59:59.999999").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(ts.and_utc().timestamp_subsec_micros(), 999_999);
    }

    #[test]
    fn keeps_wall_clock_when_offset_present() {
        // The submitted clock time decides the day, not a converted one.
        let ts = parse_timestamp("2024-03-01T18:00:00.000Z").unwrap();
        assert_eq!(ts.to_string(), "2024-03-01 18:00:00");

        let ts = parse_timestamp("2024-03-01T23:30:00+06:00").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn rejects_malformed_timestamps() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("2024-13-99T00:00:00").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn filter_day_from_bare_date() {
        assert_eq!(
            parse_filter_day("2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn filter_day_from_full_timestamp() {
        assert_eq!(
            parse_filter_day("2024-03-01T18:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn filter_day_rejects_malformed_input() {
        assert_eq!(parse_filter_day("banana"), None);
        assert_eq!(parse_filter_day("2024-03"), None);
    }

    #[test]
    fn day_boundaries_belong_to_the_same_day() {
        let start = parse_timestamp("2024-03-01T00:00:00").unwrap();
        let end = parse_timestamp("2024-03-01T23:59:59.999999").unwrap();
        let next = parse_timestamp("2024-03-02T00:00:00").unwrap();

        assert_eq!(start.date(), end.date());
        assert_ne!(end.date(), next.date());
    }
}
