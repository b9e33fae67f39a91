use crate::api::{attendance, employee, reference};
use actix_web::{HttpRequest, HttpResponse, error, web};
use serde_json::json;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/employees")
                        // /api/employees
                        .service(
                            web::resource("")
                                .route(web::get().to(employee::list_employees))
                                .route(web::post().to(employee::create_employee)),
                        )
                        // /api/employees/{id}
                        .service(
                            web::resource("/{id}")
                                .route(web::get().to(employee::get_employee))
                                .route(web::put().to(employee::update_employee))
                                .route(web::delete().to(employee::delete_employee)),
                        ),
                )
                .service(
                    web::resource("/attendance")
                        .route(web::get().to(attendance::list_attendance))
                        .route(web::post().to(attendance::mark_attendance)),
                )
                .service(
                    web::resource("/departments").route(web::get().to(reference::list_departments)),
                )
                .service(
                    web::resource("/job-titles").route(web::get().to(reference::list_job_titles)),
                ),
        );
}

// Body and query-string deserialization failures surface as 400s with the
// same {"message": ...} shape the handlers use; the serde message names the
// offending field.
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    let message = err.to_string();
    error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(json!({ "message": message })),
    )
    .into()
}

fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> error::Error {
    let message = err.to_string();
    error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(json!({ "message": message })),
    )
    .into()
}
