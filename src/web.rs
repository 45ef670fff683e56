use actix_files::Files;
use actix_web::http::StatusCode;
use actix_web::{error, middleware, web, App, HttpResponse, HttpServer, ResponseError, Result};
use log::warn;
use serde::Serialize;
use std::fmt;

use crate::error::ServiceError;
use crate::form::{export_responses_to_csv, CreateSchedulePayload, ResponsePayload};
use crate::service::ScheduleService;

pub struct AppState {
    pub service: ScheduleService,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Error answered as `{"error": message}` with a chosen status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    /// Writes: anything but a missing schedule is the caller's problem
    fn write(err: ServiceError) -> Self {
        if err.is_store() {
            warn!("store failure on write: {}", err);
        }
        let status = if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::BAD_REQUEST
        };
        ApiError::new(status, err.to_string())
    }

    /// Reads: store failures are server faults
    fn read(err: ServiceError) -> Self {
        let status = if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else if err.is_store() {
            warn!("store failure on read: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        };
        ApiError::new(status, err.to_string())
    }

    fn not_found() -> Self {
        ApiError::read(ServiceError::ScheduleNotFound)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(ErrorBody {
            error: &self.message,
        })
    }
}

// Schedule list endpoint
async fn list_schedules(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let schedules = state.service.list_schedules().await.map_err(ApiError::read)?;
    Ok(HttpResponse::Ok().json(schedules))
}

async fn create_schedule(
    payload: web::Json<CreateSchedulePayload>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let schedule = state
        .service
        .create_schedule(&payload)
        .await
        .map_err(ApiError::write)?;
    Ok(HttpResponse::Created().json(schedule))
}

async fn get_schedule(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    match state.service.get_schedule_by_id(&id).await.map_err(ApiError::read)? {
        Some(schedule) => Ok(HttpResponse::Ok().json(schedule)),
        None => Err(ApiError::not_found()),
    }
}

async fn submit_response(
    id: web::Path<String>,
    payload: web::Json<ResponsePayload>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let schedule = state
        .service
        .upsert_response(&id, &payload)
        .await
        .map_err(ApiError::write)?;
    Ok(HttpResponse::Created().json(schedule))
}

// Per-candidate tally
async fn get_summary(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let summary = state
        .service
        .summarize_schedule(&id)
        .await
        .map_err(ApiError::read)?;
    Ok(HttpResponse::Ok().json(summary))
}

async fn export_csv(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let schedule = state
        .service
        .get_schedule_by_id(&id)
        .await
        .map_err(ApiError::read)?
        .ok_or_else(ApiError::not_found)?;

    let body = export_responses_to_csv(&schedule).map_err(|e| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to export responses: {}", e),
        )
    })?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"schedule-{}.csv\"", schedule.id),
        ))
        .body(body))
}

// HTML page handlers
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

async fn schedule_page() -> Result<HttpResponse> {
    let html = include_str!("../templates/schedule.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

/// Malformed JSON bodies get the same `{error}` shape as validation failures
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ErrorBody { error: &message }),
        )
        .into()
    })
}

/// Registers every route; shared by the server and the handler tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/", web::get().to(index))
        .route("/schedule/{id}", web::get().to(schedule_page))
        .service(
            web::resource("/schedules")
                .route(web::get().to(list_schedules))
                .route(web::post().to(create_schedule)),
        )
        .service(web::resource("/schedules/{id}").route(web::get().to(get_schedule)))
        .service(web::resource("/schedules/{id}/responses").route(web::post().to(submit_response)))
        .service(web::resource("/schedules/{id}/summary").route(web::get().to(get_summary)))
        .service(web::resource("/schedules/{id}/export.csv").route(web::get().to(export_csv)));
}

pub async fn start_server(bind_address: &str, port: u16, service: ScheduleService) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState { service });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .configure(configure)
    })
    .bind((bind_address, port))?
    .run()
    .await
}
