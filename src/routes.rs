use actix_web::{web, HttpRequest, HttpResponse};

use crate::errors::ApiError;
use crate::handlers::{hotels, room_types};

/// Route table, shared between `main` and the test harness.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::scope("/hotels")
                .route("", web::get().to(hotels::get_hotels))
                .route("", web::post().to(hotels::create_hotel))
                .route("/{id}", web::get().to(hotels::get_hotel_by_id))
                .route("/{id}", web::put().to(hotels::update_hotel))
                .route("/{id}", web::delete().to(hotels::delete_hotel)),
        )
        .service(
            web::scope("/room-types")
                .route("", web::get().to(room_types::get_room_types))
                .route("", web::post().to(room_types::create_room_type))
                .route("/{id}", web::get().to(room_types::get_room_type_by_id))
                .route("/{id}", web::put().to(room_types::update_room_type))
                .route("/{id}", web::delete().to(room_types::delete_room_type)),
        )
        .route("/user", web::get().to(auth_stub));
}

/// Body deserialization failures (missing fields, wrong types, bad category
/// values) come back in the same field-keyed shape as the business rules,
/// never as a bare 400.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        ApiError::field("body", err.to_string()).into()
    })
}

async fn auth_stub() -> HttpResponse {
    HttpResponse::NotImplemented()
        .json(serde_json::json!({ "message": "authentication is not implemented" }))
}
