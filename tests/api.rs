use std::str::FromStr;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, Error};
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use hotel_inventory_api::config::{AppConfig, ValidationMode};

// One connection so the whole test shares a single in-memory database.
async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

macro_rules! spawn_app {
    ($pool:expr, $config:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($pool))
                .app_data(actix_web::web::Data::new($config))
                .configure(hotel_inventory_api::routes::configure),
        )
        .await
    };
}

async fn post_json<S, B>(app: &S, uri: &str, body: &Value) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post().uri(uri).set_json(body).to_request();
    test::call_service(app, req).await
}

async fn put_json<S, B>(app: &S, uri: &str, body: &Value) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::put().uri(uri).set_json(body).to_request();
    test::call_service(app, req).await
}

async fn get<S, B>(app: &S, uri: &str) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    test::call_service(app, test::TestRequest::get().uri(uri).to_request()).await
}

async fn delete<S, B>(app: &S, uri: &str) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    test::call_service(app, test::TestRequest::delete().uri(uri).to_request()).await
}

fn hotel_a() -> Value {
    json!({
        "nombre": "Hotel A",
        "direccion": "X",
        "ciudad": "Y",
        "nit": "111",
        "numero_habitaciones": 5,
        "room_types": [
            { "type": "STANDARD", "accommodation": "SINGLE", "quantity": 2 },
            { "type": "JUNIOR", "accommodation": "TRIPLE", "quantity": 3 }
        ]
    })
}

#[actix_web::test]
async fn create_hotel_with_reconciled_room_types() {
    let app = spawn_app!(test_pool().await, AppConfig::default());

    let resp = post_json(&app, "/hotels", &hotel_a()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["nombre"], "Hotel A");
    assert_eq!(body["numero_habitaciones"], 5);
    let room_types = body["room_types"].as_array().unwrap();
    assert_eq!(room_types.len(), 2);
    // tier comes back in canonical spelling
    assert_eq!(room_types[0]["type"], "ESTÁNDAR");
    let total: i64 = room_types
        .iter()
        .map(|rt| rt["quantity"].as_i64().unwrap())
        .sum();
    assert_eq!(total, body["numero_habitaciones"].as_i64().unwrap());
}

#[actix_web::test]
async fn quantity_total_mismatch_is_rejected_citing_both_figures() {
    let pool = test_pool().await;
    let app = spawn_app!(pool.clone(), AppConfig::default());

    let mut payload = hotel_a();
    payload["room_types"][1]["quantity"] = json!(2); // 2 + 2 = 4 != 5

    let resp = post_json(&app, "/hotels", &payload).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    let msg = body["errors"]["numero_habitaciones"][0].as_str().unwrap();
    assert!(msg.contains('4') && msg.contains('5'), "message was: {}", msg);

    // all-or-nothing: nothing was persisted
    let hotels: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hotels")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(hotels, 0);
}

#[actix_web::test]
async fn duplicate_accommodation_in_request_names_the_earlier_type() {
    let app = spawn_app!(test_pool().await, AppConfig::default());

    let payload = json!({
        "nombre": "Hotel B", "direccion": "X", "ciudad": "Y", "nit": "222",
        "numero_habitaciones": 5,
        "room_types": [
            { "type": "SUITE", "accommodation": "SINGLE", "quantity": 2 },
            { "type": "STANDARD", "accommodation": "SINGLE", "quantity": 3 }
        ]
    });
    let resp = post_json(&app, "/hotels", &payload).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    let msg = body["errors"]["room_types.1.accommodation"][0].as_str().unwrap();
    assert!(
        msg.contains("'SINGLE'") && msg.contains("'SUITE'"),
        "message was: {}",
        msg
    );
}

#[actix_web::test]
async fn incompatible_pair_is_rejected_with_allowed_set() {
    let app = spawn_app!(test_pool().await, AppConfig::default());

    let payload = json!({
        "nombre": "Hotel C", "direccion": "X", "ciudad": "Y", "nit": "333",
        "numero_habitaciones": 4,
        "room_types": [
            { "type": "STANDARD", "accommodation": "QUADRUPLE", "quantity": 4 }
        ]
    });
    let resp = post_json(&app, "/hotels", &payload).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    let msg = body["errors"]["room_types.0.accommodation"][0].as_str().unwrap();
    assert!(msg.contains("SINGLE, DOUBLE"), "message was: {}", msg);
}

#[actix_web::test]
async fn lenient_mode_skips_the_compatibility_table() {
    let config = AppConfig {
        validation_mode: ValidationMode::Lenient,
        ..AppConfig::default()
    };
    let app = spawn_app!(test_pool().await, config);

    let payload = json!({
        "nombre": "Hotel C", "direccion": "X", "ciudad": "Y", "nit": "333",
        "numero_habitaciones": 4,
        "room_types": [
            { "type": "STANDARD", "accommodation": "QUADRUPLE", "quantity": 4 }
        ]
    });
    let resp = post_json(&app, "/hotels", &payload).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn duplicate_nit_and_nombre_always_fail() {
    let app = spawn_app!(test_pool().await, AppConfig::default());
    let resp = post_json(&app, "/hotels", &hotel_a()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // same nit, different nombre: caught by the pre-check
    let dup_nit = json!({
        "nombre": "Hotel Z", "direccion": "X", "ciudad": "Y", "nit": "111",
        "numero_habitaciones": 1
    });
    let resp = post_json(&app, "/hotels", &dup_nit).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["nit"][0].as_str().unwrap().contains("111"));

    // same nombre, different nit: surfaces from the store's unique constraint
    let dup_nombre = json!({
        "nombre": "Hotel A", "direccion": "X", "ciudad": "Y", "nit": "999",
        "numero_habitaciones": 1
    });
    let resp = post_json(&app, "/hotels", &dup_nombre).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn missing_and_empty_required_fields_are_validation_failures() {
    let app = spawn_app!(test_pool().await, AppConfig::default());

    // missing nombre entirely: deserialization failure, same error shape
    let missing = json!({
        "direccion": "X", "ciudad": "Y", "nit": "1", "numero_habitaciones": 1
    });
    let resp = post_json(&app, "/hotels", &missing).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // empty nombre: caught by the field validator
    let empty = json!({
        "nombre": "", "direccion": "X", "ciudad": "Y", "nit": "1",
        "numero_habitaciones": 1
    });
    let resp = post_json(&app, "/hotels", &empty).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"]["nombre"][0], "nombre is required");
}

#[actix_web::test]
async fn hotel_update_replaces_the_room_type_set_wholesale() {
    let app = spawn_app!(test_pool().await, AppConfig::default());
    let resp = post_json(&app, "/hotels", &hotel_a()).await;
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_i64().unwrap();

    let replacement = json!({
        "nombre": "Hotel A", "direccion": "X", "ciudad": "Y", "nit": "111",
        "numero_habitaciones": 3,
        "room_types": [
            { "type": "SUITE", "accommodation": "DOUBLE", "quantity": 3 }
        ]
    });
    let resp = put_json(&app, &format!("/hotels/{}", id), &replacement).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = get(&app, &format!("/hotels/{}", id)).await;
    let body: Value = test::read_body_json(resp).await;
    let room_types = body["room_types"].as_array().unwrap();
    assert_eq!(room_types.len(), 1);
    assert_eq!(room_types[0]["type"], "SUITE");
    assert_eq!(room_types[0]["quantity"], 3);
}

#[actix_web::test]
async fn missing_ids_return_not_found() {
    let app = spawn_app!(test_pool().await, AppConfig::default());

    assert_eq!(get(&app, "/hotels/999").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        get(&app, "/room-types/999").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        delete(&app, "/hotels/999").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        put_json(&app, "/hotels/999", &hotel_a()).await.status(),
        StatusCode::NOT_FOUND
    );

    // room-type writes are enabled by default, so these reach the 404 path
    let edit = json!({ "type": "SUITE", "accommodation": "DOUBLE", "quantity": 1 });
    assert_eq!(
        put_json(&app, "/room-types/999", &edit).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        delete(&app, "/room-types/999").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn deleting_a_hotel_cascades_to_its_room_types() {
    let pool = test_pool().await;
    let app = spawn_app!(pool.clone(), AppConfig::default());
    let resp = post_json(&app, "/hotels", &hotel_a()).await;
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_i64().unwrap();

    let resp = delete(&app, &format!("/hotels/{}", id)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert_eq!(
        get(&app, &format!("/hotels/{}", id)).await.status(),
        StatusCode::NOT_FOUND
    );
    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM room_types")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orphans, 0);
}

#[actix_web::test]
async fn single_room_type_create_checks_exclusivity_and_capacity() {
    let app = spawn_app!(test_pool().await, AppConfig::default());
    let resp = post_json(&app, "/hotels", &hotel_a()).await;
    let created: Value = test::read_body_json(resp).await;
    let hotel_id = created["id"].as_i64().unwrap();

    // SINGLE is already taken by the ESTÁNDAR room type
    let taken = json!({
        "hotel_id": hotel_id, "type": "SUITE", "accommodation": "SINGLE", "quantity": 1
    });
    let resp = post_json(&app, "/room-types", &taken).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    let msg = body["errors"]["accommodation"][0].as_str().unwrap();
    assert!(
        msg.contains("'ESTÁNDAR'") && msg.contains("'Hotel A'"),
        "message was: {}",
        msg
    );

    // capacity is 5 and 5 rooms are already distributed
    let over = json!({
        "hotel_id": hotel_id, "type": "SUITE", "accommodation": "DOUBLE", "quantity": 1
    });
    let resp = post_json(&app, "/room-types", &over).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // unknown hotel
    let orphan = json!({
        "hotel_id": 999, "type": "SUITE", "accommodation": "DOUBLE", "quantity": 1
    });
    assert_eq!(
        post_json(&app, "/room-types", &orphan).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn room_type_quantity_is_immutable_after_creation() {
    let pool = test_pool().await;
    let app = spawn_app!(pool.clone(), AppConfig::default());
    let resp = post_json(&app, "/hotels", &hotel_a()).await;
    let created: Value = test::read_body_json(resp).await;
    let rt_id = created["room_types"][1]["id"].as_i64().unwrap(); // JUNIOR/TRIPLE/3

    let edit = json!({ "type": "JUNIOR", "accommodation": "TRIPLE", "quantity": 4 });
    let resp = put_json(&app, &format!("/room-types/{}", rt_id), &edit).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["quantity"][0]
        .as_str()
        .unwrap()
        .contains("immutable"));

    // the stored value did not move
    let stored: i64 = sqlx::query_scalar("SELECT quantity FROM room_types WHERE id = ?")
        .bind(rt_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 3);
}

#[actix_web::test]
async fn room_type_update_edits_only_the_mutable_fields() {
    let app = spawn_app!(test_pool().await, AppConfig::default());
    let resp = post_json(&app, "/hotels", &hotel_a()).await;
    let created: Value = test::read_body_json(resp).await;
    let rt_id = created["room_types"][1]["id"].as_i64().unwrap(); // JUNIOR/TRIPLE/3

    // same quantity, new accommodation within the compatibility table
    let edit = json!({ "type": "JUNIOR", "accommodation": "QUADRUPLE", "quantity": 3 });
    let resp = put_json(&app, &format!("/room-types/{}", rt_id), &edit).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["accommodation"], "QUADRUPLE");
    assert_eq!(body["quantity"], 3);
    assert_eq!(body["hotel"]["nombre"], "Hotel A");

    // moving onto a sibling's accommodation is still rejected
    let clash = json!({ "type": "SUITE", "accommodation": "SINGLE", "quantity": 3 });
    let resp = put_json(&app, &format!("/room-types/{}", rt_id), &clash).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn room_type_writes_can_be_disabled_by_policy() {
    let config = AppConfig {
        room_type_writes_enabled: false,
        ..AppConfig::default()
    };
    let app = spawn_app!(test_pool().await, config);
    let resp = post_json(&app, "/hotels", &hotel_a()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let create = json!({
        "hotel_id": 1, "type": "SUITE", "accommodation": "DOUBLE", "quantity": 1
    });
    let resp = post_json(&app, "/room-types", &create).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("disabled by policy"));

    assert_eq!(
        delete(&app, "/room-types/1").await.status(),
        StatusCode::FORBIDDEN
    );

    // reads and updates stay available
    assert_eq!(get(&app, "/room-types").await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn room_type_list_is_ordered_by_hotel_name_and_normalized() {
    let pool = test_pool().await;
    let app = spawn_app!(pool.clone(), AppConfig::default());

    let zebra = json!({
        "nombre": "Zebra", "direccion": "X", "ciudad": "Y", "nit": "901",
        "numero_habitaciones": 2,
        "room_types": [{ "type": "SUITE", "accommodation": "DOUBLE", "quantity": 2 }]
    });
    let alpha = json!({
        "nombre": "Alpha", "direccion": "X", "ciudad": "Y", "nit": "902",
        "numero_habitaciones": 1,
        "room_types": [{ "type": "SUITE", "accommodation": "TRIPLE", "quantity": 1 }]
    });
    assert_eq!(post_json(&app, "/hotels", &zebra).await.status(), StatusCode::CREATED);
    assert_eq!(post_json(&app, "/hotels", &alpha).await.status(), StatusCode::CREATED);

    // legacy row written before normalization existed
    sqlx::query(
        "INSERT INTO room_types (hotel_id, type, accommodation, quantity) \
         VALUES (2, 'ESTANDAR', 'SINGLE', 1)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let resp = get(&app, "/room-types").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["hotel"]["nombre"], "Alpha");
    assert_eq!(rows[2]["hotel"]["nombre"], "Zebra");
    assert!(rows.iter().any(|rt| rt["type"] == "ESTÁNDAR"));
    assert!(!rows.iter().any(|rt| rt["type"] == "ESTANDAR"));
}

#[actix_web::test]
async fn spanish_accommodation_synonyms_are_canonicalized() {
    let app = spawn_app!(test_pool().await, AppConfig::default());

    let payload = json!({
        "nombre": "Hotel E", "direccion": "X", "ciudad": "Y", "nit": "555",
        "numero_habitaciones": 2,
        "room_types": [
            { "type": "ESTÁNDAR", "accommodation": "SENCILLA", "quantity": 2 }
        ]
    });
    let resp = post_json(&app, "/hotels", &payload).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["room_types"][0]["accommodation"], "SINGLE");
    assert_eq!(body["room_types"][0]["type"], "ESTÁNDAR");
}

#[actix_web::test]
async fn auth_surface_is_a_stub() {
    let app = spawn_app!(test_pool().await, AppConfig::default());
    assert_eq!(get(&app, "/user").await.status(), StatusCode::NOT_IMPLEMENTED);
}
