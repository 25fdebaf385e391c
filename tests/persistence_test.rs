mod common;

use common::{attrs, car, client, Car, CarAssociations, SITE};
use remote_model::framework::mock::MockConnection;
use remote_model::{Model, ResourceClient, ResourceError, SiteConfig};
use serde_json::json;

#[tokio::test]
async fn test_create_persists_and_merges_server_fields() {
    let mock = MockConnection::new();
    mock.expect_post("/cars")
        .respond(201, json!({"id": 7, "name": "Mini", "created_at": "2024-01-01T00:00:00Z"}));
    let client = client(&mock);

    let car = Car::create(&client, attrs(json!({"name": "Mini", "color": "red"})))
        .await
        .unwrap();

    assert!(!car.is_new_record());
    assert_eq!(car.id(), Some(&json!(7)));
    assert_eq!(car.attribute("color"), Some(&json!("red")));
    assert!(car.attribute("created_at").is_some());
    assert_eq!(
        mock.requests()[0].params,
        Some(json!({"name": "Mini", "color": "red"}))
    );
    mock.verify();
}

#[tokio::test]
async fn test_update_sends_savable_attributes_only() {
    let mock = MockConnection::new();
    mock.expect_put("/cars/7").respond(200, json!({"id": 7, "name": "Cooper"}));
    let client = client(&mock);
    let mut car = car(json!({"id": 7, "name": "Mini", "color": "red", "vin": "X1"}));

    let saved = car
        .update_attributes(&client, attrs(json!({"name": "Cooper"})))
        .await
        .unwrap();

    assert!(saved);
    assert_eq!(
        mock.requests()[0].params,
        Some(json!({"id": 7, "name": "Cooper", "color": "red"}))
    );
    assert_eq!(car.attribute("vin"), Some(&json!("X1")));
}

#[tokio::test]
async fn test_rejected_save_reports_errors() {
    let mock = MockConnection::new();
    mock.expect_post("/cars")
        .respond(422, json!({"errors": {"name": ["can't be blank"], "color": "is invalid"}}));
    mock.expect_post("/cars").respond(201, json!({"id": 1, "name": "Fixed"}));
    let client = client(&mock);
    let mut car = car(json!({"name": "", "color": "plaid"}));

    assert!(!car.save(&client).await.unwrap());
    assert!(car.is_new_record());
    assert_eq!(car.errors().get("name"), ["can't be blank"]);
    assert_eq!(car.errors().get("color"), ["is invalid"]);

    // Errors from the previous attempt are cleared
    car.set_attribute("name", json!("Fixed"));
    assert!(car.save(&client).await.unwrap());
    assert!(car.errors().is_empty());
    mock.verify();
}

#[tokio::test]
async fn test_destroy() {
    let mock = MockConnection::new();
    mock.expect_delete("/cars/7").respond_empty(204);
    mock.expect_delete("/cars/9").respond(200, json!({}));
    let client = client(&mock);

    assert!(car(json!({"id": 7})).destroy(&client).await.unwrap());
    assert!(!car(json!({"name": "new"})).destroy(&client).await.unwrap());
    assert!(Car::destroy_id(&client, 9).await.unwrap());
    mock.verify();
}

#[tokio::test]
async fn test_find_variants() {
    let mock = MockConnection::new();
    mock.expect_get("/cars/7").respond(200, json!({"id": 7}));
    mock.expect_get("/cars/404").respond_empty(404);
    mock.expect_get("/cars").respond(200, json!([{"id": 1}, {"id": 2}]));
    mock.expect_get("/cars").respond(200, json!([{"id": 2, "color": "red"}]));
    let client = client(&mock);

    assert!(Car::find(&client, 7).await.unwrap().is_some());
    assert!(Car::find(&client, 404).await.unwrap().is_none());
    assert_eq!(Car::all(&client).await.unwrap().len(), 2);

    let red = Car::find_where(&client, json!({"color": "red"})).await.unwrap();
    assert_eq!(red[0].id(), Some(&json!(2)));
    assert_eq!(mock.requests()[3].params, Some(json!({"color": "red"})));
    mock.verify();
}

#[tokio::test]
async fn test_find_or_create() {
    let mock = MockConnection::new();
    mock.expect_get("/cars").respond(200, json!([]));
    mock.expect_post("/cars").respond(201, json!({"id": 3, "name": "Mini"}));
    mock.expect_get("/cars").respond(200, json!([{"id": 3, "name": "Mini"}]));
    let client = client(&mock);

    let created = Car::find_or_create(&client, attrs(json!({"name": "Mini"})))
        .await
        .unwrap();
    assert_eq!(created.id(), Some(&json!(3)));

    let found = Car::find_or_create(&client, attrs(json!({"name": "Mini"})))
        .await
        .unwrap();
    assert_eq!(found.id(), Some(&json!(3)));
    mock.verify();
}

#[tokio::test]
async fn test_reload_keeps_association_cache() {
    let mock = MockConnection::new();
    mock.expect_get("/cars/7/wheels").respond(200, json!([{"id": 1}]));
    mock.expect_get("/cars/7").respond(200, json!({"id": 7, "name": "Reloaded"}));
    let client = client(&mock);
    let mut car = car(json!({"id": 7, "name": "Stale"}));

    car.wheels(&client, false).await.unwrap();
    car.reload(&client).await.unwrap();

    assert_eq!(car.attribute("name"), Some(&json!("Reloaded")));
    assert_eq!(car.wheels(&client, false).await.unwrap().map(|w| w.len()), Some(1));
    mock.verify();

    let err = common::car(json!({"name": "new"})).reload(&client).await.unwrap_err();
    assert!(matches!(err, ResourceError::NewRecord { .. }));
}

#[test]
fn test_cache_key_tracks_state() {
    let new_car = car(json!({"name": "Mini"}));
    assert_eq!(new_car.cache_key(), "cars/new");
    assert_eq!(new_car.cache_key(), new_car.cache_key());

    let plain = car(json!({"id": 7}));
    assert_eq!(plain.cache_key(), "cars/7");

    let mut stamped = car(json!({"id": 7, "updated_at": "2024-03-05T10:20:30Z"}));
    let before = stamped.cache_key();
    assert_eq!(before, "cars/7-20240305102030");

    stamped.set_attribute("updated_at", json!("2024-03-06T08:00:00Z"));
    assert_ne!(stamped.cache_key(), before);
}

#[tokio::test]
async fn test_auth_exception_surfaces_as_error() {
    let mock = MockConnection::new();
    mock.expect_get("/cars/7")
        .respond(401, json!({"error": "not_authenticated", "message": "Please log in"}));
    let site = SiteConfig::new(SITE)
        .with_basic_auth("ada", Some("wrong".into()))
        .with_auth_exception(json!({"error": "not_authenticated"}));
    let client = ResourceClient::new(site, mock.clone());

    let err = Car::find(&client, 7).await.unwrap_err();
    assert!(matches!(err, ResourceError::Authentication { status: 401 }));
}

#[tokio::test]
async fn test_transport_errors_propagate() {
    let mock = MockConnection::new();
    mock.expect_put("/cars/7")
        .return_err(ResourceError::Connection("connection reset".into()));
    let client = client(&mock);
    let mut car = car(json!({"id": 7}));

    let err = car.save(&client).await.unwrap_err();
    assert!(matches!(err, ResourceError::Connection(_)));
}
