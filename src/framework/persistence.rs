//! # Persistence
//!
//! Save / destroy / reload for a single record, plus the collection-level finders
//! on [`ModelType`].
//!
//! ## Save State Machine
//!
//! | State     | Request                | Success status | Payload                          |
//! |-----------|------------------------|----------------|----------------------------------|
//! | new       | `POST {base_uri}`      | 201            | all attributes                   |
//! | persisted | `PUT {base_uri}/{id}`  | 200            | savable attributes + `id` (or all) |
//!
//! A save on the success status with a body merges the body into the attributes and
//! returns `true`. Any other outcome folds the body's `errors` into the record's
//! [`Errors`](crate::framework::Errors) and returns `false`. Errors are cleared at the
//! start of every save.

use crate::clients::{Fetched, Method, ResourceClient};
use crate::framework::error::ResourceError;
use crate::framework::model::ModelType;
use crate::framework::record::{Attributes, Record};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

/// The request a save would issue for the record's current state.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePlan {
    pub method: Method,
    pub uri: String,
    pub expected_status: u16,
    pub payload: Value,
}

pub fn plan_save(model: &ModelType, record: &Record) -> SavePlan {
    match record.id_segment() {
        None => SavePlan {
            method: Method::Post,
            uri: model.base_uri(),
            expected_status: 201,
            payload: Value::Object(record.attributes().clone()),
        },
        Some(id) => SavePlan {
            method: Method::Put,
            uri: model.member_uri(&id),
            expected_status: 200,
            payload: Value::Object(update_payload(model, record)),
        },
    }
}

fn update_payload(model: &ModelType, record: &Record) -> Attributes {
    let Some(savable) = model.savable() else {
        return record.attributes().clone();
    };
    record
        .attributes()
        .iter()
        .filter(|(name, _)| name.as_str() == "id" || savable.iter().any(|s| s == *name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Creates or updates `record`. `Ok(false)` means the service rejected it; see its errors.
pub async fn save(
    model: &ModelType,
    client: &ResourceClient,
    record: &mut Record,
) -> Result<bool, ResourceError> {
    let plan = plan_save(model, record);
    record.errors_mut().clear();
    debug!(model = model.name(), method = %plan.method, uri = %plan.uri, "Save");

    let response = client.send(plan.method, &plan.uri, Some(plan.payload)).await?;
    match response.body {
        Some(body) if response.status == plan.expected_status => {
            if let Value::Object(fields) = body {
                record.merge_attributes(fields);
            }
            info!(model = model.name(), id = ?record.id(), "Saved");
            Ok(true)
        }
        body => {
            let added = body
                .as_ref()
                .map(|body| record.errors_mut().absorb(body))
                .unwrap_or(0);
            warn!(
                model = model.name(),
                status = response.status,
                errors = added,
                "Save rejected"
            );
            Ok(false)
        }
    }
}

/// Deletes `record` remotely. A new record is never sent and yields `Ok(false)`.
pub async fn destroy(
    model: &ModelType,
    client: &ResourceClient,
    record: &Record,
) -> Result<bool, ResourceError> {
    match record.id_segment() {
        Some(id) => model.destroy(client, &id).await,
        None => Ok(false),
    }
}

/// Replaces the attributes with the current remote state. Errors and association
/// cache are kept.
pub async fn reload(
    model: &ModelType,
    client: &ResourceClient,
    record: &mut Record,
) -> Result<(), ResourceError> {
    let id = record.id_segment().ok_or_else(|| ResourceError::NewRecord {
        model: model.name().to_string(),
    })?;
    let uri = model.member_uri(&id);
    let response = client.get(&uri, None).await?;

    match response.shape() {
        Fetched::One(attributes) if response.is_success() => {
            record.replace_attributes(attributes);
            debug!(model = model.name(), %id, "Reloaded");
            Ok(())
        }
        _ => Err(ResourceError::Status {
            status: response.status,
            uri,
        }),
    }
}

/// `{plural}/new`, `{plural}/{id}` or `{plural}/{id}-{YYYYMMDDhhmmss}` when `updated_at` is set.
///
/// A stamp with a sub-second part gets nine nanosecond digits appended.
pub fn cache_key(model: &ModelType, record: &Record) -> String {
    let Some(id) = record.id_segment() else {
        return format!("{}/new", model.plural());
    };
    match record.attribute("updated_at").map(timestamp_digits) {
        Some(stamp) if !stamp.is_empty() => format!("{}/{id}-{stamp}", model.plural()),
        _ => format!("{}/{id}", model.plural()),
    }
}

const CACHE_KEY_FORMAT: &str = "%Y%m%d%H%M%S";
const CACHE_KEY_SUBSEC_FORMAT: &str = "%Y%m%d%H%M%S%f";

fn timestamp_digits(value: &Value) -> String {
    let parsed = match value {
        Value::String(text) => parse_timestamp(text),
        Value::Number(n) => match n.as_i64() {
            Some(secs) => DateTime::from_timestamp(secs, 0),
            None => n.as_f64().and_then(from_fractional_secs),
        },
        _ => None,
    };
    match parsed {
        // Whole seconds keep the short form; anything finer adds nanoseconds
        Some(at) if at.timestamp_subsec_nanos() == 0 => at.format(CACHE_KEY_FORMAT).to_string(),
        Some(at) => at.format(CACHE_KEY_SUBSEC_FORMAT).to_string(),
        None => {
            let raw = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            raw.chars().filter(char::is_ascii_digit).collect()
        }
    }
}

fn from_fractional_secs(secs: f64) -> Option<DateTime<Utc>> {
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

// =============================================================================
// COLLECTION OPERATIONS
// =============================================================================

impl ModelType {
    /// `GET {base_uri}/{id}`. 404 is `Ok(None)`.
    pub async fn find(
        &self,
        client: &ResourceClient,
        id: &str,
    ) -> Result<Option<Record>, ResourceError> {
        let uri = self.member_uri(id);
        let response = client.get(&uri, None).await?;
        if response.is_not_found() {
            debug!(model = self.name(), %id, "Not found");
            return Ok(None);
        }
        if !response.is_success() {
            return Err(ResourceError::Status {
                status: response.status,
                uri,
            });
        }
        Ok(match response.shape() {
            Fetched::One(attributes) => Some(Record::from_attributes(attributes)),
            Fetched::Many(mut items) if !items.is_empty() => {
                Some(Record::from_attributes(items.swap_remove(0)))
            }
            _ => None,
        })
    }

    pub async fn all(&self, client: &ResourceClient) -> Result<Vec<Record>, ResourceError> {
        self.collection(client, None).await
    }

    pub async fn find_where(
        &self,
        client: &ResourceClient,
        params: Value,
    ) -> Result<Vec<Record>, ResourceError> {
        self.collection(client, Some(params)).await
    }

    /// Saves a new record built from `attributes`; it stays new if the service rejects it.
    pub async fn create(
        &self,
        client: &ResourceClient,
        attributes: Attributes,
    ) -> Result<Record, ResourceError> {
        let mut record = Record::from_attributes(attributes);
        save(self, client, &mut record).await?;
        Ok(record)
    }

    /// `DELETE {base_uri}/{id}`; any 2xx is success.
    pub async fn destroy(&self, client: &ResourceClient, id: &str) -> Result<bool, ResourceError> {
        let response = client.delete(&self.member_uri(id)).await?;
        let destroyed = response.is_success();
        if destroyed {
            info!(model = self.name(), %id, "Destroyed");
        } else {
            warn!(model = self.name(), %id, status = response.status, "Destroy rejected");
        }
        Ok(destroyed)
    }

    /// First record matching `params`, or a new one holding them.
    pub async fn find_or_initialize(
        &self,
        client: &ResourceClient,
        params: Attributes,
    ) -> Result<Record, ResourceError> {
        let found = self
            .find_where(client, Value::Object(params.clone()))
            .await?
            .into_iter()
            .next();
        Ok(found.unwrap_or_else(|| Record::from_attributes(params)))
    }

    async fn collection(
        &self,
        client: &ResourceClient,
        params: Option<Value>,
    ) -> Result<Vec<Record>, ResourceError> {
        let uri = self.base_uri();
        let response = client.get(&uri, params).await?;
        if !response.is_success() {
            return Err(ResourceError::Status {
                status: response.status,
                uri,
            });
        }
        Ok(match response.shape() {
            Fetched::Many(items) => items.into_iter().map(Record::from_attributes).collect(),
            Fetched::One(attributes) => vec![Record::from_attributes(attributes)],
            Fetched::Empty => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockConnection;
    use crate::runtime::SiteConfig;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_attributes(value.as_object().cloned().unwrap())
    }

    fn client(mock: &MockConnection) -> ResourceClient {
        ResourceClient::new(SiteConfig::new("http://api.test"), mock.clone())
    }

    #[test]
    fn test_plan_for_new_record() {
        let model = ModelType::new("car").with_savable(["name"]);
        let plan = plan_save(&model, &record(json!({"name": "Mini", "color": "red"})));

        assert_eq!(plan.method, Method::Post);
        assert_eq!(plan.uri, "/cars");
        assert_eq!(plan.expected_status, 201);
        assert_eq!(plan.payload, json!({"name": "Mini", "color": "red"}));
    }

    #[test]
    fn test_plan_for_persisted_record() {
        let car = record(json!({"id": 7, "name": "Mini", "color": "red"}));

        let restricted = plan_save(&ModelType::new("car").with_savable(["name"]), &car);
        assert_eq!(restricted.method, Method::Put);
        assert_eq!(restricted.uri, "/cars/7");
        assert_eq!(restricted.expected_status, 200);
        assert_eq!(restricted.payload, json!({"id": 7, "name": "Mini"}));

        let open = plan_save(&ModelType::new("car"), &car);
        assert_eq!(open.payload, json!({"id": 7, "name": "Mini", "color": "red"}));
    }

    #[tokio::test]
    async fn test_save_new_record_merges_response() {
        let mock = MockConnection::new();
        mock.expect_post("/cars").respond(201, json!({"id": 9, "name": "Mini"}));
        let model = ModelType::new("car");
        let mut car = record(json!({"name": "Mini"}));

        assert!(save(&model, &client(&mock), &mut car).await.unwrap());
        assert_eq!(car.id(), Some(&json!(9)));
        assert!(car.errors().is_empty());
        mock.verify();
    }

    #[tokio::test]
    async fn test_save_rejected_collects_errors() {
        let mock = MockConnection::new();
        mock.expect_put("/cars/7")
            .respond(422, json!({"errors": {"name": ["can't be blank"]}}));
        mock.expect_put("/cars/7").respond(200, json!({"id": 7, "name": "Z"}));
        let model = ModelType::new("car");
        let client = client(&mock);
        let mut car = record(json!({"id": 7, "name": ""}));

        assert!(!save(&model, &client, &mut car).await.unwrap());
        assert_eq!(car.errors().get("name"), ["can't be blank"]);

        car.set_attribute("name", "Z");
        assert!(save(&model, &client, &mut car).await.unwrap());
        assert!(car.errors().is_empty());
    }

    #[tokio::test]
    async fn test_save_success_status_without_body_fails() {
        let mock = MockConnection::new();
        mock.expect_post("/cars").respond_empty(201);
        let model = ModelType::new("car");
        let mut car = record(json!({"name": "Mini"}));

        assert!(!save(&model, &client(&mock), &mut car).await.unwrap());
        assert!(car.is_new_record());
    }

    #[tokio::test]
    async fn test_destroy() {
        let mock = MockConnection::new();
        mock.expect_delete("/cars/7").respond_empty(204);
        mock.expect_delete("/cars/8").respond_empty(404);
        let model = ModelType::new("car");
        let client = client(&mock);

        assert!(destroy(&model, &client, &record(json!({"id": 7}))).await.unwrap());
        assert!(!destroy(&model, &client, &record(json!({"id": 8}))).await.unwrap());
        assert!(!destroy(&model, &client, &record(json!({"name": "new"}))).await.unwrap());
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_reload_replaces_attributes() {
        let mock = MockConnection::new();
        mock.expect_get("/cars/7").respond(200, json!({"id": 7, "name": "Fresh"}));
        let model = ModelType::new("car");
        let client = client(&mock);

        let mut car = record(json!({"id": 7, "name": "Stale", "local": true}));
        reload(&model, &client, &mut car).await.unwrap();
        assert_eq!(car.attribute("name"), Some(&json!("Fresh")));
        assert!(!car.has_attribute("local"));

        let mut fresh = record(json!({"name": "new"}));
        let err = reload(&model, &client, &mut fresh).await.unwrap_err();
        assert!(matches!(err, ResourceError::NewRecord { .. }));
    }

    #[test]
    fn test_cache_key() {
        let model = ModelType::new("car");

        assert_eq!(cache_key(&model, &record(json!({"name": "x"}))), "cars/new");
        assert_eq!(cache_key(&model, &record(json!({"id": 7}))), "cars/7");
        assert_eq!(
            cache_key(&model, &record(json!({"id": 7, "updated_at": "2024-03-05T10:20:30Z"}))),
            "cars/7-20240305102030"
        );
        assert_eq!(
            cache_key(&model, &record(json!({"id": 7, "updated_at": "2024-03-05T12:20:30+02:00"}))),
            "cars/7-20240305102030"
        );
        assert_eq!(
            cache_key(&model, &record(json!({"id": 7, "updated_at": "2024-03-05 10:20:30"}))),
            "cars/7-20240305102030"
        );
        assert_eq!(
            cache_key(&model, &record(json!({"id": 7, "updated_at": 0}))),
            "cars/7-19700101000000"
        );
        assert_eq!(
            cache_key(&model, &record(json!({"id": 7, "updated_at": null}))),
            "cars/7"
        );
    }

    #[test]
    fn test_cache_key_keeps_subsecond_precision() {
        let model = ModelType::new("car");
        let early = cache_key(
            &model,
            &record(json!({"id": 7, "updated_at": "2024-03-05T10:20:30.100Z"})),
        );
        let late = cache_key(
            &model,
            &record(json!({"id": 7, "updated_at": "2024-03-05T10:20:30.900Z"})),
        );

        assert_ne!(early, late);
        assert_eq!(early, "cars/7-20240305102030100000000");
        assert_eq!(
            cache_key(&model, &record(json!({"id": 7, "updated_at": "2024-03-05 10:20:30.5"}))),
            "cars/7-20240305102030500000000"
        );
        assert_eq!(
            cache_key(&model, &record(json!({"id": 7, "updated_at": 1.25}))),
            "cars/7-19700101000001250000000"
        );
    }

    #[tokio::test]
    async fn test_find_and_collections() {
        let mock = MockConnection::new();
        mock.expect_get("/cars/7").respond(200, json!({"id": 7}));
        mock.expect_get("/cars/8").respond_empty(404);
        mock.expect_get("/cars/9").respond(500, json!({"error": "boom"}));
        mock.expect_get("/cars").respond(200, json!([{"id": 1}, {"id": 2}]));
        mock.expect_get("/cars").respond(200, json!([]));
        let model = ModelType::new("car");
        let client = client(&mock);

        assert!(model.find(&client, "7").await.unwrap().is_some());
        assert!(model.find(&client, "8").await.unwrap().is_none());
        assert!(matches!(
            model.find(&client, "9").await.unwrap_err(),
            ResourceError::Status { status: 500, .. }
        ));
        assert_eq!(model.all(&client).await.unwrap().len(), 2);

        let params = json!({"name": "Mini"});
        let initialized = model
            .find_or_initialize(&client, params.as_object().cloned().unwrap())
            .await
            .unwrap();
        assert!(initialized.is_new_record());
        assert_eq!(initialized.attribute("name"), Some(&json!("Mini")));

        assert_eq!(mock.requests()[4].params, Some(params));
        mock.verify();
    }
}
