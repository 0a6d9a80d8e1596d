//! The backend seam screens are written against.
//!
//! | Method   | Path                 | Notes                                  |
//! |----------|----------------------|----------------------------------------|
//! | `GET`    | `/{collection}`      | Envelope with an array of records      |
//! | `GET`    | `/{collection}/{id}` | Envelope with one record               |
//! | `POST`   | `/{collection}`      | JSON or multipart body                 |
//! | `PUT`    | `/{collection}/{id}` | JSON or multipart body                 |
//! | `DELETE` | `/{collection}/{id}` |                                        |

use std::future::Future;

use campus_core::{
  envelope::Envelope,
  payload::Payload,
  resource::{RecordId, ReferenceOption, ReferenceTarget, Resource},
  student::Student,
};
use reqwest::Method;
use serde_json::Value;
use tracing::{info, warn};

use crate::{client::ApiClient, error::ApiError};

// ─── Results ──────────────────────────────────────────────────────────────────

/// One list response, decoded record by record.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<R> {
  pub records:  Vec<R>,
  /// Records dropped because they did not match the schema.
  pub rejected: usize,
}

impl<R: Resource> ListSnapshot<R> {
  /// Decode each element on its own so one malformed record does not hide
  /// the rest of the list.
  pub fn decode(values: Vec<Value>) -> Self {
    let mut rejected = 0;
    let records = values
      .into_iter()
      .filter_map(|value| match serde_json::from_value::<R>(value) {
        Ok(record) => Some(record),
        Err(e) => {
          rejected += 1;
          warn!(collection = R::COLLECTION, error = %e, "skipping malformed record");
          None
        }
      })
      .collect();
    Self { records, rejected }
  }
}

/// Acknowledgement of a mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
  pub message: Option<String>,
}

// ─── Traits ───────────────────────────────────────────────────────────────────

/// Options for reference fields, fetched independently of the record list.
pub trait ReferenceLookup: Send + Sync + 'static {
  fn reference_options(
    &self,
    target: ReferenceTarget,
  ) -> impl Future<Output = Result<Vec<ReferenceOption>, ApiError>> + Send;
}

/// CRUD access to every resource collection.
///
/// All methods return `Send` futures so screens can run them on spawned
/// tasks.
pub trait ResourceBackend: ReferenceLookup {
  fn list<R: Resource>(&self) -> impl Future<Output = Result<ListSnapshot<R>, ApiError>> + Send;

  fn get<R: Resource>(&self, id: &RecordId) -> impl Future<Output = Result<R, ApiError>> + Send;

  fn create<R: Resource>(
    &self,
    payload: Payload,
  ) -> impl Future<Output = Result<Ack, ApiError>> + Send;

  fn update<R: Resource>(
    &self,
    id: &RecordId,
    payload: Payload,
  ) -> impl Future<Output = Result<Ack, ApiError>> + Send;

  fn delete<R: Resource>(&self, id: &RecordId) -> impl Future<Output = Result<Ack, ApiError>> + Send;
}

// ─── HTTP implementation ─────────────────────────────────────────────────────

fn collection_path<R: Resource>() -> [&'static str; 1] {
  [R::COLLECTION]
}

fn item_path<R: Resource>(id: &RecordId) -> [&str; 2] {
  [R::COLLECTION, id.as_str()]
}

impl ResourceBackend for ApiClient {
  async fn list<R: Resource>(&self) -> Result<ListSnapshot<R>, ApiError> {
    let env: Envelope<Vec<Value>> = self.request(Method::GET, &collection_path::<R>(), None).await?;
    Ok(ListSnapshot::decode(env.data.unwrap_or_default()))
  }

  async fn get<R: Resource>(&self, id: &RecordId) -> Result<R, ApiError> {
    let env: Envelope<Value> = self.request(Method::GET, &item_path::<R>(id), None).await?;
    let data = env
      .data
      .ok_or_else(|| ApiError::Decode(format!("{} {id}: response has no data", R::NOUN)))?;
    serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))
  }

  async fn create<R: Resource>(&self, payload: Payload) -> Result<Ack, ApiError> {
    let env: Envelope<Value> =
      self.request(Method::POST, &collection_path::<R>(), Some(payload)).await?;
    info!(collection = R::COLLECTION, "created record");
    Ok(Ack { message: env.message })
  }

  async fn update<R: Resource>(&self, id: &RecordId, payload: Payload) -> Result<Ack, ApiError> {
    let env: Envelope<Value> =
      self.request(Method::PUT, &item_path::<R>(id), Some(payload)).await?;
    info!(collection = R::COLLECTION, %id, "updated record");
    Ok(Ack { message: env.message })
  }

  async fn delete<R: Resource>(&self, id: &RecordId) -> Result<Ack, ApiError> {
    let env: Envelope<Value> = self.request(Method::DELETE, &item_path::<R>(id), None).await?;
    info!(collection = R::COLLECTION, %id, "deleted record");
    Ok(Ack { message: env.message })
  }
}

impl ReferenceLookup for ApiClient {
  async fn reference_options(
    &self,
    target: ReferenceTarget,
  ) -> Result<Vec<ReferenceOption>, ApiError> {
    match target {
      ReferenceTarget::Students => {
        let students = self.list::<Student>().await?;
        Ok(students.records.iter().map(Student::reference_option).collect())
      }
    }
  }
}
