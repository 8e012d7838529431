//! Drives `HttpRemote` against a fake materials API served by axum on an
//! ephemeral port.

use std::sync::{Arc, Mutex};

use axum::{
  Json, Router,
  extract::{Path, Request, State},
  http::{StatusCode, header::AUTHORIZATION},
  middleware::{self, Next},
  response::{IntoResponse, Response},
  routing::{get, post},
};
use chrono::Utc;
use rata_client::{ApiConfig, ClientError, HttpRemote};
use rata_core::{
  Material, MaterialId, MaterialPatch, MaterialStatus, MaterialsRemote, NewMaterial,
};
use rata_store::{MaterialsStore, Silent};
use serde_json::{Value, json};
use tokio::net::TcpListener;

const TOKEN: &str = "test-token";

type Db = Arc<Mutex<Vec<Material>>>;

// ─── Fake API ────────────────────────────────────────────────────────────────

fn list(db: &Db, status: MaterialStatus) -> Json<Vec<Material>> {
  Json(
    db.lock()
      .unwrap()
      .iter()
      .filter(|m| m.status == status)
      .cloned()
      .collect(),
  )
}

fn mutate(db: &Db, id: i64, f: impl FnOnce(&mut Material)) -> Result<Json<Material>, StatusCode> {
  let mut list = db.lock().unwrap();
  let material = list
    .iter_mut()
    .find(|m| m.id == MaterialId(id))
    .ok_or(StatusCode::NOT_FOUND)?;
  f(material);
  material.updated_at = Utc::now();
  Ok(Json(material.clone()))
}

async fn list_active(State(db): State<Db>) -> Json<Vec<Material>> {
  list(&db, MaterialStatus::Active)
}

async fn list_trash(State(db): State<Db>) -> Json<Vec<Material>> { list(&db, MaterialStatus::Trash) }

async fn create(State(db): State<Db>, Json(input): Json<NewMaterial>) -> impl IntoResponse {
  let mut list = db.lock().unwrap();
  let id = list.iter().map(|m| m.id.0).max().unwrap_or(0) + 1;
  let mut material = Material::new(MaterialId(id), input.title, Utc::now());
  material.description = input.description;
  material.public = input.public;
  list.push(material.clone());
  (StatusCode::CREATED, Json(material))
}

async fn patch(
  State(db): State<Db>,
  Path(id): Path<i64>,
  Json(body): Json<Value>,
) -> Result<Json<Material>, StatusCode> {
  let fields: MaterialPatch =
    serde_json::from_value(body.clone()).map_err(|_| StatusCode::BAD_REQUEST)?;
  mutate(&db, id, |m| {
    if body.get("status").and_then(Value::as_str) == Some("active") {
      m.status = MaterialStatus::Active;
    }
    fields.apply_to(m);
  })
}

async fn soft_delete(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, StatusCode> {
  mutate(&db, id, |m| m.status = MaterialStatus::Trash)?;
  Ok(StatusCode::NO_CONTENT)
}

async fn permanent_delete(State(db): State<Db>, Path(id): Path<i64>) -> StatusCode {
  let mut list = db.lock().unwrap();
  let before = list.len();
  list.retain(|m| m.id != MaterialId(id));
  if list.len() == before {
    StatusCode::NOT_FOUND
  } else {
    StatusCode::NO_CONTENT
  }
}

async fn toggle_pin(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Material>, StatusCode> {
  mutate(&db, id, |m| m.pinned = !m.pinned)
}

async fn toggle_visibility(
  State(db): State<Db>,
  Path(id): Path<i64>,
) -> Result<Json<Material>, StatusCode> {
  mutate(&db, id, |m| m.public = !m.public)
}

async fn require_token(req: Request, next: Next) -> Response {
  let expected = format!("Bearer {TOKEN}");
  match req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
    Some(value) if value == expected => next.run(req).await,
    _ => (
      StatusCode::UNAUTHORIZED,
      Json(json!({ "detail": "Authentication credentials were not provided." })),
    )
      .into_response(),
  }
}

async fn serve(materials: Vec<Material>) -> (String, Db) {
  let db: Db = Arc::new(Mutex::new(materials));
  let app = Router::new()
    .route("/api/materials/", get(list_active).post(create))
    .route("/api/materials/trash/", get(list_trash))
    .route("/api/materials/{id}/", axum::routing::patch(patch).delete(soft_delete))
    .route("/api/materials/{id}/permanent_delete/", post(permanent_delete))
    .route("/api/materials/{id}/toggle_pin/", post(toggle_pin))
    .route("/api/materials/{id}/toggle_visibility/", post(toggle_visibility))
    .layer(middleware::from_fn(require_token))
    .with_state(db.clone());

  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
  (format!("http://{addr}"), db)
}

fn remote(base_url: &str) -> HttpRemote {
  HttpRemote::new(ApiConfig {
    base_url: base_url.to_owned(),
    token: Some(TOKEN.to_owned()),
    ..ApiConfig::default()
  })
  .unwrap()
}

fn seed() -> Vec<Material> {
  let now = Utc::now();
  let mut trashed = Material::new(MaterialId(3), "Old notes", now);
  trashed.status = MaterialStatus::Trash;
  vec![
    Material::new(MaterialId(1), "Biology", now),
    Material::new(MaterialId(2), "Physics", now),
    trashed,
  ]
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn lists_active_and_trashed() {
  let (url, _db) = serve(seed()).await;
  let remote = remote(&url);

  let active = remote.list_materials().await.unwrap();
  let trashed = remote.list_trashed().await.unwrap();

  assert_eq!(active.len(), 2);
  assert_eq!(trashed.len(), 1);
  assert_eq!(trashed[0].id, MaterialId(3));
}

#[tokio::test]
async fn missing_token_is_a_status_error() {
  let (url, _db) = serve(seed()).await;
  let remote = HttpRemote::new(ApiConfig {
    base_url: url,
    ..ApiConfig::default()
  })
  .unwrap();

  let err = remote.list_materials().await.unwrap_err();

  assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
  match err {
    ClientError::Status { path, body, .. } => {
      assert_eq!(path, "/api/materials/");
      assert!(body.contains("Authentication credentials"));
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn rejects_unparseable_base_url() {
  let result = HttpRemote::new(ApiConfig {
    base_url: "not a url".into(),
    ..ApiConfig::default()
  });
  assert!(matches!(result, Err(ClientError::Config(_))));
}

// ─── Writes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_the_new_record() {
  let (url, db) = serve(seed()).await;
  let mut input = NewMaterial::new("Chemistry");
  input.public = true;

  let created = remote(&url).create_material(input).await.unwrap();

  assert_eq!(created.id, MaterialId(4));
  assert!(created.public);
  assert_eq!(db.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn title_patch_leaves_description_alone() {
  let mut materials = seed();
  materials[0].description = Some("Cells and genetics".into());
  let (url, _db) = serve(materials).await;

  let updated = remote(&url)
    .update_material(MaterialId(1), MaterialPatch::title("Biology II"))
    .await
    .unwrap();

  assert_eq!(updated.title, "Biology II");
  assert_eq!(updated.description.as_deref(), Some("Cells and genetics"));
}

#[tokio::test]
async fn toggles_return_canonical_records() {
  let (url, _db) = serve(seed()).await;
  let remote = remote(&url);

  assert!(remote.toggle_pin(MaterialId(1)).await.unwrap().pinned);
  assert!(!remote.toggle_pin(MaterialId(1)).await.unwrap().pinned);
  assert!(remote.toggle_visibility(MaterialId(2)).await.unwrap().public);
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn soft_delete_then_restore() {
  let (url, db) = serve(seed()).await;
  let remote = remote(&url);

  remote.soft_delete(MaterialId(1)).await.unwrap();
  assert_eq!(remote.list_trashed().await.unwrap().len(), 2);

  let restored = remote.restore(MaterialId(1)).await.unwrap();
  assert_eq!(restored.status, MaterialStatus::Active);
  assert!(db.lock().unwrap()[0].is_active());
}

#[tokio::test]
async fn permanent_delete_of_unknown_id_is_not_found() {
  let (url, _db) = serve(seed()).await;
  let remote = remote(&url);

  remote.permanently_delete(MaterialId(3)).await.unwrap();
  let err = remote.permanently_delete(MaterialId(3)).await.unwrap_err();

  assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
  assert!(err.to_string().contains("/api/materials/3/permanent_delete/"));
}

// ─── Through the store ───────────────────────────────────────────────────────

#[tokio::test]
async fn store_round_trip_over_http() {
  let (url, db) = serve(seed()).await;
  let store = MaterialsStore::new(remote(&url));
  store.fetch_all().await;

  let biology = store.snapshot().material_by_id(MaterialId(1)).cloned().unwrap();
  store.move_to_trash(&biology, &Silent).await.unwrap();
  let pinned = store
    .toggle_pin(&store.snapshot().materials[0].clone(), &Silent)
    .await
    .unwrap();

  let s = store.snapshot();
  assert_eq!(s.trashed_materials[0].id, MaterialId(1));
  assert!(s.material_by_id(pinned.id).unwrap().pinned);

  let server = db.lock().unwrap();
  assert!(server.iter().any(|m| m.id == MaterialId(1) && m.is_trashed()));
}
