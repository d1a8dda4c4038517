// --------------------------------------------------
// Handles API endpoints for task CRUD operations.
//
// Responsibilities:
// - Create / read / update / delete tasks
// - Map store errors to HTTP status codes
//
// All handlers share one TaskDb handle through axum state; the store
// itself decides what is valid, the handlers only translate.
// -------------------------------------------------

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::db::{DbError, TaskDb};
use crate::models::{NewTask, TaskPatch};

pub fn router(db: Arc<TaskDb>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task)
                .put(update_task)
                .patch(update_task)
                .delete(delete_task),
        )
        .with_state(db)
}

fn error_response(err: DbError) -> Response {
    let status = match err {
        DbError::TitleRequired => StatusCode::BAD_REQUEST,
        DbError::NotFound(_) => StatusCode::NOT_FOUND,
        DbError::Unreadable(_) | DbError::Persist(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string()).into_response()
}

// -----------------------------
// GET /tasks
// Returns every task in storage order
// -----------------------------
pub async fn list_tasks(State(db): State<Arc<TaskDb>>) -> impl IntoResponse {
    Json(db.list())
}

// -----------------------------
// GET /tasks/:id
// Returns a single task; a non-numeric id never reaches the store
// -----------------------------
pub async fn get_task(State(db): State<Arc<TaskDb>>, Path(id): Path<u64>) -> Response {
    match db.get(id) {
        Ok(task) => Json(task).into_response(),
        Err(e) => error_response(e),
    }
}

// -----------------------------
// POST /tasks
// Creates a task and answers 201 with the stored record
// -----------------------------
pub async fn create_task(
    State(db): State<Arc<TaskDb>>,
    Json(input): Json<NewTask>,
) -> Response {
    match db.create(input) {
        Ok(task) => (StatusCode::CREATED, Json(task)).into_response(),
        Err(e) => error_response(e),
    }
}

// -----------------------------
// PUT/PATCH /tasks/:id
// Applies a partial update; unknown body keys are rejected while decoding
// -----------------------------
pub async fn update_task(
    State(db): State<Arc<TaskDb>>,
    Path(id): Path<u64>,
    Json(patch): Json<TaskPatch>,
) -> Response {
    match db.update(id, patch) {
        Ok(task) => Json(task).into_response(),
        Err(e) => error_response(e),
    }
}

// -----------------------------
// DELETE /tasks/:id
// Removes a task permanently
// -----------------------------
pub async fn delete_task(State(db): State<Arc<TaskDb>>, Path(id): Path<u64>) -> Response {
    match db.delete(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_app() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let db = TaskDb::open(dir.path().join("tasks.json")).unwrap();
        (dir, router(Arc::new(db)))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn bare_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_answers_201_with_the_stored_task() {
        let (_dir, app) = test_app();

        let response = app
            .oneshot(json_request("POST", "/tasks", json!({"title": "A"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let task = body_json(response).await;
        assert_eq!(task["id"], 1);
        assert_eq!(task["title"], "A");
        assert_eq!(task["status"], "todo");
    }

    #[tokio::test]
    async fn create_without_title_is_a_client_error() {
        let (_dir, app) = test_app();

        let response = app
            .oneshot(json_request("POST", "/tasks", json!({"body": "no title"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let (_dir, app) = test_app();

        app.clone()
            .oneshot(json_request("POST", "/tasks", json!({"title": "A"})))
            .await
            .unwrap();
        app.clone()
            .oneshot(json_request(
                "POST",
                "/tasks",
                json!({"title": "B", "status": "doing"}),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(bare_request("GET", "/tasks"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 2);

        let response = app
            .clone()
            .oneshot(json_request("PUT", "/tasks/2", json!({"status": "done"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "done");

        let response = app
            .clone()
            .oneshot(bare_request("DELETE", "/tasks/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(bare_request("GET", "/tasks/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_numeric_id_is_a_client_error() {
        let (_dir, app) = test_app();

        let response = app
            .oneshot(bare_request("GET", "/tasks/abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_patch_key_changes_nothing() {
        let (_dir, app) = test_app();

        app.clone()
            .oneshot(json_request("POST", "/tasks", json!({"title": "A"})))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(json_request("PATCH", "/tasks/1", json!({"titel": "typo"})))
            .await
            .unwrap();
        assert!(response.status().is_client_error());

        let response = app
            .oneshot(bare_request("GET", "/tasks/1"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["title"], "A");
    }

    #[tokio::test]
    async fn invalid_status_patch_changes_nothing() {
        let (_dir, app) = test_app();

        app.clone()
            .oneshot(json_request(
                "POST",
                "/tasks",
                json!({"title": "B", "status": "doing"}),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(json_request("PUT", "/tasks/1", json!({"status": "zzz"})))
            .await
            .unwrap();
        assert!(response.status().is_client_error());

        let response = app
            .oneshot(bare_request("GET", "/tasks/1"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["status"], "doing");
    }

    #[tokio::test]
    async fn delete_of_missing_task_is_not_found() {
        let (_dir, app) = test_app();

        let response = app
            .oneshot(bare_request("DELETE", "/tasks/9"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
