use axum::extract::{FromRequest, FromRequestParts, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::error::AppError;
use crate::model::{CreateTodo, PatchTodo, ReorderTodos, Todo};
use crate::store::TodoStore;

/// `axum::Json` whose rejection is reported as an `AppError` (400 + JSON body).
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Path` whose rejection is reported as an `AppError`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

pub fn router(store: TodoStore) -> Router {
    Router::new()
        .route(
            "/todos",
            get(list_todos).post(create_todo).fallback(method_not_allowed),
        )
        .route("/todos/reorder", put(reorder_todos).fallback(method_not_allowed))
        .route(
            "/todos/{id}",
            get(get_todo)
                .put(toggle_todo)
                .patch(patch_todo)
                .delete(delete_todo)
                .fallback(method_not_allowed),
        )
        .fallback(fallback)
        .with_state(store)
}

async fn list_todos(State(store): State<TodoStore>) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(store.list().await?))
}

async fn get_todo(
    State(store): State<TodoStore>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Todo>, AppError> {
    store.get(id).await?.map(Json).ok_or(AppError::NotFound)
}

async fn create_todo(
    State(store): State<TodoStore>,
    AppJson(input): AppJson<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let input = input.validate()?;
    let todo = store.create(&input).await?;
    log::debug!("created todo {} at position {}", todo.id, todo.sort_order);
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn toggle_todo(
    State(store): State<TodoStore>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Todo>, AppError> {
    store.toggle(id).await?.map(Json).ok_or(AppError::NotFound)
}

async fn patch_todo(
    State(store): State<TodoStore>,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<PatchTodo>,
) -> Result<Json<Todo>, AppError> {
    let patch = input.validate()?;
    store.patch(id, &patch).await?.map(Json).ok_or(AppError::NotFound)
}

async fn reorder_todos(
    State(store): State<TodoStore>,
    AppJson(input): AppJson<ReorderTodos>,
) -> Result<Json<Vec<Todo>>, AppError> {
    let input = input.validate()?;
    store.reorder(&input.ids).await?.map(Json).ok_or(AppError::NotFound)
}

async fn delete_todo(
    State(store): State<TodoStore>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    if store.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn fallback() -> AppError {
    AppError::NotFound
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
