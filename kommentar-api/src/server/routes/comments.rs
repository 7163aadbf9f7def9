use crate::server::{
    Result, ServerError, ServerRouter, auth::AuthenticatedCaller, json::Json, policy, query::Query,
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use kommentar_common::model::{
    Id,
    comment::{
        Comment, CommentFilter, CommentMarker, CommentPatch, CreateComment, NewComment,
        RemovedComments,
    },
};
use kommentar_db::store::CommentStore;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_comments)
        .typed_post(create_comment)
        .typed_put(reject_collection_put)
        .typed_delete(remove_all_comments)
        .typed_get(get_comment)
        .typed_post(reject_item_post)
        .typed_put(update_comment)
        .typed_delete(remove_comment)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/comments")]
struct CommentsPath;

#[derive(TypedPath, Deserialize)]
#[typed_path("/comments/{id}", rejection(ServerError))]
struct CommentPath {
    id: Id<CommentMarker>,
}

async fn list_comments(
    _: CommentsPath,
    State(store): State<Arc<dyn CommentStore>>,
    Query(filter): Query<CommentFilter>,
) -> Result<Json<Vec<Comment>>> {
    let comments = store.list(&filter).await?;

    Ok(Json(comments))
}

async fn create_comment(
    _: CommentsPath,
    State(store): State<Arc<dyn CommentStore>>,
    caller: AuthenticatedCaller,
    Json(comment): Json<NewComment>,
) -> Result<Json<Comment>> {
    if !policy::may_create_comments(caller.caller()) {
        return Err(ServerError::CollectionPostNotSupported);
    }

    let id = store
        .create(&CreateComment {
            author: caller.user_id(),
            rating: comment.rating,
            text: comment.text,
        })
        .await?;

    let comment = store
        .fetch(id)
        .await?
        .ok_or(ServerError::CommentByIdNotFound(id))?;

    Ok(Json(comment))
}

async fn reject_collection_put(_: CommentsPath, _caller: AuthenticatedCaller) -> ServerError {
    ServerError::CollectionPutNotSupported
}

async fn remove_all_comments(
    _: CommentsPath,
    State(store): State<Arc<dyn CommentStore>>,
    caller: AuthenticatedCaller,
) -> Result<Json<RemovedComments>> {
    if !policy::may_remove_all_comments(caller.caller()) {
        return Err(ServerError::CollectionDeleteNotSupported);
    }

    let removed = store.remove_all().await?;

    Ok(Json(RemovedComments { removed }))
}

async fn get_comment(
    CommentPath { id }: CommentPath,
    State(store): State<Arc<dyn CommentStore>>,
) -> Result<Json<Comment>> {
    let comment = store
        .fetch(id)
        .await?
        .ok_or(ServerError::CommentByIdNotFound(id))?;

    Ok(Json(comment))
}

async fn reject_item_post(
    CommentPath { id }: CommentPath,
    _caller: AuthenticatedCaller,
) -> ServerError {
    ServerError::ItemPostNotSupported(id)
}

async fn update_comment(
    CommentPath { id }: CommentPath,
    State(store): State<Arc<dyn CommentStore>>,
    caller: AuthenticatedCaller,
    Json(patch): Json<CommentPatch>,
) -> Result<Json<Comment>> {
    let updated = store.update(id, caller.user_id(), &patch).await?;
    if !updated {
        return Err(if store.exists(id).await? {
            ServerError::UpdateNotAuthorized
        } else {
            ServerError::CommentByIdNotFound(id)
        });
    }

    let comment = store
        .fetch(id)
        .await?
        .ok_or(ServerError::CommentByIdNotFound(id))?;

    Ok(Json(comment))
}

async fn remove_comment(
    CommentPath { id }: CommentPath,
    State(store): State<Arc<dyn CommentStore>>,
    caller: AuthenticatedCaller,
) -> Result<Json<RemovedComments>> {
    let removed = store.remove(id, caller.user_id()).await?;
    if !removed {
        return Err(if store.exists(id).await? {
            ServerError::DeleteNotAuthorized
        } else {
            ServerError::CommentByIdNotFound(id)
        });
    }

    Ok(Json(RemovedComments { removed: 1 }))
}
