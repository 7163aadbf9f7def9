use crate::server::ServerRouter;
use axum::Router;

mod comments;

pub fn routes() -> ServerRouter {
    Router::new().merge(comments::routes())
}
