use utoipa::OpenApi;

use super::{chat, health, translation};

#[derive(OpenApi)]
#[openapi(info(
    title = "lingo-server",
    description = "Session-scoped chat and translation API",
    version = "0.1.0"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root.merge(translation::TranslationApi::openapi());
    root
}
