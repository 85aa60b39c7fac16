use utoipa::OpenApi;

use crate::routes::{download, health};

#[derive(OpenApi)]
#[openapi(info(
    title = "tubeaudio-server",
    description = "Fetch the audio track of a video as an mp3 attachment",
    version = "0.1.0"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(download::DownloadApi::openapi());
    root.merge(health::HealthApi::openapi());
    root
}
