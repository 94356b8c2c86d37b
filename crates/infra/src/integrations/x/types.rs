/// X API v2 wire types for post creation
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct CreatePostRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatePostResponse {
    #[serde(default)]
    pub data: Option<CreatedPost>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedPost {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}
