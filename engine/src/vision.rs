use std::{future::Future, pin::Pin};

use log::error;
use thiserror::Error;

/// A vision-capable chat model that can answer one describe request.
pub trait VisionModel: Sync {
    fn describe(&self, req: DescribeRequest) -> DescribeFuture<'_>;
}

pub type DescribeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, VisionError>> + Send + 'a>>;

/// One transient describe request. Created per upload, discarded after the
/// answer is displayed.
#[derive(Debug, Clone)]
pub struct DescribeRequest {
    /// The image bytes, base64-encoded.
    pub image_base64: String,
    /// A MIME type of the form `image/<subtype>`.
    pub mime_type: String,
}

/// Errors returned by a vision backend
#[derive(Debug, Error)]
pub enum VisionError {
    /// The request never produced an HTTP response.
    #[error("{message}")]
    Transport { message: String },

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("response contained no choices")]
    NoChoices,
}

impl From<reqwest::Error> for VisionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

/// Asks `model` to describe the uploaded image. Nothing propagates past this
/// boundary: any failure comes back as an `"Error: ..."` string the UI can
/// display as-is.
pub async fn describe_image(
    model: &dyn VisionModel,
    image_base64: String,
    mime_type: String,
) -> String {
    let req = DescribeRequest {
        image_base64,
        mime_type,
    };
    match model.describe(req).await {
        Ok(text) => text,
        Err(e) => {
            error!("describe request failed: {e}");
            format!("Error: {e}")
        }
    }
}

mod open_ai;
pub use open_ai::OpenAiVision;
