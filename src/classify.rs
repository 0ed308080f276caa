//! Pure classification of a received HTTP response.
//!
//! Checks run in a fixed order: status, content-type presence, content-type
//! kind, decode. The first failing check decides the error; a response that
//! passes all four yields the decoded image. No side effects, no retries,
//! no logging on this path.

use crate::error::FetchError;
use crate::http::ResponseMeta;
use image::DynamicImage;

/// Classifies a response into a decoded image or one of the four
/// pipeline errors. Transport failures never reach this function; they
/// short-circuit at the transport seam.
pub fn classify(
    meta: ResponseMeta,
    body: &[u8],
) -> Result<(DynamicImage, ResponseMeta), FetchError> {
    if meta.status != 200 {
        return Err(FetchError::HttpStatus {
            status: meta.status,
            meta,
        });
    }

    let Some(content_type) = meta.content_type.clone() else {
        return Err(FetchError::MissingContentType { meta });
    };

    if !is_image_media_type(&content_type) {
        return Err(FetchError::NotAnImage { content_type, meta });
    }

    match image::load_from_memory(body) {
        Ok(image) => Ok((image, meta)),
        Err(_) => Err(FetchError::Decode { meta }),
    }
}

fn is_image_media_type(value: &str) -> bool {
    value
        .parse::<mime::Mime>()
        .map(|m| m.type_() == mime::IMAGE)
        .unwrap_or(false)
}
