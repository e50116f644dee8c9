//! Mock stage collaborator for offline runs
//!
//! Answers text-to-image calls with a solid-colour PNG and image-to-model
//! calls with a single-quad Wavefront OBJ, without any network calls.

use crate::stage::{Payload, StageCaller, RESULT_KEY};
use kiln_core::{KilnError, Result};
use std::io::Cursor;

const IMAGE_SIZE: u32 = 64;

/// A collaborator that fabricates placeholder artifacts locally
pub struct MockStageCaller {
    image_size: u32,
}

impl Default for MockStageCaller {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStageCaller {
    pub fn new() -> Self {
        Self {
            image_size: IMAGE_SIZE,
        }
    }

    /// Use a different edge length for generated images
    pub fn with_image_size(mut self, size: u32) -> Self {
        self.image_size = size.max(1);
        self
    }
}

impl StageCaller for MockStageCaller {
    fn name(&self) -> &str {
        "mock"
    }

    fn call(&self, stage_id: &str, payload: &Payload, _user_id: &str) -> Result<Payload> {
        let bytes = if let Some(prompt) = payload.text("prompt") {
            solid_png(prompt, self.image_size).map_err(|e| stage_error(stage_id, e))?
        } else if let Some(image) = payload.bytes("image") {
            quad_obj(image).map_err(|e| stage_error(stage_id, e))?
        } else {
            return Err(stage_error(
                stage_id,
                format!(
                    "expected a `prompt` or `image` entry, got [{}]",
                    payload.keys().collect::<Vec<_>>().join(", ")
                ),
            ));
        };

        Ok(Payload::new().with_bytes(RESULT_KEY, bytes))
    }
}

fn stage_error(stage_id: &str, message: impl Into<String>) -> KilnError {
    KilnError::StageCall {
        stage_id: stage_id.to_string(),
        message: message.into(),
    }
}

/// Encode a solid-colour PNG whose colour is derived from the prompt
fn solid_png(prompt: &str, size: u32) -> std::result::Result<Vec<u8>, String> {
    let hash_val = prompt
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    let r = ((hash_val >> 16) & 0xFF) as u8;
    let g = ((hash_val >> 8) & 0xFF) as u8;
    let b = (hash_val & 0xFF) as u8;

    let img = image::RgbaImage::from_pixel(size, size, image::Rgba([r, g, b, 255]));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|e| format!("failed to encode PNG: {}", e))?;
    Ok(cursor.into_inner())
}

/// Build a textured quad OBJ matching the aspect ratio of the input image
fn quad_obj(image_bytes: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let img = image::load_from_memory(image_bytes)
        .map_err(|e| format!("input is not a decodable image: {}", e))?;
    let aspect = img.width() as f32 / img.height().max(1) as f32;
    let half_w = aspect / 2.0;

    let obj = format!(
        "# kiln mock model ({}x{} source)\n\
         o quad\n\
         v {w:.4} 0.0000 0.0000\n\
         v {pw:.4} 0.0000 0.0000\n\
         v {pw:.4} 1.0000 0.0000\n\
         v {w:.4} 1.0000 0.0000\n\
         vt 0.0 0.0\n\
         vt 1.0 0.0\n\
         vt 1.0 1.0\n\
         vt 0.0 1.0\n\
         vn 0.0 0.0 1.0\n\
         f 1/1/1 2/2/1 3/3/1\n\
         f 1/1/1 3/3/1 4/4/1\n",
        img.width(),
        img.height(),
        w = -half_w,
        pw = half_w,
    );
    Ok(obj.into_bytes())
}
