use std::io::Cursor;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::position::PhotoPosition;
use crate::config::Config;
use crate::error::AppError;

/// Longest edge of a stored photo, in pixels.
pub const MAX_IMAGE_EDGE: u32 = 800;
pub const JPEG_QUALITY: u8 = 85;
pub const PHOTO_PREFIX: &str = "members";

const PREVIEW_BACKGROUND: Rgb<u8> = Rgb([0xf3, 0xf4, 0xf6]);

/// Paths that already point at an absolute URL are served as-is and never
/// touched by the store.
pub fn is_external(path: &str) -> bool {
    path.starts_with("http")
}

#[derive(Debug, Serialize, Deserialize)]
struct PhotoClaims {
    path: String,
    exp: usize,
}

/// Photo blobs on the local filesystem, handed out through signed, expiring URLs.
#[derive(Clone)]
pub struct PhotoStore {
    root: PathBuf,
    public_base_url: String,
    url_ttl: Duration,
    signing_secret: String,
}

impl PhotoStore {
    pub fn new(
        root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        url_ttl: Duration,
        signing_secret: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            url_ttl,
            signing_secret: signing_secret.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.photo_dir,
            &config.public_base_url,
            config.photo_url_ttl(),
            &config.session_secret,
        )
    }

    pub fn url_ttl(&self) -> Duration {
        self.url_ttl
    }

    /// Resize, re-encode and store an uploaded photo. Returns the stored path.
    pub async fn save(&self, member_id: Uuid, bytes: Vec<u8>) -> Result<String, AppError> {
        let encoded = tokio::task::spawn_blocking(move || resize_to_jpeg(&bytes))
            .await
            .map_err(|e| AppError::internal_server_error_message(e.to_string()))??;

        let path = format!(
            "{}/{}-{}.jpg",
            PHOTO_PREFIX,
            member_id,
            Utc::now().timestamp_millis()
        );
        let target = self.resolve(&path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, encoded).await?;

        log::info!("Stored photo {} for member {}", path, member_id);
        Ok(path)
    }

    /// Remove a stored photo. Returns `false` when there was nothing to remove.
    pub async fn delete(&self, path: &str) -> Result<bool, AppError> {
        if is_external(path) {
            return Ok(false);
        }
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                log::info!("Deleted photo {}", path);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn read(&self, path: &str) -> Result<Vec<u8>, AppError> {
        let target = self.resolve(path)?;
        Ok(tokio::fs::read(&target).await?)
    }

    /// Time-limited display URL for a stored path.
    pub fn signed_url(&self, path: &str) -> Result<String, AppError> {
        if is_external(path) {
            return Ok(path.to_string());
        }
        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.url_ttl)
                .map_err(|e| AppError::internal_server_error_message(e.to_string()))?;
        let token = self.sign_path(path, expires_at)?;
        Ok(format!(
            "{}/api/v1/photos/{}?token={}",
            self.public_base_url, path, token
        ))
    }

    /// Check a token handed out by [`PhotoStore::signed_url`] against the requested path.
    pub fn verify(&self, path: &str, token: &str) -> bool {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        match decode::<PhotoClaims>(
            token,
            &DecodingKey::from_secret(self.signing_secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => data.claims.path == path,
            Err(e) => {
                log::debug!("Rejected photo token for {}: {}", path, e);
                false
            }
        }
    }

    /// Square JPEG preview of a stored photo, cropped as the position describes.
    pub async fn render_crop(
        &self,
        path: &str,
        position: PhotoPosition,
        edge: u32,
    ) -> Result<Vec<u8>, AppError> {
        let bytes = self.read(path).await?;
        tokio::task::spawn_blocking(move || crop_to_jpeg(&bytes, position, edge))
            .await
            .map_err(|e| AppError::internal_server_error_message(e.to_string()))?
    }

    fn sign_path(&self, path: &str, expires_at: DateTime<Utc>) -> Result<String, AppError> {
        let claims = PhotoClaims {
            path: path.to_string(),
            exp: expires_at.timestamp().max(0) as usize,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.signing_secret.as_bytes()),
        )
        .map_err(|e| AppError::internal_server_error_message(format!("Failed to sign photo URL: {}", e)))
    }

    /// Map a stored path onto the photo directory, refusing anything that could escape it.
    fn resolve(&self, path: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            return Err(AppError::BadRequest(format!("Invalid photo path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

/// Shrink to fit within [`MAX_IMAGE_EDGE`] (never enlarge) and encode as JPEG.
pub fn resize_to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let image = image::load_from_memory(bytes)?;
    let image = if image.width() > MAX_IMAGE_EDGE || image.height() > MAX_IMAGE_EDGE {
        image.resize(MAX_IMAGE_EDGE, MAX_IMAGE_EDGE, FilterType::Lanczos3)
    } else {
        image
    };
    encode_jpeg(&image)
}

/// Render the photo into an `edge`×`edge` square the way the CSS background
/// rules would, including the letterbox band when the image does not cover
/// the square.
pub fn crop_to_jpeg(bytes: &[u8], position: PhotoPosition, edge: u32) -> Result<Vec<u8>, AppError> {
    let image = image::load_from_memory(bytes)?;
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 || edge == 0 {
        return Err(AppError::PhotoError("Image has no pixels".to_string()));
    }

    let aspect = f64::from(height) / f64::from(width);
    let zoom = position.effective_zoom();
    let rect = position.crop_rect(aspect);

    let rendered_width = zoom;
    let rendered_height = zoom * aspect;
    let offset_left = (1.0 - rendered_width) * position.x / 100.0;
    let offset_top = (1.0 - rendered_height) * position.y / 100.0;

    let source_x = (rect.left * f64::from(width)).floor() as u32;
    let source_y = (rect.top * f64::from(height)).floor() as u32;
    let source_w = ((rect.width * f64::from(width)).round() as u32).clamp(1, width - source_x.min(width - 1));
    let source_h = ((rect.height * f64::from(height)).round() as u32).clamp(1, height - source_y.min(height - 1));

    let edge_f = f64::from(edge);
    let target_x = ((rect.left * rendered_width + offset_left) * edge_f).round() as i64;
    let target_y = ((rect.top * rendered_height + offset_top) * edge_f).round() as i64;
    let target_w = ((rect.width * rendered_width * edge_f).round() as u32).max(1);
    let target_h = ((rect.height * rendered_height * edge_f).round() as u32).max(1);

    let visible = image
        .crop_imm(source_x, source_y, source_w, source_h)
        .resize_exact(target_w, target_h, FilterType::Triangle)
        .to_rgb8();

    let mut canvas = RgbImage::from_pixel(edge, edge, PREVIEW_BACKGROUND);
    image::imageops::overlay(&mut canvas, &visible, target_x, target_y);

    encode_jpeg(&DynamicImage::ImageRgb8(canvas))
}

fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, AppError> {
    let mut out = Cursor::new(Vec::new());
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))?;
    Ok(out.into_inner())
}
