use serde::{Deserialize, Serialize};

pub const POSITION_MIN: f64 = 0.0;
pub const POSITION_MAX: f64 = 100.0;
pub const POSITION_CENTER: f64 = 50.0;

pub const ZOOM_MIN: f64 = 1.0;
pub const ZOOM_MAX: f64 = 2.5;
pub const ZOOM_STEP: f64 = 0.1;

/// Focal point of a photo as percentages of a square preview, plus a zoom factor.
///
/// `zoom` is optional because records saved before zooming existed carry only
/// `{x, y}`; those render unscaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotoPosition {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
}

impl Default for PhotoPosition {
    fn default() -> Self {
        Self::centered()
    }
}

impl PhotoPosition {
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self {
            x,
            y,
            zoom: Some(zoom),
        }
    }

    pub fn centered() -> Self {
        Self::new(POSITION_CENTER, POSITION_CENTER, ZOOM_MIN)
    }

    pub fn effective_zoom(&self) -> f64 {
        self.zoom.unwrap_or(ZOOM_MIN)
    }

    /// Same position with zoom filled in.
    pub fn normalized(&self) -> Self {
        Self::new(self.x, self.y, self.effective_zoom())
    }

    pub fn validate(&self) -> Result<(), String> {
        for (axis, value) in [("x", self.x), ("y", self.y)] {
            if !value.is_finite() || !(POSITION_MIN..=POSITION_MAX).contains(&value) {
                return Err(format!(
                    "photo_position.{} must be between {} and {}, got {}",
                    axis, POSITION_MIN, POSITION_MAX, value
                ));
            }
        }
        if let Some(zoom) = self.zoom {
            if !zoom.is_finite() || !(ZOOM_MIN..=ZOOM_MAX).contains(&zoom) {
                return Err(format!(
                    "photo_position.zoom must be between {} and {}, got {}",
                    ZOOM_MIN, ZOOM_MAX, zoom
                ));
            }
        }
        Ok(())
    }

    pub fn background_style(&self) -> BackgroundStyle {
        BackgroundStyle {
            size_percent: round_percent(self.effective_zoom() * 100.0),
            x_percent: round_percent(self.x),
            y_percent: round_percent(self.y),
        }
    }

    /// Portion of the image visible in a square container, in image-normalized
    /// coordinates.
    ///
    /// `image_aspect` is the natural height divided by the natural width. The
    /// image is drawn `zoom` container-widths wide and offset with CSS
    /// background-position rules: at 0% the image's left/top edge meets the
    /// container's, at 100% its right/bottom edge does.
    pub fn crop_rect(&self, image_aspect: f64) -> CropRect {
        let zoom = self.effective_zoom();
        let rendered_width = zoom;
        let rendered_height = zoom * image_aspect;

        let offset_left = (1.0 - rendered_width) * self.x / 100.0;
        let offset_top = (1.0 - rendered_height) * self.y / 100.0;

        let (left, right) = visible_span(offset_left, rendered_width);
        let (top, bottom) = visible_span(offset_top, rendered_height);

        CropRect {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }
}

/// Visible `[start, end)` of an axis drawn `size` long at `offset`, clipped to the image.
fn visible_span(offset: f64, size: f64) -> (f64, f64) {
    if size <= 0.0 || !size.is_finite() {
        return (0.0, 0.0);
    }
    let start = ((0.0 - offset) / size).clamp(0.0, 1.0);
    let end = ((1.0 - offset) / size).clamp(0.0, 1.0);
    (start, end)
}

pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return POSITION_CENTER;
    }
    value.clamp(POSITION_MIN, POSITION_MAX)
}

/// Clamp to the slider range and snap to its 0.1 step.
pub fn snap_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return ZOOM_MIN;
    }
    let steps = ((zoom.clamp(ZOOM_MIN, ZOOM_MAX) - ZOOM_MIN) / ZOOM_STEP).round();
    ((ZOOM_MIN + steps * ZOOM_STEP) * 10.0).round() / 10.0
}

fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rectangle in image-normalized coordinates, each component in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// CSS background settings that reproduce a [`PhotoPosition`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackgroundStyle {
    pub size_percent: f64,
    pub x_percent: f64,
    pub y_percent: f64,
}

impl BackgroundStyle {
    pub fn to_css(&self) -> String {
        format!(
            "background-position: {}% {}%; background-size: {}%; background-repeat: no-repeat;",
            self.x_percent, self.y_percent, self.size_percent
        )
    }
}
