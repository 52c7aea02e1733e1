//! Interactive model behind the photo position/zoom dialog.
//!
//! The editor keeps the last confirmed [`PhotoPosition`] and, while the dialog
//! is open, a draft that pointer, nudge and zoom input mutate. Nothing reaches
//! the confirmed value until [`PhotoEditor::confirm`].

use super::position::{PhotoPosition, clamp_percent, snap_zoom};

/// Percent moved by one arrow-button press.
pub const NUDGE_STEP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Client-space bounding box of the square preview container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ContainerRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    /// The pointer location inside the container becomes the focal point.
    ClickToPosition,
    /// Dragging moves the image under the pointer; the focal point moves the other way.
    #[default]
    Pan,
}

#[derive(Debug, Clone, Copy)]
struct DragGesture {
    start: Point,
    start_x: f64,
    start_y: f64,
    rect: ContainerRect,
}

#[derive(Debug, Clone)]
pub struct PhotoEditor {
    committed: PhotoPosition,
    draft: Option<PhotoPosition>,
    mode: DragMode,
    gesture: Option<DragGesture>,
}

impl PhotoEditor {
    /// `committed` is the stored position; `None` means no photo position was ever saved.
    pub fn new(committed: Option<PhotoPosition>) -> Self {
        Self {
            committed: committed.unwrap_or_default(),
            draft: None,
            mode: DragMode::default(),
            gesture: None,
        }
    }

    pub fn with_mode(mut self, mode: DragMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> DragMode {
        self.mode
    }

    pub fn committed(&self) -> PhotoPosition {
        self.committed
    }

    pub fn draft(&self) -> Option<PhotoPosition> {
        self.draft
    }

    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Start editing from the confirmed value.
    pub fn open(&mut self) {
        self.draft = Some(self.committed.normalized());
        self.gesture = None;
    }

    /// Start editing a freshly uploaded photo, which always begins centered and unzoomed.
    pub fn open_fresh(&mut self) {
        self.draft = Some(PhotoPosition::centered());
        self.gesture = None;
    }

    /// Begin a drag gesture. Returns `false` (and changes nothing) when the
    /// dialog is closed, the container is not mounted, or the press landed
    /// outside it.
    pub fn pointer_down(&mut self, point: Point, container: Option<ContainerRect>) -> bool {
        let Some(draft) = self.draft else {
            return false;
        };
        let Some(rect) = container.filter(ContainerRect::is_usable) else {
            return false;
        };
        if !rect.contains(point) {
            return false;
        }

        self.gesture = Some(DragGesture {
            start: point,
            start_x: draft.x,
            start_y: draft.y,
            rect,
        });

        if self.mode == DragMode::ClickToPosition {
            self.apply_pointer(point);
        }
        true
    }

    /// Follow the pointer while a gesture is active. Returns whether the draft changed.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        if self.gesture.is_none() {
            return false;
        }
        self.apply_pointer(point)
    }

    /// End the gesture. Safe to call with no gesture active, e.g. for a
    /// release that happens outside the container.
    pub fn pointer_up(&mut self) {
        self.gesture = None;
    }

    /// Arrow-button adjustment in whole steps of [`NUDGE_STEP`].
    pub fn nudge(&mut self, dx_steps: i32, dy_steps: i32) {
        if let Some(draft) = self.draft.as_mut() {
            draft.x = clamp_percent(draft.x + f64::from(dx_steps) * NUDGE_STEP);
            draft.y = clamp_percent(draft.y + f64::from(dy_steps) * NUDGE_STEP);
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if let Some(draft) = self.draft.as_mut() {
            draft.zoom = Some(snap_zoom(zoom));
        }
    }

    /// Apply the draft and close the dialog. Returns the confirmed position.
    pub fn confirm(&mut self) -> PhotoPosition {
        if let Some(draft) = self.draft.take() {
            self.committed = draft;
        }
        self.gesture = None;
        self.committed
    }

    /// Discard the draft; the confirmed value is untouched.
    pub fn cancel(&mut self) {
        self.draft = None;
        self.gesture = None;
    }

    fn apply_pointer(&mut self, point: Point) -> bool {
        let (Some(gesture), Some(draft)) = (self.gesture, self.draft.as_mut()) else {
            return false;
        };

        let (x, y) = match self.mode {
            DragMode::ClickToPosition => position_from_pointer(point, &gesture.rect),
            DragMode::Pan => pan_position(
                gesture.start,
                (gesture.start_x, gesture.start_y),
                point,
                &gesture.rect,
            ),
        };

        let changed = draft.x != x || draft.y != y;
        draft.x = x;
        draft.y = y;
        changed
    }
}

/// Project a pointer onto the container and express it as clamped percentages.
pub fn position_from_pointer(point: Point, rect: &ContainerRect) -> (f64, f64) {
    let x = (point.x - rect.left) / rect.width * 100.0;
    let y = (point.y - rect.top) / rect.height * 100.0;
    (clamp_percent(x), clamp_percent(y))
}

/// Natural pan: a drag of `d` pixels moves the focal point by
/// `d * 200 / container_width` percent in the opposite direction.
pub fn pan_position(start: Point, start_position: (f64, f64), point: Point, rect: &ContainerRect) -> (f64, f64) {
    let sensitivity = 100.0 / rect.width * 2.0;
    let dx = point.x - start.x;
    let dy = point.y - start.y;
    let x = clamp_percent(start_position.0 - dx * sensitivity).round();
    let y = clamp_percent(start_position.1 - dy * sensitivity).round();
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn container() -> ContainerRect {
        ContainerRect::new(100.0, 200.0, 400.0, 400.0)
    }

    fn click_editor() -> PhotoEditor {
        let mut editor = PhotoEditor::new(None).with_mode(DragMode::ClickToPosition);
        editor.open();
        editor
    }

    #[test]
    fn new_photo_defaults_to_center_without_zoom() {
        let mut editor = PhotoEditor::new(None);
        editor.open_fresh();
        assert_eq!(editor.draft(), Some(PhotoPosition::new(50.0, 50.0, 1.0)));
    }

    #[test]
    fn click_mode_projects_pointer_to_percentages() {
        let mut editor = click_editor();
        assert!(editor.pointer_down(Point::new(200.0, 500.0), Some(container())));
        assert_eq!(editor.draft().map(|p| (p.x, p.y)), Some((25.0, 75.0)));
    }

    #[test]
    fn dragging_past_container_edges_clamps() {
        let mut editor = click_editor();
        assert!(editor.pointer_down(Point::new(300.0, 400.0), Some(container())));

        editor.pointer_move(Point::new(-50.0, 400.0));
        assert_eq!(editor.draft().map(|p| p.x), Some(0.0));

        editor.pointer_move(Point::new(900.0, 400.0));
        assert_eq!(editor.draft().map(|p| p.x), Some(100.0));
    }

    #[test]
    fn pan_mode_moves_focal_point_against_the_drag() {
        let mut editor = PhotoEditor::new(None);
        editor.open();
        assert!(editor.pointer_down(Point::new(300.0, 400.0), Some(container())));

        // 400px container: sensitivity 0.5 percent per pixel.
        editor.pointer_move(Point::new(340.0, 380.0));
        assert_eq!(editor.draft().map(|p| (p.x, p.y)), Some((30.0, 60.0)));

        editor.pointer_move(Point::new(-1000.0, 400.0));
        assert_eq!(editor.draft().map(|p| p.x), Some(100.0));
    }

    #[test]
    fn missing_container_is_a_silent_no_op() {
        let mut editor = PhotoEditor::new(None);
        editor.open();
        assert!(!editor.pointer_down(Point::new(1.0, 1.0), None));
        assert!(!editor.is_dragging());
        assert!(!editor.pointer_move(Point::new(50.0, 50.0)));
        assert_eq!(editor.draft(), Some(PhotoPosition::centered()));
    }

    #[test]
    fn release_always_ends_the_gesture() {
        let mut editor = PhotoEditor::new(None);
        editor.open();
        editor.pointer_down(Point::new(300.0, 400.0), Some(container()));
        assert!(editor.is_dragging());

        editor.pointer_up();
        assert!(!editor.is_dragging());
        assert!(!editor.pointer_move(Point::new(0.0, 0.0)));

        // Releasing again with nothing held is harmless.
        editor.pointer_up();
        assert!(!editor.is_dragging());
    }

    #[test]
    fn zoom_does_not_move_the_focal_point() {
        let mut editor = PhotoEditor::new(Some(PhotoPosition::new(30.0, 70.0, 1.0)));
        editor.open();
        editor.set_zoom(2.0);
        assert_eq!(editor.draft(), Some(PhotoPosition::new(30.0, 70.0, 2.0)));
    }

    #[test]
    fn nudges_are_clamped() {
        let mut editor = PhotoEditor::new(Some(PhotoPosition::new(97.0, 3.0, 1.0)));
        editor.open();
        editor.nudge(1, -1);
        assert_eq!(editor.draft().map(|p| (p.x, p.y)), Some((100.0, 0.0)));
        editor.nudge(-2, 1);
        assert_eq!(editor.draft().map(|p| (p.x, p.y)), Some((90.0, 5.0)));
    }

    #[test]
    fn confirm_then_reopen_has_no_drift() {
        let mut editor = PhotoEditor::new(None);
        editor.open();
        editor.nudge(-4, 4);
        editor.set_zoom(1.5);
        let confirmed = editor.confirm();
        assert_eq!(confirmed, PhotoPosition::new(30.0, 70.0, 1.5));
        assert!(!editor.is_open());

        editor.open();
        assert_eq!(editor.draft(), Some(confirmed));
    }

    #[test]
    fn cancel_keeps_the_persisted_position() {
        let stored = PhotoPosition::new(40.0, 60.0, 1.2);
        let mut editor = PhotoEditor::new(Some(stored));
        editor.open();
        editor.set_zoom(2.4);
        editor.cancel();

        assert_eq!(editor.committed(), stored);
        assert!(!editor.is_open());
    }

    #[test]
    fn legacy_position_opens_with_explicit_zoom() {
        let legacy = PhotoPosition {
            x: 10.0,
            y: 20.0,
            zoom: None,
        };
        let mut editor = PhotoEditor::new(Some(legacy));
        editor.open();
        assert_eq!(editor.draft(), Some(PhotoPosition::new(10.0, 20.0, 1.0)));
    }

    #[test]
    fn input_while_closed_is_ignored() {
        let mut editor = PhotoEditor::new(None);
        assert!(!editor.pointer_down(Point::new(300.0, 400.0), Some(container())));
        editor.set_zoom(2.0);
        editor.nudge(1, 1);
        assert_eq!(editor.confirm(), PhotoPosition::centered());
    }
}
