use netvis_core::{NetvisError, Rect, Vec2};

pub const DEFAULT_MIN_ZOOM: f64 = 1.0;
pub const DEFAULT_MAX_ZOOM: f64 = 10.0;

/// Zoom and pan state mapping graph coordinates to the surface.
///
/// Rendering scales about `center` and then translates, so a point maps to
/// `(p - center) * zoom + center + translation`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    center: Vec2,
    translation: (f64, f64),
    surface: Rect,
}

impl ViewTransform {
    pub fn new(surface: Rect) -> Self {
        Self {
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            center: surface.center(),
            translation: (0.0, 0.0),
            surface,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn zoom_range(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn translation(&self) -> (f64, f64) {
        self.translation
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn surface(&self) -> Rect {
        self.surface
    }

    pub fn set_zoom_range(&mut self, min: f64, max: f64) -> Result<(), NetvisError> {
        if !(min > 0.0 && min <= max) {
            return Err(NetvisError::InvalidArgument("invalid zoom range"));
        }
        self.min_zoom = min;
        self.max_zoom = max;
        self.zoom = self.zoom.clamp(min, max);
        self.limit_translation();
        Ok(())
    }

    /// Set the zoom level exactly, rejecting values outside the range.
    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), NetvisError> {
        if zoom < self.min_zoom || zoom > self.max_zoom {
            return Err(NetvisError::ZoomOutOfRange {
                zoom,
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        self.zoom = zoom;
        self.limit_translation();
        Ok(())
    }

    /// Multiply the zoom by `factor`, clamped into range, keeping `point`
    /// visually fixed by re-centering on it and adjusting the translation.
    pub fn zoom_about(&mut self, point: Vec2, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        let screen = self.to_screen(point);
        self.center = point;
        self.zoom = new_zoom;
        // With the center on the point, the scale leaves it in place; the
        // translation carries it back to where it was on screen.
        self.translation = (
            screen.x as f64 - point.x as f64,
            screen.y as f64 - point.y as f64,
        );
        self.limit_translation();
    }

    pub fn translate_to(&mut self, x: f64, y: f64) {
        self.translation = (x, y);
        self.limit_translation();
    }

    pub fn translate_by(&mut self, dx: f64, dy: f64) {
        self.translate_to(self.translation.0 + dx, self.translation.1 + dy);
    }

    /// Recenter the zoom on the middle of the surface.
    pub fn center_zoom(&mut self) {
        self.center = self.surface.center();
        self.limit_translation();
    }

    pub fn set_surface(&mut self, surface: Rect) {
        self.surface = surface;
        self.limit_translation();
    }

    pub fn to_screen(&self, point: Vec2) -> Vec2 {
        let x = (point.x - self.center.x) as f64 * self.zoom
            + self.center.x as f64
            + self.translation.0;
        let y = (point.y - self.center.y) as f64 * self.zoom
            + self.center.y as f64
            + self.translation.1;
        Vec2::new(x as f32, y as f32)
    }

    pub fn to_graph(&self, screen: Vec2) -> Vec2 {
        let x = (screen.x as f64 - self.center.x as f64 - self.translation.0) / self.zoom
            + self.center.x as f64;
        let y = (screen.y as f64 - self.center.y as f64 - self.translation.1) / self.zoom
            + self.center.y as f64;
        Vec2::new(x as f32, y as f32)
    }

    /// Clamp the translation so the scaled surface cannot leave the viewport
    /// entirely.  With scale s and the zoom center at c (surface-relative),
    /// the x translation is limited to [-(W - c)(s - 1), c(s - 1)].
    fn limit_translation(&mut self) {
        let s = self.zoom;
        let cx = (self.center.x - self.surface.min.x) as f64;
        let cy = (self.center.y - self.surface.min.y) as f64;
        let w = self.surface.width() as f64;
        let h = self.surface.height() as f64;
        self.translation.0 = clamp_axis(self.translation.0, -(w - cx) * (s - 1.0), cx * (s - 1.0));
        self.translation.1 = clamp_axis(self.translation.1, -(h - cy) * (s - 1.0), cy * (s - 1.0));
    }
}

fn clamp_axis(value: f64, a: f64, b: f64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    value.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> Rect {
        Rect::from_pos_size(Vec2::new(0.0, 0.0), Vec2::new(800.0, 600.0))
    }

    #[test]
    fn test_set_zoom_rejects_out_of_range() {
        let mut view = ViewTransform::new(surface());
        assert_eq!(
            view.set_zoom(0.5).unwrap_err(),
            NetvisError::ZoomOutOfRange {
                zoom: 0.5,
                min: 1.0,
                max: 10.0
            }
        );
        assert!(view.set_zoom(2.0).is_ok());
        assert_eq!(view.zoom(), 2.0);
    }

    #[test]
    fn test_translation_clamped_at_unit_zoom() {
        let mut view = ViewTransform::new(surface());
        // At zoom 1 the graph fills the surface; no panning is possible.
        view.translate_to(100.0, -100.0);
        assert_eq!(view.translation(), (0.0, 0.0));
    }

    #[test]
    fn test_translation_clamped_within_limits() {
        let mut view = ViewTransform::new(surface());
        view.set_zoom(2.0).unwrap();
        // Center is (400, 300): tx within [-400, 400], ty within [-300, 300].
        view.translate_to(1000.0, -1000.0);
        assert_eq!(view.translation(), (400.0, -300.0));

        view.translate_by(-500.0, 0.0);
        assert_eq!(view.translation(), (-100.0, -300.0));
    }

    #[test]
    fn test_zoom_about_keeps_point_fixed() {
        let mut view = ViewTransform::new(surface());
        let point = Vec2::new(200.0, 150.0);
        let before = view.to_screen(point);
        view.zoom_about(point, 2.0);
        let after = view.to_screen(point);
        assert!((before.x - after.x).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-3);
        assert_eq!(view.zoom(), 2.0);
    }

    #[test]
    fn test_zoom_about_clamps_factor_into_range() {
        let mut view = ViewTransform::new(surface());
        view.zoom_about(Vec2::new(100.0, 100.0), 100.0);
        assert_eq!(view.zoom(), 10.0);
        view.zoom_about(Vec2::new(100.0, 100.0), 1e-6);
        assert_eq!(view.zoom(), 1.0);
    }

    #[test]
    fn test_to_screen_to_graph_inverse() {
        let mut view = ViewTransform::new(surface());
        view.set_zoom(3.0).unwrap();
        view.translate_to(50.0, -20.0);
        let p = Vec2::new(123.0, 456.0);
        let back = view.to_graph(view.to_screen(p));
        assert!((back.x - p.x).abs() < 1e-3);
        assert!((back.y - p.y).abs() < 1e-3);
    }
}
