use netvis_core::{Rect, Vec2, VertexId};
use serde::{Deserialize, Serialize};

/// What the primary mouse button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseMode {
    #[default]
    Select,
    AddToSelection,
    SubtractFromSelection,
    Translate,
    ZoomIn,
    ZoomOut,
    DoNothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// Keyboard state the host samples when it forwards a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
    pub space: bool,
    /// Escape held at pointer-up cancels the drag in progress.
    pub escape: bool,
}

/// At most one drag is in progress at a time; a pointer-down while one exists
/// is ignored, and pointer-up always ends it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DragSession {
    /// The selected vertices follow the pointer.  Locations are untouched
    /// until the drag commits, so cancelling is free.
    Vertices {
        vertices: Vec<VertexId>,
        anchor: Vec2,
        offset: Vec2,
        /// Allowed range for `offset`, derived from the dragged set's
        /// bounding box and the layout rectangle minus margin.
        offset_range: Rect,
    },
    /// Rubber-band selection rectangle.
    Marquee {
        anchor: Vec2,
        current: Vec2,
        bounds: Rect,
    },
    /// Panning; the transform is updated live, so there is nothing to commit.
    Translation {
        anchor: Vec2,
        origin: (f64, f64),
    },
}

/// How a finished marquee combines with the existing selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MarqueePolicy {
    Replace,
    Add,
    Subtract,
    Invert,
}

impl MarqueePolicy {
    /// Control inverts in every mode, matching click behavior.
    pub fn from_mode(mode: MouseMode, control: bool) -> Option<Self> {
        if control {
            return match mode {
                MouseMode::Select | MouseMode::AddToSelection | MouseMode::SubtractFromSelection => {
                    Some(MarqueePolicy::Invert)
                }
                _ => None,
            };
        }
        match mode {
            MouseMode::Select => Some(MarqueePolicy::Replace),
            MouseMode::AddToSelection => Some(MarqueePolicy::Add),
            MouseMode::SubtractFromSelection => Some(MarqueePolicy::Subtract),
            _ => None,
        }
    }
}

/// Range of offsets that keeps a box with bounding box `bbox` inside
/// `bounds`.  A set that does not fit cannot move along that axis.
pub(crate) fn offset_range(bbox: Rect, bounds: Rect) -> Rect {
    let (min_x, max_x) = axis_range(bbox.min.x, bbox.max.x, bounds.min.x, bounds.max.x);
    let (min_y, max_y) = axis_range(bbox.min.y, bbox.max.y, bounds.min.y, bounds.max.y);
    Rect::from_min_max(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
}

fn axis_range(lo: f32, hi: f32, bound_lo: f32, bound_hi: f32) -> (f32, f32) {
    let min = bound_lo - lo;
    let max = bound_hi - hi;
    if min <= max {
        (min, max)
    } else {
        (0.0, 0.0)
    }
}

pub(crate) fn clamp_offset(offset: Vec2, range: Rect) -> Vec2 {
    Vec2::new(
        offset.x.clamp(range.min.x, range.max.x),
        offset.y.clamp(range.min.y, range.max.y),
    )
}

pub(crate) fn clamp_point(point: Vec2, bounds: Rect) -> Vec2 {
    Vec2::new(
        point.x.clamp(bounds.min.x, bounds.max.x),
        point.y.clamp(bounds.min.y, bounds.max.y),
    )
}

/// Normalized rectangle between the marquee's anchor and current corner.
pub(crate) fn marquee_rect(anchor: Vec2, current: Vec2) -> Rect {
    Rect::from_min_max(
        Vec2::new(anchor.x.min(current.x), anchor.y.min(current.y)),
        Vec2::new(anchor.x.max(current.x), anchor.y.max(current.y)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_range_keeps_set_inside_bounds() {
        let bbox = Rect::from_min_max(Vec2::new(10.0, 10.0), Vec2::new(30.0, 20.0));
        let bounds = Rect::from_min_max(Vec2::new(0.0, 0.0), Vec2::new(100.0, 50.0));
        let range = offset_range(bbox, bounds);
        assert_eq!(range.min, Vec2::new(-10.0, -10.0));
        assert_eq!(range.max, Vec2::new(70.0, 30.0));

        let clamped = clamp_offset(Vec2::new(-50.0, 100.0), range);
        assert_eq!(clamped, Vec2::new(-10.0, 30.0));
    }

    #[test]
    fn test_offset_range_frozen_when_set_does_not_fit() {
        let bbox = Rect::from_min_max(Vec2::new(-10.0, 0.0), Vec2::new(200.0, 10.0));
        let bounds = Rect::from_min_max(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0));
        let range = offset_range(bbox, bounds);
        // Too wide to fit horizontally, free to move vertically.
        assert_eq!((range.min.x, range.max.x), (0.0, 0.0));
        assert_eq!((range.min.y, range.max.y), (0.0, 90.0));
    }

    #[test]
    fn test_marquee_rect_normalizes_corners() {
        let rect = marquee_rect(Vec2::new(50.0, 10.0), Vec2::new(20.0, 40.0));
        assert_eq!(rect.min, Vec2::new(20.0, 10.0));
        assert_eq!(rect.max, Vec2::new(50.0, 40.0));
    }

    #[test]
    fn test_marquee_policy_from_mode() {
        assert_eq!(
            MarqueePolicy::from_mode(MouseMode::Select, false),
            Some(MarqueePolicy::Replace)
        );
        assert_eq!(
            MarqueePolicy::from_mode(MouseMode::Select, true),
            Some(MarqueePolicy::Invert)
        );
        assert_eq!(
            MarqueePolicy::from_mode(MouseMode::AddToSelection, false),
            Some(MarqueePolicy::Add)
        );
        assert_eq!(
            MarqueePolicy::from_mode(MouseMode::SubtractFromSelection, false),
            Some(MarqueePolicy::Subtract)
        );
        assert_eq!(MarqueePolicy::from_mode(MouseMode::Translate, false), None);
    }
}
