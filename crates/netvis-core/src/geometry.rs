use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle stored as min/max corners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Create a new rectangle from min and max corners
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create a new rectangle from position and size
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: Vec2::new(pos.x + size.x, pos.y + size.y),
        }
    }

    /// An empty rectangle
    pub const NOTHING: Self = Self {
        min: Vec2 { x: 0.0, y: 0.0 },
        max: Vec2 { x: 0.0, y: 0.0 },
    };

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.min.x + self.width() * 0.5,
            self.min.y + self.height() * 0.5,
        )
    }

    /// Check if the rectangle contains a point
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Check if this rectangle intersects with another rectangle
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Grow the rectangle by `amount` on every side.  A negative amount
    /// shrinks it, which is how a margin is subtracted from a layout
    /// rectangle.
    pub fn inflate(&self, amount: f32) -> Rect {
        Rect {
            min: Vec2::new(self.min.x - amount, self.min.y - amount),
            max: Vec2::new(self.max.x + amount, self.max.y + amount),
        }
    }

    /// True when the rectangle has positive area.
    pub fn is_positive(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_and_center() {
        let rect = Rect::from_pos_size(Vec2::new(10.0, 20.0), Vec2::new(100.0, 50.0));
        assert!(rect.contains(Vec2::new(10.0, 20.0)));
        assert!(rect.contains(Vec2::new(110.0, 70.0)));
        assert!(!rect.contains(Vec2::new(9.9, 20.0)));
        assert_eq!(rect.center(), Vec2::new(60.0, 45.0));
    }

    #[test]
    fn test_rect_inflate_negative_subtracts_margin() {
        let rect = Rect::from_pos_size(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0));
        let inner = rect.inflate(-6.0);
        assert_eq!(inner.min, Vec2::new(6.0, 6.0));
        assert_eq!(inner.max, Vec2::new(94.0, 94.0));
        assert!(inner.is_positive());

        // A margin wider than the rect leaves nothing to draw in.
        let tiny = Rect::from_pos_size(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(!tiny.inflate(-6.0).is_positive());
    }

    #[test]
    fn test_rect_intersects() {
        let a = Rect::from_pos_size(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Rect::from_pos_size(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0));
        let c = Rect::from_pos_size(Vec2::new(20.0, 20.0), Vec2::new(5.0, 5.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
