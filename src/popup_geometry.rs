//! Viewport-relative placement for anchored popups.
//!
//! Plain `f32` geometry so placement can be tested without a window.

/// Gap between the bottom of the anchor and the top of the popup.
pub const ANCHOR_GAP: f32 = 5.0;

/// Size the token editor popup is laid out at.
pub const TOKEN_POPUP_SIZE: Size = Size {
    width: 320.0,
    height: 200.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }
}

/// Top-left corner for a popup of `popup` size anchored below `anchor`.
///
/// The popup starts at the anchor's left edge, `ANCHOR_GAP` below its bottom edge,
/// then both axes are clamped so the popup stays inside `viewport`. When the popup is
/// larger than the viewport it is pinned to the top-left corner.
pub fn popup_origin(anchor: Rect, popup: Size, viewport: Size) -> Point {
    let preferred = Point {
        x: anchor.origin.x,
        y: anchor.bottom() + ANCHOR_GAP,
    };

    Point {
        x: clamp_axis(preferred.x, popup.width, viewport.width),
        y: clamp_axis(preferred.y, popup.height, viewport.height),
    }
}

fn clamp_axis(position: f32, extent: f32, available: f32) -> f32 {
    position.min(available - extent).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size {
        width: 1280.0,
        height: 800.0,
    };

    #[test]
    fn test_places_below_anchor() {
        let anchor = Rect::new(100.0, 40.0, 60.0, 20.0);
        let origin = popup_origin(anchor, TOKEN_POPUP_SIZE, VIEWPORT);
        assert_eq!(origin, Point { x: 100.0, y: 65.0 });
    }

    #[test]
    fn test_clamps_right_edge() {
        let anchor = Rect::new(1200.0, 40.0, 60.0, 20.0);
        let origin = popup_origin(anchor, TOKEN_POPUP_SIZE, VIEWPORT);
        assert_eq!(origin.x, 1280.0 - 320.0);
        assert_eq!(origin.y, 65.0);
    }

    #[test]
    fn test_clamps_bottom_edge() {
        let anchor = Rect::new(10.0, 760.0, 60.0, 20.0);
        let origin = popup_origin(anchor, TOKEN_POPUP_SIZE, VIEWPORT);
        assert_eq!(origin.y, 800.0 - 200.0);
        assert_eq!(origin.x, 10.0);
    }

    #[test]
    fn test_never_negative() {
        let anchor = Rect::new(-30.0, -50.0, 10.0, 10.0);
        let origin = popup_origin(anchor, TOKEN_POPUP_SIZE, VIEWPORT);
        assert_eq!(origin.x, 0.0);
        assert_eq!(origin.y, 0.0);
    }

    #[test]
    fn test_tiny_viewport_pins_to_corner() {
        let viewport = Size {
            width: 200.0,
            height: 100.0,
        };
        let anchor = Rect::new(50.0, 20.0, 10.0, 10.0);
        let origin = popup_origin(anchor, TOKEN_POPUP_SIZE, viewport);
        assert_eq!(origin, Point { x: 0.0, y: 0.0 });
    }
}
