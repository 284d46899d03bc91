//! Rectangles and dirty-region tracking.

/// Inclusive pixel rectangle `(x0, y0)..=(x1, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Rect {
    /// A single pixel.
    pub fn point(x: u32, y: u32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x,
            y1: y,
        }
    }

    /// The whole `width × height` panel.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width - 1,
            y1: height - 1,
        }
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0 + 1
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0 + 1
    }
}

/// Bounding box of everything modified since the last successful flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirtyRegion {
    bounds: Option<Rect>,
}

impl DirtyRegion {
    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Grow the region to cover `rect`.
    pub fn include(&mut self, rect: Rect) {
        self.bounds = Some(match self.bounds {
            Some(current) => current.union(&rect),
            None => rect,
        });
    }

    /// Forget everything; called once the region reached the panel.
    pub fn reset(&mut self) {
        self.bounds = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let region = DirtyRegion::default();
        assert!(region.is_empty());
        assert_eq!(region.bounds(), None);
    }

    #[test]
    fn include_grows_bounding_box() {
        let mut region = DirtyRegion::default();
        region.include(Rect::point(10, 3));
        region.include(Rect::point(2, 20));
        assert_eq!(
            region.bounds(),
            Some(Rect {
                x0: 2,
                y0: 3,
                x1: 10,
                y1: 20
            })
        );

        region.reset();
        assert!(region.is_empty());
    }

    #[test]
    fn full_rect_dimensions() {
        let r = Rect::full(128, 64);
        assert_eq!(r.width(), 128);
        assert_eq!(r.height(), 64);
        assert_eq!((r.x1, r.y1), (127, 63));
    }
}
