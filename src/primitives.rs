//! Line, rectangle and circle rasterisation.
//!
//! Every routine here is written against [`SetPixel`] alone and never sees
//! the packed buffer layout, so it works for any panel size. Shapes are
//! checked against the target's extent before the first pixel is written:
//! a shape that does not fit fails with [`OledError::OutOfBounds`] and
//! leaves the target untouched.

use crate::error::OledError;

/// A pixel-addressable drawing surface.
pub trait SetPixel {
    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Set (`on = true`) or clear one pixel.
    fn set_pixel(&mut self, x: u32, y: u32, on: bool) -> Result<(), OledError>;
}

fn check_point<T: SetPixel + ?Sized>(target: &T, x: u32, y: u32) -> Result<(), OledError> {
    let (width, height) = target.dimensions();
    if x >= width || y >= height {
        return Err(OledError::OutOfBounds);
    }
    Ok(())
}

/// Bresenham line from `(x0, y0)` to `(x1, y1)`, both ends included.
pub fn draw_line<T: SetPixel + ?Sized>(
    target: &mut T,
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
    on: bool,
) -> Result<(), OledError> {
    // The line lies within the box spanned by its end points.
    check_point(target, x0, y0)?;
    check_point(target, x1, y1)?;

    let (mut x, mut y) = (x0 as i32, y0 as i32);
    let (x_end, y_end) = (x1 as i32, y1 as i32);
    let dx = (x_end - x).abs();
    let dy = -(y_end - y).abs();
    let step_x = if x < x_end { 1 } else { -1 };
    let step_y = if y < y_end { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        target.set_pixel(x as u32, y as u32, on)?;
        if x == x_end && y == y_end {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += step_x;
        }
        if e2 <= dx {
            err += dx;
            y += step_y;
        }
    }
    Ok(())
}

/// Horizontal run of `length` pixels starting at `(x, y)`.
pub fn draw_hline<T: SetPixel + ?Sized>(
    target: &mut T,
    x: u32,
    y: u32,
    length: u32,
    on: bool,
) -> Result<(), OledError> {
    if length == 0 {
        return Err(OledError::InvalidParameter);
    }
    draw_line(target, x, y, x.saturating_add(length - 1), y, on)
}

/// Vertical run of `length` pixels starting at `(x, y)`.
pub fn draw_vline<T: SetPixel + ?Sized>(
    target: &mut T,
    x: u32,
    y: u32,
    length: u32,
    on: bool,
) -> Result<(), OledError> {
    if length == 0 {
        return Err(OledError::InvalidParameter);
    }
    draw_line(target, x, y, x, y.saturating_add(length - 1), on)
}

fn check_rect<T: SetPixel + ?Sized>(
    target: &T,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<(), OledError> {
    if width == 0 || height == 0 {
        return Err(OledError::InvalidParameter);
    }
    check_point(target, x, y)?;
    check_point(
        target,
        x.saturating_add(width - 1),
        y.saturating_add(height - 1),
    )
}

/// One-pixel outline of the `width × height` rectangle at `(x, y)`.
pub fn draw_rect<T: SetPixel + ?Sized>(
    target: &mut T,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    on: bool,
) -> Result<(), OledError> {
    check_rect(target, x, y, width, height)?;
    let (right, bottom) = (x + width - 1, y + height - 1);
    draw_line(target, x, y, right, y, on)?;
    draw_line(target, x, bottom, right, bottom, on)?;
    draw_line(target, x, y, x, bottom, on)?;
    draw_line(target, right, y, right, bottom, on)
}

/// Solid `width × height` rectangle at `(x, y)`.
pub fn fill_rect<T: SetPixel + ?Sized>(
    target: &mut T,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    on: bool,
) -> Result<(), OledError> {
    check_rect(target, x, y, width, height)?;
    for row in y..y + height {
        draw_line(target, x, row, x + width - 1, row, on)?;
    }
    Ok(())
}

/// Midpoint circle outline centred on `(cx, cy)`.
pub fn draw_circle<T: SetPixel + ?Sized>(
    target: &mut T,
    cx: u32,
    cy: u32,
    radius: u32,
    on: bool,
) -> Result<(), OledError> {
    if radius > cx || radius > cy {
        return Err(OledError::OutOfBounds);
    }
    check_point(target, cx.saturating_add(radius), cy.saturating_add(radius))?;

    let (cx, cy) = (cx as i32, cy as i32);
    let mut x = radius as i32;
    let mut y = 0i32;
    let mut err = 1 - x;

    while x >= y {
        for (px, py) in [
            (cx + x, cy + y),
            (cx + y, cy + x),
            (cx - y, cy + x),
            (cx - x, cy + y),
            (cx - x, cy - y),
            (cx - y, cy - x),
            (cx + y, cy - x),
            (cx + x, cy - y),
        ] {
            target.set_pixel(px as u32, py as u32, on)?;
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
    Ok(())
}
