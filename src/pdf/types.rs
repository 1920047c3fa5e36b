//! Core types for PDF comparison

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CompareError;

/// Axis-aligned box in unscaled page coordinates (points, origin top-left)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest box covering both `self` and `other`
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            x0: self.x0 * factor,
            y0: self.y0 * factor,
            x1: self.x1 * factor,
            y1: self.y1 * factor,
        }
    }
}

/// A word-level text unit with its bounding box and source page
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub text: String,
    pub bbox: BBox,
    /// Page number (0-indexed)
    pub page_index: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, bbox: BBox, page_index: usize) -> Self {
        Self {
            text: text.into(),
            bbox,
            page_index,
        }
    }
}

/// Rendered page image.
///
/// Raw RGB pixel data, 3 bytes per pixel, rows packed without padding.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Page number (0-indexed)
    pub page_index: usize,
}

impl Raster {
    /// Create a raster filled with a single color
    #[must_use]
    pub fn filled(width: u32, height: u32, page_index: usize, rgb: [u8; 3]) -> Self {
        let len = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(len * 3);
        for _ in 0..len {
            pixels.extend_from_slice(&rgb);
        }
        Self {
            pixels,
            width,
            height,
            page_index,
        }
    }

    /// Wrap an existing RGB buffer, checking its length
    pub fn from_rgb(
        width: u32,
        height: u32,
        page_index: usize,
        pixels: Vec<u8>,
    ) -> Result<Self, CompareError> {
        let raster = Self {
            pixels,
            width,
            height,
            page_index,
        };
        raster.check()?;
        Ok(raster)
    }

    /// Fails when the buffer length does not match `width * height * 3`
    pub fn check(&self) -> Result<(), CompareError> {
        let expected = self.width as usize * self.height as usize * 3;
        if self.pixels.len() != expected {
            return Err(CompareError::InvalidRaster {
                page: self.page_index,
                width: self.width,
                height: self.height,
                len: self.pixels.len(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        let px = self.pixels.get(i..i + 3)?;
        Some([px[0], px[1], px[2]])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        if let Some(px) = self.pixels.get_mut(i..i + 3) {
            px.copy_from_slice(&rgb);
        }
    }
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("page_index", &self.page_index)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Overlay color with alpha for translucent highlights
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Alpha-blend this color over `dst` in place
    #[inline]
    pub fn blend_over(self, dst: &mut [u8]) {
        let a = u32::from(self.a);
        let inv = 255 - a;
        for (d, s) in dst.iter_mut().zip([self.r, self.g, self.b]) {
            *d = ((u32::from(s) * a + u32::from(*d) * inv + 127) / 255) as u8;
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = CompareError;

    /// Accepts `#RRGGBB`, `#RRGGBBAA` or `r,g,b[,a]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || CompareError::InvalidConfig(format!("invalid color {s:?}"));

        if let Some(hex) = s.strip_prefix('#') {
            if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
                return Err(invalid());
            }
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            let a = if hex.len() == 8 { byte(6)? } else { 255 };
            return Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, a));
        }

        let parts: Vec<u8> = s
            .split(',')
            .map(|p| p.trim().parse::<u8>().map_err(|_| invalid()))
            .collect::<Result<_, _>>()?;
        match parts.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b, 255)),
            [r, g, b, a] => Ok(Self::new(*r, *g, *b, *a)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = CompareError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colors() {
        assert_eq!("#00ff00".parse::<Rgba>().unwrap(), Rgba::new(0, 255, 0, 255));
        assert_eq!("#FF000040".parse::<Rgba>().unwrap(), Rgba::new(255, 0, 0, 64));
        assert_eq!("0, 255, 0, 64".parse::<Rgba>().unwrap(), Rgba::new(0, 255, 0, 64));
        assert_eq!("1,2,3".parse::<Rgba>().unwrap(), Rgba::new(1, 2, 3, 255));
    }

    #[test]
    fn test_parse_rejects_malformed_colors() {
        for bad in ["", "#12345", "#gg0000", "1,2", "1,2,3,4,5", "300,0,0", "red"] {
            assert!(bad.parse::<Rgba>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_color_display_parses_back() {
        let c = Rgba::new(18, 52, 86, 120);
        assert_eq!(c.to_string(), "#12345678");
        assert_eq!(c.to_string().parse::<Rgba>().unwrap(), c);
    }

    #[test]
    fn test_blend_over() {
        let mut px = [255u8, 255, 255];
        Rgba::new(255, 0, 0, 64).blend_over(&mut px);
        assert_eq!(px, [255, 191, 191]);

        let mut px = [10u8, 20, 30];
        Rgba::new(200, 200, 200, 0).blend_over(&mut px);
        assert_eq!(px, [10, 20, 30]);

        let mut px = [10u8, 20, 30];
        Rgba::new(200, 100, 0, 255).blend_over(&mut px);
        assert_eq!(px, [200, 100, 0]);
    }

    #[test]
    fn test_raster_pixel_access() {
        let mut r = Raster::filled(4, 3, 0, [1, 2, 3]);
        assert_eq!(r.pixels.len(), 36);
        assert_eq!(r.pixel(3, 2), Some([1, 2, 3]));
        assert_eq!(r.pixel(4, 0), None);
        r.set_pixel(1, 1, [9, 9, 9]);
        assert_eq!(r.pixel(1, 1), Some([9, 9, 9]));
        assert!(Raster::from_rgb(2, 2, 0, vec![0; 11]).is_err());
    }

    #[test]
    fn test_truncated_buffer_is_detected_without_panicking() {
        let mut r = Raster::filled(4, 3, 2, [1, 2, 3]);
        r.pixels.truncate(20);

        assert!(matches!(
            r.check(),
            Err(CompareError::InvalidRaster { page: 2, width: 4, height: 3, len: 20 })
        ));
        assert_eq!(r.pixel(1, 1), Some([1, 2, 3]));
        assert_eq!(r.pixel(3, 2), None);
        r.set_pixel(3, 2, [9, 9, 9]);
        assert_eq!(r.pixels.len(), 20);
    }

    #[test]
    fn test_bbox_union_and_scale() {
        let b = BBox::new(1.0, 2.0, 3.0, 4.0).union(BBox::new(0.5, 3.0, 2.0, 6.0));
        assert_eq!(b, BBox::new(0.5, 2.0, 3.0, 6.0));
        assert_eq!(b.scaled(2.0), BBox::new(1.0, 4.0, 6.0, 12.0));
    }
}
