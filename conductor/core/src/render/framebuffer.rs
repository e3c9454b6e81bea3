//! Offscreen color buffer

use super::Rgb;

/// A row-major buffer of linear RGB pixels
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Framebuffer {
    /// Create a black buffer of the given size
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; width * height],
        }
    }

    /// Buffer width in pixels
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Buffer height in pixels
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Resize, discarding contents
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, Rgb::BLACK);
    }

    /// Fill with a single color
    pub fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    /// Pixel at `(x, y)`, or `None` out of bounds
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Overwrite a pixel; out-of-bounds writes are ignored
    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Additively blend into a pixel given signed coordinates
    pub fn blend_add(&mut self, x: i32, y: i32, color: Rgb) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] += color;
        }
    }

    /// All pixels, row-major
    #[must_use]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// All pixels, row-major, mutable
    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    /// One row of pixels
    #[must_use]
    pub fn row(&self, y: usize) -> &[Rgb] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }
}
