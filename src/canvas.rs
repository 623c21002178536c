use std::fs::File;
use std::io::{ BufWriter, Write };
use std::path::Path;

use crate::color::Color;
use crate::error::Result;

/// The rendered image.
///
/// A row-major grid of colors, indexed left to right and top to bottom,
/// written out as a plain (P3) PPM file.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a black canvas of the given dimensions.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height],
        }
    }

    /// Writes a color to pixel (x, y). Out-of-bounds writes are ignored.
    pub fn write_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Reads the color at pixel (x, y). Out-of-bounds reads are black.
    pub fn pixel_at(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Color::black()
        }
    }

    /// Renders the canvas as plain PPM text: the `P3` magic number, the
    /// dimensions, the maximum channel value, then one line of 8-bit
    /// triples per pixel row, top row first.
    pub fn to_ppm(&self) -> String {
        let mut ppm = format!("P3\n{} {}\n255\n", self.width, self.height);

        for row in self.pixels.chunks(self.width) {
            let line: Vec<String> = row
                .iter()
                .flat_map(|color| color.to_bytes())
                .map(|byte| byte.to_string())
                .collect();

            ppm.push_str(&line.join(" "));
            ppm.push('\n');
        }

        ppm
    }

    /// Saves the canvas as a PPM file at `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(self.to_ppm().as_bytes())?;
        writer.flush()?;

        Ok(())
    }
}

/* Tests */

#[test]
fn new_canvas_is_black() {
    let canvas = Canvas::new(4, 3);

    assert_eq!(canvas.width, 4);
    assert_eq!(canvas.height, 3);
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(canvas.pixel_at(x, y), Color::black());
        }
    }
}

#[test]
fn written_pixel_reads_back() {
    let mut canvas = Canvas::new(4, 3);
    let red = Color::rgb(1.0, 0.0, 0.0);

    canvas.write_pixel(2, 1, red);

    assert_eq!(canvas.pixel_at(2, 1), red);
    assert_eq!(canvas.pixel_at(1, 2), Color::black());
}

#[test]
fn out_of_bounds_access_is_harmless() {
    let mut canvas = Canvas::new(2, 2);

    canvas.write_pixel(5, 5, Color::white());

    assert_eq!(canvas.pixel_at(5, 5), Color::black());
}

#[test]
fn ppm_header_and_rows() {
    let mut canvas = Canvas::new(2, 2);
    canvas.write_pixel(0, 0, Color::rgb(1.5, 0.0, 0.0));
    canvas.write_pixel(1, 1, Color::rgb(0.0, 0.5, 0.0));

    let ppm = canvas.to_ppm();
    let lines: Vec<&str> = ppm.lines().collect();

    assert_eq!(lines[0], "P3");
    assert_eq!(lines[1], "2 2");
    assert_eq!(lines[2], "255");
    assert_eq!(lines[3], "255 0 0 0 0 0");
    assert_eq!(lines[4], "0 0 0 0 127 0");
}
