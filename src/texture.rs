use std::fs;
use std::path::Path;

use crate::color::Color;
use crate::error::{ Result, TracerError };

/// A texture image.
///
/// A row-major array of colors, normalized to [0, 1] from the 8-bit
/// channels of a plain (P3) PPM file.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    texels: Vec<Color>,
}

impl Texture {
    /// Parses a plain PPM image: `P3`, width, height, the maximum channel
    /// value, then whitespace-separated integer triples.
    pub fn parse(contents: &str) -> std::result::Result<Texture, String> {
        let mut tokens = contents.split_whitespace();

        let magic = tokens.next().ok_or("empty file")?;
        if magic != "P3" {
            return Err(format!("expected P3 magic number, found `{}`", magic));
        }

        let mut dimension = || -> std::result::Result<usize, String> {
            tokens.next()
                .ok_or_else(|| "truncated header".to_string())?
                .parse::<usize>()
                .map_err(|e| e.to_string())
        };

        let width = dimension()?;
        let height = dimension()?;
        let _max_value = dimension()?;

        if width == 0 || height == 0 {
            return Err("image dimensions must be positive".to_string());
        }

        let mut channels = Vec::with_capacity(width * height * 3);
        for token in tokens {
            let value: f64 = token.parse().map_err(
                |_| format!("bad channel value `{}`", token)
            )?;
            channels.push(value / 255.0);
        }

        if channels.len() < width * height * 3 {
            return Err(format!(
                "expected {} channel values, found {}",
                width * height * 3, channels.len()
            ));
        }

        let texels = channels
            .chunks_exact(3)
            .map(|c| Color::rgb(c[0], c[1], c[2]))
            .collect();

        Ok(Texture { width, height, texels })
    }

    /// Samples the nearest texel to texture coordinates (u, v) in [0, 1].
    pub fn sample(&self, u: f64, v: f64) -> Color {
        let col = (u * (self.width as f64 - 1.0) + 0.5) as usize;
        let row = (v * (self.height as f64 - 1.0) + 0.5) as usize;

        let index = (row * self.width + col).min(self.texels.len() - 1);
        self.texels[index]
    }
}

/// The scene's resolved texture table.
///
/// Every distinct texture file referenced by a material is read exactly
/// once, in declaration order, so material texture handles index
/// straight into `textures`. An unreadable or malformed file fails the
/// whole load; render-time sampling can then never miss.
#[derive(Clone, Debug, Default)]
pub struct TextureSet {
    textures: Vec<Texture>,
}

impl TextureSet {
    /// A set with no textures, for scenes without any.
    pub fn empty() -> TextureSet {
        Default::default()
    }

    /// A set over textures parsed elsewhere.
    pub fn with_textures(textures: Vec<Texture>) -> TextureSet {
        TextureSet { textures }
    }

    /// Loads every file in `files`, resolving relative paths against
    /// `base_dir` (the scene file's directory).
    pub fn load(files: &[String], base_dir: &Path) -> Result<TextureSet> {
        let mut textures = Vec::with_capacity(files.len());

        for name in files {
            let path = base_dir.join(name);
            let contents = fs::read_to_string(&path).map_err(|e| {
                TracerError::UnresolvableTexture {
                    path: name.clone(),
                    message: e.to_string(),
                }
            })?;

            let texture = Texture::parse(&contents).map_err(|message| {
                TracerError::UnresolvableTexture { path: name.clone(), message }
            })?;

            log::debug!(
                "loaded texture `{}` ({}x{})",
                name, texture.width, texture.height
            );
            textures.push(texture);
        }

        Ok(TextureSet { textures })
    }

    pub fn sample(&self, handle: usize, u: f64, v: f64) -> Color {
        self.textures[handle].sample(u, v)
    }
}

/* Tests */

#[cfg(test)]
const CHECKER_2X2: &str = "P3\n2 2\n255\n\
    255 0 0  0 255 0\n\
    0 0 255  255 255 255\n";

#[test]
fn parse_small_ppm() {
    let tex = Texture::parse(CHECKER_2X2).unwrap();

    assert_eq!(tex.width, 2);
    assert_eq!(tex.height, 2);
    assert_eq!(tex.sample(0.0, 0.0), Color::rgb(1.0, 0.0, 0.0));
    assert_eq!(tex.sample(1.0, 0.0), Color::rgb(0.0, 1.0, 0.0));
    assert_eq!(tex.sample(0.0, 1.0), Color::rgb(0.0, 0.0, 1.0));
    assert_eq!(tex.sample(1.0, 1.0), Color::white());
}

#[test]
fn sample_rounds_to_nearest_texel() {
    let tex = Texture::parse(CHECKER_2X2).unwrap();

    // u = 0.4 rounds down to column 0, u = 0.6 rounds up to column 1.
    assert_eq!(tex.sample(0.4, 0.0), Color::rgb(1.0, 0.0, 0.0));
    assert_eq!(tex.sample(0.6, 0.0), Color::rgb(0.0, 1.0, 0.0));
}

#[test]
fn parse_rejects_wrong_magic() {
    assert!(Texture::parse("P6\n1 1\n255\n0 0 0\n").is_err());
}

#[test]
fn parse_rejects_truncated_pixels() {
    assert!(Texture::parse("P3\n2 2\n255\n255 0 0\n").is_err());
}
