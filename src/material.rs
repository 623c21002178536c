use crate::color::Color;

/// A material record.
///
/// Blinn-Phong attributes: a diffuse color, a specular color, the
/// ambient/diffuse/specular coefficients, and a specular falloff
/// exponent. `alpha` is opacity (0 fully transparent, 1 fully opaque)
/// and `eta` the refractive index.
///
/// Textured materials hold a handle into the scene's texture table,
/// resolved once at load time; the renderer never looks textures up by
/// filename.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub diffuse: Color,
    pub specular: Color,

    pub ka: f64,
    pub kd: f64,
    pub ks: f64,
    pub falloff: f64,

    pub alpha: f64,
    pub eta: f64,

    pub texture: Option<usize>,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            diffuse: Color::white(),
            specular: Color::white(),

            ka: 0.6,
            kd: 0.8,
            ks: 0.2,
            falloff: 10.0,

            alpha: 1.0,
            eta: 1.0,

            texture: None,
        }
    }
}

impl Material {
    /// Builds a material from the scene file's twelve `mtlcolor` numbers:
    /// odr odg odb osr osg osb ka kd ks falloff alpha eta.
    pub fn from_params(params: &[f64; 12]) -> Material {
        Material {
            diffuse: Color::rgb(params[0], params[1], params[2]),
            specular: Color::rgb(params[3], params[4], params[5]),
            ka: params[6],
            kd: params[7],
            ks: params[8],
            falloff: params[9],
            alpha: params[10],
            eta: params[11],
            texture: None,
        }
    }

    /// The same material with its diffuse color replaced by a sampled
    /// texel. Used when shading a textured surface.
    pub fn with_diffuse(&self, texel: Color) -> Material {
        Material { diffuse: texel, ..*self }
    }
}

/* Tests */

#[test]
fn material_from_mtlcolor_params() {
    let m = Material::from_params(
        &[1.0, 0.5, 0.2, 1.0, 1.0, 1.0, 0.1, 0.7, 0.3, 20.0, 0.5, 1.5]
    );

    assert_eq!(m.diffuse, Color::rgb(1.0, 0.5, 0.2));
    assert_eq!(m.specular, Color::white());
    assert_eq!(m.ka, 0.1);
    assert_eq!(m.kd, 0.7);
    assert_eq!(m.ks, 0.3);
    assert_eq!(m.falloff, 20.0);
    assert_eq!(m.alpha, 0.5);
    assert_eq!(m.eta, 1.5);
    assert!(m.texture.is_none());
}

#[test]
fn texel_substitution_keeps_coefficients() {
    let mut m = Material::default();
    m.texture = Some(0);

    let shaded = m.with_diffuse(Color::rgb(0.2, 0.4, 0.6));

    assert_eq!(shaded.diffuse, Color::rgb(0.2, 0.4, 0.6));
    assert_eq!(shaded.specular, m.specular);
    assert_eq!(shaded.kd, m.kd);
    assert_eq!(shaded.texture, Some(0));
}
