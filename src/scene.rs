use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use serde::{ Serialize, Deserialize };

use crate::color::Color;
use crate::error::{ Result, TracerError };
use crate::light::{ Attenuation, Light };
use crate::material::Material;
use crate::vector::{ Point3, Vector3 };

/// A sphere primitive, bound to the most recently declared material.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Point3,
    pub radius: f64,
    pub material: usize,
}

/// One corner of a triangle face.
///
/// Indices are 0-based references into the scene's vertex, texture
/// coordinate and vertex normal tables; they are validated during
/// parsing. An absent normal index means the face is flat shaded.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceVertex {
    pub vertex: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

/// A triangle face with the material active at its declaration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Face {
    pub vertices: [FaceVertex; 3],
    pub material: usize,
}

/// A fully validated in-memory scene description.
///
/// Built once by one of the loaders, then read-only for the lifetime of
/// the render.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub eye: Point3,
    pub view_dir: Vector3,
    pub up_dir: Vector3,

    /// Vertical field of view, in degrees.
    pub vfov: f64,

    pub width: usize,
    pub height: usize,
    pub background: Color,

    pub materials: Vec<Material>,
    pub spheres: Vec<Sphere>,
    pub lights: Vec<Light>,

    pub vertices: Vec<Point3>,
    pub normals: Vec<Vector3>,
    pub texcoords: Vec<(f64, f64)>,
    pub faces: Vec<Face>,

    /// Texture filenames in handle order; material texture handles index
    /// into the `TextureSet` loaded from these.
    pub texture_files: Vec<String>,
}

impl Scene {
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// The three corner points of a face.
    pub fn triangle(&self, face: &Face) -> (Point3, Point3, Point3) {
        (
            self.vertices[face.vertices[0].vertex],
            self.vertices[face.vertices[1].vertex],
            self.vertices[face.vertices[2].vertex],
        )
    }

    /// Loads a scene from a file, picking the loader by extension:
    /// `.json` goes through the serde description, anything else through
    /// the keyword text format.
    pub fn from_file(path: &Path) -> Result<Scene> {
        let contents = fs::read_to_string(path)?;

        if path.extension().map_or(false, |e| e == "json") {
            let json: SceneJson = serde_json::from_str(&contents)
                .map_err(|e| TracerError::malformed(e.line(), e.to_string()))?;
            Scene::try_from(json)
        } else {
            Scene::parse(&contents)
        }
    }

    /// Parses the keyword scene format.
    ///
    /// One keyword per line: `eye`, `viewdir`, `updir`, `vfov`, `imsize`,
    /// `bkgcolor`, `mtlcolor`, `texture`, `sphere`, `light`, `v`, `vn`,
    /// `vt` and `f`. Unknown keywords are ignored. Missing required
    /// fields, malformed numbers and out-of-range indices are fatal.
    pub fn parse(contents: &str) -> Result<Scene> {
        let mut builder = SceneBuilder::default();

        for (index, line) in contents.lines().enumerate() {
            builder.line(index + 1, line)?;
        }

        builder.finish()
    }
}

/// Accumulates scene state while the text format is parsed.
///
/// Face indices stay 1-based until `finish`, where they are validated
/// against the final table sizes and converted; the format does not
/// require vertices to be declared before the faces that use them.
#[derive(Default)]
struct SceneBuilder {
    eye: Option<Point3>,
    view_dir: Option<Vector3>,
    up_dir: Option<Vector3>,
    vfov: Option<f64>,
    image_size: Option<(usize, usize)>,
    background: Option<Color>,

    materials: Vec<Material>,
    spheres: Vec<Sphere>,
    lights: Vec<Light>,

    vertices: Vec<Point3>,
    normals: Vec<Vector3>,
    texcoords: Vec<(f64, f64)>,

    /// Faces with raw 1-based indices and the line they came from.
    raw_faces: Vec<(usize, [RawFaceVertex; 3], usize)>,

    texture_files: Vec<String>,
}

/// A face corner as written: 1-based, 0 or absent meaning "none".
#[derive(Copy, Clone, Debug)]
struct RawFaceVertex {
    vertex: i64,
    texcoord: Option<i64>,
    normal: Option<i64>,
}

impl SceneBuilder {
    fn line(&mut self, line: usize, text: &str) -> Result<()> {
        let mut tokens = text.split_whitespace();
        let keyword = match tokens.next() {
            Some(k) => k,
            None => return Ok(()),
        };

        match keyword {
            "eye" => {
                let p = numbers::<3>(line, keyword, &mut tokens)?;
                self.eye = Some(Point3::new(p[0], p[1], p[2]));
            },
            "viewdir" => {
                let v = numbers::<3>(line, keyword, &mut tokens)?;
                self.view_dir = Some(Vector3::new(v[0], v[1], v[2]));
            },
            "updir" => {
                let v = numbers::<3>(line, keyword, &mut tokens)?;
                self.up_dir = Some(Vector3::new(v[0], v[1], v[2]));
            },
            "vfov" => {
                let v = numbers::<1>(line, keyword, &mut tokens)?;
                self.vfov = Some(v[0]);
            },
            "imsize" => {
                let size = numbers::<2>(line, keyword, &mut tokens)?;
                if size[0] < 1.0 || size[1] < 1.0
                    || size[0].fract() != 0.0 || size[1].fract() != 0.0 {
                    return Err(TracerError::InvalidImageSize);
                }
                self.image_size = Some((size[0] as usize, size[1] as usize));
            },
            "bkgcolor" => {
                let c = numbers::<3>(line, keyword, &mut tokens)?;
                self.background = Some(Color::rgb(c[0], c[1], c[2]));
            },
            "mtlcolor" => {
                let params = numbers::<12>(line, keyword, &mut tokens)?;
                self.materials.push(Material::from_params(&params));
            },
            "texture" => self.texture(line, &mut tokens)?,
            "sphere" => self.sphere(line, &mut tokens)?,
            "light" => self.light(line, &mut tokens)?,
            "v" => {
                let p = numbers::<3>(line, keyword, &mut tokens)?;
                self.vertices.push(Point3::new(p[0], p[1], p[2]));
            },
            "vn" => {
                let v = numbers::<3>(line, keyword, &mut tokens)?;
                self.normals.push(Vector3::new(v[0], v[1], v[2]));
            },
            "vt" => {
                let t = numbers::<2>(line, keyword, &mut tokens)?;
                self.texcoords.push((t[0], t[1]));
            },
            "f" => self.face(line, &mut tokens)?,
            _ => {},
        }

        Ok(())
    }

    /// `texture <file>` declares a textured material. The Blinn-Phong
    /// coefficients carry over from the previous material (or defaults
    /// when there is none); the diffuse channel comes from the texture
    /// at shading time.
    fn texture<'a>(&mut self, line: usize,
        tokens: &mut impl Iterator<Item = &'a str>) -> Result<()> {
        let name = tokens.next().ok_or_else(|| {
            TracerError::malformed(line, "keyword `texture` requires a filename")
        })?;

        let handle = match self.texture_files.iter().position(|f| f == name) {
            Some(existing) => existing,
            None => {
                self.texture_files.push(name.to_string());
                self.texture_files.len() - 1
            },
        };

        let base = self.materials.last().copied().unwrap_or_default();
        self.materials.push(Material {
            diffuse: Color::black(),
            specular: Color::white(),
            texture: Some(handle),
            ..base
        });

        Ok(())
    }

    fn sphere<'a>(&mut self, line: usize,
        tokens: &mut impl Iterator<Item = &'a str>) -> Result<()> {
        let params = numbers::<4>(line, "sphere", tokens)?;

        if params[3] <= 0.0 {
            return Err(TracerError::malformed(line, "sphere radius must be positive"));
        }
        if self.materials.is_empty() {
            return Err(TracerError::malformed(
                line, "sphere declared before any material"
            ));
        }

        self.spheres.push(Sphere {
            center: Point3::new(params[0], params[1], params[2]),
            radius: params[3],
            material: self.materials.len() - 1,
        });

        Ok(())
    }

    /// `light <kind> ...` where kind 0 is directional, 1 point, 2 spot,
    /// 3 attenuated point and 4 attenuated spot. Plain point and spot
    /// lights get the identity attenuation.
    fn light<'a>(&mut self, line: usize,
        tokens: &mut impl Iterator<Item = &'a str>) -> Result<()> {
        let kind = numbers::<1>(line, "light", tokens)?[0];

        let light = match kind as i64 {
            0 => {
                let p = numbers::<6>(line, "light", tokens)?;
                Light::Directional {
                    direction: Vector3::new(p[0], p[1], p[2]),
                    color: Color::rgb(p[3], p[4], p[5]),
                }
            },
            1 => {
                let p = numbers::<6>(line, "light", tokens)?;
                Light::Point {
                    position: Point3::new(p[0], p[1], p[2]),
                    color: Color::rgb(p[3], p[4], p[5]),
                    attenuation: Attenuation::none(),
                }
            },
            2 => {
                let p = numbers::<10>(line, "light", tokens)?;
                Light::Spot {
                    position: Point3::new(p[0], p[1], p[2]),
                    direction: Vector3::new(p[3], p[4], p[5]),
                    theta: p[6],
                    color: Color::rgb(p[7], p[8], p[9]),
                    attenuation: Attenuation::none(),
                }
            },
            3 => {
                let p = numbers::<9>(line, "light", tokens)?;
                Light::Point {
                    position: Point3::new(p[0], p[1], p[2]),
                    color: Color::rgb(p[3], p[4], p[5]),
                    attenuation: Attenuation::new(p[6], p[7], p[8]),
                }
            },
            4 => {
                let p = numbers::<13>(line, "light", tokens)?;
                Light::Spot {
                    position: Point3::new(p[0], p[1], p[2]),
                    direction: Vector3::new(p[3], p[4], p[5]),
                    theta: p[6],
                    color: Color::rgb(p[7], p[8], p[9]),
                    attenuation: Attenuation::new(p[10], p[11], p[12]),
                }
            },
            other => {
                return Err(TracerError::malformed(
                    line, format!("unknown light kind `{}`", other)
                ));
            },
        };

        self.lights.push(light);
        Ok(())
    }

    /// `f a b c` with each corner written as `v`, `v/vt`, `v//vn` or
    /// `v/vt/vn`.
    fn face<'a>(&mut self, line: usize,
        tokens: &mut impl Iterator<Item = &'a str>) -> Result<()> {
        if self.materials.is_empty() {
            return Err(TracerError::malformed(
                line, "face declared before any material"
            ));
        }

        let mut corners = [RawFaceVertex { vertex: 0, texcoord: None, normal: None }; 3];
        for corner in corners.iter_mut() {
            let token = tokens.next().ok_or_else(|| {
                TracerError::malformed(line, "keyword `f` requires 3 vertex references")
            })?;
            *corner = parse_face_vertex(line, token)?;
        }

        self.raw_faces.push((line, corners, self.materials.len() - 1));
        Ok(())
    }

    fn finish(self) -> Result<Scene> {
        let eye = self.eye.ok_or(TracerError::MissingSceneField("eye"))?;
        let view_dir = self.view_dir.ok_or(TracerError::MissingSceneField("viewdir"))?;
        let up_dir = self.up_dir.ok_or(TracerError::MissingSceneField("updir"))?;
        let vfov = self.vfov.ok_or(TracerError::MissingSceneField("vfov"))?;
        let (width, height) = self.image_size
            .ok_or(TracerError::MissingSceneField("imsize"))?;
        let background = self.background
            .ok_or(TracerError::MissingSceneField("bkgcolor"))?;

        let mut faces = Vec::with_capacity(self.raw_faces.len());
        for (line, corners, material) in self.raw_faces.iter() {
            let mut resolved = [FaceVertex {
                vertex: 0, texcoord: None, normal: None
            }; 3];

            for (slot, raw) in resolved.iter_mut().zip(corners.iter()) {
                slot.vertex = resolve_index(
                    *line, "vertex", raw.vertex, self.vertices.len()
                )?;
                slot.texcoord = match raw.texcoord {
                    Some(i) => Some(resolve_index(
                        *line, "texture coordinate", i, self.texcoords.len()
                    )?),
                    None => None,
                };
                slot.normal = match raw.normal {
                    Some(i) => Some(resolve_index(
                        *line, "vertex normal", i, self.normals.len()
                    )?),
                    None => None,
                };
            }

            faces.push(Face { vertices: resolved, material: *material });
        }

        Ok(Scene {
            eye,
            view_dir,
            up_dir,
            vfov,
            width,
            height,
            background,
            materials: self.materials,
            spheres: self.spheres,
            lights: self.lights,
            vertices: self.vertices,
            normals: self.normals,
            texcoords: self.texcoords,
            faces,
            texture_files: self.texture_files,
        })
    }
}

/// Reads exactly `N` numeric arguments for a keyword.
fn numbers<'a, const N: usize>(line: usize, keyword: &str,
    tokens: &mut impl Iterator<Item = &'a str>) -> Result<[f64; N]> {
    let mut out = [0.0; N];

    for slot in out.iter_mut() {
        let token = tokens.next().ok_or_else(|| {
            TracerError::malformed(
                line, format!("keyword `{}` requires {} numbers", keyword, N)
            )
        })?;

        *slot = token.parse().map_err(|_| {
            TracerError::malformed(
                line,
                format!("keyword `{}`: `{}` is not a number", keyword, token)
            )
        })?;
    }

    Ok(out)
}

/// Parses one `v[/vt[/vn]]` reference of a face line.
fn parse_face_vertex(line: usize, token: &str) -> Result<RawFaceVertex> {
    let mut parts = token.split('/');

    let index = |part: Option<&str>| -> Result<Option<i64>> {
        match part {
            None | Some("") => Ok(None),
            Some(text) => text.parse::<i64>().map(Some).map_err(|_| {
                TracerError::malformed(
                    line, format!("`{}` is not a face index", text)
                )
            }),
        }
    };

    let vertex = index(parts.next())?.ok_or_else(|| {
        TracerError::malformed(line, "face corner is missing its vertex index")
    })?;
    let texcoord = index(parts.next())?;
    let normal = index(parts.next())?;

    Ok(RawFaceVertex { vertex, texcoord, normal })
}

/// Converts a 1-based scene-file index to 0-based, range checked.
fn resolve_index(line: usize, what: &str, index: i64, len: usize) -> Result<usize> {
    if index < 1 || index as usize > len {
        return Err(TracerError::malformed(
            line,
            format!("{} index {} is out of range (1..={})", what, index, len)
        ));
    }

    Ok(index as usize - 1)
}

/* JSON scene description */

/// The serde form of a scene. Indices here are 0-based, unlike the text
/// format, and materials reference textures by filename; handles are
/// assigned during conversion.
#[derive(Serialize, Deserialize)]
pub struct SceneJson {
    eye: [f64; 3],
    viewdir: [f64; 3],
    updir: [f64; 3],
    vfov: f64,
    imsize: [usize; 2],
    bkgcolor: [f64; 3],

    #[serde(default)]
    materials: Vec<MaterialJson>,
    #[serde(default)]
    spheres: Vec<SphereJson>,
    #[serde(default)]
    lights: Vec<LightJson>,

    #[serde(default)]
    vertices: Vec<[f64; 3]>,
    #[serde(default)]
    normals: Vec<[f64; 3]>,
    #[serde(default)]
    texcoords: Vec<[f64; 2]>,
    #[serde(default)]
    faces: Vec<FaceJson>,
}

#[derive(Serialize, Deserialize)]
struct MaterialJson {
    diffuse: [f64; 3],
    specular: [f64; 3],
    ka: f64,
    kd: f64,
    ks: f64,
    falloff: f64,
    alpha: f64,
    eta: f64,
    #[serde(default)]
    texture: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct SphereJson {
    center: [f64; 3],
    radius: f64,
    material: usize,
}

#[derive(Serialize, Deserialize)]
struct LightJson {
    kind: String,
    #[serde(default)]
    position: Option<[f64; 3]>,
    #[serde(default)]
    direction: Option<[f64; 3]>,
    #[serde(default)]
    theta: Option<f64>,
    color: [f64; 3],
    #[serde(default)]
    attenuation: Option<[f64; 3]>,
}

#[derive(Serialize, Deserialize)]
struct FaceJson {
    vertices: [usize; 3],
    #[serde(default)]
    texcoords: Option<[usize; 3]>,
    #[serde(default)]
    normals: Option<[usize; 3]>,
    material: usize,
}

impl TryFrom<SceneJson> for Scene {
    type Error = TracerError;

    fn try_from(json: SceneJson) -> Result<Scene> {
        if json.imsize[0] == 0 || json.imsize[1] == 0 {
            return Err(TracerError::InvalidImageSize);
        }

        let mut texture_files: Vec<String> = Vec::new();
        let mut materials = Vec::with_capacity(json.materials.len());

        for m in json.materials.iter() {
            let texture = match &m.texture {
                Some(name) => {
                    let handle = match texture_files.iter().position(|f| f == name) {
                        Some(existing) => existing,
                        None => {
                            texture_files.push(name.clone());
                            texture_files.len() - 1
                        },
                    };
                    Some(handle)
                },
                None => None,
            };

            materials.push(Material {
                diffuse: Color::rgb(m.diffuse[0], m.diffuse[1], m.diffuse[2]),
                specular: Color::rgb(m.specular[0], m.specular[1], m.specular[2]),
                ka: m.ka,
                kd: m.kd,
                ks: m.ks,
                falloff: m.falloff,
                alpha: m.alpha,
                eta: m.eta,
                texture,
            });
        }

        let check = |what: &str, index: usize, len: usize| -> Result<usize> {
            if index >= len {
                return Err(TracerError::malformed(
                    0, format!("{} index {} is out of range (< {})", what, index, len)
                ));
            }
            Ok(index)
        };

        let mut spheres = Vec::with_capacity(json.spheres.len());
        for s in json.spheres.iter() {
            if s.radius <= 0.0 {
                return Err(TracerError::malformed(
                    0, "sphere radius must be positive"
                ));
            }

            spheres.push(Sphere {
                center: Point3::new(s.center[0], s.center[1], s.center[2]),
                radius: s.radius,
                material: check("material", s.material, materials.len())?,
            });
        }

        let mut lights = Vec::with_capacity(json.lights.len());
        for l in json.lights.iter() {
            lights.push(light_from_json(l)?);
        }

        let vertices: Vec<Point3> = json.vertices.iter()
            .map(|v| Point3::new(v[0], v[1], v[2]))
            .collect();
        let normals: Vec<Vector3> = json.normals.iter()
            .map(|v| Vector3::new(v[0], v[1], v[2]))
            .collect();
        let texcoords: Vec<(f64, f64)> = json.texcoords.iter()
            .map(|t| (t[0], t[1]))
            .collect();

        let mut faces = Vec::with_capacity(json.faces.len());
        for f in json.faces.iter() {
            let mut corners = [FaceVertex {
                vertex: 0, texcoord: None, normal: None
            }; 3];

            for (i, corner) in corners.iter_mut().enumerate() {
                corner.vertex = check("vertex", f.vertices[i], vertices.len())?;
                corner.texcoord = match f.texcoords {
                    Some(ts) => Some(check(
                        "texture coordinate", ts[i], texcoords.len()
                    )?),
                    None => None,
                };
                corner.normal = match f.normals {
                    Some(ns) => Some(check(
                        "vertex normal", ns[i], normals.len()
                    )?),
                    None => None,
                };
            }

            faces.push(Face {
                vertices: corners,
                material: check("material", f.material, materials.len())?,
            });
        }

        Ok(Scene {
            eye: Point3::new(json.eye[0], json.eye[1], json.eye[2]),
            view_dir: Vector3::new(json.viewdir[0], json.viewdir[1], json.viewdir[2]),
            up_dir: Vector3::new(json.updir[0], json.updir[1], json.updir[2]),
            vfov: json.vfov,
            width: json.imsize[0],
            height: json.imsize[1],
            background: Color::rgb(json.bkgcolor[0], json.bkgcolor[1], json.bkgcolor[2]),
            materials,
            spheres,
            lights,
            vertices,
            normals,
            texcoords,
            faces,
            texture_files,
        })
    }
}

fn light_from_json(json: &LightJson) -> Result<Light> {
    let color = Color::rgb(json.color[0], json.color[1], json.color[2]);
    let attenuation = match json.attenuation {
        Some(a) => Attenuation::new(a[0], a[1], a[2]),
        None => Attenuation::none(),
    };

    let point3 = |v: [f64; 3]| Point3::new(v[0], v[1], v[2]);
    let vector3 = |v: [f64; 3]| Vector3::new(v[0], v[1], v[2]);
    let require = |field: &str, value: Option<[f64; 3]>| -> Result<[f64; 3]> {
        value.ok_or_else(|| TracerError::malformed(
            0, format!("{} light requires `{}`", json.kind, field)
        ))
    };

    match json.kind.as_str() {
        "directional" => Ok(Light::Directional {
            direction: vector3(require("direction", json.direction)?),
            color,
        }),
        "point" => Ok(Light::Point {
            position: point3(require("position", json.position)?),
            color,
            attenuation,
        }),
        "spot" => Ok(Light::Spot {
            position: point3(require("position", json.position)?),
            direction: vector3(require("direction", json.direction)?),
            theta: json.theta.ok_or_else(|| TracerError::malformed(
                0, "spot light requires `theta`"
            ))?,
            color,
            attenuation,
        }),
        other => Err(TracerError::malformed(
            0, format!("unknown light kind `{}`", other)
        )),
    }
}

/* Tests */

#[cfg(test)]
const MINIMAL_SCENE: &str = "\
eye 0 0 0
viewdir 0 0 -1
updir 0 1 0
vfov 90
imsize 100 100
bkgcolor 0 0 0
mtlcolor 1 1 1 1 1 1 0.2 0.8 0 10 1 1
sphere 0 0 -5 1
light 0 0 0 -1 1 1 1
";

#[test]
fn parse_minimal_scene() {
    let scene = Scene::parse(MINIMAL_SCENE).unwrap();

    assert_eq!(scene.eye, Point3::origin());
    assert_eq!(scene.view_dir, Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(scene.vfov, 90.0);
    assert_eq!((scene.width, scene.height), (100, 100));
    assert_eq!(scene.background, Color::black());
    assert_eq!(scene.materials.len(), 1);
    assert_eq!(scene.spheres.len(), 1);
    assert_eq!(scene.spheres[0].material, 0);
    assert_eq!(scene.lights.len(), 1);
}

#[test]
fn parse_missing_required_field() {
    let text = MINIMAL_SCENE.replace("updir 0 1 0\n", "");

    match Scene::parse(&text) {
        Err(TracerError::MissingSceneField("updir")) => {},
        other => panic!("expected missing updir, got {:?}", other.err()),
    }
}

#[test]
fn parse_short_keyword_arguments() {
    let text = MINIMAL_SCENE.replace("eye 0 0 0", "eye 0 0");

    match Scene::parse(&text) {
        Err(TracerError::MalformedScene { line: 1, .. }) => {},
        other => panic!("expected malformed line 1, got {:?}", other.err()),
    }
}

#[test]
fn parse_non_numeric_argument() {
    let text = MINIMAL_SCENE.replace("vfov 90", "vfov wide");

    assert!(matches!(
        Scene::parse(&text),
        Err(TracerError::MalformedScene { line: 4, .. })
    ));
}

#[test]
fn parse_rejects_zero_radius() {
    let text = MINIMAL_SCENE.replace("sphere 0 0 -5 1", "sphere 0 0 -5 0");

    assert!(matches!(
        Scene::parse(&text),
        Err(TracerError::MalformedScene { .. })
    ));
}

#[test]
fn parse_face_reference_variants() {
    let text = format!("{}{}", MINIMAL_SCENE, "\
v 0 0 -4
v 1 0 -4
v 0 1 -4
vn 0 0 1
vt 0 0
f 1 2 3
f 1/1/1 2/1/1 3/1/1
f 1//1 2//1 3//1
");
    let scene = Scene::parse(&text).unwrap();

    assert_eq!(scene.faces.len(), 3);

    let flat = &scene.faces[0];
    assert_eq!(flat.vertices[0].vertex, 0);
    assert!(flat.vertices[0].texcoord.is_none());
    assert!(flat.vertices[0].normal.is_none());

    let full = &scene.faces[1];
    assert_eq!(full.vertices[2].vertex, 2);
    assert_eq!(full.vertices[2].texcoord, Some(0));
    assert_eq!(full.vertices[2].normal, Some(0));

    let smooth = &scene.faces[2];
    assert!(smooth.vertices[1].texcoord.is_none());
    assert_eq!(smooth.vertices[1].normal, Some(0));
}

#[test]
fn parse_rejects_out_of_range_face_index() {
    let text = format!("{}{}", MINIMAL_SCENE, "\
v 0 0 -4
v 1 0 -4
f 1 2 3
");

    assert!(matches!(
        Scene::parse(&text),
        Err(TracerError::MalformedScene { .. })
    ));
}

#[test]
fn parse_texture_material_inherits_coefficients() {
    let text = format!(
        "{}texture checker.ppm\nsphere 0 0 -8 1\n", MINIMAL_SCENE
    );
    let scene = Scene::parse(&text).unwrap();

    assert_eq!(scene.materials.len(), 2);
    assert_eq!(scene.texture_files, vec!["checker.ppm".to_string()]);

    let textured = &scene.materials[1];
    assert_eq!(textured.texture, Some(0));
    assert_eq!(textured.ka, scene.materials[0].ka);
    assert_eq!(textured.kd, scene.materials[0].kd);
    assert_eq!(textured.diffuse, Color::black());

    // The later sphere binds to the textured material.
    assert_eq!(scene.spheres[1].material, 1);
}

#[test]
fn parse_attenuated_spotlight() {
    let text = MINIMAL_SCENE.replace(
        "light 0 0 0 -1 1 1 1",
        "light 4 0 5 0 0 -1 0 20 1 1 1 1 0.1 0.01"
    );
    let scene = Scene::parse(&text).unwrap();

    match scene.lights[0] {
        Light::Spot { theta, attenuation, .. } => {
            assert_eq!(theta, 20.0);
            assert_eq!(attenuation, Attenuation::new(1.0, 0.1, 0.01));
        },
        ref other => panic!("expected spot light, got {:?}", other),
    }
}

#[test]
fn json_scene_round_trip() {
    let text = r#"{
        "eye": [0.0, 0.0, 0.0],
        "viewdir": [0.0, 0.0, -1.0],
        "updir": [0.0, 1.0, 0.0],
        "vfov": 60.0,
        "imsize": [64, 48],
        "bkgcolor": [0.1, 0.1, 0.1],
        "materials": [{
            "diffuse": [1.0, 0.0, 0.0],
            "specular": [1.0, 1.0, 1.0],
            "ka": 0.2, "kd": 0.8, "ks": 0.1, "falloff": 10.0,
            "alpha": 1.0, "eta": 1.0
        }],
        "spheres": [{ "center": [0.0, 0.0, -5.0], "radius": 1.5, "material": 0 }],
        "lights": [{ "kind": "point", "position": [0.0, 5.0, 0.0], "color": [1.0, 1.0, 1.0] }]
    }"#;

    let json: SceneJson = serde_json::from_str(text).unwrap();
    let scene = Scene::try_from(json).unwrap();

    assert_eq!((scene.width, scene.height), (64, 48));
    assert_eq!(scene.spheres[0].radius, 1.5);
    assert!(matches!(scene.lights[0], Light::Point { .. }));
}

#[test]
fn json_scene_rejects_bad_material_index() {
    let text = r#"{
        "eye": [0.0, 0.0, 0.0],
        "viewdir": [0.0, 0.0, -1.0],
        "updir": [0.0, 1.0, 0.0],
        "vfov": 60.0,
        "imsize": [64, 48],
        "bkgcolor": [0.0, 0.0, 0.0],
        "spheres": [{ "center": [0.0, 0.0, -5.0], "radius": 1.0, "material": 3 }]
    }"#;

    let json: SceneJson = serde_json::from_str(text).unwrap();
    assert!(Scene::try_from(json).is_err());
}
