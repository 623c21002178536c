use std::f64::consts::PI;

use crate::color::Color;
use crate::consts::{ EPSILON, MAX_RECURSIVE_DEPTH };
use crate::intersect::{ closest_hit, Hit, PrimitiveRef };
use crate::material::Material;
use crate::ray::Ray;
use crate::scene::{ Face, Scene, Sphere };
use crate::shade::blinn_phong;
use crate::texture::TextureSet;
use crate::vector::Vector3;

/// Per-call state of the recursive trace.
///
/// `eta` is the refractive index of the medium the ray is currently
/// traveling through. `prev_hit` and `prev_eta` remember the primitive
/// the ray last interacted with and the medium it came from, so a ray
/// striking the same sphere again from the inside is recognized as
/// exiting and restored to the outer medium instead of re-entering the
/// sphere's own.
#[derive(Copy, Clone, Debug)]
pub struct TraceContext {
    pub depth: usize,
    pub eta: f64,
    pub prev_hit: Option<PrimitiveRef>,
    pub prev_eta: f64,
}

impl TraceContext {
    /// The context of a primary ray: depth zero, starting in air.
    pub fn primary() -> TraceContext {
        TraceContext { depth: 0, eta: 1.0, prev_hit: None, prev_eta: 1.0 }
    }
}

/// A ray tracer over one scene and its loaded textures.
pub struct Tracer<'a> {
    scene: &'a Scene,
    textures: &'a TextureSet,
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, textures: &'a TextureSet) -> Tracer<'a> {
        Tracer { scene, textures }
    }

    /// Traces one ray to its color.
    ///
    /// A miss returns the scene background. A hit is shaded locally
    /// with Blinn-Phong, then reflection and transmission rays recurse
    /// with Schlick's Fresnel approximation splitting energy between
    /// them:
    ///
    /// `total = local + F * reflected + (1 - F) * (1 - alpha) * transmitted`
    ///
    /// At the depth limit the hit contributes its raw diffuse color and
    /// recursion stops. Spheres bend transmitted rays by Snell's law;
    /// triangles are thin surfaces and pass transmitted rays straight
    /// through. Past the critical angle no surface transmits and the
    /// reflection branch alone is recursed.
    pub fn trace(&self, ray: &Ray, ctx: TraceContext) -> Color {
        let ray = ray.normalized();

        let hit = match closest_hit(self.scene, &ray) {
            Some(hit) => hit,
            None => return self.scene.background,
        };

        let material = self.resolve_material(&hit);

        if ctx.depth >= MAX_RECURSIVE_DEPTH {
            return material.diffuse;
        }

        let local = blinn_phong(
            self.scene,
            &material,
            hit.point,
            hit.normal,
            ray.origin,
            hit.primitive,
        );

        let entering_sphere = matches!(hit.primitive, PrimitiveRef::Sphere(_));

        // A sphere struck twice in a row is being exited from inside;
        // the far medium is the one the ray originally came from.
        let surface_eta = if entering_sphere && ctx.prev_hit == Some(hit.primitive) {
            ctx.prev_eta
        } else {
            material.eta
        };

        let cos_i = (-ray.direction).dot(&hit.normal).min(1.0);
        let fresnel = schlick(ctx.eta, surface_eta, cos_i);

        let reflect_ray = Ray::new(
            ray.position(hit.t - EPSILON),
            ray.direction.reflect(&hit.normal),
        );
        let reflect_ctx = TraceContext {
            depth: ctx.depth + 1,
            eta: ctx.eta,
            prev_hit: Some(hit.primitive),
            prev_eta: ctx.eta,
        };
        let reflected = self.trace(&reflect_ray, reflect_ctx);

        let mut color = local + reflected * fresnel;

        if material.alpha < 1.0 {
            // The critical-angle test gates every surface; only the bent
            // direction is sphere-specific.
            let direction = match refract(&ray.direction, &hit.normal, ctx.eta, surface_eta) {
                Some(bent) if entering_sphere => bent,
                Some(_) => ray.direction,
                None => return color,
            };

            let transmit_ray = Ray::new(ray.position(hit.t + EPSILON), direction);
            let transmit_ctx = TraceContext {
                depth: ctx.depth + 1,
                eta: if entering_sphere { surface_eta } else { ctx.eta },
                prev_hit: Some(hit.primitive),
                prev_eta: ctx.eta,
            };

            let transmitted = self.trace(&transmit_ray, transmit_ctx);
            color = color
                + transmitted * ((1.0 - fresnel) * (1.0 - material.alpha));
        }

        color
    }

    /// The hit primitive's material, with its diffuse color replaced by
    /// the sampled texel when the material is textured. A triangle whose
    /// corners lack texture coordinates falls back to the flat diffuse
    /// color.
    fn resolve_material(&self, hit: &Hit) -> Material {
        match hit.primitive {
            PrimitiveRef::Sphere(index) => {
                let sphere = &self.scene.spheres[index];
                let material = self.scene.materials[sphere.material];

                match material.texture {
                    Some(handle) => {
                        let (u, v) = sphere_uv(sphere, hit);
                        material.with_diffuse(self.textures.sample(handle, u, v))
                    },
                    None => material,
                }
            },

            PrimitiveRef::Triangle(index) => {
                let face = &self.scene.faces[index];
                let material = self.scene.materials[face.material];

                let uv = match (material.texture, hit.barycentric) {
                    (Some(_), Some(weights)) => {
                        triangle_uv(self.scene, face, weights)
                    },
                    _ => None,
                };

                match (material.texture, uv) {
                    (Some(handle), Some((u, v))) => {
                        material.with_diffuse(self.textures.sample(handle, u, v))
                    },
                    _ => material,
                }
            },
        }
    }
}

/// Schlick's approximation of the Fresnel reflectance at a boundary
/// between media of indices `eta_in` and `eta_out`.
fn schlick(eta_in: f64, eta_out: f64, cos_i: f64) -> f64 {
    let f0 = ((eta_out - eta_in) / (eta_out + eta_in)).powi(2);
    f0 + (1.0 - f0) * (1.0 - cos_i).powi(5)
}

/// Snell's law in vector form, bending `direction` across a boundary
/// whose unit `normal` opposes it. Returns `None` past the critical
/// angle, where transmission gives way to total internal reflection.
pub(crate) fn refract(
    direction: &Vector3,
    normal: &Vector3,
    eta_in: f64,
    eta_out: f64,
) -> Option<Vector3> {
    let cos_i = (-*direction).dot(normal).min(1.0);
    let sin_i = (1.0 - cos_i * cos_i).max(0.0).sqrt();

    if sin_i > eta_out / eta_in {
        return None;
    }

    let ratio = eta_in / eta_out;
    let cos_t = (1.0 - ratio * ratio * (1.0 - cos_i * cos_i)).sqrt();

    Some((*direction * ratio + *normal * (ratio * cos_i - cos_t)).normalize())
}

/// Spherical texture coordinates at a sphere hit: latitude from the
/// polar angle, longitude from the azimuth around the z axis.
fn sphere_uv(sphere: &Sphere, hit: &Hit) -> (f64, f64) {
    let offset = hit.point - sphere.center;

    let phi = (offset.z / sphere.radius).min(1.0).max(-1.0).acos();
    let zeta = offset.y.atan2(offset.x);

    ((zeta + PI) / (2.0 * PI), phi / PI)
}

/// Barycentric interpolation of a face's per-corner texture
/// coordinates. `None` when any corner lacks one.
fn triangle_uv(
    scene: &Scene,
    face: &Face,
    (alpha, beta, gamma): (f64, f64, f64),
) -> Option<(f64, f64)> {
    let t0 = scene.texcoords[face.vertices[0].texcoord?];
    let t1 = scene.texcoords[face.vertices[1].texcoord?];
    let t2 = scene.texcoords[face.vertices[2].texcoord?];

    Some((
        t0.0 * alpha + t1.0 * beta + t2.0 * gamma,
        t0.1 * alpha + t1.1 * beta + t2.1 * gamma,
    ))
}

/* Tests */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feq;
    use crate::vector::Point3;

    fn ambient_material(diffuse: Color, ka: f64, alpha: f64, eta: f64) -> Material {
        Material {
            diffuse,
            specular: Color::white(),
            ka,
            kd: 0.0,
            ks: 0.0,
            falloff: 10.0,
            alpha,
            eta,
            texture: None,
        }
    }

    fn scene_with_sphere(material: Material) -> Scene {
        let mut scene = Scene::default();
        scene.eye = Point3::origin();
        scene.materials.push(material);
        scene.spheres.push(Sphere {
            center: Point3::new(0.0, 0.0, -5.0),
            radius: 1.0,
            material: 0,
        });
        scene
    }

    fn push_triangle(scene: &mut Scene, z: f64, material: usize) {
        use crate::scene::FaceVertex;

        let base = scene.vertices.len();
        scene.vertices.extend([
            Point3::new(-20.0, -20.0, z),
            Point3::new(30.0, -20.0, z),
            Point3::new(4.0, 30.0, z),
        ].iter().copied());
        scene.faces.push(Face {
            vertices: [
                FaceVertex { vertex: base, texcoord: None, normal: None },
                FaceVertex { vertex: base + 1, texcoord: None, normal: None },
                FaceVertex { vertex: base + 2, texcoord: None, normal: None },
            ],
            material,
        });
    }

    /// A clear pane at z = -4 in front of a glowing blue wall at z = -6.
    /// Whatever transmits through the pane sees the wall; reflections
    /// off the pane see only the black background.
    fn pane_and_wall_scene(pane_eta: f64) -> Scene {
        let mut scene = Scene::default();
        scene.eye = Point3::origin();
        scene.background = Color::black();

        scene.materials.push(ambient_material(Color::black(), 0.0, 0.0, pane_eta));
        scene.materials.push(ambient_material(Color::rgb(0.0, 0.0, 1.0), 1.0, 1.0, 1.0));

        push_triangle(&mut scene, -4.0, 0);
        push_triangle(&mut scene, -6.0, 1);

        scene
    }

    #[test]
    fn miss_returns_background() {
        let mut scene = Scene::default();
        scene.background = Color::rgb(0.1, 0.2, 0.3);

        let textures = TextureSet::empty();
        let tracer = Tracer::new(&scene, &textures);
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

        assert_eq!(
            tracer.trace(&ray, TraceContext::primary()),
            Color::rgb(0.1, 0.2, 0.3)
        );
    }

    #[test]
    fn unlit_opaque_sphere_shades_ambient_only() {
        let material = ambient_material(Color::rgb(1.0, 0.0, 0.0), 0.2, 1.0, 1.0);
        let scene = scene_with_sphere(material);

        let textures = TextureSet::empty();
        let tracer = Tracer::new(&scene, &textures);
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

        // Head on, matched indices: the Fresnel weight is zero, so the
        // reflection ray contributes nothing even against a non-black
        // background.
        assert_eq!(
            tracer.trace(&ray, TraceContext::primary()),
            Color::rgb(0.2, 0.0, 0.0)
        );
    }

    #[test]
    fn depth_limit_returns_raw_diffuse() {
        let material = ambient_material(Color::rgb(0.3, 0.6, 0.9), 0.2, 1.0, 1.0);
        let scene = scene_with_sphere(material);

        let textures = TextureSet::empty();
        let tracer = Tracer::new(&scene, &textures);
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

        let ctx = TraceContext {
            depth: MAX_RECURSIVE_DEPTH,
            ..TraceContext::primary()
        };

        assert_eq!(tracer.trace(&ray, ctx), Color::rgb(0.3, 0.6, 0.9));
    }

    #[test]
    fn clear_sphere_passes_background_through() {
        let material = ambient_material(Color::black(), 0.0, 0.0, 1.0);
        let mut scene = scene_with_sphere(material);
        scene.background = Color::rgb(0.0, 0.0, 1.0);

        let textures = TextureSet::empty();
        let tracer = Tracer::new(&scene, &textures);
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

        // Fully transparent, index matched: the ray enters, exits and
        // sees the background undimmed.
        assert_eq!(
            tracer.trace(&ray, TraceContext::primary()),
            Color::rgb(0.0, 0.0, 1.0)
        );
    }

    #[test]
    fn facing_reflective_spheres_terminate() {
        let mut material = ambient_material(Color::rgb(0.1, 0.1, 0.1), 0.1, 1.0, 2.0);
        material.ks = 0.5;

        let mut scene = scene_with_sphere(material);
        scene.spheres.push(Sphere {
            center: Point3::new(0.0, 0.0, 5.0),
            radius: 1.0,
            material: 0,
        });

        let textures = TextureSet::empty();
        let tracer = Tracer::new(&scene, &textures);
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

        // Rays bounce between the spheres until the depth limit; the
        // result just has to be a finite color.
        let color = tracer.trace(&ray, TraceContext::primary());
        assert!(color.r.is_finite() && color.g.is_finite() && color.b.is_finite());
    }

    #[test]
    fn steep_hit_on_low_index_pane_reflects_totally() {
        let scene = pane_and_wall_scene(0.5);
        let textures = TextureSet::empty();
        let tracer = Tracer::new(&scene, &textures);

        // 45 degrees onto an index-0.5 boundary is past the critical
        // angle (30 degrees); the wall behind the pane must not show.
        let ray = Ray::new(Point3::origin(), Vector3::new(1.0, 0.0, -1.0));
        let color = tracer.trace(&ray, TraceContext::primary());

        assert!(color.b < 0.01);
    }

    #[test]
    fn shallow_hit_on_pane_passes_straight_through() {
        let scene = pane_and_wall_scene(2.0);
        let textures = TextureSet::empty();
        let tracer = Tracer::new(&scene, &textures);

        let ray = Ray::new(Point3::origin(), Vector3::new(1.0, 0.0, -1.0));
        let color = tracer.trace(&ray, TraceContext::primary());

        // Short of the critical angle the pane transmits undeviated and
        // the wall shows through, dimmed only by the Fresnel split.
        assert!(color.b > 0.8);
    }

    #[test]
    fn steep_exit_from_glass_sphere_stays_inside() {
        let material = ambient_material(Color::black(), 0.0, 0.0, 1.5);
        let mut scene = scene_with_sphere(material);
        scene.spheres[0].center = Point3::origin();
        scene.background = Color::rgb(0.0, 0.0, 1.0);

        let textures = TextureSet::empty();
        let tracer = Tracer::new(&scene, &textures);

        // A ray already inside the sphere, about to meet the boundary
        // at sin(theta) = 0.9, past the glass-to-air critical angle.
        let ray = Ray::new(
            Point3::new(0.9, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0)
        );
        let ctx = TraceContext {
            depth: 0,
            eta: 1.5,
            prev_hit: Some(PrimitiveRef::Sphere(0)),
            prev_eta: 1.0,
        };

        // The exit boundary uses the medium the ray entered from. Were
        // the sphere's own index used on the way out the boundary would
        // vanish and the background would pour through; with it restored
        // only faint Fresnel-weighted paths escape.
        let color = tracer.trace(&ray, ctx);
        assert!(color.b < 0.3);
    }

    #[test]
    fn shallow_exit_from_glass_sphere_escapes() {
        let material = ambient_material(Color::black(), 0.0, 0.0, 1.5);
        let mut scene = scene_with_sphere(material);
        scene.spheres[0].center = Point3::origin();
        scene.background = Color::rgb(0.0, 0.0, 1.0);

        let textures = TextureSet::empty();
        let tracer = Tracer::new(&scene, &textures);

        // sin(theta) = 0.3, well inside the critical angle: the ray
        // refracts out into air and sees the background.
        let ray = Ray::new(
            Point3::new(0.3, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0)
        );
        let ctx = TraceContext {
            depth: 0,
            eta: 1.5,
            prev_hit: Some(PrimitiveRef::Sphere(0)),
            prev_eta: 1.0,
        };

        let color = tracer.trace(&ray, ctx);
        assert!(color.b > 0.9);
    }

    #[test]
    fn straight_on_refraction_keeps_direction() {
        let direction = Vector3::new(0.0, 0.0, -1.0);
        let normal = Vector3::new(0.0, 0.0, 1.0);

        let bent = refract(&direction, &normal, 1.0, 1.5).unwrap();
        assert_eq!(bent, direction);
    }

    #[test]
    fn refraction_bends_toward_the_normal_entering_glass() {
        // 45 degrees in air onto glass.
        let direction = Vector3::new(1.0, 0.0, -1.0).normalize();
        let normal = Vector3::new(0.0, 0.0, 1.0);

        let bent = refract(&direction, &normal, 1.0, 1.5).unwrap();

        // sin(theta_t) = sin(45) / 1.5
        let sin_t = (0.5f64.sqrt()) / 1.5;
        assert!(feq(bent.x, sin_t));
        assert!(bent.z < 0.0);
        assert!(feq(bent.magnitude(), 1.0));
    }

    #[test]
    fn steep_exit_from_glass_reflects_totally() {
        // 45 degrees inside glass exceeds the critical angle (~41.8).
        let direction = Vector3::new(1.0, 0.0, -1.0).normalize();
        let normal = Vector3::new(0.0, 0.0, 1.0);

        assert!(refract(&direction, &normal, 1.5, 1.0).is_none());
    }

    #[test]
    fn textured_sphere_samples_by_latitude_and_longitude() {
        let texture = crate::texture::Texture::parse(
            "P3\n2 2\n255\n255 0 0  0 255 0  0 0 255  255 255 255\n"
        ).unwrap();
        let textures = TextureSet::with_textures(vec![texture]);

        let mut material = ambient_material(Color::black(), 1.0, 1.0, 1.0);
        material.texture = Some(0);
        let scene = scene_with_sphere(material);

        let tracer = Tracer::new(&scene, &textures);
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

        // The hit at (0, 0, -4) is the sphere's +z pole: v = 0, u = 0.5,
        // which rounds to the upper-right texel.
        assert_eq!(
            tracer.trace(&ray, TraceContext::primary()),
            Color::rgb(0.0, 1.0, 0.0)
        );
    }
}
