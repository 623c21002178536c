use crate::color::Color;
use crate::consts::EPSILON;
use crate::intersect::{ sphere_roots, triangle_hit, PrimitiveRef };
use crate::light::Incidence;
use crate::material::Material;
use crate::ray::Ray;
use crate::scene::Scene;
use crate::vector::{ Point3, Vector3 };

/// Local Blinn-Phong illumination at a surface point.
///
/// The ambient term `ka * od` is unconditional. Each light then
/// contributes
///
/// `IL * (kd * od * max(N.L, 0) + ks * os * max(N.H, 0)^n) * fatt * S`
///
/// where `H` is the half vector between the light and view directions,
/// `fatt` the light's distance attenuation and `S` the multiplicative
/// shadow mask below. A spotlight whose cone excludes the point is
/// skipped outright. No clamping happens here; channels accumulate
/// unbounded until the final per-pixel clamp.
pub fn blinn_phong(
    scene: &Scene,
    material: &Material,
    point: Point3,
    normal: Vector3,
    eye: Point3,
    shaded: PrimitiveRef,
) -> Color {
    let mut color = material.diffuse * material.ka;
    let view = (eye - point).normalize();

    for light in scene.lights.iter() {
        let incidence = match light.incidence_at(point) {
            Some(incidence) => incidence,
            None => continue,
        };

        let mask = shadow_mask(scene, point, &incidence, shaded);

        let toward_light = incidence.toward;
        let half = (toward_light + view).normalize();

        let lambert = normal.dot(&toward_light).max(0.0);
        let shine = normal.dot(&half).max(0.0).powf(material.falloff);

        let diffuse = material.diffuse * (material.kd * lambert);
        let specular = material.specular * (material.ks * shine);

        color = color
            + light.color() * (diffuse + specular) * (incidence.falloff * mask);
    }

    color
}

/// The shadow mask for one light at one point.
///
/// Casts a ray from the point toward the light and scans every other
/// primitive. Each occluder strictly between the point and the light
/// (the horizon is infinite for directional lights) scales the mask by
/// `1 - alpha` of its material, so opaque occluders black the light out
/// and translucent ones dim it. The primitive being shaded is excluded
/// from its own test.
fn shadow_mask(
    scene: &Scene,
    point: Point3,
    incidence: &Incidence,
    shaded: PrimitiveRef,
) -> f64 {
    let ray = Ray::new(point, incidence.toward);
    let blocking = |t: f64| t > EPSILON && t < incidence.distance;

    let mut mask = 1.0;

    for (index, sphere) in scene.spheres.iter().enumerate() {
        if shaded == PrimitiveRef::Sphere(index) {
            continue;
        }

        if let Some((near, far)) = sphere_roots(sphere, &ray) {
            if blocking(near) || far.map_or(false, blocking) {
                mask *= 1.0 - scene.materials[sphere.material].alpha;
            }
        }
    }

    for (index, face) in scene.faces.iter().enumerate() {
        if shaded == PrimitiveRef::Triangle(index) {
            continue;
        }

        if let Some(hit) = triangle_hit(scene, face, &ray, incidence.distance) {
            if hit.t > EPSILON {
                mask *= 1.0 - scene.materials[face.material].alpha;
            }
        }
    }

    mask
}

/* Tests */
