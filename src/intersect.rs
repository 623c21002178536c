use crate::consts::EPSILON;
use crate::ray::Ray;
use crate::scene::{ Face, Scene, Sphere };
use crate::vector::{ Point3, Vector3 };

/// A reference to one primitive in the scene, by kind and index.
///
/// Used to exclude the primitive being shaded from its own shadow test
/// and to recognize a ray exiting the sphere it previously entered.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PrimitiveRef {
    Sphere(usize),
    Triangle(usize),
}

/// The closest intersection found along a ray.
#[derive(Copy, Clone, Debug)]
pub struct Hit {
    pub primitive: PrimitiveRef,

    /// Parametric distance along the (normalized) ray.
    pub t: f64,

    pub point: Point3,

    /// The shading normal, flipped to face the incoming ray.
    pub normal: Vector3,

    /// Barycentric weights for triangle hits, in vertex order.
    pub barycentric: Option<(f64, f64, f64)>,
}

/// Quadratic sphere intersection roots.
///
/// With a unit ray direction the quadratic coefficient is 1, leaving
/// `t^2 + Bt + C = 0`. A discriminant within epsilon of zero is a
/// tangent graze with a single root; below that, a miss.
pub(crate) fn sphere_roots(sphere: &Sphere, ray: &Ray) -> Option<(f64, Option<f64>)> {
    let to_center = ray.origin - sphere.center;

    let b = 2.0 * ray.direction.dot(&to_center);
    let c = to_center.dot(&to_center) - sphere.radius * sphere.radius;
    let delta = b * b - 4.0 * c;

    if delta < -EPSILON {
        None
    } else if delta <= EPSILON {
        Some((-b / 2.0, None))
    } else {
        let sqrt_delta = delta.sqrt();
        Some(((-b - sqrt_delta) / 2.0, Some((-b + sqrt_delta) / 2.0)))
    }
}

/// A ray/triangle-plane intersection that landed inside the triangle.
#[derive(Copy, Clone, Debug)]
pub(crate) struct TriangleHit {
    pub t: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub geometric_normal: Vector3,
}

/// Intersects a ray with one triangle face.
///
/// The ray is tested against the triangle's plane first; a direction
/// within epsilon of parallel is a miss, as is a plane hit at negative
/// t or at/beyond `max_t`. The plane hit is then accepted only if all
/// three barycentric weights are strictly inside (0, 1) and sum to 1
/// within epsilon. Edge and vertex grazes are rejected by the strict
/// bounds; this is a documented limitation of the signed-area test, not
/// something to paper over.
pub(crate) fn triangle_hit(scene: &Scene, face: &Face, ray: &Ray, max_t: f64)
    -> Option<TriangleHit> {
    let (p0, p1, p2) = scene.triangle(face);

    let e1 = p1 - p0;
    let e2 = p2 - p0;
    let normal = e1.cross(&e2);

    let denominator = normal.dot(&ray.direction);
    if denominator.abs() <= EPSILON {
        return None;
    }

    let t = normal.dot(&(p0 - ray.origin)) / denominator;
    if t < 0.0 || t >= max_t {
        return None;
    }

    let point = ray.position(t);
    let e3 = point - p1;
    let e4 = point - p2;

    let total_area = e1.area(&e2);
    let alpha = e3.area(&e4) / total_area;
    let beta = e4.area(&e2) / total_area;
    let gamma = e1.area(&e3) / total_area;

    let inside = alpha > 0.0 && alpha < 1.0
        && beta > 0.0 && beta < 1.0
        && gamma > 0.0 && gamma < 1.0
        && (alpha + beta + gamma - 1.0).abs() < EPSILON;

    if !inside {
        return None;
    }

    Some(TriangleHit { t, alpha, beta, gamma, geometric_normal: normal })
}

/// Finds the closest positive-t hit along a ray.
///
/// Brute-force scan: spheres in list order, then triangles in list
/// order, keeping the strictly smallest t. The ray direction is
/// normalized here; callers may pass unnormalized secondary rays.
pub fn closest_hit(scene: &Scene, ray: &Ray) -> Option<Hit> {
    let ray = ray.normalized();

    let mut best_t = f64::INFINITY;
    let mut best_sphere: Option<usize> = None;
    let mut best_triangle: Option<(usize, TriangleHit)> = None;

    for (index, sphere) in scene.spheres.iter().enumerate() {
        let (near, far) = match sphere_roots(sphere, &ray) {
            Some(roots) => roots,
            None => continue,
        };

        for t in Some(near).iter().chain(far.iter()) {
            if *t > EPSILON && *t < best_t {
                best_t = *t;
                best_sphere = Some(index);
            }
        }
    }

    for (index, face) in scene.faces.iter().enumerate() {
        if let Some(hit) = triangle_hit(scene, face, &ray, best_t) {
            best_t = hit.t;
            best_sphere = None;
            best_triangle = Some((index, hit));
        }
    }

    let point = ray.position(best_t);

    let (primitive, normal, barycentric) = if let Some((index, tri)) = best_triangle {
        let face = &scene.faces[index];
        let normal = shading_normal(scene, face, &tri);
        (
            PrimitiveRef::Triangle(index),
            normal,
            Some((tri.alpha, tri.beta, tri.gamma)),
        )
    } else if let Some(index) = best_sphere {
        let normal = (point - scene.spheres[index].center).normalize();
        (PrimitiveRef::Sphere(index), normal, None)
    } else {
        return None;
    };

    // Turn the normal toward the incoming ray before shading.
    let toward_origin = -ray.direction;
    let normal = if toward_origin.dot(&normal) < 0.0 {
        -normal
    } else {
        normal
    };

    Some(Hit { primitive, t: best_t, point, normal, barycentric })
}

/// The triangle's shading normal: Phong-interpolated from the vertex
/// normals when the face carries normal indices, the geometric plane
/// normal otherwise.
fn shading_normal(scene: &Scene, face: &Face, tri: &TriangleHit) -> Vector3 {
    let indices = (
        face.vertices[0].normal,
        face.vertices[1].normal,
        face.vertices[2].normal,
    );

    match indices {
        (Some(n0), Some(n1), Some(n2)) => {
            (scene.normals[n0] * tri.alpha
                + scene.normals[n1] * tri.beta
                + scene.normals[n2] * tri.gamma)
                .normalize()
        },
        _ => tri.geometric_normal.normalize(),
    }
}

/* Tests */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feq;
    use crate::material::Material;
    use crate::scene::FaceVertex;

    fn scene_with_sphere(center: Point3, radius: f64) -> Scene {
        let mut scene = Scene::default();
        scene.materials.push(Material::default());
        scene.spheres.push(Sphere { center, radius, material: 0 });
        scene
    }

    fn scene_with_triangle(p0: Point3, p1: Point3, p2: Point3) -> Scene {
        let mut scene = Scene::default();
        scene.materials.push(Material::default());
        scene.vertices.extend([p0, p1, p2].iter().copied());
        scene.faces.push(Face {
            vertices: [
                FaceVertex { vertex: 0, texcoord: None, normal: None },
                FaceVertex { vertex: 1, texcoord: None, normal: None },
                FaceVertex { vertex: 2, texcoord: None, normal: None },
            ],
            material: 0,
        });
        scene
    }

    #[test]
    fn ray_pointing_away_misses_sphere() {
        let scene = scene_with_sphere(Point3::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0));

        assert!(closest_hit(&scene, &ray).is_none());
    }

    #[test]
    fn ray_through_center_returns_near_root() {
        let scene = scene_with_sphere(Point3::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

        let hit = closest_hit(&scene, &ray).unwrap();
        assert!(feq(hit.t, 4.0));
        assert_eq!(hit.primitive, PrimitiveRef::Sphere(0));
        assert_eq!(hit.normal, Vector3::new(0.0, 0.0, 1.0));

        // Roots are symmetric around the center distance.
        let (near, far) = sphere_roots(&scene.spheres[0], &ray).unwrap();
        assert!(feq(near, 4.0));
        assert!(feq(far.unwrap(), 6.0));
    }

    #[test]
    fn offset_ray_grazes_tangent() {
        let scene = scene_with_sphere(Point3::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(
            Point3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0)
        );

        let (t, far) = sphere_roots(&scene.spheres[0], &ray).unwrap();
        assert!(far.is_none());
        assert!(feq(t, 5.0));
    }

    #[test]
    fn sphere_behind_origin_is_rejected() {
        let scene = scene_with_sphere(Point3::new(0.0, 0.0, 5.0), 1.0);
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

        assert!(closest_hit(&scene, &ray).is_none());
    }

    #[test]
    fn unnormalized_direction_is_normalized_first() {
        let scene = scene_with_sphere(Point3::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -10.0));

        let hit = closest_hit(&scene, &ray).unwrap();
        assert!(feq(hit.t, 4.0));
    }

    #[test]
    fn interior_triangle_hit_has_unit_barycentric_sum() {
        let scene = scene_with_triangle(
            Point3::new(-1.0, -1.0, -4.0),
            Point3::new(1.0, -1.0, -4.0),
            Point3::new(0.0, 1.0, -4.0),
        );
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

        let hit = closest_hit(&scene, &ray).unwrap();
        assert_eq!(hit.primitive, PrimitiveRef::Triangle(0));
        assert!(feq(hit.t, 4.0));

        let (alpha, beta, gamma) = hit.barycentric.unwrap();
        assert!(alpha > 0.0 && alpha < 1.0);
        assert!(beta > 0.0 && beta < 1.0);
        assert!(gamma > 0.0 && gamma < 1.0);
        assert!(feq(alpha + beta + gamma, 1.0));
    }

    #[test]
    fn ray_outside_triangle_misses() {
        let scene = scene_with_triangle(
            Point3::new(-1.0, -1.0, -4.0),
            Point3::new(1.0, -1.0, -4.0),
            Point3::new(0.0, 1.0, -4.0),
        );
        let ray = Ray::new(
            Point3::new(5.0, 5.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0)
        );

        assert!(closest_hit(&scene, &ray).is_none());
    }

    #[test]
    fn ray_parallel_to_triangle_plane_misses() {
        let scene = scene_with_triangle(
            Point3::new(-1.0, -1.0, -4.0),
            Point3::new(1.0, -1.0, -4.0),
            Point3::new(0.0, 1.0, -4.0),
        );
        let ray = Ray::new(Point3::origin(), Vector3::new(1.0, 0.0, 0.0));

        assert!(closest_hit(&scene, &ray).is_none());
    }

    #[test]
    fn triangle_normal_faces_the_ray() {
        let scene = scene_with_triangle(
            Point3::new(-1.0, -1.0, -4.0),
            Point3::new(1.0, -1.0, -4.0),
            Point3::new(0.0, 1.0, -4.0),
        );
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

        let hit = closest_hit(&scene, &ray).unwrap();
        assert!((-ray.direction).dot(&hit.normal) > 0.0);
    }

    #[test]
    fn smooth_shading_interpolates_vertex_normals() {
        let mut scene = scene_with_triangle(
            Point3::new(-1.0, -1.0, -4.0),
            Point3::new(1.0, -1.0, -4.0),
            Point3::new(0.0, 1.0, -4.0),
        );

        // Identical vertex normals tilted off the geometric one.
        let tilted = Vector3::new(0.0, 1.0, 1.0).normalize();
        scene.normals = vec![tilted, tilted, tilted];
        for corner in scene.faces[0].vertices.iter_mut() {
            corner.normal = Some(0);
        }

        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
        let hit = closest_hit(&scene, &ray).unwrap();

        assert_eq!(hit.normal, tilted);
    }

    #[test]
    fn nearest_of_two_spheres_wins() {
        let mut scene = scene_with_sphere(Point3::new(0.0, 0.0, -10.0), 1.0);
        scene.spheres.push(Sphere {
            center: Point3::new(0.0, 0.0, -5.0),
            radius: 1.0,
            material: 0,
        });

        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
        let hit = closest_hit(&scene, &ray).unwrap();

        assert_eq!(hit.primitive, PrimitiveRef::Sphere(1));
        assert!(feq(hit.t, 4.0));
    }

    #[test]
    fn closer_triangle_beats_sphere() {
        let mut scene = scene_with_sphere(Point3::new(0.0, 0.0, -10.0), 1.0);
        scene.vertices.extend([
            Point3::new(-1.0, -1.0, -4.0),
            Point3::new(1.0, -1.0, -4.0),
            Point3::new(0.0, 1.0, -4.0),
        ].iter().copied());
        scene.faces.push(Face {
            vertices: [
                FaceVertex { vertex: 0, texcoord: None, normal: None },
                FaceVertex { vertex: 1, texcoord: None, normal: None },
                FaceVertex { vertex: 2, texcoord: None, normal: None },
            ],
            material: 0,
        });

        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
        let hit = closest_hit(&scene, &ray).unwrap();

        assert_eq!(hit.primitive, PrimitiveRef::Triangle(0));
    }
}
