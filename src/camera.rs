use crate::consts::VIEW_PLANE_DISTANCE;
use crate::error::{ Result, TracerError };
use crate::ray::Ray;
use crate::scene::Scene;
use crate::vector::{ Point3, Vector3 };

/// The camera's image plane, pinned in world space.
///
/// Built once per render from the scene's eye position, view direction,
/// up direction and vertical field of view. Holds the four corners of
/// the virtual image plane plus the per-pixel steps across it, which is
/// everything ray generation needs.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    pub eye: Point3,

    pub upper_left: Point3,
    pub upper_right: Point3,
    pub lower_left: Point3,
    pub lower_right: Point3,

    /// Image width and height, in pixels.
    pub width: usize,
    pub height: usize,

    /// One-pixel steps along the horizontal and vertical plane edges.
    step_h: Vector3,
    step_v: Vector3,
}

impl Viewport {
    /// Derives the viewport from a scene's camera fields.
    ///
    /// Fails with `DegenerateBasis` when the view direction is parallel
    /// to the up direction, in which case the horizontal basis vector
    /// `u = viewdir x updir` degenerates to zero and no orientation can
    /// be established. Nothing is rendered in that case.
    pub fn new(scene: &Scene) -> Result<Viewport> {
        if scene.width == 0 || scene.height == 0 {
            return Err(TracerError::InvalidImageSize);
        }

        let u = scene.view_dir.cross(&scene.up_dir);
        if u.is_zero() {
            return Err(TracerError::DegenerateBasis);
        }

        let u = u.normalize();
        let v = u.cross(&scene.view_dir).normalize();

        let d = VIEW_PLANE_DISTANCE;
        let height = 2.0 * d * (scene.vfov.to_radians() / 2.0).tan();
        let width = height * scene.aspect_ratio();

        let center = scene.eye + scene.view_dir.normalize() * d;
        let half_w = u * (width / 2.0);
        let half_h = v * (height / 2.0);

        let upper_left = center + (-half_w) + half_h;
        let upper_right = center + half_w + half_h;
        let lower_left = center + (-half_w) + (-half_h);
        let lower_right = center + half_w + (-half_h);

        let step_h = (upper_right - upper_left) * (1.0 / scene.width as f64);
        let step_v = (lower_left - upper_left) * (1.0 / scene.height as f64);

        Ok(Viewport {
            eye: scene.eye,
            upper_left,
            upper_right,
            lower_left,
            lower_right,
            width: scene.width,
            height: scene.height,
            step_h,
            step_v,
        })
    }

    /// Maps pixel (i, j) to its world-space point on the image plane.
    ///
    /// Bilinear interpolation between the corners, offset by half a
    /// pixel on each axis so rays sample pixel centers.
    pub fn pixel_point(&self, i: usize, j: usize) -> Point3 {
        self.upper_left
            + self.step_h * (i as f64 + 0.5)
            + self.step_v * (j as f64 + 0.5)
    }

    /// The primary ray for pixel (i, j): origin at the eye, unit
    /// direction toward the pixel's image-plane point.
    pub fn ray_for_pixel(&self, i: usize, j: usize) -> Ray {
        let direction = (self.pixel_point(i, j) - self.eye).normalize();
        Ray::new(self.eye, direction)
    }
}

/* Tests */

#[cfg(test)]
fn test_scene(width: usize, height: usize) -> Scene {
    let mut scene = Scene::default();
    scene.eye = Point3::origin();
    scene.view_dir = Vector3::new(0.0, 0.0, -1.0);
    scene.up_dir = Vector3::new(0.0, 1.0, 0.0);
    scene.vfov = 90.0;
    scene.width = width;
    scene.height = height;
    scene
}

#[test]
fn parallel_view_and_up_fail() {
    let mut scene = test_scene(10, 10);
    scene.up_dir = Vector3::new(0.0, 0.0, -3.0);

    assert!(matches!(
        Viewport::new(&scene),
        Err(TracerError::DegenerateBasis)
    ));
}

#[test]
fn anti_parallel_view_and_up_fail() {
    let mut scene = test_scene(10, 10);
    scene.up_dir = Vector3::new(0.0, 0.0, 1.0);

    assert!(matches!(
        Viewport::new(&scene),
        Err(TracerError::DegenerateBasis)
    ));
}

#[test]
fn corners_span_the_square_plane() {
    // vfov 90 at distance 5 gives a plane of height 10; square image,
    // so width 10 as well.
    let viewport = Viewport::new(&test_scene(100, 100)).unwrap();

    assert_eq!(viewport.upper_left, Point3::new(-5.0, 5.0, -5.0));
    assert_eq!(viewport.upper_right, Point3::new(5.0, 5.0, -5.0));
    assert_eq!(viewport.lower_left, Point3::new(-5.0, -5.0, -5.0));
    assert_eq!(viewport.lower_right, Point3::new(5.0, -5.0, -5.0));
}

#[test]
fn wide_image_scales_horizontally() {
    let viewport = Viewport::new(&test_scene(200, 100)).unwrap();

    assert_eq!(viewport.upper_right, Point3::new(10.0, 5.0, -5.0));
    assert_eq!(viewport.lower_left, Point3::new(-10.0, -5.0, -5.0));
}

#[test]
fn center_pixel_ray_follows_view_direction() {
    let viewport = Viewport::new(&test_scene(101, 101)).unwrap();
    let ray = viewport.ray_for_pixel(50, 50);

    assert_eq!(ray.origin, Point3::origin());
    assert_eq!(ray.direction, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn pixel_centers_offset_by_half_a_step() {
    let viewport = Viewport::new(&test_scene(100, 100)).unwrap();

    // Pixel (0, 0) sits half a step in from the upper-left corner.
    assert_eq!(viewport.pixel_point(0, 0), Point3::new(-4.95, 4.95, -5.0));
}

