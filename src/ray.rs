use crate::vector::{ Point3, Vector3 };

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Ray {
    pub fn new(origin: Point3, direction: Vector3) -> Ray {
        Ray { origin, direction }
    }

    pub fn position(&self, t: f64) -> Point3 {
        self.origin + (self.direction * t)
    }

    /// The same ray with a unit-length direction.
    ///
    /// Secondary rays are handed over without renormalizing; intersection
    /// math assumes a unit direction, so it is re-established here.
    pub fn normalized(&self) -> Ray {
        Ray {
            origin: self.origin,
            direction: self.direction.normalize(),
        }
    }
}

/* Tests */

#[test]
fn ray_position() {
    let r = Ray::new(
        Point3::new(2.0, 3.0, 4.0),
        Vector3::new(1.0, 0.0, 0.0)
    );

    assert_eq!(r.position(0.0), Point3::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Point3::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Point3::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Point3::new(4.5, 3.0, 4.0));
}

#[test]
fn normalized_keeps_origin() {
    let r = Ray::new(
        Point3::new(1.0, 2.0, 3.0),
        Vector3::new(0.0, 0.0, 4.0)
    );
    let n = r.normalized();

    assert_eq!(n.origin, r.origin);
    assert_eq!(n.direction, Vector3::new(0.0, 0.0, 1.0));
}
