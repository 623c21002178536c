use crate::color::Color;
use crate::vector::{ Point3, Vector3 };

/// Attenuation coefficients for a positional light.
///
/// The falloff factor is `1 / (c1 + c2*d + c3*d^2)` for distance `d`.
/// Directional lights carry no falloff, and plain (unattenuated) point
/// and spot lights parse with coefficients 1, 0, 0 which yield the same.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Attenuation {
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
}

impl Attenuation {
    pub fn none() -> Attenuation {
        Attenuation { c1: 1.0, c2: 0.0, c3: 0.0 }
    }

    pub fn new(c1: f64, c2: f64, c3: f64) -> Attenuation {
        Attenuation { c1, c2, c3 }
    }

    pub fn factor(&self, distance: f64) -> f64 {
        1.0 / (self.c1 + self.c2 * distance + self.c3 * distance * distance)
    }
}

/// A light source.
///
/// Directional lights shine uniformly along a direction from infinitely
/// far away. Point lights radiate from a position. Spotlights radiate
/// from a position but only inside a cone of half-angle `theta` (in
/// degrees) around their axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    Directional {
        direction: Vector3,
        color: Color,
    },
    Point {
        position: Point3,
        color: Color,
        attenuation: Attenuation,
    },
    Spot {
        position: Point3,
        direction: Vector3,
        theta: f64,
        color: Color,
        attenuation: Attenuation,
    },
}

/// Light arriving at a surface point from one light source.
///
/// `toward` is the unit vector from the point to the light, `distance`
/// the occluder horizon for shadow rays (infinite for directional
/// lights) and `falloff` the attenuation factor at the point.
#[derive(Copy, Clone, Debug)]
pub struct Incidence {
    pub toward: Vector3,
    pub distance: f64,
    pub falloff: f64,
}

impl Light {
    pub fn color(&self) -> Color {
        match *self {
            Light::Directional { color, .. } => color,
            Light::Point { color, .. } => color,
            Light::Spot { color, .. } => color,
        }
    }

    /// Evaluates this light at a surface point.
    ///
    /// Returns `None` for a spotlight whose cone excludes the point;
    /// such a light contributes nothing, not even a shadow test.
    pub fn incidence_at(&self, point: Point3) -> Option<Incidence> {
        match *self {
            Light::Directional { direction, .. } => Some(Incidence {
                toward: (-direction).normalize(),
                distance: f64::INFINITY,
                falloff: 1.0,
            }),

            Light::Point { position, attenuation, .. } => {
                let toward = position - point;
                let distance = toward.magnitude();

                Some(Incidence {
                    toward: toward.normalize(),
                    distance,
                    falloff: attenuation.factor(distance),
                })
            },

            Light::Spot { position, direction, theta, attenuation, .. } => {
                let axis = direction.normalize();
                let to_point = (point - position).normalize();

                if axis.dot(&to_point) < theta.to_radians().cos() {
                    return None;
                }

                let toward = position - point;
                let distance = toward.magnitude();

                Some(Incidence {
                    toward: toward.normalize(),
                    distance,
                    falloff: attenuation.factor(distance),
                })
            },
        }
    }
}

/* Tests */

#[test]
fn attenuation_none_is_unity() {
    assert_eq!(Attenuation::none().factor(123.0), 1.0);
}

#[test]
fn attenuation_quadratic_falloff() {
    let att = Attenuation::new(1.0, 0.0, 1.0);

    assert_eq!(att.factor(2.0), 1.0 / 5.0);
}

#[test]
fn directional_incidence_points_against_stored_direction() {
    let light = Light::Directional {
        direction: Vector3::new(0.0, 0.0, -2.0),
        color: Color::white(),
    };

    let inc = light.incidence_at(Point3::origin()).unwrap();
    assert_eq!(inc.toward, Vector3::new(0.0, 0.0, 1.0));
    assert!(inc.distance.is_infinite());
    assert_eq!(inc.falloff, 1.0);
}

#[test]
fn point_incidence_has_finite_horizon() {
    let light = Light::Point {
        position: Point3::new(0.0, 3.0, 0.0),
        color: Color::white(),
        attenuation: Attenuation::none(),
    };

    let inc = light.incidence_at(Point3::origin()).unwrap();
    assert_eq!(inc.toward, Vector3::new(0.0, 1.0, 0.0));
    assert!(crate::feq(inc.distance, 3.0));
}

#[test]
fn spotlight_cone_includes_axis() {
    let light = Light::Spot {
        position: Point3::new(0.0, 5.0, 0.0),
        direction: Vector3::new(0.0, -1.0, 0.0),
        theta: 10.0,
        color: Color::white(),
        attenuation: Attenuation::none(),
    };

    assert!(light.incidence_at(Point3::origin()).is_some());
}

#[test]
fn spotlight_cone_excludes_sideways_point() {
    let light = Light::Spot {
        position: Point3::new(0.0, 5.0, 0.0),
        direction: Vector3::new(0.0, -1.0, 0.0),
        theta: 10.0,
        color: Color::white(),
        attenuation: Attenuation::none(),
    };

    // 45 degrees off axis, well outside the 10 degree cone.
    assert!(light.incidence_at(Point3::new(5.0, 0.0, 0.0)).is_none());
}
