use proptest::prelude::*;
use veld_geom::{Aabb, Transform, Vec3};

fn finite() -> impl Strategy<Value = f32> {
    -1.0e3f32..=1.0e3
}

fn vec3() -> impl Strategy<Value = Vec3> {
    (finite(), finite(), finite()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // dot is symmetric and cross is antisymmetric
    #[test]
    fn dot_symmetric_cross_antisymmetric(a in vec3(), b in vec3()) {
        prop_assert_eq!(a.dot(b), b.dot(a));
        let c1 = a.cross(b);
        let c2 = b.cross(a);
        prop_assert!((c1 + c2).length() < 1e-2);
    }

    // cross product is orthogonal to both inputs (up to fp error)
    #[test]
    fn cross_orthogonal(a in vec3(), b in vec3()) {
        let c = a.cross(b);
        let scale = (a.length() * b.length()).max(1.0);
        prop_assert!((c.dot(a) / (scale * scale.max(1.0))).abs() < 1e-2);
        prop_assert!((c.dot(b) / (scale * scale.max(1.0))).abs() < 1e-2);
    }

    // normalized vectors have unit length unless the input is zero
    #[test]
    fn normalized_is_unit(a in vec3()) {
        let n = a.normalized();
        if a.length() > 0.0 {
            prop_assert!((n.length() - 1.0).abs() < 1e-3);
        } else {
            prop_assert_eq!(n, a);
        }
    }

    // expand_to makes the box contain the point
    #[test]
    fn expand_to_contains(a in vec3(), b in vec3(), p in vec3()) {
        let lo = Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
        let hi = Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));
        let mut bb = Aabb::new(lo, hi);
        bb.expand_to(p);
        prop_assert!(bb.contains(p));
    }
}

#[test]
fn transform_defaults() {
    let t = Transform::default();
    assert_eq!(t.position, Vec3::ZERO);
    assert_eq!(t.yaw, 0.0);
    assert_eq!(t.scale, 1.0);
}
