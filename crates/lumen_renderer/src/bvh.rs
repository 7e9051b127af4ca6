//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree built by splitting the primitives at the median along a
//! randomly chosen axis. Children may be any primitive, including nested
//! BVH nodes.

use std::cmp::Ordering;

use lumen_math::{Aabb, Axis, Interval, Ray};
use rand::{Rng, RngCore};
use rayon::slice::ParallelSliceMut;

use crate::hittable::{HitRecord, Hittable, Primitive};
use crate::SceneError;

/// Above this many primitives the per-level sort runs on the rayon pool.
const PARALLEL_SORT_THRESHOLD: usize = 4096;

/// A primitive paired with its box over the build's shutter interval.
type Bounded = (Aabb, Primitive);

/// BVH node - either a branch with two children or a leaf with one primitive.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<Primitive>,
        right: Box<Primitive>,
        bbox: Aabb,
    },
    /// Single primitive, only produced when building over one object.
    Leaf { object: Box<Primitive>, bbox: Aabb },
}

impl BvhNode {
    /// Build a BVH over `objects` using boxes for the shutter `[time0, time1]`.
    ///
    /// Fails if the list is empty or any object has no bounding box.
    pub fn new(
        objects: Vec<Primitive>,
        time0: f64,
        time1: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Self, SceneError> {
        if objects.is_empty() {
            return Err(SceneError::EmptyBvh);
        }

        let count = objects.len();
        let items = objects
            .into_iter()
            .enumerate()
            .map(|(index, object)| {
                object
                    .bounding_box(time0, time1)
                    .map(|bbox| (bbox, object))
                    .ok_or(SceneError::UnboundedPrimitive { index })
            })
            .collect::<Result<Vec<Bounded>, _>>()?;

        let node = Self::build(items, rng);

        log::info!(
            "Built BVH: {} primitives, {} nodes, depth {}",
            count,
            node.node_count(),
            node.depth()
        );

        Ok(node)
    }

    /// Recursive median split. `items` is never empty.
    fn build(mut items: Vec<Bounded>, rng: &mut dyn RngCore) -> Self {
        let axis = Axis::ALL[rng.gen_range(0..Axis::ALL.len())];
        sort_along(&mut items, axis);

        match items.len() {
            1 | 2 => {
                let mut iter = items.into_iter();
                match (iter.next(), iter.next()) {
                    (Some((bbox, object)), None) => BvhNode::Leaf {
                        object: Box::new(object),
                        bbox,
                    },
                    (Some((left_box, left)), Some((right_box, right))) => BvhNode::Branch {
                        left: Box::new(left),
                        right: Box::new(right),
                        bbox: Aabb::surrounding(&left_box, &right_box),
                    },
                    _ => unreachable!("BVH build over an empty slice"),
                }
            }
            n => {
                let right_items = items.split_off(n / 2);
                let left = Self::build(items, rng);
                let right = Self::build(right_items, rng);
                let bbox = Aabb::surrounding(&left.bbox(), &right.bbox());

                BvhNode::Branch {
                    left: Box::new(Primitive::Bvh(left)),
                    right: Box::new(Primitive::Bvh(right)),
                    bbox,
                }
            }
        }
    }

    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }

    /// Number of BVH nodes in this subtree.
    pub fn node_count(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => {
                1 + child_node_count(left) + child_node_count(right)
            }
        }
    }

    /// Longest root-to-node path counted in BVH nodes.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => {
                1 + child_depth(left).max(child_depth(right))
            }
        }
    }
}

fn child_node_count(child: &Primitive) -> usize {
    match child {
        Primitive::Bvh(node) => node.node_count(),
        _ => 0,
    }
}

fn child_depth(child: &Primitive) -> usize {
    match child {
        Primitive::Bvh(node) => node.depth(),
        _ => 0,
    }
}

/// Stable sort by box minimum along `axis`.
fn sort_along(items: &mut [Bounded], axis: Axis) {
    let compare = |a: &Bounded, b: &Bounded| -> Ordering { Aabb::compare_min(&a.0, &b.0, axis) };

    if items.len() > PARALLEL_SORT_THRESHOLD {
        items.par_sort_by(compare);
    } else {
        items.sort_by(compare);
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        if !self.bbox().hit(ray, ray_t) {
            return None;
        }

        match self {
            BvhNode::Leaf { object, .. } => object.hit(ray, ray_t, rng),
            BvhNode::Branch { left, right, .. } => {
                // Both children are queried over the full range
                let hit_left = left.hit(ray, ray_t, rng);
                let hit_right = right.hit(ray, ray_t, rng);

                match (hit_left, hit_right) {
                    (Some(l), Some(r)) => Some(if l.t < r.t { l } else { r }),
                    (l, r) => l.or(r),
                }
            }
        }
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        Some(self.bbox())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{gray, rng};
    use crate::{PrimitiveList, Rect, Sphere};
    use lumen_math::Vec3;

    fn spheres(n: usize) -> Vec<Primitive> {
        (0..n)
            .map(|i| Sphere::new(Vec3::new(i as f64 * 2.0, 0.0, -5.0), 0.5, gray()).into())
            .collect()
    }

    struct Recorder;

    static RECORDS: std::sync::Mutex<Vec<(log::Level, String)>> = std::sync::Mutex::new(Vec::new());

    impl log::Log for Recorder {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut records) = RECORDS.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    #[test]
    fn test_bvh_summary_logged_at_info() {
        // Other tests may have installed a logger already; only ours records
        if log::set_logger(&Recorder).is_err() {
            return;
        }
        log::set_max_level(log::LevelFilter::Trace);

        BvhNode::new(spheres(7), 0.0, 1.0, &mut rng()).unwrap();

        let records = RECORDS.lock().unwrap();
        assert!(records
            .iter()
            .any(|(level, msg)| *level == log::Level::Info && msg.starts_with("Built BVH: 7 primitives")));
    }

    #[test]
    fn test_bvh_empty_is_error() {
        let result = BvhNode::new(vec![], 0.0, 1.0, &mut rng());
        assert!(matches!(result, Err(SceneError::EmptyBvh)));
    }

    #[test]
    fn test_bvh_single_primitive_is_leaf() {
        let bvh = BvhNode::new(spheres(1), 0.0, 1.0, &mut rng()).unwrap();
        assert!(matches!(bvh, BvhNode::Leaf { .. }));

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let rec = bvh
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng())
            .unwrap();
        assert!((rec.t - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_bvh_two_primitives_are_direct_children() {
        let bvh = BvhNode::new(spheres(2), 0.0, 1.0, &mut rng()).unwrap();
        match &bvh {
            BvhNode::Branch { left, right, .. } => {
                assert!(matches!(**left, Primitive::Sphere(_)));
                assert!(matches!(**right, Primitive::Sphere(_)));
            }
            BvhNode::Leaf { .. } => panic!("expected a branch"),
        }
        assert_eq!(bvh.node_count(), 1);
    }

    #[test]
    fn test_bvh_box_contains_children() {
        let bvh = BvhNode::new(spheres(9), 0.0, 1.0, &mut rng()).unwrap();

        fn check(node: &BvhNode) {
            if let BvhNode::Branch { left, right, bbox } = node {
                for child in [left, right] {
                    let child_box = child.bounding_box(0.0, 1.0).unwrap();
                    assert!(bbox.contains_box(&child_box));
                    if let Primitive::Bvh(inner) = &**child {
                        check(inner);
                    }
                }
            }
        }
        check(&bvh);

        let bbox = bvh.bbox();
        assert_eq!(bbox.min(), Vec3::new(-0.5, -0.5, -5.5));
        assert_eq!(bbox.max(), Vec3::new(16.5, 0.5, -4.5));
    }

    #[test]
    fn test_bvh_is_balanced() {
        let bvh = BvhNode::new(spheres(64), 0.0, 1.0, &mut rng()).unwrap();
        // 64 leaves paired into 32 two-child nodes, 31 nodes above them
        assert_eq!(bvh.node_count(), 63);
        assert_eq!(bvh.depth(), 6);
    }

    #[test]
    fn test_bvh_matches_linear_scan() {
        let objects = spheres(25);
        let list: PrimitiveList = objects.clone().into();
        let bvh = BvhNode::new(objects, 0.0, 1.0, &mut rng()).unwrap();
        let mut rng = rng();

        for i in 0..200 {
            let x = (i as f64) * 0.25 - 1.0;
            let ray = Ray::new(Vec3::new(x, 0.1, 0.0), Vec3::new(0.01, 0.0, -1.0), 0.0);
            let range = Interval::new(0.001, f64::INFINITY);

            let expected = list.hit(&ray, range, &mut rng).map(|r| r.t);
            let actual = bvh.hit(&ray, range, &mut rng).map(|r| r.t);
            assert_eq!(expected, actual, "ray {i}");
        }
    }

    #[test]
    fn test_bvh_rejects_unbounded_primitive() {
        let mut objects = spheres(3);
        objects.push(PrimitiveList::new().into());

        let result = BvhNode::new(objects, 0.0, 1.0, &mut rng());
        assert!(matches!(
            result,
            Err(SceneError::UnboundedPrimitive { index: 3 })
        ));
    }

    #[test]
    fn test_bvh_over_mixed_primitives() {
        let objects = vec![
            Rect::xz(-10.0, 10.0, -10.0, 10.0, -1.0, gray()).into(),
            Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, gray()).into(),
        ];
        let bvh = BvhNode::new(objects, 0.0, 1.0, &mut rng()).unwrap();

        let down = Ray::new(Vec3::new(5.0, 5.0, 5.0), -Vec3::Y, 0.0);
        let rec = bvh
            .hit(&down, Interval::new(0.001, f64::INFINITY), &mut rng())
            .unwrap();
        assert!((rec.t - 6.0).abs() < 1e-12);
        assert_eq!(rec.normal, Vec3::Y);
    }

    #[test]
    fn test_bvh_same_seed_same_tree() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let a = BvhNode::new(spheres(30), 0.0, 1.0, &mut StdRng::seed_from_u64(8)).unwrap();
        let b = BvhNode::new(spheres(30), 0.0, 1.0, &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(format!("{a:?}"), format!("{b:?}"));
    }
}
