//! Scene graph host
//!
//! Owns every renderable and light. Other components hold [`ObjectId`]
//! handles, never references, so detaching an object cannot leave a
//! dangling owner behind.

mod camera;
pub mod controls;

pub use camera::PerspectiveCamera;
pub use controls::OrbitControls;

use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::galaxy::PointSet;

/// Handle to an object attached to a [`Scene`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

/// Position, euler rotation (XYZ, radians) and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let r = self.rotation;
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
            self.position,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blending {
    Normal,
    #[default]
    Additive,
}

/// Material for point clouds (sizes in world units when attenuated).
#[derive(Debug, Clone, PartialEq)]
pub struct PointsMaterial {
    pub size: f32,
    pub color: [f32; 3],
    pub size_attenuation: bool,
    pub depth_write: bool,
    pub blending: Blending,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            size: 0.02,
            color: [1.0; 3],
            size_attenuation: true,
            depth_write: false,
            blending: Blending::Additive,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PointCloud {
    pub geometry: Arc<PointSet>,
    pub material: PointsMaterial,
    /// Bumped by the generator on every rebuild; renderers re-upload on change
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl AmbientLight {
    pub fn radiance(&self) -> [f32; 3] {
        self.color.map(|c| c * self.intensity)
    }
}

#[derive(Debug, Clone)]
pub enum ObjectKind {
    Points(PointCloud),
    AmbientLight(AmbientLight),
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub transform: Transform,
    pub kind: ObjectKind,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn as_points(&self) -> Option<&PointCloud> {
        match &self.kind {
            ObjectKind::Points(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_points_mut(&mut self) -> Option<&mut PointCloud> {
        match &mut self.kind {
            ObjectKind::Points(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_ambient_light_mut(&mut self) -> Option<&mut AmbientLight> {
        match &mut self.kind {
            ObjectKind::AmbientLight(l) => Some(l),
            _ => None,
        }
    }
}

/// Flat scene graph. Insertion order is draw order.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<(ObjectId, SceneObject)>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push((id, object));
        id
    }

    /// Detach an object, handing ownership back to the caller.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let idx = self.objects.iter().position(|(oid, _)| *oid == id)?;
        Some(self.objects.remove(idx).1)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects
            .iter()
            .find(|(oid, _)| *oid == id)
            .map(|(_, o)| o)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects
            .iter_mut()
            .find(|(oid, _)| *oid == id)
            .map(|(_, o)| o)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(id, o)| (*id, o))
    }

    pub fn point_clouds(&self) -> impl Iterator<Item = (ObjectId, &SceneObject, &PointCloud)> {
        self.iter()
            .filter_map(|(id, o)| o.as_points().map(|p| (id, o, p)))
    }

    /// Summed ambient radiance of every ambient light.
    pub fn ambient(&self) -> [f32; 3] {
        self.objects
            .iter()
            .filter_map(|(_, o)| match &o.kind {
                ObjectKind::AmbientLight(l) => Some(l.radiance()),
                _ => None,
            })
            .fold([0.0; 3], |acc, r| [acc[0] + r[0], acc[1] + r[1], acc[2] + r[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light(intensity: f32) -> SceneObject {
        SceneObject::new(
            "ambient",
            ObjectKind::AmbientLight(AmbientLight {
                color: [1.0, 0.5, 0.0],
                intensity,
            }),
        )
    }

    fn cloud() -> SceneObject {
        SceneObject::new(
            "points",
            ObjectKind::Points(PointCloud {
                geometry: Arc::new(PointSet::default()),
                material: PointsMaterial::default(),
                generation: 1,
            }),
        )
    }

    #[test]
    fn add_and_remove() {
        let mut scene = Scene::new();
        let a = scene.add(light(1.0));
        let b = scene.add(cloud());
        assert_ne!(a, b);
        assert_eq!(scene.len(), 2);

        let removed = scene.remove(a).unwrap();
        assert_eq!(removed.name, "ambient");
        assert!(!scene.contains(a));
        assert!(scene.contains(b));
        assert!(scene.remove(a).is_none());
    }

    #[test]
    fn ids_are_not_reused() {
        let mut scene = Scene::new();
        let a = scene.add(cloud());
        scene.remove(a);
        let b = scene.add(cloud());
        assert_ne!(a, b);
    }

    #[test]
    fn ambient_sums_lights() {
        let mut scene = Scene::new();
        assert_eq!(scene.ambient(), [0.0; 3]);
        scene.add(light(1.0));
        scene.add(light(0.5));
        assert_eq!(scene.ambient(), [1.5, 0.75, 0.0]);
    }

    #[test]
    fn point_clouds_filters_kinds() {
        let mut scene = Scene::new();
        scene.add(light(1.0));
        let id = scene.add(cloud());
        let clouds: Vec<_> = scene.point_clouds().map(|(id, _, _)| id).collect();
        assert_eq!(clouds, vec![id]);
    }

    #[test]
    fn transform_matrix_applies_rotation_then_translation() {
        let t = Transform {
            position: Vec3::new(0.0, 1.0, 0.0),
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            scale: Vec3::ONE,
        };
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 1.0, -1.0)).length() < 1e-5);
    }
}
