//! Scene assembly: welds, finalize, triads
//!
//! Assembly runs in a fixed order. Welds come first (each parent before its
//! children), then a single `finalize`, then triad registration. The frame
//! graph is append-only while welding and frozen afterwards.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use triad_core::{
    AxisGeometry, FrameGraph, FrameGraphError, FrameKind, GeometryError, Transform, TriadSpec,
    Weld, build_triad,
};
use uuid::Uuid;

use crate::config::SceneConfig;
use crate::engine::{FrameHandle, GeometryEngine, GeometryHandle, RegistrationError};
use crate::model::{ModelDescription, ModelError, load_model};

/// Errors that abort assembly
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Frame(#[from] FrameGraphError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Scene must be finalized before adding triads (frame '{0}')")]
    NotFinalized(String),

    #[error("Scene was already finalized")]
    AlreadyFinalized,

    #[error("Model '{model}' root link '{root}' is already attached")]
    ModelAlreadyWelded { model: String, root: String },
}

/// One axis of a registered triad
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedAxis {
    pub handle: GeometryHandle,
    pub geometry: AxisGeometry,
    /// Pose of the cylinder in world coordinates (X_WG)
    pub world_pose: Transform,
}

/// Result of registering one triad
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriadRecord {
    /// Frame the triad annotates
    pub frame: String,
    /// Body the geometry is registered under
    pub body: String,
    pub body_handle: FrameHandle,
    pub axes: Vec<PlacedAxis>,
}

/// Drives scene construction against a [`GeometryEngine`]
pub struct SceneAssembler<E: GeometryEngine> {
    graph: FrameGraph,
    engine: E,
    /// Body frame ID -> engine handle
    handles: HashMap<Uuid, FrameHandle>,
    /// Models waiting for their root link to be welded, keyed by root link
    pending_models: HashMap<String, ModelDescription>,
    finalized: bool,
}

impl<E: GeometryEngine> SceneAssembler<E> {
    pub fn new(engine: E) -> Self {
        let graph = FrameGraph::new();
        let handles = HashMap::from([(graph.root().id, engine.world_frame())]);
        Self {
            graph,
            engine,
            handles,
            pending_models: HashMap::new(),
            finalized: false,
        }
    }

    pub fn graph(&self) -> &FrameGraph {
        &self.graph
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Engine handle of a body frame
    pub fn handle_of(&self, frame: &str) -> Result<FrameHandle, FrameGraphError> {
        let id = self.graph.frame(frame)?.id;
        self.handles
            .get(&id)
            .copied()
            .ok_or_else(|| FrameGraphError::UnknownFrame(frame.to_string()))
    }

    /// Attach a model. Its links join the scene when a weld introduces its
    /// root link.
    pub fn add_model(&mut self, model: ModelDescription) -> Result<(), AssemblyError> {
        if self.finalized {
            return Err(FrameGraphError::Frozen(model.root_link).into());
        }
        if self.graph.contains(&model.root_link)
            || self.pending_models.contains_key(&model.root_link)
        {
            return Err(AssemblyError::ModelAlreadyWelded {
                model: model.name,
                root: model.root_link,
            });
        }
        tracing::debug!("Model '{}' waits for root link '{}'", model.name, model.root_link);
        self.pending_models.insert(model.root_link.clone(), model);
        Ok(())
    }

    /// Load a URDF file and attach it with [`SceneAssembler::add_model`]
    pub fn add_model_file(&mut self, path: &Path) -> Result<(), AssemblyError> {
        let model = load_model(path)?;
        self.add_model(model)
    }

    /// Apply one weld, then expand any model rooted at the new frame
    pub fn apply_weld(&mut self, weld: &Weld) -> Result<Uuid, AssemblyError> {
        let id = self.insert_weld(weld)?;
        self.expand_model(&weld.child)?;
        Ok(id)
    }

    /// Weld in the links of a pending model whose root is `root`
    fn expand_model(&mut self, root: &str) -> Result<(), AssemblyError> {
        let Some(model) = self.pending_models.remove(root) else {
            return Ok(());
        };

        tracing::info!(
            "Welding model '{}' ({} joints) at '{}'",
            model.name,
            model.joints.len(),
            root
        );
        for model_weld in model.welds() {
            self.insert_weld(&model_weld)?;
            self.expand_model(&model_weld.child)?;
        }
        Ok(())
    }

    pub fn apply_welds<'a>(
        &mut self,
        welds: impl IntoIterator<Item = &'a Weld>,
    ) -> Result<(), AssemblyError> {
        for weld in welds {
            self.apply_weld(weld)?;
        }
        Ok(())
    }

    fn insert_weld(&mut self, weld: &Weld) -> Result<Uuid, AssemblyError> {
        if self.finalized {
            return Err(FrameGraphError::Frozen(weld.child.clone()).into());
        }
        if self.graph.contains(&weld.child) {
            return Err(FrameGraphError::DuplicateFrame(weld.child.clone()).into());
        }

        // The engine sees a body before the graph does, so a graph frame
        // always has its handle
        let handle = match weld.kind {
            FrameKind::Body => {
                let parent = self.body_handle_of(&weld.parent).map_err(|e| match e {
                    FrameGraphError::UnknownFrame(_) => FrameGraphError::UnknownParent {
                        parent: weld.parent.clone(),
                        child: weld.child.clone(),
                    },
                    other => other,
                })?;
                Some(self.engine.register_frame(&weld.child, parent)?)
            }
            FrameKind::Fixed => None,
        };

        let id = weld.apply(&mut self.graph)?;
        if let Some(handle) = handle {
            self.handles.insert(id, handle);
        }

        tracing::debug!("Welded '{}' -> '{}'", weld.parent, weld.child);
        Ok(id)
    }

    /// Handle of the nearest body at or above `frame`
    fn body_handle_of(&self, frame: &str) -> Result<FrameHandle, FrameGraphError> {
        let body = self.graph.body_of(frame)?;
        self.handles
            .get(&body.id)
            .copied()
            .ok_or_else(|| FrameGraphError::UnknownFrame(body.name.clone()))
    }

    /// Freeze the frame graph and the engine's kinematic tree
    pub fn finalize(&mut self) -> Result<(), AssemblyError> {
        if self.finalized {
            return Err(AssemblyError::AlreadyFinalized);
        }

        for model in self.pending_models.values() {
            tracing::warn!(
                "Model '{}' was never welded (root link '{}'), leaving it out",
                model.name,
                model.root_link
            );
        }

        self.engine.finalize()?;
        self.graph.freeze();
        self.finalized = true;

        tracing::info!("Scene finalized with {} frames", self.graph.len());
        Ok(())
    }

    /// Build a triad for `spec.frame` and register it under the frame's body
    pub fn add_triad(&mut self, spec: &TriadSpec) -> Result<TriadRecord, AssemblyError> {
        if !self.finalized {
            return Err(AssemblyError::NotFinalized(spec.frame.clone()));
        }

        let body = self.graph.body_of(&spec.frame)?;
        let body_name = body.name.clone();
        let body_handle = self.body_handle_of(&spec.frame)?;

        // Triad placement in the body: X_BT = X_BF * X_FT
        let body_to_frame = self.graph.relative_pose(&spec.frame, &body_name)?;
        let placed = TriadSpec {
            offset: body_to_frame.compose(&spec.offset),
            ..spec.clone()
        };
        let axes = build_triad(&placed)?;
        let world_body = self.graph.world_pose(&body_name)?;

        let mut placed_axes = Vec::with_capacity(axes.len());
        for geometry in axes {
            let handle = self.engine.register_geometry(body_handle, &geometry.instance)?;
            tracing::debug!("Registered '{}' under '{}'", geometry.instance.name, body_name);
            placed_axes.push(PlacedAxis {
                handle,
                world_pose: world_body.compose(&geometry.instance.pose),
                geometry,
            });
        }

        tracing::info!("Added triad for '{}' (body '{}')", spec.frame, body_name);
        Ok(TriadRecord {
            frame: spec.frame.clone(),
            body: body_name,
            body_handle,
            axes: placed_axes,
        })
    }

    pub fn add_triads<'a>(
        &mut self,
        specs: impl IntoIterator<Item = &'a TriadSpec>,
    ) -> Result<Vec<TriadRecord>, AssemblyError> {
        specs.into_iter().map(|spec| self.add_triad(spec)).collect()
    }

    /// Run a whole scene config: models, welds, finalize, triads
    pub fn assemble(&mut self, config: &SceneConfig) -> Result<Vec<TriadRecord>, AssemblyError> {
        for path in &config.models {
            self.add_model_file(path)?;
        }
        self.apply_welds(&config.weld_list())?;
        self.finalize()?;
        self.add_triads(&config.triad_specs())
    }

    /// Hand the frozen graph and the engine over to the simulator
    pub fn into_parts(self) -> (FrameGraph, E) {
        (self.graph, self.engine)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use glam::{DQuat, DVec3};
    use triad_core::{GeometryInstance, TriadStyle, WORLD_FRAME};

    use super::*;
    use crate::model::parse_model;
    use crate::recording::RecordingEngine;

    const EPS: f64 = 1e-12;

    /// Engine that refuses frames and geometry past a quota
    struct QuotaEngine {
        inner: RecordingEngine,
        frame_quota: usize,
        geometry_quota: usize,
    }

    impl QuotaEngine {
        fn new(frame_quota: usize, geometry_quota: usize) -> Self {
            Self {
                inner: RecordingEngine::new(),
                frame_quota,
                geometry_quota,
            }
        }
    }

    impl GeometryEngine for QuotaEngine {
        fn world_frame(&self) -> FrameHandle {
            self.inner.world_frame()
        }

        fn register_frame(
            &mut self,
            name: &str,
            parent: FrameHandle,
        ) -> Result<FrameHandle, RegistrationError> {
            if self.inner.frames().len() >= self.frame_quota {
                return Err(RegistrationError::Rejected(name.to_string()));
            }
            self.inner.register_frame(name, parent)
        }

        fn finalize(&mut self) -> Result<(), RegistrationError> {
            self.inner.finalize()
        }

        fn register_geometry(
            &mut self,
            frame: FrameHandle,
            geometry: &GeometryInstance,
        ) -> Result<GeometryHandle, RegistrationError> {
            if self.inner.geometries().len() >= self.geometry_quota {
                return Err(RegistrationError::Rejected(geometry.name.clone()));
            }
            self.inner.register_geometry(frame, geometry)
        }
    }

    fn desk_welds() -> Vec<Weld> {
        vec![
            Weld::new(WORLD_FRAME, "simpleDesk", Transform::from_rotation_x(FRAC_PI_2)),
            Weld::new(
                "simpleDesk",
                "base_link",
                Transform::new(
                    DQuat::from_rotation_x(-FRAC_PI_2),
                    DVec3::new(0.15, 0.75, -0.20),
                ),
            ),
        ]
    }

    fn finalized_desk() -> SceneAssembler<RecordingEngine> {
        let mut assembler = SceneAssembler::new(RecordingEngine::new());
        assembler.apply_welds(&desk_welds()).unwrap();
        assembler.finalize().unwrap();
        assembler
    }

    #[test]
    fn test_welds_register_bodies_with_engine() {
        let assembler = finalized_desk();
        let engine = assembler.engine();

        assert_eq!(engine.frames().len(), 3);
        let desk = assembler.handle_of("simpleDesk").unwrap();
        let base = assembler.handle_of("base_link").unwrap();
        assert_eq!(engine.frame(desk).unwrap().parent, Some(engine.world_frame()));
        assert_eq!(engine.frame(base).unwrap().parent, Some(desk));
        assert!(engine.is_finalized());
        assert!(assembler.graph().is_frozen());
    }

    #[test]
    fn test_fixed_frames_are_not_registered_as_bodies() {
        let mut assembler = SceneAssembler::new(RecordingEngine::new());
        assembler.apply_welds(&desk_welds()).unwrap();
        assembler
            .apply_weld(&Weld::fixed("base_link", "camera_mount", Transform::IDENTITY))
            .unwrap();

        assert_eq!(assembler.engine().frames().len(), 3);
        assert!(assembler.handle_of("camera_mount").is_err());
        assert_eq!(assembler.graph().len(), 4);
    }

    #[test]
    fn test_weld_with_unknown_parent() {
        let mut assembler = SceneAssembler::new(RecordingEngine::new());
        let result = assembler.apply_weld(&Weld::new("desk", "base_link", Transform::IDENTITY));
        assert_eq!(
            result,
            Err(AssemblyError::Frame(FrameGraphError::UnknownParent {
                parent: "desk".into(),
                child: "base_link".into(),
            }))
        );
        assert_eq!(assembler.engine().frames().len(), 1);
    }

    #[test]
    fn test_duplicate_weld_does_not_reach_engine() {
        let mut assembler = SceneAssembler::new(RecordingEngine::new());
        assembler.apply_welds(&desk_welds()).unwrap();
        let result =
            assembler.apply_weld(&Weld::new(WORLD_FRAME, "base_link", Transform::IDENTITY));

        assert_eq!(
            result,
            Err(AssemblyError::Frame(FrameGraphError::DuplicateFrame(
                "base_link".into()
            )))
        );
        assert_eq!(assembler.engine().frames().len(), 3);
    }

    #[test]
    fn test_duplicate_child_reported_before_unknown_parent() {
        let mut assembler = SceneAssembler::new(RecordingEngine::new());
        assembler.apply_welds(&desk_welds()).unwrap();
        let result = assembler.apply_weld(&Weld::new("ghost", "base_link", Transform::IDENTITY));
        assert_eq!(
            result,
            Err(AssemblyError::Frame(FrameGraphError::DuplicateFrame(
                "base_link".into()
            )))
        );
    }

    #[test]
    fn test_rejected_frame_stays_out_of_graph() {
        // world + simpleDesk fit, base_link does not
        let mut assembler = SceneAssembler::new(QuotaEngine::new(2, usize::MAX));
        let welds = desk_welds();
        assembler.apply_weld(&welds[0]).unwrap();

        let result = assembler.apply_weld(&welds[1]);
        assert_eq!(
            result,
            Err(AssemblyError::Registration(RegistrationError::Rejected(
                "base_link".into()
            )))
        );
        assert!(!assembler.graph().contains("base_link"));
        assert_eq!(assembler.graph().len(), 2);
        assert_eq!(
            assembler.handle_of("base_link"),
            Err(FrameGraphError::UnknownFrame("base_link".into()))
        );

        // Frames the engine accepted stay usable
        assert!(assembler.handle_of("simpleDesk").is_ok());
        let camera = Weld::fixed("simpleDesk", "camera_mount", Transform::IDENTITY);
        assembler.apply_weld(&camera).unwrap();

        // A weld under the rejected frame reports the missing parent
        let shoulder = Weld::new("base_link", "shoulder_link", Transform::IDENTITY);
        let result = assembler.apply_weld(&shoulder);
        assert_eq!(
            result,
            Err(AssemblyError::Frame(FrameGraphError::UnknownParent {
                parent: "base_link".into(),
                child: "shoulder_link".into(),
            }))
        );
    }

    #[test]
    fn test_finalize_ordering() {
        let mut assembler = SceneAssembler::new(RecordingEngine::new());
        let spec = TriadSpec::new(WORLD_FRAME, TriadStyle::default());
        assert_eq!(
            assembler.add_triad(&spec),
            Err(AssemblyError::NotFinalized(WORLD_FRAME.into()))
        );

        assembler.finalize().unwrap();
        assert_eq!(assembler.finalize(), Err(AssemblyError::AlreadyFinalized));

        let late = assembler.apply_weld(&Weld::new(WORLD_FRAME, "late", Transform::IDENTITY));
        assert_eq!(
            late,
            Err(AssemblyError::Frame(FrameGraphError::Frozen("late".into())))
        );
    }

    #[test]
    fn test_triad_registered_under_body() {
        let mut assembler = finalized_desk();
        let record = assembler
            .add_triad(&TriadSpec::new("base_link", TriadStyle::default()))
            .unwrap();

        assert_eq!(record.body, "base_link");
        assert_eq!(record.body_handle, assembler.handle_of("base_link").unwrap());
        assert_eq!(record.axes.len(), 3);

        let engine = assembler.engine();
        let names: Vec<_> = engine
            .geometries_of(record.body_handle)
            .map(|g| g.geometry.name.as_str())
            .collect();
        assert_eq!(names, ["base_link x-axis", "base_link y-axis", "base_link z-axis"]);
    }

    #[test]
    fn test_triad_world_poses() {
        let mut assembler = finalized_desk();
        let record = assembler
            .add_triad(&TriadSpec::new("base_link", TriadStyle::default()))
            .unwrap();

        // base_link sits at (0.15, 0.20, 0.75) with identity orientation
        let origin = DVec3::new(0.15, 0.20, 0.75);
        for placed in &record.axes {
            let center = placed.world_pose.apply(DVec3::ZERO);
            let expected = origin + placed.geometry.axis.unit() * 0.125;
            assert!(center.abs_diff_eq(expected, EPS), "{center} vs {expected}");
        }
    }

    #[test]
    fn test_triad_on_fixed_frame_uses_body_offset() {
        let mut assembler = SceneAssembler::new(RecordingEngine::new());
        assembler.apply_welds(&desk_welds()).unwrap();
        let mount = Transform::new(DQuat::from_rotation_z(FRAC_PI_2), DVec3::new(0.0, 0.0, 0.3));
        assembler
            .apply_weld(&Weld::fixed("base_link", "camera_mount", mount))
            .unwrap();
        assembler.finalize().unwrap();

        let offset = Transform::from_translation(DVec3::new(0.1, 0.0, 0.0));
        let spec = TriadSpec::new("camera_mount", TriadStyle::default()).with_offset(offset);
        let record = assembler.add_triad(&spec).unwrap();

        assert_eq!(record.frame, "camera_mount");
        assert_eq!(record.body, "base_link");

        // X axis: body pose = mount * offset * cylinder pose
        let expected = mount.compose(&offset).compose(&triad_core::Axis::X.cylinder_pose(0.25));
        assert!(record.axes[0].geometry.instance.pose.abs_diff_eq(&expected, EPS));
        assert_eq!(record.axes[0].geometry.instance.name, "camera_mount x-axis");
    }

    #[test]
    fn test_invalid_triad_leaves_scene_intact() {
        let mut assembler = finalized_desk();
        let style = TriadStyle {
            opacity: 2.0,
            ..Default::default()
        };
        let result = assembler.add_triad(&TriadSpec::new("base_link", style));
        assert!(matches!(result, Err(AssemblyError::Geometry(_))));
        assert!(assembler.engine().geometries().is_empty());

        // The next triad still succeeds
        assembler
            .add_triad(&TriadSpec::new("simpleDesk", TriadStyle::default()))
            .unwrap();
        assert_eq!(assembler.engine().geometries().len(), 3);
    }

    #[test]
    fn test_triad_for_unknown_frame() {
        let mut assembler = finalized_desk();
        let result = assembler.add_triad(&TriadSpec::new("ghost", TriadStyle::default()));
        assert_eq!(
            result,
            Err(AssemblyError::Frame(FrameGraphError::UnknownFrame("ghost".into())))
        );
    }

    #[test]
    fn test_registration_failure_aborts_remaining_triads() {
        let mut assembler = SceneAssembler::new(QuotaEngine::new(usize::MAX, 4));
        assembler.apply_welds(&desk_welds()).unwrap();
        assembler.finalize().unwrap();

        let specs = [
            TriadSpec::new("simpleDesk", TriadStyle::default()),
            TriadSpec::new("base_link", TriadStyle::default()),
            TriadSpec::new(WORLD_FRAME, TriadStyle::default()),
        ];
        let result = assembler.add_triads(&specs);
        assert_eq!(
            result,
            Err(AssemblyError::Registration(RegistrationError::Rejected(
                "base_link y-axis".into()
            )))
        );

        // Registrations before the failure stay in place
        let (graph, engine) = assembler.into_parts();
        assert_eq!(engine.inner.geometries().len(), 4);
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_model_expands_when_root_is_welded() {
        let arm = parse_model(
            r#"
            <robot name="arm">
              <link name="base_link"/>
              <link name="shoulder_link"/>
              <joint name="joint_1" type="continuous">
                <parent link="base_link"/>
                <child link="shoulder_link"/>
                <origin xyz="0 0 0.15643" rpy="0 0 0"/>
              </joint>
            </robot>
            "#,
        )
        .unwrap();

        let mut assembler = SceneAssembler::new(RecordingEngine::new());
        assembler.add_model(arm.clone()).unwrap();
        assert!(!assembler.graph().contains("shoulder_link"));

        assembler.apply_welds(&desk_welds()).unwrap();
        assert!(assembler.graph().contains("shoulder_link"));

        let shoulder = assembler.graph().world_pose("shoulder_link").unwrap();
        assert!(
            shoulder
                .translation()
                .abs_diff_eq(DVec3::new(0.15, 0.20, 0.75 + 0.15643), EPS)
        );
        let handle = assembler.handle_of("shoulder_link").unwrap();
        assert_eq!(
            assembler.engine().frame(handle).unwrap().parent,
            Some(assembler.handle_of("base_link").unwrap())
        );

        assert!(matches!(
            assembler.add_model(arm),
            Err(AssemblyError::ModelAlreadyWelded { .. })
        ));
    }
}
