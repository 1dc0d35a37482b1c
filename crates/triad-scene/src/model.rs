//! URDF model descriptions
//!
//! Loads the kinematic skeleton of a URDF file: link names, joint origins
//! and the root link. Meshes, inertias and materials are left to the
//! simulation engine.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

use serde::{Deserialize, Serialize};
use triad_core::{Pose, Weld};

/// Errors that can occur during model loading
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to parse URDF: {0}")]
    Parse(String),

    #[error("Empty URDF: no links defined")]
    Empty,

    #[error("Joint '{joint}' references unknown link '{link}'")]
    UnknownLink { joint: String, link: String },

    #[error("Model '{0}' has no root link")]
    NoRoot(String),

    #[error("Model '{model}' has {count} root links, expected one")]
    MultipleRoots { model: String, count: usize },

    #[error("Link '{link}' is the child of both '{first}' and '{second}'")]
    MultipleParents {
        link: String,
        first: String,
        second: String,
    },

    #[error("Link '{link}' of model '{model}' is not reachable from root link '{root}'")]
    Unreachable {
        model: String,
        root: String,
        link: String,
    },
}

/// Joint type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum JointType {
    #[default]
    Fixed,
    Revolute,
    Continuous,
    Prismatic,
    Floating,
    Planar,
}

impl JointType {
    /// Check if the joint can move (and is flattened to its origin here)
    pub fn is_movable(&self) -> bool {
        !matches!(self, JointType::Fixed)
    }
}

impl From<&urdf_rs::JointType> for JointType {
    fn from(urdf_type: &urdf_rs::JointType) -> Self {
        match urdf_type {
            urdf_rs::JointType::Fixed => JointType::Fixed,
            urdf_rs::JointType::Revolute => JointType::Revolute,
            urdf_rs::JointType::Continuous => JointType::Continuous,
            urdf_rs::JointType::Prismatic => JointType::Prismatic,
            urdf_rs::JointType::Floating => JointType::Floating,
            urdf_rs::JointType::Planar => JointType::Planar,
            urdf_rs::JointType::Spherical => JointType::Floating, // Approximate as floating
        }
    }
}

/// A joint between two links of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelJoint {
    pub name: String,
    pub joint_type: JointType,
    pub parent: String,
    pub child: String,
    /// Transform from parent link to child link at zero joint position
    pub origin: Pose,
}

/// Kinematic skeleton of one model file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub name: String,
    /// Link that is never the child of a joint
    pub root_link: String,
    pub links: Vec<String>,
    pub joints: Vec<ModelJoint>,
}

/// Load a URDF file
pub fn load_model(path: &Path) -> Result<ModelDescription, ModelError> {
    let robot = urdf_rs::read_file(path).map_err(|e| ModelError::Parse(e.to_string()))?;
    let model = ModelDescription::from_robot(&robot)?;
    tracing::info!(
        "Loaded model '{}' from {:?} ({} links, {} joints)",
        model.name,
        path,
        model.links.len(),
        model.joints.len()
    );
    Ok(model)
}

/// Parse URDF text
pub fn parse_model(urdf: &str) -> Result<ModelDescription, ModelError> {
    let robot = urdf_rs::read_from_string(urdf).map_err(|e| ModelError::Parse(e.to_string()))?;
    ModelDescription::from_robot(&robot)
}

impl ModelDescription {
    pub fn from_robot(robot: &urdf_rs::Robot) -> Result<Self, ModelError> {
        if robot.links.is_empty() {
            return Err(ModelError::Empty);
        }

        let links: Vec<String> = robot.links.iter().map(|l| l.name.clone()).collect();
        let known: HashSet<&str> = links.iter().map(String::as_str).collect();

        let mut joints = Vec::with_capacity(robot.joints.len());
        let mut parent_joint: HashMap<&str, &str> = HashMap::new();
        for urdf_joint in &robot.joints {
            for link in [&urdf_joint.parent.link, &urdf_joint.child.link] {
                if !known.contains(link.as_str()) {
                    return Err(ModelError::UnknownLink {
                        joint: urdf_joint.name.clone(),
                        link: link.clone(),
                    });
                }
            }
            let child = urdf_joint.child.link.as_str();
            if let Some(first) = parent_joint.insert(child, urdf_joint.name.as_str()) {
                return Err(ModelError::MultipleParents {
                    link: child.to_string(),
                    first: first.to_string(),
                    second: urdf_joint.name.clone(),
                });
            }
            joints.push(ModelJoint {
                name: urdf_joint.name.clone(),
                joint_type: JointType::from(&urdf_joint.joint_type),
                parent: urdf_joint.parent.link.clone(),
                child: urdf_joint.child.link.clone(),
                origin: Pose::from(&urdf_joint.origin),
            });
        }

        // Find root link (link that is not a child of any joint)
        let child_links: HashSet<&str> = joints.iter().map(|j| j.child.as_str()).collect();
        let roots: Vec<&String> = links
            .iter()
            .filter(|l| !child_links.contains(l.as_str()))
            .collect();

        let root_link = match roots.as_slice() {
            [root] => (*root).clone(),
            [] => return Err(ModelError::NoRoot(robot.name.clone())),
            _ => {
                return Err(ModelError::MultipleRoots {
                    model: robot.name.clone(),
                    count: roots.len(),
                });
            }
        };

        let model = Self {
            name: robot.name.clone(),
            root_link,
            links,
            joints,
        };
        model.check_reachable()?;
        Ok(model)
    }

    /// With one root and one parent per link, a link the root cannot reach
    /// sits on a joint cycle
    fn check_reachable(&self) -> Result<(), ModelError> {
        let mut reached: HashSet<&str> = HashSet::from([self.root_link.as_str()]);
        let mut queue = VecDeque::from([self.root_link.as_str()]);
        while let Some(link) = queue.pop_front() {
            for joint in self.joints.iter().filter(|j| j.parent == link) {
                if reached.insert(joint.child.as_str()) {
                    queue.push_back(joint.child.as_str());
                }
            }
        }

        match self.links.iter().find(|l| !reached.contains(l.as_str())) {
            Some(link) => Err(ModelError::Unreachable {
                model: self.name.clone(),
                root: self.root_link.clone(),
                link: link.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Internal joints as body welds, parents before children.
    ///
    /// Movable joints are welded at their zero position.
    pub fn welds(&self) -> Vec<Weld> {
        let mut by_parent: HashMap<&str, Vec<&ModelJoint>> = HashMap::new();
        for joint in &self.joints {
            by_parent.entry(joint.parent.as_str()).or_default().push(joint);
        }

        let mut welds = Vec::with_capacity(self.joints.len());
        let mut queue = VecDeque::from([self.root_link.as_str()]);
        while let Some(link) = queue.pop_front() {
            for joint in by_parent.get(link).into_iter().flatten() {
                if joint.joint_type.is_movable() {
                    tracing::debug!(
                        "Joint '{}' ({:?}) welded at zero position",
                        joint.name,
                        joint.joint_type
                    );
                }
                welds.push(Weld::from_pose(&joint.parent, &joint.child, &joint.origin));
                queue.push_back(joint.child.as_str());
            }
        }
        welds
    }
}
