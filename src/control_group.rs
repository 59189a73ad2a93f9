//! Control group definitions and per-group read views.

use crate::error::Error;
use crate::message::JointFeedback;
use crate::state::StateClient;
use crate::{MOT_MAX_GR, ROS_MAX_JOINT};

/// Static description of one control group: an independently addressable set of joints,
/// typically a robot arm or a positioner.
///
/// Created once at facade construction and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlGroupDefinition {
    groupid: String,
    groupno: i32,
    num_joints: usize,
    joint_names: Vec<String>,
}

impl ControlGroupDefinition {
    /// Define a group. `joint_names` must have exactly `num_joints` entries, `num_joints`
    /// must fit a joint vector and `groupno` must be a valid group slot.
    pub fn new(
        groupid: impl Into<String>,
        groupno: i32,
        num_joints: usize,
        joint_names: Vec<impl Into<String>>,
    ) -> Result<Self, Error> {
        if !(0..MOT_MAX_GR as i32).contains(&groupno) {
            return Err(Error::InvalidGroupDefinition {
                reason: "groupno must be in 0..4",
            });
        }

        if !(1..=ROS_MAX_JOINT).contains(&num_joints) {
            return Err(Error::InvalidGroupDefinition {
                reason: "num_joints must be in 1..=10",
            });
        }

        if joint_names.len() != num_joints {
            return Err(Error::InvalidGroupDefinition {
                reason: "joint_names must have num_joints entries",
            });
        }

        Ok(Self {
            groupid: groupid.into(),
            groupno,
            num_joints,
            joint_names: joint_names.into_iter().map(Into::into).collect(),
        })
    }

    /// The caller-chosen group identifier, e.g. `"R1"`.
    pub fn groupid(&self) -> &str {
        &self.groupid
    }

    /// The controller's group number, zero based.
    pub fn groupno(&self) -> i32 {
        self.groupno
    }

    /// Number of joints actually present in this group.
    pub fn num_joints(&self) -> usize {
        self.num_joints
    }

    /// Joint names, base to tool order.
    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }
}

/// Read-only view of one control group, combining its definition with the latest state
/// snapshots.
///
/// Joint vectors on the wire are always ten entries long; this view slices them down to the
/// group's real joint count.
#[derive(Debug, Clone, Copy)]
pub struct ControlGroup<'robot> {
    def: &'robot ControlGroupDefinition,
    state: Option<&'robot StateClient>,
}

impl<'robot> ControlGroup<'robot> {
    pub(crate) fn new(
        def: &'robot ControlGroupDefinition,
        state: Option<&'robot StateClient>,
    ) -> Self {
        Self { def, state }
    }

    /// The group definition.
    pub fn definition(&self) -> &ControlGroupDefinition {
        self.def
    }

    /// The controller's group number, zero based.
    pub fn groupno(&self) -> i32 {
        self.def.groupno
    }

    /// Number of joints actually present in this group.
    pub fn num_joints(&self) -> usize {
        self.def.num_joints
    }

    /// Joint names, base to tool order.
    pub fn joint_names(&self) -> &[String] {
        &self.def.joint_names
    }

    fn feedback(&self) -> Option<JointFeedback> {
        self.state?.joint_feedback(self.def.groupno)
    }

    /// Latest joint positions, radians, sliced to the group's joint count. `None` until the
    /// state subscriber has seen feedback for this group.
    pub fn position(&self) -> Option<Vec<f32>> {
        self.feedback()
            .map(|feedback| feedback.pos[..self.def.num_joints].to_vec())
    }

    /// Latest joint velocities, rad/s.
    pub fn velocity(&self) -> Option<Vec<f32>> {
        self.feedback()
            .map(|feedback| feedback.vel[..self.def.num_joints].to_vec())
    }

    /// Latest joint accelerations, rad/s².
    pub fn acceleration(&self) -> Option<Vec<f32>> {
        self.feedback()
            .map(|feedback| feedback.acc[..self.def.num_joints].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_validates_joint_name_count() {
        assert!(ControlGroupDefinition::new("R1", 0, 6, vec!["s", "l", "u", "r", "b", "t"]).is_ok());

        assert!(matches!(
            ControlGroupDefinition::new("R1", 0, 6, vec!["s", "l"]),
            Err(Error::InvalidGroupDefinition { .. })
        ));
    }

    #[test]
    fn definition_validates_ranges() {
        assert!(matches!(
            ControlGroupDefinition::new("B1", 4, 1, vec!["b"]),
            Err(Error::InvalidGroupDefinition { .. })
        ));

        assert!(matches!(
            ControlGroupDefinition::new("R1", 0, 11, vec!["x"; 11]),
            Err(Error::InvalidGroupDefinition { .. })
        ));
    }
}
