/// Named joint configurations and the demo motion
use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4};

use armvis_core::KinematicModel;

/// Fraction of each joint's half-range swept by the demo motion.
const DEMO_AMPLITUDE_SCALE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub angles: [f64; 6],
}

pub const PRESETS: [Preset; 5] = [
    Preset {
        name: "home",
        description: "All joints at zero",
        angles: [0.0; 6],
    },
    Preset {
        name: "config1",
        description: "Elbow folded, wrist turned down",
        angles: [0.0, -FRAC_PI_2, -FRAC_PI_3, -FRAC_PI_4, -FRAC_PI_2, 0.0],
    },
    Preset {
        name: "vertical",
        description: "Arm pointing straight up",
        angles: [0.0, -FRAC_PI_2, 0.0, 0.0, 0.0, 0.0],
    },
    Preset {
        name: "forward",
        description: "Arm reaching forward",
        angles: [0.0, -FRAC_PI_4, -FRAC_PI_4, -FRAC_PI_4, 0.0, 0.0],
    },
    Preset {
        name: "side",
        description: "Arm reaching to the side",
        angles: [FRAC_PI_2, -FRAC_PI_4, -FRAC_PI_4, -FRAC_PI_4, 0.0, 0.0],
    },
];

pub fn find(name: &str) -> Option<(usize, &'static Preset)> {
    PRESETS
        .iter()
        .enumerate()
        .find(|(_, preset)| preset.name.eq_ignore_ascii_case(name))
}

impl Preset {
    /// Angles sized to `joint_count`: extra joints stay at zero, surplus
    /// values are dropped.
    pub fn angles_for(&self, joint_count: usize) -> Vec<f64> {
        let mut angles = vec![0.0; joint_count];
        for (slot, value) in angles.iter_mut().zip(self.angles) {
            *slot = value;
        }
        angles
    }
}

/// Demo pose at time `t` (seconds): joint `j` swings about the middle of its
/// range at `0.5 + 0.2 j` rad/s.
pub fn demo_angles(model: &KinematicModel, t: f64) -> Vec<f64> {
    model
        .joints()
        .iter()
        .enumerate()
        .map(|(j, joint)| {
            let amplitude = joint.limits.span() / 2.0;
            let frequency = 0.5 + 0.2 * j as f64;
            joint.limits.center() + DEMO_AMPLITUDE_SCALE * amplitude * (frequency * t).sin()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use armvis_core::{JointKind, JointLimits, JointSpec, LinkSpec};

    fn model() -> KinematicModel {
        let joints = vec![
            JointSpec::new("a", JointKind::Revolute, "l0", "l1")
                .with_limits(JointLimits::new(-2.0, 2.0)),
            JointSpec::new("b", JointKind::Revolute, "l1", "l2")
                .with_limits(JointLimits::new(0.0, 1.0)),
        ];
        let links = vec![LinkSpec::new("l0"), LinkSpec::new("l1"), LinkSpec::new("l2")];
        KinematicModel::new(None, joints, links)
    }

    #[test]
    fn test_find_preset() {
        let (index, preset) = find("Vertical").expect("known preset");
        assert_eq!(index, 2);
        assert_eq!(preset.angles[1], -FRAC_PI_2);
        assert!(find("cartwheel").is_none());
    }

    #[test]
    fn test_angles_for_other_joint_counts() {
        let side = &PRESETS[4];
        assert_eq!(side.angles_for(2), vec![FRAC_PI_2, -FRAC_PI_4]);
        let padded = side.angles_for(8);
        assert_eq!(padded.len(), 8);
        assert_eq!(&padded[6..], &[0.0, 0.0]);
    }

    #[test]
    fn test_demo_starts_at_range_center() {
        let angles = demo_angles(&model(), 0.0);
        assert_eq!(angles, vec![0.0, 0.5]);
    }

    #[test]
    fn test_demo_stays_inside_limits() {
        let model = model();
        for step in 0..500 {
            let angles = demo_angles(&model, step as f64 * 0.05);
            for (angle, joint) in angles.iter().zip(model.joints()) {
                assert!(*angle >= joint.limits.lower && *angle <= joint.limits.upper);
            }
        }
    }
}
