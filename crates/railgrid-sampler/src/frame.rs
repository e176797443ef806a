use railgrid_core::Pose;

/// Express a world-frame tool pose in the rail base frame, with the TCP
/// offset removed so the result targets the arm's kinematic tip.
pub fn tool_pose_in_rail_frame(tool_pose: &Pose, world_to_rail_base: &Pose, tcp_offset: &Pose) -> Pose {
    world_to_rail_base.inverse() * tool_pose * tcp_offset.inverse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion, Vector3};
    use railgrid_test_utils::{random_pose, seeded_rng};

    #[test]
    fn identity_frames_leave_pose_unchanged() {
        let pose = Pose::from_parts(
            Translation3::new(0.4, -0.2, 1.0),
            UnitQuaternion::from_euler_angles(0.1, 0.0, 0.5),
        );
        let out = tool_pose_in_rail_frame(&pose, &Pose::identity(), &Pose::identity());
        assert_relative_eq!(out, pose, epsilon = 1e-12);
    }

    #[test]
    fn removes_rail_base_translation() {
        let tool = Pose::translation(2.0, 1.0, 0.5);
        let base = Pose::translation(1.5, 1.0, 0.0);
        let out = tool_pose_in_rail_frame(&tool, &base, &Pose::identity());
        assert_relative_eq!(out.translation.vector, Vector3::new(0.5, 0.0, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn removes_tcp_offset_along_tool_axis() {
        // Tool pointing down (-Z world); TCP 0.1 m along the tool's +Z
        let tool = Pose::from_parts(
            Translation3::new(1.0, 0.0, 0.2),
            UnitQuaternion::from_euler_angles(std::f64::consts::PI, 0.0, 0.0),
        );
        let tcp = Pose::translation(0.0, 0.0, 0.1);
        let out = tool_pose_in_rail_frame(&tool, &Pose::identity(), &tcp);
        // The kinematic tip sits 0.1 m above the tool point
        assert_relative_eq!(out.translation.vector, Vector3::new(1.0, 0.0, 0.3), epsilon = 1e-12);
    }

    #[test]
    fn recomposes_to_world_tool_pose() {
        let tool = Pose::from_parts(
            Translation3::new(0.3, 0.7, -0.1),
            UnitQuaternion::from_euler_angles(0.2, -0.3, 1.1),
        );
        let base = Pose::from_parts(
            Translation3::new(-1.0, 0.5, 0.2),
            UnitQuaternion::from_euler_angles(0.0, 0.0, 0.8),
        );
        let tcp = Pose::from_parts(
            Translation3::new(0.0, 0.02, 0.15),
            UnitQuaternion::from_euler_angles(0.0, 0.1, 0.0),
        );
        let tip = tool_pose_in_rail_frame(&tool, &base, &tcp);
        assert_relative_eq!(base * tip * tcp, tool, epsilon = 1e-12);
    }

    #[test]
    fn recomposes_random_frames() {
        let mut rng = seeded_rng(21);
        for _ in 0..100 {
            let tool = random_pose(&mut rng, 3.0);
            let base = random_pose(&mut rng, 5.0);
            let tcp = random_pose(&mut rng, 0.3);
            let tip = tool_pose_in_rail_frame(&tool, &base, &tcp);
            assert_relative_eq!(base * tip * tcp, tool, epsilon = 1e-9);
        }
    }
}
