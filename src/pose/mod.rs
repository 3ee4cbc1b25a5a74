#[cfg(feature = "desktop")]
pub mod detector;
pub mod keypoint;
#[cfg(feature = "desktop")]
pub mod preprocess;

#[cfg(feature = "desktop")]
pub use detector::PoseDetector;
pub use keypoint::{Keypoint, KeypointIndex, Pose};
#[cfg(feature = "desktop")]
pub use preprocess::preprocess_for_movenet;
