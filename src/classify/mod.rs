//! 分類器
//!
//! サンプラーが必要とするのは「フレームを渡すと候補一覧が返る」ことだけ。
//! モデル形式や推論バックエンドはこのトレイトの向こう側に置く

pub mod metadata;
#[cfg(feature = "desktop")]
pub mod onnx;
pub mod recorded;
pub mod worker;

use crate::error::SampleError;
use crate::gesture::Prediction;

pub use metadata::ModelMetadata;
#[cfg(feature = "desktop")]
pub use onnx::{LatestPose, PoseClassifier};
pub use recorded::RecordedClassifier;
pub use worker::ThreadedClassifier;

pub trait Classifier {
    type Frame;

    fn classify(&mut self, frame: &Self::Frame) -> Result<Vec<Prediction>, SampleError>;
}
