use anyhow::{Context, Result};
use ndarray::Array4;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

use super::keypoint::{Keypoint, KeypointIndex, Pose};
use crate::classify::onnx::{load_session, first_input_output};

/// MoveNet を使用した姿勢推定器
pub struct PoseDetector {
    session: Session,
    input_name: String,
    output_name: String,
}

impl PoseDetector {
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let session = load_session(model_path.as_ref()).context("Failed to load pose model")?;
        let (input_name, output_name) = first_input_output(&session)?;
        Ok(Self {
            session,
            input_name,
            output_name,
        })
    }

    /// 入力: [1, 192, 192, 3] の f32 テンソル
    /// 出力: Pose (17キーポイント)
    pub fn detect(&mut self, input: Array4<f32>) -> Result<Pose> {
        let input_tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .context("Pose inference failed")?;

        // MoveNet の出力は [1, 1, 17, 3] (y, x, confidence)
        let output: ndarray::ArrayViewD<f32> = outputs[self.output_name.as_str()]
            .try_extract_array()
            .context("Failed to extract pose tensor")?;
        if output.len() < KeypointIndex::COUNT * 3 {
            anyhow::bail!("Unexpected pose output shape {:?}", output.shape());
        }

        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        for (i, kp) in keypoints.iter_mut().enumerate() {
            let y = output[[0, 0, i, 0]];
            let x = output[[0, 0, i, 1]];
            *kp = Keypoint::new(x, y, output[[0, 0, i, 2]]);
        }

        Ok(Pose::new(keypoints))
    }
}
