//! ONNXによる姿勢分類
//!
//! MoveNet のキーポイントを、`metadata.json` と一緒に出力された小さな分類ヘッドに入力する

use anyhow::{Context, Result};
use ndarray::Array2;
use opencv::core::Mat;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::config::ModelConfig;
use crate::error::SampleError;
use crate::gesture::Prediction;
use crate::pose::{preprocess_for_movenet, Pose, PoseDetector};

use super::{Classifier, ModelMetadata};

pub fn load_session(path: &Path) -> Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .commit_from_file(path)
        .with_context(|| format!("Failed to load ONNX model {}", path.display()))?;
    Ok(session)
}

/// 1入力1出力モデルの入力名と出力名
pub fn first_input_output(session: &Session) -> Result<(String, String)> {
    let input = session
        .inputs
        .first()
        .context("Model has no inputs")?
        .name
        .clone();
    let output = session
        .outputs
        .first()
        .context("Model has no outputs")?
        .name
        .clone();
    Ok((input, output))
}

/// 分類ヘッド: 姿勢特徴 `[1, 51]` → クラス確率 `[1, N]`
pub struct ClassifierHead {
    session: Session,
    input_name: String,
    output_name: String,
    labels: Vec<String>,
}

impl ClassifierHead {
    pub fn new<P: AsRef<Path>>(model_path: P, metadata: ModelMetadata) -> Result<Self> {
        let session = load_session(model_path.as_ref())?;
        let (input_name, output_name) = first_input_output(&session)?;
        Ok(Self {
            session,
            input_name,
            output_name,
            labels: metadata.labels,
        })
    }

    pub fn predict(&mut self, pose: &Pose) -> Result<Vec<Prediction>> {
        let features = Array2::from_shape_vec((1, Pose::FEATURE_LEN), pose.features().to_vec())?;
        let input_tensor = Tensor::from_array(features)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .context("Classifier inference failed")?;

        let output: ndarray::ArrayViewD<f32> = outputs[self.output_name.as_str()]
            .try_extract_array()
            .context("Failed to extract class probabilities")?;
        if output.len() != self.labels.len() {
            anyhow::bail!(
                "Classifier returned {} scores for {} labels",
                output.len(),
                self.labels.len()
            );
        }

        Ok(self
            .labels
            .iter()
            .zip(output.iter())
            .map(|(label, p)| Prediction::new(label.clone(), p.clamp(0.0, 1.0)))
            .collect())
    }
}

/// 最新の推定姿勢。分類スレッドの外から読める
#[derive(Clone, Default)]
pub struct LatestPose(Arc<Mutex<Option<Pose>>>);

impl LatestPose {
    pub fn get(&self) -> Option<Pose> {
        self.0.lock().ok().and_then(|guard| guard.clone())
    }

    fn set(&self, pose: Pose) {
        if let Ok(mut guard) = self.0.lock() {
            *guard = Some(pose);
        }
    }
}

/// カメラ画像 → 姿勢 → ジェスチャー確率
pub struct PoseClassifier {
    detector: PoseDetector,
    head: ClassifierHead,
    latest_pose: LatestPose,
}

impl PoseClassifier {
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let metadata = ModelMetadata::load(&config.metadata)?;
        info!(
            "Gesture model {} with {} classes: {:?}",
            metadata.model_name.as_deref().unwrap_or("(unnamed)"),
            metadata.class_count(),
            metadata.labels
        );
        let detector = PoseDetector::new(&config.pose_model)?;
        let head = ClassifierHead::new(&config.classifier_model, metadata)?;
        Ok(Self {
            detector,
            head,
            latest_pose: LatestPose::default(),
        })
    }

    /// 直近の分類に使った姿勢へのハンドル。分類器をワーカースレッドに移した後も有効
    pub fn latest_pose(&self) -> LatestPose {
        self.latest_pose.clone()
    }

    fn predict(&mut self, frame: &Mat) -> Result<Vec<Prediction>> {
        let input = preprocess_for_movenet(frame)?;
        let pose = self.detector.detect(input)?;
        debug!("pose confidence {:.2}", pose.average_confidence());
        let predictions = self.head.predict(&pose)?;
        self.latest_pose.set(pose);
        Ok(predictions)
    }
}

impl Classifier for PoseClassifier {
    type Frame = Mat;

    fn classify(&mut self, frame: &Mat) -> Result<Vec<Prediction>, SampleError> {
        self.predict(frame)
            .map_err(|e| SampleError::Classifier(format!("{:#}", e)))
    }
}
