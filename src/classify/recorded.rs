use crate::error::SampleError;
use crate::gesture::Prediction;

use super::Classifier;

/// 「フレーム」が分類済みの候補一覧である分類器（記録の再生用）
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordedClassifier;

impl Classifier for RecordedClassifier {
    type Frame = Vec<Prediction>;

    fn classify(&mut self, frame: &Vec<Prediction>) -> Result<Vec<Prediction>, SampleError> {
        Ok(frame.clone())
    }
}
