use tracing::{debug, warn};

use crate::classify::Classifier;
use crate::config::SamplerConfig;
use crate::error::SampleError;
use crate::gesture::{GestureSample, Millis};

/// 分類を一定間隔に間引く。ループの周期には依存しない
pub struct Sampler {
    interval_ms: Millis,
    last_sample: Option<Millis>,
}

impl Sampler {
    pub fn new(interval_ms: Millis) -> Self {
        Self {
            interval_ms,
            last_sample: None,
        }
    }

    pub fn from_config(config: &SamplerConfig) -> Self {
        Self::new(config.interval_ms)
    }

    pub fn last_sample_time(&self) -> Option<Millis> {
        self.last_sample
    }

    pub fn is_due(&self, now: Millis) -> bool {
        match self.last_sample {
            Some(last) => now.saturating_sub(last) >= self.interval_ms,
            None => true,
        }
    }

    /// 間隔が経過していれば `frame` を分類する
    ///
    /// 失敗・候補なし・処理中 (Busy) のときは何も返さず、タイマーも進めない。
    /// 次のティックで再試行される
    pub fn tick<C: Classifier>(
        &mut self,
        now: Millis,
        frame: &C::Frame,
        classifier: &mut C,
    ) -> Option<GestureSample> {
        if !self.is_due(now) {
            return None;
        }

        let result = classifier
            .classify(frame)
            .and_then(|predictions| {
                GestureSample::from_predictions(&predictions, now).ok_or(SampleError::NoCandidates)
            });

        match result {
            Ok(sample) => {
                self.last_sample = Some(now);
                debug!("sample {} {:.2} at {}", sample.label, sample.confidence, now);
                Some(sample)
            }
            Err(SampleError::Busy) => {
                debug!("tick at {} dropped, classification in flight", now);
                None
            }
            Err(e) => {
                warn!("sample skipped: {}", e);
                None
            }
        }
    }
}
