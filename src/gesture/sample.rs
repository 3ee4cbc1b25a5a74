use serde::Deserialize;

/// セッション開始からの経過ミリ秒（単調）
pub type Millis = u64;

/// 分類結果の1候補
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// クラス確率 (0.0〜1.0)
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// 1回のサンプリングで最も確率の高かった候補
#[derive(Debug, Clone, PartialEq)]
pub struct GestureSample {
    pub label: String,
    pub confidence: f32,
    pub timestamp: Millis,
}

impl GestureSample {
    pub fn new(label: impl Into<String>, confidence: f32, timestamp: Millis) -> Self {
        Self {
            label: label.into(),
            confidence,
            timestamp,
        }
    }

    /// 最大信頼度の候補。同点なら先の候補、NaN は選ばない
    pub fn from_predictions(predictions: &[Prediction], timestamp: Millis) -> Option<Self> {
        let mut best: Option<&Prediction> = None;
        for p in predictions {
            if p.confidence.is_nan() {
                continue;
            }
            match best {
                Some(b) if p.confidence <= b.confidence => {}
                _ => best = Some(p),
            }
        }
        best.map(|p| Self::new(p.label.clone(), p.confidence, timestamp))
    }
}
