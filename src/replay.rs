//! 分類結果の記録 (JSON Lines) をカメラなしで再生する
//!
//! 1行1フレーム: `{"t": 1200, "predictions": [{"label": "Duimpie", "confidence": 0.97}]}`
//! 空行と `#` で始まる行は読み飛ばす

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::io::BufRead;

use crate::classify::RecordedClassifier;
use crate::effect::Presenter;
use crate::gesture::{GestureEvent, Millis, Prediction};
use crate::session::GestureSession;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecordedFrame {
    pub t: Millis,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

/// 全行を読み込む。時刻が戻る行はエラー
pub fn read_recording<R: BufRead>(reader: R) -> Result<Vec<RecordedFrame>> {
    let mut frames: Vec<RecordedFrame> = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.with_context(|| format!("line {}: read failed", line_no))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let frame: RecordedFrame = serde_json::from_str(trimmed)
            .with_context(|| format!("line {}: invalid frame", line_no))?;
        if let Some(prev) = frames.last() {
            if frame.t < prev.t {
                bail!("line {}: t={} goes back from t={}", line_no, frame.t, prev.t);
            }
        }
        frames.push(frame);
    }
    Ok(frames)
}

/// 全フレームをセッションに流し、確定したジェスチャーを集める
pub fn replay<P: Presenter>(
    session: &mut GestureSession<RecordedClassifier, P>,
    frames: &[RecordedFrame],
) -> Vec<GestureEvent> {
    frames
        .iter()
        .filter_map(|frame| session.tick(frame.t, &frame.predictions))
        .collect()
}
