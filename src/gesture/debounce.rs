//! ジェスチャーのデバウンス
//!
//! サンプルごとにぶれる分類結果を、間隔の空いた離散イベントに変換する。
//! 信頼度の下限、同じジェスチャーの継続の抑制、確定間のクールダウンの3段

use tracing::{debug, info};

use crate::config::DebounceConfig;

use super::sample::{GestureSample, Millis};

/// 現在有効とみなしているジェスチャー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureState {
    /// 確信のあるジェスチャーなし。表示は最後の状態のまま
    Idle,
    /// 最後に確定したジェスチャー
    Active(String),
}

/// 確定したジェスチャーの遷移
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureEvent {
    pub label: String,
    pub timestamp: Millis,
}

pub struct Debouncer {
    confidence_threshold: f32,
    cooldown_ms: Millis,
    idle_label: String,
    state: GestureState,
    last_event: Option<Millis>,
}

impl Debouncer {
    pub fn new(confidence_threshold: f32, cooldown_ms: Millis, idle_label: impl Into<String>) -> Self {
        Self {
            confidence_threshold,
            cooldown_ms,
            idle_label: idle_label.into(),
            state: GestureState::Idle,
            last_event: None,
        }
    }

    pub fn from_config(config: &DebounceConfig) -> Self {
        Self::new(
            config.confidence_threshold,
            config.cooldown_ms,
            config.idle_label.clone(),
        )
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// 現在のラベル。Idle のときは idle ラベル
    pub fn current_label(&self) -> &str {
        match &self.state {
            GestureState::Idle => &self.idle_label,
            GestureState::Active(label) => label,
        }
    }

    pub fn last_event_time(&self) -> Option<Millis> {
        self.last_event
    }

    /// 信頼度が閾値以上か。NaN は常に false
    pub fn is_confident(&self, sample: &GestureSample) -> bool {
        sample.confidence >= self.confidence_threshold
    }

    /// サンプルを1つ受け取り、遷移が確定したときだけイベントを返す
    ///
    /// クールダウン中のサンプルは状態を変えない。押し続けたジェスチャーは
    /// クールダウン明けにすぐ確定する
    pub fn accept(&mut self, sample: &GestureSample) -> Option<GestureEvent> {
        if !self.is_confident(sample) || sample.label == self.idle_label {
            if self.state != GestureState::Idle {
                debug!(
                    "idle at {} ({} {:.2})",
                    sample.timestamp, sample.label, sample.confidence
                );
            }
            self.state = GestureState::Idle;
            return None;
        }

        if matches!(&self.state, GestureState::Active(label) if *label == sample.label) {
            return None;
        }

        if let Some(last) = self.last_event {
            let elapsed = sample.timestamp.saturating_sub(last);
            if elapsed < self.cooldown_ms {
                debug!(
                    "{} blocked by cooldown ({}ms < {}ms)",
                    sample.label, elapsed, self.cooldown_ms
                );
                return None;
            }
        }

        info!(
            "gesture {} at {} ({:.2})",
            sample.label, sample.timestamp, sample.confidence
        );
        self.state = GestureState::Active(sample.label.clone());
        self.last_event = Some(sample.timestamp);
        Some(GestureEvent {
            label: sample.label.clone(),
            timestamp: sample.timestamp,
        })
    }

    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.last_event = None;
    }
}
