use std::time::Instant;
use tracing::debug;

use crate::classify::Classifier;
use crate::config::Config;
use crate::effect::{EffectDispatcher, Presenter};
use crate::gesture::{BindingTable, Debouncer, GestureEvent, GestureSample, GestureState, Millis};
use crate::sampler::Sampler;

/// セッション開始からの単調時計（ミリ秒）
pub struct SessionClock {
    start: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> Millis {
        self.start.elapsed().as_millis() as Millis
    }
}

/// 1本の分類ストリーム: サンプラー → デバウンサー → 反映
///
/// 実行中の状態はすべてここに持つ。グローバル状態は無い
pub struct GestureSession<C, P> {
    sampler: Sampler,
    debouncer: Debouncer,
    dispatcher: EffectDispatcher,
    classifier: C,
    presenter: P,
    last_sample: Option<GestureSample>,
}

impl<C: Classifier, P: Presenter> GestureSession<C, P> {
    pub fn new(
        sampler: Sampler,
        debouncer: Debouncer,
        dispatcher: EffectDispatcher,
        classifier: C,
        presenter: P,
    ) -> Self {
        Self {
            sampler,
            debouncer,
            dispatcher,
            classifier,
            presenter,
            last_sample: None,
        }
    }

    /// 検証済みの設定を渡すこと
    pub fn from_config(config: &Config, classifier: C, presenter: P) -> Self {
        Self::new(
            Sampler::from_config(&config.sampler),
            Debouncer::from_config(&config.debounce),
            EffectDispatcher::new(BindingTable::from_config(&config.bindings)),
            classifier,
            presenter,
        )
    }

    /// ループ1回分。このティックで確定したジェスチャーを返す（反映済み）
    ///
    /// 閾値を超えたサンプルはデバウンスとは別に「検出中」表示へ送る
    pub fn tick(&mut self, now: Millis, frame: &C::Frame) -> Option<GestureEvent> {
        let sample = self.sampler.tick(now, frame, &mut self.classifier)?;
        if self.debouncer.is_confident(&sample) {
            if let Err(e) = self.presenter.show_detection(&sample.label, sample.confidence) {
                debug!("detection not shown: {}", e);
            }
        }
        let event = self.debouncer.accept(&sample);
        self.last_sample = Some(sample);

        let event = event?;
        self.dispatcher.dispatch(&event, &mut self.presenter);
        Some(event)
    }

    /// 直近にサンプラーが出したサンプル（信頼度に関係なく）
    pub fn last_sample(&self) -> Option<&GestureSample> {
        self.last_sample.as_ref()
    }

    pub fn state(&self) -> &GestureState {
        self.debouncer.state()
    }

    pub fn current_label(&self) -> &str {
        self.debouncer.current_label()
    }

    pub fn active_class(&self) -> Option<&str> {
        self.dispatcher.active_class()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RecordedClassifier;
    use crate::config::BindingConfig;
    use crate::effect::LogPresenter;
    use crate::gesture::Prediction;

    fn config() -> Config {
        let mut config = Config::default();
        config.bindings = vec![
            BindingConfig {
                label: "Duimpie".to_string(),
                sound: Some("my_sounds/mars.mp3".to_string()),
                css_class: None,
            },
            BindingConfig {
                label: "Class 2".to_string(),
                sound: Some("my_sounds/snickers.mp3".to_string()),
                css_class: None,
            },
        ];
        config
    }

    fn session() -> GestureSession<RecordedClassifier, LogPresenter> {
        GestureSession::from_config(&config(), RecordedClassifier, LogPresenter::new())
    }

    fn ranked(a: f32, b: f32) -> Vec<Prediction> {
        vec![Prediction::new("Duimpie", a), Prediction::new("Class 2", b)]
    }

    #[test]
    fn test_event_reaches_presenter() {
        let mut s = session();
        let event = s.tick(0, &ranked(0.95, 0.05)).unwrap();
        assert_eq!(event.label, "Duimpie");
        assert_eq!(s.presenter().active_class(), Some("active-duimpie"));
        assert_eq!(s.presenter().current_sound(), Some("my_sounds/mars.mp3"));
        assert_eq!(s.active_class(), Some("active-duimpie"));
    }

    #[test]
    fn test_ticks_between_samples_do_nothing() {
        let mut s = session();
        s.tick(0, &ranked(0.05, 0.95));
        // サンプル間隔内のフレームは見ない
        assert!(s.tick(100, &ranked(0.95, 0.05)).is_none());
        assert_eq!(s.current_label(), "Class 2");
    }

    #[test]
    fn test_idle_freezes_presentation() {
        let mut s = session();
        s.tick(0, &ranked(0.95, 0.05));
        assert!(s.tick(200, &ranked(0.5, 0.5)).is_none());
        assert_eq!(s.state(), &GestureState::Idle);
        assert_eq!(s.presenter().active_class(), Some("active-duimpie"));
    }

    #[test]
    fn test_full_sequence() {
        let mut s = session();
        let mut events = Vec::new();
        let mut t = 0;
        // 約60fpsのティック、サンプルは208msごと
        // Duimpie 1秒 → Class 2 3秒 → Duimpie 2秒
        for (frame, duration) in [
            (ranked(0.97, 0.03), 1000),
            (ranked(0.02, 0.98), 3000),
            (ranked(0.96, 0.04), 2000),
        ] {
            let end = t + duration;
            while t < end {
                if let Some(e) = s.tick(t, &frame) {
                    events.push((e.label, e.timestamp));
                }
                t += 16;
            }
        }
        assert_eq!(
            events,
            vec![
                ("Duimpie".to_string(), 0),
                ("Class 2".to_string(), 2704),
                ("Duimpie".to_string(), 5408),
            ]
        );
        assert_eq!(s.presenter().current_sound(), Some("my_sounds/mars.mp3"));
    }

    #[test]
    fn test_detection_updates_during_cooldown() {
        let mut s = session();
        assert!(s.tick(0, &ranked(0.95, 0.05)).is_some());
        assert_eq!(s.presenter().detection(), Some("Duimpie"));

        // Class 2 はクールダウンで確定しないが、検出表示は追従する
        assert!(s.tick(208, &ranked(0.04, 0.96)).is_none());
        assert_eq!(s.presenter().detection(), Some("Class 2"));
        assert_eq!(s.last_sample().map(|x| x.label.as_str()), Some("Class 2"));
        assert_eq!(s.current_label(), "Duimpie");
        assert_eq!(s.presenter().active_class(), Some("active-duimpie"));
    }

    #[test]
    fn test_low_confidence_keeps_detection() {
        let mut s = session();
        s.tick(0, &ranked(0.95, 0.05));
        assert!(s.tick(208, &ranked(0.6, 0.4)).is_none());
        assert_eq!(s.presenter().detection(), Some("Duimpie"));
        let last = s.last_sample().unwrap();
        assert_eq!(last.timestamp, 208);
        assert_eq!(last.confidence, 0.6);
    }

    #[test]
    fn test_clock_is_monotonic() {
        let clock = SessionClock::start();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
