//! 確定したジェスチャー → 表示先への反映
//!
//! 描画と音声は表示先の仕事。ここではどのクラスを有効にしてどの音を
//! 頭から鳴らすかだけを決める。表示先が実行できなかったものはログに残して飛ばす

use tracing::{debug, info, warn};

use crate::error::EffectError;
use crate::gesture::{BindingTable, GestureEvent};

/// 表示先に必要な操作
pub trait Presenter {
    /// 対象の有効クラスを置き換える。`None` で解除
    fn set_active_gesture_class(&mut self, class: Option<&str>) -> Result<(), EffectError>;

    /// `sound` を先頭から再生する。再生中の音は止める
    fn play_sound(&mut self, sound: &str) -> Result<(), EffectError>;

    /// 「Detected: ラベル」表示。クールダウン中や同じラベルの連続でも、
    /// 閾値を超えたサンプルごとに呼ばれる
    fn show_detection(&mut self, _label: &str, _confidence: f32) -> Result<(), EffectError> {
        Ok(())
    }
}

/// 実際に反映できたもの
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatched {
    pub class_applied: bool,
    pub sound_played: bool,
}

pub struct EffectDispatcher {
    bindings: BindingTable,
    active_class: Option<String>,
}

impl EffectDispatcher {
    pub fn new(bindings: BindingTable) -> Self {
        Self {
            bindings,
            active_class: None,
        }
    }

    pub fn active_class(&self) -> Option<&str> {
        self.active_class.as_deref()
    }

    pub fn dispatch<P: Presenter + ?Sized>(
        &mut self,
        event: &GestureEvent,
        presenter: &mut P,
    ) -> Dispatched {
        let mut done = Dispatched::default();
        let Some(binding) = self.bindings.get(&event.label) else {
            warn!("no binding for gesture {}", event.label);
            return done;
        };

        match presenter.set_active_gesture_class(Some(&binding.class_name)) {
            Ok(()) => {
                info!("class {} active", binding.class_name);
                self.active_class = Some(binding.class_name.clone());
                done.class_applied = true;
            }
            Err(e) => debug!("class {} not applied: {}", binding.class_name, e),
        }

        if let Some(sound) = &binding.sound {
            match presenter.play_sound(sound) {
                Ok(()) => done.sound_played = true,
                Err(e) => warn!("{}", e),
            }
        }

        done
    }
}

/// ログ出力だけの表示先（ヘッドレス用）
///
/// `has_target == false` のときは対象要素が無い状態として振る舞い、クラス変更を拒否する
pub struct LogPresenter {
    has_target: bool,
    active_class: Option<String>,
    current_sound: Option<String>,
    detection: Option<String>,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self {
            has_target: true,
            active_class: None,
            current_sound: None,
            detection: None,
        }
    }

    pub fn without_target() -> Self {
        warn!("no gesture target, class changes disabled");
        Self {
            has_target: false,
            ..Self::new()
        }
    }

    pub fn active_class(&self) -> Option<&str> {
        self.active_class.as_deref()
    }

    pub fn current_sound(&self) -> Option<&str> {
        self.current_sound.as_deref()
    }

    pub fn detection(&self) -> Option<&str> {
        self.detection.as_deref()
    }
}

impl Default for LogPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for LogPresenter {
    fn set_active_gesture_class(&mut self, class: Option<&str>) -> Result<(), EffectError> {
        if !self.has_target {
            return Err(EffectError::NoTarget);
        }
        info!(
            "target class: {} -> {}",
            self.active_class.as_deref().unwrap_or("-"),
            class.unwrap_or("-")
        );
        self.active_class = class.map(str::to_string);
        Ok(())
    }

    fn play_sound(&mut self, sound: &str) -> Result<(), EffectError> {
        if let Some(prev) = &self.current_sound {
            debug!("stopping {}", prev);
        }
        info!("playing {} from 0", sound);
        self.current_sound = Some(sound.to_string());
        Ok(())
    }

    fn show_detection(&mut self, label: &str, confidence: f32) -> Result<(), EffectError> {
        if self.detection.as_deref() != Some(label) {
            info!("Detected: {} ({:.2})", label, confidence);
            self.detection = Some(label.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureBinding;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        missing_sounds: Vec<&'static str>,
        no_target: bool,
    }

    impl Presenter for Recorder {
        fn set_active_gesture_class(&mut self, class: Option<&str>) -> Result<(), EffectError> {
            if self.no_target {
                return Err(EffectError::NoTarget);
            }
            self.calls.push(format!("class:{}", class.unwrap_or("-")));
            Ok(())
        }

        fn play_sound(&mut self, sound: &str) -> Result<(), EffectError> {
            if self.missing_sounds.iter().any(|s| *s == sound) {
                return Err(EffectError::MissingSound(sound.to_string()));
            }
            self.calls.push(format!("sound:{}", sound));
            Ok(())
        }
    }

    fn table() -> BindingTable {
        BindingTable::new([
            GestureBinding {
                label: "Duimpie".to_string(),
                sound: Some("mars".to_string()),
                class_name: "active-duimpie".to_string(),
            },
            GestureBinding {
                label: "Class 2".to_string(),
                sound: None,
                class_name: "active-class-2".to_string(),
            },
        ])
    }

    fn event(label: &str) -> GestureEvent {
        GestureEvent {
            label: label.to_string(),
            timestamp: 0,
        }
    }

    #[test]
    fn test_class_and_sound() {
        let mut dispatcher = EffectDispatcher::new(table());
        let mut sink = Recorder::default();

        let done = dispatcher.dispatch(&event("Duimpie"), &mut sink);
        assert_eq!(done, Dispatched { class_applied: true, sound_played: true });
        assert_eq!(sink.calls, vec!["class:active-duimpie", "sound:mars"]);
        assert_eq!(dispatcher.active_class(), Some("active-duimpie"));
    }

    #[test]
    fn test_class_replaced_not_stacked() {
        let mut dispatcher = EffectDispatcher::new(table());
        let mut sink = LogPresenter::new();

        dispatcher.dispatch(&event("Duimpie"), &mut sink);
        dispatcher.dispatch(&event("Class 2"), &mut sink);
        assert_eq!(sink.active_class(), Some("active-class-2"));
        assert_eq!(dispatcher.active_class(), Some("active-class-2"));
        // Class 2 には音が無いので前の音はそのまま
        assert_eq!(sink.current_sound(), Some("mars"));
    }

    #[test]
    fn test_sound_restarts_on_repeat() {
        let mut dispatcher = EffectDispatcher::new(table());
        let mut sink = Recorder::default();
        dispatcher.dispatch(&event("Duimpie"), &mut sink);
        dispatcher.dispatch(&event("Duimpie"), &mut sink);
        let plays = sink.calls.iter().filter(|c| *c == "sound:mars").count();
        assert_eq!(plays, 2);
    }

    #[test]
    fn test_missing_binding_is_noop() {
        let mut dispatcher = EffectDispatcher::new(table());
        let mut sink = Recorder::default();
        let done = dispatcher.dispatch(&event("Class 3"), &mut sink);
        assert_eq!(done, Dispatched::default());
        assert!(sink.calls.is_empty());
        assert_eq!(dispatcher.active_class(), None);
    }

    #[test]
    fn test_missing_target_still_plays_sound() {
        let mut dispatcher = EffectDispatcher::new(table());
        let mut sink = Recorder {
            no_target: true,
            ..Default::default()
        };
        let done = dispatcher.dispatch(&event("Duimpie"), &mut sink);
        assert!(!done.class_applied);
        assert!(done.sound_played);
        assert_eq!(dispatcher.active_class(), None);
    }

    #[test]
    fn test_missing_sound_keeps_class() {
        let mut dispatcher = EffectDispatcher::new(table());
        let mut sink = Recorder {
            missing_sounds: vec!["mars"],
            ..Default::default()
        };
        let done = dispatcher.dispatch(&event("Duimpie"), &mut sink);
        assert!(done.class_applied);
        assert!(!done.sound_played);
    }

    #[test]
    fn test_log_presenter_without_target() {
        let mut sink = LogPresenter::without_target();
        assert_eq!(sink.set_active_gesture_class(Some("x")), Err(EffectError::NoTarget));
        assert!(sink.play_sound("mars").is_ok());
        assert_eq!(sink.current_sound(), Some("mars"));
    }

    #[test]
    fn test_log_presenter_detection_readout() {
        let mut sink = LogPresenter::new();
        assert_eq!(sink.detection(), None);
        sink.show_detection("Class 2", 0.95).unwrap();
        sink.show_detection("Class 2", 0.97).unwrap();
        assert_eq!(sink.detection(), Some("Class 2"));
        sink.show_detection("Duimpie", 0.91).unwrap();
        assert_eq!(sink.detection(), Some("Duimpie"));
        assert_eq!(sink.active_class(), None);
    }
}
