use std::time::Duration;

/// サンプルが得られなかった理由。常に回復可能（そのティックを飛ばし次で再試行）
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    #[error("classifier failed: {0}")]
    Classifier(String),
    #[error("classifier did not answer within {0:?}")]
    Timeout(Duration),
    #[error("previous classification still in flight")]
    Busy,
    #[error("classifier returned no candidates")]
    NoCandidates,
    #[error("classifier worker stopped")]
    WorkerGone,
}

/// 表示先が反映の一部を実行できなかった
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    #[error("no gesture target to style")]
    NoTarget,
    #[error("sound `{0}` is not available")]
    MissingSound(String),
}

/// 設定の問題。ループ開始前の起動時に致命的
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("confidence threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f32),
    #[error("sample interval must be greater than zero")]
    ZeroInterval,
    #[error("classifier timeout must be greater than zero")]
    ZeroTimeout,
    #[error("idle label must not be empty")]
    EmptyIdleLabel,
    #[error("binding #{0} has an empty label")]
    EmptyLabel(usize),
    #[error("label `{0}` is bound more than once")]
    DuplicateBinding(String),
    #[error("label `{0}` is the idle label and cannot carry a binding")]
    BindingIsIdle(String),
    #[error("`{class}` is not a usable class name for label `{label}`")]
    InvalidClassName { label: String, class: String },
    #[error("labels `{first}` and `{second}` both map to class `{class}`")]
    DuplicateClass {
        class: String,
        first: String,
        second: String,
    },
    #[error("binding for `{0}` has an empty sound id")]
    EmptySound(String),
}
