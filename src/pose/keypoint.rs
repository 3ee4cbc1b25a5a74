/// MoveNet の 17 キーポイントインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl KeypointIndex {
    pub const COUNT: usize = 17;
}

/// 単一キーポイント（正規化座標）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    pub fn is_valid(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }

    /// ピクセル座標に変換
    pub fn to_pixel(&self, width: u32, height: u32) -> (i32, i32) {
        let px = (self.x * width as f32) as i32;
        let py = (self.y * height as f32) as i32;
        (px, py)
    }
}

/// 17キーポイントからなる姿勢
#[derive(Debug, Clone, Default)]
pub struct Pose {
    pub keypoints: [Keypoint; KeypointIndex::COUNT],
}

impl Pose {
    /// [`Pose::features`] の長さ（分類ヘッドの入力幅）
    pub const FEATURE_LEN: usize = KeypointIndex::COUNT * 3;

    pub fn new(keypoints: [Keypoint; KeypointIndex::COUNT]) -> Self {
        Self { keypoints }
    }

    pub fn get(&self, index: KeypointIndex) -> &Keypoint {
        &self.keypoints[index as usize]
    }

    /// キーポイント順に `[x, y, confidence]` を並べた特徴量（分類ヘッドの入力）
    pub fn features(&self) -> [f32; Self::FEATURE_LEN] {
        let mut out = [0.0; Self::FEATURE_LEN];
        for (i, kp) in self.keypoints.iter().enumerate() {
            out[i * 3] = kp.x;
            out[i * 3 + 1] = kp.y;
            out[i * 3 + 2] = kp.confidence;
        }
        out
    }

    pub fn average_confidence(&self) -> f32 {
        let sum: f32 = self.keypoints.iter().map(|k| k.confidence).sum();
        sum / KeypointIndex::COUNT as f32
    }
}
