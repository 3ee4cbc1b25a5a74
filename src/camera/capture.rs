use anyhow::{Context, Result};
use opencv::{
    core::{self, Mat},
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureAPIs, VideoCaptureTrait},
};
use tracing::info;

use crate::config::CameraConfig;

/// OpenCVを使用したWebカメラ
pub struct OpenCvCamera {
    capture: VideoCapture,
    width: u32,
    height: u32,
    flip: bool,
}

impl OpenCvCamera {
    pub fn from_config(config: &CameraConfig) -> Result<Self> {
        Self::open(config.index, config.width, config.height, config.flip)
    }

    /// 解像度を指定してカメラを開く。実際の解像度はドライバ次第
    pub fn open(index: i32, width: u32, height: u32, flip: bool) -> Result<Self> {
        let mut capture = VideoCapture::new(index, VideoCaptureAPIs::CAP_ANY as i32)
            .with_context(|| format!("Failed to open camera {}", index))?;

        if !capture.is_opened()? {
            anyhow::bail!("Camera {} is not available", index);
        }

        capture.set(videoio::CAP_PROP_FRAME_WIDTH, width as f64)?;
        capture.set(videoio::CAP_PROP_FRAME_HEIGHT, height as f64)?;
        // 古いフレームを溜めない
        capture.set(videoio::CAP_PROP_BUFFERSIZE, 1.0)?;

        let actual_width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let actual_height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        info!(
            "Camera {}: {}x{} (requested {}x{}), flip={}",
            index, actual_width, actual_height, width, height, flip
        );

        Ok(Self {
            capture,
            width: actual_width,
            height: actual_height,
            flip,
        })
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// フレームを読み込む（BGR、flip有効なら鏡像）
    pub fn read_frame(&mut self) -> Result<Mat> {
        let mut frame = Mat::default();
        self.capture
            .read(&mut frame)
            .context("Failed to read frame")?;

        if frame.empty() {
            anyhow::bail!("Empty frame received");
        }

        if !self.flip {
            return Ok(frame);
        }
        let mut mirrored = Mat::default();
        core::flip(&frame, &mut mirrored, 1)?;
        Ok(mirrored)
    }
}
