use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::SampleError;
use crate::gesture::Prediction;

use super::Classifier;

type ClassifyResult = Result<Vec<Prediction>, SampleError>;

/// 分類器を専用スレッドで動かし、タイムアウト付きで待つ
///
/// 同時に出せる要求は1つだけ。タイムアウトした要求の結果が届くまでは
/// 以降の呼び出しが [`SampleError::Busy`] になり、遅れて届いた結果は捨てる
pub struct ThreadedClassifier<F> {
    request_tx: Sender<F>,
    result_rx: Receiver<ClassifyResult>,
    timeout: Duration,
    in_flight: bool,
    _handle: thread::JoinHandle<()>,
}

impl<F: Clone + Send + 'static> ThreadedClassifier<F> {
    pub fn spawn<C>(inner: C, timeout: Duration) -> Self
    where
        C: Classifier<Frame = F> + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<F>();
        let (result_tx, result_rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let mut inner = inner;
            for frame in request_rx {
                if result_tx.send(inner.classify(&frame)).is_err() {
                    return;
                }
            }
        });

        Self {
            request_tx,
            result_rx,
            timeout,
            in_flight: false,
            _handle: handle,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

impl<F: Clone + Send + 'static> Classifier for ThreadedClassifier<F> {
    type Frame = F;

    fn classify(&mut self, frame: &F) -> ClassifyResult {
        if self.in_flight {
            match self.result_rx.try_recv() {
                Ok(_) => {
                    debug!("discarding late classification");
                    self.in_flight = false;
                }
                Err(TryRecvError::Empty) => return Err(SampleError::Busy),
                Err(TryRecvError::Disconnected) => return Err(SampleError::WorkerGone),
            }
        }

        self.request_tx
            .send(frame.clone())
            .map_err(|_| SampleError::WorkerGone)?;
        self.in_flight = true;

        match self.result_rx.recv_timeout(self.timeout) {
            Ok(result) => {
                self.in_flight = false;
                result
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!("classifier timed out after {:?}", self.timeout);
                Err(SampleError::Timeout(self.timeout))
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.in_flight = false;
                Err(SampleError::WorkerGone)
            }
        }
    }
}
