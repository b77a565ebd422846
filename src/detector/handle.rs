use std::sync::Arc;

use crate::frame::RgbFrame;
use crate::landmarks::Category;

use super::model::{DetectedInstance, LandmarkModel, ModelLoader};
use super::{DetectorError, DetectorState, RunningMode};

enum State {
    Uninitialized,
    Ready {
        model: Box<dyn LandmarkModel>,
        mode: RunningMode,
        last_timestamp: Option<u64>,
    },
    Closed,
}

pub(crate) struct ModelHandle {
    category: Category,
    loader: Arc<dyn ModelLoader>,
    state: State,
}

impl ModelHandle {
    pub(crate) fn new(category: Category, loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            category,
            loader,
            state: State::Uninitialized,
        }
    }

    pub(crate) fn state(&self) -> DetectorState {
        match self.state {
            State::Uninitialized => DetectorState::Uninitialized,
            State::Ready { .. } => DetectorState::Ready,
            State::Closed => DetectorState::Closed,
        }
    }

    pub(crate) fn create(&mut self, mode: RunningMode) -> Result<(), DetectorError> {
        if !matches!(self.state, State::Uninitialized) {
            return Err(DetectorError::AlreadyCreated {
                category: self.category,
            });
        }

        let model =
            self.loader
                .load(self.category, mode)
                .map_err(|e| DetectorError::ModelLoad {
                    category: self.category,
                    reason: e.to_string(),
                })?;

        self.state = State::Ready {
            model,
            mode,
            last_timestamp: None,
        };
        tracing::info!(category = %self.category, mode = ?mode, "landmarker created");
        Ok(())
    }

    pub(crate) fn detect(
        &mut self,
        frame: &RgbFrame,
        timestamp_ms: u64,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let category = self.category;
        let State::Ready {
            model,
            mode,
            last_timestamp,
        } = &mut self.state
        else {
            return Err(DetectorError::NotReady { category });
        };

        let timestamp = match mode {
            RunningMode::Video => {
                if let Some(previous) = *last_timestamp {
                    if timestamp_ms < previous {
                        return Err(DetectorError::TimestampRegression {
                            category,
                            previous,
                            current: timestamp_ms,
                        });
                    }
                }
                *last_timestamp = Some(timestamp_ms);
                Some(timestamp_ms)
            }
            RunningMode::SingleImage => None,
        };

        model
            .detect(frame, timestamp)
            .map_err(|e| DetectorError::Inference {
                category,
                reason: e.to_string(),
            })
    }

    pub(crate) fn rewind(&mut self) {
        if let State::Ready { last_timestamp, .. } = &mut self.state {
            *last_timestamp = None;
        }
    }

    pub(crate) fn close(&mut self) {
        if let State::Ready { .. } = self.state {
            // Dropping the model releases the session.
            self.state = State::Closed;
            tracing::info!(category = %self.category, "landmarker closed");
        }
    }
}
