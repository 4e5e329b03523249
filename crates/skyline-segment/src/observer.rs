use skyline_image::Image;
use skyline_imgproc::core::{count_nonzero, min_max};

use crate::stage::Stage;

/// Receives the intermediate image of every stage the pipeline runs.
///
/// Stages that are switched off by the configuration are not reported.
pub trait StageObserver {
    /// Called right after `stage` produced `image`.
    fn on_stage(&mut self, stage: Stage, image: &Image<u8, 1>);
}

/// An observer that ignores every stage.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    fn on_stage(&mut self, _stage: Stage, _image: &Image<u8, 1>) {}
}

/// An observer that logs a summary of every stage at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl StageObserver for LogObserver {
    fn on_stage(&mut self, stage: Stage, image: &Image<u8, 1>) {
        // the statistics scan the whole image
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }

        let (min, max) = min_max(image).unwrap_or_default();
        log::debug!(
            "stage {:02}-{}: size {} min {} max {} non-zero {}",
            stage.index(),
            stage,
            image.size(),
            min,
            max,
            count_nonzero(image)
        );
    }
}

impl<F> StageObserver for F
where
    F: FnMut(Stage, &Image<u8, 1>),
{
    fn on_stage(&mut self, stage: Stage, image: &Image<u8, 1>) {
        self(stage, image)
    }
}
