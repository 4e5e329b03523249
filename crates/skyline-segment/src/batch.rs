use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use rayon::prelude::*;
use skyline_io::{functional::read_image_any_rgb8, png::write_image_png_gray8};

use crate::{
    config::OutputNaming,
    error::SegmentError,
    observer::{LogObserver, StageObserver},
    segmentor::Segmentor,
};

/// The result of processing one input file.
#[derive(Debug)]
pub struct FileOutcome {
    /// The input path.
    pub input: PathBuf,
    /// The path the segmented image was, or would have been, written to.
    pub output: PathBuf,
    /// Whether the file was processed.
    pub result: Result<(), SegmentError>,
}

impl FileOutcome {
    /// Whether the file was segmented and written.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Read `input`, segment it and write the result as PNG to `output`.
///
/// # Arguments
///
/// * `segmentor` - The configured segmentor.
/// * `input` - Any image file the decoder understands.
/// * `output` - The PNG file to write.
/// * `observer` - Receives the intermediate images.
pub fn process_file(
    segmentor: &Segmentor,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    observer: &mut dyn StageObserver,
) -> Result<(), SegmentError> {
    let (input, output) = (input.as_ref(), output.as_ref());

    let image = read_image_any_rgb8(input)?;
    let segmented = segmentor.segment_with(&image, observer)?;
    write_image_png_gray8(output, &segmented)?;

    log::info!(
        "segmented {} ({}) -> {}",
        input.display(),
        image.size(),
        output.display()
    );

    Ok(())
}

/// Segment every input, writing each result where `naming` says.
///
/// A failing file is logged and reported in its [`FileOutcome`] without stopping the
/// others. With `parallel` the files are processed on the rayon thread pool, unless two
/// inputs write the same output path. Then the inputs run in order so that the last one wins.
///
/// Every stage is logged at debug level, see [`LogObserver`].
pub fn run_batch(
    segmentor: &Segmentor,
    inputs: &[PathBuf],
    naming: &OutputNaming,
    parallel: bool,
) -> Vec<FileOutcome> {
    run_batch_with(segmentor, inputs, naming, parallel, |_| {
        Box::new(LogObserver) as Box<dyn StageObserver>
    })
}

/// Like [`run_batch`], with an observer created for every input by `make_observer`.
pub fn run_batch_with<F>(
    segmentor: &Segmentor,
    inputs: &[PathBuf],
    naming: &OutputNaming,
    parallel: bool,
    make_observer: F,
) -> Vec<FileOutcome>
where
    F: Fn(&Path) -> Box<dyn StageObserver> + Sync,
{
    let outputs = inputs
        .iter()
        .map(|input| naming.output_path(input))
        .collect::<Vec<_>>();

    let run_one = |(input, output): (&PathBuf, &PathBuf)| {
        let mut observer = make_observer(input);
        let result = process_file(segmentor, input, output, observer.as_mut());
        if let Err(err) = &result {
            log::error!("failed to segment {}: {}", input.display(), err);
        }
        FileOutcome {
            input: input.clone(),
            output: output.clone(),
            result,
        }
    };

    let distinct_outputs = outputs.iter().collect::<HashSet<_>>().len() == outputs.len();
    if parallel && !distinct_outputs {
        log::warn!("several inputs write the same file, processing them sequentially");
    }

    let outcomes = if parallel && distinct_outputs {
        inputs
            .par_iter()
            .zip(outputs.par_iter())
            .map(run_one)
            .collect::<Vec<_>>()
    } else {
        inputs.iter().zip(outputs.iter()).map(run_one).collect::<Vec<_>>()
    };

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    log::info!("processed {} file(s), {} failed", outcomes.len(), failed);

    outcomes
}
