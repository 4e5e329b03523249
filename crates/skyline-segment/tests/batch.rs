use std::path::PathBuf;

use skyline_image::{Image, ImageSize};
use skyline_io::png::{read_image_png_mono8, write_image_png_rgb8};
use skyline_segment::{run_batch, OutputNaming, SegmentError, Segmentor, Variant};

fn write_scene(path: &PathBuf, split: usize) -> Result<(), SegmentError> {
    let size = ImageSize {
        width: 40,
        height: 40,
    };
    let data = (0..size.height)
        .flat_map(|y| std::iter::repeat(if y < split { 60u8 } else { 190 }).take(size.width * 3))
        .collect::<Vec<_>>();
    write_image_png_rgb8(path, &Image::<u8, 3>::new(size, data)?)?;
    Ok(())
}

#[test]
fn variant_b_writes_one_output_per_input() -> Result<(), SegmentError> {
    let tmp_dir = tempfile::tempdir().map_err(skyline_io::IoError::from)?;
    let inputs = vec![
        tmp_dir.path().join("night.png"),
        tmp_dir.path().join("dawn.png"),
    ];
    write_scene(&inputs[0], 15)?;
    write_scene(&inputs[1], 25)?;

    let config = Variant::B.config();
    let segmentor = Segmentor::new(config.clone())?;

    for parallel in [false, true] {
        let outcomes = run_batch(&segmentor, &inputs, &config.output, parallel);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.is_ok()));

        let night = tmp_dir.path().join("night.out.png");
        let dawn = tmp_dir.path().join("dawn.out.png");
        assert_eq!(outcomes[0].output, night);
        assert_eq!(outcomes[1].output, dawn);

        let night = read_image_png_mono8(&night)?;
        let dawn = read_image_png_mono8(&dawn)?;
        assert_eq!(night.size(), dawn.size());
        assert_ne!(night, dawn);
    }

    Ok(())
}

#[test]
fn fixed_output_last_input_wins() -> Result<(), SegmentError> {
    let tmp_dir = tempfile::tempdir().map_err(skyline_io::IoError::from)?;
    let inputs = vec![
        tmp_dir.path().join("first.png"),
        tmp_dir.path().join("second.png"),
    ];
    write_scene(&inputs[0], 10)?;
    write_scene(&inputs[1], 30)?;

    let segmentor = Segmentor::new(Variant::A.config())?;
    let fixed = OutputNaming::Fixed(tmp_dir.path().join("segmented.png"));

    // parallel is ignored when every input shares the output
    let outcomes = run_batch(&segmentor, &inputs, &fixed, true);
    assert!(outcomes.iter().all(|o| o.is_ok()));

    let written = read_image_png_mono8(tmp_dir.path().join("segmented.png"))?;
    let expected = segmentor.segment(&skyline_io::functional::read_image_any_rgb8(&inputs[1])?)?;
    assert_eq!(written, expected);

    Ok(())
}

#[test]
fn shared_output_path_runs_in_order() -> Result<(), SegmentError> {
    let tmp_dir = tempfile::tempdir().map_err(skyline_io::IoError::from)?;
    let png = tmp_dir.path().join("sky.png");
    let bmp = tmp_dir.path().join("sky.bmp");
    write_scene(&png, 10)?;

    let size = ImageSize {
        width: 40,
        height: 40,
    };
    let data = (0..size.height)
        .flat_map(|y| std::iter::repeat(if y < 30 { 60u8 } else { 190 }).take(size.width * 3))
        .collect::<Vec<_>>();
    image::save_buffer(
        &bmp,
        &data,
        size.width as u32,
        size.height as u32,
        image::ExtendedColorType::Rgb8,
    )
    .map_err(skyline_io::IoError::from)?;

    let config = Variant::B.config();
    let segmentor = Segmentor::new(config.clone())?;
    let inputs = vec![png.clone(), bmp.clone()];

    // both inputs map to sky.out.png
    let outcomes = run_batch(&segmentor, &inputs, &config.output, true);
    assert!(outcomes.iter().all(|o| o.is_ok()));
    let shared = tmp_dir.path().join("sky.out.png");
    assert_eq!(outcomes[0].output, shared);
    assert_eq!(outcomes[1].output, shared);

    let written = read_image_png_mono8(&shared)?;
    let last = segmentor.segment(&skyline_io::functional::read_image_any_rgb8(&bmp)?)?;
    let first = segmentor.segment(&skyline_io::functional::read_image_any_rgb8(&png)?)?;
    assert_ne!(first, last);
    assert_eq!(written, last);

    Ok(())
}

#[test]
fn undecodable_input_does_not_stop_the_batch() -> Result<(), SegmentError> {
    let tmp_dir = tempfile::tempdir().map_err(skyline_io::IoError::from)?;
    let broken = tmp_dir.path().join("broken.jpg");
    std::fs::write(&broken, b"not an image").map_err(skyline_io::IoError::from)?;
    let good = tmp_dir.path().join("good.png");
    write_scene(&good, 20)?;

    let segmentor = Segmentor::new(Variant::B.config())?;
    let outcomes = run_batch(
        &segmentor,
        &[broken, good],
        &OutputNaming::PerInput,
        true,
    );

    assert!(matches!(
        outcomes[0].result,
        Err(SegmentError::Io(skyline_io::IoError::ImageDecodeError(_)))
    ));
    assert!(!outcomes[0].output.exists());
    assert!(outcomes[1].is_ok());
    assert!(outcomes[1].output.exists());

    Ok(())
}
