use argh::FromArgs;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use skyline::{
    image::Image,
    io::png::write_image_png_gray8,
    segment::{
        run_batch_with, LogObserver, OutputNaming, Segmentor, SegmentorConfig, Stage,
        StageObserver, Variant,
    },
};

#[derive(FromArgs)]
/// Separate the horizon from the starfield of images and write the masked grayscale result
struct Args {
    /// pipeline preset: a or b (default: a)
    #[argh(option, default = "Variant::A")]
    variant: Variant,

    /// JSON file with pipeline parameters, missing fields come from the preset
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// flood fill seed as x,y
    #[argh(option, short = 's', from_str_fn(parse_seed))]
    seed: Option<(usize, usize)>,

    /// write every result to this file instead of the naming of the preset
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// directory receiving the image of every stage
    #[argh(option)]
    dump_stages: Option<PathBuf>,

    /// process the inputs on all cores
    #[argh(switch, short = 'p')]
    parallel: bool,

    /// input images
    #[argh(positional)]
    inputs: Vec<PathBuf>,
}

fn parse_seed(value: &str) -> Result<(usize, usize), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got '{value}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid seed coordinate '{v}': {e}"))
    };
    Ok((parse(x)?, parse(y)?))
}

/// Overlay the fields of a JSON file on the preset of `variant`.
fn load_config(
    variant: Variant,
    path: &Path,
) -> Result<SegmentorConfig, Box<dyn std::error::Error>> {
    let mut config = serde_json::to_value(variant.config())?;
    let overrides: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;

    let (Some(config_fields), Some(override_fields)) =
        (config.as_object_mut(), overrides.as_object())
    else {
        return Err(format!("{} does not hold a JSON object", path.display()).into());
    };
    for (key, value) in override_fields {
        let Some(field) = config_fields.get_mut(key) else {
            return Err(format!("unknown field '{key}' in {}", path.display()).into());
        };
        *field = value.clone();
    }

    Ok(serde_json::from_value(config)?)
}

fn dump_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// Whether the stage dumps of `inputs` land in distinct files.
fn distinct_stems(inputs: &[PathBuf]) -> bool {
    inputs.iter().map(|i| dump_stem(i)).collect::<HashSet<_>>().len() == inputs.len()
}

/// Writes every stage to `<dir>/<stem>.<NN>-<stage>.png`.
struct StageDumper {
    dir: PathBuf,
    stem: String,
}

impl StageObserver for StageDumper {
    fn on_stage(&mut self, stage: Stage, image: &Image<u8, 1>) {
        LogObserver.on_stage(stage, image);

        let path = self
            .dir
            .join(format!("{}.{:02}-{}.png", self.stem, stage.index(), stage));
        if let Err(err) = write_image_png_gray8(&path, image) {
            log::warn!("could not dump stage {} to {}: {}", stage, path.display(), err);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if args.inputs.is_empty() {
        return Err("no input images given".into());
    }

    let mut config = match &args.config {
        Some(path) => load_config(args.variant, path)?,
        None => args.variant.config(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(output) = args.output {
        config.output = OutputNaming::Fixed(output);
    }

    let segmentor = Segmentor::new(config)?;
    log::debug!("configuration: {:?}", segmentor.config());

    if let Some(dir) = &args.dump_stages {
        std::fs::create_dir_all(dir)?;
    }

    let mut parallel = args.parallel;
    if parallel && args.dump_stages.is_some() && !distinct_stems(&args.inputs) {
        log::warn!("several inputs share a file stem, dumping their stages sequentially");
        parallel = false;
    }

    let outcomes = run_batch_with(
        &segmentor,
        &args.inputs,
        &segmentor.config().output,
        parallel,
        |input| match &args.dump_stages {
            Some(dir) => Box::new(StageDumper {
                dir: dir.clone(),
                stem: dump_stem(input),
            }) as Box<dyn StageObserver>,
            None => Box::new(LogObserver),
        },
    );

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        return Err(format!("{failed} of {} input(s) failed", outcomes.len()).into());
    }

    Ok(())
}
