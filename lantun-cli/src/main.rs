use clap::Parser;
use lantun_synth::{Romanizer, SynthesisPipeline};
use lantun_vits::UromanRomanizer;
use std::env;
use std::fs::File;
use std::io::{self, prelude::*};
use std::path::PathBuf;

/// Points at `uroman.pl` when `--uroman` is not given.
const LANTUN_UROMAN_PATH: &str = "LANTUN_UROMAN_PATH";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Voice directory holding `config.json`, `vocab.txt` and `model.onnx`
    voice_dir: PathBuf,
    /// Text to synthesize; takes precedence over `--input-file`
    #[arg(short, long)]
    text: Option<String>,
    /// Input text file (default `stdin`)
    #[arg(short = 'f', long, value_name = "INPUT_FILE")]
    input_file: Option<PathBuf>,
    /// Output wave file
    #[arg(short, long, value_name = "OUTPUT_FILE", default_value = "output.wav")]
    output_file: PathBuf,
    /// ISO 639-3 code for language specific character rewrites (default from config)
    #[arg(long)]
    language: Option<String>,
    /// Path to the `uroman.pl` romanization script (default `$LANTUN_UROMAN_PATH`)
    #[arg(long)]
    uroman: Option<PathBuf>,
    /// Noise scale (default from config file)
    #[arg(long)]
    noise_scale: Option<f32>,
    /// Length scale (default from config file)
    #[arg(long)]
    length_scale: Option<f32>,
    /// Noise width (default from config file)
    #[arg(long)]
    noise_w: Option<f32>,
}

fn enable_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("LANTUN_LOG", "info"))
        .init();
}

fn build_romanizer(args: &Cli) -> Option<Box<dyn Romanizer + Send + Sync>> {
    let script_path = args
        .uroman
        .clone()
        .or_else(|| env::var(LANTUN_UROMAN_PATH).ok().map(PathBuf::from))?;
    log::info!("Using romanization script: `{}`", script_path.display());
    Some(Box::new(UromanRomanizer::new(script_path)))
}

fn read_input_text(args: &Cli) -> anyhow::Result<String> {
    if let Some(ref text) = args.text {
        return Ok(text.clone());
    }
    let mut input_buffer = String::new();
    match args.input_file {
        Some(ref input_filename) => {
            let mut file = File::open(input_filename)?;
            file.read_to_string(&mut input_buffer)?;
        }
        None => {
            io::stdin().read_to_string(&mut input_buffer)?;
        }
    }
    Ok(input_buffer)
}

fn main() -> anyhow::Result<()> {
    enable_logging();

    let args = Cli::parse();
    let romanizer = build_romanizer(&args);

    let mut pipeline = SynthesisPipeline::new(&args.voice_dir, romanizer)
        .with_language(args.language.clone());
    pipeline.load_config()?;
    pipeline.load_model()?;
    pipeline.select_device()?;
    log::info!("Using voice directory: `{}`", args.voice_dir.display());

    let mut params = pipeline.params();
    if let Some(noise_scale) = args.noise_scale {
        params.noise_scale = noise_scale;
    }
    if let Some(length_scale) = args.length_scale {
        params.length_scale = length_scale;
    }
    if let Some(noise_w) = args.noise_w {
        params.noise_w = noise_w;
    }
    pipeline.set_params(params);

    let text = read_input_text(&args)?;
    pipeline.synthesize_to_file(&args.output_file, &text)?;
    log::info!("Wrote output to file: {}", args.output_file.display());
    Ok(())
}
