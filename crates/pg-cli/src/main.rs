mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use pg_core::{
    AdjacencyProvider, CapEngine, CapOutcome, CapParams, CapType, Dataset, GenerationMode,
    GenerationOutcome, GridPosition, LetterDeterminer, LetterType, POSITION_TABLE,
    PropContinuity, SequenceGenerator, SliceSize, export_sequence_json,
};
use pg_store::{GeneratorConfig, load_dataset_or_reference, read_sequence, write_sequence};
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Parser)]
#[command(name = "pg", about = "Pictograph sequence generator and CAP transformer")]
struct Cli {
    /// Dataset file (overrides PG_DATASET and pg.toml)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Config file (overrides PG_CONFIG; defaults to ./pg.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new sequence
    Generate(GenerateArgs),

    /// Extend a stored sequence with a CAP
    Transform {
        file: PathBuf,

        #[arg(long)]
        cap: CapType,

        #[arg(long)]
        slice: Option<SliceSize>,

        /// Target length; defaults to twice the input
        #[arg(long)]
        length: Option<usize>,

        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run letter determination on a stored sequence
    Classify {
        file: PathBuf,

        /// Only this beat number
        #[arg(long)]
        beat: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Print the grid position table
    Positions,

    /// Check a stored sequence's structure and letters
    Validate { file: PathBuf },
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long)]
    mode: Option<GenerationMode>,

    /// Number of beats
    #[arg(long)]
    length: Option<usize>,

    /// Turn level, 1..=3
    #[arg(long)]
    level: Option<u8>,

    /// Target mean turns per beat
    #[arg(long)]
    intensity: Option<f64>,

    /// Letter categories to draw from, e.g. 1,2,5
    #[arg(long, value_delimiter = ',')]
    letter_types: Vec<u8>,

    #[arg(long)]
    continuity: Option<PropContinuity>,

    /// CAP used in circular mode
    #[arg(long)]
    cap: Option<CapType>,

    #[arg(long)]
    slice: Option<SliceSize>,

    /// Start position, e.g. alpha1
    #[arg(long)]
    start: Option<GridPosition>,

    #[arg(long)]
    seed: Option<u64>,

    /// Write the sequence as legacy JSON instead of printing it
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print legacy JSON to stdout
    #[arg(long, conflicts_with = "out")]
    json: bool,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => cmd_generate(&cli, args),
        Commands::Transform {
            file,
            cap,
            slice,
            length,
            out,
        } => cmd_transform(&cli, file, *cap, *slice, *length, out.as_deref()),
        Commands::Classify { file, beat, json } => cmd_classify(&cli, file, *beat, *json),
        Commands::Positions => cmd_positions(),
        Commands::Validate { file } => cmd_validate(&cli, file),
    }
}

fn load_config(cli: &Cli) -> Result<GeneratorConfig> {
    let config =
        GeneratorConfig::discover(cli.config.as_deref()).context("failed to load config")?;
    Ok(config.with_dataset_override(cli.dataset.clone()))
}

fn load_dataset(config: &GeneratorConfig) -> Result<Dataset> {
    let path = config.dataset.as_deref();
    load_dataset_or_reference(path).with_context(|| match path {
        Some(p) => format!("failed to load dataset {}", p.display()),
        None => "failed to load bundled dataset".to_string(),
    })
}

fn cmd_generate(cli: &Cli, args: &GenerateArgs) -> Result<()> {
    let GenerateArgs {
        mode,
        length,
        level,
        intensity,
        letter_types,
        continuity,
        cap,
        slice,
        start,
        seed,
        out,
        json,
    } = args;

    let config = load_config(cli)?;
    let dataset = load_dataset(&config)?;

    let mut request = config.to_request();
    request.mode = mode.unwrap_or(request.mode);
    request.length = length.unwrap_or(request.length);
    request.level = level.unwrap_or(request.level);
    request.intensity = intensity.unwrap_or(request.intensity);
    request.prop_continuity = continuity.unwrap_or(request.prop_continuity);
    request.cap_type = cap.unwrap_or(request.cap_type);
    request.slice_size = slice.unwrap_or(request.slice_size);
    request.start_position = *start;
    request.letter_types = letter_types
        .iter()
        .map(|&n| LetterType::from_number(n))
        .collect::<std::result::Result<_, _>>()
        .context("invalid --letter-types")?;

    let seed = seed.or(config.seed).unwrap_or_else(rand::random);
    tracing::info!("generating with seed {seed}");
    let mut rng = SmallRng::seed_from_u64(seed);

    let adjacency = AdjacencyProvider::new(&dataset);
    let letters = LetterDeterminer::new(&dataset);
    let result = SequenceGenerator::new(&adjacency, &letters)
        .generate(&request, &mut rng)
        .context("generation failed")?;

    if let GenerationOutcome::Truncated {
        requested,
        produced,
    } = result.outcome
    {
        eprintln!("truncated: produced {produced} of {requested} beats");
    }

    if let Some(path) = out {
        write_sequence(path, &result.sequence)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!(
            "wrote {} beats to {} (seed {seed})",
            result.sequence.len(),
            path.display()
        );
    } else if *json {
        let text =
            export_sequence_json(&result.sequence).context("failed to serialize sequence")?;
        println!("{text}");
    } else {
        println!("seed:  {seed}");
        render::sequence(&result.sequence);
    }
    Ok(())
}

fn cmd_transform(
    cli: &Cli,
    file: &Path,
    cap: CapType,
    slice: Option<SliceSize>,
    length: Option<usize>,
    out: Option<&Path>,
) -> Result<()> {
    let config = load_config(cli)?;
    let dataset = load_dataset(&config)?;
    let seq = read_sequence(file).with_context(|| format!("failed to read {}", file.display()))?;

    let params = CapParams {
        slice_size: slice.unwrap_or(config.slice_size),
    };
    let target = length.unwrap_or(seq.len() * 2);
    if target < seq.len() {
        bail!(
            "--length {target} is shorter than the input ({} beats)",
            seq.len()
        );
    }

    let letters = LetterDeterminer::new(&dataset);
    let result = CapEngine::new(&letters)
        .extend_to(&seq, cap, &params, target)
        .context("transform failed")?;

    match &result.outcome {
        CapOutcome::Applied { repetitions } => {
            println!(
                "applied {cap} ({}), {repetitions} repetition(s)",
                params.slice_size
            );
        }
        CapOutcome::NotApplicable(reason) => println!("not applied: {reason}"),
    }

    match out {
        Some(path) => {
            write_sequence(path, &result.sequence)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "wrote {} beats to {}",
                result.sequence.len(),
                path.display()
            );
        }
        None => render::sequence(&result.sequence),
    }
    Ok(())
}

fn cmd_classify(cli: &Cli, file: &Path, beat: Option<u32>, json: bool) -> Result<()> {
    let config = load_config(cli)?;
    let dataset = load_dataset(&config)?;
    let seq = read_sequence(file).with_context(|| format!("failed to read {}", file.display()))?;
    let letters = LetterDeterminer::new(&dataset);

    let beats: Vec<_> = seq
        .beats()
        .iter()
        .filter(|b| beat.is_none_or(|n| b.beat_number == n))
        .collect();
    if let Some(n) = beat
        && beats.is_empty()
    {
        bail!("no beat {n} in {} ({} beats)", file.display(), seq.len());
    }

    if json {
        let rows: Vec<_> = beats
            .iter()
            .map(|b| {
                serde_json::json!({
                    "beat": b.beat_number,
                    "stored": b.letter,
                    "result": letters.determine_beat(b),
                })
            })
            .collect();
        let text = serde_json::to_string_pretty(&rows).context("failed to serialize results")?;
        println!("{text}");
        return Ok(());
    }

    for b in beats {
        if b.is_blank {
            println!("{:>3}  _   (blank)", b.beat_number);
            continue;
        }
        println!("{}", render::classification(b, &letters.determine_beat(b)));
    }
    Ok(())
}

fn cmd_positions() -> Result<()> {
    for (blue, red, pos) in POSITION_TABLE {
        println!(
            "{:<8} {:<6} blue={:<3} red={red}",
            pos.to_string(),
            pos.family().to_string(),
            blue.to_string()
        );
    }
    Ok(())
}

fn cmd_validate(cli: &Cli, file: &Path) -> Result<()> {
    let seq = read_sequence(file).with_context(|| format!("invalid sequence {}", file.display()))?;
    let config = load_config(cli)?;
    let dataset = load_dataset(&config)?;
    let letters = LetterDeterminer::new(&dataset);

    let mut mismatched = 0;
    for b in seq.beats().iter().filter(|b| !b.is_blank) {
        match b.letter.as_deref() {
            Some(letter) if !letters.still_matches(b) => {
                mismatched += 1;
                println!(
                    "warning: beat {} is labeled {letter} but its motions do not match",
                    b.beat_number
                );
            }
            None => println!("warning: beat {} has no letter", b.beat_number),
            _ => {}
        }
    }

    println!(
        "ok: {} beats, word {}, {mismatched} letter mismatch(es)",
        seq.len(),
        seq.word()
    );
    Ok(())
}
