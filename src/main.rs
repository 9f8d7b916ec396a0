use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use polar_roll::bpolar::read_bpolar_file;
use polar_roll::control::{ControlFileData, DEFAULT_CONTROL_FILE};
use polar_roll::dataset::{DirectoryStore, PolarService, DEFAULT_DATA_ROOT};
use polar_roll::grid::{fit, DraftCategory, FitParams};
use polar_roll::interp::{Blend, DensifyOptions, PolarInterpolator};
use std::io;
use std::process::ExitCode;
use std::{error::Error, path::PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    about = "Look up, inspect and densify polar roll response datasets",
    long_about = None,
    version = env!("POLAR_ROLL_VERSION")
)]
struct Cli {
    #[clap(subcommand)]
    mode: Modes,
}

#[derive(Subcommand, Debug)]
enum Modes {
    /// Print the header and value ranges of a .bpolar file
    Inspect(InspectOpts),
    /// Show the dataset key that operating parameters resolve to
    Fit(FitOpts),
    /// Resample a .bpolar file onto a dense polar grid, written as CSV to stdout
    Densify(DensifyOpts),
    /// Resolve parameters against a data directory and load the matching dataset
    Load(LoadOpts),
}

#[derive(Args, Debug)]
struct ParamArgs {
    /// Metacentric height [m]
    #[clap(long, default_value_t = 1.5)]
    gm: f64,

    /// Significant wave height [m]
    #[clap(long, default_value_t = 5.5)]
    hs: f64,

    /// Zero-crossing wave period [s]
    #[clap(long, default_value_t = 7.5)]
    tz: f64,

    /// Draft category used when peak drafts are not given
    #[clap(long)]
    draft: Option<DraftCategory>,

    /// Aft peak draft [m]
    #[clap(long)]
    aft: Option<f64>,

    /// Fore peak draft [m]
    #[clap(long)]
    fore: Option<f64>,
}

impl From<&ParamArgs> for FitParams {
    fn from(args: &ParamArgs) -> Self {
        FitParams {
            draft_hint: args.draft,
            draft_aft_peak: args.aft,
            draft_fore_peak: args.fore,
            gm: args.gm,
            hs: args.hs,
            tz: args.tz,
        }
    }
}

#[derive(Args, Debug)]
struct InspectOpts {
    bpolar_path: PathBuf,
}

#[derive(Args, Debug)]
struct FitOpts {
    #[clap(flatten)]
    params: ParamArgs,

    /// Control file supplying the representative drafts
    #[clap(short, long)]
    control: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DensifyOpts {
    bpolar_path: PathBuf,

    /// Number of output angles over the full circle
    #[clap(long, default_value_t = 360)]
    angles: usize,

    /// Output radii per stored speed
    #[clap(long, default_value_t = 3)]
    radial_density: usize,

    /// Weight the two angular neighbours by distance instead of averaging them
    #[clap(long)]
    weighted: bool,
}

#[derive(Args, Debug)]
struct LoadOpts {
    #[clap(flatten)]
    params: ParamArgs,

    /// Root of the dataset tree
    #[clap(short, long, default_value = DEFAULT_DATA_ROOT)]
    data_root: PathBuf,

    /// Control file key relative to the data root
    #[clap(short, long, default_value = DEFAULT_CONTROL_FILE)]
    control_file: String,
}

fn format_range(range: Option<(f64, f64)>) -> String {
    match range {
        Some((min, max)) => format!("{} .. {}", min, max),
        None => "n/a".to_string(),
    }
}

fn run_inspect(opts: &InspectOpts) -> Result<(), Box<dyn Error>> {
    let matrix = read_bpolar_file(&opts.bpolar_path)?;
    let [first, second] = matrix.metadata();
    println!("file:     {}", opts.bpolar_path.display());
    println!("metadata: {:?} {:?}", first, second);
    println!("status:   {:?}", matrix.status());
    println!(
        "speeds:   {} ({})",
        matrix.speed_count(),
        format_range(matrix.speed_range())
    );
    println!(
        "headings: {} ({})",
        matrix.heading_count(),
        format_range(matrix.heading_range())
    );
    match matrix.peak_roll() {
        Some(peak) => println!("peak:     {}", peak),
        None => println!("peak:     n/a"),
    }
    Ok(())
}

fn run_fit(opts: &FitOpts) -> Result<(), Box<dyn Error>> {
    let control = opts
        .control
        .as_deref()
        .map(ControlFileData::load)
        .transpose()?;
    let key = fit(&FitParams::from(&opts.params), control.as_ref());
    println!("{}", key);
    println!("{}", key.storage_key());
    println!("{}", key.image_key());
    Ok(())
}

fn run_densify(opts: &DensifyOpts) -> Result<(), Box<dyn Error>> {
    if opts.angles == 0 || opts.radial_density == 0 {
        return Err("--angles and --radial-density must be positive".into());
    }
    let matrix = read_bpolar_file(&opts.bpolar_path)?;
    let blend = if opts.weighted {
        Blend::AngleWeighted
    } else {
        Blend::Midpoint
    };
    let interpolator = PolarInterpolator::from_response_matrix(&matrix)?.with_blend(blend);
    let grid = interpolator.densify(&DensifyOptions {
        angle_count: opts.angles,
        radial_density: opts.radial_density,
    });
    info!(
        "Densified {} to {} x {} cells",
        opts.bpolar_path.display(),
        grid.radii().len(),
        grid.angles().len()
    );
    grid.write_csv(io::stdout().lock())?;
    Ok(())
}

fn run_load(opts: &LoadOpts) -> Result<(), Box<dyn Error>> {
    let mut service = PolarService::new(DirectoryStore::new(&opts.data_root));
    if let Err(e) = service.load_control_file(&opts.control_file) {
        warn!("No control file loaded: {}", e);
    }
    let params = FitParams::from(&opts.params);
    let load = service.load_polar(&params)?;
    println!("{}", load.key);
    println!("dataset: {}", load.storage_key);
    match service.find_image_key(&params) {
        Some(image_key) => println!("image:   {}", image_key),
        None => println!("image:   missing ({})", load.image_key),
    }
    println!(
        "matrix:  {} speeds x {} headings, peak {}",
        load.matrix.speed_count(),
        load.matrix.heading_count(),
        load.matrix
            .peak_roll()
            .map_or_else(|| "n/a".to_string(), |peak| peak.to_string())
    );
    Ok(())
}

fn entrypoint() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    match &cli.mode {
        Modes::Inspect(opts) => run_inspect(opts),
        Modes::Fit(opts) => run_fit(opts),
        Modes::Densify(opts) => run_densify(opts),
        Modes::Load(opts) => run_load(opts),
    }
}

fn main() -> ExitCode {
    match entrypoint() {
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}
