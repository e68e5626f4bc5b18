use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wind_trails_core::grid::ComponentGrid;
use wind_trails_core::{
    DirectoryProvider, EngineConfig, LevelId, LoadPlan, LoadProgress, Rgb, SeedOutcome,
    TickOutcome, ViewMode, WindEngine, WindError, WindField, WindLevel,
};

/// Headless wind trails run with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "wind-trails-demo")]
#[command(about = "Advect wind particles through gridded level data", long_about = None)]
struct Args {
    /// Directory holding `{level}_{time_step}.json` or `{level}.json` payloads.
    /// Without it a synthetic vortex field is used.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Level to load (surface, 850, 700, 500) or "all" for every level
    #[arg(short, long, default_value = "850")]
    level: String,

    /// Time step label passed to the data directory lookup
    #[arg(short, long, default_value = "latest")]
    time_step: String,

    /// JSON engine configuration; missing keys take defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of host frames to simulate
    #[arg(long, default_value_t = 300)]
    ticks: u32,

    /// Override the particle count
    #[arg(short, long)]
    particles: Option<usize>,

    /// RNG seed for reproducible runs
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Pin particle heights to their level (top-down camera)
    #[arg(long)]
    top_view: bool,

    /// Print a report row every N steps
    #[arg(short, long, default_value_t = 30)]
    report_interval: u32,
}

fn main() -> Result<(), WindError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    println!("=== Wind Trails Demo ===\n");

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(count) = args.particles {
        config.particles.count = count;
    }
    config.seed = Some(args.seed);

    let plan = match args.level.as_str() {
        "all" => LoadPlan::AllLevels,
        name => LoadPlan::SingleLevel(name.parse()?),
    };

    let mut engine = WindEngine::new(config)?;
    engine.set_view_mode(if args.top_view {
        ViewMode::TopDown
    } else {
        ViewMode::Perspective
    });

    println!(
        "Engine: {} particles, trail length {}, step every {} ms",
        engine.particles().len(),
        engine.particles().trail_capacity(),
        engine.config().update_interval_ms
    );

    match &args.data_dir {
        Some(dir) => {
            let provider = DirectoryProvider::new(dir);
            println!("Loading {:?} for '{}' from {}", plan, args.time_step, dir.display());
            match engine.load_with_provider(&provider, plan, &args.time_step)? {
                LoadProgress::Installed { generation } => {
                    println!("Installed field generation {generation}");
                }
                other => println!("Load did not install: {other:?}"),
            }
        }
        None => {
            println!("No data directory, using synthetic vortex field");
            let field = synthetic_field(plan.levels(), engine.config());
            if let SeedOutcome::Seeded { particles, levels } = engine.set_wind_field(field) {
                println!("Seeded {particles} particles over {levels} level(s)");
            }
        }
    }

    let levels: Vec<String> = engine.field().level_ids().map(|id| id.to_string()).collect();
    println!("Active levels: [{}]\n", levels.join(", "));

    println!("  Step | Advected | Respawned | Mean speed | Colour");
    println!("-------|----------|-----------|------------|--------");

    let interval = Duration::from_millis(engine.config().update_interval_ms);
    let mut steps = 0u32;
    let mut respawned_total = 0usize;

    for frame in 0..args.ticks {
        let TickOutcome::Stepped(stats) = engine.tick(interval * frame) else {
            continue;
        };
        steps += 1;
        respawned_total += stats.respawned;

        if args.report_interval > 0 && steps % args.report_interval == 0 {
            println!(
                "{:6} | {:8} | {:9} | {:10.2} | {}",
                steps,
                stats.advected,
                stats.respawned,
                stats.mean_speed,
                hex(engine.frame_color())
            );
        }
    }

    println!("\n=== Run Complete ===");
    println!("Steps taken: {steps}");
    println!("Total respawns: {respawned_total}");
    println!("Vertex buffer: {} scalars", engine.vertex_len());

    let (min, max) = bounds(engine.vertices());
    println!(
        "Vertex bounds: ({:.0}, {:.0}, {:.0}) .. ({:.0}, {:.0}, {:.0})",
        min[0], min[1], min[2], max[0], max[1], max[2]
    );

    Ok(())
}

/// Cyclone-like rotation around the spawn centre, stronger aloft, with a
/// masked strip along the southern edge so particles exercise the NoData path
fn synthetic_field(levels: &[LevelId], config: &EngineConfig) -> WindField {
    const STEP_DEG: f32 = 0.5;

    let roi = config.roi;
    let axis = |min: f32, max: f32| -> Vec<f32> {
        let count = ((max - min) / STEP_DEG).floor() as usize + 1;
        (0..count).map(|i| min + i as f32 * STEP_DEG).collect()
    };
    let lat_axis = axis(roi.min_lat, roi.max_lat);
    let lon_axis = axis(roi.min_lon, roi.max_lon);

    let (center_lat, center_lon) = (config.spawn.center_lat, config.spawn.center_lon);
    let sigma_sq = (2.0 * config.spawn.radius_deg).powi(2);

    let mut field = WindField::for_time_step("synthetic");
    for (index, &id) in levels.iter().enumerate() {
        let strength = 1.5 * (1.0 + index as f32 * 0.5);

        let mut eastward = Vec::with_capacity(lat_axis.len());
        let mut northward = Vec::with_capacity(lat_axis.len());
        let mut vertical = Vec::with_capacity(lat_axis.len());

        for &lat in &lat_axis {
            let masked = lat < roi.min_lat + 2.0;
            let (mut u_row, mut v_row, mut w_row) = (Vec::new(), Vec::new(), Vec::new());
            for &lon in &lon_axis {
                let (dlat, dlon) = (lat - center_lat, lon - center_lon);
                let falloff = (-(dlat * dlat + dlon * dlon) / sigma_sq).exp();
                if masked {
                    u_row.push(f32::NAN);
                    v_row.push(f32::NAN);
                } else {
                    u_row.push(-dlat * strength * falloff);
                    v_row.push(dlon * strength * falloff);
                }
                w_row.push(400.0 * falloff);
            }
            eastward.push(u_row);
            northward.push(v_row);
            vertical.push(w_row);
        }

        let level = WindLevel::new(
            id,
            lat_axis.clone(),
            lon_axis.clone(),
            ComponentGrid::from_rows(eastward),
            ComponentGrid::from_rows(northward),
            config.altitudes.altitude(id),
        );
        match level {
            Ok(level) if id == LevelId::Surface => {
                field.insert(level);
            }
            Ok(level) => {
                field.insert(level.with_vertical(ComponentGrid::from_rows(vertical)));
            }
            Err(err) => eprintln!("Skipping synthetic level {id}: {err}"),
        }
    }
    field
}

fn hex(color: Rgb) -> String {
    let [r, g, b] = color.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn bounds(vertices: &[f32]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for point in vertices.chunks_exact(3) {
        for axis in 0..3 {
            min[axis] = min[axis].min(point[axis]);
            max[axis] = max[axis].max(point[axis]);
        }
    }
    (min, max)
}
