pub mod api;
pub mod arena;
pub mod base;
pub mod bnormal;
pub mod dominance;
pub mod eval;
pub mod frame;
pub mod hull;
pub mod moment;
pub mod save;
pub mod scale;
pub mod tornado;

/// dimensional analysis types
type Value = f64; // normalized outcome value on [0, 1]
type Mass = f64; // probability or belief mass
type Weight = f64; // criterion weight on its simplex
type Belief = f64; // central belief level on [0, 1]
type Code = i32; // public result code

// frame capacity parameters
const MAX_ALTS: usize = 64;
const MAX_CRIT: usize = 64;
const MAX_COPA: usize = 128;
const MAX_NOPA: usize = 255;
const MAX_STMTS: usize = 250;
const MAX_FRAMES: usize = 16;
const MAX_ROWS: usize = 2 * MAX_STMTS + MAX_COPA;

// numeric horizons. DTL_EPS is the consistency horizon seen by callers,
// HULL_EPS the inner horizon of the solver and the truncation collapse.
const DTL_EPS: f64 = 1e-5;
const HULL_EPS: f64 = 1e-6;
const T_EPS: f64 = 4e-6;
const DOMINANCE_LIMIT: f64 = 1e-3;
const MIN_SUPPORT_LEVEL: f64 = 1e-5;
const MAX_SUPPORT_LEVEL: f64 = 0.9990234375;
const MAX_RESULTSTEPS: usize = 21;

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}

/// initialize logging
#[cfg(feature = "cli")]
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
