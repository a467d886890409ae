use crate::config::{Config, SourceKind};
use std::env;
use std::sync::{Mutex, OnceLock};

// Global lock so tests mutating the process environment never interleave
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const VARS: [&str; 10] = [
    "DATA_SOURCE",
    "PRICE_API_BASE_URL",
    "DATA_DIR",
    "ANALYSIS_START_DATE",
    "ANALYSIS_END_DATE",
    "ROLLING_WINDOW",
    "DECOMPOSITION_PERIOD",
    "CORRELATION_LAGS",
    "Z_SCORE_THRESHOLD",
    "VAR_CONFIDENCE",
];

fn clear_vars() {
    for var in VARS {
        unsafe { env::remove_var(var) };
    }
}

fn set_var(var: &str, value: &str) {
    unsafe { env::set_var(var, value) };
}

#[test]
fn defaults_cover_the_survey_range() {
    let _guard = env_lock().lock().unwrap();
    clear_vars();

    let config = Config::from_env().unwrap();
    assert_eq!(config.source, SourceKind::Yahoo);
    assert_eq!(config.start_date.to_string(), "2015-01-01");
    assert_eq!(config.end_date.to_string(), "2024-10-31");
    assert_eq!(config.rolling_window, 30);
    assert_eq!(config.decomposition_period, 252);
    assert_eq!(config.correlation_lags, 30);
    assert!((config.z_score_threshold - 3.0).abs() < f64::EPSILON);
    assert!((config.var_confidence - 0.99).abs() < f64::EPSILON);
    assert_eq!(config.data_dir.to_string_lossy(), "data");
}

#[test]
fn settings_mirror_the_analysis_knobs() {
    let _guard = env_lock().lock().unwrap();
    clear_vars();
    set_var("ROLLING_WINDOW", "10");
    set_var("DECOMPOSITION_PERIOD", "21");
    set_var("CORRELATION_LAGS", "5");

    let config = Config::from_env().unwrap();
    let settings = config.analysis_settings();
    assert_eq!(settings.rolling_window, 10);
    assert_eq!(settings.decomposition_period, 21);
    assert_eq!(settings.correlation_lags, 5);

    clear_vars();
}

#[test]
fn synthetic_source_is_selectable() {
    let _guard = env_lock().lock().unwrap();
    clear_vars();
    set_var("DATA_SOURCE", "Synthetic");

    let config = Config::from_env().unwrap();
    assert_eq!(config.source, SourceKind::Synthetic);

    clear_vars();
}

#[test]
fn unknown_source_is_rejected() {
    let _guard = env_lock().lock().unwrap();
    clear_vars();
    set_var("DATA_SOURCE", "csv");

    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("DATA_SOURCE"), "{err}");

    clear_vars();
}

#[test]
fn inverted_date_range_is_rejected() {
    let _guard = env_lock().lock().unwrap();
    clear_vars();
    set_var("ANALYSIS_START_DATE", "2024-01-01");
    set_var("ANALYSIS_END_DATE", "2020-01-01");

    assert!(Config::from_env().is_err());

    clear_vars();
}

#[test]
fn malformed_date_is_rejected_with_the_variable_name() {
    let _guard = env_lock().lock().unwrap();
    clear_vars();
    set_var("ANALYSIS_START_DATE", "01/02/2015");

    let err = Config::from_env().unwrap_err();
    assert!(format!("{err:#}").contains("ANALYSIS_START_DATE"), "{err:#}");

    clear_vars();
}

#[test]
fn degenerate_knobs_are_rejected() {
    let _guard = env_lock().lock().unwrap();

    clear_vars();
    set_var("ROLLING_WINDOW", "0");
    assert!(Config::from_env().is_err());

    clear_vars();
    set_var("DECOMPOSITION_PERIOD", "1");
    assert!(Config::from_env().is_err());

    clear_vars();
    set_var("VAR_CONFIDENCE", "1.0");
    assert!(Config::from_env().is_err());

    clear_vars();
}
