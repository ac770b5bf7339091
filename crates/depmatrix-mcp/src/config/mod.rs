//! Configuration loading and resolution.

use std::path::PathBuf;

use depmatrix::Thresholds;

pub const EXPORT_DIR_ENV: &str = "DEPMATRIX_EXPORT_DIR";
pub const TEMPORAL_THRESHOLD_ENV: &str = "DEPMATRIX_TEMPORAL_THRESHOLD";
pub const EXISTENTIAL_THRESHOLD_ENV: &str = "DEPMATRIX_EXISTENTIAL_THRESHOLD";

/// Resolve the directory exports are written to and relative imports are
/// read from: explicit flag, then `DEPMATRIX_EXPORT_DIR`, then `./.depmatrix`
/// if it exists, then `$HOME/.depmatrix`.
pub fn resolve_export_dir(explicit: Option<&str>) -> PathBuf {
    if let Some(dir) = explicit {
        return PathBuf::from(dir);
    }

    if let Ok(env_dir) = std::env::var(EXPORT_DIR_ENV) {
        if !env_dir.trim().is_empty() {
            return PathBuf::from(env_dir);
        }
    }

    let cwd_dir = PathBuf::from(".depmatrix");
    if cwd_dir.is_dir() {
        return cwd_dir;
    }

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".depmatrix")
}

/// Default discovery thresholds: explicit values win, then the
/// `DEPMATRIX_*_THRESHOLD` variables, then 1.0. Unparsable or out of range
/// environment values are ignored with a warning.
pub fn resolve_thresholds(temporal: Option<f64>, existential: Option<f64>) -> Thresholds {
    let defaults = Thresholds::default();
    let temporal = temporal
        .or_else(|| threshold_from_env(TEMPORAL_THRESHOLD_ENV))
        .unwrap_or(defaults.temporal);
    let existential = existential
        .or_else(|| threshold_from_env(EXISTENTIAL_THRESHOLD_ENV))
        .unwrap_or(defaults.existential);

    Thresholds::new(temporal, existential).unwrap_or_else(|e| {
        tracing::warn!("{e}; using default thresholds");
        defaults
    })
}

fn threshold_from_env(name: &str) -> Option<f64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<f64>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Some(value),
        _ => {
            tracing::warn!("Ignoring {name}={raw:?}: expected a number in [0, 1]");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_export_dir_wins() {
        assert_eq!(resolve_export_dir(Some("/data/out")), PathBuf::from("/data/out"));
    }

    #[test]
    fn test_explicit_thresholds() {
        let t = resolve_thresholds(Some(0.25), Some(0.75));
        assert_eq!(t.temporal, 0.25);
        assert_eq!(t.existential, 0.75);
    }

    #[test]
    fn test_invalid_explicit_threshold_falls_back() {
        let t = resolve_thresholds(Some(4.0), Some(0.5));
        assert_eq!(t, Thresholds::default());
    }
}
