//! Calibration: where the sensor sits in the room.
//!
//! A calibration file is TOML.  An explicit `[leap]` section wins:
//!
//! ```toml
//! [leap]
//! cent = [0.0, -200.0, 500.0]   # sensor origin, absolute mm
//! norm = [0.0, 1.0, 0.0]        # direction the sensor looks
//! over = [1.0, 0.0, 0.0]        # direction of its long edge
//! ```
//!
//! Without one, the sensor is assumed to lie face-up 20 cm below and 50 cm
//! in front of the centre of the `main` screen:
//!
//! ```toml
//! [screens.main]
//! cent = [0.0, 0.0, 0.0]
//! over = [1.0, 0.0, 0.0]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use gripe_frame::{SpatialTransform, Vector3};
use serde::Deserialize;

use crate::error::{SplashError, SplashResult};

/// Sensor drop below the screen centre, mm.
pub const DEFAULT_Y_DISTANCE: f64 = 200.0;
/// Sensor offset in front of the screen, mm.
pub const DEFAULT_Z_DISTANCE: f64 = 500.0;
/// Screen the fallback placement is inferred from.
pub const MAIN_SCREEN: &str = "main";

// ════════════════════════════════════════════════════════════════════════════
// On-disk shape
// ════════════════════════════════════════════════════════════════════════════

/// Explicit sensor placement.  Every field must be present to be used.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LeapPlacement {
    pub cent: Option<Vector3>,
    pub norm: Option<Vector3>,
    pub over: Option<Vector3>,
}

/// A display surface in the room.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ScreenPlacement {
    pub cent: Option<Vector3>,
    pub over: Option<Vector3>,
}

/// A whole calibration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CalibrationDocument {
    #[serde(default)]
    pub leap:    Option<LeapPlacement>,
    #[serde(default)]
    pub screens: HashMap<String, ScreenPlacement>,
}

/// Resolved placement, ready to become a transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationConfig {
    pub origin: Vector3,
    pub normal: Vector3,
    pub over:   Vector3,
}

impl CalibrationConfig {
    pub fn transform(&self) -> SpatialTransform {
        SpatialTransform::new(self.origin, self.normal, self.over)
    }
}

impl CalibrationDocument {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// The explicit `[leap]` placement, or one inferred from the main
    /// screen, or nothing.
    pub fn resolve(&self) -> Option<CalibrationConfig> {
        if let Some(LeapPlacement { cent: Some(origin), norm: Some(normal), over: Some(over) }) =
            &self.leap
        {
            return Some(CalibrationConfig { origin: *origin, normal: *normal, over: *over });
        }

        let screen = self.screens.get(MAIN_SCREEN)?;
        let (cent, over) = (screen.cent?, screen.over?);
        let normal = Vector3::new(0.0, 1.0, 0.0);
        let origin = cent
            - (DEFAULT_Y_DISTANCE * normal.norm() + DEFAULT_Z_DISTANCE * normal.cross(over).norm());
        Some(CalibrationConfig { origin, normal, over })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Calibrator
// ════════════════════════════════════════════════════════════════════════════

/// Turn a document into a transform.
pub fn calibrate(doc: &CalibrationDocument) -> SplashResult<SpatialTransform> {
    doc.resolve()
        .map(|c| c.transform())
        .ok_or_else(|| SplashError::ConfigurationMissing { tried: "document".to_string() })
}

/// Read and parse a calibration file.
pub fn load_calibration(path: &Path) -> SplashResult<CalibrationDocument> {
    let text = fs::read_to_string(path)
        .map_err(|source| SplashError::ConfigRead { path: path.to_path_buf(), source })?;
    CalibrationDocument::from_toml(&text)
        .map_err(|source| SplashError::ConfigParse { path: path.to_path_buf(), source })
}

/// Calibrate from `primary` if given and usable, else from the `fallback`
/// screen description.
///
/// Unreadable, unparsable or incomplete files count as "not supplied".
/// Returns the transform and the file it came from.
pub fn calibrate_from_paths(
    primary:  Option<&Path>,
    fallback: &Path,
) -> SplashResult<(SpatialTransform, PathBuf)> {
    let mut tried = Vec::new();

    for path in primary.into_iter().chain(std::iter::once(fallback)) {
        tried.push(path.display().to_string());
        tracing::warn!(path = %path.display(), "configuring leap from file");

        let doc = match load_calibration(path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "calibration file skipped");
                continue;
            }
        };
        match doc.resolve() {
            Some(cfg) => {
                tracing::info!(
                    origin = ?cfg.origin,
                    normal = ?cfg.normal,
                    over   = ?cfg.over,
                    "sensor calibrated"
                );
                return Ok((cfg.transform(), path.to_path_buf()));
            }
            None => tracing::warn!(path = %path.display(), "no leap or main screen placement in file"),
        }
    }

    Err(SplashError::ConfigurationMissing { tried: tried.join(", ") })
}
