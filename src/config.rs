//! Application configuration.
//!
//! Everything except the `-debug` flag is a compiled-in default. The flag is
//! parsed with the same rules the classic single-dash flag parsers use:
//! `-debug`, `--debug` and `-debug=<bool>` are accepted, parsing stops at the
//! first positional argument or after `--`.

use std::fmt;

use cgmath::{Deg, Point3, Rad};
use log::LevelFilter;
use thiserror::Error;

use crate::pipelines::light::AmbientLight;

pub const USAGE: &str = "Usage of cube:\n  -debug\n    \tdisplay the debug log";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CliError {
    /// `-h`, `-help` or `--help` was passed.
    #[error("help requested")]
    Help,
    #[error("flag provided but not defined: -{0}")]
    UnknownFlag(String),
    #[error("invalid boolean value {value:?} for -{flag}")]
    InvalidValue { flag: String, value: String },
}

impl CliError {
    /// Exit status used when the process terminates because of this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Help => 0,
            _ => 2,
        }
    }

    /// What the process prints before exiting with [`CliError::exit_code`].
    pub fn report(&self) -> String {
        match self {
            CliError::Help => USAGE.to_string(),
            e => format!("{}\n{}", e, USAGE),
        }
    }
}

/// Limits applied to the orbit control attached to the camera.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitSettings {
    pub enabled: bool,
    pub enable_pan: bool,
    pub max_polar_angle: Rad<f32>,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            enable_pan: false,
            max_polar_angle: Rad(2.0 * std::f32::consts::PI / 3.0),
            min_distance: 5.0,
            max_distance: 15.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub debug: bool,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    /// Wrap every frame's submission in a GPU validation scope.
    pub check_errors: bool,
    pub clear_colour: wgpu::Color,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub camera_position: Point3<f32>,
    pub camera_target: Point3<f32>,
    pub orbit: OrbitSettings,
    pub ambient: AmbientLight,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            title: "Cube".to_string(),
            width: 1200,
            height: 900,
            fullscreen: false,
            check_errors: false,
            clear_colour: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
            fovy: Deg(65.0),
            znear: 0.01,
            zfar: 1000.0,
            camera_position: Point3::new(0.0, 4.0, 5.0),
            camera_target: Point3::new(0.0, 0.0, 0.0),
            orbit: OrbitSettings::default(),
            ambient: AmbientLight::default(),
        }
    }
}

impl Config {
    /// Parse the process arguments, `args` must not contain the program name.
    pub fn from_args<I, S>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            if arg == "--" || !arg.starts_with('-') || arg == "-" {
                break;
            }
            let flag = arg.strip_prefix("--").unwrap_or(&arg[1..]);
            let (name, value) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (flag, None),
            };
            match name {
                "h" | "help" => return Err(CliError::Help),
                "debug" => {
                    config.debug = match value {
                        None => true,
                        Some(value) => parse_bool(value).ok_or_else(|| CliError::InvalidValue {
                            flag: name.to_string(),
                            value: value.to_string(),
                        })?,
                    }
                }
                _ => return Err(CliError::UnknownFlag(name.to_string())),
            }
        }
        Ok(config)
    }

    /// Parse the process arguments. Help goes to stdout and exits with 0, a
    /// bad flag goes to stderr and exits with 2.
    pub fn from_env_or_exit() -> Self {
        match Self::from_args(std::env::args().skip(1)) {
            Ok(config) => config,
            Err(e @ CliError::Help) => {
                println!("{}", e.report());
                std::process::exit(e.exit_code());
            }
            Err(e) => {
                eprintln!("{}", e.report());
                std::process::exit(e.exit_code());
            }
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}x{} (debug: {}, check errors: {})",
            self.title, self.width, self.height, self.debug, self.check_errors
        )
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
