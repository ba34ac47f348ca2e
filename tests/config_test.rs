use cgmath::{Deg, Point3, Rad};
use flow_cube::{
    config::{CliError, Config},
    logging,
    pipelines::light::AmbientLight,
};
use log::LevelFilter;

use crate::common::test_utils::assert_close;

mod common;

#[test]
fn defaults_describe_the_cube_window() {
    let config = Config::from_args(Vec::<String>::new()).unwrap();

    assert!(!config.debug);
    assert_eq!(config.title, "Cube");
    assert_eq!((config.width, config.height), (1200, 900));
    assert!(!config.fullscreen);
    assert!(!config.check_errors);
    assert_eq!(config.clear_colour, wgpu::Color { r: 0.1, g: 0.1, b: 0.1, a: 1.0 });
    assert_eq!(config.fovy, Deg(65.0));
    assert_eq!(config.camera_position, Point3::new(0.0, 4.0, 5.0));
    assert_eq!(config.camera_target, Point3::new(0.0, 0.0, 0.0));
    assert_close(config.aspect(), 1.333_333_3);
}

#[test]
fn ambient_light_is_white_at_forty_percent() {
    let config = Config::default();

    assert_eq!(config.ambient, AmbientLight::new([1.0, 1.0, 1.0], 0.4));
    assert_eq!(config.ambient.contribution(), [0.4, 0.4, 0.4]);
}

#[test]
fn orbit_defaults() {
    let orbit = Config::default().orbit;

    assert!(!orbit.enabled);
    assert!(!orbit.enable_pan);
    assert_close(orbit.max_polar_angle.0, Rad(2.0 * std::f32::consts::PI / 3.0).0);
    assert_eq!(orbit.min_distance, 5.0);
    assert_eq!(orbit.max_distance, 15.0);
}

#[test]
fn debug_flag_selects_log_level() {
    assert_eq!(Config::from_args(["x"]).unwrap().log_level(), LevelFilter::Info);
    for args in [["-debug"], ["--debug"], ["-debug=true"], ["-debug=1"], ["--debug=T"]] {
        let config = Config::from_args(args).unwrap();
        assert!(config.debug, "{:?}", args);
        assert_eq!(config.log_level(), LevelFilter::Debug);
    }
    assert!(!Config::from_args(["-debug=false"]).unwrap().debug);
    assert!(!Config::from_args(["-debug=0"]).unwrap().debug);
}

#[test]
fn parsing_stops_at_positional_arguments() {
    assert!(!Config::from_args(["level1", "-debug"]).unwrap().debug);
    assert!(!Config::from_args(["--", "-debug"]).unwrap().debug);
    assert!(Config::from_args(["-debug", "level1", "-nope"]).unwrap().debug);
}

#[test]
fn help_and_unknown_flags() {
    for help in ["-h", "-help", "--help"] {
        let err = Config::from_args([help]).unwrap_err();
        assert_eq!(err, CliError::Help);
        assert_eq!(err.exit_code(), 0);
    }

    let err = Config::from_args(["-verbose"]).unwrap_err();
    assert_eq!(err, CliError::UnknownFlag("verbose".into()));
    assert_eq!(err.exit_code(), 2);

    let err = Config::from_args(["-debug=yes"]).unwrap_err();
    assert_eq!(
        err,
        CliError::InvalidValue {
            flag: "debug".into(),
            value: "yes".into()
        }
    );
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn logger_uses_the_configured_level() {
    let config = Config::from_args(["-debug"]).unwrap();
    let logger = logging::builder(&config).build();

    assert_eq!(logger.filter(), LevelFilter::Debug);
}

#[test]
fn cli_errors_report_usage() {
    assert_eq!(CliError::Help.report(), flow_cube::config::USAGE);

    let report = CliError::UnknownFlag("verbose".into()).report();
    assert!(report.starts_with("flag provided but not defined: -verbose\n"));
    assert!(report.ends_with(flow_cube::config::USAGE));
}
