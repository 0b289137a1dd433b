mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use common::run;
use mocksz::{
    background::CmbBackground,
    distribution::Population,
    io::Verbosity,
    kinematic::KinematicConfig,
    math::{linear_grid, midpoint_grid},
    scattering::single_electron_kernel,
    screen::{IsoBetaParameters, OpticalDepthScreen, ScreenMode},
    synthesis::{SignalConfig, SinglePointing},
    transfer::TransferConfig,
};
use ndarray::{Array1, ArrayD};

fn kernel_normalization_error(beta: f64, n_mu: usize) -> f64 {
    let (s, ds) = midpoint_grid(-1.2, 2.4, 3000);
    let kernel = single_electron_kernel(&s, beta, n_mu).unwrap();
    f64::abs(kernel.iter().sum::<f64>() * ds - 1.0)
}

#[test]
fn single_electron_kernels_are_normalized() {
    for beta in [0.01, 0.05, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6] {
        let coarse_error = kernel_normalization_error(beta, 20);
        let error = kernel_normalization_error(beta, 100);
        assert!(error < 1e-2, "beta = {}: error = {}", beta, error);
        assert!(
            error <= coarse_error,
            "beta = {}: error {} larger than with fewer angles ({})",
            beta,
            error,
            coarse_error
        );
    }
}

#[test]
fn isothermal_beta_screen_has_grid_shape() {
    let parameters = IsoBetaParameters {
        ibeta: 0.7,
        ne0: 0.012,
        thetac: 15.0,
        da: 1500.0,
    };
    let azimuths = linear_grid(-45.0, 45.0, 10);
    let mut elevations = linear_grid(-35.0, 35.0, 8);
    elevations[3] = 0.0;
    let mut centered_azimuths = azimuths.clone();
    centered_azimuths[4] = 0.0;

    let screen = OpticalDepthScreen::isothermal_beta(
        &parameters,
        &centered_azimuths,
        &elevations,
        ScreenMode::Grid,
    )
    .unwrap();
    assert_eq!(screen.shape(), &[10, 8]);
    assert!(screen.optical_depths().iter().all(|&tau| tau >= 0.0));
    assert_eq!(
        screen.optical_depths()[[4, 3]],
        parameters.central_optical_depth()
    );
    assert_relative_eq!(
        parameters.central_optical_depth(),
        7.9e-3,
        max_relative = 1e-2
    );
}

#[test]
fn background_toggle_adds_cmb() {
    let pointing = SinglePointing::new(
        TransferConfig::default(),
        KinematicConfig::default(),
        CmbBackground::default(),
        Verbosity::Quiet,
    )
    .unwrap();
    let frequencies = linear_grid(100e9, 500e9, 1000);
    let mut signal = SignalConfig {
        population: Some(Population::thermal(15.33).unwrap()),
        line_of_sight_beta: None,
        optical_depth: 0.01,
        include_background: true,
    };
    let (with_background, report) = pointing.signal(&frequencies, &signal).unwrap();
    assert!(report.unwrap().warning.is_none());
    signal.include_background = false;
    let (without_background, _) = pointing.signal(&frequencies, &signal).unwrap();

    let background = CmbBackground::default().specific_intensities(&frequencies);
    for ((&with, &without), &background) in with_background
        .iter()
        .zip(&without_background)
        .zip(&background)
    {
        assert_relative_eq!(with - without, background, max_relative = 1e-9);
    }
}

def_test!(
OUT[spectrum = "spectrum.json", background = "background.json"]
fn spectrum_command_writes_json {
    run([
        "spectrum",
        "--temperature=15.33",
        "--optical-depth=0.01",
        "--frequency-range=100,500",
        "--n-frequencies=50",
        spectrum,
    ]);
    run([
        "spectrum",
        "--optical-depth=0",
        "--frequency-range=100,500",
        "--n-frequencies=50",
        background,
    ]);
    let spectrum = common::read_json(spectrum);
    let background = common::read_json(background);
    let frequencies = common::json_values(&spectrum, "frequencies");
    assert_eq!(frequencies.len(), 50);
    assert_relative_eq!(frequencies[0], 100e9);
    assert_relative_eq!(frequencies[49], 500e9);
    assert_abs_diff_eq!(spectrum["kernel_integral"].as_f64().unwrap(), 1.0, epsilon = 1e-2);

    let intensity = common::json_values(&spectrum, "intensity");
    let cmb = common::json_values(&background, "intensity");
    // Decrement below the crossover frequency near 220 GHz, increment above
    assert!(intensity[0] < cmb[0]);
    assert!(intensity[49] > cmb[49]);
});

def_test!(
OUT[kernel = "kernel.npy"]
fn multi_kernel_command_writes_npy {
    run([
        "multi-kernel",
        "--alpha=2.5",
        "--n-s=100",
        "--n-beta=50",
        "--n-mu=50",
        kernel,
    ]);
    let values: Array1<f64> = ndarray_npy::read_npy(kernel).unwrap();
    let s_path = kernel.replace("kernel.npy", "kernel_s.npy");
    let s: Array1<f64> = ndarray_npy::read_npy(&s_path).unwrap();
    assert_eq!(values.len(), 100);
    assert_eq!(s.len(), 100);
    assert!(s[0] > -1.5 && s[99] < 10.0);
    assert!(values.iter().all(|&value| value >= 0.0));
});

def_test!(
OUT[screen = "screen.json", trace = "trace.npy"]
fn screen_command_supports_grid_and_trace {
    run([
        "screen",
        "--az-range=-45,45",
        "--n-az=10",
        "--el-range=-35,35",
        "--n-el=8",
        screen,
    ]);
    let output = common::read_json(screen);
    assert_eq!(output["mode"], "grid");
    assert_eq!(output["shape"], serde_json::json!([10, 8]));
    assert_eq!(common::json_values(&output, "optical_depth").len(), 80);

    run([
        "screen",
        "--mode=trace",
        "--az-range=0,60",
        "--n-az=5",
        "--el-range=0,0",
        "--n-el=5",
        trace,
    ]);
    let values: Array1<f64> = ndarray_npy::read_npy(trace).unwrap();
    assert_eq!(values.len(), 5);
    let values = values.to_vec();
    assert!(values.windows(2).all(|pair| pair[1] < pair[0]));
});

def_test!(
OUT[cube = "cube.npy"]
fn screen_command_writes_cube {
    run([
        "screen",
        "--az-range=-30,30",
        "--n-az=3",
        "--el-range=-20,20",
        "--n-el=2",
        "--frequency-range=150,350",
        "--n-frequencies=4",
        "--beta-z=0.001",
        "--no-background",
        cube,
    ]);
    let values: ArrayD<f64> = ndarray_npy::read_npy(cube).unwrap();
    assert_eq!(values.shape(), &[3, 2, 4]);
    assert!(values.iter().all(|&value| value < 0.0));
});

def_test!(
OUT[kernel = "kernel.json", distribution = "distribution.json"]
fn kernel_and_distribution_commands_write_json {
    run(["kernel", "--beta=0.2", "--n-s=1200", kernel]);
    let output = common::read_json(kernel);
    let s = common::json_values(&output, "s");
    let values = common::json_values(&output, "kernel");
    let ds = s[1] - s[0];
    assert_abs_diff_eq!(values.iter().sum::<f64>() * ds, 1.0, epsilon = 1e-2);

    run(["distribution", "--temperature=10", "--n-beta=500", distribution]);
    let output = common::read_json(distribution);
    let beta = common::json_values(&output, "beta");
    let density = common::json_values(&output, "density");
    let dbeta = beta[1] - beta[0];
    assert_abs_diff_eq!(density.iter().sum::<f64>() * dbeta, 1.0, epsilon = 1e-9);
});
