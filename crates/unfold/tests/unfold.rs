//! Integration tests for the unfolding solvers and dispatcher

use nalgebra::DMatrix;
use origami_spectrum::Form;
use origami_unfold::{fold, unfold, Error, GravelOptions, MaxedOptions, Method, Problem};
use rstest::{fixture, rstest};

/// Three detectors over seven bins, responses folded from `[5, 6, 4, 3, 3, 2, 1]`
struct System {
    responses: Vec<f64>,
    variances: Vec<f64>,
    matrix: DMatrix<f64>,
    default: Vec<f64>,
}

impl System {
    fn run(&self, method: &Method) -> origami_unfold::Result<origami_unfold::Solution> {
        unfold(
            &self.responses,
            &self.variances,
            &self.matrix,
            &self.default,
            method,
        )
    }

    fn chi_squared(&self, flux: &[f64]) -> f64 {
        let folded = fold(&self.matrix, flux).unwrap();
        folded
            .iter()
            .zip(&self.responses)
            .zip(&self.variances)
            .map(|((f, n), s2)| (f - n).powi(2) / s2)
            .sum()
    }
}

#[fixture]
fn wide() -> System {
    #[rustfmt::skip]
    let matrix = DMatrix::from_row_slice(3, 7, &[
        9.0, 8.0, 6.0, 4.0, 2.0, 2.0, 1.0,
        1.0, 2.0, 3.0, 5.0, 3.0, 2.0, 1.0,
        0.0, 0.0, 0.0, 0.0, 3.0, 4.0, 3.0,
    ]);

    System {
        responses: vec![140.0, 58.0, 20.0],
        variances: vec![0.1, 0.1, 0.1],
        matrix,
        default: vec![4.5, 6.5, 3.5, 3.0, 2.5, 1.5, 0.5],
    }
}

#[fixture]
fn square() -> System {
    #[rustfmt::skip]
    let matrix = DMatrix::from_row_slice(3, 3, &[
        4.0, 1.0, 0.5,
        1.0, 3.0, 1.0,
        0.2, 1.0, 5.0,
    ]);

    System {
        responses: vec![11.5, 12.0, 8.4],
        variances: vec![0.1, 0.1, 0.1],
        matrix,
        default: vec![1.0, 1.0, 1.0],
    }
}

fn gravel(tol: f64) -> Method {
    Method::Gravel(GravelOptions {
        tol,
        ..Default::default()
    })
}

fn maxed(omega: f64) -> Method {
    Method::Maxed(MaxedOptions {
        omega,
        ..Default::default()
    })
}

#[rstest]
fn gravel_reaches_tolerance(wide: System) {
    let solution = wide.run(&gravel(1e-4)).unwrap();

    assert!(solution.iterations < 1000);
    assert!(solution.residual <= 1e-4, "residual {}", solution.residual);
    assert!(solution.flux.iter().all(|f| *f >= 0.0));
    assert_eq!(solution.evolution, None);
}

#[rstest]
fn gravel_recovers_square_system(square: System) {
    let initial = Problem::new(
        &square.responses,
        &square.variances,
        &square.matrix,
        &square.default,
    )
    .unwrap()
    .residual(&square.default);

    let solution = square.run(&gravel(1e-6)).unwrap();
    assert!(solution.residual <= initial);
    assert!(solution.residual <= 1e-6);

    for (f, expected) in solution.flux.iter().zip([2.0, 3.0, 1.0]) {
        assert!((f - expected).abs() < 1e-5, "{f} vs {expected}");
    }
}

#[rstest]
#[case(0)] // case 1
#[case(1)] // case 2
#[case(6)] // case 3
fn zero_default_bin_stays_zero(mut wide: System, #[case] bin: usize) {
    wide.default[bin] = 0.0;

    let gravel = wide.run(&gravel(1e-4)).unwrap();
    assert_eq!(gravel.flux[bin], 0.0);

    let maxed = wide.run(&maxed(3.0)).unwrap();
    assert_eq!(maxed.flux[bin], 0.0);
}

#[rstest]
fn gravel_iteration_limit(wide: System) {
    let method = Method::Gravel(GravelOptions {
        max_iter: 5,
        tol: 0.0,
        ..Default::default()
    });

    let solution = wide.run(&method).unwrap();
    assert_eq!(solution.iterations, 5);

    let method = Method::Gravel(GravelOptions {
        max_iter: 0,
        ..Default::default()
    });

    let solution = wide.run(&method).unwrap();
    assert_eq!(solution.iterations, 0);
    assert_eq!(solution.flux, wide.default);
}

#[rstest]
fn gravel_evolution_is_diagnostic_only(wide: System) {
    let plain = wide.run(&gravel(1e-4)).unwrap();

    let method = Method::Gravel(GravelOptions {
        evolution: true,
        ..Default::default()
    });
    let recorded = wide.run(&method).unwrap();

    assert_eq!(plain.flux, recorded.flux);
    assert_eq!(plain.iterations, recorded.iterations);

    let evolution = recorded.evolution.unwrap();
    assert_eq!(evolution.len(), recorded.iterations + 1);
    assert_eq!(evolution.first().unwrap(), &wide.default);
    assert_eq!(evolution.last().unwrap(), &recorded.flux);
}

#[rstest]
fn gravel_is_deterministic(wide: System) {
    let a = wide.run(&gravel(1e-4)).unwrap();
    let b = wide.run(&gravel(1e-4)).unwrap();
    assert_eq!(a, b);
}

#[rstest]
#[case(1.0)] // case 1
#[case(3.0)] // case 2
#[case(10.0)] // case 3
fn maxed_matches_target_deviation(wide: System, #[case] omega: f64) {
    let solution = wide.run(&maxed(omega)).unwrap();

    let chi2 = wide.chi_squared(&solution.flux);
    assert!((chi2 - omega).abs() < 0.05 * omega, "chi2 {chi2} for omega {omega}");

    let default_residual = fold(&wide.matrix, &wide.default)
        .unwrap()
        .iter()
        .zip(&wide.responses)
        .map(|(f, n)| (f - n).powi(2))
        .sum::<f64>()
        .sqrt();
    assert!(solution.residual < default_residual);

    assert!(solution.flux.iter().all(|f| *f >= 0.0));
    assert_eq!(solution.iterations, 100);
    assert_eq!(solution.evolution, None);
}

#[rstest]
fn maxed_is_reproducible(square: System) {
    let method = Method::Maxed(MaxedOptions {
        omega: 3.0,
        seed: 11,
        chains: 3,
        hops: 20,
        ..Default::default()
    });

    let a = square.run(&method).unwrap();
    let b = square.run(&method).unwrap();
    assert_eq!(a, b);
}

#[rstest]
#[case(gravel(1e-4))] // case 1
#[case(maxed(3.0))] // case 2
fn caller_data_untouched(wide: System, #[case] method: Method) {
    let before = (
        wide.responses.clone(),
        wide.variances.clone(),
        wide.matrix.clone(),
        wide.default.clone(),
    );

    wide.run(&method).unwrap();
    assert_eq!(
        before,
        (wide.responses, wide.variances, wide.matrix, wide.default)
    );
}

#[rstest]
fn scaled_default_starts_gravel(wide: System) {
    let method = Method::Gravel(GravelOptions {
        max_iter: 0,
        scale: true,
        ..Default::default()
    });

    // folds to [134, 54, 15]
    let factor = (140.0 / 134.0 + 58.0 / 54.0 + 20.0 / 15.0) / 3.0;
    let solution = wide.run(&method).unwrap();

    for (f, d) in solution.flux.iter().zip(&wide.default) {
        assert!((f - d * factor).abs() < 1e-12);
    }
}

#[rstest]
fn scaled_default_starts_maxed(wide: System) {
    let method = |scale| {
        Method::Maxed(MaxedOptions {
            omega: 3.0,
            scale,
            hops: 10,
            ..Default::default()
        })
    };

    // folds to [134, 54, 15]
    let factor = (140.0 / 134.0 + 58.0 / 54.0 + 20.0 / 15.0) / 3.0;
    let scaled = wide.run(&method(true)).unwrap();

    // same as handing the solver a default that was scaled beforehand
    let manual = System {
        default: wide.default.iter().map(|d| d * factor).collect(),
        ..wide
    };
    let expected = manual.run(&method(false)).unwrap();

    assert_eq!(scaled.flux, expected.flux);
    assert!((manual.chi_squared(&scaled.flux) - 3.0).abs() < 0.15);
}

#[rstest]
fn shape_errors_come_first(wide: System) {
    let result = unfold(
        &wide.responses,
        &[0.1, 0.1],
        &wide.matrix,
        &wide.default,
        &maxed(1.0),
    );
    assert_eq!(
        result.unwrap_err(),
        Error::ShapeMismatch {
            name: "variances",
            expected: 3,
            found: 2
        }
    );

    let result = unfold(
        &wide.responses,
        &wide.variances,
        &wide.matrix,
        &wide.default[..6],
        &gravel(1e-4),
    );
    assert_eq!(
        result.unwrap_err(),
        Error::MatrixShapeMismatch {
            rows: 3,
            cols: 7,
            detectors: 3,
            bins: 6
        }
    );
}

#[rstest]
fn unsupported_and_invalid_methods(wide: System) {
    assert_eq!(
        wide.run(&Method::StaySl).unwrap_err(),
        Error::NotImplemented("STAY'SL")
    );

    let result = wide.run(&gravel(-1.0));
    assert!(matches!(
        result,
        Err(Error::InvalidOption { name: "tol", .. })
    ));

    let result = wide.run(&maxed(0.0));
    assert!(matches!(
        result,
        Err(Error::InvalidOption { name: "omega", .. })
    ));
}

#[rstest]
#[case(r#"{"method":"gravel","max_iter":1000,"tol":1e-4}"#, gravel(1e-4))] // case 1
#[case(r#"{"method":"gravel"}"#, Method::Gravel(GravelOptions::default()))] // case 2
#[case(r#"{"method":"maxed","omega":3.0}"#, maxed(3.0))] // case 3
#[case(r#"{"method":"staysl"}"#, Method::StaySl)] // case 4
fn methods_from_json(#[case] json: &str, #[case] expected: Method) {
    let method: Method = serde_json::from_str(json).unwrap();
    assert_eq!(method, expected);
}

#[rstest]
fn unknown_method_is_rejected() {
    assert!(serde_json::from_str::<Method>(r#"{"method":"doroshenko"}"#).is_err());
}

#[rstest]
fn solution_as_spectrum(square: System) {
    let solution = square.run(&gravel(1e-6)).unwrap();
    let spectrum = solution
        .to_spectrum(&[0.0, 1.0, 3.0, 4.0], Form::Integral)
        .unwrap();

    assert_eq!(spectrum.integral(), solution.flux.as_slice());
    assert!((spectrum.total() - 6.0).abs() < 1e-5);

    // spectrum errors come through with their own message
    let error = solution
        .to_spectrum(&[0.0, 1.0], Form::Integral)
        .unwrap_err();
    assert!(matches!(error, Error::Spectrum(_)));
    assert_eq!(
        error.to_string(),
        "expected 3 or 4 bin edges for 3 values, found 2"
    );
}
