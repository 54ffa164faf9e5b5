//! End-to-end tests for the airport pipeline on synthetic traffic

#![cfg(feature = "synthetic")]

use corridorfit::pipeline::process_airport_by_code;
use corridorfit::synthetic::SyntheticScenario;
use corridorfit::{
    AirportTable, CorridorError, FitConfig, PipelineConfig, TrackWindow, process_airport,
    sample_points,
};

fn quadratic_config() -> PipelineConfig {
    PipelineConfig {
        fit: FitConfig {
            degree: 2,
            ..FitConfig::default()
        },
        ..PipelineConfig::default()
    }
}

#[test]
fn test_parabolic_approach_single_corridor() {
    let dataset = SyntheticScenario::parabolic_approach().generate();
    let result = process_airport(&dataset.log, &dataset.airport, &quadratic_config()).unwrap();

    assert_eq!(result.corridors.len(), 1);
    assert_eq!(result.corridors[0].size(), 200);
    assert_eq!(result.curves.len(), 1);
    assert!(result.failures.is_empty());

    let curve = &result.curves[0];
    let truth = &dataset.expected[0].truth;
    let leading = curve.polynomial.power_coefficients()[0];
    assert!((leading - 10.0).abs() < 0.1, "leading coefficient {}", leading);
    for i in 0..=10 {
        let lng = curve.domain_min + (curve.domain_max - curve.domain_min) * i as f64 / 10.0;
        assert!((curve.eval(lng) - truth.eval(lng)).abs() < 1e-4);
    }

    let samples = sample_points(curve, 0.3).unwrap();
    assert!(!samples.is_empty());
    for s in &samples {
        assert!((s.lat - truth.eval(s.lng)).abs() < 1e-4);
    }
}

#[test]
fn test_default_degree_fit_tracks_truth() {
    let dataset = SyntheticScenario::parabolic_approach().generate();
    let result = process_airport(&dataset.log, &dataset.airport, &PipelineConfig::default()).unwrap();

    assert_eq!(result.curves.len(), 1);
    let curve = &result.curves[0];
    assert_eq!(curve.degree(), 20);

    // Interior only: a high-degree fit may flare at the ends of its span
    let truth = &dataset.expected[0].truth;
    for i in 2..=8 {
        let lng = curve.domain_min + (curve.domain_max - curve.domain_min) * i as f64 / 10.0;
        assert!((curve.eval(lng) - truth.eval(lng)).abs() < 1e-3);
    }
}

#[test]
fn test_search_plans_and_validation() {
    let dataset = SyntheticScenario::parabolic_approach().generate();
    let result = process_airport(&dataset.log, &dataset.airport, &quadratic_config()).unwrap();

    let plans = result.search_plans(0.3);
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].label, Some(0));
    assert!(plans[0].requests.len() > 5);

    let truth = &dataset.expected[0].truth;
    let accepted = result.validate(truth.eval(-71.10), -71.10, 0.3).unwrap();
    assert_eq!(accepted.len(), 1);
    let (label, candidate) = accepted[0];
    assert_eq!(label, 0);
    assert!(candidate.distance_from_curve_miles < 0.01);
    assert!(candidate.mean_altitude_ft > 900.0 && candidate.mean_altitude_ft < 2500.0);

    let rejected = result.validate(42.20, -71.10, 0.3).unwrap();
    assert!(rejected.is_empty());
}

#[test]
fn test_track_window_failure_is_corridor_scoped() {
    // Only the last stretch of the approach is under 1000 ft: too few points
    // to fit, but the run itself succeeds
    let dataset = SyntheticScenario::parabolic_approach().generate();
    let config = PipelineConfig {
        window: Some(TrackWindow {
            max_altitude_ft: 1000.0,
            ..TrackWindow::default()
        }),
        ..PipelineConfig::default()
    };

    let result = process_airport(&dataset.log, &dataset.airport, &config).unwrap();
    assert!(result.curves.is_empty());
    assert_eq!(result.failures.len(), 1);
    assert!(matches!(
        result.failures[0].error,
        CorridorError::InsufficientData { .. }
    ));
}

#[test]
fn test_unknown_airport_is_lookup_missing() {
    let dataset = SyntheticScenario::parabolic_approach().generate();
    let table = AirportTable::new([dataset.airport.clone()]);

    let result = process_airport_by_code(&dataset.log, "XYZ", &table, &PipelineConfig::default());
    assert!(matches!(
        result,
        Err(CorridorError::ExternalLookupMissing { ref code }) if code == "XYZ"
    ));
}

#[cfg(feature = "parallel")]
#[test]
fn test_process_airports_isolates_failures() {
    use corridorfit::pipeline::AirportJob;
    use corridorfit::process_airports;

    let dataset = SyntheticScenario::parabolic_approach().generate();
    let table = AirportTable::new([dataset.airport.clone()]);
    let jobs = vec![
        AirportJob {
            code: "BOS".to_string(),
            log: dataset.log.clone(),
        },
        AirportJob {
            code: "XYZ".to_string(),
            log: dataset.log,
        },
    ];

    let results = process_airports(&jobs, &table, &quadratic_config());
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "BOS");
    assert_eq!(results[0].1.as_ref().unwrap().curves.len(), 1);
    assert!(matches!(
        results[1].1,
        Err(CorridorError::ExternalLookupMissing { .. })
    ));
}

#[test]
fn test_two_way_traffic_fits_every_selected_corridor() {
    let dataset = SyntheticScenario::two_way_traffic().generate();
    let result = process_airport(&dataset.log, &dataset.airport, &quadratic_config()).unwrap();

    let labels: Vec<Option<i32>> = result.curves.iter().map(|c| c.label()).collect();
    assert_eq!(result.corridors.len(), 3);
    assert_eq!(result.curves.len(), 3);
    for label in [Some(0), Some(1), Some(2)] {
        assert!(labels.contains(&label));
    }
}
