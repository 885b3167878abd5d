use carbonscout::calculator::{CACHE_RATIO, CarbonCalculator, green_score};
use carbonscout::config::TrackerConfig;
use carbonscout::models::GreenScore;

const MIB: f64 = 1024.0 * 1024.0;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn test_non_positive_bytes_emit_nothing() {
    let calculator = CarbonCalculator::default();
    for bytes in [0.0, -1.0, -1_000_000.0, f64::NEG_INFINITY] {
        assert_eq!(calculator.co2_grams(bytes, false), 0.0);
        assert_eq!(calculator.co2_grams(bytes, true), 0.0);
    }
}

#[test]
fn test_one_mebibyte_first_visit() {
    let calculator = CarbonCalculator::default();
    let co2 = calculator.co2_grams(MIB, false);

    // 1/1024 GB * 0.81 kWh/GB * 442 g/kWh
    assert!(approx_eq(co2, 0.81 * 442.0 / 1024.0));
    assert!((co2 - 0.36).abs() / 0.36 < 0.10, "got {}", co2);
}

#[test]
fn test_returning_visit_uses_cache_ratio() {
    let calculator = CarbonCalculator::default();
    for bytes in [1.0, 1024.0, 500_000.0, 3.5 * MIB, 1e12] {
        let first = calculator.co2_grams(bytes, false);
        let returning = calculator.co2_grams(bytes, true);
        assert!(approx_eq(returning, first * CACHE_RATIO), "bytes = {}", bytes);
    }
}

#[test]
fn test_green_hosting_removes_data_center_segment() {
    let grey = CarbonCalculator::new(false, 442.0);
    let green = CarbonCalculator::new(true, 442.0);

    for bytes in [1024.0, MIB, 10.0 * MIB] {
        let grey_co2 = grey.co2_grams(bytes, false);
        let green_co2 = green.co2_grams(bytes, false);
        assert!(approx_eq(green_co2, grey_co2 * 0.85), "bytes = {}", bytes);
        assert!(approx_eq(grey_co2 - green_co2, grey_co2 * 0.15));
    }
}

#[test]
fn test_emissions_scale_with_grid_intensity() {
    let average = CarbonCalculator::new(false, 442.0);
    let clean = CarbonCalculator::new(false, 221.0);
    assert!(approx_eq(
        clean.co2_grams(MIB, false) * 2.0,
        average.co2_grams(MIB, false)
    ));

    let zero_grid = CarbonCalculator::new(false, 0.0);
    assert_eq!(zero_grid.co2_grams(MIB, false), 0.0);
}

#[test]
fn test_from_config() {
    let config = TrackerConfig {
        green_hosting: true,
        grid_intensity: 100.0,
        ..Default::default()
    };
    let calculator = CarbonCalculator::from_config(&config);
    assert!(calculator.green_hosting());
    assert_eq!(calculator.grid_intensity(), 100.0);

    let default = CarbonCalculator::default();
    assert!(!default.green_hosting());
    assert_eq!(default.grid_intensity(), 442.0);
}

#[test]
fn test_category_co2_matches_first_visit() {
    let calculator = CarbonCalculator::default();
    assert_eq!(
        calculator.category_co2_grams(250_000.0),
        calculator.co2_grams(250_000.0, false)
    );
}

#[test]
fn test_green_score_boundaries() {
    let cases = [
        (0.0, GreenScore::A),
        (0.20, GreenScore::A),
        (0.2000001, GreenScore::B),
        (0.50, GreenScore::B),
        (0.5000001, GreenScore::C),
        (1.00, GreenScore::C),
        (1.0000001, GreenScore::D),
        (2.00, GreenScore::D),
        (2.0000001, GreenScore::F),
        (50.0, GreenScore::F),
    ];

    let calculator = CarbonCalculator::default();
    for (co2, expected) in cases {
        assert_eq!(green_score(co2), expected, "co2 = {}", co2);
        assert_eq!(calculator.green_score(co2), expected, "co2 = {}", co2);
    }
}

#[test]
fn test_green_score_ordering() {
    assert!(GreenScore::A < GreenScore::B);
    assert!(GreenScore::B < GreenScore::C);
    assert!(GreenScore::D < GreenScore::F);
}
