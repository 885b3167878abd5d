mod server;

use carbonscout::calculator::{CarbonCalculator, DEFAULT_GRID_INTENSITY};
use carbonscout::cli::{Cli, DEFAULT_CONCURRENCY, DEFAULT_OUTPUT};
use carbonscout::models::PageCarbonReport;
use carbonscout::run;
use server::start_fixture_server;
use std::fs;
use std::process::Command;
use uuid::Uuid;

fn create_test_args(url: &str) -> Cli {
    Cli {
        url: url.to_string(),
        content_id: None,
        output: DEFAULT_OUTPUT.to_string(),
        save: None,
        green_hosting: false,
        grid_intensity: DEFAULT_GRID_INTENSITY,
        resource_timeout: 5,
        page_timeout: 30,
        concurrency: DEFAULT_CONCURRENCY,
        rate_limit: None,
        verbose: false,
        config: None,
    }
}

#[tokio::test]
#[serial_test::serial]
async fn test_invalid_url_no_protocol() {
    let result = run(create_test_args("example.com")).await;
    assert!(
        result.is_err(),
        "Should return error for URL without protocol"
    );
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("URL must start with http:// or https://"),
        "Error message should mention URL protocol requirement"
    );
}

#[tokio::test]
#[serial_test::serial]
async fn test_invalid_url_ftp_protocol() {
    let result = run(create_test_args("ftp://example.com")).await;
    assert!(
        result.is_err(),
        "Should return error for non-HTTP(S) protocol"
    );
}

#[tokio::test]
#[serial_test::serial]
async fn test_invalid_url_after_protocol() {
    let result = run(create_test_args("http://")).await;
    assert!(result.unwrap_err().to_string().contains("Invalid URL"));
}

#[tokio::test]
#[serial_test::serial]
async fn test_unreachable_page_is_an_error() {
    let result = run(create_test_args("http://127.0.0.1:1/")).await;
    let message = result.unwrap_err().to_string();
    assert!(message.contains("Failed to analyze page"), "{}", message);
}

#[tokio::test]
#[serial_test::serial]
async fn test_analysis_with_text_output() {
    let base_url = start_fixture_server().await;

    let result = run(create_test_args(&base_url)).await;
    assert!(result.is_ok(), "Text analysis failed: {:?}", result.err());
}

#[tokio::test]
#[serial_test::serial]
async fn test_analysis_with_json_output() {
    let base_url = start_fixture_server().await;

    let mut args = create_test_args(&base_url);
    args.output = "json".to_string();

    let result = run(args).await;
    assert!(result.is_ok(), "JSON analysis failed: {:?}", result.err());
}

#[tokio::test]
#[serial_test::serial]
async fn test_analysis_with_save_file() {
    let base_url = start_fixture_server().await;
    let temp_dir = tempfile::tempdir().unwrap();
    let report_path = temp_dir.path().join("report.json");
    let content_id = Uuid::new_v4();

    let mut args = create_test_args(&base_url);
    args.output = "json".to_string();
    args.save = Some(report_path.to_str().unwrap().to_string());
    args.content_id = Some(content_id);

    run(args).await.unwrap();

    let content = fs::read_to_string(&report_path).unwrap();
    let report: PageCarbonReport = serde_json::from_str(&content).unwrap();
    assert_eq!(report.content_id, content_id);
    assert_eq!(report.page_url, base_url);
    assert_eq!(report.resource_count, 12);
    assert!(report.estimated_co2_grams > 0.0);
    assert!(!report.suggestions.is_empty());
}

#[tokio::test]
#[serial_test::serial]
async fn test_green_hosting_flag_lowers_saved_emissions() {
    let base_url = start_fixture_server().await;
    let temp_dir = tempfile::tempdir().unwrap();
    let grey_path = temp_dir.path().join("grey.json");
    let green_path = temp_dir.path().join("green.json");

    let mut grey = create_test_args(&base_url);
    grey.output = "json".to_string();
    grey.save = Some(grey_path.to_str().unwrap().to_string());
    run(grey).await.unwrap();

    let mut green = create_test_args(&base_url);
    green.output = "json".to_string();
    green.green_hosting = true;
    green.save = Some(green_path.to_str().unwrap().to_string());
    run(green).await.unwrap();

    let grey: PageCarbonReport =
        serde_json::from_str(&fs::read_to_string(&grey_path).unwrap()).unwrap();
    let green: PageCarbonReport =
        serde_json::from_str(&fs::read_to_string(&green_path).unwrap()).unwrap();

    assert_eq!(
        grey.total_transfer_size_bytes,
        green.total_transfer_size_bytes
    );
    assert!((green.estimated_co2_grams - grey.estimated_co2_grams * 0.85).abs() < 1e-9);
}

#[tokio::test]
#[serial_test::serial]
async fn test_analysis_with_rate_limit_and_verbose() {
    let base_url = start_fixture_server().await;

    let mut args = create_test_args(&base_url);
    args.rate_limit = Some(50.0);
    args.verbose = true;
    args.concurrency = 2;

    let result = run(args).await;
    assert!(result.is_ok(), "Rate limited analysis failed: {:?}", result.err());
}

#[tokio::test]
#[serial_test::serial]
async fn test_analysis_with_config_file() {
    let base_url = start_fixture_server().await;
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("carbonscout.toml");
    let report_path = temp_dir.path().join("from-config.json");

    let toml_content = format!(
        "output = \"json\"\nsave = {:?}\ngrid_intensity = 221.0\n",
        report_path.to_str().unwrap()
    );
    fs::write(&config_path, toml_content).unwrap();

    let mut args = create_test_args(&base_url);
    args.config = Some(config_path.to_str().unwrap().to_string());

    run(args).await.unwrap();

    // The save path came from the file
    let report: PageCarbonReport =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    let expected = CarbonCalculator::new(false, 221.0)
        .co2_grams(report.total_transfer_size_bytes, false);
    assert!((report.estimated_co2_grams - expected).abs() < 1e-12);
}

#[tokio::test]
#[serial_test::serial]
async fn test_load_default_config_from_current_dir() {
    use std::env;

    let base_url = start_fixture_server().await;

    let temp_dir = tempfile::tempdir().unwrap();
    let original_dir = env::current_dir().unwrap();
    env::set_current_dir(&temp_dir).unwrap();

    let config_path = temp_dir.path().join("carbonscout.json");
    fs::write(&config_path, r#"{ "save": "default-report.json" }"#).unwrap();

    let result = run(create_test_args(&base_url)).await;
    let saved = temp_dir.path().join("default-report.json").exists();

    env::set_current_dir(original_dir).unwrap();

    assert!(result.is_ok(), "Analysis failed: {:?}", result.err());
    assert!(saved, "Report should be saved to the path from carbonscout.json");
}

#[test]
#[serial_test::serial]
fn test_binary_with_invalid_url() {
    let output = Command::new(env!("CARGO_BIN_EXE_carbonscout"))
        .arg("example.com")
        .output()
        .expect("Failed to run binary");

    assert!(!output.status.success(), "Should exit with error code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("URL must start with http:// or https://"),
        "Error message should mention URL protocol requirement"
    );
}

#[test]
#[serial_test::serial]
fn test_binary_with_unreachable_url() {
    let output = Command::new(env!("CARGO_BIN_EXE_carbonscout"))
        .args(["http://127.0.0.1:1/", "--output", "json"])
        .output()
        .expect("Failed to run binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to analyze page"));
    assert!(output.stdout.is_empty());
}

#[tokio::test]
#[serial_test::serial]
async fn test_binary_json_output_stays_parseable_when_saving() {
    let base_url = start_fixture_server().await;
    let temp_dir = tempfile::tempdir().unwrap();
    let report_path = temp_dir.path().join("piped.json");

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_carbonscout"))
        .arg(&base_url)
        .args(["--output", "json", "--save"])
        .arg(report_path.to_str().unwrap())
        .env_remove("RUST_LOG")
        .output()
        .await
        .expect("Failed to run binary");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    // stdout carries the report and nothing else
    let printed: PageCarbonReport =
        serde_json::from_slice(&output.stdout).expect("stdout should be a single JSON report");
    let saved: PageCarbonReport =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(printed, saved);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Report saved to:"));
}
