use jsonschema::validator_for;
use serde_json::Value;
use test_support;

fn compile_schema(name: &str) -> jsonschema::Validator {
  let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
  let path = manifest_dir.join("tests").join("schemas").join(name);
  let data = std::fs::read(&path).expect("schema file");
  let schema: Value = serde_json::from_slice(&data).expect("valid schema JSON");
  validator_for(&schema).expect("compile schema")
}

fn report_json(args: &[&str]) -> Value {
  let mut cmd = test_support::cmd_bin("gh-productivity-report");
  let out = cmd.args(args).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn plain_report_conforms_to_schema() {
  let dataset = test_support::fixture_path("dataset.json");
  let v = report_json(&["--input", dataset.to_str().unwrap()]);

  let compiled = compile_schema("report.schema.json");
  if let Err(e) = compiled.validate(&v) {
    panic!("schema validation failed for plain report: {e}");
  }
}

#[test]
fn full_report_conforms_to_schema() {
  let dataset = test_support::fixture_path("dataset.json");
  let v = report_json(&[
    "--input",
    dataset.to_str().unwrap(),
    "--author",
    "bob",
    "--granularity",
    "quarterly",
    "--patterns",
    "--by-author",
  ]);

  let compiled = compile_schema("report.schema.json");
  assert!(compiled.is_valid(&v));
  assert!(v["authors"].is_array());
}

#[test]
fn empty_window_report_conforms_to_schema() {
  let empty = test_support::fixture_path("empty.json");
  let v = report_json(&["--input", empty.to_str().unwrap(), "--month", "2024-02", "--patterns"]);

  assert!(v.get("review_patterns").is_none());
  assert!(compile_schema("report.schema.json").is_valid(&v));
}

#[test]
fn schema_rejects_out_of_range_rates() {
  let dataset = test_support::fixture_path("dataset.json");
  let mut v = report_json(&["--input", dataset.to_str().unwrap()]);
  v["metrics"]["pr_metrics"]["merge_rate"] = serde_json::json!(140.0);
  assert!(!compile_schema("report.schema.json").is_valid(&v));
}
