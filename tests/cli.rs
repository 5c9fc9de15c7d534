use assert_cmd::Command;

mod common;
use common::{create_cat_dataset, write_file, write_zip};

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("yolo-ingest").unwrap();
    cmd.env_remove("YOLO_INGEST_CONFIG")
        .env_remove("YOLO_INGEST_DATASET")
        .env_remove("YOLO_INGEST_TARGET_DIR")
        .env_remove("YOLO_INGEST_CACHE_DIR")
        .env_remove("YOLO_INGEST_LOG");
    cmd
}

#[test]
fn runs() {
    cli().assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = cli();
    cmd.arg("-V");
    cmd.assert().success().stdout("yolo-ingest 0.1.0\n");
}

// Ingest subcommand tests

#[test]
fn ingest_local_dataset_succeeds() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let data = temp.path().join("data");
    create_cat_dataset(&data);
    let target = temp.path().join("artifacts");

    let mut cmd = cli();
    cmd.arg("ingest")
        .arg("--dataset")
        .arg(format!("file:{}", data.display()))
        .arg("--target-dir")
        .arg(&target);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("images: 2"))
        .stdout(predicates::str::contains("labels: 1"))
        .stderr(predicates::str::contains("Collected 2 images and 1 labels"));

    assert!(target.join("raw/Images/cat1.jpg").is_file());
    assert!(target.join("raw/Images/cat2.png").is_file());
    assert!(target.join("raw/Labels/cat1.txt").is_file());
}

#[test]
fn ingest_reads_dataset_from_env() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let data = temp.path().join("data");
    create_cat_dataset(&data);

    let mut cmd = cli();
    cmd.arg("ingest")
        .env("YOLO_INGEST_DATASET", format!("file:{}", data.display()))
        .env("YOLO_INGEST_TARGET_DIR", temp.path().join("out"));
    cmd.assert().success();

    assert!(temp.path().join("out/raw/Labels/cat1.txt").is_file());
}

#[test]
fn ingest_reads_config_file() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let data = temp.path().join("data");
    create_cat_dataset(&data);
    let config = temp.path().join("ingest.yaml");
    write_file(
        &config,
        &format!(
            "dataset: \"file:{}\"\ntarget_dir: \"{}\"\n",
            data.display(),
            temp.path().join("from-config").display()
        ),
    );

    let mut cmd = cli();
    cmd.arg("ingest").arg("--config").arg(&config);
    cmd.assert().success();

    assert!(temp.path().join("from-config/raw/Images/cat2.png").is_file());
}

#[test]
fn ingest_json_output_format() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let data = temp.path().join("data");
    create_cat_dataset(&data);

    let mut cmd = cli();
    cmd.args(["-q", "ingest", "--output", "json", "--dataset"])
        .arg(format!("file:{}", data.display()))
        .arg("--target-dir")
        .arg(temp.path().join("out"));
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"images\": 2"))
        .stdout(predicates::str::contains("\"archive\": \"not_archive\""));
}

#[test]
fn ingest_without_dataset_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let mut cmd = cli();
    cmd.current_dir(temp.path()).arg("ingest");
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Missing configuration value"));
}

#[test]
fn ingest_empty_dataset_reports_stage_chain() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let data = temp.path().join("data");
    write_file(&data.join("notes.md"), "nothing useful");

    let mut cmd = cli();
    cmd.arg("ingest")
        .arg("--dataset")
        .arg(format!("file:{}", data.display()))
        .arg("--target-dir")
        .arg(temp.path().join("out"));
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains(
            "Error: Data ingestion pipeline failed",
        ))
        .stderr(predicates::str::contains(
            "caused by: Error while downloading dataset",
        ))
        .stderr(predicates::str::contains(
            "caused by: Error while extracting images and labels",
        ))
        .stderr(predicates::str::contains("No images or labels found"));
}

#[test]
fn ingest_rejects_malformed_dataset_id() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let mut cmd = cli();
    cmd.current_dir(temp.path())
        .args(["ingest", "--dataset", "not-a-dataset"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Failed to resolve dataset reference"));
}

#[test]
fn ingest_cached_kaggle_dataset_offline_without_credentials() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let cache = temp.path().join("cache");
    write_zip(
        &cache.join("kaggle/owner/helmets/v1/helmets.zip"),
        &[
            ("train/images/h1.jpg", "jpg"),
            ("train/labels/h1.txt", "0 0.5 0.5 0.1 0.1"),
        ],
    );
    let empty_home = temp.path().join("home");
    std::fs::create_dir_all(&empty_home).expect("create home");

    let mut cmd = cli();
    cmd.env_remove("KAGGLE_USERNAME")
        .env_remove("KAGGLE_KEY")
        .env("KAGGLE_CONFIG_DIR", &empty_home)
        .env("HOME", &empty_home)
        .arg("ingest")
        .arg("--dataset")
        .arg("kaggle:owner/helmets@1")
        .arg("--cache-dir")
        .arg(&cache)
        .arg("--target-dir")
        .arg(temp.path().join("out"));
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("images: 1"))
        .stdout(predicates::str::contains("labels: 1"));

    assert!(temp.path().join("out/raw/Images/h1.jpg").is_file());
}

// Verify subcommand tests

#[test]
fn verify_after_ingest_passes() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let raw = temp.path().join("raw");
    write_file(&raw.join("Images/a.jpg"), "jpg");
    write_file(&raw.join("Labels/a.txt"), "label");

    let mut cmd = cli();
    cmd.arg("verify").arg(&raw);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Verification passed"));
}

#[test]
fn verify_unpaired_files_warn_and_fail_in_strict_mode() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let raw = temp.path().join("raw");
    write_file(&raw.join("Images/a.jpg"), "jpg");
    write_file(&raw.join("Images/b.jpg"), "jpg");
    write_file(&raw.join("Labels/a.txt"), "label");

    let mut lenient = cli();
    lenient.arg("verify").arg(&raw);
    lenient
        .assert()
        .success()
        .stdout(predicates::str::contains("ImageWithoutLabel"));

    let mut strict = cli();
    strict.arg("verify").arg(&raw).arg("--strict");
    strict
        .assert()
        .failure()
        .stderr(predicates::str::contains("Layout verification failed"));
}

#[test]
fn verify_missing_buckets_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let mut cmd = cli();
    cmd.args(["verify", "--output", "json"]).arg(temp.path());
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("\"MissingDirectory\""));
}
