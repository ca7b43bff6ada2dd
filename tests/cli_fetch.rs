mod http_stub;

use std::collections::HashMap;

use predicates::prelude::*;

use http_stub::{HttpStub, StubRoute};

#[test]
fn fetch_then_show_round_trips_through_the_data_dir() {
    let stub = HttpStub::spawn(HashMap::from([(
        "GET /reading.csv".to_owned(),
        StubRoute::csv("Status,Title,Author,Month,Rating,Genre\nIn progress,Dune,Frank Herbert,,,\n"),
    )]));

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("homepage.yaml");
    std::fs::write(
        &config_path,
        format!("sheets:\n  reading: {}\n", stub.url("/reading.csv")),
    )
    .unwrap();
    let data_dir = dir.path().join("data");

    let mut fetch = assert_cmd::cargo::cargo_bin_cmd!("homepage");
    fetch
        .env_remove("HOMEPAGE_SPOTIFY_REFRESH_TOKEN")
        .env_remove("HOMEPAGE_STRAVA_REFRESH_TOKEN")
        .env_remove("HOMEPAGE_OPENWEATHER_API_KEY")
        .args(["fetch", "--config"])
        .arg(&config_path)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("stored site data"));
    assert!(data_dir.join("siteData/latest.json").exists());

    let mut show = assert_cmd::cargo::cargo_bin_cmd!("homepage");
    show.args(["show", "--narrative", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "listening to connect spotify by setup needed, reading dune by frank herbert.",
        ));
}
