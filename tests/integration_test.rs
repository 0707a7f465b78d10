use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct Room {
    id: Uuid,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ComfortIndexBody {
    global_score: f64,
    status: String,
    score_temperature: f64,
}

#[derive(Debug, Deserialize)]
struct AlertBody {
    parameter: String,
    threshold: f64,
    severity: String,
}

#[derive(Debug, Deserialize)]
struct Bundle {
    comfort_index: ComfortIndexBody,
    alerts: Vec<AlertBody>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    total_measurements: usize,
    alert_count: u64,
    discomfort_percentage: f64,
}

fn base_url() -> String {
    std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into())
}

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    // ---
    let client = Client::new();
    let response = client.get(format!("{}/health", base_url())).send().await?;

    assert!(response.status().is_success());
    Ok(())
}

#[tokio::test]
async fn ingest_and_report_round_trip() -> Result<()> {
    // ---
    let base = base_url();
    let client = Client::new();

    // Fresh room so the assertions below are unaffected by other data
    let name = format!("integration-{}", Uuid::new_v4());
    let room: Room = client
        .post(format!("{base}/api/rooms"))
        .json(&json!({ "name": name, "description": "integration test room" }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(room.name, name);

    // Temperature 4 degrees above the comfort zone, everything else inside
    let response = client
        .post(format!("{base}/api/readings"))
        .json(&json!({
            "room_id": room.id,
            "temperature": 30.0,
            "humidity": 50.0,
            "air": 500.0,
            "noise": 55.0,
            "light": 400.0,
        }))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 201);

    let bundle: Bundle = response.json().await?;
    assert_eq!(bundle.comfort_index.score_temperature, 60.0);
    assert_eq!(bundle.comfort_index.global_score, 90.0);
    assert_eq!(bundle.comfort_index.status, "comfort");

    assert_eq!(bundle.alerts.len(), 1);
    assert_eq!(bundle.alerts[0].parameter, "temperature");
    assert_eq!(bundle.alerts[0].threshold, 26.0);
    assert_eq!(bundle.alerts[0].severity, "warning");

    // The reading shows up in the windowed statistics
    let summary: Summary = client
        .get(format!("{base}/api/stats?room_id={}", room.id))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(summary.total_measurements, 1);
    assert_eq!(summary.alert_count, 1);
    assert_eq!(summary.discomfort_percentage, 0.0);

    // And in the hourly trend, as a single bucket
    let buckets: Vec<serde_json::Value> = client
        .get(format!(
            "{base}/api/evolution?room_id={}&period=hour",
            room.id
        ))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0]["count"], 1);
    assert_eq!(buckets[0]["global"]["current"], 90.0);

    Ok(())
}

#[tokio::test]
async fn invalid_reading_is_rejected() -> Result<()> {
    // ---
    let base = base_url();
    let client = Client::new();

    // Unknown room
    let response = client
        .post(format!("{base}/api/readings"))
        .json(&json!({
            "room_id": Uuid::new_v4(),
            "temperature": 24.0,
            "humidity": 50.0,
            "air": 500.0,
            "noise": 45.0,
            "light": 400.0,
        }))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 404);

    // Missing numeric field
    let response = client
        .post(format!("{base}/api/readings"))
        .json(&json!({
            "room_id": Uuid::new_v4(),
            "temperature": 24.0,
        }))
        .send()
        .await?;
    assert!(response.status().is_client_error());

    Ok(())
}
