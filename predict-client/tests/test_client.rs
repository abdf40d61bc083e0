//! Integration test: client against an in-process prediction service

use clap::Parser;

use diabetes_predict_client::{
    run, Cli, ClientConfig, ClientError, FeatureInput, PredictionClient,
};
use diabetes_predict_server::{AppState, Config, PredictionService};

const DEMO_MODEL: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../predict-server/models/diabetes_forest.json"
);

const HEADER: &str =
    "Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age";

async fn spawn_service() -> String {
    let service = PredictionService::load(DEMO_MODEL).unwrap();
    let state = AppState::new(service, Config::default());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        diabetes_predict_server::serve(listener, state).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client_for(url: &str) -> PredictionClient {
    PredictionClient::new(ClientConfig {
        server_url: url.to_string(),
    })
}

fn sample_input() -> FeatureInput {
    FeatureInput {
        pregnancies: 2.0,
        glucose: 120.0,
        blood_pressure: 70.0,
        skin_thickness: 20.0,
        insulin: 80.0,
        bmi: 25.0,
        diabetes_pedigree_function: 0.5,
        age: 30.0,
    }
}

#[tokio::test]
async fn test_health_check() {
    let url = spawn_service().await;
    let health = client_for(&url).health_check().await.unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.model.trees, 3);
    assert_eq!(health.model.features, 8);
}

#[tokio::test]
async fn test_predict_single_round_trip() {
    let url = spawn_service().await;
    let client = client_for(&url);

    let first = client.predict_single(&sample_input()).await.unwrap();
    let second = client.predict_single(&sample_input()).await.unwrap();

    assert_eq!(first.prediction, "Non-Diabetic");
    assert!((0.0..=1.0).contains(&first.pred_prob));
    assert_eq!(first.values_.len(), 8);
    assert!(first.values_.iter().all(|v| *v >= 0.0));

    assert_eq!(first.prediction, second.prediction);
    assert_eq!(first.pred_prob, second.pred_prob);
    assert_eq!(first.values_, second.values_);
}

#[tokio::test]
async fn test_predict_batch_round_trip() {
    let url = spawn_service().await;
    let csv = format!(
        "{}\n2,120,70,20,80,25.0,0.5,30\n8,180,90,35,200,35.0,0.8,50\n",
        HEADER
    );

    let response = client_for(&url)
        .predict_batch("patients.csv", csv.into_bytes())
        .await
        .unwrap();

    let lines: Vec<&str> = response.batch_pred.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], format!("{},prediction", HEADER));
    assert!(lines[1].ends_with(",Non-Diabetic"));
    assert!(lines[2].ends_with(",Diabetic"));
}

#[tokio::test]
async fn test_batch_missing_columns_surfaces_server_detail() {
    let url = spawn_service().await;

    let err = client_for(&url)
        .predict_batch("patients.csv", b"Glucose,BMI\n120,25.0\n".to_vec())
        .await
        .unwrap_err();

    match err {
        ClientError::Server { status, detail } => {
            assert_eq!(status, 400);
            assert!(detail.starts_with("Invalid CSV format"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client_for(&url).health_check().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}

#[tokio::test]
async fn test_cli_batch_writes_output_file() {
    let url = spawn_service().await;
    let dir = tempfile::tempdir().unwrap();

    let input = dir.path().join("patients.csv");
    let output = dir.path().join("annotated.csv");
    std::fs::write(&input, format!("{}\n2,120,70,20,80,25.0,0.5,30\n", HEADER)).unwrap();

    let cli = Cli::try_parse_from([
        "predict-client",
        "--api-url",
        url.as_str(),
        "batch",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();

    run(cli).await.unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.starts_with(HEADER));
    assert!(written.contains("Non-Diabetic"));
}

#[tokio::test]
async fn test_cli_predict_reports_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let cli = Cli::try_parse_from(["predict-client", "--api-url", url.as_str(), "predict"]).unwrap();

    let err = run(cli).await.unwrap_err();
    assert_eq!(err.to_string(), "Error making prediction.");
}
