use anyhow::Result;
use std::io::Read;
use stroke_risk::core::ConfigProvider;
use stroke_risk::{BatchConfig, BatchEngine, BatchPipeline, LocalStorage, RiskAssessor};
use tempfile::TempDir;

fn demo_model_path() -> String {
    format!("{}/models/demo_forest.json", env!("CARGO_MANIFEST_DIR")).replace('\\', "/")
}

fn write_patients(dir: &str) -> Result<String> {
    let path = format!("{}/patients.csv", dir);
    std::fs::write(
        &path,
        "id,age,heart_disease,hypertension,avg_glucose_level\n\
         p-001,45,Ya,Tidak,100.0\n\
         p-002,70,Tidak,Ya,200.0\n\
         p-003,58,maybe,no,120.5\n",
    )?;
    Ok(path)
}

fn batch_config(input: &str, output: &str, extra: &str) -> Result<BatchConfig> {
    Ok(BatchConfig::from_toml_str(&format!(
        r#"
[batch]
name = "integration"

[model]
path = "{}"

[input]
path = "{}"

[output]
path = "{}"
formats = ["csv", "json"]
{}
"#,
        demo_model_path(),
        input,
        output,
        extra
    ))?)
}

/// 從 CSV 讀取病人資料，打分後輸出 CSV 與 JSON
#[tokio::test]
async fn test_end_to_end_batch_scoring() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let temp_path = temp_dir.path().to_str().unwrap().replace('\\', "/");
    let input = write_patients(&temp_path)?;
    let output = format!("{}/out", temp_path);

    let config = batch_config(&input, &output, "")?;
    let assessor = RiskAssessor::from_path(config.model_path());
    let pipeline = BatchPipeline::new(LocalStorage::new("."), config, assessor);
    let output_path = BatchEngine::new(pipeline).run().await?;
    assert_eq!(output_path, output);

    let csv_output = std::fs::read_to_string(format!("{}/predictions.csv", output))?;
    let lines: Vec<&str> = csv_output.lines().collect();
    assert_eq!(lines.len(), 3, "header plus two valid patients");
    assert!(lines[1].starts_with("p-001,45,1,100.0,0,0.2000,no indication"));
    assert!(lines[2].starts_with("p-002,70,0,200.0,1,0.6000,at risk"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(format!("{}/predictions.json", output))?)?;
    assert_eq!(json["batch"], "integration");
    assert_eq!(json["model"], "demo-random-forest");
    assert_eq!(json["skipped"], 1);
    assert_eq!(json["predictions"].as_array().map(|a| a.len()), Some(2));

    Ok(())
}

#[tokio::test]
async fn test_batch_scoring_with_zip_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let temp_path = temp_dir.path().to_str().unwrap().replace('\\', "/");
    let input = write_patients(&temp_path)?;
    let output = format!("{}/out", temp_path);

    let config = batch_config(
        &input,
        &output,
        "\n[output.compression]\nenabled = true\nfilename = \"screening.zip\"\n",
    )?;
    let assessor = RiskAssessor::from_path(config.model_path());
    let pipeline = BatchPipeline::new(LocalStorage::new("."), config, assessor);
    let output_path = BatchEngine::new(pipeline).run().await?;
    assert!(output_path.ends_with("screening.zip"));

    let zip_data = std::fs::read(&output_path)?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    assert_eq!(archive.len(), 2);

    let mut csv_content = String::new();
    archive
        .by_name("predictions.csv")?
        .read_to_string(&mut csv_content)?;
    assert!(csv_content.contains("p-002"));

    Ok(())
}

#[tokio::test]
async fn test_batch_aborts_on_invalid_row() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let temp_path = temp_dir.path().to_str().unwrap().replace('\\', "/");
    let input = write_patients(&temp_path)?;
    let output = format!("{}/out", temp_path);

    let config = batch_config(
        &input,
        &output,
        "\n[error_handling]\non_invalid_row = \"abort\"\n",
    )?;
    let assessor = RiskAssessor::from_path(config.model_path());
    let pipeline = BatchPipeline::new(LocalStorage::new("."), config, assessor);

    let result = BatchEngine::new(pipeline).run().await;
    assert!(result.is_err());
    assert!(!std::path::Path::new(&format!("{}/predictions.csv", output)).exists());

    Ok(())
}
