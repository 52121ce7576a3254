use crate::config::toml_config::{BatchConfig, InvalidRowPolicy};
use crate::core::assessor::RiskAssessor;
use crate::core::loader::RiskArtifact;
use crate::core::{BatchResult, ConfigProvider, PatientRecord, Pipeline, RiskModel, Storage};
use crate::domain::model::ScoredPatient;
use crate::utils::error::{Result, RiskError};
use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use zip::write::{FileOptions, ZipWriter};

pub const CSV_FILENAME: &str = "predictions.csv";
pub const JSON_FILENAME: &str = "predictions.json";

/// Scores every row of a patient CSV with one shared model.
pub struct BatchPipeline<S: Storage, M: RiskModel = RiskArtifact> {
    pub(crate) storage: S,
    pub(crate) config: BatchConfig,
    pub(crate) assessor: RiskAssessor<M>,
    rejected_rows: AtomicUsize,
}

#[derive(Serialize)]
struct PredictionRow<'a> {
    id: &'a str,
    age: u32,
    heart_disease: u8,
    avg_glucose_level: f64,
    hypertension: u8,
    probability: String,
    verdict: String,
}

#[derive(Serialize)]
struct PredictionReport<'a> {
    batch: &'a str,
    model: &'a str,
    threshold: f64,
    generated_at: String,
    skipped: usize,
    predictions: &'a [ScoredPatient],
}

impl<S: Storage, M: RiskModel> BatchPipeline<S, M> {
    pub fn new(storage: S, config: BatchConfig, assessor: RiskAssessor<M>) -> Self {
        Self {
            storage,
            config,
            assessor,
            rejected_rows: AtomicUsize::new(0),
        }
    }

    fn reject_row(&self, location: &str, reason: &str) -> Result<()> {
        match self.config.invalid_row_policy() {
            InvalidRowPolicy::Skip => {
                tracing::warn!("⚠️ Skipping {}: {}", location, reason);
                self.rejected_rows.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            InvalidRowPolicy::Abort => Err(RiskError::ValidationError {
                message: format!("{}: {}", location, reason),
            }),
        }
    }

    fn model_name(&self) -> &str {
        self.assessor
            .load_status()
            .map(|m| m.name())
            .unwrap_or("unavailable")
    }

    fn render_csv(&self, result: &BatchResult) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for scored in &result.scored {
            writer.serialize(PredictionRow {
                id: scored.id.as_deref().unwrap_or(""),
                age: scored.features.age,
                heart_disease: scored.features.heart_disease,
                avg_glucose_level: scored.features.avg_glucose_level,
                hypertension: scored.features.hypertension,
                probability: format!("{:.4}", scored.probability),
                verdict: scored.verdict.to_string(),
            })?;
        }
        writer.into_inner().map_err(|e| RiskError::ProcessingError {
            message: format!("failed to flush CSV output: {}", e),
        })
    }

    fn render_json(&self, result: &BatchResult) -> Result<Vec<u8>> {
        let report = PredictionReport {
            batch: &self.config.batch.name,
            model: self.model_name(),
            threshold: result.threshold.value(),
            generated_at: result.generated_at.to_rfc3339(),
            skipped: result.skipped,
            predictions: &result.scored,
        };
        Ok(serde_json::to_vec_pretty(&report)?)
    }
}

#[async_trait::async_trait]
impl<S: Storage, M: RiskModel> Pipeline for BatchPipeline<S, M> {
    async fn extract(&self) -> Result<Vec<PatientRecord>> {
        tracing::info!("📂 Reading patients from {}", self.config.input.path);
        // 每次執行重新計算略過筆數
        self.rejected_rows.store(0, Ordering::Relaxed);
        let data = self.storage.read_file(&self.config.input.path).await?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter())
            .trim(csv::Trim::All)
            .from_reader(data.as_slice());

        let mut records = Vec::new();
        for row in reader.deserialize::<PatientRecord>() {
            match row {
                Ok(record) => records.push(record),
                Err(e) => {
                    // 欄位缺漏或格式錯誤；header 本身壞掉時直接失敗
                    let Some(line) = e.position().map(|p| p.line()) else {
                        return Err(e.into());
                    };
                    self.reject_row(&format!("row at line {}", line), &e.to_string())?;
                }
            }
        }

        Ok(records)
    }

    async fn transform(&self, data: Vec<PatientRecord>) -> Result<BatchResult> {
        let threshold = self.config.threshold();
        tracing::info!(
            "🔧 Scoring {} patients at threshold {}",
            data.len(),
            threshold
        );

        let mut scored = Vec::with_capacity(data.len());
        for (index, record) in data.into_iter().enumerate() {
            let features = record.features();
            match self.assessor.assess(&features, threshold) {
                Ok(prediction) => scored.push(ScoredPatient {
                    id: record.id,
                    features,
                    probability: prediction.probability,
                    verdict: prediction.verdict,
                }),
                Err(RiskError::ValidationError { message }) => {
                    let location = match &record.id {
                        Some(id) => format!("patient '{}'", id),
                        None => format!("record #{}", index + 1),
                    };
                    self.reject_row(&location, &message)?;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(BatchResult {
            scored,
            skipped: self.rejected_rows.load(Ordering::Relaxed),
            threshold,
            generated_at: chrono::Utc::now(),
        })
    }

    async fn load(&self, result: BatchResult) -> Result<String> {
        let mut files: Vec<(&str, Vec<u8>)> = Vec::new();
        if self.config.writes_format("csv") {
            files.push((CSV_FILENAME, self.render_csv(&result)?));
        }
        if self.config.writes_format("json") {
            files.push((JSON_FILENAME, self.render_json(&result)?));
        }

        let output_dir = self.config.output_path();

        if let Some(archive_name) = self.config.archive_name() {
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &files {
                    zip.start_file::<_, ()>(*name, FileOptions::default())?;
                    zip.write_all(data)?;
                }
                zip.finish()?.into_inner()
            };

            let archive_path = format!("{}/{}", output_dir, archive_name);
            self.storage.write_file(&archive_path, &zip_data).await?;
            tracing::info!("📦 Archive saved: {}", archive_path);
            return Ok(archive_path);
        }

        for (name, data) in &files {
            let path = format!("{}/{}", output_dir, name);
            self.storage.write_file(&path, data).await?;
            tracing::debug!("Wrote {}", path);
        }

        Ok(output_dir.to_string())
    }
}
