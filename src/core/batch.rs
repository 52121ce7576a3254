use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct BatchEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> BatchEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("🚀 Starting batch scoring");

        let records = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} patient records", records.len());

        let result = self.pipeline.transform(records).await?;
        let at_risk = result.scored.iter().filter(|s| s.verdict.is_positive()).count();
        tracing::info!(
            "🔧 Scored {} patients ({} at risk, {} skipped)",
            result.scored.len(),
            at_risk,
            result.skipped
        );

        let output_path = self.pipeline.load(result).await?;
        tracing::info!(
            "💾 Output saved to {} in {:?}",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
