// Application layer: pipelines and report rendering built on the core.

pub mod pipelines;
pub mod report;
