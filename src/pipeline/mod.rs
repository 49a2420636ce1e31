//! Two-stage pricing analysis pipeline
//!
//! Stage 1 (market analyst) reads the transcript and produces signals and a
//! willingness-to-pay analysis. Stage 2 (pricing strategist) receives that
//! analysis verbatim, together with the original transcript, and writes the
//! final report. The stages run strictly in sequence and share nothing but
//! the analysis text passed between them.

pub mod agents;
pub mod prompts;

pub use agents::{AgentRole, AgentTask, PipelineStage, MARKET_ANALYST, PRICING_STRATEGIST};
pub use prompts::{PromptContext, PromptEngine};

use std::sync::Arc;
use std::time::Instant;

use pulldown_cmark::{Event, Parser, Tag};
use thiserror::Error;

use crate::llm::{ChatMessage, ChatModel, LlmError};
use crate::models::{ProductType, Stage};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{stage} step failed: {source}")]
    Model {
        stage: PipelineStage,
        #[source]
        source: LlmError,
    },

    #[error("{stage} step returned an empty response")]
    EmptyOutput { stage: PipelineStage },

    #[error("Failed to build prompt: {0}")]
    Prompt(String),

    #[error("Analysis was interrupted: {0}")]
    Interrupted(String),
}

/// Everything the two stages produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// Stage 1 markdown (signals and willingness-to-pay)
    pub analysis: String,
    /// Stage 2 markdown, returned to the caller
    pub report: String,
}

pub struct AnalysisPipeline {
    model: Arc<dyn ChatModel>,
    prompts: PromptEngine,
}

impl AnalysisPipeline {
    pub fn new(model: Arc<dyn ChatModel>) -> Result<Self, AnalysisError> {
        Ok(Self {
            model,
            prompts: PromptEngine::new()?,
        })
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Run the analyst, then the strategist on the analyst's output
    pub async fn run(
        &self,
        transcript: &str,
        product_type: ProductType,
        stage: Stage,
    ) -> Result<PipelineOutput, AnalysisError> {
        let context = PromptContext::new(transcript, product_type, stage);

        let analysis_prompt = self.prompts.render_analysis(&context)?;
        let analysis = self
            .run_stage(PipelineStage::Analysis, analysis_prompt)
            .await?;

        let strategy_prompt = self.prompts.render_strategy(&context, &analysis)?;
        let report = self
            .run_stage(PipelineStage::Strategy, strategy_prompt)
            .await?;

        if count_headings(&report) == 0 {
            log::warn!(
                "Pricing report has no markdown headings ({} chars); returning it unchanged",
                report.len()
            );
        }

        Ok(PipelineOutput { analysis, report })
    }

    /// Run on a detached task so a dropped HTTP request cannot cancel the LLM calls
    pub async fn run_detached(
        self: &Arc<Self>,
        transcript: String,
        product_type: ProductType,
        stage: Stage,
    ) -> Result<PipelineOutput, AnalysisError> {
        let pipeline = Arc::clone(self);
        let handle =
            tokio::spawn(async move { pipeline.run(&transcript, product_type, stage).await });

        handle
            .await
            .map_err(|e| AnalysisError::Interrupted(e.to_string()))?
    }

    async fn run_stage(
        &self,
        stage: PipelineStage,
        prompt: String,
    ) -> Result<String, AnalysisError> {
        let system = self.prompts.render_system(stage.agent())?;
        log::debug!(
            "Running {} step with {} (system {} chars, prompt {} chars)",
            stage,
            self.model.model_name(),
            system.len(),
            prompt.len()
        );

        let started = Instant::now();
        let output = self
            .model
            .complete(vec![ChatMessage::system(system), ChatMessage::user(prompt)])
            .await
            .map_err(|source| AnalysisError::Model { stage, source })?;

        log::debug!(
            "{} step finished in {:.1}s ({} chars)",
            stage,
            started.elapsed().as_secs_f32(),
            output.len()
        );

        let output = output.trim();
        if output.is_empty() {
            return Err(AnalysisError::EmptyOutput { stage });
        }
        Ok(output.to_string())
    }
}

/// Number of markdown headings in a document
pub fn count_headings(markdown: &str) -> usize {
    Parser::new(markdown)
        .filter(|event| matches!(event, Event::Start(Tag::Heading { .. })))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedModel;

    const TRANSCRIPT: &str = "Founder says they pay $50/mo for a competitor but hate it.";

    #[tokio::test]
    async fn test_strategist_receives_analyst_output() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok("## Key Signals\n- pays $50/mo".to_string()),
            Ok("# Pricing Strategy\nLaunch at $39/mo".to_string()),
        ]));
        let pipeline = AnalysisPipeline::new(model.clone()).unwrap();

        let output = pipeline
            .run(TRANSCRIPT, ProductType::Saas, Stage::PreRevenue)
            .await
            .unwrap();

        assert_eq!(output.analysis, "## Key Signals\n- pays $50/mo");
        assert_eq!(output.report, "# Pricing Strategy\nLaunch at $39/mo");

        let calls = model.calls();
        assert_eq!(calls.len(), 2);
        // Analyst first, strategist second
        assert!(calls[0][0].content.contains(MARKET_ANALYST.role));
        assert!(calls[1][0].content.contains(PRICING_STRATEGIST.role));
        // Stage 2 sees the analyst's full output and the transcript
        assert!(calls[1][1].content.contains("## Key Signals\n- pays $50/mo"));
        assert!(calls[1][1].content.contains(TRANSCRIPT));
    }

    #[tokio::test]
    async fn test_analysis_failure_skips_strategy() {
        let model = Arc::new(ScriptedModel::new(vec![Err(LlmError::Api {
            status: 500,
            message: "model overloaded".to_string(),
        })]));
        let pipeline = AnalysisPipeline::new(model.clone()).unwrap();

        let err = pipeline
            .run(TRANSCRIPT, ProductType::Saas, Stage::PreRevenue)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::Model {
                stage: PipelineStage::Analysis,
                ..
            }
        ));
        assert!(err.to_string().contains("model overloaded"));
        assert_eq!(model.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_output_is_an_error() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok("## Signals".to_string()),
            Ok("   \n".to_string()),
        ]));
        let pipeline = AnalysisPipeline::new(model).unwrap();

        let err = pipeline
            .run(TRANSCRIPT, ProductType::Saas, Stage::PreRevenue)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::EmptyOutput {
                stage: PipelineStage::Strategy
            }
        ));
    }

    #[tokio::test]
    async fn test_report_without_heading_is_returned() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok("signals".to_string()),
            Ok("Charge $20.".to_string()),
        ]));
        let pipeline = Arc::new(AnalysisPipeline::new(model).unwrap());

        let output = pipeline
            .run_detached(TRANSCRIPT.to_string(), ProductType::Other, Stage::Scale)
            .await
            .unwrap();
        assert_eq!(output.report, "Charge $20.");
    }

    #[test]
    fn test_count_headings() {
        assert_eq!(count_headings("# One\ntext\n## Two\n"), 2);
        assert_eq!(count_headings("Title\n=====\n"), 1);
        assert_eq!(count_headings("no headings, just #hashtag"), 0);
        assert_eq!(count_headings("```\n# not a heading\n```"), 0);
    }
}
