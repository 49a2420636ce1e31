// Built-in prompt templates rendered with Tera

use serde::Serialize;
use tera::{Context, Tera};

use super::agents::{AgentRole, AgentTask, PipelineStage};
use super::AnalysisError;
use crate::models::{ProductType, Stage};

/// Built-in template names
pub const AGENT_SYSTEM: &str = "agent_system";
pub const ANALYSIS_PROMPT: &str = "analysis_prompt";
pub const STRATEGY_PROMPT: &str = "strategy_prompt";

const AGENT_SYSTEM_TEMPLATE: &str = r#"You are the {{ agent.role }}.
{{ agent.backstory }}

Your goal: {{ agent.goal }}

Work on your own without delegating. Answer in well-structured markdown with headings."#;

const ANALYSIS_PROMPT_TEMPLATE: &str = r#"{{ task.description }}

Product type: {{ product_type }}
Company stage: {{ stage }}
Date: {{ current_date }}

Customer interview transcript:
"""
{{ transcript }}
"""

Expected output: {{ task.expected_output }}"#;

const STRATEGY_PROMPT_TEMPLATE: &str = r#"{{ task.description }}

Product type: {{ product_type }}
Company stage: {{ stage }}
Date: {{ current_date }}

Market analysis from the {{ analyst_role }}:
---
{{ analysis }}
---

Original customer interview transcript, for reference:
"""
{{ transcript }}
"""

Expected output: {{ task.expected_output }}"#;

/// Values available to every task template
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext<'a> {
    pub transcript: &'a str,
    pub product_type: &'static str,
    pub stage: &'static str,
    pub current_date: String,
}

impl<'a> PromptContext<'a> {
    pub fn new(transcript: &'a str, product_type: ProductType, stage: Stage) -> Self {
        Self {
            transcript,
            product_type: product_type.as_str(),
            stage: stage.as_str(),
            current_date: chrono::Utc::now().format("%Y-%m-%d").to_string(),
        }
    }
}

/// Renders agent and task prompts from the built-in templates
pub struct PromptEngine {
    tera: Tera,
}

impl PromptEngine {
    pub fn new() -> Result<Self, AnalysisError> {
        let mut tera = Tera::default();
        // Prompts are plain text; never HTML-escape transcript content
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(vec![
            (AGENT_SYSTEM, AGENT_SYSTEM_TEMPLATE),
            (ANALYSIS_PROMPT, ANALYSIS_PROMPT_TEMPLATE),
            (STRATEGY_PROMPT, STRATEGY_PROMPT_TEMPLATE),
        ])
        .map_err(|e| AnalysisError::Prompt(describe_tera_error(&e)))?;

        Ok(Self { tera })
    }

    /// System prompt establishing an agent's persona
    pub fn render_system(&self, agent: &AgentRole) -> Result<String, AnalysisError> {
        let mut context = Context::new();
        context.insert("agent", agent);
        self.render(AGENT_SYSTEM, &context)
    }

    /// Stage 1 prompt: transcript plus metadata
    pub fn render_analysis(&self, prompt: &PromptContext<'_>) -> Result<String, AnalysisError> {
        let context = self.task_context(prompt, PipelineStage::Analysis.task())?;
        self.render(ANALYSIS_PROMPT, &context)
    }

    /// Stage 2 prompt: the analyst's full output plus the original transcript
    pub fn render_strategy(
        &self,
        prompt: &PromptContext<'_>,
        analysis: &str,
    ) -> Result<String, AnalysisError> {
        let mut context = self.task_context(prompt, PipelineStage::Strategy.task())?;
        context.insert("analysis", analysis);
        context.insert("analyst_role", PipelineStage::Analysis.agent().role);
        self.render(STRATEGY_PROMPT, &context)
    }

    fn task_context(
        &self,
        prompt: &PromptContext<'_>,
        task: &AgentTask,
    ) -> Result<Context, AnalysisError> {
        let mut context = Context::from_serialize(prompt)
            .map_err(|e| AnalysisError::Prompt(describe_tera_error(&e)))?;
        context.insert("task", task);
        Ok(context)
    }

    fn render(&self, name: &str, context: &Context) -> Result<String, AnalysisError> {
        self.tera
            .render(name, context)
            .map_err(|e| AnalysisError::Prompt(describe_tera_error(&e)))
    }
}

/// Tera's top-level message hides the cause; walk the source chain
fn describe_tera_error(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::agents::{MARKET_ANALYST, PRICING_STRATEGIST};

    const TRANSCRIPT: &str = "We pay $50/mo for a competitor & hate it. <b>Too slow</b>. {{ not a var }}";

    #[test]
    fn test_render_system_uses_role() {
        let engine = PromptEngine::new().unwrap();
        let prompt = engine.render_system(&PRICING_STRATEGIST).unwrap();
        assert!(prompt.starts_with("You are the Lead Pricing Strategist."));
        assert!(prompt.contains(PRICING_STRATEGIST.goal));
    }

    #[test]
    fn test_render_analysis_embeds_transcript_verbatim() {
        let engine = PromptEngine::new().unwrap();
        let ctx = PromptContext::new(TRANSCRIPT, ProductType::Hardware, Stage::Growth);
        let prompt = engine.render_analysis(&ctx).unwrap();

        assert!(prompt.contains(TRANSCRIPT), "transcript must not be escaped or re-templated");
        assert!(prompt.contains("Product type: Hardware"));
        assert!(prompt.contains("Company stage: Growth"));
        assert!(prompt.contains("EXTRACT SIGNALS"));
    }

    #[test]
    fn test_render_strategy_includes_analysis_and_transcript() {
        let engine = PromptEngine::new().unwrap();
        let ctx = PromptContext::new(TRANSCRIPT, ProductType::Saas, Stage::PreRevenue);
        let analysis = "## Key Signals\n- pays $50/mo";
        let prompt = engine.render_strategy(&ctx, analysis).unwrap();

        assert!(prompt.contains(analysis));
        assert!(prompt.contains(TRANSCRIPT));
        assert!(prompt.contains(MARKET_ANALYST.role));
        assert!(prompt.contains("Product type: SaaS"));
        assert!(prompt.contains("Company stage: Pre-revenue"));
        assert!(prompt.contains("VALIDATION PLAN"));
    }
}
