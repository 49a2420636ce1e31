// Agent roles and task definitions for the two-stage pricing pipeline

use serde::Serialize;

/// A role-scoped persona given to the model as its system prompt
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AgentRole {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

/// The fixed piece of work an agent performs
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AgentTask {
    pub description: &'static str,
    pub expected_output: &'static str,
}

/// Which step of the pipeline is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Analysis,
    Strategy,
}

impl PipelineStage {
    pub fn agent(&self) -> &'static AgentRole {
        match self {
            PipelineStage::Analysis => &MARKET_ANALYST,
            PipelineStage::Strategy => &PRICING_STRATEGIST,
        }
    }

    pub fn task(&self) -> &'static AgentTask {
        match self {
            PipelineStage::Analysis => &ANALYSIS_TASK,
            PipelineStage::Strategy => &STRATEGY_TASK,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Analysis => "market analysis",
            PipelineStage::Strategy => "pricing strategy",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub const MARKET_ANALYST: AgentRole = AgentRole {
    role: "Market & Pricing Analyst",
    goal: "Extract economic signals and analyze willingness-to-pay in a single pass",
    backstory: "You are an expert at reading customer interviews for economic signals. \
        You infer pricing power, willingness-to-pay and customer segments straight from \
        what customers say about their alternatives, pains and budgets.",
};

pub const PRICING_STRATEGIST: AgentRole = AgentRole {
    role: "Lead Pricing Strategist",
    goal: "Turn market analysis into a launch price, a risk assessment and a validation plan",
    backstory: "You are a seasoned pricing lead. You take raw market analysis and turn it \
        into one decisive report: a launch price, the risks around it and the fastest way \
        to prove it with real customers.",
};

pub const ANALYSIS_TASK: AgentTask = AgentTask {
    description: "Analyze the customer interview transcript below.

1. EXTRACT SIGNALS:
   - Alternatives currently used and the prices paid for them
   - Pain intensity and the main value drivers
   - Explicit price reactions (\"expensive\", \"fair\", \"cheap\")

2. INFER ECONOMICS (WTP):
   - Estimate willingness-to-pay ranges
   - Identify price sensitivity
   - Decide whether the product is a \"Painkiller\" (mission critical) or a \"Vitamin\" (nice-to-have)",
    expected_output: "Markdown with a 'Key Signals' bullet list and a 'Willingness-to-Pay Analysis' \
        section covering ranges, segments and confidence.",
};

pub const STRATEGY_TASK: AgentTask = AgentTask {
    description: "Using the market analysis below, produce the final Pricing Strategy Report.

1. RECOMMENDATION:
   - Set a specific launch price (or a narrow range)
   - Define the target segment
   - Justify both with evidence from the analysis

2. RISK ASSESSMENT:
   - Confidence score (0-100)
   - Key risks of overpricing versus underpricing

3. VALIDATION PLAN:
   - The next immediate step to test this price (pre-orders, landing page test, ...)",
    expected_output: "A markdown report with headed sections for the recommended price, rationale, \
        risks and validation steps.",
};
