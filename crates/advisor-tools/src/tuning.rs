//! Tuning - Per-call model parameters
//!
//! Every completion call a tool makes picks its parameters from this table
//! instead of re-declaring them inline. One place to audit token ceilings
//! and temperatures across the whole pipeline.

use advisor_llm::CompletionParams;

/// Model used for all analysis and report-generation calls
pub const ANALYSIS_MODEL: &str = "claude-3-7-sonnet-20250219";

/// Repository analyzed when the caller does not name one
pub const DEFAULT_REPOSITORY_URL: &str = "https://github.com/microsoft/vscode";

/// Sampling parameters for one completion call
#[derive(Debug, Clone, Copy)]
pub struct CallTuning {
    /// Model to use
    pub model: &'static str,
    /// Token ceiling
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl CallTuning {
    /// Build completion parameters for a single-turn prompt with this tuning
    #[must_use]
    pub fn params(&self, prompt: impl Into<String>) -> CompletionParams {
        CompletionParams::prompt(prompt)
            .with_model(self.model)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
    }
}

/// GitHub repository analysis (leaf)
pub const GITHUB_ANALYSIS: CallTuning = CallTuning {
    model: ANALYSIS_MODEL,
    max_tokens: 2048,
    temperature: 0.3,
};

/// Cloud resource analysis (leaf)
pub const CLOUD_ANALYSIS: CallTuning = CallTuning {
    model: ANALYSIS_MODEL,
    max_tokens: 2048,
    temperature: 0.3,
};

/// Security posture analysis (leaf)
pub const SECURITY_ANALYSIS: CallTuning = CallTuning {
    model: ANALYSIS_MODEL,
    max_tokens: 2048,
    temperature: 0.3,
};

/// Orchestrator phase 2: synthesis of the collected analyses
pub const SYNTHESIS: CallTuning = CallTuning {
    model: ANALYSIS_MODEL,
    max_tokens: 1500,
    temperature: 0.4,
};

/// Orchestrator phase 3: executive summary section
pub const EXECUTIVE_SUMMARY: CallTuning = CallTuning {
    model: ANALYSIS_MODEL,
    max_tokens: 800,
    temperature: 0.3,
};

/// Orchestrator phase 3: technical details section
pub const TECHNICAL_DETAILS: CallTuning = CallTuning {
    model: ANALYSIS_MODEL,
    max_tokens: 1200,
    temperature: 0.3,
};

/// Orchestrator phase 3: recommendations section
pub const RECOMMENDATIONS: CallTuning = CallTuning {
    model: ANALYSIS_MODEL,
    max_tokens: 1000,
    temperature: 0.3,
};

/// Orchestrator phase 4: final report compilation
pub const COMPILATION: CallTuning = CallTuning {
    model: ANALYSIS_MODEL,
    max_tokens: 2048,
    temperature: 0.2,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_carry_tuning() {
        let params = SYNTHESIS.params("combine these");
        assert_eq!(params.model, ANALYSIS_MODEL);
        assert_eq!(params.max_tokens, 1500);
        assert!((params.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(params.messages.len(), 1);
    }

    #[test]
    fn test_section_ceilings_differ() {
        assert_eq!(EXECUTIVE_SUMMARY.max_tokens, 800);
        assert_eq!(TECHNICAL_DETAILS.max_tokens, 1200);
        assert_eq!(RECOMMENDATIONS.max_tokens, 1000);
    }
}
