//! Orchestrator - comprehensive repository and cloud analysis
//!
//! Four strictly ordered phases; work inside a phase runs concurrently and
//! the phase only completes once every item has finished:
//!
//! 1. Collection: GitHub and cloud analyzers in parallel (join, not race)
//! 2. Synthesis: one completion over both analysis texts
//! 3. Sectioning: three section completions in parallel over the synthesis
//! 4. Compilation: one completion merging the sections into the report
//!
//! All-or-nothing: any failure aborts the remaining pipeline and the caller
//! gets a single descriptive error. Phase 1 aggregates every failing
//! sub-tool; phase 3 propagates the first sectioning failure and cancels
//! its siblings.

use crate::builtins::cloud::CloudAnalyzerTool;
use crate::builtins::github::{AnalysisDepth, GithubAnalyzerTool};
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDescriptor, ToolResult};
use crate::tuning;
use advisor_llm::{CompletionClient, CompletionParams};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Heading prefixed to every successful report
pub const REPORT_HEADING: &str = "# Comprehensive Repository & Cloud Analysis Report\n\n";

const SYNTHESIS_SYSTEM: &str = "You are a senior technical architect specializing in full-stack \
    analysis. Identify critical insights by combining repository and infrastructure analysis.";

const EXECUTIVE_SYSTEM: &str = "You are writing for executives. Focus on business impact, risks, \
    and high-level recommendations.";

const TECHNICAL_SYSTEM: &str = "You are writing for technical teams. Include specific technical \
    details, configurations, and implementation notes.";

const RECOMMENDATIONS_SYSTEM: &str = "You are a solutions architect. Provide specific, \
    actionable recommendations with priorities and implementation steps.";

const COMPILATION_SYSTEM: &str = "You are a senior technical consultant creating a comprehensive \
    scaling advisory report. Structure it professionally with clear sections and actionable \
    insights.";

/// The text produced by one leaf analyzer, tagged with its source tool
#[derive(Debug, Clone)]
pub struct AnalysisPhaseOutput {
    /// Name of the tool that produced the text
    pub source: &'static str,
    /// The analysis text
    pub text: String,
}

/// The three independently generated report sections
#[derive(Debug, Clone)]
pub struct ReportSections {
    /// Business-audience summary
    pub executive_summary: String,
    /// Engineering-audience findings
    pub technical_details: String,
    /// Actionable recommendations
    pub recommendations: String,
}

#[derive(Debug, Deserialize)]
struct ComprehensiveAnalysisArgs {
    repository_url: String,
    #[serde(default)]
    analysis_depth: AnalysisDepth,
    #[serde(default)]
    focus_areas: Vec<String>,
}

fn synthesis_prompt(github: &str, cloud: &str, focus_areas: &[String]) -> String {
    let focus = if focus_areas.is_empty() {
        "general analysis".to_string()
    } else {
        focus_areas.join(", ")
    };

    format!(
        "Analyze and synthesize these two analyses to identify key insights:\n\n\
         GITHUB REPOSITORY ANALYSIS:\n{github}\n\n\
         CLOUD INFRASTRUCTURE ANALYSIS:\n{cloud}\n\n\
         Focus areas: {focus}\n\n\
         Provide a synthesis that identifies:\n\
         1. **Alignment Issues**: Where the repository and cloud infrastructure don't align\n\
         2. **Scaling Bottlenecks**: Potential issues for growth\n\
         3. **Architecture Gaps**: Missing components or suboptimal configurations\n\
         4. **Technology Mismatches**: Where repo tech stack doesn't match cloud setup\n\
         5. **Key Insights**: Important observations from combining both analyses"
    )
}

fn compilation_prompt(sections: &ReportSections) -> String {
    format!(
        "Compile these sections into a cohesive scaling advisory report:\n\n\
         EXECUTIVE SUMMARY:\n{exec}\n\n\
         TECHNICAL DETAILS:\n{tech}\n\n\
         RECOMMENDATIONS:\n{recs}\n\n\
         Create a well-structured report with clear sections, priorities, and next steps for \
         scaling this application.",
        exec = sections.executive_summary,
        tech = sections.technical_details,
        recs = sections.recommendations,
    )
}

/// Tool that runs the full four-phase analysis pipeline
pub struct ComprehensiveAnalysisTool {
    descriptor: ToolDescriptor,
    client: Arc<dyn CompletionClient>,
    github: GithubAnalyzerTool,
    cloud: CloudAnalyzerTool,
}

impl ComprehensiveAnalysisTool {
    /// Create a new orchestrator over the shared completion client
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        let descriptor = ToolDescriptor::new(
            "analyze_repository_and_cloud",
            "Perform comprehensive analysis of a GitHub repository, cloud infrastructure, and \
             security posture. Combines repository analysis, cloud resource analysis, and \
             security assessment to provide scaling recommendations and architectural insights.",
        )
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "repository_url": {
                    "type": "string",
                    "description": "The GitHub repository URL to analyze (e.g., https://github.com/owner/repo)"
                },
                "analysis_depth": {
                    "type": "string",
                    "enum": ["basic", "detailed"],
                    "description": "Level of analysis detail (default: basic)",
                    "default": "basic"
                },
                "focus_areas": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Specific areas to focus on (e.g., ['security', 'performance', 'cost', 'scalability'])",
                    "default": []
                }
            },
            "required": ["repository_url"]
        }));

        Self {
            descriptor,
            github: GithubAnalyzerTool::new(client.clone()),
            cloud: CloudAnalyzerTool::new(client.clone()),
            client,
        }
    }

    /// Phase 1: run both leaf analyzers concurrently and join.
    ///
    /// The security analyzer is deliberately left out of this phase to keep
    /// latency down. Both results are awaited before any error handling so
    /// the failure message can name every failing sub-tool, not just the
    /// first.
    async fn collect_analyses(
        &self,
        args: &ComprehensiveAnalysisArgs,
    ) -> Result<(AnalysisPhaseOutput, AnalysisPhaseOutput)> {
        info!("Phase 1: starting GitHub and cloud analysis");

        let github_args = serde_json::json!({
            "repository_url": args.repository_url,
            "analysis_depth": args.analysis_depth.as_str(),
            "include_dependencies": true
        });
        let cloud_args = serde_json::json!({
            "analysis_type": "overview",
            "include_recommendations": true
        });

        let (github_result, cloud_result) =
            tokio::join!(self.github.run(github_args), self.cloud.run(cloud_args));
        let github_result = github_result.unwrap_or_else(|e| ToolResult::error(e.to_string()));
        let cloud_result = cloud_result.unwrap_or_else(|e| ToolResult::error(e.to_string()));

        let mut failures = Vec::new();
        if github_result.is_error {
            failures.push(format!(
                "GitHub: {}",
                github_result.first_text().unwrap_or("unknown error")
            ));
        }
        if cloud_result.is_error {
            failures.push(format!(
                "Cloud: {}",
                cloud_result.first_text().unwrap_or("unknown error")
            ));
        }
        if !failures.is_empty() {
            return Err(Error::Subtool(format!(
                "analysis failed: {}",
                failures.join(", ")
            )));
        }

        info!("Phase 1: analysis agents completed");

        Ok((
            AnalysisPhaseOutput {
                source: "github_analyze_repository",
                text: github_result.first_text().unwrap_or_default().to_string(),
            },
            AnalysisPhaseOutput {
                source: "analyze_cloud_resources",
                text: cloud_result.first_text().unwrap_or_default().to_string(),
            },
        ))
    }

    /// Phase 2: merge both analyses into one synthesis document
    async fn synthesize(
        &self,
        github: &AnalysisPhaseOutput,
        cloud: &AnalysisPhaseOutput,
        focus_areas: &[String],
    ) -> Result<String> {
        info!("Phase 2: synthesizing insights");

        let prompt = synthesis_prompt(&github.text, &cloud.text, focus_areas);
        Ok(self
            .client
            .complete(tuning::SYNTHESIS.params(prompt).with_system(SYNTHESIS_SYSTEM))
            .await?)
    }

    async fn section(&self, params: CompletionParams) -> Result<String> {
        Ok(self.client.complete(params).await?)
    }

    /// Phase 3: generate the three report sections concurrently.
    ///
    /// The first failure aborts the join and cancels the sibling calls;
    /// all three sections are part of one atomic reporting step.
    async fn generate_sections(&self, synthesis: &str) -> Result<ReportSections> {
        info!("Phase 3: generating report sections");

        let (executive_summary, technical_details, recommendations) = tokio::try_join!(
            self.section(
                tuning::EXECUTIVE_SUMMARY
                    .params(format!(
                        "Write an executive summary based on this analysis: {synthesis}"
                    ))
                    .with_system(EXECUTIVE_SYSTEM),
            ),
            self.section(
                tuning::TECHNICAL_DETAILS
                    .params(format!(
                        "Write technical details and findings based on this analysis: {synthesis}"
                    ))
                    .with_system(TECHNICAL_SYSTEM),
            ),
            self.section(
                tuning::RECOMMENDATIONS
                    .params(format!(
                        "Write actionable recommendations based on this analysis: {synthesis}"
                    ))
                    .with_system(RECOMMENDATIONS_SYSTEM),
            ),
        )?;

        Ok(ReportSections {
            executive_summary,
            technical_details,
            recommendations,
        })
    }

    /// Phase 4: compile the sections into the final report
    async fn compile_report(&self, sections: &ReportSections) -> Result<String> {
        info!("Phase 4: compiling final report");

        let prompt = compilation_prompt(sections);
        Ok(self
            .client
            .complete(tuning::COMPILATION.params(prompt).with_system(COMPILATION_SYSTEM))
            .await?)
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String> {
        let args: ComprehensiveAnalysisArgs = serde_json::from_value(arguments).map_err(|e| {
            Error::InvalidArgument(format!(
                "invalid arguments for analyze_repository_and_cloud: {e}"
            ))
        })?;

        if !args.repository_url.contains("github.com") {
            return Err(Error::InvalidArgument(
                "repository_url must be a valid GitHub URL (e.g. https://github.com/owner/repo)"
                    .to_string(),
            ));
        }

        let (github, cloud) = self.collect_analyses(&args).await?;
        debug!(
            github_len = github.text.len(),
            cloud_len = cloud.text.len(),
            "Collected phase 1 outputs"
        );

        let synthesis = self.synthesize(&github, &cloud, &args.focus_areas).await?;
        let sections = self.generate_sections(&synthesis).await?;
        let report = self.compile_report(&sections).await?;

        Ok(format!("{REPORT_HEADING}{report}"))
    }
}

#[async_trait::async_trait]
impl Tool for ComprehensiveAnalysisTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, arguments: serde_json::Value) -> Result<ToolResult> {
        Ok(match self.execute(arguments).await {
            Ok(text) => ToolResult::text(text),
            Err(e) => ToolResult::error(format!("Error in comprehensive analysis: {e}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mockall::mock! {
        Client {}

        #[async_trait::async_trait]
        impl CompletionClient for Client {
            async fn complete(&self, params: CompletionParams) -> advisor_llm::Result<String>;
        }
    }

    #[test]
    fn test_synthesis_prompt_joins_focus_areas() {
        let prompt = synthesis_prompt(
            "gh text",
            "cloud text",
            &["scalability".to_string(), "cost".to_string()],
        );
        assert!(prompt.contains("Focus areas: scalability, cost"));
        assert!(prompt.contains("GITHUB REPOSITORY ANALYSIS:\ngh text"));
        assert!(prompt.contains("CLOUD INFRASTRUCTURE ANALYSIS:\ncloud text"));
    }

    #[test]
    fn test_synthesis_prompt_empty_focus_defaults_to_general() {
        let prompt = synthesis_prompt("g", "c", &[]);
        assert!(prompt.contains("Focus areas: general analysis"));
    }

    #[test]
    fn test_compilation_prompt_embeds_sections() {
        let sections = ReportSections {
            executive_summary: "EXEC".to_string(),
            technical_details: "TECH".to_string(),
            recommendations: "RECS".to_string(),
        };
        let prompt = compilation_prompt(&sections);
        assert!(prompt.contains("EXECUTIVE SUMMARY:\nEXEC"));
        assert!(prompt.contains("TECHNICAL DETAILS:\nTECH"));
        assert!(prompt.contains("RECOMMENDATIONS:\nRECS"));
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_any_call() {
        let mut client = MockClient::new();
        client.expect_complete().never();

        let tool = ComprehensiveAnalysisTool::new(Arc::new(client));
        let result = tool
            .run(serde_json::json!({"repository_url": "not-a-url"}))
            .await
            .unwrap();

        assert!(result.is_error);
        let text = result.first_text().unwrap();
        assert!(text.starts_with("Error in comprehensive analysis:"));
        assert!(text.contains("valid GitHub URL"));
    }

    #[tokio::test]
    async fn test_missing_url_fails_before_any_call() {
        let mut client = MockClient::new();
        client.expect_complete().never();

        let tool = ComprehensiveAnalysisTool::new(Arc::new(client));
        let result = tool.run(serde_json::json!({})).await.unwrap();

        assert!(result.is_error);
        assert!(result
            .first_text()
            .unwrap()
            .starts_with("Error in comprehensive analysis:"));
    }
}
