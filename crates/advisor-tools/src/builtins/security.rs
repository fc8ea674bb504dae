//! Security analyzer - security posture assessment through the model

use crate::error::{Error, Result};
use crate::fixtures::sample_security_posture;
use crate::registry::{Tool, ToolDescriptor, ToolResult};
use crate::tuning;
use advisor_llm::CompletionClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

const SYSTEM_DIRECTIVE: &str = "You are a senior security architect specializing in AWS \
    security, DevSecOps, and compliance. Focus on practical, actionable security recommendations \
    that prevent scaling failures.";

/// Scope of the security analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisScope {
    /// IAM policies and findings only
    Iam,
    /// Secret scanning only
    Secrets,
    /// Container posture only
    Containers,
    /// Everything
    #[default]
    All,
}

impl AnalysisScope {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iam => "iam",
            Self::Secrets => "secrets",
            Self::Containers => "containers",
            Self::All => "all",
        }
    }
}

/// Minimum severity worth reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityThreshold {
    /// Everything, including informational findings
    Low,
    /// Medium and above
    #[default]
    Medium,
    /// High and critical only
    High,
    /// Critical only
    Critical,
}

impl SeverityThreshold {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Deserialize)]
struct SecurityAnalyzerArgs {
    #[serde(default)]
    repository_url: Option<String>,
    #[serde(default)]
    analysis_scope: AnalysisScope,
    #[serde(default)]
    severity_threshold: SeverityThreshold,
}

fn render_prompt(
    posture: &serde_json::Value,
    repository_url: Option<&str>,
    scope: AnalysisScope,
    threshold: SeverityThreshold,
) -> String {
    let pretty = |section: &str| {
        serde_json::to_string_pretty(&posture[section]).unwrap_or_else(|_| "{}".to_string())
    };

    format!(
        "Analyze the following AWS security posture data and provide a comprehensive security \
         assessment:\n\n\
         REPOSITORY: {repo}\n\
         ANALYSIS SCOPE: {scope}\n\
         SEVERITY THRESHOLD: {threshold}\n\n\
         IAM ANALYSIS:\n{iam}\n\n\
         SECRETS ANALYSIS:\n{secrets}\n\n\
         CONTAINER SECURITY:\n{containers}\n\n\
         COMPLIANCE STATUS:\n{compliance}\n\n\
         Please provide:\n\
         1. Executive Summary of security posture\n\
         2. Critical security risks and their business impact\n\
         3. Detailed findings by category (IAM, Secrets, Containers)\n\
         4. Prioritized remediation roadmap with timelines\n\
         5. Compliance gap analysis\n\
         6. Security scaling considerations for growth\n\n\
         Focus on issues that commonly cause scaling failures and security incidents in \
         production environments.",
        repo = repository_url.unwrap_or("N/A"),
        scope = scope.as_str(),
        threshold = threshold.as_str(),
        iam = pretty("iam"),
        secrets = pretty("secrets"),
        containers = pretty("containers"),
        compliance = pretty("compliance"),
    )
}

/// Tool that assesses the mock security posture via the model
pub struct SecurityAnalyzerTool {
    descriptor: ToolDescriptor,
    client: Arc<dyn CompletionClient>,
}

impl SecurityAnalyzerTool {
    /// Create a new security analyzer
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        let descriptor = ToolDescriptor::new(
            "analyze_security_posture",
            "Analyze security posture including IAM policies, secrets in code, and container \
             security. Identifies common scaling security failure points and provides \
             remediation recommendations.",
        )
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "repository_url": {
                    "type": "string",
                    "description": "Optional GitHub repository URL to analyze for secrets and security issues"
                },
                "analysis_scope": {
                    "type": "string",
                    "enum": ["iam", "secrets", "containers", "all"],
                    "description": "Scope of security analysis (default: all)",
                    "default": "all"
                },
                "severity_threshold": {
                    "type": "string",
                    "enum": ["low", "medium", "high", "critical"],
                    "description": "Minimum severity level to report (default: medium)",
                    "default": "medium"
                }
            },
            "required": []
        }));

        Self { descriptor, client }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String> {
        let args: SecurityAnalyzerArgs = serde_json::from_value(arguments).map_err(|e| {
            Error::InvalidArgument(format!("invalid arguments for analyze_security_posture: {e}"))
        })?;

        let posture = sample_security_posture();
        debug!(
            scope = args.analysis_scope.as_str(),
            threshold = args.severity_threshold.as_str(),
            "Analyzing security posture"
        );

        let prompt = render_prompt(
            &posture,
            args.repository_url.as_deref(),
            args.analysis_scope,
            args.severity_threshold,
        );
        let text = self
            .client
            .complete(tuning::SECURITY_ANALYSIS.params(prompt).with_system(SYSTEM_DIRECTIVE))
            .await?;

        Ok(format!("# Security Posture Analysis\n\n{text}"))
    }
}

#[async_trait::async_trait]
impl Tool for SecurityAnalyzerTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, arguments: serde_json::Value) -> Result<ToolResult> {
        Ok(match self.execute(arguments).await {
            Ok(text) => ToolResult::text(text),
            Err(e) => ToolResult::error(format!("Security analysis failed: {e}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_llm::CompletionParams;

    mockall::mock! {
        Client {}

        #[async_trait::async_trait]
        impl CompletionClient for Client {
            async fn complete(&self, params: CompletionParams) -> advisor_llm::Result<String>;
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let posture = sample_security_posture();
        let first = render_prompt(&posture, None, AnalysisScope::All, SeverityThreshold::Medium);
        let second = render_prompt(&posture, None, AnalysisScope::All, SeverityThreshold::Medium);
        assert_eq!(first, second);
    }

    #[test]
    fn test_prompt_embeds_sections_and_header() {
        let posture = sample_security_posture();
        let prompt = render_prompt(
            &posture,
            Some("https://github.com/acme/widgets"),
            AnalysisScope::Iam,
            SeverityThreshold::High,
        );

        assert!(prompt.contains("REPOSITORY: https://github.com/acme/widgets"));
        assert!(prompt.contains("ANALYSIS SCOPE: iam"));
        assert!(prompt.contains("SEVERITY THRESHOLD: high"));
        assert!(prompt.contains("WebAppInstanceProfile"));
        assert!(prompt.contains("STRIPE_SECRET_KEY"));
        assert!(prompt.contains("PCI-DSS"));
    }

    #[test]
    fn test_prompt_defaults_repository_to_na() {
        let posture = sample_security_posture();
        let prompt = render_prompt(&posture, None, AnalysisScope::All, SeverityThreshold::Medium);
        assert!(prompt.contains("REPOSITORY: N/A"));
    }

    #[tokio::test]
    async fn test_success_is_heading_prefixed() {
        let mut client = MockClient::new();
        client
            .expect_complete()
            .withf(|params| {
                params.system.as_deref().is_some_and(|s| s.contains("security architect"))
            })
            .times(1)
            .returning(|_| Ok("posture report".to_string()));

        let tool = SecurityAnalyzerTool::new(Arc::new(client));
        let result = tool.run(serde_json::json!({})).await.unwrap();

        assert!(!result.is_error);
        assert!(result
            .first_text()
            .unwrap()
            .starts_with("# Security Posture Analysis\n\n"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_error_result() {
        let mut client = MockClient::new();
        client
            .expect_complete()
            .times(1)
            .returning(|_| Err(advisor_llm::Error::Transport("connection reset".to_string())));

        let tool = SecurityAnalyzerTool::new(Arc::new(client));
        let result = tool.run(serde_json::json!({})).await.unwrap();

        assert!(result.is_error);
        let text = result.first_text().unwrap();
        assert!(text.starts_with("Security analysis failed:"));
        assert!(text.contains("connection reset"));
    }
}
