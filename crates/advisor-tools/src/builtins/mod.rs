//! Builtins - the Scale Advisor tool set
//!
//! - Chat tools: claude_chat, claude_completion
//! - Analyzers: github_analyze_repository, analyze_cloud_resources,
//!   analyze_security_posture
//! - Infrastructure: generate_terraform_infrastructure, create_github_pr

pub mod chat;
pub mod cloud;
pub mod github;
pub mod pull_request;
pub mod security;
pub mod terraform;

pub use chat::{ClaudeChatTool, ClaudeCompletionTool};
pub use cloud::{CloudAnalysisType, CloudAnalyzerTool};
pub use github::{parse_github_url, AnalysisDepth, GithubAnalyzerTool, RepoRef};
pub use pull_request::GithubPrTool;
pub use security::{AnalysisScope, SecurityAnalyzerTool, SeverityThreshold};
pub use terraform::TerraformGeneratorTool;

use crate::orchestrator::ComprehensiveAnalysisTool;
use crate::registry::ToolRegistry;
use advisor_llm::CompletionClient;
use std::sync::Arc;

/// Register the full tool set with the registry
pub fn register_builtins(registry: &mut ToolRegistry, client: Arc<dyn CompletionClient>) {
    registry.register(Arc::new(ClaudeChatTool::new(client.clone())));
    registry.register(Arc::new(ClaudeCompletionTool::new(client.clone())));
    registry.register(Arc::new(GithubAnalyzerTool::new(client.clone())));
    registry.register(Arc::new(CloudAnalyzerTool::new(client.clone())));
    registry.register(Arc::new(SecurityAnalyzerTool::new(client.clone())));
    registry.register(Arc::new(TerraformGeneratorTool::new()));
    registry.register(Arc::new(GithubPrTool::new()));
    registry.register(Arc::new(ComprehensiveAnalysisTool::new(client)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_llm::CompletionParams;

    struct NoopClient;

    #[async_trait::async_trait]
    impl CompletionClient for NoopClient {
        async fn complete(&self, _params: CompletionParams) -> advisor_llm::Result<String> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_register_builtins() {
        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry, Arc::new(NoopClient));

        assert!(registry.has("claude_chat"));
        assert!(registry.has("claude_completion"));
        assert!(registry.has("github_analyze_repository"));
        assert!(registry.has("analyze_cloud_resources"));
        assert!(registry.has("analyze_security_posture"));
        assert!(registry.has("generate_terraform_infrastructure"));
        assert!(registry.has("create_github_pr"));
        assert!(registry.has("analyze_repository_and_cloud"));
        assert_eq!(registry.len(), 8);
    }
}
