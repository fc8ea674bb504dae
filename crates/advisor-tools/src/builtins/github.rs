//! GitHub analyzer - repository analysis through the model

use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDescriptor, ToolResult};
use crate::tuning;
use advisor_llm::CompletionClient;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::debug;

static GITHUB_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com/([^/]+)/([^/]+)").expect("valid regex"));

const SYSTEM_DIRECTIVE: &str = "You are a senior software engineer and technical analyst. When \
    analyzing GitHub repositories, search for and review the actual repository content including \
    README files, source code, configuration files, and documentation. Provide accurate, detailed \
    technical insights based on what you find. If you cannot access the repository directly, \
    clearly state this limitation.";

/// Level of analysis detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    /// Short overview
    #[default]
    Basic,
    /// Full structural breakdown
    Detailed,
}

impl AnalysisDepth {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Detailed => "detailed",
        }
    }
}

/// An owner/repo pair parsed from a GitHub URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Repository owner
    pub owner: String,
    /// Repository name (".git" suffix stripped)
    pub repo: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Parse an owner/repo pair out of a GitHub repository URL
#[must_use]
pub fn parse_github_url(url: &str) -> Option<RepoRef> {
    let captures = GITHUB_URL_RE.captures(url)?;
    let owner = captures[1].to_string();
    let repo = captures[2].trim_end_matches(".git").to_string();
    Some(RepoRef { owner, repo })
}

fn default_repository_url() -> String {
    tuning::DEFAULT_REPOSITORY_URL.to_string()
}

fn default_include_dependencies() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct GithubAnalyzerArgs {
    #[serde(default = "default_repository_url")]
    repository_url: String,
    #[serde(default)]
    analysis_depth: AnalysisDepth,
    #[serde(default = "default_include_dependencies")]
    include_dependencies: bool,
}

fn render_prompt(repo: &RepoRef, depth: AnalysisDepth, include_dependencies: bool) -> String {
    let mut prompt = format!(
        "Please analyze the GitHub repository \"{repo}\" and provide a comprehensive overview. "
    );

    match depth {
        AnalysisDepth::Detailed => {
            prompt.push_str(
                "I need a detailed analysis including:\n\n\
                 1. **Repository Overview**\n\
                 \x20  - What does this project do? (main purpose and functionality)\n\
                 \x20  - Target audience and use cases\n\
                 \x20  - Project maturity and activity level\n\n\
                 2. **Technical Architecture**\n\
                 \x20  - Programming languages used (with percentages if available)\n\
                 \x20  - Frameworks and libraries\n\
                 \x20  - Architecture patterns and design decisions\n\
                 \x20  - Key directories and file structure\n\n\
                 3. **Technology Stack**",
            );

            if include_dependencies {
                prompt.push_str(
                    "\n\
                     \x20  - Dependencies and package managers used\n\
                     \x20  - Build tools and development workflow\n\
                     \x20  - Testing frameworks\n\
                     \x20  - CI/CD setup",
                );
            }

            prompt.push_str(
                "\n\n\
                 4. **Key Features & Functionality**\n\
                 \x20  - Main features and capabilities\n\
                 \x20  - Notable code patterns or implementations\n\
                 \x20  - Performance considerations\n\n\
                 5. **Development & Community**\n\
                 \x20  - Documentation quality\n\
                 \x20  - Contribution guidelines\n\
                 \x20  - Community activity and maintenance status\n\
                 \x20  - Recent updates and roadmap\n\n\
                 Please search for and review the repository's README, \
                 package.json/requirements.txt, source code structure, and any documentation to \
                 provide accurate insights.",
            );
        }
        AnalysisDepth::Basic => {
            prompt.push_str(
                "I need a basic analysis covering:\n\n\
                 1. **What it does**: Main purpose and functionality\n\
                 2. **Technologies used**: Programming languages, main frameworks/libraries\n\
                 3. **Project type**: (web app, library, CLI tool, etc.)\n\
                 4. **Key features**: Main capabilities and use cases",
            );

            if include_dependencies {
                prompt.push_str("\n5. **Tech stack**: Dependencies and build tools used");
            }

            prompt.push_str(
                "\n\nPlease search for the repository and provide a concise but informative \
                 overview.",
            );
        }
    }

    prompt
}

/// Tool that analyzes a GitHub repository via the model
pub struct GithubAnalyzerTool {
    descriptor: ToolDescriptor,
    client: Arc<dyn CompletionClient>,
}

impl GithubAnalyzerTool {
    /// Create a new GitHub analyzer
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        let descriptor = ToolDescriptor::new(
            "github_analyze_repository",
            "Analyze a GitHub repository to understand what it does, technologies used, \
             architecture, and key features.",
        )
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "repository_url": {
                    "type": "string",
                    "description": "The GitHub repository URL to analyze (e.g., https://github.com/owner/repo)",
                    "default": tuning::DEFAULT_REPOSITORY_URL
                },
                "analysis_depth": {
                    "type": "string",
                    "enum": ["basic", "detailed"],
                    "description": "Level of analysis detail (default: basic)",
                    "default": "basic"
                },
                "include_dependencies": {
                    "type": "boolean",
                    "description": "Whether to analyze dependencies and tech stack in detail (default: true)",
                    "default": true
                }
            },
            "required": []
        }));

        Self { descriptor, client }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String> {
        let args: GithubAnalyzerArgs = serde_json::from_value(arguments).map_err(|e| {
            Error::InvalidArgument(format!("invalid arguments for github_analyze_repository: {e}"))
        })?;

        if !args.repository_url.contains("github.com") {
            return Err(Error::InvalidArgument(
                "repository_url must be a valid GitHub URL (e.g. https://github.com/owner/repo)"
                    .to_string(),
            ));
        }

        let repo = parse_github_url(&args.repository_url).ok_or_else(|| {
            Error::InvalidArgument(
                "repository_url must be a valid GitHub URL (e.g. https://github.com/owner/repo)"
                    .to_string(),
            )
        })?;

        debug!(repo = %repo, depth = args.analysis_depth.as_str(), "Analyzing repository");

        let prompt = render_prompt(&repo, args.analysis_depth, args.include_dependencies);
        let text = self
            .client
            .complete(tuning::GITHUB_ANALYSIS.params(prompt).with_system(SYSTEM_DIRECTIVE))
            .await?;

        Ok(format!("# GitHub Repository Analysis: {repo}\n\n{text}"))
    }
}

#[async_trait::async_trait]
impl Tool for GithubAnalyzerTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, arguments: serde_json::Value) -> Result<ToolResult> {
        Ok(match self.execute(arguments).await {
            Ok(text) => ToolResult::text(text),
            Err(e) => ToolResult::error(format!("Error analyzing GitHub repository: {e}")),
        })
    }
}
