//! GitHub PR tool - opens a pull request with generated Terraform files
//!
//! Sequential GitHub REST calls: resolve the repository, branch off the
//! default branch, upload each file through the contents API, open the PR.
//! No concurrency, no retries.

use crate::builtins::github::parse_github_url;
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDescriptor, ToolResult};
use base64::Engine as _;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const GITHUB_API: &str = "https://api.github.com";
const USER_AGENT: &str = "scale-advisor";
const API_VERSION: &str = "2022-11-28";

fn default_branch_name() -> String {
    "feature/terraform-infrastructure".to_string()
}

fn default_pr_title() -> String {
    "Add Terraform Infrastructure Configuration".to_string()
}

fn default_infra_directory() -> String {
    "infra-gen".to_string()
}

#[derive(Debug, Deserialize)]
struct PrArgs {
    repository_url: String,
    #[serde(default)]
    github_token: Option<String>,
    #[serde(default = "default_branch_name")]
    branch_name: String,
    #[serde(default = "default_pr_title")]
    pr_title: String,
    #[serde(default)]
    pr_description: Option<String>,
    #[serde(default = "default_infra_directory")]
    infra_directory: String,
}

fn generate_pr_description(file_names: &[String]) -> String {
    let listed = file_names
        .iter()
        .filter(|name| name.ends_with(".tf") || *name == "README.md")
        .map(|name| format!("- `{name}`"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "## Terraform Infrastructure Configuration\n\n\
         This PR adds Terraform configuration files generated by Scale Advisor to manage AWS \
         infrastructure as code.\n\n\
         ### Files Added\n\n{listed}\n\n\
         ### Infrastructure Overview\n\n\
         - **Provider**: AWS (Terraform ~> 5.0)\n\
         - **Region**: us-east-1\n\
         - **Resources**: EC2 instances, RDS database, VPC, Security Groups\n\n\
         ### Deployment Instructions\n\n\
         1. **Initialize Terraform**:\n   ```bash\n   cd infra/\n   terraform init\n   ```\n\n\
         2. **Review the plan**:\n   ```bash\n   terraform plan\n   ```\n\n\
         3. **Apply infrastructure**:\n   ```bash\n   terraform apply\n   ```\n\n\
         ### Security Notes\n\n\
         Review and update the following before production deployment:\n\n\
         - [ ] Update RDS password (currently hardcoded - use AWS Secrets Manager)\n\
         - [ ] Restrict SSH access from 0.0.0.0/0 to specific IP ranges\n\
         - [ ] Enable final snapshots for RDS instances\n\
         - [ ] Review security group rules for least privilege access\n\
         - [ ] Configure proper backup and monitoring\n\n\
         ---\n\n\
         **Next Steps**: After merging, set up your AWS credentials and deploy using the \
         instructions above."
    )
}

/// Tool that uploads generated Terraform files and opens a GitHub PR
pub struct GithubPrTool {
    descriptor: ToolDescriptor,
    client: reqwest::Client,
}

impl Default for GithubPrTool {
    fn default() -> Self {
        Self::new()
    }
}

impl GithubPrTool {
    /// Create a new PR tool
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let descriptor = ToolDescriptor::new(
            "create_github_pr",
            "Create a GitHub pull request with generated Terraform infrastructure code. Uploads \
             files from the infrastructure directory to a new branch and opens a PR.",
        )
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "repository_url": {
                    "type": "string",
                    "description": "GitHub repository URL (e.g., https://github.com/owner/repo)"
                },
                "github_token": {
                    "type": "string",
                    "description": "GitHub Personal Access Token (or set GITHUB_TOKEN env var)"
                },
                "branch_name": {
                    "type": "string",
                    "description": "Name for the new branch",
                    "default": "feature/terraform-infrastructure"
                },
                "pr_title": {
                    "type": "string",
                    "description": "Pull request title",
                    "default": "Add Terraform Infrastructure Configuration"
                },
                "pr_description": {
                    "type": "string",
                    "description": "Pull request description"
                },
                "infra_directory": {
                    "type": "string",
                    "description": "Directory containing Terraform files to upload",
                    "default": "infra-gen"
                }
            },
            "required": ["repository_url"]
        }));

        Self { descriptor, client }
    }

    async fn api_request(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let url = format!("{GITHUB_API}{path}");
        let mut request = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION);

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("GitHub API request failed: {e}")))?;

        let status = response.status().as_u16();
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Network(format!("Failed to parse GitHub response: {e}")))?;

        if (200..300).contains(&status) {
            Ok(payload)
        } else {
            let message = payload
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error")
                .to_string();
            Err(Error::GitHub { status, message })
        }
    }

    /// Look up the blob SHA of an existing file on the branch, if any
    async fn existing_file_sha(
        &self,
        repo_path: &str,
        file_path: &str,
        branch: &str,
        token: &str,
    ) -> Result<Option<String>> {
        let path = format!("{repo_path}/contents/{file_path}?ref={branch}");
        match self.api_request(reqwest::Method::GET, &path, token, None).await {
            Ok(payload) => Ok(payload
                .get("sha")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())),
            Err(Error::GitHub { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String> {
        let args: PrArgs = serde_json::from_value(arguments).map_err(|e| {
            Error::InvalidArgument(format!("invalid arguments for create_github_pr: {e}"))
        })?;

        let token = args
            .github_token
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .ok_or_else(|| {
                Error::InvalidArgument(
                    "GitHub token is required (provide 'github_token' or set GITHUB_TOKEN)"
                        .to_string(),
                )
            })?;

        let repo = parse_github_url(&args.repository_url).ok_or_else(|| {
            Error::InvalidArgument(
                "repository_url must be a valid GitHub URL (e.g. https://github.com/owner/repo)"
                    .to_string(),
            )
        })?;

        let infra_dir = Path::new(&args.infra_directory);
        if !infra_dir.exists() {
            return Err(Error::InvalidArgument(format!(
                "infrastructure directory not found: {}. Run the \
                 generate_terraform_infrastructure tool first.",
                infra_dir.display()
            )));
        }

        // Collect files up front so nothing is uploaded for an empty run
        let mut files: Vec<(String, String)> = Vec::new();
        let mut entries = tokio::fs::read_dir(infra_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                let name = entry.file_name().to_string_lossy().to_string();
                let content = tokio::fs::read_to_string(entry.path()).await?;
                files.push((name, content));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));

        debug!(repo = %repo, branch = %args.branch_name, files = files.len(), "Creating PR");

        let repo_path = format!("/repos/{}/{}", repo.owner, repo.repo);

        let repository = self
            .api_request(reqwest::Method::GET, &repo_path, &token, None)
            .await?;
        let default_branch = repository
            .get("default_branch")
            .and_then(|v| v.as_str())
            .unwrap_or("main")
            .to_string();

        let base_ref = self
            .api_request(
                reqwest::Method::GET,
                &format!("{repo_path}/git/refs/heads/{default_branch}"),
                &token,
                None,
            )
            .await?;
        let base_sha = base_ref["object"]["sha"]
            .as_str()
            .ok_or_else(|| Error::Network("base ref response missing object.sha".to_string()))?
            .to_string();

        match self
            .api_request(
                reqwest::Method::POST,
                &format!("{repo_path}/git/refs"),
                &token,
                Some(serde_json::json!({
                    "ref": format!("refs/heads/{}", args.branch_name),
                    "sha": base_sha
                })),
            )
            .await
        {
            Ok(_) => debug!(branch = %args.branch_name, "Created branch"),
            Err(Error::GitHub { status: 422, .. }) => {
                debug!(branch = %args.branch_name, "Branch already exists, updating files");
            }
            Err(e) => return Err(e),
        }

        let mut uploaded = Vec::with_capacity(files.len());
        for (name, content) in &files {
            let github_path = format!("infra/{name}");
            let existing_sha = self
                .existing_file_sha(&repo_path, &github_path, &args.branch_name, &token)
                .await?;

            let mut body = serde_json::json!({
                "message": format!("Add {name} - Terraform infrastructure configuration"),
                "content": base64::engine::general_purpose::STANDARD.encode(content),
                "branch": args.branch_name
            });
            if let Some(sha) = existing_sha {
                body["sha"] = serde_json::Value::String(sha);
            }

            self.api_request(
                reqwest::Method::PUT,
                &format!("{repo_path}/contents/{github_path}"),
                &token,
                Some(body),
            )
            .await?;
            uploaded.push(github_path);
        }

        let description = args
            .pr_description
            .unwrap_or_else(|| {
                let names: Vec<String> = files.iter().map(|(name, _)| name.clone()).collect();
                generate_pr_description(&names)
            });

        let pull_request = self
            .api_request(
                reqwest::Method::POST,
                &format!("{repo_path}/pulls"),
                &token,
                Some(serde_json::json!({
                    "title": args.pr_title,
                    "body": description,
                    "head": args.branch_name,
                    "base": default_branch
                })),
            )
            .await?;

        let number = pull_request.get("number").and_then(|v| v.as_u64()).unwrap_or(0);
        let html_url = pull_request
            .get("html_url")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        info!(repo = %repo, pr = number, "Pull request created");

        Ok(format!(
            "Successfully created GitHub pull request!\n\n\
             **Pull Request Details:**\n\
             - **Repository**: {repo}\n\
             - **PR Number**: #{number}\n\
             - **Branch**: {branch}\n\
             - **Title**: {title}\n\
             - **URL**: {html_url}\n\n\
             **Files Uploaded**: {count} files\n{listed}\n\n\
             **Next Steps:**\n\
             1. Review the PR: {html_url}\n\
             2. Merge when ready\n\
             3. Deploy infrastructure: `cd infra && terraform init && terraform apply`\n\n\
             Review security settings before production deployment!",
            branch = args.branch_name,
            title = args.pr_title,
            count = uploaded.len(),
            listed = uploaded
                .iter()
                .map(|f| format!("- {f}"))
                .collect::<Vec<_>>()
                .join("\n"),
        ))
    }
}

#[async_trait::async_trait]
impl Tool for GithubPrTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, arguments: serde_json::Value) -> Result<ToolResult> {
        Ok(match self.execute(arguments).await {
            Ok(text) => ToolResult::text(text),
            Err(e) => ToolResult::error(format!("GitHub PR creation failed: {e}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor() {
        let tool = GithubPrTool::new();
        assert_eq!(tool.descriptor().name, "create_github_pr");
        assert_eq!(
            tool.descriptor().input_schema["required"],
            serde_json::json!(["repository_url"])
        );
    }

    #[test]
    fn test_pr_description_lists_terraform_files() {
        let names = vec![
            "ec2.tf".to_string(),
            "README.md".to_string(),
            "notes.txt".to_string(),
        ];
        let description = generate_pr_description(&names);

        assert!(description.contains("- `ec2.tf`"));
        assert!(description.contains("- `README.md`"));
        assert!(!description.contains("notes.txt"));
    }

    #[tokio::test]
    async fn test_empty_token_is_error_result() {
        let tool = GithubPrTool::new();
        let result = tool
            .run(serde_json::json!({
                "repository_url": "https://github.com/acme/widgets",
                "github_token": ""
            }))
            .await
            .unwrap();

        // Only fails fast when no token reaches the env fallback either
        if std::env::var("GITHUB_TOKEN").is_err() {
            assert!(result.is_error);
            assert!(result.first_text().unwrap().contains("GitHub token is required"));
        }
    }

    #[tokio::test]
    async fn test_missing_infra_directory_is_error_result() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");

        let tool = GithubPrTool::new();
        let result = tool
            .run(serde_json::json!({
                "repository_url": "https://github.com/acme/widgets",
                "github_token": "ghp_test",
                "infra_directory": missing.to_str().unwrap()
            }))
            .await
            .unwrap();

        assert!(result.is_error);
        assert!(result
            .first_text()
            .unwrap()
            .contains("infrastructure directory not found"));
    }

    #[tokio::test]
    async fn test_invalid_repository_url_is_error_result() {
        let tool = GithubPrTool::new();
        let result = tool
            .run(serde_json::json!({
                "repository_url": "https://example.com/acme/widgets",
                "github_token": "ghp_test"
            }))
            .await
            .unwrap();

        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("valid GitHub URL"));
    }
}
