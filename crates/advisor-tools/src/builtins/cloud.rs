//! Cloud analyzer - AWS resource analysis through the model

use crate::error::{Error, Result};
use crate::fixtures::{sample_cloud_resources, CloudResources};
use crate::registry::{Tool, ToolDescriptor, ToolResult};
use crate::tuning;
use advisor_llm::CompletionClient;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

const SYSTEM_DIRECTIVE: &str = "You are a senior cloud architect and DevOps expert specializing \
    in AWS infrastructure analysis. Provide detailed, actionable insights about cloud resources, \
    focusing on best practices, security, performance, and cost optimization. Use clear \
    formatting with headers and bullet points.";

/// Type of cloud analysis to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudAnalysisType {
    /// Resource summary and environment classification
    #[default]
    Overview,
    /// Complete inventory and architecture breakdown
    Detailed,
    /// Security-group and access review
    Security,
    /// Cost and right-sizing review
    Cost,
}

impl CloudAnalysisType {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Detailed => "detailed",
            Self::Security => "security",
            Self::Cost => "cost",
        }
    }
}

fn default_include_recommendations() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct CloudAnalyzerArgs {
    #[serde(default)]
    analysis_type: CloudAnalysisType,
    #[serde(default = "default_include_recommendations")]
    include_recommendations: bool,
}

fn render_prompt(
    resources: &CloudResources,
    analysis_type: CloudAnalysisType,
    include_recommendations: bool,
) -> String {
    let mut prompt = format!(
        "Analyze the following AWS cloud resources in region {} for account {}:\n\n",
        resources.region, resources.account_id
    );

    let _ = writeln!(
        prompt,
        "**EC2 Instances ({}):**",
        resources.ec2_instances.len()
    );
    for instance in &resources.ec2_instances {
        let tags = serde_json::to_string(&instance.tags).unwrap_or_default();
        let _ = writeln!(prompt, "- {} ({})", instance.instance_id, instance.instance_type);
        let _ = writeln!(prompt, "  State: {}", instance.state);
        let _ = writeln!(prompt, "  AZ: {}", instance.availability_zone);
        let _ = writeln!(prompt, "  Tags: {tags}");
        let _ = writeln!(
            prompt,
            "  Security Groups: {}\n",
            instance.security_groups.join(", ")
        );
    }

    let _ = writeln!(
        prompt,
        "**RDS Instances ({}):**",
        resources.rds_instances.len()
    );
    for db in &resources.rds_instances {
        let _ = writeln!(
            prompt,
            "- {} ({})",
            db.db_instance_identifier, db.db_instance_class
        );
        let _ = writeln!(prompt, "  Engine: {} {}", db.engine, db.engine_version);
        let _ = writeln!(prompt, "  Status: {}", db.db_instance_status);
        let _ = writeln!(
            prompt,
            "  Storage: {}GB {}",
            db.allocated_storage, db.storage_type
        );
        let _ = writeln!(prompt, "  Multi-AZ: {}", db.multi_az);
        let _ = writeln!(
            prompt,
            "  Backup Retention: {} days\n",
            db.backup_retention_period
        );
    }

    match analysis_type {
        CloudAnalysisType::Detailed => prompt.push_str(
            "Provide a detailed analysis including:\n\
             1. **Resource Inventory**: Complete breakdown of all resources\n\
             2. **Architecture Overview**: How resources are connected and organized\n\
             3. **Performance Characteristics**: Instance types, storage, and capacity\n\
             4. **Network Configuration**: VPC, subnets, security groups\n\
             5. **Operational Status**: Current state and health of resources",
        ),
        CloudAnalysisType::Security => prompt.push_str(
            "Focus on security analysis:\n\
             1. **Security Groups**: Review firewall rules and access patterns\n\
             2. **Network Security**: VPC configuration and isolation\n\
             3. **Access Control**: Public vs private resources\n\
             4. **Database Security**: RDS security configuration\n\
             5. **Compliance**: Best practices adherence",
        ),
        CloudAnalysisType::Cost => prompt.push_str(
            "Focus on cost optimization:\n\
             1. **Instance Sizing**: Right-sizing opportunities\n\
             2. **Resource Utilization**: Underutilized or idle resources\n\
             3. **Storage Optimization**: Storage type and size recommendations\n\
             4. **Reserved Instances**: Potential savings opportunities\n\
             5. **Cost Estimation**: Approximate monthly costs",
        ),
        CloudAnalysisType::Overview => prompt.push_str(
            "Provide an overview analysis including:\n\
             1. **Resource Summary**: What resources exist and their purpose\n\
             2. **Environment Classification**: Production, staging, development resources\n\
             3. **Key Observations**: Notable configurations or patterns\n\
             4. **Health Status**: Overall system health and availability",
        ),
    }

    if include_recommendations {
        prompt.push_str(
            "\n\n**Recommendations**: Provide actionable recommendations for:\n\
             - Performance improvements\n\
             - Cost optimization\n\
             - Security enhancements\n\
             - Operational best practices",
        );
    }

    prompt
}

/// Tool that analyzes the mock AWS inventory via the model
pub struct CloudAnalyzerTool {
    descriptor: ToolDescriptor,
    client: Arc<dyn CompletionClient>,
}

impl CloudAnalyzerTool {
    /// Create a new cloud analyzer
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        let descriptor = ToolDescriptor::new(
            "analyze_cloud_resources",
            "Analyze AWS cloud resources including EC2 instances and RDS databases. Provides \
             insights on resource utilization, security, and cost optimization opportunities.",
        )
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "analysis_type": {
                    "type": "string",
                    "enum": ["overview", "detailed", "security", "cost"],
                    "description": "Type of analysis to perform (default: overview)",
                    "default": "overview"
                },
                "include_recommendations": {
                    "type": "boolean",
                    "description": "Whether to include optimization recommendations (default: true)",
                    "default": true
                }
            },
            "required": []
        }));

        Self { descriptor, client }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String> {
        let args: CloudAnalyzerArgs = serde_json::from_value(arguments).map_err(|e| {
            Error::InvalidArgument(format!("invalid arguments for analyze_cloud_resources: {e}"))
        })?;

        let resources = sample_cloud_resources();
        debug!(
            analysis_type = args.analysis_type.as_str(),
            ec2 = resources.ec2_instances.len(),
            rds = resources.rds_instances.len(),
            "Analyzing cloud resources"
        );

        let prompt = render_prompt(&resources, args.analysis_type, args.include_recommendations);
        let text = self
            .client
            .complete(tuning::CLOUD_ANALYSIS.params(prompt).with_system(SYSTEM_DIRECTIVE))
            .await?;

        Ok(format!("# AWS Cloud Resources Analysis\n\n{text}"))
    }
}

#[async_trait::async_trait]
impl Tool for CloudAnalyzerTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, arguments: serde_json::Value) -> Result<ToolResult> {
        Ok(match self.execute(arguments).await {
            Ok(text) => ToolResult::text(text),
            Err(e) => ToolResult::error(format!("Error analyzing cloud resources: {e}")),
        })
    }
}
