//! Terraform generator - infrastructure code from the cloud inventory format
//!
//! Pure string-template expansion over the same JSON shape the cloud
//! fixtures serialize to. No model call.

use crate::error::{Error, Result};
use crate::fixtures::CloudResources;
use crate::registry::{Tool, ToolDescriptor, ToolResult};
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info};

fn default_input_file() -> String {
    "mockdata.json".to_string()
}

fn default_output_directory() -> String {
    "infra-gen".to_string()
}

fn default_terraform_version() -> String {
    ">= 1.0".to_string()
}

fn default_provider_version() -> String {
    "~> 5.0".to_string()
}

#[derive(Debug, Deserialize)]
struct TerraformArgs {
    #[serde(default = "default_input_file")]
    input_file: String,
    #[serde(default = "default_output_directory")]
    output_directory: String,
    #[serde(default = "default_terraform_version")]
    terraform_version: String,
    #[serde(default = "default_provider_version")]
    provider_version: String,
}

/// Terraform resource names only allow underscores
fn tf_name(raw: &str) -> String {
    raw.replace('-', "_")
}

/// Subnets referenced by the inventory, first-seen order, deduplicated by ID
fn unique_subnets(data: &CloudResources) -> Vec<(String, String)> {
    let mut subnets: Vec<(String, String)> = Vec::new();
    for instance in &data.ec2_instances {
        if !subnets.iter().any(|(id, _)| *id == instance.subnet_id) {
            subnets.push((instance.subnet_id.clone(), instance.availability_zone.clone()));
        }
    }
    subnets
}

/// Security groups referenced by the inventory, first-seen order
fn unique_security_groups(data: &CloudResources) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    let all = data
        .ec2_instances
        .iter()
        .flat_map(|i| i.security_groups.iter())
        .chain(data.rds_instances.iter().flat_map(|i| i.security_groups.iter()));
    for sg in all {
        if !groups.contains(sg) {
            groups.push(sg.clone());
        }
    }
    groups
}

fn generate_provider_config(
    region: &str,
    terraform_version: &str,
    provider_version: &str,
) -> String {
    format!(
        r#"terraform {{
  required_version = "{terraform_version}"

  required_providers {{
    aws = {{
      source  = "hashicorp/aws"
      version = "{provider_version}"
    }}
  }}
}}

provider "aws" {{
  region = "{region}"

  default_tags {{
    tags = {{
      ManagedBy = "Terraform"
      Project   = "ScaleAdvisor"
    }}
  }}
}}
"#
    )
}

fn generate_vpc_config(subnets: &[(String, String)]) -> String {
    let mut out = String::from(
        r#"# VPC Configuration
resource "aws_vpc" "main" {
  cidr_block           = "10.0.0.0/16"
  enable_dns_hostnames = true
  enable_dns_support   = true

  tags = {
    Name = "main-vpc"
  }
}

resource "aws_internet_gateway" "main" {
  vpc_id = aws_vpc.main.id

  tags = {
    Name = "main-igw"
  }
}

# Subnets
"#,
    );

    for (index, (_, az)) in subnets.iter().enumerate() {
        let n = index + 1;
        let _ = write!(
            out,
            r#"
resource "aws_subnet" "subnet_{n}" {{
  vpc_id                  = aws_vpc.main.id
  cidr_block              = "10.0.{n}.0/24"
  availability_zone       = "{az}"
  map_public_ip_on_launch = true

  tags = {{
    Name = "subnet-{n}"
  }}
}}
"#
        );
    }

    out.push_str(
        r#"
# Route Table
resource "aws_route_table" "public" {
  vpc_id = aws_vpc.main.id

  route {
    cidr_block = "0.0.0.0/0"
    gateway_id = aws_internet_gateway.main.id
  }

  tags = {
    Name = "public-rt"
  }
}
"#,
    );

    for index in 0..subnets.len() {
        let n = index + 1;
        let _ = write!(
            out,
            r#"
resource "aws_route_table_association" "public_{n}" {{
  subnet_id      = aws_subnet.subnet_{n}.id
  route_table_id = aws_route_table.public.id
}}
"#
        );
    }

    out
}

fn generate_security_groups(data: &CloudResources) -> String {
    let mut out = String::from("# Security Groups\n");

    for sg in unique_security_groups(data) {
        let name = tf_name(&sg);
        let _ = write!(
            out,
            r#"
resource "aws_security_group" "{name}" {{
  name_prefix = "{sg}"
  vpc_id      = aws_vpc.main.id
"#
        );

        if sg.contains("web") {
            out.push_str(
                r#"
  ingress {
    from_port   = 80
    to_port     = 80
    protocol    = "tcp"
    cidr_blocks = ["0.0.0.0/0"]
  }

  ingress {
    from_port   = 443
    to_port     = 443
    protocol    = "tcp"
    cidr_blocks = ["0.0.0.0/0"]
  }
"#,
            );
        }

        if sg.contains("api") {
            out.push_str(
                r#"
  ingress {
    from_port   = 8080
    to_port     = 8080
    protocol    = "tcp"
    cidr_blocks = ["10.0.0.0/16"]
  }
"#,
            );
        }

        if sg.contains("ssh") {
            out.push_str(
                r#"
  ingress {
    from_port   = 22
    to_port     = 22
    protocol    = "tcp"
    cidr_blocks = ["0.0.0.0/0"]  # Restrict this in production
  }
"#,
            );
        }

        if sg.contains("database") {
            out.push_str(
                r#"
  ingress {
    from_port   = 5432
    to_port     = 5432
    protocol    = "tcp"
    cidr_blocks = ["10.0.0.0/16"]
  }
"#,
            );
        }

        let _ = write!(
            out,
            r#"
  egress {{
    from_port   = 0
    to_port     = 0
    protocol    = "-1"
    cidr_blocks = ["0.0.0.0/0"]
  }}

  tags = {{
    Name = "{sg}"
  }}
}}
"#
        );
    }

    out
}

fn generate_ec2_config(data: &CloudResources, subnets: &[(String, String)]) -> String {
    let mut out = String::from("# EC2 Instances\n");

    for (index, instance) in data.ec2_instances.iter().enumerate() {
        let resource_name = instance
            .tags
            .get("Name")
            .map(|name| tf_name(name))
            .unwrap_or_else(|| format!("instance_{index}"));
        let subnet_index = subnets
            .iter()
            .position(|(id, _)| *id == instance.subnet_id)
            .map_or(1, |pos| pos + 1);
        let group_refs = instance
            .security_groups
            .iter()
            .map(|sg| format!("aws_security_group.{}.id", tf_name(sg)))
            .collect::<Vec<_>>()
            .join(", ");

        let _ = write!(
            out,
            r#"
resource "aws_instance" "{resource_name}" {{
  ami           = "ami-0c02fb55956c7d316"  # Amazon Linux 2 AMI
  instance_type = "{instance_type}"

  subnet_id                   = aws_subnet.subnet_{subnet_index}.id
  vpc_security_group_ids      = [{group_refs}]
  associate_public_ip_address = {public}
"#,
            instance_type = instance.instance_type,
            public = instance.public_ip_address.is_some(),
        );

        if instance.state == "stopped" {
            out.push_str("\n  # This instance is currently stopped\n");
        }

        out.push_str("\n  tags = {\n");
        for (key, value) in &instance.tags {
            let _ = writeln!(out, "    {key} = \"{value}\"");
        }
        out.push_str("  }\n}\n");
    }

    out
}

fn generate_rds_config(data: &CloudResources) -> String {
    let mut out = String::from(
        r#"# RDS Database Subnet Group
resource "aws_db_subnet_group" "main" {
  name       = "main-db-subnet-group"
  subnet_ids = [aws_subnet.subnet_1.id, aws_subnet.subnet_2.id]

  tags = {
    Name = "Main DB subnet group"
  }
}

# RDS Instances
"#,
    );

    for instance in &data.rds_instances {
        let resource_name = tf_name(&instance.db_instance_identifier);
        let group_refs = instance
            .security_groups
            .iter()
            .map(|sg| format!("aws_security_group.{}.id", tf_name(sg)))
            .collect::<Vec<_>>()
            .join(", ");

        let _ = write!(
            out,
            r#"
resource "aws_db_instance" "{resource_name}" {{
  identifier = "{identifier}"

  engine         = "{engine}"
  engine_version = "{engine_version}"
  instance_class = "{instance_class}"

  allocated_storage = {storage}
  storage_type      = "{storage_type}"
  storage_encrypted = true

  db_name  = "appdb"
  username = "dbadmin"
  password = "changeme123!"  # Use AWS Secrets Manager in production

  vpc_security_group_ids = [{group_refs}]
  db_subnet_group_name   = aws_db_subnet_group.main.name

  backup_retention_period = {retention}
  backup_window           = "03:00-04:00"
  maintenance_window      = "sun:04:00-sun:05:00"

  multi_az            = {multi_az}
  publicly_accessible = false

  skip_final_snapshot = true  # Set to false in production
"#,
            identifier = instance.db_instance_identifier,
            engine = instance.engine,
            engine_version = instance.engine_version,
            instance_class = instance.db_instance_class,
            storage = instance.allocated_storage,
            storage_type = instance.storage_type,
            retention = instance.backup_retention_period,
            multi_az = instance.multi_az,
        );

        out.push_str("\n  tags = {\n");
        for (key, value) in &instance.tags {
            let _ = writeln!(out, "    {key} = \"{value}\"");
        }
        out.push_str("  }\n}\n");
    }

    out
}

fn generate_outputs_config(data: &CloudResources) -> String {
    let mut out = String::from(
        r#"# Outputs
output "vpc_id" {
  description = "ID of the VPC"
  value       = aws_vpc.main.id
}
"#,
    );

    for (index, instance) in data.ec2_instances.iter().enumerate() {
        let display_name = instance
            .tags
            .get("Name")
            .cloned()
            .unwrap_or_else(|| format!("instance_{index}"));
        let resource_name = tf_name(&display_name);
        let _ = write!(
            out,
            r#"
output "{resource_name}_public_ip" {{
  description = "Public IP address of {display_name}"
  value       = aws_instance.{resource_name}.public_ip
}}
"#
        );
    }

    for instance in &data.rds_instances {
        let resource_name = tf_name(&instance.db_instance_identifier);
        let _ = write!(
            out,
            r#"
output "{resource_name}_endpoint" {{
  description = "RDS instance endpoint"
  value       = aws_db_instance.{resource_name}.endpoint
}}
"#,
        );
    }

    out
}

fn generate_readme(data: &CloudResources) -> String {
    let running = data
        .ec2_instances
        .iter()
        .filter(|i| i.state == "running")
        .count();

    format!(
        "# Generated Terraform Infrastructure\n\n\
         This infrastructure was generated from cloud inventory data using the Scale Advisor \
         infrastructure generator.\n\n\
         ## Resources Created\n\n\
         - **VPC**: Main VPC with public subnets\n\
         - **EC2 Instances**: {ec2} instances ({running} running)\n\
         - **RDS Instances**: {rds} database instances\n\
         - **Security Groups**: Configured for web, API, SSH, and database access\n\n\
         ## Usage\n\n\
         1. Initialize Terraform:\n   ```bash\n   terraform init\n   ```\n\n\
         2. Plan the deployment:\n   ```bash\n   terraform plan\n   ```\n\n\
         3. Apply the infrastructure:\n   ```bash\n   terraform apply\n   ```\n\n\
         ## Security Notes\n\n\
         This configuration is for development/testing purposes:\n\n\
         - RDS password is hardcoded (use AWS Secrets Manager in production)\n\
         - SSH access is open to 0.0.0.0/0 (restrict in production)\n\
         - Final snapshots are skipped (enable in production)\n\n\
         ## Generated Files\n\n\
         - `providers.tf` - Terraform and AWS provider configuration\n\
         - `vpc.tf` - VPC, subnets, and networking\n\
         - `security_groups.tf` - Security group rules\n\
         - `ec2.tf` - EC2 instance configurations\n\
         - `rds.tf` - RDS database configurations\n\
         - `outputs.tf` - Output values for important resources\n",
        ec2 = data.ec2_instances.len(),
        rds = data.rds_instances.len(),
    )
}

/// Tool that expands the cloud inventory into Terraform files
pub struct TerraformGeneratorTool {
    descriptor: ToolDescriptor,
}

impl Default for TerraformGeneratorTool {
    fn default() -> Self {
        Self::new()
    }
}

impl TerraformGeneratorTool {
    /// Create a new Terraform generator
    #[must_use]
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(
            "generate_terraform_infrastructure",
            "Generate Terraform infrastructure code from AWS resource inventory data. Creates \
             properly structured .tf files for EC2 instances, RDS databases, VPCs, and security \
             groups.",
        )
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "input_file": {
                    "type": "string",
                    "description": "Path to JSON file containing AWS resource data",
                    "default": "mockdata.json"
                },
                "output_directory": {
                    "type": "string",
                    "description": "Directory to output Terraform files",
                    "default": "infra-gen"
                },
                "terraform_version": {
                    "type": "string",
                    "description": "Terraform version constraint",
                    "default": ">= 1.0"
                },
                "provider_version": {
                    "type": "string",
                    "description": "AWS provider version constraint",
                    "default": "~> 5.0"
                }
            },
            "required": []
        }));

        Self { descriptor }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String> {
        let args: TerraformArgs = serde_json::from_value(arguments).map_err(|e| {
            Error::InvalidArgument(format!(
                "invalid arguments for generate_terraform_infrastructure: {e}"
            ))
        })?;

        let input_path = Path::new(&args.input_file);
        if !input_path.exists() {
            return Err(Error::InvalidArgument(format!(
                "input file not found: {}",
                input_path.display()
            )));
        }

        let raw = tokio::fs::read_to_string(input_path).await?;
        let data: CloudResources = serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidArgument(format!("invalid inventory data: {e}")))?;

        let output_dir = Path::new(&args.output_directory);
        tokio::fs::create_dir_all(output_dir).await?;

        let subnets = unique_subnets(&data);
        let files = [
            (
                "providers.tf",
                generate_provider_config(
                    &data.region,
                    &args.terraform_version,
                    &args.provider_version,
                ),
            ),
            ("vpc.tf", generate_vpc_config(&subnets)),
            ("security_groups.tf", generate_security_groups(&data)),
            ("ec2.tf", generate_ec2_config(&data, &subnets)),
            ("rds.tf", generate_rds_config(&data)),
            ("outputs.tf", generate_outputs_config(&data)),
            ("README.md", generate_readme(&data)),
        ];

        for (name, content) in &files {
            let path = output_dir.join(name);
            tokio::fs::write(&path, content).await?;
            debug!(file = %path.display(), "Generated Terraform file");
        }

        info!(
            output_dir = %output_dir.display(),
            files = files.len(),
            "Terraform generation complete"
        );

        Ok(format!(
            "Successfully generated Terraform infrastructure code from {input}\n\n\
             Output Directory: {output}/\n\
             Files Generated: {count} files\n\n\
             Infrastructure Summary:\n\
             - Region: {region}\n\
             - EC2 Instances: {ec2}\n\
             - RDS Instances: {rds}\n\
             - Security Groups: {groups}\n\n\
             Next Steps:\n\
             1. cd {output}\n\
             2. terraform init\n\
             3. terraform plan\n\
             4. terraform apply\n\n\
             Review security settings before deploying to production!",
            input = args.input_file,
            output = args.output_directory,
            count = files.len(),
            region = data.region,
            ec2 = data.ec2_instances.len(),
            rds = data.rds_instances.len(),
            groups = unique_security_groups(&data).len(),
        ))
    }
}

#[async_trait::async_trait]
impl Tool for TerraformGeneratorTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, arguments: serde_json::Value) -> Result<ToolResult> {
        Ok(match self.execute(arguments).await {
            Ok(text) => ToolResult::text(text),
            Err(e) => ToolResult::error(format!("Infrastructure generation failed: {e}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_cloud_resources;

    fn write_fixture(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("mockdata.json");
        let json = serde_json::to_string_pretty(&sample_cloud_resources()).unwrap();
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_unique_subnets_dedup_first_seen() {
        let data = sample_cloud_resources();
        let subnets = unique_subnets(&data);
        assert_eq!(subnets.len(), 2);
        assert_eq!(subnets[0].0, "subnet-12345678");
        assert_eq!(subnets[1].0, "subnet-87654321");
    }

    #[test]
    fn test_unique_security_groups_cover_rds() {
        let data = sample_cloud_resources();
        let groups = unique_security_groups(&data);
        assert_eq!(groups.len(), 5);
        assert!(groups.contains(&"sg-database-prod".to_string()));
    }

    #[test]
    fn test_generated_configs_are_deterministic() {
        let data = sample_cloud_resources();
        let subnets = unique_subnets(&data);
        assert_eq!(
            generate_ec2_config(&data, &subnets),
            generate_ec2_config(&data, &subnets)
        );
        assert_eq!(
            generate_security_groups(&data),
            generate_security_groups(&data)
        );
    }

    #[test]
    fn test_ec2_config_contents() {
        let data = sample_cloud_resources();
        let subnets = unique_subnets(&data);
        let config = generate_ec2_config(&data, &subnets);

        assert!(config.contains("resource \"aws_instance\" \"web_server_prod\""));
        assert!(config.contains("aws_security_group.sg_web_prod.id"));
        assert!(config.contains("associate_public_ip_address = true"));
        assert!(config.contains("# This instance is currently stopped"));
        assert!(config.contains("aws_subnet.subnet_2.id"), "api server lands in second subnet");
    }

    #[test]
    fn test_security_group_rules_by_role() {
        let data = sample_cloud_resources();
        let config = generate_security_groups(&data);

        assert!(config.contains("resource \"aws_security_group\" \"sg_web_prod\""));
        assert!(config.contains("from_port   = 443"));
        assert!(config.contains("from_port   = 5432"));
        assert!(config.contains("from_port   = 22"));
    }

    #[test]
    fn test_rds_config_contents() {
        let data = sample_cloud_resources();
        let config = generate_rds_config(&data);

        assert!(config.contains("resource \"aws_db_instance\" \"prod_postgres_main\""));
        assert!(config.contains("engine         = \"postgres\""));
        assert!(config.contains("multi_az            = true"));
        assert!(config.contains("backup_retention_period = 7"));
    }

    #[tokio::test]
    async fn test_generates_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(dir.path());
        let output = dir.path().join("out");

        let tool = TerraformGeneratorTool::new();
        let result = tool
            .run(serde_json::json!({
                "input_file": input.to_str().unwrap(),
                "output_directory": output.to_str().unwrap()
            }))
            .await
            .unwrap();

        assert!(!result.is_error, "{:?}", result.first_text());
        for name in [
            "providers.tf",
            "vpc.tf",
            "security_groups.tf",
            "ec2.tf",
            "rds.tf",
            "outputs.tf",
            "README.md",
        ] {
            assert!(output.join(name).exists(), "missing {name}");
        }

        let providers = std::fs::read_to_string(output.join("providers.tf")).unwrap();
        assert!(providers.contains("required_version = \">= 1.0\""));
        assert!(providers.contains("region = \"us-east-1\""));

        let summary = result.first_text().unwrap();
        assert!(summary.contains("EC2 Instances: 3"));
        assert!(summary.contains("Security Groups: 5"));
    }

    #[tokio::test]
    async fn test_missing_input_file_is_error_result() {
        let dir = tempfile::tempdir().unwrap();
        let tool = TerraformGeneratorTool::new();
        let result = tool
            .run(serde_json::json!({
                "input_file": dir.path().join("nope.json").to_str().unwrap()
            }))
            .await
            .unwrap();

        assert!(result.is_error);
        assert!(result
            .first_text()
            .unwrap()
            .starts_with("Infrastructure generation failed:"));
    }
}
