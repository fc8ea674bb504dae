//! Fixtures - Mock cloud inventory and security posture data
//!
//! The analyzers run against a fixed in-memory inventory rather than live
//! AWS APIs. The same structures describe the JSON input of the Terraform
//! generator, so field names serialize in the camelCase form that file
//! format uses.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An EC2 instance in the mock inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ec2Instance {
    /// Instance ID
    pub instance_id: String,
    /// Instance type (e.g. t3.medium)
    pub instance_type: String,
    /// Lifecycle state (running, stopped)
    pub state: String,
    /// Availability zone
    pub availability_zone: String,
    /// Public IP, when assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_ip_address: Option<String>,
    /// Private IP
    pub private_ip_address: String,
    /// Launch timestamp
    pub launch_time: String,
    /// Resource tags (sorted for deterministic rendering)
    pub tags: BTreeMap<String, String>,
    /// Attached security groups
    pub security_groups: Vec<String>,
    /// VPC ID
    pub vpc_id: String,
    /// Subnet ID
    pub subnet_id: String,
}

/// Network endpoint of an RDS instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdsEndpoint {
    /// Hostname
    pub address: String,
    /// Port
    pub port: u16,
}

/// An RDS instance in the mock inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RdsInstance {
    /// DB instance identifier
    pub db_instance_identifier: String,
    /// DB instance class
    pub db_instance_class: String,
    /// Database engine
    pub engine: String,
    /// Engine version
    pub engine_version: String,
    /// Current status
    pub db_instance_status: String,
    /// Availability zone
    pub availability_zone: String,
    /// Connection endpoint
    pub endpoint: RdsEndpoint,
    /// Allocated storage in GB
    pub allocated_storage: u32,
    /// Storage type (e.g. gp3)
    pub storage_type: String,
    /// Whether multi-AZ is enabled
    pub multi_az: bool,
    /// VPC ID
    pub vpc_id: String,
    /// Subnet group name
    pub subnet_group_name: String,
    /// Attached security groups
    pub security_groups: Vec<String>,
    /// Backup retention in days
    pub backup_retention_period: u32,
    /// Resource tags
    pub tags: BTreeMap<String, String>,
}

/// The full mock cloud inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudResources {
    /// AWS region
    pub region: String,
    /// AWS account ID
    pub account_id: String,
    /// EC2 instances
    pub ec2_instances: Vec<Ec2Instance>,
    /// RDS instances
    pub rds_instances: Vec<RdsInstance>,
}

fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// The mock AWS inventory the cloud analyzer and Terraform generator see
#[must_use]
pub fn sample_cloud_resources() -> CloudResources {
    CloudResources {
        region: "us-east-1".to_string(),
        account_id: "123456789012".to_string(),
        ec2_instances: vec![
            Ec2Instance {
                instance_id: "i-0123456789abcdef0".to_string(),
                instance_type: "t3.medium".to_string(),
                state: "running".to_string(),
                availability_zone: "us-east-1a".to_string(),
                public_ip_address: Some("54.123.45.67".to_string()),
                private_ip_address: "10.0.1.100".to_string(),
                launch_time: "2024-08-20T10:30:00Z".to_string(),
                tags: tags(&[
                    ("Name", "web-server-prod"),
                    ("Environment", "production"),
                    ("Application", "frontend"),
                ]),
                security_groups: vec!["sg-web-prod".to_string(), "sg-ssh-access".to_string()],
                vpc_id: "vpc-12345678".to_string(),
                subnet_id: "subnet-12345678".to_string(),
            },
            Ec2Instance {
                instance_id: "i-0987654321fedcba0".to_string(),
                instance_type: "t3.large".to_string(),
                state: "running".to_string(),
                availability_zone: "us-east-1b".to_string(),
                public_ip_address: Some("54.123.45.68".to_string()),
                private_ip_address: "10.0.2.100".to_string(),
                launch_time: "2024-08-18T14:15:00Z".to_string(),
                tags: tags(&[
                    ("Name", "api-server-prod"),
                    ("Environment", "production"),
                    ("Application", "backend"),
                ]),
                security_groups: vec!["sg-api-prod".to_string(), "sg-ssh-access".to_string()],
                vpc_id: "vpc-12345678".to_string(),
                subnet_id: "subnet-87654321".to_string(),
            },
            Ec2Instance {
                instance_id: "i-0abcdef123456789".to_string(),
                instance_type: "t3.small".to_string(),
                state: "stopped".to_string(),
                availability_zone: "us-east-1a".to_string(),
                public_ip_address: None,
                private_ip_address: "10.0.1.101".to_string(),
                launch_time: "2024-08-15T09:00:00Z".to_string(),
                tags: tags(&[
                    ("Name", "staging-server"),
                    ("Environment", "staging"),
                    ("Application", "testing"),
                ]),
                security_groups: vec!["sg-staging".to_string(), "sg-ssh-access".to_string()],
                vpc_id: "vpc-12345678".to_string(),
                subnet_id: "subnet-12345678".to_string(),
            },
        ],
        rds_instances: vec![RdsInstance {
            db_instance_identifier: "prod-postgres-main".to_string(),
            db_instance_class: "db.t3.medium".to_string(),
            engine: "postgres".to_string(),
            engine_version: "15.4".to_string(),
            db_instance_status: "available".to_string(),
            availability_zone: "us-east-1a".to_string(),
            endpoint: RdsEndpoint {
                address: "prod-postgres-main.c123456789.us-east-1.rds.amazonaws.com".to_string(),
                port: 5432,
            },
            allocated_storage: 100,
            storage_type: "gp3".to_string(),
            multi_az: true,
            vpc_id: "vpc-12345678".to_string(),
            subnet_group_name: "prod-db-subnet-group".to_string(),
            security_groups: vec!["sg-database-prod".to_string()],
            backup_retention_period: 7,
            tags: tags(&[
                ("Name", "prod-postgres-main"),
                ("Environment", "production"),
                ("Application", "database"),
            ]),
        }],
    }
}

/// The mock security posture the security analyzer reports on.
///
/// Rendered into the prompt as pretty-printed JSON section by section, so
/// it stays an untyped value.
#[must_use]
pub fn sample_security_posture() -> serde_json::Value {
    serde_json::json!({
        "iam": {
            "policies": [
                {
                    "name": "WebAppInstanceProfile",
                    "arn": "arn:aws:iam::123456789012:role/WebAppInstanceProfile",
                    "type": "role",
                    "attachedPolicies": ["AmazonS3FullAccess", "AmazonRDSFullAccess"],
                    "inlinePolicies": [
                        {
                            "name": "CustomS3Access",
                            "document": {
                                "Version": "2012-10-17",
                                "Statement": [
                                    {"Effect": "Allow", "Action": "s3:*", "Resource": "*"}
                                ]
                            }
                        }
                    ],
                    "lastUsed": "2024-01-15T10:30:00Z",
                    "riskLevel": "HIGH"
                },
                {
                    "name": "DatabaseAccessRole",
                    "arn": "arn:aws:iam::123456789012:role/DatabaseAccessRole",
                    "type": "role",
                    "attachedPolicies": ["AmazonRDSDataFullAccess"],
                    "inlinePolicies": [],
                    "lastUsed": "2024-01-20T14:45:00Z",
                    "riskLevel": "MEDIUM"
                },
                {
                    "name": "AdminUser",
                    "arn": "arn:aws:iam::123456789012:user/AdminUser",
                    "type": "user",
                    "attachedPolicies": ["AdministratorAccess"],
                    "accessKeys": [
                        {
                            "accessKeyId": "AKIA...",
                            "status": "Active",
                            "lastUsed": "2024-01-10T09:15:00Z",
                            "lastRotated": "2023-06-15T12:00:00Z"
                        }
                    ],
                    "riskLevel": "CRITICAL"
                }
            ],
            "findings": [
                {
                    "type": "OVERPRIVILEGED_ROLE",
                    "severity": "HIGH",
                    "resource": "WebAppInstanceProfile",
                    "description": "Role has overly broad S3 permissions with wildcard resources"
                },
                {
                    "type": "STALE_ACCESS_KEY",
                    "severity": "MEDIUM",
                    "resource": "AdminUser",
                    "description": "Access key not rotated in 7+ months"
                },
                {
                    "type": "ADMIN_USER_ACTIVE",
                    "severity": "CRITICAL",
                    "resource": "AdminUser",
                    "description": "User with AdministratorAccess policy actively used"
                }
            ]
        },
        "secrets": {
            "codebaseFindings": [
                {
                    "file": "src/config/database.js",
                    "line": 15,
                    "type": "DATABASE_PASSWORD",
                    "severity": "CRITICAL",
                    "pattern": "password: 'mySecretPassword123'",
                    "recommendation": "Use AWS Secrets Manager or environment variables"
                },
                {
                    "file": "deploy/docker-compose.yml",
                    "line": 23,
                    "type": "API_KEY",
                    "severity": "HIGH",
                    "pattern": "STRIPE_SECRET_KEY=sk_live_...",
                    "recommendation": "Move to encrypted environment variables"
                },
                {
                    "file": "src/utils/aws-client.ts",
                    "line": 8,
                    "type": "AWS_CREDENTIALS",
                    "severity": "CRITICAL",
                    "pattern": "accessKeyId: 'AKIA...'",
                    "recommendation": "Use IAM roles instead of hardcoded credentials"
                }
            ],
            "awsSecretsManager": {
                "secrets": [
                    {
                        "name": "prod/database/credentials",
                        "arn": "arn:aws:secretsmanager:us-east-1:123456789012:secret:prod/database/credentials-AbCdEf",
                        "lastRotated": "2024-01-01T00:00:00Z",
                        "rotationEnabled": false,
                        "riskLevel": "MEDIUM"
                    },
                    {
                        "name": "prod/api/stripe-key",
                        "arn": "arn:aws:secretsmanager:us-east-1:123456789012:secret:prod/api/stripe-key-GhIjKl",
                        "lastRotated": "2023-12-15T00:00:00Z",
                        "rotationEnabled": true,
                        "riskLevel": "LOW"
                    }
                ]
            }
        },
        "containers": {
            "ecr": {
                "repositories": [
                    {
                        "name": "webapp-frontend",
                        "uri": "123456789012.dkr.ecr.us-east-1.amazonaws.com/webapp-frontend",
                        "imageCount": 15,
                        "vulnerabilityFindings": [
                            {"severity": "CRITICAL", "count": 2, "description": "Critical vulnerabilities in base image"},
                            {"severity": "HIGH", "count": 8, "description": "High severity package vulnerabilities"}
                        ]
                    },
                    {
                        "name": "webapp-backend",
                        "uri": "123456789012.dkr.ecr.us-east-1.amazonaws.com/webapp-backend",
                        "imageCount": 12,
                        "vulnerabilityFindings": [
                            {"severity": "MEDIUM", "count": 5, "description": "Medium severity vulnerabilities"}
                        ]
                    }
                ]
            },
            "ecs": {
                "services": [
                    {
                        "name": "webapp-frontend-service",
                        "taskDefinition": "webapp-frontend:15",
                        "securityIssues": [
                            {"type": "PRIVILEGED_CONTAINER", "severity": "HIGH", "description": "Container running with privileged access"},
                            {"type": "ROOT_USER", "severity": "MEDIUM", "description": "Container running as root user"}
                        ]
                    }
                ]
            },
            "dockerfiles": [
                {
                    "path": "Dockerfile",
                    "issues": [
                        {
                            "line": 1,
                            "type": "OUTDATED_BASE_IMAGE",
                            "severity": "HIGH",
                            "description": "Using outdated Node.js base image (node:14)",
                            "recommendation": "Update to node:18-alpine or later"
                        },
                        {
                            "line": 15,
                            "type": "RUNNING_AS_ROOT",
                            "severity": "MEDIUM",
                            "description": "No USER directive found, container runs as root",
                            "recommendation": "Add USER directive to run as non-root user"
                        }
                    ]
                }
            ]
        },
        "compliance": {
            "frameworks": ["SOC2", "PCI-DSS", "GDPR"],
            "findings": [
                {
                    "framework": "SOC2",
                    "control": "CC6.1",
                    "status": "NON_COMPLIANT",
                    "severity": "HIGH",
                    "description": "Logical access controls not properly implemented"
                },
                {
                    "framework": "PCI-DSS",
                    "control": "3.4",
                    "status": "NON_COMPLIANT",
                    "severity": "CRITICAL",
                    "description": "Primary account number (PAN) not properly protected"
                }
            ]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_shape() {
        let resources = sample_cloud_resources();
        assert_eq!(resources.region, "us-east-1");
        assert_eq!(resources.ec2_instances.len(), 3);
        assert_eq!(resources.rds_instances.len(), 1);
        assert_eq!(
            resources.ec2_instances[2].state, "stopped",
            "staging server is stopped"
        );
        assert!(resources.ec2_instances[2].public_ip_address.is_none());
    }

    #[test]
    fn test_inventory_serializes_camel_case() {
        let value = serde_json::to_value(sample_cloud_resources()).unwrap();
        assert!(value["ec2Instances"][0]["instanceId"].is_string());
        assert!(value["rdsInstances"][0]["dbInstanceIdentifier"].is_string());
        assert_eq!(value["accountId"], "123456789012");
    }

    #[test]
    fn test_inventory_roundtrip() {
        let json = serde_json::to_string(&sample_cloud_resources()).unwrap();
        let parsed: CloudResources = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ec2_instances[0].instance_id, "i-0123456789abcdef0");
    }

    #[test]
    fn test_security_posture_sections() {
        let posture = sample_security_posture();
        for section in ["iam", "secrets", "containers", "compliance"] {
            assert!(posture.get(section).is_some(), "missing {section}");
        }
        assert_eq!(posture["iam"]["policies"].as_array().unwrap().len(), 3);
    }
}
