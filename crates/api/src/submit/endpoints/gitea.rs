//! Gitea push-webhook adapter, mounted at `/api/submit/gitea`.
//!
//! Maps a push event onto a job submission for the configured repository:
//! the commit becomes the entity, the short ref name becomes a `ref`
//! collection. Requests are authenticated with an HMAC-SHA256 signature
//! over the body. When `apiBaseUrl` is configured, entity status changes
//! are pushed back as commit statuses (the endpoint is API-compatible with
//! GitHub's commit status API).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use aura_core::rollup::entity_rollup;
use aura_core::signature::verify_webhook_signature;
use aura_db::models::entity::Entity;
use aura_db::models::project::Project;
use aura_db::repositories::{JobRepo, ProjectRepo};
use aura_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::submit::Submission;

/// Signature header sent by Gitea (and GitHub-compatible forges).
const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// HTTP timeout for one status-back request.
const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Job template applied to every push of a configured repository.
#[derive(Debug, Deserialize)]
pub struct GenericJobConfig {
    pub project: String,
    pub name: String,
    #[serde(default)]
    pub cmd: String,
    #[serde(default)]
    pub env: String,
    #[serde(default)]
    pub tag: String,
}

/// Per-repository configuration under `repos.<owner/name>`.
#[derive(Debug, Deserialize)]
pub struct GiteaRepoConfig {
    #[serde(flatten)]
    pub job: GenericJobConfig,

    /// `Authorization` header value for status-back requests.
    #[serde(default)]
    pub authorization: String,

    /// Webhook signing secret. Empty secret plus empty signature is
    /// accepted (testing only).
    #[serde(default)]
    pub secret: String,
}

#[derive(Debug, Deserialize)]
struct GiteaConfig {
    #[serde(default)]
    repos: HashMap<String, GiteaRepoConfig>,

    /// Forge API root for status-back, e.g. `https://gitea.example/api/v1`.
    /// Empty disables status-back.
    #[serde(default, rename = "apiBaseUrl")]
    api_base_url: String,
}

// ---------------------------------------------------------------------------
// Push payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PushEvent {
    #[serde(default, rename = "ref")]
    git_ref: String,
    #[serde(default)]
    after: String,
    repository: PushRepository,
}

#[derive(Debug, Deserialize)]
struct PushRepository {
    full_name: String,
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

pub struct GiteaEndpoint {
    /// The controller's own public base URL, for target links in statuses.
    controller_base_url: String,
    config: GiteaConfig,
    client: reqwest::Client,
}

impl GiteaEndpoint {
    pub fn new(
        controller_base_url: String,
        raw: serde_json::Value,
    ) -> Result<Self, super::ConfigError> {
        let config: GiteaConfig = serde_json::from_value(raw)?;
        let client = reqwest::Client::builder()
            .timeout(STATUS_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Ok(Self {
            controller_base_url,
            config,
            client,
        })
    }
}

#[async_trait]
impl super::SubmitEndpoint for GiteaEndpoint {
    async fn parse_request(
        &self,
        pool: &DbPool,
        headers: &HeaderMap,
        body: &[u8],
    ) -> AppResult<Submission> {
        let event: PushEvent = serde_json::from_slice(body)
            .map_err(|_| AppError::BadRequest("unable to parse json object".into()))?;

        let repo = self
            .config
            .repos
            .get(&event.repository.full_name)
            .ok_or_else(|| AppError::BadRequest("repository not configured".into()))?;

        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing signature".into()))?;
        if !verify_webhook_signature(signature, &repo.secret, body) {
            return Err(AppError::Unauthorized("invalid signature".into()));
        }

        let project = ProjectRepo::find_by_slug(pool, &repo.job.project)
            .await?
            .ok_or_else(|| AppError::BadRequest("unknown project".into()))?;

        // "refs/heads/main" -> "main"; tags reduce the same way.
        let ref_name = event
            .git_ref
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        Ok(Submission {
            project_id: project.id,
            entity_key: "commit".into(),
            entity_val: event.after,
            name: repo.job.name.clone(),
            cmd: repo.job.cmd.clone(),
            env: repo.job.env.clone(),
            tag: repo.job.tag.clone(),
            collections: HashMap::from([("ref".to_string(), ref_name)]),
            preceding_jobs: Vec::new(),
            earliest_start: None,
        })
    }

    async fn push_entity_status(&self, pool: &DbPool, project: &Project, entity: &Entity) {
        if self.config.api_base_url.is_empty() || entity.key != "commit" {
            return;
        }
        let Some((repo_name, repo)) = self
            .config
            .repos
            .iter()
            .find(|(_, repo)| repo.job.project == project.slug)
        else {
            return;
        };

        let jobs = match JobRepo::list_for_entity(pool, entity.id).await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!(entity_id = entity.id, error = %e, "Failed to load jobs for status push");
                return;
            }
        };
        let statuses: Vec<_> = jobs.iter().filter_map(|job| job.status()).collect();
        let rollup = entity_rollup(&statuses);

        let status = CommitStatus {
            context: "Aura",
            description: rollup.description,
            state: rollup.state,
            target_url: format!(
                "{}/p/{}/{}/{}",
                self.controller_base_url, project.slug, entity.key, entity.val
            ),
        };
        let url = format!(
            "{}/repos/{}/statuses/{}",
            self.config.api_base_url, repo_name, entity.val
        );

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", &repo.authorization)
            .json(&status);
        if self.config.api_base_url == "https://api.github.com" {
            request = request
                .header("Accept", "application/vnd.github+json")
                .header("X-GitHub-Api-Version", "2022-11-28");
        }

        // Status-back is best-effort and must never block the core path.
        match request.send().await {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(
                    url,
                    status = response.status().as_u16(),
                    "Commit status push rejected",
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(url, error = %e, "Commit status push failed");
            }
        }
    }
}

/// Commit status payload, compatible with Gitea's and GitHub's APIs.
#[derive(Debug, Serialize)]
struct CommitStatus {
    /// Label of who is providing this status.
    context: &'static str,
    /// High-level summary.
    description: String,
    /// "pending", "success", "error", or "failure".
    state: &'static str,
    /// Full URL to the build output.
    target_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_config_parses_with_flattened_job_template() {
        let raw = serde_json::json!({
            "repos": {
                "octo/widgets": {
                    "project": "widgets",
                    "name": "build",
                    "cmd": "make",
                    "tag": "linux",
                    "secret": "s3cret",
                    "authorization": "token abc"
                }
            },
            "apiBaseUrl": "https://gitea.example/api/v1"
        });
        let config: GiteaConfig = serde_json::from_value(raw).unwrap();
        let repo = &config.repos["octo/widgets"];
        assert_eq!(repo.job.project, "widgets");
        assert_eq!(repo.job.env, "");
        assert_eq!(repo.secret, "s3cret");
        assert_eq!(config.api_base_url, "https://gitea.example/api/v1");
    }

    #[test]
    fn push_event_parses_the_fields_we_use() {
        let raw = serde_json::json!({
            "ref": "refs/heads/main",
            "after": "0a1b2c",
            "repository": {"full_name": "octo/widgets"},
            "commits": [],
        });
        let event: PushEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.git_ref, "refs/heads/main");
        assert_eq!(event.after, "0a1b2c");
        assert_eq!(event.repository.full_name, "octo/widgets");
    }
}
