//! Batch actions over repositories and organization resources.

use quaytool_core::{
    NewRepository, PrototypeList, Repository, RepositorySelector, RobotList, TeamRole, Visibility,
};
use quaytool_registry::RegistryClient;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ReconcileError, Result};
use crate::outcome::{Action, BatchReport, Outcome};
use crate::provision::{
    provision, MembershipSpec, OrganizationSpec, PrototypeSpec, RobotSpec, TeamSpec,
};
use crate::tags::{ExpirationChange, TagAction};

/// Write role granted by [`Reconciler::grant_write_permission`].
const WRITE_ROLE: &str = "write";

/// Image listing of one repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageListing {
    /// Repository name as requested.
    pub repository: String,
    /// Images as reported by the registry.
    pub images: Value,
}

/// Runs reconciliation actions against one registry.
///
/// Calls are issued strictly one after another; nothing is retried.
#[derive(Debug, Clone)]
pub struct Reconciler {
    client: RegistryClient,
}

impl Reconciler {
    /// Creates a reconciler over `client`.
    pub const fn new(client: RegistryClient) -> Self {
        Self { client }
    }

    /// Returns the underlying registry client.
    pub const fn client(&self) -> &RegistryClient {
        &self.client
    }

    /// Lists `namespace` and narrows it with `selector`.
    pub async fn working_set(
        &self,
        namespace: &str,
        selector: &RepositorySelector,
    ) -> Result<Vec<Repository>> {
        let listed = self.client.list_repositories(namespace).await?;
        let selected = selector.select(&listed);

        tracing::info!(
            namespace,
            listed = listed.len(),
            selected = selected.len(),
            "resolved working set"
        );
        Ok(selected)
    }

    /// Sets the visibility of every repository, stopping at the first failure.
    ///
    /// Repositories changed before the failure stay changed; the error
    /// carries the report of everything processed so far.
    pub async fn set_visibility(
        &self,
        repositories: &[Repository],
        visibility: Visibility,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::new(Action::SetVisibility);

        for repo in repositories {
            match self.client.change_visibility(repo, visibility).await {
                Ok(()) => {
                    tracing::info!(
                        run_id = %report.run_id,
                        repository = %repo,
                        %visibility,
                        "changed repository visibility"
                    );
                    report.record(repo.path(), Outcome::applied());
                }
                Err(source) => {
                    tracing::error!(
                        run_id = %report.run_id,
                        repository = %repo,
                        error = %source,
                        "visibility change failed, halting batch"
                    );
                    report.record(repo.path(), Outcome::failed(&source));
                    return Err(ReconcileError::BatchHalted {
                        operation: Action::SetVisibility.as_str(),
                        target: repo.path(),
                        applied: report.applied,
                        report: Box::new(report),
                        source,
                    });
                }
            }
        }

        Ok(report)
    }

    /// Grants `user` write on every repository of `organization`.
    ///
    /// Failures are recorded per repository and the batch continues.
    pub async fn grant_write_permission(
        &self,
        repositories: &[Repository],
        organization: &str,
        user: &str,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::new(Action::GrantWritePermission);

        for repo in repositories {
            let outcome = match self
                .client
                .grant_user_permission(organization, &repo.name, user, WRITE_ROLE)
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        run_id = %report.run_id,
                        repository = %repo,
                        user,
                        "granted write permission"
                    );
                    Outcome::applied()
                }
                Err(e) => {
                    tracing::warn!(
                        run_id = %report.run_id,
                        repository = %repo,
                        user,
                        error = %e,
                        "permission grant failed"
                    );
                    Outcome::failed(e)
                }
            };
            report.record(format!("{organization}/{}", repo.name), outcome);
        }

        Ok(report)
    }

    /// Applies `action` to `tag` in every repository of `organization`.
    ///
    /// Repositories without the tag are recorded as skipped and reported
    /// together once the batch is done.
    pub async fn apply_tag_action(
        &self,
        repositories: &[Repository],
        organization: &str,
        tag: &str,
        action: TagAction,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::new(action.action());

        for repo in repositories {
            let target = format!("{organization}/{}", repo.name);
            let outcome = self.tag_outcome(organization, &repo.name, tag, action).await;

            match &outcome {
                Outcome::Applied { .. } => tracing::info!(
                    run_id = %report.run_id,
                    repository = %target,
                    tag,
                    action = %action.action(),
                    "updated tag"
                ),
                Outcome::Failed { message } => tracing::warn!(
                    run_id = %report.run_id,
                    repository = %target,
                    tag,
                    error = %message,
                    "tag update failed"
                ),
                _ => {}
            }
            report.record(target, outcome);
        }

        let skipped = report.skipped_targets();
        if !skipped.is_empty() {
            tracing::info!(
                run_id = %report.run_id,
                tag,
                repositories = ?skipped,
                "tag not found in some repositories"
            );
        }

        Ok(report)
    }

    async fn tag_outcome(
        &self,
        organization: &str,
        repository: &str,
        tag: &str,
        action: TagAction,
    ) -> Outcome {
        let tags = match self.client.list_tags(organization, repository).await {
            Ok(tags) => tags,
            Err(e) => return Outcome::failed(e),
        };
        let Some(found) = tags.find(tag) else {
            return Outcome::skipped("tag not found");
        };

        let result = match action {
            TagAction::Expire(ExpirationChange::Keep) => {
                return Outcome::unchanged("negative expiration, nothing written");
            }
            TagAction::Expire(ExpirationChange::Clear) => {
                self.client
                    .set_tag_expiration(organization, repository, tag, None)
                    .await
            }
            TagAction::Expire(ExpirationChange::Set(at)) => {
                self.client
                    .set_tag_expiration(organization, repository, tag, Some(at))
                    .await
            }
            TagAction::Restore => {
                let Some(digest) = found.manifest_digest.as_deref() else {
                    return Outcome::failed("tag has no manifest digest");
                };
                self.client
                    .restore_tag(organization, repository, tag, digest)
                    .await
            }
        };

        result.map_or_else(Outcome::failed, |()| Outcome::applied())
    }

    /// Creates public image repositories by name. Nothing is probed first.
    pub async fn create_repositories(
        &self,
        organization: &str,
        names: &[String],
    ) -> Result<BatchReport> {
        let mut report = BatchReport::new(Action::CreateRepository);

        for name in names {
            let target = format!("{organization}/{name}");
            let outcome = match self
                .client
                .create_repository(&NewRepository::public_image(organization, name.as_str()))
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        run_id = %report.run_id,
                        repository = %target,
                        "created repository"
                    );
                    Outcome::applied()
                }
                Err(e) => {
                    tracing::warn!(
                        run_id = %report.run_id,
                        repository = %target,
                        error = %e,
                        "repository creation failed"
                    );
                    Outcome::failed(e)
                }
            };
            report.record(target, outcome);
        }

        Ok(report)
    }

    /// Lists the images of each named repository.
    pub async fn list_images(
        &self,
        organization: Option<&str>,
        names: &[String],
    ) -> Result<Vec<ImageListing>> {
        let mut listings = Vec::with_capacity(names.len());
        for name in names {
            let images = self.client.list_images(organization, name).await?;
            listings.push(ImageListing {
                repository: name.clone(),
                images,
            });
        }
        Ok(listings)
    }

    /// Creates an organization unless it exists.
    pub async fn create_organization(&self, organization: &str) -> BatchReport {
        let spec = OrganizationSpec {
            name: organization.to_string(),
        };
        provision(&self.client, &spec).await
    }

    /// Creates a robot unless `<organization>+<robot>` exists.
    pub async fn create_robot(&self, organization: &str, robot: &str) -> BatchReport {
        let spec = RobotSpec {
            organization: organization.to_string(),
            name: robot.to_string(),
        };
        provision(&self.client, &spec).await
    }

    /// Creates a team unless it exists.
    pub async fn create_team(&self, organization: &str, team: &str, role: TeamRole) -> BatchReport {
        let spec = TeamSpec {
            organization: organization.to_string(),
            name: team.to_string(),
            role,
        };
        provision(&self.client, &spec).await
    }

    /// Creates a write-role prototype unless one already delegates to the
    /// user or team.
    pub async fn create_prototype(
        &self,
        organization: &str,
        user: Option<&str>,
        team: Option<&str>,
    ) -> Result<BatchReport> {
        if user.is_none() && team.is_none() {
            return Err(ReconcileError::precondition(
                Action::CreatePrototype.as_str(),
                "--user or --team",
            ));
        }

        let spec = PrototypeSpec {
            organization: organization.to_string(),
            user: user.map(ToOwned::to_owned),
            team: team.map(ToOwned::to_owned),
        };
        Ok(provision(&self.client, &spec).await)
    }

    /// Adds `user` to `team` unless already a member.
    pub async fn add_team_member(&self, organization: &str, team: &str, user: &str) -> BatchReport {
        let spec = MembershipSpec {
            organization: organization.to_string(),
            team: team.to_string(),
            user: user.to_string(),
        };
        provision(&self.client, &spec).await
    }

    /// Regenerates a robot token.
    pub async fn regenerate_robot_token(&self, organization: &str, robot: &str) -> Result<Value> {
        let robot_info = self.client.regenerate_robot_token(organization, robot).await?;
        tracing::info!(organization, robot, "regenerated robot token");
        Ok(robot_info)
    }

    /// Lists robots with their tokens and permissions.
    pub async fn list_robots(&self, organization: &str) -> Result<RobotList> {
        Ok(self.client.list_robots(organization).await?)
    }

    /// Lists default-permission prototypes.
    pub async fn list_prototypes(&self, organization: &str) -> Result<PrototypeList> {
        Ok(self.client.list_prototypes(organization).await?)
    }

    /// Lists repositories registry-wide, optionally narrowed.
    pub async fn list_repositories_global(
        &self,
        organization: Option<&str>,
        public_only: bool,
    ) -> Result<Value> {
        Ok(self
            .client
            .search_repositories(organization, public_only)
            .await?)
    }

    /// Fetches the API discovery document.
    pub async fn discovery_info(&self) -> Result<Value> {
        Ok(self.client.discovery().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaytool_registry::{RegistryAuth, RegistryConfig};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reconciler_for(server: &MockServer) -> Reconciler {
        let config = RegistryConfig::new(format!("{}/api/v1", server.uri()))
            .with_auth(RegistryAuth::bearer("secret"));
        Reconciler::new(RegistryClient::new(config).unwrap())
    }

    fn repos(names: &[&str]) -> Vec<Repository> {
        names.iter().map(|n| Repository::new("acme", *n)).collect()
    }

    #[tokio::test]
    async fn test_grant_write_continues_past_failures() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/repository/acme/a/permissions/user/alice"))
            .and(body_json(json!({"role": "write"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/repository/acme/b/permissions/user/alice"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad user"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/repository/acme/c/permissions/user/alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let report = reconciler_for(&server)
            .grant_write_permission(&repos(&["a", "b", "c"]), "acme", "alice")
            .await
            .unwrap();

        assert_eq!(report.applied, 2);
        assert_eq!(report.failed, 1);
        assert!(report.outcome_for("acme/b").unwrap().is_failure());
    }

    #[tokio::test]
    async fn test_restore_without_digest_fails_item() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/repository/acme/a/tag"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"tags": [{"name": "latest"}]})),
            )
            .mount(&server)
            .await;

        let report = reconciler_for(&server)
            .apply_tag_action(&repos(&["a"]), "acme", "latest", TagAction::Restore)
            .await
            .unwrap();

        assert_eq!(report.action, Action::RestoreTag);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_restore_posts_current_digest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/repository/acme/a/tag"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tags": [{"name": "latest", "manifest_digest": "sha256:abc"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/repository/acme/a/tag/latest/restore"))
            .and(body_json(json!({"manifest_digest": "sha256:abc"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let report = reconciler_for(&server)
            .apply_tag_action(&repos(&["a"]), "acme", "latest", TagAction::Restore)
            .await
            .unwrap();

        assert_eq!(report.applied, 1);
    }

    #[tokio::test]
    async fn test_create_repositories_records_each() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/repository"))
            .and(body_json(json!({
                "repository": "web",
                "visibility": "public",
                "namespace": "acme",
                "description": "None",
                "repo_kind": "image"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/repository"))
            .respond_with(ResponseTemplate::new(400).set_body_string("exists"))
            .mount(&server)
            .await;

        let names = vec!["web".to_string(), "api".to_string()];
        let report = reconciler_for(&server)
            .create_repositories("acme", &names)
            .await
            .unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.items[0].target, "acme/web");
    }

    #[tokio::test]
    async fn test_create_prototype_requires_delegate() {
        let server = MockServer::start().await;
        let err = reconciler_for(&server)
            .create_prototype("acme", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::Precondition { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_images_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/repository/acme/web/image/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"images": [1]})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/repository/acme/api/image/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"images": []})))
            .mount(&server)
            .await;

        let names = vec!["web".to_string(), "api".to_string()];
        let listings = reconciler_for(&server)
            .list_images(Some("acme"), &names)
            .await
            .unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].repository, "web");
        assert_eq!(listings[0].images, json!({"images": [1]}));
    }
}
