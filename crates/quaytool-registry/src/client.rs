//! Quay API client for registry administration.
//!
//! This module provides the request/response layer for the registry
//! control-plane API. It holds no state beyond its configuration and the
//! connection pool; every method maps to exactly one HTTP call.

use quaytool_core::{
    NewRepository, NewTeam, Prototype, PrototypeList, Repository, RepositoryPage, RobotList,
    TagList, TeamMembers, Visibility,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use crate::config::{RegistryAuth, RegistryConfig};
use crate::error::RegistryError;
use crate::paginator::Paginator;

/// Description attached to robots created by this client.
pub const ROBOT_DESCRIPTION: &str = "Robot created by quay tool";

/// Client for the Quay control-plane API.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    config: RegistryConfig,
    base: Url,
    http: reqwest::Client,
}

impl RegistryClient {
    /// Creates a new registry client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is invalid or the HTTP client cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use quaytool_registry::{RegistryAuth, RegistryClient, RegistryConfig};
    ///
    /// let config = RegistryConfig::new("https://quay.example.com/api/v1")
    ///     .with_auth(RegistryAuth::bearer("token"));
    /// let client = RegistryClient::new(config)?;
    /// # Ok::<(), quaytool_registry::RegistryError>(())
    /// ```
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let base = config.base_url()?;
        let http = Self::build_http_client(&config)?;

        Ok(Self { config, base, http })
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Returns a paginator over namespace listings.
    #[must_use]
    pub const fn paginator(&self) -> Paginator<'_> {
        Paginator::new(self)
    }

    /// Lists every repository in `namespace`, following continuation tokens.
    ///
    /// # Errors
    ///
    /// See [`Paginator::list_repositories`].
    pub async fn list_repositories(
        &self,
        namespace: &str,
    ) -> Result<Vec<Repository>, RegistryError> {
        self.paginator().list_repositories(namespace).await
    }

    // ------------------------------------------------------------------
    // Repositories
    // ------------------------------------------------------------------

    /// Fetches one page of the namespace repository listing.
    ///
    /// Returns `None` when the registry answers with a JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or an undecodable body.
    pub async fn repository_page(
        &self,
        namespace: &str,
        next_page: Option<&str>,
    ) -> Result<Option<RepositoryPage>, RegistryError> {
        let mut url = self.endpoint(&["repository"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("namespace", namespace);
            if let Some(token) = next_page {
                query.append_pair("next_page", token);
            }
        }

        let response = self.execute(self.request(Method::GET, url)?).await?;
        Self::read_json(response).await
    }

    /// Lists repositories across the registry, optionally narrowed.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn search_repositories(
        &self,
        namespace: Option<&str>,
        public_only: bool,
    ) -> Result<Value, RegistryError> {
        let mut url = self.endpoint(&["repository"])?;
        {
            let mut query = url.query_pairs_mut();
            if public_only {
                query.append_pair("public", "true");
            }
            if let Some(namespace) = namespace {
                query.append_pair("namespace", namespace);
            }
        }

        let response = self.execute(self.request(Method::GET, url)?).await?;
        Self::read_json(response).await
    }

    /// Changes the visibility of a repository.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn change_visibility(
        &self,
        repository: &Repository,
        visibility: Visibility,
    ) -> Result<(), RegistryError> {
        let url = self.endpoint(&[
            "repository",
            repository.namespace_or_root(),
            &repository.name,
            "changevisibility",
        ])?;
        let body = json!({ "visibility": visibility });

        self.execute(self.request(Method::POST, url)?.json(&body))
            .await
            .map(drop)
    }

    /// Grants `user` a role on `namespace/repository`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn grant_user_permission(
        &self,
        namespace: &str,
        repository: &str,
        user: &str,
        role: &str,
    ) -> Result<(), RegistryError> {
        let url = self.endpoint(&[
            "repository",
            namespace,
            repository,
            "permissions",
            "user",
            user,
        ])?;
        let body = json!({ "role": role });

        self.execute(self.request(Method::PUT, url)?.json(&body))
            .await
            .map(drop)
    }

    /// Lists the tags of `namespace/repository`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or an undecodable body.
    pub async fn list_tags(
        &self,
        namespace: &str,
        repository: &str,
    ) -> Result<TagList, RegistryError> {
        let url = self.endpoint(&["repository", namespace, repository, "tag"])?;
        let response = self.execute(self.request(Method::GET, url)?).await?;
        Self::read_json(response).await
    }

    /// Sets (or clears, with `None`) the expiration of a tag.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn set_tag_expiration(
        &self,
        namespace: &str,
        repository: &str,
        tag: &str,
        expiration: Option<i64>,
    ) -> Result<(), RegistryError> {
        let url = self.endpoint(&["repository", namespace, repository, "tag", tag])?;
        let body = json!({ "expiration": expiration });

        self.execute(self.request(Method::PUT, url)?.json(&body))
            .await
            .map(drop)
    }

    /// Points `tag` back at `manifest_digest`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn restore_tag(
        &self,
        namespace: &str,
        repository: &str,
        tag: &str,
        manifest_digest: &str,
    ) -> Result<(), RegistryError> {
        let url = self.endpoint(&["repository", namespace, repository, "tag", tag, "restore"])?;
        let body = json!({ "manifest_digest": manifest_digest });

        self.execute(self.request(Method::POST, url)?.json(&body))
            .await
            .map(drop)
    }

    /// Lists the images of a repository, optionally inside `namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or an undecodable body.
    pub async fn list_images(
        &self,
        namespace: Option<&str>,
        repository: &str,
    ) -> Result<Value, RegistryError> {
        let url = match namespace {
            Some(namespace) => self.endpoint(&["repository", namespace, repository, "image", ""])?,
            None => self.endpoint(&["repository", repository, "image", ""])?,
        };
        let response = self.execute(self.request(Method::GET, url)?).await?;
        Self::read_json(response).await
    }

    /// Creates a repository.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn create_repository(&self, repository: &NewRepository) -> Result<(), RegistryError> {
        let url = self.endpoint(&["repository"])?;
        self.execute(self.request(Method::POST, url)?.json(repository))
            .await
            .map(drop)
    }

    // ------------------------------------------------------------------
    // Organizations
    // ------------------------------------------------------------------

    /// Looks up an organization; `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or any non-2xx status other than 404.
    pub async fn organization(&self, organization: &str) -> Result<Option<Value>, RegistryError> {
        let url = self.endpoint(&["organization", organization])?;
        match self.probe(self.request(Method::GET, url)?).await? {
            Some(response) => Self::read_json(response).await.map(Some),
            None => Ok(None),
        }
    }

    /// Creates an organization.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn create_organization(&self, organization: &str) -> Result<(), RegistryError> {
        let url = self.endpoint(&["organization", ""])?;
        let body = json!({ "name": organization });

        self.execute(self.request(Method::POST, url)?.json(&body))
            .await
            .map(drop)
    }

    // ------------------------------------------------------------------
    // Robots
    // ------------------------------------------------------------------

    /// Lists the robots of an organization, with tokens and permissions.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or an undecodable body.
    pub async fn list_robots(&self, organization: &str) -> Result<RobotList, RegistryError> {
        let mut url = self.endpoint(&["organization", organization, "robots"])?;
        url.query_pairs_mut()
            .append_pair("token", "true")
            .append_pair("permissions", "true");

        let response = self.execute(self.request(Method::GET, url)?).await?;
        Self::read_json(response).await
    }

    /// Creates a robot and returns the registry's description of it.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or an undecodable body.
    pub async fn create_robot(
        &self,
        organization: &str,
        robot: &str,
    ) -> Result<Value, RegistryError> {
        let url = self.endpoint(&["organization", organization, "robots", robot])?;
        let body = json!({
            "unstructured_metadata": {},
            "description": ROBOT_DESCRIPTION,
        });

        let response = self
            .execute(self.request(Method::PUT, url)?.json(&body))
            .await?;
        Self::read_json(response).await
    }

    /// Regenerates a robot token and returns the updated robot.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or an undecodable body.
    pub async fn regenerate_robot_token(
        &self,
        organization: &str,
        robot: &str,
    ) -> Result<Value, RegistryError> {
        let url = self.endpoint(&["organization", organization, "robots", robot, "regenerate"])?;

        let response = self
            .execute(self.request(Method::PUT, url)?.json(&json!({})))
            .await?;
        Self::read_json(response).await
    }

    // ------------------------------------------------------------------
    // Teams
    // ------------------------------------------------------------------

    /// Looks up the members of a team; `None` when the team does not exist
    /// or is not visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or any non-2xx status other than 404.
    pub async fn team_members(
        &self,
        organization: &str,
        team: &str,
    ) -> Result<Option<TeamMembers>, RegistryError> {
        let url = self.endpoint(&["organization", organization, "team", team, "members"])?;
        match self.probe(self.request(Method::GET, url)?).await? {
            Some(response) => Self::read_json(response).await.map(Some),
            None => Ok(None),
        }
    }

    /// Creates (or updates) a team.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn create_team(
        &self,
        organization: &str,
        team: &str,
        spec: &NewTeam,
    ) -> Result<(), RegistryError> {
        let url = self.endpoint(&["organization", organization, "team", team])?;
        self.execute(self.request(Method::PUT, url)?.json(spec))
            .await
            .map(drop)
    }

    /// Adds `user` to a team.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn add_team_member(
        &self,
        organization: &str,
        team: &str,
        user: &str,
    ) -> Result<(), RegistryError> {
        let url = self.endpoint(&["organization", organization, "team", team, "members", user])?;
        self.execute(self.request(Method::PUT, url)?).await.map(drop)
    }

    // ------------------------------------------------------------------
    // Prototypes
    // ------------------------------------------------------------------

    /// Lists the default-permission prototypes of an organization.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or an undecodable body.
    pub async fn list_prototypes(
        &self,
        organization: &str,
    ) -> Result<PrototypeList, RegistryError> {
        let url = self.endpoint(&["organization", organization, "prototypes"])?;
        let response = self.execute(self.request(Method::GET, url)?).await?;
        Self::read_json(response).await
    }

    /// Creates a default-permission prototype.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn create_prototype(
        &self,
        organization: &str,
        prototype: &Prototype,
    ) -> Result<(), RegistryError> {
        let url = self.endpoint(&["organization", organization, "prototypes"])?;
        self.execute(self.request(Method::POST, url)?.json(prototype))
            .await
            .map(drop)
    }

    // ------------------------------------------------------------------
    // Discovery
    // ------------------------------------------------------------------

    /// Fetches the API discovery document. Sent without credentials.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or an undecodable body.
    pub async fn discovery(&self) -> Result<Value, RegistryError> {
        let url = self.endpoint(&["discovery"])?;
        let response = self.execute(self.http.get(url)).await?;
        Self::read_json(response).await
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    /// Appends path segments to the API base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RegistryError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| RegistryError::InvalidUrl {
                url: self.config.url.clone(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Starts an authenticated request.
    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, RegistryError> {
        Ok(self.http.request(method, url).headers(self.auth_headers()?))
    }

    /// Sends a request and rejects any non-2xx status.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, RegistryError> {
        let response = request.send().await?;
        tracing::debug!(
            status = response.status().as_u16(),
            url = %response.url(),
            "registry responded"
        );

        if response.status().is_success() {
            return Ok(response);
        }
        Err(Self::status_error(response).await)
    }

    /// Sends an existence probe: 404 maps to `None`, other non-2xx to an error.
    async fn probe(&self, request: RequestBuilder) -> Result<Option<Response>, RegistryError> {
        match self.execute(request).await {
            Ok(response) => Ok(Some(response)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn status_error(response: Response) -> RegistryError {
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();

        RegistryError::HttpError {
            status: status.as_u16(),
            url,
            message: if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string()
            } else {
                body
            },
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RegistryError> {
        if response.status() == StatusCode::NO_CONTENT {
            return serde_json::from_value(Value::Null).map_err(Into::into);
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    /// Builds the HTTP client with proper configuration.
    fn build_http_client(config: &RegistryConfig) -> Result<reqwest::Client, RegistryError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent);

        if !config.verify_tls {
            tracing::warn!(url = %config.url, "TLS certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder.build().map_err(|e| RegistryError::ConnectionFailed {
            url: config.url.clone(),
            source: e,
        })
    }

    /// Creates authentication headers based on configuration.
    fn auth_headers(&self) -> Result<HeaderMap, RegistryError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match &self.config.auth {
            RegistryAuth::None => {}
            RegistryAuth::Bearer { token } => {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    RegistryError::AuthenticationFailed {
                        message: "Invalid token".to_string(),
                    }
                })?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }

        Ok(headers)
    }
}
