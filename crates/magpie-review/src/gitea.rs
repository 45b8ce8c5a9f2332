use magpie_core::{Change, ChangeStatus, MagpieError};
use serde_json::Value;
use tracing::error;

/// Handler for a single Gitea pull-request webhook event.
///
/// Wraps the webhook payload together with the credentials needed to
/// call back into the Gitea REST API. Each operation issues at most one
/// request.
///
/// Two layers are exposed: `fetch_changes` / `fetch_commits` /
/// `post_comment` return typed errors, while `changes` / `commits` /
/// `add_notes` are the fail-soft boundary the review pipeline uses:
/// they log the failure and degrade to an empty result or `false` so a
/// single failed call does not abort the whole review.
///
/// # Examples
///
/// ```
/// use magpie_review::gitea::PullRequestHandler;
/// use serde_json::json;
///
/// let payload = json!({
///     "action": "opened",
///     "repository": { "name": "magpie", "owner": { "username": "octo" } },
///     "pull_request": { "number": 7 },
/// });
/// let handler = PullRequestHandler::new(payload, "t0ken", "https://git.example.com/").unwrap();
/// assert_eq!(handler.action(), "opened");
/// assert_eq!(handler.base_url(), "https://git.example.com");
/// ```
pub struct PullRequestHandler {
    payload: Value,
    token: String,
    base_url: String,
    http: reqwest::Client,
}

impl PullRequestHandler {
    /// Create a handler from a webhook payload, API token, and instance
    /// base URL. Trailing slashes on the URL are stripped.
    ///
    /// # Errors
    ///
    /// Returns [`MagpieError::Config`] when the base URL is empty.
    pub fn new(
        payload: Value,
        token: impl Into<String>,
        base_url: &str,
    ) -> Result<Self, MagpieError> {
        Ok(Self {
            payload,
            token: token.into(),
            base_url: normalize_base_url(base_url)?,
            http: reqwest::Client::new(),
        })
    }

    /// The webhook `action` field (`"opened"`, `"synchronized"`, ...),
    /// or `""` when absent.
    pub fn action(&self) -> &str {
        self.payload
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Normalized base URL of the Gitea instance.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn number(&self) -> Result<u64, MagpieError> {
        self.payload
            .pointer("/pull_request/number")
            .and_then(Value::as_u64)
            .ok_or(MagpieError::MissingField("pull_request.number"))
    }

    /// Fetch the pull request's file diff list.
    ///
    /// `GET /api/v1/repos/{owner}/{repo}/pulls/{number}/files`
    ///
    /// # Errors
    ///
    /// [`MagpieError::MissingField`] when the payload lacks owner, repo,
    /// or number; [`MagpieError::Transport`] / [`MagpieError::Status`]
    /// when the request fails; [`MagpieError::Serialization`] when the
    /// response is not a file list.
    pub async fn fetch_changes(&self) -> Result<Vec<Change>, MagpieError> {
        let url = format!(
            "{}/api/v1/repos/{}/{}/pulls/{}/files",
            self.base_url,
            owner(&self.payload)?,
            repo(&self.payload)?,
            self.number()?
        );
        let body = api_get(&self.http, &self.token, &url).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Fail-soft variant of [`fetch_changes`](Self::fetch_changes):
    /// failures are logged and yield an empty list.
    pub async fn changes(&self) -> Vec<Change> {
        match self.fetch_changes().await {
            Ok(changes) => changes,
            Err(err) => {
                error!("failed to fetch pull request changes: {err}");
                Vec::new()
            }
        }
    }

    /// Fetch the pull request's commit list.
    ///
    /// `GET /api/v1/repos/{owner}/{repo}/pulls/{number}/commits`
    ///
    /// Commits are host-owned maps and stay opaque; only callers pick
    /// fields out of them.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`fetch_changes`](Self::fetch_changes).
    pub async fn fetch_commits(&self) -> Result<Vec<Value>, MagpieError> {
        let url = format!(
            "{}/api/v1/repos/{}/{}/pulls/{}/commits",
            self.base_url,
            owner(&self.payload)?,
            repo(&self.payload)?,
            self.number()?
        );
        let body = api_get(&self.http, &self.token, &url).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Fail-soft variant of [`fetch_commits`](Self::fetch_commits).
    pub async fn commits(&self) -> Vec<Value> {
        match self.fetch_commits().await {
            Ok(commits) => commits,
            Err(err) => {
                error!("failed to fetch pull request commits: {err}");
                Vec::new()
            }
        }
    }

    /// Post a comment on the pull request's issue thread.
    ///
    /// `POST /api/v1/repos/{owner}/{repo}/issues/{number}/comments`
    ///
    /// # Errors
    ///
    /// Same failure modes as [`fetch_changes`](Self::fetch_changes).
    pub async fn post_comment(&self, body: &str) -> Result<(), MagpieError> {
        let url = format!(
            "{}/api/v1/repos/{}/{}/issues/{}/comments",
            self.base_url,
            owner(&self.payload)?,
            repo(&self.payload)?,
            self.number()?
        );
        api_post(&self.http, &self.token, &url, &serde_json::json!({ "body": body })).await
    }

    /// Fail-soft variant of [`post_comment`](Self::post_comment):
    /// `true` only when the comment was accepted.
    pub async fn add_notes(&self, body: &str) -> bool {
        match self.post_comment(body).await {
            Ok(()) => true,
            Err(err) => {
                error!("failed to comment on pull request: {err}");
                false
            }
        }
    }
}

/// Handler for a single Gitea push webhook event.
///
/// Unlike pull requests, the changed-file list is embedded in the push
/// payload itself, so [`changes`](Self::changes) and
/// [`commits`](Self::commits) need no API call; only commenting does.
///
/// # Examples
///
/// ```
/// use magpie_review::gitea::PushHandler;
/// use serde_json::json;
///
/// let payload = json!({
///     "ref": "refs/heads/main",
///     "repository": { "name": "magpie", "owner": { "username": "octo" } },
///     "commits": [{ "id": "abc123", "added": ["src/new.rs"] }],
/// });
/// let handler = PushHandler::new(payload, "t0ken", "https://git.example.com").unwrap();
/// assert_eq!(handler.branch(), "main");
/// assert_eq!(handler.changes().len(), 1);
/// ```
pub struct PushHandler {
    payload: Value,
    token: String,
    base_url: String,
    http: reqwest::Client,
    commits: Vec<Value>,
}

impl PushHandler {
    /// Create a handler from a webhook payload, API token, and instance
    /// base URL. The payload's `commits` array is captured up front; a
    /// payload without one yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`MagpieError::Config`] when the base URL is empty.
    pub fn new(
        payload: Value,
        token: impl Into<String>,
        base_url: &str,
    ) -> Result<Self, MagpieError> {
        let commits = payload
            .get("commits")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(Self {
            payload,
            token: token.into(),
            base_url: normalize_base_url(base_url)?,
            http: reqwest::Client::new(),
            commits,
        })
    }

    /// The pushed commits, verbatim from the payload, most recent first.
    pub fn commits(&self) -> &[Value] {
        &self.commits
    }

    /// Branch name: the payload `ref` with a `refs/heads/` prefix
    /// stripped. A ref that is already a bare branch name passes
    /// through unchanged.
    pub fn branch(&self) -> &str {
        let git_ref = self
            .payload
            .get("ref")
            .and_then(Value::as_str)
            .unwrap_or("");
        git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref)
    }

    /// Derive the changed-file list from the embedded commit data.
    ///
    /// For each commit in payload order, every path in its `modified`
    /// list becomes a modified [`Change`], then `added` paths become
    /// added and `removed` paths become deleted. A path touched by two
    /// commits appears twice; deduplication is the caller's concern.
    pub fn changes(&self) -> Vec<Change> {
        let mut changes = Vec::new();
        for commit in &self.commits {
            for (field, status) in [
                ("modified", ChangeStatus::Modified),
                ("added", ChangeStatus::Added),
                ("removed", ChangeStatus::Deleted),
            ] {
                let Some(paths) = commit.get(field).and_then(Value::as_array) else {
                    continue;
                };
                for path in paths.iter().filter_map(Value::as_str) {
                    changes.push(Change {
                        old_path: path.to_string(),
                        new_path: path.to_string(),
                        status,
                    });
                }
            }
        }
        changes
    }

    /// Post a comment on the most recent pushed commit.
    ///
    /// `POST /api/v1/repos/{owner}/{repo}/commits/{id}/comments`
    ///
    /// # Errors
    ///
    /// [`MagpieError::MissingField`] when owner, repo, or branch is
    /// absent, or when the push carries no commit with an `id`; all of
    /// these are checked before any network activity. Otherwise the
    /// same failure modes as the pull-request operations.
    pub async fn post_comment(&self, body: &str) -> Result<(), MagpieError> {
        let owner = owner(&self.payload)?;
        let repo = repo(&self.payload)?;
        if self.branch().is_empty() {
            return Err(MagpieError::MissingField("ref"));
        }
        let id = self
            .commits
            .first()
            .and_then(|commit| commit.get("id"))
            .and_then(Value::as_str)
            .ok_or(MagpieError::MissingField("commits[0].id"))?;
        let url = format!(
            "{}/api/v1/repos/{owner}/{repo}/commits/{id}/comments",
            self.base_url
        );
        api_post(&self.http, &self.token, &url, &serde_json::json!({ "body": body })).await
    }

    /// Fail-soft variant of [`post_comment`](Self::post_comment):
    /// `true` only when the comment was accepted.
    pub async fn add_notes(&self, body: &str) -> bool {
        match self.post_comment(body).await {
            Ok(()) => true,
            Err(err) => {
                error!("failed to comment on push: {err}");
                false
            }
        }
    }
}

fn normalize_base_url(base_url: &str) -> Result<String, MagpieError> {
    let base_url = base_url.trim_end_matches('/');
    if base_url.is_empty() {
        return Err(MagpieError::Config(
            "Gitea base URL must not be empty".into(),
        ));
    }
    Ok(base_url.to_string())
}

fn owner(payload: &Value) -> Result<&str, MagpieError> {
    payload
        .pointer("/repository/owner/username")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(MagpieError::MissingField("repository.owner.username"))
}

fn repo(payload: &Value) -> Result<&str, MagpieError> {
    payload
        .pointer("/repository/name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(MagpieError::MissingField("repository.name"))
}

async fn api_get(
    http: &reqwest::Client,
    token: &str,
    url: &str,
) -> Result<Value, MagpieError> {
    let response = http
        .get(url)
        .header("Authorization", format!("token {token}"))
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| MagpieError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MagpieError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| MagpieError::Transport(e.to_string()))
}

async fn api_post(
    http: &reqwest::Client,
    token: &str,
    url: &str,
    body: &Value,
) -> Result<(), MagpieError> {
    let response = http
        .post(url)
        .header("Authorization", format!("token {token}"))
        .header("Accept", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| MagpieError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MagpieError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(())
}
