use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use briefcase_core::schema::{automation_schema, AutomationSchema, SchemaRequest};
use briefcase_core::{RepositorySnapshot, WorkflowStepResult};
use briefcase_git::desktop::{
    probe_cursor, probe_desktop_tool, CursorStatus, DesktopStatus, DesktopTool,
};
use briefcase_git::discover::discover_repositories;
use briefcase_git::suggest::NO_CHANGES_MESSAGE;
use briefcase_git::tools::{install_tools, system_check, ToolChecks};
use briefcase_git::{
    inspect, suggest_commit, CommandRunner, CommitSuggestion, FlowSpec, ProcessRunner,
    PullRequestOptions, Suggestion, WorkflowExecutor,
};

// ── Config ──

pub struct ServeConfig {
    pub bind: String,
    pub port: u16,
}

/// Environment the handlers work against, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Used when a request names no `cwd`; relative `cwd`s resolve against it.
    pub default_cwd: PathBuf,
    pub home_dir: Option<PathBuf>,
    /// Roots scanned by `/api/system-status`.
    pub search_roots: Vec<PathBuf>,
}

// ── App State ──

struct AppState {
    config: ServiceConfig,
    runner: Arc<dyn CommandRunner>,
}

impl AppState {
    fn cwd(&self, requested: Option<&str>) -> PathBuf {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(dir) => self.config.default_cwd.join(dir),
            None => self.config.default_cwd.clone(),
        }
    }

    fn home(&self) -> Option<&Path> {
        self.config.home_dir.as_deref()
    }

    fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }
}

// ── Error Handling ──

struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        let body = serde_json::json!({ "success": false, "error": self.0.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

fn now_rfc3339() -> anyhow::Result<String> {
    Ok(time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339)?)
}

/// JSON request body that may be missing. An empty body deserializes as `T::default()`,
/// and the content type is not checked.
struct JsonBody<T>(T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        serde_json::from_slice(&bytes).map(Self).map_err(|e| {
            let body = serde_json::json!({ "success": false, "error": e.to_string() });
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        })
    }
}

// ── Entrypoint ──

pub async fn serve(service: ServiceConfig, config: ServeConfig) -> anyhow::Result<()> {
    let app = router(service);
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "briefcase HTTP server listening");
    eprintln!("briefcase HTTP server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router backed by real child processes.
pub fn router(service: ServiceConfig) -> Router {
    router_with_runner(service, Arc::new(ProcessRunner))
}

/// Build the router over any command runner (for testing without touching git).
pub fn router_with_runner(service: ServiceConfig, runner: Arc<dyn CommandRunner>) -> Router {
    let state = Arc::new(AppState {
        config: service,
        runner,
    });
    Router::new()
        .route("/api/health", get(health))
        .route("/api/repository-info", post(post_repository_info))
        .route("/api/intelligent-commit", post(post_intelligent_commit))
        .route("/api/intelligent-workflow", post(post_intelligent_workflow))
        .route("/api/create-branch", post(post_create_branch))
        .route("/api/push-branch", post(post_push_branch))
        .route("/api/create-pr", post(post_create_pr))
        .route("/api/execute-flow", post(post_execute_flow))
        .route("/api/system-status", post(post_system_status))
        .route("/api/system-check", post(post_system_check))
        .route("/api/install-tools", post(post_install_tools))
        .route("/api/generate-schema", post(post_generate_schema))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

// ── POST /api/repository-info ──

#[derive(Deserialize, Default)]
struct CwdBody {
    cwd: Option<String>,
}

#[derive(Serialize)]
struct RepositoryResponse {
    success: bool,
    repository: RepositorySnapshot,
}

async fn post_repository_info(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<CwdBody>,
) -> Json<RepositoryResponse> {
    let cwd = state.cwd(body.cwd.as_deref());
    let repository = inspect(state.runner(), &cwd, state.home()).await;
    Json(RepositoryResponse {
        success: true,
        repository,
    })
}

// ── POST /api/intelligent-commit ──

#[derive(Serialize)]
#[serde(untagged)]
enum CommitResponse {
    Ready {
        success: bool,
        #[serde(flatten)]
        suggestion: Box<CommitSuggestion>,
    },
    Declined {
        success: bool,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        repository: Option<RepositorySnapshot>,
    },
}

impl From<Suggestion> for CommitResponse {
    fn from(suggestion: Suggestion) -> Self {
        match suggestion {
            Suggestion::Ready(suggestion) => CommitResponse::Ready {
                success: true,
                suggestion,
            },
            Suggestion::NoChanges { repository } => CommitResponse::Declined {
                success: false,
                message: NO_CHANGES_MESSAGE.to_string(),
                repository: Some(repository),
            },
            Suggestion::Failed { message } => CommitResponse::Declined {
                success: false,
                message,
                repository: None,
            },
        }
    }
}

async fn post_intelligent_commit(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<CwdBody>,
) -> Json<CommitResponse> {
    let cwd = state.cwd(body.cwd.as_deref());
    let suggestion = suggest_commit(state.runner(), &cwd, state.home()).await;
    Json(suggestion.into())
}

// ── POST /api/intelligent-workflow ──

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowBody {
    cwd: Option<String>,
    #[serde(default = "default_true")]
    auto_detect: bool,
    #[serde(default)]
    reviewers: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for WorkflowBody {
    fn default() -> Self {
        Self {
            cwd: None,
            auto_detect: true,
            reviewers: Vec::new(),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum WorkflowResponse {
    Executed {
        success: bool,
        results: Vec<WorkflowStepResult>,
        #[serde(rename = "commitInfo")]
        commit_info: CommitResponse,
        recommendations: Vec<String>,
    },
    Declined {
        success: bool,
        message: String,
    },
}

async fn post_intelligent_workflow(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<WorkflowBody>,
) -> Json<WorkflowResponse> {
    let cwd = state.cwd(body.cwd.as_deref());
    tracing::debug!(cwd = %cwd.display(), auto_detect = body.auto_detect, "workflow requested");

    let suggestion = match suggest_commit(state.runner(), &cwd, state.home()).await {
        Suggestion::Ready(suggestion) => suggestion,
        Suggestion::NoChanges { .. } => {
            return Json(WorkflowResponse::Declined {
                success: false,
                message: NO_CHANGES_MESSAGE.to_string(),
            })
        }
        Suggestion::Failed { message } => {
            return Json(WorkflowResponse::Declined {
                success: false,
                message,
            })
        }
    };

    let pr = PullRequestOptions {
        reviewers: body.reviewers,
    };
    let results = WorkflowExecutor::new(state.runner())
        .execute(&suggestion.plan, &cwd, &pr)
        .await;
    let recommendations = suggestion.plan.recommendations.clone();

    Json(WorkflowResponse::Executed {
        success: true,
        results,
        commit_info: CommitResponse::Ready {
            success: true,
            suggestion,
        },
        recommendations,
    })
}

// ── Caller-specified steps ──

#[derive(Serialize)]
struct StepResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
}

impl StepResponse {
    fn done(message: String) -> Self {
        Self {
            success: true,
            message,
            output: None,
        }
    }
}

fn default_base_branch() -> String {
    "main".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBranchBody {
    cwd: Option<String>,
    branch_name: String,
    #[serde(default = "default_base_branch")]
    base_branch: String,
}

async fn post_create_branch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBranchBody>,
) -> Result<Json<StepResponse>, AppError> {
    let cwd = state.cwd(body.cwd.as_deref());
    WorkflowExecutor::new(state.runner())
        .create_branch(&body.branch_name, Some(&body.base_branch), &cwd)
        .await?;
    Ok(Json(StepResponse::done(format!(
        "Branch '{}' created successfully",
        body.branch_name
    ))))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushBranchBody {
    cwd: Option<String>,
    branch_name: String,
    commit_title: String,
    #[serde(default)]
    commit_description: String,
}

async fn post_push_branch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PushBranchBody>,
) -> Result<Json<StepResponse>, AppError> {
    let cwd = state.cwd(body.cwd.as_deref());
    let executor = WorkflowExecutor::new(state.runner());
    let message = format!("{}\n\n{}", body.commit_title, body.commit_description);
    executor.commit_all(&message, &cwd).await?;
    executor.push_branch(&body.branch_name, &cwd).await?;
    Ok(Json(StepResponse::done(format!(
        "Branch '{}' pushed successfully",
        body.branch_name
    ))))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePrBody {
    cwd: Option<String>,
    branch_name: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    reviewers: Vec<String>,
}

async fn post_create_pr(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePrBody>,
) -> Result<Json<StepResponse>, AppError> {
    let cwd = state.cwd(body.cwd.as_deref());
    let pr = PullRequestOptions {
        reviewers: body.reviewers,
    };
    let output = WorkflowExecutor::new(state.runner())
        .create_pull_request(&body.branch_name, &body.title, &body.description, &pr, &cwd)
        .await?;
    Ok(Json(StepResponse {
        success: true,
        message: "Pull request created successfully".to_string(),
        output: Some(output),
    }))
}

// ── POST /api/execute-flow ──

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteFlowBody {
    cwd: Option<String>,
    branch_name: String,
    base_branch: Option<String>,
    commit_title: String,
    #[serde(default)]
    commit_description: String,
    /// Defaults to the commit title.
    pr_title: Option<String>,
    /// Defaults to the commit description.
    pr_description: Option<String>,
    #[serde(default)]
    reviewers: Vec<String>,
    #[serde(default = "default_true", rename = "autoPR")]
    auto_pr: bool,
}

#[derive(Serialize)]
struct FlowResponse {
    success: bool,
    results: Vec<WorkflowStepResult>,
}

async fn post_execute_flow(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExecuteFlowBody>,
) -> Json<FlowResponse> {
    let cwd = state.cwd(body.cwd.as_deref());
    let flow = FlowSpec {
        pr_title: body.pr_title.unwrap_or_else(|| body.commit_title.clone()),
        pr_description: body
            .pr_description
            .unwrap_or_else(|| body.commit_description.clone()),
        branch_name: body.branch_name,
        base_branch: body.base_branch.filter(|b| !b.trim().is_empty()),
        commit_title: body.commit_title,
        commit_description: body.commit_description,
        open_pr: body.auto_pr,
    };
    let pr = PullRequestOptions {
        reviewers: body.reviewers,
    };
    let results = WorkflowExecutor::new(state.runner())
        .execute_flow(&flow, &cwd, &pr)
        .await;
    Json(FlowResponse {
        success: true,
        results,
    })
}

// ── POST /api/system-status ──

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SystemStatusResponse {
    success: bool,
    repositories: Vec<RepositorySnapshot>,
    github_desktop: DesktopStatus,
    cursor: CursorStatus,
    timestamp: String,
}

async fn post_system_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SystemStatusResponse>, AppError> {
    let runner = state.runner();
    let cwd = &state.config.default_cwd;
    let home = state.home();

    let (repositories, github_desktop, cursor) = tokio::join!(
        discover_repositories(runner, cwd, &state.config.search_roots, home),
        probe_desktop_tool(runner, DesktopTool::GithubDesktop, home, cwd),
        probe_cursor(runner, home, cwd),
    );

    Ok(Json(SystemStatusResponse {
        success: true,
        repositories,
        github_desktop,
        cursor,
        timestamp: now_rfc3339()?,
    }))
}

// ── POST /api/system-check ──

#[derive(Serialize)]
struct SystemCheckResponse {
    success: bool,
    checks: ToolChecks,
}

async fn post_system_check(State(state): State<Arc<AppState>>) -> Json<SystemCheckResponse> {
    let checks = system_check(state.runner(), state.home(), &state.config.default_cwd).await;
    Json(SystemCheckResponse {
        success: true,
        checks,
    })
}

// ── POST /api/install-tools ──

#[derive(Deserialize)]
struct InstallBody {
    tools: Vec<String>,
}

#[derive(Serialize)]
struct InstallResponse {
    success: bool,
    results: BTreeMap<String, bool>,
}

async fn post_install_tools(
    State(state): State<Arc<AppState>>,
    Json(body): Json<InstallBody>,
) -> Json<InstallResponse> {
    let results = install_tools(state.runner(), &body.tools, &state.config.default_cwd).await;
    Json(InstallResponse {
        success: true,
        results,
    })
}

// ── POST /api/generate-schema ──

#[derive(Serialize)]
struct SchemaResponse {
    success: bool,
    schema: AutomationSchema,
}

async fn post_generate_schema(
    Json(body): Json<SchemaRequest>,
) -> Result<Json<SchemaResponse>, AppError> {
    let schema = automation_schema(body, &now_rfc3339()?);
    Ok(Json(SchemaResponse {
        success: true,
        schema,
    }))
}

// ── Tests ──
