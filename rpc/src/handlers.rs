//! RPC request handlers.
//!
//! Every handler resolves the caller from headers, then runs the workflow
//! call on the blocking pool via [`AppState::run`].

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use reunite_types::{Case, CaseId, Evidence, Outcome};
use reunite_verification::{MessagePage, NewCase};
use serde::{Deserialize, Serialize};

use crate::error::RpcError;
use crate::identity::caller_from_headers;
use crate::pagination::{PaginationMeta, PaginationParams};
use crate::server::AppState;

// ── Requests ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitEvidenceRequest {
    pub evidence: Evidence,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub outcome: Outcome,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct DisputeRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub body: String,
}

// ── Responses ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCaseResponse {
    pub case_id: CaseId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CasesResponse {
    pub cases: Vec<Case>,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub case_id: CaseId,
    pub messages: Vec<reunite_types::ChatMessage>,
    pub pagination: PaginationMeta,
}

impl From<MessagePage> for MessagesResponse {
    fn from(page: MessagePage) -> Self {
        Self {
            case_id: page.case_id,
            messages: page.messages,
            pagination: PaginationMeta {
                offset: page.offset,
                total: page.total,
                next_offset: page.next_offset,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RpcError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| RpcError::BadRequest(rejection.body_text()))
}

fn case_id(raw: &str) -> Result<CaseId, RpcError> {
    Ok(raw.parse::<CaseId>()?)
}

// ── Handlers ─────────────────────────────────────────────────────────────

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn create_case(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewCase>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateCaseResponse>), RpcError> {
    let caller = caller_from_headers(&headers)?;
    let new_case = body(payload)?;
    let case_id = state
        .run(move |wf| wf.create_case(&caller, new_case))
        .await?;
    Ok((StatusCode::CREATED, Json(CreateCaseResponse { case_id })))
}

pub async fn list_cases(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CasesResponse>, RpcError> {
    let caller = caller_from_headers(&headers)?;
    let cases = state
        .run(move |wf| wf.list_cases_for_user(&caller))
        .await?;
    Ok(Json(CasesResponse { cases }))
}

pub async fn dispute_queue(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CasesResponse>, RpcError> {
    let caller = caller_from_headers(&headers)?;
    let cases = state.run(move |wf| wf.dispute_queue(&caller)).await?;
    Ok(Json(CasesResponse { cases }))
}

pub async fn get_case(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Case>, RpcError> {
    let caller = caller_from_headers(&headers)?;
    let id = case_id(&id)?;
    let case = state.run(move |wf| wf.get_case(&caller, &id)).await?;
    Ok(Json(case))
}

pub async fn submit_evidence(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<SubmitEvidenceRequest>, JsonRejection>,
) -> Result<Json<Case>, RpcError> {
    let caller = caller_from_headers(&headers)?;
    let id = case_id(&id)?;
    let req = body(payload)?;
    let case = state
        .run(move |wf| wf.submit_evidence(&caller, &id, req.evidence))
        .await?;
    Ok(Json(case))
}

pub async fn decide(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<Case>, RpcError> {
    let caller = caller_from_headers(&headers)?;
    let id = case_id(&id)?;
    let req = body(payload)?;
    let case = state
        .run(move |wf| wf.decide(&caller, &id, req.outcome, &req.reason))
        .await?;
    Ok(Json(case))
}

pub async fn open_dispute(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<DisputeRequest>, JsonRejection>,
) -> Result<Json<Case>, RpcError> {
    let caller = caller_from_headers(&headers)?;
    let id = case_id(&id)?;
    let req = body(payload)?;
    let case = state
        .run(move |wf| wf.open_dispute(&caller, &id, &req.reason))
        .await?;
    Ok(Json(case))
}

pub async fn rule_dispute(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<Case>, RpcError> {
    let caller = caller_from_headers(&headers)?;
    let id = case_id(&id)?;
    let req = body(payload)?;
    let case = state
        .run(move |wf| wf.rule_dispute(&caller, &id, req.outcome, &req.reason))
        .await?;
    Ok(Json(case))
}

pub async fn post_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<PostMessageRequest>, JsonRejection>,
) -> Result<Json<Case>, RpcError> {
    let caller = caller_from_headers(&headers)?;
    let id = case_id(&id)?;
    let req = body(payload)?;
    let case = state
        .run(move |wf| wf.post_message(&caller, &id, &req.body))
        .await?;
    Ok(Json(case))
}

pub async fn read_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    query: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<MessagesResponse>, RpcError> {
    let caller = caller_from_headers(&headers)?;
    let id = case_id(&id)?;
    let Query(params) = query.map_err(|rejection| RpcError::BadRequest(rejection.body_text()))?;
    let page = state
        .run(move |wf| wf.read_messages(&caller, &id, params.offset(), params.count))
        .await?;
    Ok(Json(page.into()))
}
