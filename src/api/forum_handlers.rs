use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::api::handlers::{
    decode_all, existing, load, message, require_moderator, to_document, with_ids, AppState,
    ListResponse, MessageResponse,
};
use crate::api::json_extractor::{ApiJson, ApiPath, ApiQuery};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    generate_push_id, now_rfc3339, ForumComment, ForumCommentRequest, ForumSearchParams,
    ForumThread, ForumThreadRequest, Id, ModerateThreadRequest, ModerationAction,
    ModeratorWarning, ReportRequest, ThreadReport, UpdateThreadRequest, UserContext, VoteRequest,
    Votes,
};
use crate::store::{collection, CollectionPath, DocPath, Store};

const MIN_SEARCH_QUERY_LEN: usize = 3;

fn threads() -> CollectionPath {
    collection("forum_threads")
}

fn thread_path(thread_id: &str) -> DocPath {
    threads().doc(thread_id)
}

fn may_edit(thread: &ForumThread, user: &UserContext) -> bool {
    user.is(&thread.created_by) || user.is_moderator()
}

pub async fn list_categories<S: Store>(State(ctx): State<AppState<S>>) -> ApiResult<Json<ListResponse<Value>>> {
    let documents = ctx.store.list(&collection("forum_categories")).await?;
    Ok(Json(ListResponse::new(with_ids(documents, "category_id"))))
}

pub async fn list_threads<S: Store>(State(ctx): State<AppState<S>>) -> ApiResult<Json<ListResponse<ForumThread>>> {
    let documents = ctx.store.list(&threads()).await?;
    Ok(Json(ListResponse::new(decode_all(documents, "thread_id"))))
}

pub async fn create_thread<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<ForumThreadRequest>,
) -> ApiResult<(StatusCode, Json<ForumThread>)> {
    if request.title.trim().is_empty() {
        return Err(ApiError::bad_request("Thread title cannot be empty"));
    }
    let thread = ForumThread {
        thread_id: generate_push_id(),
        title: request.title,
        content: request.content,
        category: request.category,
        created_by: user.user_id.clone(),
        created_at: Some(now_rfc3339()),
        votes: Votes::default(),
        locked: false,
        warning: None,
    };
    ctx.store
        .set(&thread_path(&thread.thread_id), to_document(&thread)?)
        .await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

pub async fn get_thread<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiPath(thread_id): ApiPath<Id>,
) -> ApiResult<Json<ForumThread>> {
    let thread = load(ctx.store.as_ref(), &thread_path(&thread_id), "thread_id", "Thread").await?;
    Ok(Json(thread))
}

pub async fn update_thread<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(thread_id): ApiPath<Id>,
    ApiJson(update): ApiJson<UpdateThreadRequest>,
) -> ApiResult<Json<ForumThread>> {
    let id = thread_id.clone();
    let thread = ctx
        .store
        .modify(&thread_path(&thread_id), move |current| {
            let mut thread: ForumThread = existing(current, &id, "thread_id", "Thread")?;
            if !may_edit(&thread, &user) {
                return Err(ApiError::forbidden("Only the author or a moderator can edit this thread").into());
            }
            if let Some(title) = update.title {
                thread.title = title;
            }
            if let Some(content) = update.content {
                thread.content = content;
            }
            if let Some(category) = update.category {
                thread.category = category;
            }
            Ok((Some(serde_json::to_value(&thread)?), thread))
        })
        .await?;
    Ok(Json(thread))
}

pub async fn delete_thread<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(thread_id): ApiPath<Id>,
) -> ApiResult<Json<MessageResponse>> {
    let id = thread_id.clone();
    ctx.store
        .modify(&thread_path(&thread_id), move |current| {
            let thread: ForumThread = existing(current, &id, "thread_id", "Thread")?;
            if !may_edit(&thread, &user) {
                return Err(ApiError::forbidden("Only the author or a moderator can delete this thread").into());
            }
            Ok((None, ()))
        })
        .await?;
    Ok(message("Thread deleted successfully."))
}

pub async fn list_comments<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiPath(thread_id): ApiPath<Id>,
) -> ApiResult<Json<ListResponse<ForumComment>>> {
    let documents = ctx.store.list(&thread_path(&thread_id).sub("comments")).await?;
    Ok(Json(ListResponse::new(decode_all(documents, "comment_id"))))
}

pub async fn add_comment<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(thread_id): ApiPath<Id>,
    ApiJson(request): ApiJson<ForumCommentRequest>,
) -> ApiResult<(StatusCode, Json<ForumComment>)> {
    if request.content.trim().is_empty() {
        return Err(ApiError::bad_request("Comment cannot be empty"));
    }
    let thread: ForumThread = load(ctx.store.as_ref(), &thread_path(&thread_id), "thread_id", "Thread").await?;
    if thread.locked {
        return Err(ApiError::conflict("Thread is locked"));
    }

    let comment = ForumComment {
        comment_id: generate_push_id(),
        content: request.content,
        created_by: user.user_id.clone(),
        created_at: now_rfc3339(),
    };
    let path = thread_path(&thread_id).sub("comments").doc(&comment.comment_id);
    ctx.store.set(&path, to_document(&comment)?).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn search_threads<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiQuery(params): ApiQuery<ForumSearchParams>,
) -> ApiResult<Json<ListResponse<ForumThread>>> {
    let needle = match params.query.as_deref().map(str::trim) {
        Some(q) if q.chars().count() < MIN_SEARCH_QUERY_LEN => {
            return Err(ApiError::bad_request(format!(
                "query must be at least {} characters",
                MIN_SEARCH_QUERY_LEN
            )))
        }
        Some(q) => Some(q.to_lowercase()),
        None => None,
    };

    let documents = ctx.store.list(&threads()).await?;
    let threads: Vec<ForumThread> = decode_all::<ForumThread>(documents, "thread_id")
        .into_iter()
        .filter(|t| params.category.as_deref().map_or(true, |c| t.category == c))
        .filter(|t| params.user_id.as_deref().map_or(true, |u| t.created_by == u))
        .filter(|t| needle.as_deref().map_or(true, |n| t.matches_title(n)))
        .collect();
    Ok(Json(ListResponse::new(threads)))
}

pub async fn vote_thread<S: Store>(
    State(ctx): State<AppState<S>>,
    _user: UserContext,
    ApiPath(thread_id): ApiPath<Id>,
    ApiJson(request): ApiJson<VoteRequest>,
) -> ApiResult<Json<Value>> {
    let id = thread_id.clone();
    let votes = ctx
        .store
        .modify(&thread_path(&thread_id), move |current| {
            let mut thread: ForumThread = existing(current, &id, "thread_id", "Thread")?;
            thread.votes.record(request.vote);
            Ok((Some(serde_json::to_value(&thread)?), thread.votes))
        })
        .await?;
    Ok(Json(json!({"message": "Vote registered", "votes": votes})))
}

pub async fn report_thread<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(thread_id): ApiPath<Id>,
    ApiJson(request): ApiJson<ReportRequest>,
) -> ApiResult<(StatusCode, Json<ThreadReport>)> {
    // Reports on missing threads are refused
    load::<S, ForumThread>(ctx.store.as_ref(), &thread_path(&thread_id), "thread_id", "Thread").await?;

    let report = ThreadReport {
        report_id: generate_push_id(),
        reason: request.reason,
        reported_by: user.user_id.clone(),
        status: "pending".to_string(),
        created_at: now_rfc3339(),
    };
    let path = thread_path(&thread_id).sub("reports").doc(&report.report_id);
    ctx.store.set(&path, to_document(&report)?).await?;
    log::info!("Thread {} reported by {}", thread_id, user.user_id);
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn moderate_thread<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(thread_id): ApiPath<Id>,
    ApiJson(request): ApiJson<ModerateThreadRequest>,
) -> ApiResult<Json<Value>> {
    require_moderator(&user)?;

    let id = thread_id.clone();
    let moderator_id = user.user_id.clone();
    let action = request.action;
    ctx.store
        .modify(&thread_path(&thread_id), move |current| {
            let mut thread: ForumThread = existing(current, &id, "thread_id", "Thread")?;
            match request.action {
                ModerationAction::Delete => return Ok((None, ())),
                ModerationAction::Lock => thread.locked = true,
                ModerationAction::Unlock => thread.locked = false,
                ModerationAction::Warn => {
                    thread.warning = Some(ModeratorWarning {
                        moderator_id,
                        reason: request.reason,
                    })
                }
            }
            Ok((Some(serde_json::to_value(&thread)?), ()))
        })
        .await?;

    log::info!("Moderator {} applied {:?} to thread {}", user.user_id, action, thread_id);
    Ok(Json(json!({"message": "Thread moderation applied", "action": action})))
}
