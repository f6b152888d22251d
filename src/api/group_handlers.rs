use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::api::handlers::{
    decode_all, existing, load, message, to_document, AppState, ListResponse, MessageResponse,
};
use crate::api::json_extractor::{ApiJson, ApiPath};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    generate_push_id, now_rfc3339, AddMemberRequest, Group, GroupInvite, GroupInviteRequest,
    GroupMessage, GroupMessageRequest, GroupRequest, Id, UpdateGroupRequest, UserContext,
};
use crate::store::{collection, CollectionPath, DocPath, Store};

fn groups() -> CollectionPath {
    collection("groups")
}

fn group_path(group_id: &str) -> DocPath {
    groups().doc(group_id)
}

async fn member_group<S: Store>(store: &S, group_id: &str, user: &UserContext) -> ApiResult<Group> {
    let group: Group = load(store, &group_path(group_id), "group_id", "Group").await?;
    if !group.has_member(&user.user_id) {
        return Err(ApiError::forbidden("You are not a member of this group"));
    }
    Ok(group)
}

/// Read-modify-write of a group document
async fn update_group_doc<S, F, T>(store: &S, group_id: &str, change: F) -> ApiResult<T>
where
    S: Store,
    T: Send,
    F: FnOnce(&mut Group) -> ApiResult<T> + Send,
{
    let id = group_id.to_string();
    let result = store
        .modify(&group_path(group_id), move |current| {
            let mut group: Group = existing(current, &id, "group_id", "Group")?;
            let result = change(&mut group)?;
            Ok((Some(serde_json::to_value(&group)?), result))
        })
        .await?;
    Ok(result)
}

pub async fn list_groups<S: Store>(State(ctx): State<AppState<S>>) -> ApiResult<Json<ListResponse<Group>>> {
    let documents = ctx.store.list(&groups()).await?;
    Ok(Json(ListResponse::new(decode_all(documents, "group_id"))))
}

pub async fn create_group<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<GroupRequest>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Group name cannot be empty"));
    }
    let group = Group {
        group_id: generate_push_id(),
        name: request.name,
        description: request.description,
        members: Group::normalized_members(&user.user_id, request.members),
        created_by: user.user_id.clone(),
        created_at: Some(now_rfc3339()),
    };
    ctx.store
        .set(&group_path(&group.group_id), to_document(&group)?)
        .await?;
    log::info!("Group {} created by {}", group.group_id, user.user_id);
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn get_group<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiPath(group_id): ApiPath<Id>,
) -> ApiResult<Json<Group>> {
    let group = load(ctx.store.as_ref(), &group_path(&group_id), "group_id", "Group").await?;
    Ok(Json(group))
}

pub async fn update_group<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(group_id): ApiPath<Id>,
    ApiJson(update): ApiJson<UpdateGroupRequest>,
) -> ApiResult<Json<Group>> {
    let group = update_group_doc(ctx.store.as_ref(), &group_id, move |group| {
        if !group.has_member(&user.user_id) {
            return Err(ApiError::forbidden("You are not a member of this group"));
        }
        if let Some(name) = update.name {
            group.name = name;
        }
        if let Some(description) = update.description {
            group.description = description;
        }
        if let Some(members) = update.members {
            group.members = Group::normalized_members(&group.created_by, members);
        }
        Ok(group.clone())
    })
    .await?;
    Ok(Json(group))
}

pub async fn delete_group<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(group_id): ApiPath<Id>,
) -> ApiResult<Json<MessageResponse>> {
    let id = group_id.clone();
    ctx.store
        .modify(&group_path(&group_id), move |current| {
            let group: Group = existing(current, &id, "group_id", "Group")?;
            if !user.is(&group.created_by) {
                return Err(ApiError::forbidden("Only the creator can delete this group").into());
            }
            Ok((None, ()))
        })
        .await?;
    Ok(message("Group deleted successfully."))
}

pub async fn list_members<S: Store>(
    State(ctx): State<AppState<S>>,
    ApiPath(group_id): ApiPath<Id>,
) -> ApiResult<Json<Value>> {
    let group: Group = load(ctx.store.as_ref(), &group_path(&group_id), "group_id", "Group").await?;
    Ok(Json(json!({"group_id": group.group_id, "members": group.members})))
}

pub async fn add_member<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(group_id): ApiPath<Id>,
    ApiJson(request): ApiJson<AddMemberRequest>,
) -> ApiResult<Json<Value>> {
    let members = update_group_doc(ctx.store.as_ref(), &group_id, move |group| {
        if !group.has_member(&user.user_id) {
            return Err(ApiError::forbidden("You are not a member of this group"));
        }
        if group.has_member(&request.member_id) {
            return Err(ApiError::bad_request("User is already a member of this group"));
        }
        group.members.push(request.member_id);
        Ok(group.members.clone())
    })
    .await?;
    Ok(Json(json!({"message": "Member added successfully.", "members": members})))
}

pub async fn remove_member<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath((group_id, member_id)): ApiPath<(Id, String)>,
) -> ApiResult<Json<Value>> {
    let members = update_group_doc(ctx.store.as_ref(), &group_id, move |group| {
        // Members may leave; only the creator removes others
        if !user.is(&member_id) && !user.is(&group.created_by) {
            return Err(ApiError::forbidden("Only the creator can remove other members"));
        }
        if !group.has_member(&member_id) {
            return Err(ApiError::not_found("Member not found in this group"));
        }
        if group.created_by == member_id {
            return Err(ApiError::bad_request("The group creator cannot be removed"));
        }
        group.members.retain(|m| m != &member_id);
        Ok(group.members.clone())
    })
    .await?;
    Ok(Json(json!({"message": "Member removed successfully.", "members": members})))
}

pub async fn invite_member<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(group_id): ApiPath<Id>,
    ApiJson(request): ApiJson<GroupInviteRequest>,
) -> ApiResult<(StatusCode, Json<GroupInvite>)> {
    if !request.email.contains('@') {
        return Err(ApiError::bad_request("A valid email address is required"));
    }
    member_group(ctx.store.as_ref(), &group_id, &user).await?;

    let invite = GroupInvite {
        invite_id: generate_push_id(),
        email: request.email,
        invited_by: user.user_id.clone(),
        status: "pending".to_string(),
        created_at: now_rfc3339(),
    };
    let path = group_path(&group_id).sub("invites").doc(&invite.invite_id);
    ctx.store.set(&path, to_document(&invite)?).await?;
    Ok((StatusCode::CREATED, Json(invite)))
}

pub async fn get_group_chat<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(group_id): ApiPath<Id>,
) -> ApiResult<Json<ListResponse<GroupMessage>>> {
    member_group(ctx.store.as_ref(), &group_id, &user).await?;
    let documents = ctx.store.list(&group_path(&group_id).sub("chat")).await?;
    Ok(Json(ListResponse::new(decode_all(documents, "message_id"))))
}

pub async fn post_group_message<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(group_id): ApiPath<Id>,
    ApiJson(request): ApiJson<GroupMessageRequest>,
) -> ApiResult<(StatusCode, Json<GroupMessage>)> {
    if request.message.trim().is_empty() {
        return Err(ApiError::bad_request("Message cannot be empty"));
    }
    member_group(ctx.store.as_ref(), &group_id, &user).await?;

    let message = GroupMessage {
        message_id: generate_push_id(),
        sender_id: user.user_id.clone(),
        message: request.message,
        timestamp: now_rfc3339(),
    };
    let path = group_path(&group_id).sub("chat").doc(&message.message_id);
    ctx.store.set(&path, to_document(&message)?).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
