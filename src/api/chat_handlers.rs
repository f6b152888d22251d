use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use itertools::Itertools;
use serde_json::{json, Value};

use crate::api::handlers::{decode_all, existing, load, to_document, AppState, ListResponse};
use crate::api::json_extractor::{ApiJson, ApiPath};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    generate_push_id, now_rfc3339, BotQueryRequest, ChatMessage, Conversation, Id,
    NewConversationRequest, NewMessageRequest, UpdateConversationRequest, UserContext,
};
use crate::store::{collection, CollectionPath, DocPath, Store};

fn conversations() -> CollectionPath {
    collection("chats")
}

fn conversation_path(conversation_id: &str) -> DocPath {
    conversations().doc(conversation_id)
}

async fn participant_conversation<S: Store>(
    store: &S,
    conversation_id: &str,
    user: &UserContext,
) -> ApiResult<Conversation> {
    let conversation: Conversation = load(
        store,
        &conversation_path(conversation_id),
        "conversation_id",
        "Conversation",
    )
    .await?;
    if !conversation.has_participant(&user.user_id) {
        return Err(ApiError::forbidden("You are not a participant in this conversation"));
    }
    Ok(conversation)
}

pub async fn list_conversations<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
) -> ApiResult<Json<ListResponse<Conversation>>> {
    let documents = ctx
        .store
        .find_containing(&conversations(), "participants", &json!(user.user_id))
        .await?;
    let conversations: Vec<Conversation> = decode_all(documents, "conversation_id");
    if conversations.is_empty() {
        return Err(ApiError::not_found("No conversations found."));
    }
    Ok(Json(ListResponse::new(conversations)))
}

pub async fn create_conversation<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiJson(request): ApiJson<NewConversationRequest>,
) -> ApiResult<(StatusCode, Json<Conversation>)> {
    let participants = request
        .participants
        .into_iter()
        .chain(std::iter::once(user.user_id.clone()))
        .filter(|p| !p.trim().is_empty())
        .unique()
        .collect();

    let conversation = Conversation {
        conversation_id: generate_push_id(),
        participants,
        created_by: user.user_id.clone(),
        metadata: request.metadata,
        archived: false,
        created_at: Some(now_rfc3339()),
    };
    ctx.store
        .set(&conversation_path(&conversation.conversation_id), to_document(&conversation)?)
        .await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

pub async fn get_conversation<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(conversation_id): ApiPath<Id>,
) -> ApiResult<Json<Conversation>> {
    Ok(Json(participant_conversation(ctx.store.as_ref(), &conversation_id, &user).await?))
}

pub async fn update_conversation<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(conversation_id): ApiPath<Id>,
    ApiJson(update): ApiJson<UpdateConversationRequest>,
) -> ApiResult<Json<Conversation>> {
    let caller = user.user_id.clone();
    let id = conversation_id.clone();
    let conversation = ctx
        .store
        .modify(&conversation_path(&conversation_id), move |current| {
            let mut conversation: Conversation = existing(current, &id, "conversation_id", "Conversation")?;
            if !conversation.has_participant(&caller) {
                return Err(ApiError::forbidden("You are not a participant in this conversation").into());
            }
            conversation.archived = update.archived;
            conversation.metadata.extend(update.metadata);
            Ok((Some(serde_json::to_value(&conversation)?), conversation))
        })
        .await?;
    Ok(Json(conversation))
}

pub async fn get_conversation_metadata<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(conversation_id): ApiPath<Id>,
) -> ApiResult<Json<Value>> {
    let conversation = participant_conversation(ctx.store.as_ref(), &conversation_id, &user).await?;
    Ok(Json(json!({
        "conversation_id": conversation.conversation_id,
        "metadata": conversation.metadata,
        "archived": conversation.archived,
    })))
}

pub async fn list_messages<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(conversation_id): ApiPath<Id>,
) -> ApiResult<Json<ListResponse<ChatMessage>>> {
    participant_conversation(ctx.store.as_ref(), &conversation_id, &user).await?;
    let documents = ctx
        .store
        .list(&conversation_path(&conversation_id).sub("messages"))
        .await?;
    Ok(Json(ListResponse::new(decode_all(documents, "message_id"))))
}

pub async fn send_message<S: Store>(
    State(ctx): State<AppState<S>>,
    user: UserContext,
    ApiPath(conversation_id): ApiPath<Id>,
    ApiJson(request): ApiJson<NewMessageRequest>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    if request.content.trim().is_empty() {
        return Err(ApiError::bad_request("Message content cannot be empty"));
    }
    participant_conversation(ctx.store.as_ref(), &conversation_id, &user).await?;

    let message = ChatMessage {
        message_id: generate_push_id(),
        sender_id: user.user_id.clone(),
        message: request.content,
        timestamp: now_rfc3339(),
    };
    let path = conversation_path(&conversation_id)
        .sub("messages")
        .doc(&message.message_id);
    ctx.store.set(&path, to_document(&message)?).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn chatbot_query(
    _user: UserContext,
    ApiJson(request): ApiJson<BotQueryRequest>,
) -> ApiResult<Json<Value>> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ApiError::bad_request("Query cannot be empty"));
    }
    Ok(Json(json!({
        "query": query,
        "response": format!("Thanks for your question about \"{}\". An agronomist will follow up shortly.", query),
    })))
}
