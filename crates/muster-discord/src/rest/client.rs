//! HTTP client for the Discord REST API

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use muster_core::{
    ChannelKind, ChannelRef, CreateChannel, GuildRef, Permissions, PlatformClient, PlatformError,
    PlatformResult, RoleRef, Snowflake,
};
use muster_service::Reply;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::models::{
    callback_type, channel_type_of, ApiErrorBody, ChannelPayload, CreateChannelRequest,
    CreateDmRequest, CreateRoleRequest, DmChannelPayload, GuildMemberPayload, GuildPayload,
    InteractionResponse, InteractionResponseData, MessageRequest, RolePayload, EPHEMERAL_FLAG,
};

/// JSON error code for "Cannot send messages to this user"
pub const CANNOT_MESSAGE_USER: u32 = 50007;

/// Largest page the member list endpoint returns
const MEMBER_PAGE_SIZE: usize = 1000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest back-off honoured from a `retry_after` hint
const MAX_RETRY_AFTER: Duration = Duration::from_secs(300);

/// Discord REST client implementing [`PlatformClient`]
pub struct DiscordRest {
    client: Client,
    base_url: String,
    /// user id → DM channel id
    dm_channels: DashMap<Snowflake, Snowflake>,
}

impl DiscordRest {
    /// Create a client authenticating as the bot `token`
    pub fn new(base_url: &str, token: &str) -> PlatformResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bot {token}"))
            .map_err(|_| PlatformError::Transport("bot token is not a valid header value".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("DiscordBot (muster, ", env!("CARGO_PKG_VERSION"), ")"))
            .default_headers(headers)
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            dm_channels: DashMap::new(),
        })
    }

    /// Answer a slash command interaction
    #[instrument(skip(self, token, reply), fields(ephemeral = reply.ephemeral))]
    pub async fn create_interaction_response(
        &self,
        interaction_id: Snowflake,
        token: &str,
        reply: &Reply,
    ) -> PlatformResult<()> {
        let body = InteractionResponse {
            kind: callback_type::CHANNEL_MESSAGE_WITH_SOURCE,
            data: InteractionResponseData {
                content: &reply.content,
                flags: reply.ephemeral.then_some(EPHEMERAL_FLAG),
            },
        };
        self.post::<_, IgnoredAny>(&format!("/interactions/{interaction_id}/{token}/callback"), &body)
            .await?;
        Ok(())
    }

    async fn dm_channel(&self, user_id: Snowflake) -> PlatformResult<Snowflake> {
        if let Some(channel_id) = self.dm_channels.get(&user_id) {
            return Ok(*channel_id);
        }

        let channel: DmChannelPayload = self
            .post("/users/@me/channels", &CreateDmRequest { recipient_id: user_id })
            .await?;
        self.dm_channels.insert(user_id, channel.id);
        Ok(channel.id)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> PlatformResult<T> {
        self.request::<(), T>(Method::GET, path, None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> PlatformResult<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> PlatformResult<T> {
        self.request(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> PlatformResult<()> {
        self.request::<(), IgnoredAny>(Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> PlatformResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport)?;
        debug!(%method, path, status = response.status().as_u16(), "Discord API request");
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> PlatformResult<T> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;

        if status.is_success() {
            // 204 No Content decodes as null
            let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
            serde_json::from_slice(body).map_err(|e| PlatformError::Decode(e.to_string()))
        } else {
            Err(api_error(status, &bytes))
        }
    }
}

fn transport(error: reqwest::Error) -> PlatformError {
    PlatformError::Transport(error.to_string())
}

/// Map a non-2xx response to a platform error
pub(crate) fn api_error(status: StatusCode, body: &[u8]) -> PlatformError {
    let parsed: Option<ApiErrorBody> = serde_json::from_slice(body).ok();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let seconds = parsed.as_ref().and_then(|b| b.retry_after).unwrap_or(1.0);
        let retry_after = Duration::try_from_secs_f64(seconds.max(0.0))
            .map_or(MAX_RETRY_AFTER, |hint| hint.min(MAX_RETRY_AFTER));
        return PlatformError::RateLimited { retry_after };
    }

    match parsed {
        Some(body) => PlatformError::Http {
            status: status.as_u16(),
            code: body.code,
            message: body.message,
        },
        None => PlatformError::Http {
            status: status.as_u16(),
            code: 0,
            message: String::from_utf8_lossy(body).into_owned(),
        },
    }
}

#[async_trait]
impl PlatformClient for DiscordRest {
    async fn find_role_by_name(&self, guild_id: Snowflake, name: &str) -> PlatformResult<Option<RoleRef>> {
        let roles: Vec<RolePayload> = self.get(&format!("/guilds/{guild_id}/roles")).await?;
        Ok(roles.into_iter().find(|role| role.name == name).map(RoleRef::from))
    }

    #[instrument(skip(self))]
    async fn create_role(&self, guild_id: Snowflake, name: &str) -> PlatformResult<RoleRef> {
        let body = CreateRoleRequest {
            name,
            permissions: Permissions::empty(),
        };
        let role: RolePayload = self.post(&format!("/guilds/{guild_id}/roles"), &body).await?;
        Ok(role.into())
    }

    async fn members_with_role(&self, guild_id: Snowflake, role_id: Snowflake) -> PlatformResult<Vec<Snowflake>> {
        let mut holders = Vec::new();
        let mut after = Snowflake::new(0);

        loop {
            let page: Vec<GuildMemberPayload> = self
                .get(&format!("/guilds/{guild_id}/members?limit={MEMBER_PAGE_SIZE}&after={after}"))
                .await?;
            let page_len = page.len();

            for member in page {
                after = after.max(member.user.id);
                if member.roles.contains(&role_id) {
                    holders.push(member.user.id);
                }
            }

            if page_len < MEMBER_PAGE_SIZE {
                return Ok(holders);
            }
        }
    }

    async fn find_channel_by_name(
        &self,
        guild_id: Snowflake,
        name: &str,
        kind: ChannelKind,
    ) -> PlatformResult<Option<ChannelRef>> {
        let wanted = channel_type_of(kind);
        let channels: Vec<ChannelPayload> = self.get(&format!("/guilds/{guild_id}/channels")).await?;
        Ok(channels
            .into_iter()
            .filter(|channel| channel.kind == wanted && channel.name.as_deref() == Some(name))
            .find_map(|channel| channel.into_channel_ref(guild_id)))
    }

    #[instrument(skip(self, request), fields(name = %request.name, kind = ?request.kind))]
    async fn create_channel(&self, guild_id: Snowflake, request: &CreateChannel) -> PlatformResult<ChannelRef> {
        let channel: ChannelPayload = self
            .post(&format!("/guilds/{guild_id}/channels"), &CreateChannelRequest::from(request))
            .await?;
        channel
            .into_channel_ref(guild_id)
            .ok_or_else(|| PlatformError::Decode("created channel has an unexpected type".to_string()))
    }

    async fn send_channel_message(&self, channel_id: Snowflake, content: &str) -> PlatformResult<()> {
        self.post::<_, IgnoredAny>(&format!("/channels/{channel_id}/messages"), &MessageRequest { content })
            .await?;
        Ok(())
    }

    async fn send_direct_message(&self, user_id: Snowflake, content: &str) -> PlatformResult<()> {
        let channel_id = self.dm_channel(user_id).await?;
        match self.send_channel_message(channel_id, content).await {
            Err(PlatformError::Http { code: CANNOT_MESSAGE_USER, .. }) => {
                Err(PlatformError::RecipientUnreachable(user_id))
            }
            other => other,
        }
    }

    async fn list_guilds(&self) -> PlatformResult<Vec<GuildRef>> {
        let guilds: Vec<GuildPayload> = self.get("/users/@me/guilds?limit=200").await?;
        Ok(guilds.into_iter().map(GuildRef::from).collect())
    }

    #[instrument(skip(self))]
    async fn leave_guild(&self, guild_id: Snowflake) -> PlatformResult<()> {
        self.delete(&format!("/users/@me/guilds/{guild_id}")).await
    }

    async fn register_commands(
        &self,
        application_id: Snowflake,
        guild_id: Snowflake,
        commands: &Value,
    ) -> PlatformResult<()> {
        self.put::<_, IgnoredAny>(&format!("/applications/{application_id}/guilds/{guild_id}/commands"), commands)
            .await?;
        Ok(())
    }
}
