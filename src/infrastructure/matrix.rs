//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for the Matrix protocol using the `matrix_sdk`.
//! Channels are room ids and users are Matrix user ids; the adapter resolves both against
//! the logged-in client.

use crate::domain::traits::ChatProvider;
use crate::domain::types::{ChannelId, UserId};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use matrix_sdk::Client;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::room::message::RoomMessageEventContent;
use matrix_sdk::ruma::{RoomId, UserId as MatrixUserId};

#[derive(Clone)]
pub struct MatrixService {
    client: Client,
}

impl MatrixService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn room(&self, channel: &ChannelId) -> Result<Room> {
        let room_id = RoomId::parse(channel.as_str())?;
        self.client
            .get_room(&room_id)
            .ok_or_else(|| anyhow!("Not a member of room {}", channel))
    }

    async fn member_name(&self, channel: &ChannelId, user: &UserId) -> Result<String> {
        let room = self.room(channel)?;
        let user_id = MatrixUserId::parse(user.as_str())?;
        let member = room
            .get_member(&user_id)
            .await?
            .ok_or_else(|| anyhow!("{} is not a member of {}", user, channel))?;
        Ok(member.name().to_string())
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    async fn send_message(&self, channel: &ChannelId, content: &str) -> Result<String, String> {
        tracing::info!("Bot sending message to {}: {}", channel, content);
        let room = self.room(channel).map_err(|e| e.to_string())?;
        // Plain text: vote status uses a `-----` spacer that markdown would turn into a heading.
        room.send(RoomMessageEventContent::text_plain(content))
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| e.to_string())
    }

    async fn display_name(&self, channel: &ChannelId, user: &UserId) -> Result<String, String> {
        self.member_name(channel, user)
            .await
            .map_err(|e| e.to_string())
    }
}
