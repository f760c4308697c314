//! `jid`.

use sigil::core::{ApiError, ApiResult, Jid, Message};
use sigil::framework::{CommandContext, CommandRegistry, Plugin, RegisterResult, TriggerConfig};

/// The first mentioned user, else the quoted sender, else the chat.
pub fn target_jid(message: &Message) -> &Jid {
    message
        .mentioned
        .first()
        .or(message.quoted.as_ref().map(|quoted| &quoted.sender))
        .unwrap_or(&message.chat)
}

async fn jid(ctx: CommandContext) -> ApiResult<()> {
    let message = ctx.message().ok_or(ApiError::NoMessage)?;
    let target = target_jid(message).to_string();
    ctx.reply(target).await?;
    Ok(())
}

pub struct WhatsappPlugin;

impl Plugin for WhatsappPlugin {
    fn name(&self) -> &str {
        "whatsapp"
    }

    fn register(&self, registry: &mut CommandRegistry) -> RegisterResult<()> {
        registry.register(
            TriggerConfig::pattern("jid")
                .from_me(registry.mode().restricts())
                .desc("To get remoteJid")
                .kind("whatsapp"),
            jid,
        )?;
        Ok(())
    }
}
