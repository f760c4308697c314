//! `ping`, `uptime` and `menu`.

use std::time::{Duration, Instant};

use sigil::core::ApiResult;
use sigil::framework::{CommandContext, CommandMenu, CommandRegistry, Plugin, RegisterResult, TriggerConfig};

/// Formats a duration as `1d 2h 3m 4s`, dropping leading zero units.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let days = total / 86_400;
    let hours = total / 3_600 % 24;
    let minutes = total / 60 % 60;
    let secs = total % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m {secs}s")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

async fn ping(ctx: CommandContext) -> ApiResult<()> {
    let start = Instant::now();
    ctx.reply("*Ping!*").await?;
    ctx.reply(format!("*Pong!*\nLatency: {}ms", start.elapsed().as_millis()))
        .await?;
    Ok(())
}

async fn menu(ctx: CommandContext) -> ApiResult<()> {
    let menu = CommandMenu::new(ctx.registry());
    ctx.reply(menu.render()).await?;
    Ok(())
}

pub struct InfoPlugin {
    started: Instant,
}

impl InfoPlugin {
    pub fn new(started: Instant) -> Self {
        Self { started }
    }
}

impl Plugin for InfoPlugin {
    fn name(&self) -> &str {
        "info"
    }

    fn register(&self, registry: &mut CommandRegistry) -> RegisterResult<()> {
        let operator_only = registry.mode().restricts();

        registry.register(
            TriggerConfig::pattern("ping")
                .from_me(operator_only)
                .desc("Bot response in milliseconds.")
                .kind("info"),
            ping,
        )?;

        let started = self.started;
        registry.register(
            TriggerConfig::pattern("uptime")
                .from_me(operator_only)
                .desc("Get bots runtime")
                .kind("info"),
            move |ctx: CommandContext| async move {
                ctx.reply(format_uptime(started.elapsed())).await.map(|_| ())
            },
        )?;

        registry.register(
            TriggerConfig::pattern("menu")
                .from_me(operator_only)
                .desc("Display all available commands")
                .kind("info"),
            menu,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0s");
        assert_eq!(format_uptime(Duration::from_secs(59)), "59s");
        assert_eq!(format_uptime(Duration::from_secs(61)), "1m 1s");
        assert_eq!(format_uptime(Duration::from_secs(3_600)), "1h 0m 0s");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 1h 1m 1s");
    }

    #[test]
    fn test_register_respects_mode() {
        let mut registry = CommandRegistry::default().with_mode(sigil::framework::Mode::Private);
        registry.install(&InfoPlugin::new(Instant::now())).unwrap();

        assert_eq!(registry.len(), 3);
        assert!(registry.commands().iter().all(|c| c.gates().from_me));
    }
}
