//! Command menu rendering.

use std::collections::BTreeMap;

use crate::registry::CommandRegistry;

const NO_DESCRIPTION: &str = "No description";

/// One listed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub name: String,
    pub desc: String,
}

/// Commands sharing a `type` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSection {
    pub kind: String,
    pub entries: Vec<MenuEntry>,
}

/// A menu of the listed pattern commands, grouped by type.
///
/// Sections are sorted by type and entries by command name. Commands
/// without a pattern or marked `dontAddCommandList` are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMenu {
    prefix: String,
    sections: Vec<MenuSection>,
}

impl CommandMenu {
    pub fn new(registry: &CommandRegistry) -> Self {
        let mut by_kind: BTreeMap<String, Vec<MenuEntry>> = BTreeMap::new();
        for command in registry.commands().iter().filter(|c| c.is_listed()) {
            let desc = match command.desc() {
                "" => NO_DESCRIPTION,
                desc => desc,
            };
            by_kind
                .entry(command.kind().to_string())
                .or_default()
                .push(MenuEntry {
                    name: command.name().to_string(),
                    desc: desc.to_string(),
                });
        }

        let sections = by_kind
            .into_iter()
            .map(|(kind, mut entries)| {
                entries.sort_by(|a, b| a.name.cmp(&b.name));
                MenuSection { kind, entries }
            })
            .collect();

        Self {
            prefix: registry.display_prefix(),
            sections,
        }
    }

    pub fn sections(&self) -> &[MenuSection] {
        &self.sections
    }

    /// Renders the menu as chat markup.
    pub fn render(&self) -> String {
        let mut out = String::from("*COMMAND MENU*\n\n");
        for section in &self.sections {
            out.push_str(&format!("*{}*\n", section.kind.to_uppercase()));
            for entry in &section.entries {
                out.push_str(&format!("{}{}\n_{}_\n\n", self.prefix, entry.name, entry.desc));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CommandContext;
    use crate::trigger::TriggerConfig;

    #[test]
    fn test_grouping_and_sorting() {
        let mut registry = CommandRegistry::default();
        for config in [
            TriggerConfig::pattern("uptime").kind("info").desc("Get bots runtime"),
            TriggerConfig::pattern("jid").kind("whatsapp"),
            TriggerConfig::pattern("ping").kind("info").desc("Latency"),
            TriggerConfig::pattern("secret").hidden(),
            TriggerConfig::on("sticker"),
        ] {
            registry.register(config, |_ctx: CommandContext| async {}).unwrap();
        }

        let menu = CommandMenu::new(&registry);
        let kinds: Vec<_> = menu.sections().iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, ["info", "whatsapp"]);

        assert_eq!(
            menu.render(),
            "*COMMAND MENU*\n\n*INFO*\n.ping\n_Latency_\n\n.uptime\n_Get bots runtime_\n\n*WHATSAPP*\n.jid\n_No description_\n\n"
        );
    }
}
