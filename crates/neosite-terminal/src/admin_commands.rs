//! Owner-gated commands proxying the contact inbox and site configuration:
//! inbox, alerts, admin.

use neosite_api::InboxMessage;
use neosite_types::error::Result;

use crate::interpreter::{
    Command, CommandOutput, CommandRegistry, Environment, render_service_error, require_session,
};

fn render_messages(messages: &[InboxMessage]) -> String {
    if messages.is_empty() {
        return "(inbox empty)".to_string();
    }
    let mut lines = Vec::new();
    for m in messages {
        let from = match &m.email {
            Some(email) => format!("{} <{email}>", m.name),
            None => m.name.clone(),
        };
        lines.push(format!("[{}] {}  {from}", m.id, m.created_at));
        lines.push(format!("      {}", m.message));
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// inbox
// ---------------------------------------------------------------------------

struct InboxCmd;
impl Command for InboxCmd {
    fn name(&self) -> &str {
        "inbox"
    }
    fn description(&self) -> &str {
        "Read or delete contact messages (owner only)"
    }
    fn usage(&self) -> &str {
        "inbox [today|week|month] | inbox delete <id>"
    }
    fn category(&self) -> &str {
        "admin"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let token = match require_session(env, "inbox") {
            Ok(token) => token,
            Err(denied) => return Ok(CommandOutput::Text(denied)),
        };
        let Some(inbox) = env.inbox else {
            return Ok(CommandOutput::Text(
                "inbox: service unavailable".to_string(),
            ));
        };

        if args.first() == Some(&"delete") {
            let Some(id) = args.get(1).and_then(|v| v.parse::<u64>().ok()) else {
                return Ok(CommandOutput::Text("usage: inbox delete <id>".to_string()));
            };
            return Ok(match inbox.delete(id, &token) {
                Ok(()) => CommandOutput::Text(format!("deleted message {id}")),
                Err(e) => CommandOutput::Text(render_service_error(env.token, "inbox", e)),
            });
        }

        let period = args.first().copied();
        match inbox.messages(period, &token) {
            Ok(messages) => Ok(CommandOutput::Text(render_messages(&messages))),
            Err(e) => Ok(CommandOutput::Text(render_service_error(
                env.token, "inbox", e,
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// alerts
// ---------------------------------------------------------------------------

struct AlertsCmd;
impl Command for AlertsCmd {
    fn name(&self) -> &str {
        "alerts"
    }
    fn description(&self) -> &str {
        "Toggle new-message alert dispatches (owner only)"
    }
    fn usage(&self) -> &str {
        "alerts [status|on|off]"
    }
    fn category(&self) -> &str {
        "admin"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let token = match require_session(env, "alerts") {
            Ok(token) => token,
            Err(denied) => return Ok(CommandOutput::Text(denied)),
        };
        let Some(admin) = env.admin else {
            return Ok(CommandOutput::Text(
                "alerts: service unavailable".to_string(),
            ));
        };

        let result = match args.first().copied().unwrap_or("status") {
            "status" => admin.config(&token),
            "on" => admin.set_mode("alerts", true, &token),
            "off" => admin.set_mode("alerts", false, &token),
            other => {
                return Ok(CommandOutput::Text(format!(
                    "alerts: unknown subcommand: {other}"
                )));
            },
        };
        match result {
            Ok(config) => {
                if let Some(settings) = env.settings {
                    settings.update(|s| s.alerts_enabled = config.alerts);
                }
                Ok(CommandOutput::Text(format!(
                    "alerts are {}",
                    if config.alerts { "on" } else { "off" }
                )))
            },
            Err(e) => Ok(CommandOutput::Text(render_service_error(
                env.token, "alerts", e,
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// admin
// ---------------------------------------------------------------------------

struct AdminCmd;
impl Command for AdminCmd {
    fn name(&self) -> &str {
        "admin"
    }
    fn description(&self) -> &str {
        "Show or change site configuration (owner only)"
    }
    fn usage(&self) -> &str {
        "admin [show] | admin maintenance on|off"
    }
    fn category(&self) -> &str {
        "admin"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let token = match require_session(env, "admin") {
            Ok(token) => token,
            Err(denied) => return Ok(CommandOutput::Text(denied)),
        };
        let Some(admin) = env.admin else {
            return Ok(CommandOutput::Text(
                "admin: service unavailable".to_string(),
            ));
        };

        let result = match args {
            [] | ["show"] => admin.config(&token),
            ["maintenance", value @ ("on" | "off")] => {
                admin.set_mode("maintenance", *value == "on", &token)
            },
            _ => {
                return Ok(CommandOutput::Text(format!("usage: {}", self.usage())));
            },
        };
        match result {
            Ok(config) => {
                if let Some(settings) = env.settings {
                    settings.update(|s| {
                        s.maintenance_banner = config.maintenance;
                        s.alerts_enabled = config.alerts;
                    });
                }
                Ok(CommandOutput::Text(format!(
                    "maintenance: {}\nalerts: {}",
                    if config.maintenance { "on" } else { "off" },
                    if config.alerts { "on" } else { "off" }
                )))
            },
            Err(e) => Ok(CommandOutput::Text(render_service_error(
                env.token, "admin", e,
            ))),
        }
    }
}

/// Register the owner-gated admin commands.
pub fn register_admin_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(InboxCmd));
    reg.register(Box::new(AlertsCmd));
    reg.register(Box::new(AdminCmd));
}
