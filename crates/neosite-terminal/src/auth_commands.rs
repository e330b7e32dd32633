//! Session authentication commands: login, logout.

use neosite_types::error::Result;

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment, Identity, OWNER};

// ---------------------------------------------------------------------------
// login
// ---------------------------------------------------------------------------

struct LoginCmd;
impl Command for LoginCmd {
    fn name(&self) -> &str {
        "login"
    }
    fn description(&self) -> &str {
        "Authenticate as the site owner"
    }
    fn usage(&self) -> &str {
        "login <password>"
    }
    fn category(&self) -> &str {
        "auth"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&password) = args.first() else {
            return Ok(CommandOutput::Text("usage: login <password>".to_string()));
        };
        if env.identity.elevated {
            return Ok(CommandOutput::Text("already logged in".to_string()));
        }
        let Some(auth) = env.auth else {
            return Ok(CommandOutput::Text(
                "login: auth service unavailable".to_string(),
            ));
        };
        match auth.login(password) {
            Ok(token) => {
                *env.token = Some(token);
                *env.identity = Identity::owner();
                log::info!("session elevated to {OWNER}");
                Ok(CommandOutput::Text(format!(
                    "Access granted. Welcome back, {OWNER}."
                )))
            },
            Err(e) => Ok(CommandOutput::Text(format!("Error: {e}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// logout
// ---------------------------------------------------------------------------

struct LogoutCmd;
impl Command for LogoutCmd {
    fn name(&self) -> &str {
        "logout"
    }
    fn description(&self) -> &str {
        "End the owner session"
    }
    fn usage(&self) -> &str {
        "logout"
    }
    fn category(&self) -> &str {
        "auth"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if env.token.is_none() {
            return Ok(CommandOutput::Text("logout: no active session".to_string()));
        }
        *env.token = None;
        *env.identity = Identity::visitor();
        Ok(CommandOutput::Text("Logged out.".to_string()))
    }
}

/// Register the authentication commands.
pub fn register_auth_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(LoginCmd));
    reg.register(Box::new(LogoutCmd));
}
