//! Network commands: weather, ping, htop.

use neosite_types::error::Result;

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};
use crate::takeover::{MonitorTask, PingTask, Takeover};

// ---------------------------------------------------------------------------
// weather
// ---------------------------------------------------------------------------

struct WeatherCmd;
impl Command for WeatherCmd {
    fn name(&self) -> &str {
        "weather"
    }
    fn description(&self) -> &str {
        "Current weather conditions"
    }
    fn usage(&self) -> &str {
        "weather [city]"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(weather) = env.weather else {
            return Ok(CommandOutput::Text(
                "weather: service unavailable".to_string(),
            ));
        };
        let location = if args.is_empty() {
            None
        } else {
            Some(args.join(" "))
        };
        match weather.current(location.as_deref()) {
            Ok(report) => Ok(CommandOutput::Text(format!(
                "{}: {:.0}°C, {}",
                report.location, report.temperature_c, report.condition
            ))),
            Err(e) => Ok(CommandOutput::Text(format!("Error: {e}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------------

struct PingCmd;
impl Command for PingCmd {
    fn name(&self) -> &str {
        "ping"
    }
    fn description(&self) -> &str {
        "Repeating latency probe against a host"
    }
    fn usage(&self) -> &str {
        "ping [-c count] <host>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut count = None;
        let mut host = None;
        let mut i = 0;
        while i < args.len() {
            if args[i] == "-c" {
                i += 1;
                let Some(value) = args.get(i) else {
                    return Ok(CommandOutput::Text(
                        "ping: option -c requires a count".to_string(),
                    ));
                };
                match value.parse::<u32>() {
                    Ok(n) => count = Some(n),
                    Err(_) => {
                        return Ok(CommandOutput::Text(format!(
                            "ping: invalid count '{value}'"
                        )));
                    },
                }
            } else {
                host = Some(args[i]);
            }
            i += 1;
        }
        let Some(host) = host else {
            return Ok(CommandOutput::Text(
                "usage: ping [-c count] <host>".to_string(),
            ));
        };
        if env.probe.is_none() {
            return Ok(CommandOutput::Text(
                "ping: probe service unavailable".to_string(),
            ));
        }
        *env.prompt_visible = false;
        Ok(CommandOutput::Takeover(Takeover::Ping(PingTask::new(
            host, count,
        ))))
    }
}

// ---------------------------------------------------------------------------
// htop
// ---------------------------------------------------------------------------

struct HtopCmd;
impl Command for HtopCmd {
    fn name(&self) -> &str {
        "htop"
    }
    fn description(&self) -> &str {
        "Simulated process monitor"
    }
    fn usage(&self) -> &str {
        "htop"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        *env.prompt_visible = false;
        Ok(CommandOutput::Takeover(Takeover::Monitor(MonitorTask::new())))
    }
}

/// Register the network commands.
pub fn register_net_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(WeatherCmd));
    reg.register(Box::new(PingCmd));
    reg.register(Box::new(HtopCmd));
}
