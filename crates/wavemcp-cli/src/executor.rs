//! Command execution on top of a wavemcp session

use crate::cli::{Commands, Connection, PromptCommands, ResourceCommands, ToolCommands};
use crate::error::{CliError, CliResult};
use crate::formatter::Formatter;
use crate::settings::Settings;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use wavemcp_client::{ListKind, Session, SessionState};

/// Execute CLI commands
#[derive(Debug)]
pub struct CommandExecutor {
    pub formatter: Formatter,
    settings: Settings,
}

impl CommandExecutor {
    #[must_use]
    pub fn new(formatter: Formatter, settings: Settings) -> Self {
        Self {
            formatter,
            settings,
        }
    }

    /// Display an error with rich formatting
    pub fn display_error(&self, error: &CliError) {
        self.formatter.display_error(error);
    }

    /// Execute a command
    ///
    /// Every command opens its own session, runs the handshake, and
    /// disconnects before returning.
    pub async fn execute(&self, command: Commands) -> CliResult<()> {
        match command {
            Commands::Info { conn } => {
                let session = self.open(&conn).await?;
                let result = match session.server_details() {
                    Some(details) => self.formatter.display_server_info(&details),
                    None => Err(CliError::Other(
                        "server details missing after handshake".to_string(),
                    )),
                };
                finish(session, result).await
            }
            Commands::Tools(cmd) => self.execute_tool_command(cmd).await,
            Commands::Resources(cmd) => self.execute_resource_command(cmd).await,
            Commands::Prompts(cmd) => self.execute_prompt_command(cmd).await,
            Commands::Watch { conn } => {
                let session = self.open(&conn).await?;
                let result = self.watch(&session).await;
                finish(session, result).await
            }
        }
    }

    // Tool commands

    async fn execute_tool_command(&self, command: ToolCommands) -> CliResult<()> {
        match command {
            ToolCommands::List { conn } => {
                let session = self.open(&conn).await?;
                let result = match session.refresh_tools().await {
                    Ok(tools) => self.formatter.display_tools(&tools),
                    Err(e) => Err(e.into()),
                };
                finish(session, result).await
            }

            ToolCommands::Call {
                conn,
                name,
                arguments,
            } => {
                let args = parse_arguments(&arguments)?;
                let session = self.open(&conn).await?;
                let result = match session.call_tool(&name, args).await {
                    Ok(output) => self.formatter.display_tool_result(&output).and_then(|()| {
                        if output.is_error() {
                            Err(CliError::ToolFailed(name))
                        } else {
                            Ok(())
                        }
                    }),
                    Err(e) => Err(e.into()),
                };
                finish(session, result).await
            }
        }
    }

    // Resource commands

    async fn execute_resource_command(&self, command: ResourceCommands) -> CliResult<()> {
        match command {
            ResourceCommands::List { conn } => {
                let session = self.open(&conn).await?;
                let result = match session.refresh_resources().await {
                    Ok(resources) => self.formatter.display_resources(&resources),
                    Err(e) => Err(e.into()),
                };
                finish(session, result).await
            }

            ResourceCommands::Read { conn, uri } => {
                let session = self.open(&conn).await?;
                let result = match session.read_resource(&uri).await {
                    Ok(contents) => self.formatter.display_resource_contents(&contents),
                    Err(e) => Err(e.into()),
                };
                finish(session, result).await
            }
        }
    }

    // Prompt commands

    async fn execute_prompt_command(&self, command: PromptCommands) -> CliResult<()> {
        match command {
            PromptCommands::List { conn } => {
                let session = self.open(&conn).await?;
                let result = match session.refresh_prompts().await {
                    Ok(prompts) => self.formatter.display_prompts(&prompts),
                    Err(e) => Err(e.into()),
                };
                finish(session, result).await
            }

            PromptCommands::Get {
                conn,
                name,
                arguments,
            } => {
                let args = parse_arguments(&arguments)?;
                let session = self.open(&conn).await?;
                let result = match session.get_prompt(&name, args).await {
                    Ok(prompt) => self.formatter.display_prompt(&prompt),
                    Err(e) => Err(e.into()),
                };
                finish(session, result).await
            }
        }
    }

    /// Connect and run the handshake.
    async fn open(&self, conn: &Connection) -> CliResult<Session> {
        let (transport, config) = self.settings.resolve(conn)?;
        debug!(
            "Connecting to {}",
            transport.url.as_deref().unwrap_or_default()
        );

        let session = Session::websocket(config);
        session.connect(transport).await?;
        if let Err(e) = session.initialize().await {
            session.disconnect().await;
            return Err(e.into());
        }
        Ok(session)
    }

    async fn watch(&self, session: &Session) -> CliResult<()> {
        let mut notifications = session.subscribe_notifications();
        let mut state = session.watch_state();
        let mut tools = session.watch_tools();
        let mut resources = session.watch_resources();
        let mut prompts = session.watch_prompts();
        state.borrow_and_update();
        tools.borrow_and_update();
        resources.borrow_and_update();
        prompts.borrow_and_update();

        self.formatter
            .display_state(session.state(), session.endpoint().as_deref());

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("Interrupted, leaving watch");
                    return Ok(());
                }
                received = notifications.recv() => match received {
                    Ok(notification) => self.formatter.display_notification(&notification)?,
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Output fell behind, skipped {missed} notifications");
                    }
                    Err(RecvError::Closed) => return Ok(()),
                },
                Ok(()) = state.changed() => {
                    let current = *state.borrow_and_update();
                    match current {
                        SessionState::Disconnected => {
                            self.formatter
                                .display_state(current, Some("server closed the connection"));
                            return Ok(());
                        }
                        SessionState::Error => {
                            let reason = session
                                .last_error()
                                .unwrap_or_else(|| "connection failed".to_string());
                            self.formatter.display_state(current, Some(&reason));
                            return Err(CliError::ConnectionFailed(reason));
                        }
                        _ => self.formatter.display_state(current, None),
                    }
                }
                Ok(()) = tools.changed() => {
                    let tools = tools.borrow_and_update().clone();
                    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
                    self.list_update(session, ListKind::Tools, &names)?;
                }
                Ok(()) = resources.changed() => {
                    let resources = resources.borrow_and_update().clone();
                    let uris: Vec<&str> = resources.iter().map(|r| r.uri.as_str()).collect();
                    self.list_update(session, ListKind::Resources, &uris)?;
                }
                Ok(()) = prompts.changed() => {
                    let prompts = prompts.borrow_and_update().clone();
                    let names: Vec<&str> = prompts.iter().map(|p| p.name.as_str()).collect();
                    self.list_update(session, ListKind::Prompts, &names)?;
                }
            }
        }
    }

    fn list_update(&self, session: &Session, kind: ListKind, names: &[&str]) -> CliResult<()> {
        // Lists are emptied on disconnect; the state branch reports that.
        if !session.is_connected() {
            return Ok(());
        }
        self.formatter.display_list_update(kind, names)
    }
}

async fn finish(session: Session, result: CliResult<()>) -> CliResult<()> {
    session.disconnect().await;
    result
}

/// Parse `--arguments`: a JSON object, or nothing.
fn parse_arguments(raw: &str) -> CliResult<Option<Value>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "{}" {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| CliError::InvalidArguments(format!("Invalid JSON arguments: {e}")))?;
    if !value.is_object() {
        return Err(CliError::InvalidArguments(
            "arguments must be a JSON object".to_string(),
        ));
    }
    Ok(Some(value))
}
