//! Output formatting for the CLI

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};
use comfy_table::{Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;
use wavemcp_client::protocol::types::{
    CallToolResult, ContentBlock, GetPromptResult, Prompt, ReadResourceResult, Resource, Tool,
};
use wavemcp_client::{JsonRpcNotification, ListKind, ServerDetails, SessionState};

/// Format and display output based on format preference
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    format: OutputFormat,
    colored: bool,
}

impl Formatter {
    #[must_use]
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self { format, colored }
    }

    /// Display any serializable value
    pub fn display<T: Serialize + ?Sized>(&self, value: &T) -> CliResult<()> {
        match self.format {
            OutputFormat::Compact => self.display_json(value, false),
            OutputFormat::Human | OutputFormat::Json | OutputFormat::Table => {
                self.display_json(value, true)
            }
        }
    }

    /// Display tools list
    pub fn display_tools(&self, tools: &[Tool]) -> CliResult<()> {
        match self.format {
            OutputFormat::Human => {
                if tools.is_empty() {
                    self.print_info("No tools available");
                    return Ok(());
                }

                self.print_header("Available Tools");
                for tool in tools {
                    self.print_item(&tool.name, tool.description.as_deref());
                    let params = format_schema_summary(&tool.input_schema);
                    if !params.is_empty() {
                        self.print_detail("Parameters", &params);
                    }
                }
                self.print_footer(&format!("Total: {} tools", tools.len()));
                Ok(())
            }
            OutputFormat::Table => {
                let mut table = new_table(vec!["Name", "Description", "Parameters"]);
                for tool in tools {
                    let params = format_schema_summary(&tool.input_schema);
                    table.add_row(vec![
                        tool.name.as_str(),
                        tool.description.as_deref().unwrap_or("-"),
                        if params.is_empty() { "-" } else { params.as_str() },
                    ]);
                }
                println!("{table}");
                Ok(())
            }
            _ => self.display(tools),
        }
    }

    /// Display resources list
    pub fn display_resources(&self, resources: &[Resource]) -> CliResult<()> {
        match self.format {
            OutputFormat::Human => {
                if resources.is_empty() {
                    self.print_info("No resources available");
                    return Ok(());
                }

                self.print_header("Available Resources");
                for resource in resources {
                    self.print_item(&resource.uri, resource.description.as_deref());
                    self.print_detail("Name", &resource.name);
                    if let Some(mime) = &resource.mime_type {
                        self.print_detail("MIME type", mime);
                    }
                }
                self.print_footer(&format!("Total: {} resources", resources.len()));
                Ok(())
            }
            OutputFormat::Table => {
                let mut table = new_table(vec!["URI", "Name", "Description", "MIME Type"]);
                for resource in resources {
                    table.add_row(vec![
                        resource.uri.as_str(),
                        resource.name.as_str(),
                        resource.description.as_deref().unwrap_or("-"),
                        resource.mime_type.as_deref().unwrap_or("-"),
                    ]);
                }
                println!("{table}");
                Ok(())
            }
            _ => self.display(resources),
        }
    }

    /// Display prompts list
    pub fn display_prompts(&self, prompts: &[Prompt]) -> CliResult<()> {
        match self.format {
            OutputFormat::Human => {
                if prompts.is_empty() {
                    self.print_info("No prompts available");
                    return Ok(());
                }

                self.print_header("Available Prompts");
                for prompt in prompts {
                    self.print_item(&prompt.name, prompt.description.as_deref());
                    let args = format_prompt_arguments(prompt);
                    if !args.is_empty() {
                        self.print_detail("Arguments", &args);
                    }
                }
                self.print_footer(&format!("Total: {} prompts", prompts.len()));
                Ok(())
            }
            OutputFormat::Table => {
                let mut table = new_table(vec!["Name", "Description", "Arguments"]);
                for prompt in prompts {
                    let args = format_prompt_arguments(prompt);
                    table.add_row(vec![
                        prompt.name.as_str(),
                        prompt.description.as_deref().unwrap_or("-"),
                        if args.is_empty() { "None" } else { args.as_str() },
                    ]);
                }
                println!("{table}");
                Ok(())
            }
            _ => self.display(prompts),
        }
    }

    /// Display what the server reported in the handshake
    pub fn display_server_info(&self, details: &ServerDetails) -> CliResult<()> {
        match self.format {
            OutputFormat::Human | OutputFormat::Table => {
                let offered = details.capabilities.offered();

                self.print_header("Server Information");
                self.print_kv("Name", &details.server_info.name);
                self.print_kv("Version", &details.server_info.version);
                self.print_kv("Protocol", &details.protocol_version);
                self.print_kv(
                    "Capabilities",
                    if offered.is_empty() {
                        "none".to_string()
                    } else {
                        offered.join(", ")
                    }
                    .as_str(),
                );
                if let Some(instructions) = &details.instructions {
                    self.print_kv("Instructions", instructions);
                }
                Ok(())
            }
            _ => self.display(details),
        }
    }

    /// Display the result of a tool call
    pub fn display_tool_result(&self, result: &CallToolResult) -> CliResult<()> {
        match self.format {
            OutputFormat::Human | OutputFormat::Table => {
                for block in &result.content {
                    self.print_content(block);
                }
                if let Some(structured) = &result.structured_content {
                    self.print_info("Structured content:");
                    self.display_json(structured, true)?;
                }
                if result.is_error() {
                    self.print_warning("The tool reported an error");
                }
                Ok(())
            }
            _ => self.display(result),
        }
    }

    /// Display the contents of a resource
    pub fn display_resource_contents(&self, result: &ReadResourceResult) -> CliResult<()> {
        match self.format {
            OutputFormat::Human | OutputFormat::Table => {
                if result.contents.is_empty() {
                    self.print_info("Resource is empty");
                }
                for contents in &result.contents {
                    self.print_header(&contents.uri);
                    match (&contents.text, &contents.blob) {
                        (Some(text), _) => println!("{text}"),
                        (None, Some(blob)) => self.print_info(&format!(
                            "<binary {}, {} base64 bytes>",
                            contents.mime_type.as_deref().unwrap_or("data"),
                            blob.len()
                        )),
                        (None, None) => self.print_info("<no content>"),
                    }
                }
                Ok(())
            }
            _ => self.display(result),
        }
    }

    /// Display an expanded prompt
    pub fn display_prompt(&self, result: &GetPromptResult) -> CliResult<()> {
        match self.format {
            OutputFormat::Human | OutputFormat::Table => {
                if let Some(description) = &result.description {
                    self.print_info(description);
                }
                for message in &result.messages {
                    let role = serde_json::to_value(message.role)?;
                    let role = role.as_str().unwrap_or("unknown");
                    if self.colored {
                        println!("\n{}", format!("[{role}]").bright_magenta().bold());
                    } else {
                        println!("\n[{role}]");
                    }
                    self.print_content(&message.content);
                }
                Ok(())
            }
            _ => self.display(result),
        }
    }

    /// One line per notification in human mode, one JSON document otherwise
    pub fn display_notification(&self, notification: &JsonRpcNotification) -> CliResult<()> {
        match self.format {
            OutputFormat::Human | OutputFormat::Table => {
                let params = notification
                    .params
                    .as_ref()
                    .map(|p| format!(" {p}"))
                    .unwrap_or_default();
                if self.colored {
                    println!("{}{params}", notification.method.bright_cyan());
                } else {
                    println!("{}{params}", notification.method);
                }
                Ok(())
            }
            OutputFormat::Json | OutputFormat::Compact => self.display_json(notification, false),
        }
    }

    /// Report a refreshed list during `watch`
    pub fn display_list_update(&self, kind: ListKind, names: &[&str]) -> CliResult<()> {
        match self.format {
            OutputFormat::Human | OutputFormat::Table => {
                let line = format!("{kind} now: {}", names.join(", "));
                if self.colored {
                    println!("{}", line.bright_green());
                } else {
                    println!("{line}");
                }
                Ok(())
            }
            _ => self.display_json(&serde_json::json!({ (kind.to_string()): names }), false),
        }
    }

    /// Report a session state change during `watch`
    pub fn display_state(&self, state: SessionState, detail: Option<&str>) {
        let detail = detail.map(|d| format!(": {d}")).unwrap_or_default();
        if self.colored {
            eprintln!("{}{detail}", format!("session {state}").bright_black());
        } else {
            eprintln!("session {state}{detail}");
        }
    }

    /// Print an error and its hints to stderr
    pub fn display_error(&self, error: &CliError) {
        let category = error.category();
        if self.colored {
            eprintln!("{} {error}", format!("{category}:").bright_red().bold());
        } else {
            eprintln!("{category}: {error}");
        }

        let hints = error.suggestions();
        if hints.is_empty() {
            return;
        }
        eprintln!();
        for hint in hints {
            if self.colored {
                eprintln!("  {} {hint}", "hint:".yellow());
            } else {
                eprintln!("  hint: {hint}");
            }
        }
    }

    // Internal formatting helpers

    fn display_json<T: Serialize + ?Sized>(&self, value: &T, pretty: bool) -> CliResult<()> {
        let json = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        println!("{json}");
        Ok(())
    }

    fn print_content(&self, block: &ContentBlock) {
        match block {
            ContentBlock::Text(text) => println!("{}", text.text),
            ContentBlock::Image(image) => {
                self.print_info(&format!("<image {}>", image.mime_type));
            }
            ContentBlock::Audio(audio) => {
                self.print_info(&format!("<audio {}>", audio.mime_type));
            }
            ContentBlock::ResourceLink(link) => {
                self.print_info(&format!("<resource {} ({})>", link.uri, link.name));
            }
            ContentBlock::Resource(embedded) => match &embedded.resource.text {
                Some(text) => println!("{text}"),
                None => self.print_info(&format!("<resource {}>", embedded.resource.uri)),
            },
            ContentBlock::Unknown => self.print_info("<unsupported content>"),
        }
    }

    fn print_header(&self, text: &str) {
        if self.colored {
            println!("\n{}", text.bright_cyan().bold());
            println!("{}", "=".repeat(text.chars().count()).bright_cyan());
        } else {
            println!("\n{text}");
            println!("{}", "=".repeat(text.chars().count()));
        }
    }

    fn print_footer(&self, text: &str) {
        if self.colored {
            println!("\n{}", text.bright_black());
        } else {
            println!("\n{text}");
        }
    }

    fn print_info(&self, text: &str) {
        if self.colored {
            println!("{}", text.bright_blue());
        } else {
            println!("{text}");
        }
    }

    fn print_warning(&self, text: &str) {
        if self.colored {
            eprintln!("{}", text.bright_yellow());
        } else {
            eprintln!("{text}");
        }
    }

    fn print_kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("  {}: {}", key.bright_green().bold(), value);
        } else {
            println!("  {key}: {value}");
        }
    }

    fn print_item(&self, name: &str, description: Option<&str>) {
        if self.colored {
            println!("  {} {}", "•".bright_blue(), name.bright_green().bold());
        } else {
            println!("  • {name}");
        }
        if let Some(desc) = description {
            println!("    {desc}");
        }
    }

    fn print_detail(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key, value.bright_yellow());
        } else {
            println!("    {key}: {value}");
        }
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header);
    table
}

/// Property names of a JSON schema, required ones marked with `*`
fn format_schema_summary(schema: &Value) -> String {
    let Some(props) = schema.get("properties").and_then(Value::as_object) else {
        return String::new();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    props
        .keys()
        .map(|name| {
            if required.contains(&name.as_str()) {
                format!("{name}*")
            } else {
                name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_prompt_arguments(prompt: &Prompt) -> String {
    prompt
        .argument_list()
        .iter()
        .map(|arg| {
            if arg.required.unwrap_or(false) {
                format!("{}*", arg.name)
            } else {
                arg.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
