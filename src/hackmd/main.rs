use chrono::Utc;
use clap::Parser;
use colored::*;
use hackmd::api::ApiClient;
use hackmd::config::{mask_token, ConfigStore, Credential};
use hackmd::error::{HackmdError, Result};
use hackmd::model::Note;
use hackmd::templates::TemplateStore;
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

mod args;
use args::{
    AuthCommands, Cli, Commands, ConfigCommands, NoteCommands, NoteFormat, TeamCommands,
    TeamFormat, TemplateCommands,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "✗".red(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Auth(AuthCommands::Login { token, profile }) => handle_login(token, profile),
        Commands::Auth(AuthCommands::Status) => handle_status(),
        Commands::Team(TeamCommands::List { format }) => handle_team_list(format),
        Commands::Config(ConfigCommands::Set { key, value }) => handle_config_set(key, value),
        Commands::Note(NoteCommands::Create {
            title,
            content,
            template,
            vars,
        }) => handle_note_create(title, content, template, vars),
        Commands::Note(NoteCommands::List { format, limit }) => handle_note_list(format, limit),
        Commands::Note(NoteCommands::Get { id }) => handle_note_get(id),
        Commands::Template(TemplateCommands::List) => handle_template_list(),
        Commands::Template(TemplateCommands::Init) => handle_template_init(),
        Commands::Template(TemplateCommands::Create { name, file }) => {
            handle_template_create(name, file)
        }
    }
}

fn config_store() -> ConfigStore {
    ConfigStore::new(ConfigStore::default_dir())
}

fn template_store() -> TemplateStore {
    TemplateStore::new(TemplateStore::default_dir())
}

/// Resolve the active credential, failing before any network traffic.
fn require_credential() -> Result<Credential> {
    config_store()
        .resolve_active()?
        .ok_or(HackmdError::NotAuthenticated)
}

fn handle_login(token: Option<String>, profile: String) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => prompt_token()?,
    };

    let credential = config_store().login(&token, &profile)?;
    println!("{} Authentication successful", "✓".green());
    println!("{} Token saved to profile '{}'", "✓".green(), profile);

    verify_token(&credential);
    Ok(())
}

fn prompt_token() -> Result<String> {
    println!("HackMD CLI - Authentication");
    println!("{}", "-".repeat(40));
    print!("Enter your HackMD API token: ");
    io::stdout().flush()?;
    Ok(rpassword::read_password()?)
}

/// Best-effort `/me` check for user feedback. The credential is already
/// persisted; failures here warn and never roll a login back.
fn verify_token(credential: &Credential) {
    let client = match ApiClient::new(credential) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("\n{} Could not verify token: {}", "⚠".yellow(), e);
            return;
        }
    };

    match client.me() {
        Ok(user) => {
            println!(
                "\n{} Logged in as: {}",
                "✓".green(),
                user.name.as_deref().unwrap_or("Unknown")
            );
            println!("  Email: {}", user.email.as_deref().unwrap_or("N/A"));
        }
        Err(HackmdError::Remote { status: 401, .. }) => {
            eprintln!("\n{} Error: Invalid token", "✗".red());
        }
        Err(HackmdError::Remote { status, .. }) => {
            eprintln!(
                "\n{} Warning: Unexpected response ({})",
                "⚠".yellow(),
                status
            );
        }
        Err(e) => {
            eprintln!("\n{} Could not verify token: {}", "⚠".yellow(), e);
        }
    }
}

fn handle_status() -> Result<()> {
    let status = config_store().status()?;
    println!("{} Authenticated", "✓".green());
    println!("  Active profile: {}", status.profile);
    println!("  Token: {}", mask_token(&status.credential.api_token));

    verify_token(&status.credential);
    Ok(())
}

fn handle_team_list(format: TeamFormat) -> Result<()> {
    let credential = require_credential()?;
    let teams = ApiClient::new(&credential)?.teams()?;

    match format {
        TeamFormat::Json => println!("{}", serde_json::to_string_pretty(&teams)?),
        TeamFormat::Table => {
            if teams.is_empty() {
                println!("No teams found");
                return Ok(());
            }
            println!("Your teams:");
            for team in &teams {
                println!(
                    "  • {} (path: {}, id: {})",
                    team.name.as_deref().unwrap_or("Unknown").bold(),
                    team.path.as_deref().unwrap_or(""),
                    team.id.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

fn handle_config_set(key: String, value: String) -> Result<()> {
    config_store().set_value(&key, &value)?;
    if key == "default.team" {
        println!("{} Set default team to: {}", "✓".green(), value);
    } else {
        println!("{} Set {} to: {}", "✓".green(), key, value);
    }
    Ok(())
}

fn handle_note_create(
    title: String,
    content: Option<String>,
    template: Option<String>,
    vars: Vec<String>,
) -> Result<()> {
    let credential = require_credential()?;

    let content = if let Some(name) = template {
        let mut variables = parse_vars(&vars)?;
        variables
            .entry("title".to_string())
            .or_insert_with(|| title.clone());
        template_store()
            .render(&name, &variables)?
            .ok_or(HackmdError::TemplateNotFound(name))?
    } else {
        content.unwrap_or_else(|| format!("# {}\n\nCreated with HackMD CLI", title))
    };

    let note = ApiClient::new(&credential)?.create_note(&title, &content)?;
    println!("{} Note created successfully!", "✓".green());
    println!("  ID: {}", note.id.as_deref().unwrap_or("unknown"));
    println!("  Title: {}", title);
    if let Some(link) = &note.publish_link {
        println!("  URL: {}", link);
    }
    Ok(())
}

fn parse_vars(vars: &[String]) -> Result<BTreeMap<String, String>> {
    let mut parsed = BTreeMap::new();
    for var in vars {
        match var.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                parsed.insert(key.to_string(), value.to_string());
            }
            _ => {
                return Err(HackmdError::Validation(format!(
                    "Invalid variable '{}' (expected KEY=VALUE)",
                    var
                )));
            }
        }
    }
    Ok(parsed)
}

fn handle_note_list(format: NoteFormat, limit: usize) -> Result<()> {
    let credential = require_credential()?;
    let mut notes = ApiClient::new(&credential)?.notes()?;
    notes.truncate(limit);

    match format {
        NoteFormat::Json => println!("{}", serde_json::to_string_pretty(&notes)?),
        NoteFormat::Csv => print_notes_csv(&notes),
        NoteFormat::Table => print_notes_table(&notes),
    }
    Ok(())
}

fn handle_note_get(id: String) -> Result<()> {
    let credential = require_credential()?;
    let note = ApiClient::new(&credential)?.note(&id)?;

    match &note.content {
        // raw text, so the output can be piped into a file or pager
        Some(content) => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
        None => println!("{}", serde_json::to_string_pretty(&note)?),
    }
    Ok(())
}

fn handle_template_list() -> Result<()> {
    let names = template_store().list()?;
    if names.is_empty() {
        println!("No templates found. Run: hackmd template init");
        return Ok(());
    }
    for name in &names {
        println!("{}", name);
    }
    Ok(())
}

fn handle_template_init() -> Result<()> {
    let store = template_store();
    let created = store.initialize()?;
    if created.is_empty() {
        println!("All built-in templates already present");
    } else {
        for name in &created {
            println!("{} Created template: {}", "✓".green(), name);
        }
    }
    println!("Templates directory: {}", store.dir().display());
    Ok(())
}

fn handle_template_create(name: String, file: Option<PathBuf>) -> Result<()> {
    let content = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let path = template_store().save(&name, &content)?;
    println!("{} Template saved to {}", "✓".green(), path.display());
    Ok(())
}

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 16;

fn print_notes_table(notes: &[Note]) {
    if notes.is_empty() {
        println!("No notes found");
        return;
    }

    println!("Your notes:");
    for note in notes {
        let id = note.id.as_deref().unwrap_or("unknown");
        let time_ago = note
            .last_changed_at
            .or(note.created_at)
            .map(format_time_ago)
            .unwrap_or_default();

        let fixed_width = 4 + id.width() + 2 + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let title = truncate_to_width(note.display_title(), available);
        let padding = available.saturating_sub(title.width());

        println!(
            "  • {}{} {}  {}",
            title.bold(),
            " ".repeat(padding),
            id.dimmed(),
            format!("{:>width$}", time_ago, width = TIME_WIDTH).dimmed()
        );
    }
}

fn print_notes_csv(notes: &[Note]) {
    if notes.is_empty() {
        return;
    }
    println!("id,title,createdAt,lastChangedAt");
    for note in notes {
        // commas in titles would shift columns; swap them rather than quote
        let title = note.display_title().replace(',', ";");
        println!(
            "{},{},{},{}",
            note.id.as_deref().unwrap_or(""),
            title,
            note.created_at.map(|t| t.to_string()).unwrap_or_default(),
            note.last_changed_at
                .map(|t| t.to_string())
                .unwrap_or_default()
        );
    }
}

fn format_time_ago(millis: i64) -> String {
    let Some(then) = chrono::DateTime::from_timestamp_millis(millis) else {
        return String::new();
    };
    let duration = Utc::now().signed_duration_since(then);
    timeago::Formatter::new().convert(duration.to_std().unwrap_or_default())
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}
