//! Gus CLI - chat with Gus and generate content from the terminal
//!
//! Usage:
//!   gus chat [--transcript chat.html]
//!   gus generate --prompt "Tulis tentang sabar" [--persona gus_baha]
//!   gus personas
//!   gus health
//!
//! Configuration is read from `--config`, else `./gus.toml` when present.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use gus::clipboard::SystemClipboard;
use gus::generator::form::{GeneratorForm, Persona};
use gus::input::{classify, KeyAction, KeyPress};
use gus::model::{ChatMessage, GenerationResult, Role};
use gus::render::{RenderOptions, THINKING_TEXT};
use gus::toast::{Severity, Toast, ToastQueue};
use gus::view::{ChatView, CritiquePanel, GeneratorView, HtmlChatView, PanelState};
use gus::{Backend, ChatController, GeneratorController, GusConfig, HttpBackend};
use parking_lot::Mutex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "gus.toml";

#[derive(Parser)]
#[command(name = "gus", version, about = "Chat with Gus and generate content from the terminal")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Server base URL, overrides the config file
    #[arg(long, env = "GUS_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat. End a line with `\` to continue the message.
    Chat {
        /// Write the chat as HTML to this file on exit
        #[arg(long)]
        transcript: Option<PathBuf>,
    },

    /// Generate content, then critique, refine or copy it
    Generate {
        #[arg(short, long)]
        prompt: String,

        #[arg(long, default_value = "gus_baha")]
        persona: Persona,

        /// Instructions for the custom persona
        #[arg(long)]
        custom: Option<String>,

        /// Do not ground the content in the knowledge base
        #[arg(long)]
        no_ragie: bool,

        /// Knowledge base query, defaults to the prompt
        #[arg(long)]
        query: Option<String>,

        #[arg(long, default_value_t = 0.7)]
        temperature: f32,

        #[arg(long, default_value_t = 1000)]
        max_tokens: u32,
    },

    /// List the available personas
    Personas,

    /// Check that the server is up
    Health,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<GusConfig> {
    let mut config = match &cli.config {
        Some(path) => GusConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG).exists() => GusConfig::load(DEFAULT_CONFIG)
            .with_context(|| format!("Failed to load config file: {}", DEFAULT_CONFIG))?,
        None => GusConfig::default(),
    };

    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Command::Personas = cli.command {
        print_personas();
        return Ok(());
    }

    let config = load_config(&cli)?;
    let backend = Arc::new(
        HttpBackend::with_timeout(&config.base_url, config.http.timeout())
            .context("Failed to create HTTP client")?,
    );
    info!(base_url = %backend.base_url(), "Using Gus server");

    match cli.command {
        Command::Chat { transcript } => run_chat(backend, &config, transcript).await,
        Command::Generate {
            prompt,
            persona,
            custom,
            no_ragie,
            query,
            temperature,
            max_tokens,
        } => {
            let form = GeneratorForm {
                prompt,
                persona,
                custom_prompt: custom.unwrap_or_default(),
                use_ragie: !no_ragie,
                ragie_query: query.unwrap_or_default(),
                temperature,
                max_tokens,
            };
            run_generate(backend, &config, form).await
        }
        Command::Health => run_health(backend.as_ref()).await,
        Command::Personas => Ok(()),
    }
}

fn print_personas() {
    eprintln!("{}", "Personas:".bold());
    for persona in Persona::ALL {
        eprintln!(
            "  {:<14} {}",
            persona.id().cyan(),
            persona.description().dimmed()
        );
    }
}

async fn run_health(backend: &HttpBackend) -> Result<()> {
    let status = backend
        .health()
        .await
        .with_context(|| format!("Health check failed for {}", backend.base_url()))?;

    let service = status.service.as_deref().unwrap_or("gus");
    if status.is_ok() {
        eprintln!("{} {} is up ({})", "✓".green(), service, backend.base_url());
        Ok(())
    } else {
        anyhow::bail!("{} reported status '{}'", service, status.status)
    }
}

fn print_box_header(title: &str, subtitle: &str) {
    eprintln!();
    eprintln!(
        "{}",
        "╭──────────────────────────────────────────────────────────────╮".blue()
    );
    eprintln!("{}  {}", "│".blue(), title.bold());
    eprintln!("{}  {}", "│".blue(), subtitle.dimmed());
    eprintln!(
        "{}",
        "╰──────────────────────────────────────────────────────────────╯".blue()
    );
    eprintln!();
}

async fn prompt_line(lines: &mut Lines<BufReader<Stdin>>, prompt: &str) -> Result<Option<String>> {
    eprint!("{} ", prompt.green().bold());
    let _ = std::io::stderr().flush();
    lines.next_line().await.context("Failed to read from stdin")
}

// ----------------------------------------------------------------------------
// Chat
// ----------------------------------------------------------------------------

/// Prints the conversation, optionally mirroring it into an HTML document
struct TerminalChatView {
    input: Mutex<String>,
    mirror: Option<HtmlChatView>,
}

impl TerminalChatView {
    fn set_input(&self, text: &str) {
        *self.input.lock() = text.to_string();
        if let Some(mirror) = &self.mirror {
            mirror.set_input(text);
        }
    }
}

impl ChatView for TerminalChatView {
    fn input_text(&self) -> String {
        self.input.lock().clone()
    }

    fn clear_input(&self) {
        self.input.lock().clear();
        if let Some(mirror) = &self.mirror {
            mirror.clear_input();
        }
    }

    fn focus_input(&self) {
        if let Some(mirror) = &self.mirror {
            mirror.focus_input();
        }
    }

    fn set_send_enabled(&self, enabled: bool) {
        if let Some(mirror) = &self.mirror {
            mirror.set_send_enabled(enabled);
        }
    }

    fn append_message(&self, message: &ChatMessage) {
        match message.role {
            // Already on screen as typed
            Role::User => {}
            Role::Bot => {
                eprintln!();
                for line in message.text.lines() {
                    println!("{} {}", "│".cyan(), line);
                }
                if !message.sources.is_empty() {
                    eprintln!("{} {}", "│".cyan(), "Sumber / Sources:".yellow());
                    for source in &message.sources {
                        let meta = source.meta();
                        eprintln!(
                            "{}   {} {} {}",
                            "│".cyan(),
                            "▸".yellow(),
                            source.title.bold(),
                            if meta.is_empty() {
                                String::new()
                            } else {
                                format!("({})", meta).dimmed().to_string()
                            }
                        );
                        eprintln!("{}     {}", "│".cyan(), source.url.dimmed());
                    }
                }
                eprintln!();
            }
            Role::Error => eprintln!("{} {}", "✗".red(), message.text.red()),
        }
        if let Some(mirror) = &self.mirror {
            mirror.append_message(message);
        }
    }

    fn show_thinking(&self) {
        eprintln!("{}", THINKING_TEXT.dimmed());
        if let Some(mirror) = &self.mirror {
            mirror.show_thinking();
        }
    }

    fn hide_thinking(&self) {
        if let Some(mirror) = &self.mirror {
            mirror.hide_thinking();
        }
    }

    fn reset_to_welcome(&self) {
        print_box_header(
            "Assalamu'alaikum! 👋",
            "Ayo, mau tanya apa? Jangan susah-susah, santai aja. (You can also ask in English!)",
        );
        eprintln!(
            "{}",
            "⚠️  Chatbot edukasi bergaya Gus Baha, bukan fatwa resmi.".yellow()
        );
        eprintln!(
            "{}",
            "   /new starts over, /quit exits, end a line with \\ to keep typing.".dimmed()
        );
        eprintln!();
        if let Some(mirror) = &self.mirror {
            mirror.reset_to_welcome();
        }
    }
}

async fn run_chat(
    backend: Arc<HttpBackend>,
    config: &GusConfig,
    transcript: Option<PathBuf>,
) -> Result<()> {
    let options = RenderOptions {
        trust_server_html: config.render.trust_server_html,
    };
    let view = Arc::new(TerminalChatView {
        input: Mutex::new(String::new()),
        mirror: transcript.as_ref().map(|_| HtmlChatView::new(options)),
    });
    let controller = ChatController::new(backend, view.clone(), config.chat.clone())
        .with_analytics(config.analytics.enabled);
    view.reset_to_welcome();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = String::new();

    loop {
        let prompt = if pending.is_empty() { "›" } else { "…" };
        let Some(line) = prompt_line(&mut lines, prompt).await? else {
            break;
        };

        // A trailing backslash is the terminal's Shift+Enter
        let continued = line.ends_with('\\');
        match classify(KeyPress::enter(continued)) {
            KeyAction::InsertNewline => {
                pending.push_str(&line[..line.len() - 1]);
                pending.push('\n');
                continue;
            }
            KeyAction::Send => pending.push_str(&line),
            KeyAction::Default => continue,
        }

        let message = std::mem::take(&mut pending);
        match message.trim() {
            "/quit" | "/exit" => break,
            "/new" => {
                controller.new_chat();
                continue;
            }
            _ => {}
        }

        view.set_input(&message);
        let outcome = controller.send_message().await;
        debug!(?outcome, "Message handled");
    }

    if let (Some(path), Some(mirror)) = (transcript, &view.mirror) {
        std::fs::write(&path, mirror.document())
            .with_context(|| format!("Failed to write transcript: {}", path.display()))?;
        eprintln!("{} {}", "Transcript written to".dimmed(), path.display());
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Generate
// ----------------------------------------------------------------------------

struct TerminalGeneratorView {
    form: GeneratorForm,
    toasts: Mutex<ToastQueue>,
}

impl TerminalGeneratorView {
    fn new(form: GeneratorForm, toast_duration: Duration) -> Self {
        Self {
            form,
            toasts: Mutex::new(ToastQueue::new(toast_duration)),
        }
    }

    /// Toasts still within their display time at `now`
    fn active_toasts(&self, now: Instant) -> Vec<Toast> {
        let mut toasts = self.toasts.lock();
        let expired = toasts.expire(now);
        if !expired.is_empty() {
            debug!(count = expired.len(), "Toasts expired");
        }
        toasts.active().cloned().collect()
    }

    fn print_active_toasts(&self) {
        let active = self.active_toasts(Instant::now());
        if active.is_empty() {
            return;
        }
        eprintln!("{}", "Recent:".dimmed());
        for toast in &active {
            eprintln!("  {}", toast_line(toast).dimmed());
        }
    }
}

impl GeneratorView for TerminalGeneratorView {
    fn form(&self) -> GeneratorForm {
        self.form.clone()
    }

    fn set_panel(&self, state: PanelState) {
        if state == PanelState::Loading {
            eprintln!("{}", "Generating...".dimmed());
        }
    }

    fn show_content(&self, result: &GenerationResult) {
        eprintln!();
        eprintln!(
            "{}",
            "════════════════════════════════════════════════════════════════".green()
        );
        println!("{}", result.content);
        eprintln!(
            "{}",
            "════════════════════════════════════════════════════════════════".green()
        );
        if let Some(usage) = &result.usage {
            eprintln!("{} {}", "Tokens:".dimmed(), usage.summary());
        }
    }

    fn set_critique_panel(&self, panel: CritiquePanel) {
        match panel {
            CritiquePanel::Hidden => {}
            CritiquePanel::Loading => eprintln!("{}", "Critiquing...".dimmed()),
            CritiquePanel::Shown(text) => {
                eprintln!();
                eprintln!(
                    "{}",
                    "┌─ Critique ─────────────────────────────────────────────".magenta()
                );
                for line in text.lines() {
                    eprintln!("{} {}", "│".magenta(), line);
                }
                eprintln!(
                    "{}",
                    "└────────────────────────────────────────────────────────".magenta()
                );
            }
            CritiquePanel::Error(message) => eprintln!("{} {}", "✗".red(), message.red()),
        }
    }

    fn set_critique_enabled(&self, enabled: bool) {
        debug!(enabled, "Critique control toggled");
    }

    fn show_toast(&self, toast: Toast) {
        eprintln!("{}", toast_line(&toast));
        self.toasts.lock().push(toast, Instant::now());
    }
}

fn toast_line(toast: &Toast) -> ColoredString {
    match toast.severity {
        Severity::Success => format!("✓ {}", toast.message).green(),
        Severity::Error => format!("✗ {}", toast.message).red(),
        Severity::Warning => format!("! {}", toast.message).yellow(),
        Severity::Info => format!("i {}", toast.message).blue(),
    }
}

async fn run_generate(
    backend: Arc<HttpBackend>,
    config: &GusConfig,
    form: GeneratorForm,
) -> Result<()> {
    let bindings = form.bindings();
    print_box_header(
        &format!("Gus Generator - {}", form.persona),
        bindings.persona_description,
    );
    eprintln!(
        "{} {}   {} {}   {} {}",
        "Prompt:".dimmed(),
        bindings.char_count_label,
        "Temperature:".dimmed(),
        bindings.temperature_label,
        "Max tokens:".dimmed(),
        bindings.max_tokens_label
    );

    let view = Arc::new(TerminalGeneratorView::new(form, config.toast.duration()));
    let controller = GeneratorController::new(backend, view.clone(), Arc::new(SystemClipboard));

    controller.generate().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        view.print_active_toasts();
        eprintln!(
            "{}",
            "[c]ritique  [r]efine  [g]enerate again  co[p]y  [q]uit".dimmed()
        );
        let Some(line) = prompt_line(&mut lines, "›").await? else {
            break;
        };
        let outcome = match line.trim() {
            "c" | "critique" => controller.critique().await,
            "r" | "refine" => controller.refine().await,
            "g" | "generate" => controller.generate().await,
            "p" | "copy" => controller.copy(),
            "q" | "quit" | "exit" => break,
            "" => continue,
            other => {
                eprintln!("{} Unknown command: {}", "!".yellow(), other);
                continue;
            }
        };
        debug!(?outcome, "Command handled");
    }
    Ok(())
}
