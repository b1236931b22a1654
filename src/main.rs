use colored::*;
use rgenprompt::{
    logger,
    models::{AspectRatio, GeminiModel},
    prompt::styles::style_labels,
    Config, FormInput, FormLayout, GeminiClient, Interaction, PromptStudio, SessionHistory,
    TextClient,
};
use std::io::{self, ErrorKind};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

/// Line-oriented prompts on stdin. End of input surfaces as `UnexpectedEof`.
struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn ask(&mut self, label: &str) -> io::Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{} ", label.bright_white().bold()).as_bytes())
            .await?;
        stdout.flush().await?;

        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(io::Error::new(ErrorKind::UnexpectedEof, "input closed")),
        }
    }

    async fn ask_or(&mut self, label: &str, default: &str) -> io::Result<String> {
        let answer = self.ask(&format!("{} [{}]:", label, default)).await?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    async fn confirm(&mut self, label: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = self.ask(&format!("{} ({}):", label, hint)).await?;
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => println!("{}", "Please answer y or n.".yellow()),
            }
        }
    }

    /// Numbered pick list; returns the chosen index.
    async fn choose(&mut self, label: &str, options: &[String], default: usize) -> io::Result<usize> {
        println!("{}", label.bright_white().bold());
        for (i, option) in options.iter().enumerate() {
            println!("  {:>2}. {}", i + 1, option);
        }
        loop {
            let answer = self.ask_or("Choice", &(default + 1).to_string()).await?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => println!(
                    "{}",
                    format!("Enter a number between 1 and {}.", options.len()).yellow()
                ),
            }
        }
    }
}

async fn read_form(prompter: &mut Prompter, config: &Config) -> io::Result<FormInput> {
    let mut input = FormInput::new(prompter.ask("Describe your image:").await?);

    input.photorealistic = prompter.confirm("Photorealistic?", false).await?;
    if !input.photorealistic {
        input.styles_enabled = prompter.confirm("Use a style?", true).await?;
        if input.styles_enabled {
            input.list_all_styles = prompter.confirm("List all styles?", false).await?;
            let labels = style_labels(input.list_all_styles);
            let choice = prompter.choose("Style:", &labels, 0).await?;
            input.style_label = labels.get(choice).cloned();
        }

        if config.form_layout == FormLayout::Standalone {
            read_background(prompter, &mut input).await?;
        }

        input.advanced_enabled = prompter.confirm("Advanced options?", false).await?;
        if input.advanced_enabled {
            if config.form_layout == FormLayout::Nested {
                read_background(prompter, &mut input).await?;
            }
            input.four_k = prompter.confirm("4K resolution?", true).await?;
            input.bokeh = prompter.confirm("Bokeh effect?", false).await?;

            input.aspect_ratio_enabled = prompter.confirm("Set an aspect ratio?", false).await?;
            if input.aspect_ratio_enabled {
                let labels: Vec<String> = AspectRatio::ALL.iter().map(|r| r.label().to_string()).collect();
                input.aspect_ratio = AspectRatio::ALL[prompter.choose("Aspect ratio:", &labels, 0).await?];
            }

            input.extra_enabled = prompter.confirm("Extra requirements?", false).await?;
            if input.extra_enabled {
                input.extra_requirements = prompter.ask("Extra requirements:").await?;
            }
        }
    }

    let models: Vec<String> = GeminiModel::ALL
        .iter()
        .map(|m| format!("{} ({})", m.display_name(), m.id()))
        .collect();
    let current = GeminiModel::ALL
        .iter()
        .position(|m| *m == config.default_model)
        .unwrap_or(0);
    input.model = GeminiModel::ALL[prompter.choose("Model:", &models, current).await?]
        .id()
        .to_string();

    Ok(input)
}

async fn read_background(prompter: &mut Prompter, input: &mut FormInput) -> io::Result<()> {
    input.background_enabled = prompter.confirm("Solid background?", true).await?;
    if input.background_enabled {
        let current = input.background_color.clone();
        input.background_color = prompter.ask_or("Background color", &current).await?;
    }
    Ok(())
}

fn show_interaction(interaction: &Interaction) {
    println!();
    println!("{}", "Input prompt".bright_blue().bold());
    println!("{}", interaction.input_prompt);
    println!();
    println!("{}", "Enhanced prompt".bright_green().bold());
    println!("{}", interaction.formatted_prompt);
    if let Some(explanation) = &interaction.explanation {
        println!();
        println!("{}", "Explanation".bright_magenta().bold());
        println!("{}", explanation);
    }
    println!();
}

fn show_history(history: &SessionHistory) {
    if history.is_empty() {
        println!("{}", "No prompts yet.".bright_black());
        return;
    }
    for (i, entry) in history.latest_first().iter().enumerate() {
        println!(
            "{} {} {}",
            format!("#{}", i + 1).bright_yellow().bold(),
            entry.timestamp.bright_black(),
            entry.model.display_name().bright_black()
        );
        println!("{}", entry.formatted_prompt);
        println!();
    }
}

fn save_entry(history: &SessionHistory, arg: &str) {
    let index = match arg.trim().parse::<usize>() {
        Ok(index) => index,
        Err(_) => {
            println!("{}", "Usage: save <n>".yellow());
            return;
        }
    };
    match history.export(index, Path::new(".")) {
        Ok(path) => println!("{} {}", "Saved to".green(), path.display()),
        Err(e) => println!("{}", e.user_message().red()),
    }
}

async fn run_session(studio: &PromptStudio, history: &SessionHistory) -> io::Result<()> {
    let mut prompter = Prompter::new();

    loop {
        let command = prompter
            .ask("\n[new] prompt, [history], save <n>, [quit] >")
            .await?;
        let (name, arg) = command.split_once(' ').unwrap_or((command.as_str(), ""));

        match name.to_ascii_lowercase().as_str() {
            "" | "new" | "n" => {
                let input = read_form(&mut prompter, studio.config()).await?;
                println!("{}", "Generating...".bright_black());
                match studio.submit(input).await {
                    Ok(interaction) => show_interaction(&interaction),
                    Err(message) => println!("{}", message.red()),
                }
            }
            "history" | "h" => show_history(history),
            "save" | "s" => save_entry(history, arg),
            "quit" | "q" | "exit" => return Ok(()),
            other => println!("{}", format!("Unknown command '{}'", other).yellow()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init()?;
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    if !dotenv_loaded {
        log::debug!("No .env file found, using process environment");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            eprintln!("{}", e.user_message().red());
            return Err(e.into());
        }
    };
    logger::log_config_info(&config);

    log::debug!("📚 Available models:");
    for (id, name, provider) in TextClient::supported_models() {
        log::debug!("  {} - {} ({})", id, name, provider);
    }

    let client = GeminiClient::new(config.gemini.clone())?;
    let history = Arc::new(SessionHistory::new());
    let studio = PromptStudio::new(client, history.clone(), config);

    println!("{}", "🎨 RGenPrompt".bright_cyan().bold());
    println!("Describe an image and get back a richer prompt for it.");

    match run_session(&studio, &history).await {
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {}
        other => other?,
    }

    log::info!("👋 Session ended with {} prompt(s) in history", history.len());
    Ok(())
}
