//! Output formatter for human-readable and JSON output
//!
//! Every command prints through a `Formatter` so that `--json`, `--quiet` and
//! `--no-color` behave the same everywhere.

use console::Style;
use serde::Serialize;

use super::OutputConfig;

/// Styles for the parts of a blob listing or stat report
#[derive(Debug, Clone)]
struct Theme {
    folder: Style,
    size: Style,
    date: Style,
    key: Style,
    url: Style,
    success: Style,
    error: Style,
}

impl Theme {
    /// Colored unless the output is JSON or color is turned off
    fn for_output(config: &OutputConfig) -> Self {
        if config.no_color || config.json {
            return Self::plain();
        }
        Self {
            folder: Style::new().blue().bold(),
            size: Style::new().green(),
            date: Style::new().dim(),
            key: Style::new().cyan(),
            url: Style::new().cyan().underlined(),
            success: Style::new().green(),
            error: Style::new().red(),
        }
    }

    fn plain() -> Self {
        Self {
            folder: Style::new(),
            size: Style::new(),
            date: Style::new(),
            key: Style::new(),
            url: Style::new(),
            success: Style::new(),
            error: Style::new(),
        }
    }
}

/// Prints command results; JSON mode emits strict JSON and nothing else
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
    theme: Theme,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        let theme = Theme::for_output(&config);
        Self { config, theme }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn style_folder(&self, text: &str) -> String {
        self.theme.folder.apply_to(text).to_string()
    }

    pub fn style_size(&self, text: &str) -> String {
        self.theme.size.apply_to(text).to_string()
    }

    pub fn style_date(&self, text: &str) -> String {
        self.theme.date.apply_to(text).to_string()
    }

    pub fn style_key(&self, text: &str) -> String {
        self.theme.key.apply_to(text).to_string()
    }

    pub fn style_url(&self, text: &str) -> String {
        self.theme.url.apply_to(text).to_string()
    }

    /// Human mode only; JSON callers print the result object instead
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        println!("{} {message}", self.theme.success.apply_to("✓"));
    }

    /// Always printed to stderr, quiet or not
    pub fn error(&self, message: &str) {
        if self.config.json {
            let body = serde_json::json!({ "error": message });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&body).unwrap_or_else(|_| message.to_string())
            );
        } else {
            eprintln!("{} {message}", self.theme.error.apply_to("✗"));
        }
    }

    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Suppressed by `--quiet`
    pub fn println(&self, message: &str) {
        if !self.config.quiet {
            println!("{message}");
        }
    }
}
