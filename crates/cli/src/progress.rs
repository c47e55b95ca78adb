use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Тип долгой операции, от него зависит вид спиннера
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressType {
    /// Построение индекса по корпусу
    Indexing,
    /// Поиск ближайших патентов
    Search,
    /// Запрос к генеративной модели (может ждать между попытками)
    Generation,
}

impl ProgressType {
    fn tick_chars(self) -> &'static str {
        match self {
            ProgressType::Indexing => "⠁⠂⠄⡀⢀⠠⠐⠈ ",
            ProgressType::Search => "◐◓◑◒ ",
            ProgressType::Generation => "⣾⣽⣻⢿⡿⣟⣯⣷ ",
        }
    }

    fn tick_interval(self) -> Duration {
        match self {
            ProgressType::Indexing => Duration::from_millis(80),
            ProgressType::Search => Duration::from_millis(120),
            ProgressType::Generation => Duration::from_millis(100),
        }
    }

    fn color(self) -> &'static str {
        match self {
            ProgressType::Indexing => "yellow",
            ProgressType::Search => "magenta",
            ProgressType::Generation => "cyan",
        }
    }

    /// Спиннер на stderr; в не-терминале indicatif ничего не рисует
    pub fn spinner(self, message: &str) -> Spinner {
        let bar = ProgressBar::new_spinner();
        let template = format!("{{spinner:.{}}} {{msg}}", self.color());
        let spinner_style = ProgressStyle::default_spinner()
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(self.tick_chars());

        bar.set_style(spinner_style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(self.tick_interval());
        Spinner { bar }
    }
}

pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn finish_success(&self, message: &str) {
        self.bar
            .finish_with_message(format!("{} {}", style("✓").green(), message));
    }

    pub fn finish_error(&self, message: &str) {
        self.bar
            .finish_with_message(format!("{} {}", style("✗").red(), message));
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}
