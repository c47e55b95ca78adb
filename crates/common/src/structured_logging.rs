use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::io::{self, Write};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

/// Структурированная запись лога в JSON формате
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredLogEntry {
    /// Временная метка в ISO 8601 формате
    pub timestamp: String,
    /// Уровень логирования
    pub level: String,
    /// Целевой модуль/компонент
    pub target: String,
    /// Основное сообщение
    pub message: String,
    /// Дополнительные поля
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
    /// Контекст выполнения
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ExecutionContext>,
    /// Метрики производительности
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,
}

/// Контекст выполнения для отслеживания
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Версия приложения
    pub app_version: String,
    /// ID процесса
    pub pid: u32,
    /// ID потока
    pub thread_id: String,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            pid: std::process::id(),
            thread_id: format!("{:?}", std::thread::current().id()),
        }
    }
}

/// Метрики производительности
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Длительность операции в миллисекундах
    pub duration_ms: Option<u64>,
    /// Количество обработанных элементов
    pub items_processed: Option<u64>,
}

/// Форматтер для JSON логов.
///
/// Пишет в stderr: stdout зарезервирован под ответы CLI.
pub struct JsonFormatter;

impl<S> Layer<S> for JsonFormatter
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let performance = visitor.extract_performance_metrics();

        let entry = StructuredLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            level: level_name(event.metadata().level()).to_string(),
            target: event.metadata().target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
            context: Some(ExecutionContext::default()),
            performance,
        };

        if let Ok(json) = serde_json::to_string(&entry) {
            let _ = writeln!(io::stderr(), "{}", json);
        }
    }
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

/// Визитор для извлечения полей из события
#[derive(Default)]
struct JsonVisitor {
    message: Option<String>,
    fields: HashMap<String, Value>,
}

impl Visit for JsonVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(
                field.name().to_string(),
                Value::String(format!("{:?}", value)),
            );
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.fields.insert(field.name().to_string(), Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), Value::Bool(value));
    }
}

impl JsonVisitor {
    /// Извлечь метрики производительности из полей
    fn extract_performance_metrics(&self) -> Option<PerformanceMetrics> {
        let metrics = PerformanceMetrics {
            duration_ms: self.fields.get("duration_ms").and_then(Value::as_u64),
            items_processed: self.fields.get("items_count").and_then(Value::as_u64),
        };

        if metrics.duration_ms.is_some() || metrics.items_processed.is_some() {
            Some(metrics)
        } else {
            None
        }
    }
}

/// Конфигурация для structured logging
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Минимальный уровень логирования (перекрывается RUST_LOG)
    pub level: Level,
    /// Вывод в JSON формате
    pub json_output: bool,
    /// Включить цветной вывод (только для non-JSON)
    pub color_output: bool,
    /// Включить номера строк
    pub include_line_numbers: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_output: false,
            color_output: true,
            include_line_numbers: cfg!(debug_assertions),
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_json_output(mut self, json_output: bool) -> Self {
        self.json_output = json_output;
        self
    }
}

/// Инициализировать structured logging
pub fn init_structured_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    if config.json_output {
        // JSON формат для production
        let subscriber = Registry::default().with(env_filter).with(JsonFormatter);

        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        // Человекочитаемый формат для разработки
        let fmt_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_line_number(config.include_line_numbers)
            .with_ansi(config.color_output)
            .with_span_events(FmtSpan::CLOSE);

        let subscriber = Registry::default().with(env_filter).with(fmt_layer);

        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

/// Вспомогательная структура для измерения времени операций
pub struct OperationTimer {
    start: std::time::Instant,
    operation_name: String,
    fields: HashMap<String, Value>,
}

impl OperationTimer {
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation_name: operation_name.into(),
            fields: HashMap::new(),
        }
    }

    pub fn add_field(&mut self, key: impl Into<String>, value: impl Serialize) {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn finish(self) {
        tracing::info!(
            operation = %self.operation_name,
            duration_ms = self.elapsed_ms(),
            success = true,
            fields = ?self.fields,
            "Operation completed"
        );
    }

    pub fn finish_with_result<T>(self, result: Result<T, impl std::fmt::Display>) {
        let duration_ms = self.elapsed_ms();

        match result {
            Ok(_) => {
                tracing::info!(
                    operation = %self.operation_name,
                    duration_ms = duration_ms,
                    success = true,
                    fields = ?self.fields,
                    "Operation completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    operation = %self.operation_name,
                    duration_ms = duration_ms,
                    success = false,
                    error = %e,
                    fields = ?self.fields,
                    "Operation failed"
                );
            }
        }
    }
}
