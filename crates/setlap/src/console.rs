//! Colorful console output for setlap events.
//!
//! Provides a custom `tracing` layer that formats generation, extraction and
//! dump events with colors. Enabled by the `console` feature.

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "setlap_engine=info,setlap_dump=info";

/// Initializes console output.
///
/// Safe to call multiple times - only the first call has effect. Does nothing
/// when another global subscriber is already installed.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(SetlapConsoleLayer)
            .try_init();
    });
}

/// A tracing layer that formats setlap events with colors.
pub struct SetlapConsoleLayer;

impl<S: Subscriber> Layer<S> for SetlapConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("setlap") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    algorithm: Option<String>,
    kind: Option<String>,
    name: Option<String>,
    path: Option<String>,
    error: Option<String>,
    sets: Option<u64>,
    combinations: Option<u64>,
    queries: Option<u64>,
    rejected: Option<u64>,
    degree: Option<u64>,
    cardinality: Option<u64>,
    elements: Option<u64>,
    merges: Option<u64>,
    pruned: Option<u64>,
    duration_ms: Option<u64>,
    regenerated: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.record_str(field, s.trim_matches('"'));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "sets" => self.sets = Some(value),
            "combinations" => self.combinations = Some(value),
            "queries" => self.queries = Some(value),
            "rejected" => self.rejected = Some(value),
            "degree" => self.degree = Some(value),
            "cardinality" => self.cardinality = Some(value),
            "elements" => self.elements = Some(value),
            "merges" => self.merges = Some(value),
            "pruned" => self.pruned = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "regenerated" {
            self.regenerated = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        let slot = match field.name() {
            "event" => &mut self.event,
            "algorithm" => &mut self.algorithm,
            "kind" => &mut self.kind,
            "name" => &mut self.name,
            "path" => &mut self.path,
            "error" => &mut self.error,
            _ => return,
        };
        *slot = Some(value.to_string());
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    match v.event.as_deref().unwrap_or("") {
        "generate_end" => format_generate_end(v),
        "extract_end" => format_extract_end(v),
        "incremental_stats" => format_incremental_stats(v),
        "dump_loaded" | "static_dump_loaded" => format_dump_loaded(v),
        "dump_entry_rejected" => format_rejected(v),
        "combination" if level == Level::TRACE => format_combination(v),
        _ => String::new(),
    }
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_generate_end(v: &EventVisitor) -> String {
    format!(
        "{} {} {} combinations from {} sets ({}, {}) in {}",
        timestamp().bright_black(),
        "INFO".bright_green(),
        count(v.combinations).bright_yellow().bold(),
        count(v.sets).bright_yellow(),
        v.kind.as_deref().unwrap_or("?").white(),
        v.algorithm.as_deref().unwrap_or("?").cyan(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
    )
}

fn format_extract_end(v: &EventVisitor) -> String {
    format!(
        "{} {} extracted {} sets and {} {} combinations in {}",
        timestamp().bright_black(),
        "INFO".bright_green(),
        count(v.sets).bright_yellow(),
        count(v.combinations).bright_yellow().bold(),
        v.kind.as_deref().unwrap_or("?").white(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
    )
}

fn format_incremental_stats(v: &EventVisitor) -> String {
    format!(
        "{} {} {} elements, {} merges, {} pruned",
        timestamp().bright_black(),
        "DEBUG".bright_blue(),
        count(v.elements).white(),
        count(v.merges).white(),
        count(v.pruned).white(),
    )
}

fn format_dump_loaded(v: &EventVisitor) -> String {
    let rejected = v.rejected.unwrap_or(0);
    let rejected_text = format!("{} rejected", count(v.rejected));
    let regenerated = if v.regenerated == Some(true) {
        " (regenerated)"
    } else {
        ""
    };
    format!(
        "{} {} loaded {} sets, {} combinations{}, {} queries, {}",
        timestamp().bright_black(),
        "INFO".bright_green(),
        count(v.sets).bright_yellow(),
        count(v.combinations).bright_yellow(),
        regenerated,
        count(v.queries).white(),
        if rejected > 0 {
            rejected_text.bright_red().bold().to_string()
        } else {
            rejected_text.bright_black().to_string()
        },
    )
}

fn format_rejected(v: &EventVisitor) -> String {
    format!(
        "{} {} {} {}",
        timestamp().bright_black(),
        "WARN".bright_red(),
        v.path.as_deref().unwrap_or("?").bright_cyan(),
        v.error.as_deref().unwrap_or(""),
    )
}

fn format_combination(v: &EventVisitor) -> String {
    format!(
        "    {} {:<30} degree {:>2} | {}",
        "->".bright_blue(),
        v.name.as_deref().unwrap_or("?").white(),
        v.degree.unwrap_or(0),
        count(v.cardinality).bright_yellow(),
    )
}

fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs() % 100000;
            let millis = d.subsec_millis();
            format!("{:5}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "    0.000".to_string())
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        format!("{}m {}s", ms / 60_000, (ms % 60_000) / 1000)
    }
}
