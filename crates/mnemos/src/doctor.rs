// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemos doctor` command implementation.
//!
//! Checks that the ledger is readable and that the gateway and the vector
//! index answer their health probes.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mnemos_config::MnemosConfig;
use mnemos_core::error::MnemosError;
use mnemos_core::traits::PluginAdapter;
use mnemos_core::types::HealthStatus;
use mnemos_memory::Ledger;
use mnemos_ollama::OllamaProvider;
use mnemos_qdrant::QdrantIndex;

/// Status of a diagnostic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn finish(
        name: &'static str,
        status: CheckStatus,
        message: impl Into<String>,
        start: Instant,
    ) -> Self {
        Self {
            name,
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `mnemos doctor` command. With `plain`, output is uncolored.
pub async fn run_doctor(config: &MnemosConfig, plain: bool) -> Result<(), MnemosError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        CheckResult::finish("Configuration", CheckStatus::Pass, "valid", Instant::now()),
        check_ledger(&config.memory.ledger_path).await,
        check_gateway(config).await,
        check_vector_index(config).await,
    ];

    println!();
    println!("  mnemos doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render_line(result, use_color));
    }
    println!();

    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    match issues {
        0 => println!("  All checks passed."),
        1 => println!("  1 issue found."),
        n => println!("  {n} issues found."),
    }
    println!();

    Ok(())
}

/// Formats one result line, with or without ANSI colors.
pub fn render_line(result: &CheckResult, use_color: bool) -> String {
    use colored::Colorize;

    let ms = result.duration.as_millis();
    let name = result.name;
    if !use_color {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        return format!("    {tag} {name:<16} {} ({ms}ms)", result.message);
    }

    let (symbol, message) = match result.status {
        CheckStatus::Pass => ("✓".green(), result.message.normal()),
        CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
        CheckStatus::Fail => ("✗".red(), result.message.red()),
    };
    format!("    {symbol} {name:<16} {message} ({ms}ms)")
}

async fn check_ledger(ledger_path: &str) -> CheckResult {
    let start = Instant::now();
    if !Path::new(ledger_path).exists() {
        return CheckResult::finish(
            "Ledger",
            CheckStatus::Warn,
            format!("not found: {ledger_path} (created on first write)"),
            start,
        );
    }

    match Ledger::open(ledger_path).await {
        Ok(ledger) => {
            let users = ledger.user_count().await;
            CheckResult::finish(
                "Ledger",
                CheckStatus::Pass,
                format!("{users} user(s) in {ledger_path}"),
                start,
            )
        }
        Err(e) => CheckResult::finish("Ledger", CheckStatus::Fail, e.to_string(), start),
    }
}

async fn check_gateway(config: &MnemosConfig) -> CheckResult {
    let start = Instant::now();
    match OllamaProvider::new(&config.ollama) {
        Ok(provider) => probe("Ollama", &provider, start).await,
        Err(e) => CheckResult::finish("Ollama", CheckStatus::Fail, e.to_string(), start),
    }
}

async fn check_vector_index(config: &MnemosConfig) -> CheckResult {
    let start = Instant::now();
    if !config.vector.enabled {
        return CheckResult::finish(
            "Vector index",
            CheckStatus::Pass,
            "disabled (ledger only)",
            start,
        );
    }

    let embedder = match OllamaProvider::new(&config.ollama) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            return CheckResult::finish("Vector index", CheckStatus::Fail, e.to_string(), start);
        }
    };
    match QdrantIndex::new(&config.vector, embedder) {
        Ok(index) => probe("Vector index", &index, start).await,
        Err(e) => CheckResult::finish("Vector index", CheckStatus::Fail, e.to_string(), start),
    }
}

async fn probe(name: &'static str, adapter: &dyn PluginAdapter, start: Instant) -> CheckResult {
    match adapter.health_check().await {
        Ok(status) => {
            let (status, message) = classify_health(status);
            CheckResult::finish(name, status, message, start)
        }
        Err(e) => CheckResult::finish(name, CheckStatus::Fail, e.to_string(), start),
    }
}

fn classify_health(status: HealthStatus) -> (CheckStatus, String) {
    match status {
        HealthStatus::Healthy => (CheckStatus::Pass, "reachable".to_string()),
        HealthStatus::Degraded(reason) => (CheckStatus::Warn, reason),
        HealthStatus::Unhealthy(reason) => (CheckStatus::Fail, reason),
    }
}
