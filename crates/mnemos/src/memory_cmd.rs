// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemos memory` subcommands.

use clap::Subcommand;
use mnemos_config::MnemosConfig;
use mnemos_core::error::MnemosError;
use mnemos_core::types::{MemoryRecord, Metadata, ScoredMemory};
use mnemos_memory::{Category, Entities, MemoryStatistics, Sentiment, keys};

use crate::DEFAULT_USER;
use crate::bootstrap::build_orchestrator;

#[derive(Subcommand, Debug)]
pub enum MemoryCommand {
    /// Store a memory. It is classified unless a category is given.
    Add {
        text: String,
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
        #[arg(long)]
        category: Option<String>,
        /// Id of a memory this one supersedes; it is deleted once the new
        /// memory is stored.
        #[arg(long)]
        replaces: Option<String>,
    },
    /// Find memories relevant to a query.
    Search {
        query: String,
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
        /// Drop hits scoring below this value.
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// List a user's memories.
    List {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show one memory with its metadata.
    Show {
        id: String,
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },
    /// Memories similar to a stored one.
    Related {
        id: String,
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Delete a memory.
    Delete {
        id: String,
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },
    /// Summarize a user's memories.
    Stats {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },
    /// List the registered categories.
    Categories,
    /// Classify a text and extract its entities and sentiment without
    /// storing it.
    Analyze { text: String },
}

pub async fn run_memory(config: &MnemosConfig, action: MemoryCommand) -> Result<(), MnemosError> {
    let orchestrator = build_orchestrator(config).await?;
    let store = orchestrator.store();

    match action {
        MemoryCommand::Add {
            text,
            user,
            category,
            replaces,
        } => {
            if text.trim().is_empty() {
                return Err(MnemosError::InvalidInput("memory text is empty".to_string()));
            }
            let mut metadata = Metadata::new();
            if let Some(old) = &replaces {
                metadata.insert(keys::REPLACES.to_string(), old.as_str().into());
            }
            let id = orchestrator
                .add_memory(&text, &user, category.as_deref(), metadata)
                .await;
            println!("{id}");
            if let Some(old) = replaces
                && !store.delete(&old, &user).await
            {
                eprintln!("no memory with id {old} to replace");
            }
        }
        MemoryCommand::Search {
            query,
            user,
            limit,
            threshold,
        } => {
            let hits = store.search(&query, &user, limit, threshold).await;
            print_hits(&hits);
        }
        MemoryCommand::List { user, limit } => {
            let records = store.get_all(&user, limit).await;
            if records.is_empty() {
                println!("no memories");
            }
            for record in &records {
                println!("{}", format_record(record));
            }
        }
        MemoryCommand::Show { id, user } => {
            let record = store
                .get_by_id(&id, &user)
                .await
                .ok_or_else(|| MnemosError::InvalidInput(format!("no memory with id {id}")))?;
            print!("{}", format_details(&record));
        }
        MemoryCommand::Related { id, user, limit } => {
            let hits = store.related(&id, &user, limit).await;
            print_hits(&hits);
        }
        MemoryCommand::Delete { id, user } => {
            if store.delete(&id, &user).await {
                println!("deleted {id}");
            } else {
                println!("no memory with id {id}");
            }
        }
        MemoryCommand::Stats { user } => {
            print!("{}", format_statistics(&store.statistics(&user).await));
        }
        MemoryCommand::Categories => {
            for category in orchestrator.classifier().categories().await {
                println!("{}", format_category(&category));
            }
        }
        MemoryCommand::Analyze { text } => {
            let classifier = orchestrator.classifier();
            let category = classifier.classify(&text).await;
            let entities = classifier.extract_entities(&text).await;
            let sentiment = classifier.analyze_sentiment(&text).await;
            print!("{}", format_analysis(&category, &entities, &sentiment));
        }
    }

    Ok(())
}

fn print_hits(hits: &[ScoredMemory]) {
    if hits.is_empty() {
        println!("no matching memories");
    }
    for hit in hits {
        println!("{:.3}  {}", hit.score, format_record(&hit.memory));
    }
}

/// One-line summary: id, category, and text.
pub fn format_record(record: &MemoryRecord) -> String {
    format!("{}  [{}]  {}", record.id, record.category(), record.text)
}

/// Full record with every metadata key, one per line.
pub fn format_details(record: &MemoryRecord) -> String {
    let mut out = format!("id:    {}\nuser:  {}\ntext:  {}\n", record.id, record.user_id, record.text);
    for (key, value) in &record.metadata {
        match value.as_str() {
            Some(s) => out.push_str(&format!("{key}: {s}\n")),
            None => out.push_str(&format!("{key}: {value}\n")),
        }
    }
    out
}

pub fn format_statistics(stats: &MemoryStatistics) -> String {
    let mut out = format!("backend:       {}\ntotal:         {}\n", stats.backend_label, stats.total);
    out.push_str(&format!(
        "last updated:  {}\n",
        stats.last_updated.as_deref().unwrap_or("never")
    ));
    for (category, count) in &stats.category_counts {
        out.push_str(&format!("  {category:<16} {count}\n"));
    }
    out
}

pub fn format_analysis(category: &str, entities: &Entities, sentiment: &Sentiment) -> String {
    let mut out = format!("category:  {category}\n");
    for (label, values) in [
        ("people", &entities.people),
        ("places", &entities.places),
        ("dates", &entities.dates),
        ("orgs", &entities.organizations),
        ("keywords", &entities.keywords),
    ] {
        if !values.is_empty() {
            out.push_str(&format!("{label:<10} {}\n", values.join(", ")));
        }
    }
    out.push_str(&format!(
        "sentiment: {} ({}/5, {})\n",
        sentiment.sentiment, sentiment.intensity, sentiment.emotion
    ));
    out
}

fn format_category(category: &Category) -> String {
    format!(
        "{:<16} {}  ({})",
        category.key,
        category.name,
        category.keywords.join(", ")
    )
}
