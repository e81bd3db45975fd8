//! Terminal surfaces: the page controllers drawing to stdout/stderr.

use std::io::{self, BufRead, Write};

use libcat::{
    catalog::CatalogView,
    chat::{Author, ChatMessage, ChatSurface},
    description::DescriptionSection,
    graph::GraphPresentation,
    page::{CatalogSurface, ViewMode},
    resolver::{AttributeValue, EntityView},
    sparql::{ResultTable, SparqlSurface},
    ui::{LoadingIndicator, Prompter},
    viewer::ViewerSurface,
};

/// Alerts go to stderr; confirmations read `y`/`yes` from stdin unless `assume_yes` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter {
    pub assume_yes: bool,
}

impl Prompter for TerminalPrompter {
    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(err) => {
                tracing::warn!("Could not read confirmation: {err}");
                false
            }
        }
    }
}

/// One surface for every page; each command uses the part it needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Terminal {
    pub prompter: TerminalPrompter,
}

impl Terminal {
    pub fn new(assume_yes: bool) -> Self {
        Terminal {
            prompter: TerminalPrompter { assume_yes },
        }
    }
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

impl Prompter for Terminal {
    fn alert(&self, message: &str) {
        self.prompter.alert(message)
    }

    fn confirm(&self, message: &str) -> bool {
        self.prompter.confirm(message)
    }
}

impl LoadingIndicator for Terminal {
    fn show_loading(&self) {
        tracing::debug!("Loading...");
    }

    fn hide_loading(&self) {}
}

impl CatalogSurface for Terminal {
    fn show_catalog(&self, view: &CatalogView) {
        println!(
            "{:<12} {:<32} {:<20} {:<10} {:<20}",
            "ID", "Title", "Author", "State", "Borrower"
        );
        for row in &view.rows {
            let book = &row.book;
            let borrower = row
                .availability
                .borrowing()
                .map(|b| format!("{} ({}, due {})", b.borrower_name, b.borrower_type, b.return_date))
                .unwrap_or_default();
            println!(
                "{:<12} {:<32} {:<20} {:<10} {:<20}",
                libcat::model::id_from_uri(&book.id),
                book.title,
                or_dash(&book.author.name),
                or_dash(&book.state),
                or_dash(&borrower),
            );
        }
        println!(
            "\n{} available, {} borrowed",
            view.borrow_options.len(),
            view.return_options.len()
        );
    }

    fn show_graph(&self, graph: &GraphPresentation) {
        println!("{} nodes, {} edges", graph.nodes.len(), graph.edges.len());
        for edge in &graph.edges {
            println!("  {} --{}--> {}", edge.from, edge.label, edge.to);
        }
    }

    fn set_view_mode(&self, mode: ViewMode) {
        tracing::debug!("View mode: {mode:?}");
    }
}

impl ViewerSurface for Terminal {
    fn show_entity(&self, view: &EntityView) {
        println!("{} Details", view.entity_type);
        for attribute in &view.attributes {
            match &attribute.value {
                AttributeValue::Text(text) => println!("  {}: {}", attribute.name, text),
                AttributeValue::Link { target, label } => {
                    println!("  {}: {} <{}>", attribute.name, label, target.href())
                }
            }
        }
    }

    fn show_description(&self, section: &DescriptionSection) {
        match section {
            DescriptionSection::Ready(markdown) => println!("\nDescription\n\n{markdown}"),
            DescriptionSection::Failed(message) => {
                eprintln!("\nError fetching description: {message}")
            }
        }
    }

    fn show_error(&self, message: &str) {
        eprintln!("{message}");
    }
}

impl ChatSurface for Terminal {
    fn append_message(&self, message: &ChatMessage) {
        match (message.author, message.is_error) {
            (_, true) => eprintln!("! {}", message.text),
            (Author::Ai, false) => println!("ai> {}\n", message.text),
            (Author::User, false) => {}
        }
    }

    fn set_input_enabled(&self, enabled: bool) {
        if enabled {
            print!("you> ");
            let _ = io::stdout().flush();
        }
    }
}

impl SparqlSurface for Terminal {
    fn clear_results(&self) {}

    fn show_results(&self, table: &ResultTable) {
        println!("{}", table.headers.join("\t"));
        for row in &table.rows {
            println!("{}", row.join("\t"));
        }
    }
}
