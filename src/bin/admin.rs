//! CLI administration tool for the coin catalog.
//!
//! Drives the same catalog controller as the dashboard, with the terminal as
//! its view: snapshots print as tables, notifications print as colored
//! lines, and removals ask for confirmation.
//!
//! # Usage
//!
//! ```bash
//! # List every coin, or one category
//! cargo run --bin catalog-admin -- list
//! cargo run --bin catalog-admin -- list --category silver
//!
//! # Add a coin (missing fields are prompted for)
//! cargo run --bin catalog-admin -- add --title "Silver Dollar" --category silver
//!
//! # Edit or remove a coin by id
//! cargo run --bin catalog-admin -- edit -NxYz...
//! cargo run --bin catalog-admin -- remove -NxYz... --yes
//!
//! # Follow live changes until Ctrl+C
//! cargo run --bin catalog-admin -- watch
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_HOST`/`DB_USER`/`DB_PASSWORD`/`DB_NAME` (required)
//! - `NOTIFY_DISMISS_SECS` - how long notifications stay up (default 4)

use coin_catalog::application::services::CatalogService;
use coin_catalog::config::load_from_env;
use coin_catalog::domain::entities::EntryId;
use coin_catalog::domain::repositories::CatalogStore;
use coin_catalog::server::build_store;
use coin_catalog::ui::{
    CardGrid, CatalogController, CategoryFilter, Control, EntryForm, FilterButton, Notification,
    NotificationKind, View,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// CLI tool for managing the coin catalog.
#[derive(Parser)]
#[command(name = "catalog-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List coins
    List {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Add a coin
    Add(AddArgs),

    /// Edit a coin interactively
    Edit {
        /// Id of the coin to edit
        id: String,
    },

    /// Remove a coin
    Remove {
        /// Id of the coin to remove
        id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Print the catalog again on every change until Ctrl+C
    Watch {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,
    },
}

/// Fields for a new coin. Missing ones are prompted for.
#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    image: Option<String>,
    /// Weight in grams
    #[arg(long)]
    weight: Option<String>,
    #[arg(long)]
    year: Option<String>,
}

/// Terminal implementation of the controller's view.
struct TerminalView {
    show_grid: bool,
    assume_yes: bool,
    edit_form: Mutex<Option<EntryForm>>,
}

impl TerminalView {
    fn new(show_grid: bool, assume_yes: bool) -> Self {
        Self {
            show_grid,
            assume_yes,
            edit_form: Mutex::new(None),
        }
    }

    fn take_edit_form(&self) -> Option<EntryForm> {
        self.edit_form
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl View for TerminalView {
    /// # Output Format
    ///
    /// ```text
    ///   Title                    Category     Year   Weight     ID
    ///   ─────────────────────────────────────────────────────────────────────────
    ///   Silver Dollar            silver       1921   26.73g     -NxYz...
    /// ```
    fn render_grid(&self, grid: &CardGrid) {
        if !self.show_grid {
            return;
        }

        println!();
        if grid.is_empty() {
            println!("{}", "  No coins to show".yellow());
            println!();
            return;
        }

        println!(
            "  {:<24} {:<12} {:<6} {:<10} {}",
            "Title".bright_white().bold(),
            "Category".bright_white().bold(),
            "Year".bright_white().bold(),
            "Weight".bright_white().bold(),
            "ID".bright_white().bold()
        );
        println!("  {}", "─".repeat(75).bright_black());

        for card in &grid.cards {
            println!(
                "  {:<24} {:<12} {:<6} {:<10} {}",
                card.title.cyan(),
                card.category,
                card.manufacture_year,
                card.weight_label(),
                card.id.bright_black()
            );
        }

        println!();
        println!("  Total: {}", grid.len().to_string().bright_white().bold());
    }

    fn render_filters(&self, buttons: &[FilterButton]) {
        if !self.show_grid {
            return;
        }

        let line: Vec<String> = buttons
            .iter()
            .map(|b| {
                if b.active {
                    format!("[{}]", b.label).bright_yellow().bold().to_string()
                } else {
                    b.label.bright_black().to_string()
                }
            })
            .collect();
        println!("  Categories: {}", line.join(" "));
        println!();
    }

    fn set_loading(&self, loading: bool) {
        if loading {
            println!("{}", "⏳ Loading catalog...".bright_black());
        }
    }

    fn set_busy(&self, control: Control, busy: bool) {
        if busy {
            let label = match control {
                Control::Submit => "Adding...",
                Control::Save => "Saving...",
            };
            println!("{}", label.bright_black());
        }
    }

    fn show_notification(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Success => {
                println!("{}", format!("✅ {}", notification.message).green().bold())
            }
            NotificationKind::Error => {
                eprintln!("{}", format!("❌ {}", notification.message).red().bold())
            }
        }
    }

    fn dismiss_notification(&self, _id: u64) {}

    fn reset_add_form(&self) {}

    fn open_edit(&self, form: &EntryForm) {
        *self.edit_form.lock().unwrap_or_else(PoisonError::into_inner) = Some(form.clone());
    }

    fn close_edit(&self) {}

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = load_from_env()?;
    if !config.is_persistent() {
        anyhow::bail!("DATABASE_URL (or DB_NAME with DB_USER and DB_PASSWORD) must be set");
    }

    let store = build_store(&config)
        .await
        .context("Failed to open the catalog store")?;
    let admin = Admin {
        service: Arc::new(CatalogService::new(store)),
        dismiss_after: config.notify_dismiss(),
    };

    let succeeded = match cli.command {
        Commands::List { category } => {
            let view = Arc::new(TerminalView::new(true, false));
            show_catalog(&admin, view, category, false).await
        }
        Commands::Watch { category } => {
            let view = Arc::new(TerminalView::new(true, false));
            show_catalog(&admin, view, category, true).await
        }
        Commands::Add(args) => add_entry(&admin, args).await?,
        Commands::Edit { id } => edit_entry(&admin, EntryId::new(id)).await?,
        Commands::Remove { id, yes } => {
            let view = Arc::new(TerminalView::new(false, yes));
            let controller = admin.controller(view);
            controller.confirm_remove(&EntryId::new(id)).await.is_ok()
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// What every command needs to build a controller.
struct Admin {
    service: Arc<CatalogService<dyn CatalogStore>>,
    dismiss_after: Duration,
}

impl Admin {
    fn controller(&self, view: Arc<TerminalView>) -> CatalogController<TerminalView> {
        CatalogController::new(self.service.clone(), view).with_dismiss_after(self.dismiss_after)
    }
}

/// Prints the catalog once, or on every change when `follow` is set.
///
/// Returns `false` when the catalog could not be loaded.
async fn show_catalog(
    admin: &Admin,
    view: Arc<TerminalView>,
    category: Option<String>,
    follow: bool,
) -> bool {
    println!("{}", "📋 Coin Catalog".bright_blue().bold());

    let controller = admin
        .controller(view)
        .with_filter(CategoryFilter::from(category));
    controller.initialize().await;
    if !controller.loaded().await {
        controller.shutdown().await;
        return false;
    }

    if follow {
        println!("{}", "Watching for changes, press Ctrl+C to stop".bright_black());
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for Ctrl+C: {e}");
        }
    }

    controller.shutdown().await;
    true
}

/// Prompts for any field not given on the command line.
fn prompt(label: &str, given: Option<String>, initial: &str) -> Result<String> {
    match given {
        Some(value) => Ok(value),
        None => Ok(Input::new()
            .with_prompt(label)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()?),
    }
}

/// Adds a coin through the controller.
async fn add_entry(admin: &Admin, args: AddArgs) -> Result<bool> {
    println!("{}", "🪙 Add Coin".bright_blue().bold());
    println!();

    let form = EntryForm {
        title: prompt("Title", args.title, "")?,
        description: prompt("Description", args.description, "")?,
        category: prompt("Category", args.category, "")?,
        image: prompt("Image URL", args.image, "")?,
        weight: prompt("Weight (g)", args.weight, "")?,
        manufacture_year: prompt("Year", args.year, "")?,
    };

    let view = Arc::new(TerminalView::new(false, false));
    let controller = admin.controller(view);

    match controller.start_add(form).await {
        Ok(id) => {
            println!("  ID: {}", id.to_string().bright_yellow());
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

/// Edits a coin: every field is prompted for, pre-filled with its value.
async fn edit_entry(admin: &Admin, id: EntryId) -> Result<bool> {
    println!("{}", "✏️  Edit Coin".bright_blue().bold());
    println!();

    let view = Arc::new(TerminalView::new(false, false));
    let controller = admin.controller(view.clone());
    controller.initialize().await;
    if !controller.loaded().await || controller.start_edit_by_id(&id).is_err() {
        controller.shutdown().await;
        return Ok(false);
    }
    let current = view.take_edit_form().unwrap_or_default();

    let form = EntryForm {
        title: prompt("Title", None, &current.title)?,
        description: prompt("Description", None, &current.description)?,
        category: prompt("Category", None, &current.category)?,
        image: prompt("Image URL", None, &current.image)?,
        weight: prompt("Weight (g)", None, &current.weight)?,
        manufacture_year: prompt("Year", None, &current.manufacture_year)?,
    };

    let result = controller.confirm_edit(form).await;
    controller.shutdown().await;

    Ok(result.is_ok())
}
