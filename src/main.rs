//! # whattoeat CLI
//!
//! Command line front end over the kitchen: ranks recipes for the
//! ingredients at hand and manages the menu, pantry and shopping list stored
//! in the JSON file store.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use whattoeat::config::EngineConfig;
use whattoeat::kitchen::{CommandOutcome, CommandReport, Kitchen, KitchenCommand};
use whattoeat::localization::{LocalizationManager, DEFAULT_LANGUAGE};
use whattoeat::menu::ShoppingListOutcome;
use whattoeat::portion_scaler::{health_labels, rescale_nutrition, shopping_tips};
use whattoeat::recipe_catalog::RecipeCatalog;
use whattoeat::recipe_model::MatchedRecipe;
use whattoeat::recipe_scorer::RecipeScorer;
use whattoeat::storage::{FileStore, Store};

/// whattoeat - decide what to cook with what you have
#[derive(Parser)]
#[command(name = "whattoeat")]
#[command(about = "Recipe suggestions, menu and shopping list", long_about = None)]
struct Cli {
    /// Output language (zh-CN or en)
    #[arg(long, global = true, default_value = DEFAULT_LANGUAGE)]
    lang: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank recipes for the given ingredients plus the pantry
    Suggest {
        ingredients: Vec<String>,
        /// Print a share query for the ingredients and matched recipes
        #[arg(long)]
        share: bool,
    },
    /// Show one recipe scaled to the stored serving count
    Show { id: String },
    /// Search recipes by name, ingredient or tag
    Search { query: String },
    /// Show the menu, optionally changing it first
    Menu {
        #[arg(long)]
        add: Option<String>,
        #[arg(long)]
        remove: Option<String>,
        #[arg(long)]
        clear: bool,
    },
    /// Shopping list operations
    Shop {
        #[command(subcommand)]
        action: Option<ShopAction>,
    },
    /// Show the pantry, optionally changing it first
    Pantry {
        #[arg(long)]
        add: Vec<String>,
        #[arg(long)]
        remove: Vec<String>,
        /// Forget what was bought on earlier shopping runs
        #[arg(long)]
        clear_purchased: bool,
    },
    /// Set the number of people to cook for
    Servings { count: u32 },
    /// Toggle a recipe as favorite
    Favorite { id: String },
    /// Merge the ingredients of a share query into the pantry
    Import { query: String },
}

#[derive(Subcommand)]
enum ShopAction {
    /// Replace the list with what the menu still needs
    Generate,
    /// Append items such as "番茄 300g"
    Add { items: Vec<String> },
    /// Toggle an item by its index
    Check { index: usize },
    /// Check off every item
    CheckAll,
    /// Remove an item by its index
    Remove { index: usize },
    Clear,
    /// Print the list as plain text for sharing
    Export,
}

fn init_tracing(config: &EngineConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let layer = if config.json_logs {
        fmt::layer().json().with_writer(std::io::stderr).with_filter(env_filter).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).with_filter(env_filter).boxed()
    };
    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .context("Failed to initialise logging")?;
    Ok(())
}

/// Dispatch a command, printing a notice when storage is not durable
fn run(kitchen: &Kitchen, i18n: &LocalizationManager, command: KitchenCommand) -> Result<CommandReport> {
    let report = kitchen.dispatch(command)?;
    if !report.is_durable() {
        eprintln!("{}", i18n.get_message("storage-not-durable", None));
    }
    Ok(report)
}

fn print_match(i18n: &LocalizationManager, matched: &MatchedRecipe, with_missing: bool) {
    let recipe = &matched.recipe;
    println!(
        "{:>3}%  [{}] {}  ({} · {} · {})",
        (matched.match_score * 100.0).round(),
        recipe.id,
        recipe.name,
        i18n.meal_label(recipe.category),
        i18n.difficulty_label(recipe.difficulty),
        i18n.format_time(recipe.time),
    );
    if with_missing && !matched.missing_ingredients.is_empty() {
        println!("      - {}", matched.missing_ingredients.join(", "));
    }
}

fn suggest(kitchen: &Kitchen, i18n: &LocalizationManager, ingredients: Vec<String>, share: bool) -> Result<()> {
    if !ingredients.is_empty() {
        run(kitchen, i18n, KitchenCommand::SetSessionIngredients(ingredients))?;
    }

    let state = kitchen.views().recipes.state();
    info!("Showing {} recipes (featured: {})", state.recipes.len(), state.featured);

    if state.recipes.is_empty() {
        println!("{}", i18n.get_message("recipes-none", None));
    } else if state.featured {
        println!("{}", i18n.get_message("recipes-featured", None));
    } else {
        let count = state.recipes.len().to_string();
        let cookable = state.cookable_count().to_string();
        println!(
            "{}",
            i18n.get_message_with_args("recipes-found", &[("count", count.as_str()), ("cookable", cookable.as_str())])
        );
    }
    for matched in &state.recipes {
        print_match(i18n, matched, !state.featured);
    }

    if share {
        println!("{}", kitchen.share_link());
    }
    Ok(())
}

fn show(kitchen: &Kitchen, i18n: &LocalizationManager, id: String) -> Result<()> {
    run(kitchen, i18n, KitchenCommand::RecordView(id.clone()))?;
    let Some(recipe) = kitchen.catalog().by_id(&id) else {
        return Ok(());
    };
    let servings = kitchen.store().servings();
    let matched = RecipeScorer::new(kitchen.store().config().cook_threshold)
        .evaluate(recipe, &kitchen.available_ingredients());

    print_match(i18n, &matched, true);
    if let Some(nutrition) = &recipe.nutrition {
        let scaled = rescale_nutrition(nutrition, servings);
        println!(
            "      {} kcal · P {} · C {} · F {} ({}x)  {}",
            scaled.calories,
            scaled.protein,
            scaled.carbs,
            scaled.fat,
            scaled.servings,
            health_labels(nutrition).join(" ")
        );
    }
    for (number, step) in recipe.steps.iter().enumerate() {
        println!("  {}. {}", number + 1, step);
    }
    for tip in shopping_tips(&matched.missing_ingredients, servings) {
        println!("  {}", tip);
    }
    if kitchen.favorites().is_favorite(&recipe.id) {
        println!("  ★");
    }
    Ok(())
}

fn print_menu(kitchen: &Kitchen, i18n: &LocalizationManager) {
    let state = kitchen.views().menu.state();
    for item in &state.items {
        let mark = if item.is_fully_stocked { "✓" } else { "○" };
        println!("{} [{}] {}", mark, item.entry.recipe.id, item.entry.recipe.name);
        if !item.missing_ingredients.is_empty() {
            println!("      - {}", item.missing_ingredients.join(", "));
        }
    }

    let ready = state.fully_stocked_count().to_string();
    println!("{}", i18n.get_message_with_args("menu-ready-count", &[("count", ready.as_str())]));
    if state.items.is_empty() {
        return;
    }
    if state.missing.is_empty() {
        println!("{}", i18n.get_message("menu-all-stocked", None));
    } else {
        let missing = state.missing.len().to_string();
        println!("{}", i18n.get_message_with_args("menu-missing-count", &[("count", missing.as_str())]));
    }
}

fn print_shopping_list(kitchen: &Kitchen, i18n: &LocalizationManager) {
    for group in kitchen.shopping().grouped() {
        println!("{}", i18n.category_label(group.category));
        for (index, item) in &group.items {
            let mark = if item.checked { "✓" } else { "○" };
            println!("  {:>2} {} {}", index, mark, item.name);
        }
    }
    let summary = kitchen.views().shopping.state().summary();
    let total = summary.total.to_string();
    let checked = summary.checked.to_string();
    println!(
        "{}",
        i18n.get_message_with_args("shopping-summary", &[("total", total.as_str()), ("checked", checked.as_str())])
    );
}

fn shop(kitchen: &Kitchen, i18n: &LocalizationManager, action: Option<ShopAction>) -> Result<()> {
    let command = match action {
        None => None,
        Some(ShopAction::Export) => {
            println!("{}", kitchen.shopping().export_text());
            return Ok(());
        }
        Some(ShopAction::Generate) => Some(KitchenCommand::GenerateShoppingList),
        Some(ShopAction::Add { items }) => Some(KitchenCommand::AddShoppingItems(items)),
        Some(ShopAction::Check { index }) => Some(KitchenCommand::ToggleShoppingItem(index)),
        Some(ShopAction::CheckAll) => Some(KitchenCommand::CheckAllShoppingItems),
        Some(ShopAction::Remove { index }) => Some(KitchenCommand::RemoveShoppingItem(index)),
        Some(ShopAction::Clear) => Some(KitchenCommand::ClearShoppingList),
    };
    if let Some(command) = command {
        let report = run(kitchen, i18n, command)?;
        if report.outcome == CommandOutcome::ShoppingList(ShoppingListOutcome::AllStocked) {
            println!("{}", i18n.get_message("menu-all-stocked", None));
            return Ok(());
        }
        kitchen.views().shopping.take_open_request();
    }
    print_shopping_list(kitchen, i18n);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config)?;

    let backend = FileStore::open(&config.store_path)
        .with_context(|| format!("Failed to open store at {}", config.store_path.display()))?;
    let store = Rc::new(Store::new(Box::new(backend), config));
    let catalog = RecipeCatalog::builtin().context("Failed to load the recipe catalog")?;
    let kitchen = Kitchen::new(store, catalog);
    let i18n = LocalizationManager::with_language(&cli.lang)?;

    match cli.command.unwrap_or(Commands::Suggest {
        ingredients: Vec::new(),
        share: false,
    }) {
        Commands::Suggest { ingredients, share } => suggest(&kitchen, &i18n, ingredients, share)?,
        Commands::Show { id } => show(&kitchen, &i18n, id)?,
        Commands::Search { query } => {
            for recipe in kitchen.catalog().search(&query) {
                print_match(&i18n, &MatchedRecipe::full_match(recipe.clone()), false);
            }
        }
        Commands::Menu { add, remove, clear } => {
            if clear {
                run(&kitchen, &i18n, KitchenCommand::ClearMenu)?;
            }
            if let Some(id) = remove {
                run(&kitchen, &i18n, KitchenCommand::RemoveFromMenu(id))?;
            }
            if let Some(id) = add {
                run(&kitchen, &i18n, KitchenCommand::AddToMenu(id))?;
            }
            print_menu(&kitchen, &i18n);
        }
        Commands::Shop { action } => shop(&kitchen, &i18n, action)?,
        Commands::Pantry {
            add,
            remove,
            clear_purchased,
        } => {
            for name in add {
                run(&kitchen, &i18n, KitchenCommand::AddPantryItem(name))?;
            }
            for name in remove {
                run(&kitchen, &i18n, KitchenCommand::RemovePantryItem(name))?;
            }
            if clear_purchased {
                run(&kitchen, &i18n, KitchenCommand::ClearPurchased)?;
            }
            let state = kitchen.views().pantry.state();
            println!("{}", state.items.join(", "));
            if !state.purchased.is_empty() {
                println!("✓ {}", state.purchased.join(", "));
            }
        }
        Commands::Servings { count } => {
            run(&kitchen, &i18n, KitchenCommand::SetServings(count))?;
            println!("{}", kitchen.store().servings());
        }
        Commands::Favorite { id } => {
            let report = run(&kitchen, &i18n, KitchenCommand::ToggleFavorite(id.clone()))?;
            let mark = if report.outcome == CommandOutcome::Favorite(true) { "★" } else { "☆" };
            println!("{} {}", mark, id);
        }
        Commands::Import { query } => {
            let report = run(&kitchen, &i18n, KitchenCommand::ApplyShareLink(query))?;
            if let CommandOutcome::Count(added) = report.outcome {
                info!("Imported {} ingredients into the pantry", added);
            }
            println!("{}", kitchen.views().pantry.state().items.join(", "));
        }
    }
    Ok(())
}
