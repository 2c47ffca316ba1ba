//! # Kitchen Module
//!
//! The controller every surface talks to. It owns the shared [`Store`], the
//! [`ReconciliationBus`], the recipe catalog, the session ingredients and the
//! views, hands them to the components by injection and executes
//! [`KitchenCommand`]s. Storage problems raised while a command runs are
//! collected into the returned [`CommandReport`] instead of failing it.

use crate::favorites::Favorites;
use crate::menu::{available_ingredients, Menu, ShoppingListOutcome};
use crate::pantry::{Pantry, PantryGroup};
use crate::portion_scaler::rescale;
use crate::recipe_catalog::RecipeCatalog;
use crate::recipe_scorer::RecipeScorer;
use crate::reconciliation_bus::{Event, ReconciliationBus};
use crate::share_link::ShareLink;
use crate::shopping_list::{ShoppingItem, ShoppingListReconciler};
use crate::storage::Store;
use crate::storage_errors::{EngineError, StorageError};
use crate::views::{MenuView, PantryView, RecipeListView, SessionIngredients, ShoppingListView};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Everything a surface can ask the kitchen to do
#[derive(Debug, Clone, PartialEq)]
pub enum KitchenCommand {
    /// Replace the ingredients typed in this session
    SetSessionIngredients(Vec<String>),
    AddSessionIngredient(String),
    RemoveSessionIngredient(String),
    /// Add a catalog recipe to the menu by id
    AddToMenu(String),
    RemoveFromMenu(String),
    ClearMenu,
    GenerateShoppingList,
    /// Append free-form display strings to the shopping list
    AddShoppingItems(Vec<String>),
    ToggleShoppingItem(usize),
    RemoveShoppingItem(usize),
    CheckAllShoppingItems,
    ClearShoppingList,
    AddPantryItem(String),
    RemovePantryItem(String),
    AddPantryGroup(PantryGroup),
    RemovePantryGroup(PantryGroup),
    ClearPurchased,
    SetServings(u32),
    ToggleFavorite(String),
    RecordView(String),
    /// Merge the ingredients of a share query into the pantry
    ApplyShareLink(String),
}

/// What a command did
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The command had nothing to change
    Unchanged,
    Updated,
    /// New checked state of a shopping item
    Checked(bool),
    /// Number of entries the command affected
    Count(usize),
    ShoppingList(ShoppingListOutcome),
    /// Whether the recipe is a favorite afterwards
    Favorite(bool),
}

/// Result of a dispatched command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReport {
    pub outcome: CommandOutcome,
    /// Writes that were kept for this session only
    pub warnings: Vec<StorageError>,
}

impl CommandReport {
    /// Whether every write made by the command is durable
    pub fn is_durable(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// The views a kitchen keeps up to date
pub struct KitchenViews {
    pub recipes: RecipeListView,
    pub menu: MenuView,
    pub shopping: ShoppingListView,
    pub pantry: PantryView,
}

pub struct Kitchen {
    store: Rc<Store>,
    bus: ReconciliationBus,
    catalog: Rc<RecipeCatalog>,
    session: SessionIngredients,
    pantry: Pantry,
    menu: Menu,
    shopping: ShoppingListReconciler,
    favorites: Favorites,
    views: KitchenViews,
}

fn changed(flag: bool) -> CommandOutcome {
    if flag {
        CommandOutcome::Updated
    } else {
        CommandOutcome::Unchanged
    }
}

/// Rescale the quantity that follows the item name ("土豆 200g")
fn rescale_display(item: &ShoppingItem, from: u32, to: u32) -> String {
    match item.name.strip_prefix(item.pure_name.as_str()) {
        Some(amount) if !amount.trim().is_empty() => {
            format!("{} {}", item.pure_name, rescale(amount.trim(), from, to))
        }
        _ => item.name.clone(),
    }
}

impl Kitchen {
    /// Wire a kitchen over `store` and `catalog`
    ///
    /// Seeds the pantry with its defaults the first time a store is used.
    pub fn new(store: Rc<Store>, catalog: RecipeCatalog) -> Self {
        let bus = ReconciliationBus::new();
        let catalog = Rc::new(catalog);
        let session = SessionIngredients::default();

        let pantry = Pantry::new(Rc::clone(&store), bus.clone());
        pantry.ensure_initialized();

        let views = KitchenViews {
            recipes: RecipeListView::attach(Rc::clone(&store), &bus, Rc::clone(&catalog), Rc::clone(&session)),
            menu: MenuView::attach(Rc::clone(&store), &bus, Rc::clone(&session)),
            shopping: ShoppingListView::attach(Rc::clone(&store), &bus),
            pantry: PantryView::attach(Rc::clone(&store), &bus),
        };

        info!("Kitchen ready with {} recipes", catalog.len());
        Self {
            menu: Menu::new(Rc::clone(&store), bus.clone()),
            shopping: ShoppingListReconciler::new(Rc::clone(&store), bus.clone()),
            favorites: Favorites::new(Rc::clone(&store), bus.clone()),
            pantry,
            views,
            session,
            catalog,
            bus,
            store,
        }
    }

    pub fn store(&self) -> &Rc<Store> {
        &self.store
    }

    pub fn bus(&self) -> &ReconciliationBus {
        &self.bus
    }

    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    pub fn views(&self) -> &KitchenViews {
        &self.views
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn shopping(&self) -> &ShoppingListReconciler {
        &self.shopping
    }

    /// Ingredients typed in this session
    pub fn session_ingredients(&self) -> Vec<String> {
        self.session.borrow().clone()
    }

    /// Session input, pantry and purchases combined
    pub fn available_ingredients(&self) -> Vec<String> {
        available_ingredients(&self.store, &self.session.borrow())
    }

    /// Share link for the current session input and the recipes it matched
    ///
    /// The featured sample is not a match, so it shares no recipe ids.
    pub fn share_link(&self) -> ShareLink {
        let state = self.views.recipes.state();
        let recipe_ids = if state.featured {
            Vec::new()
        } else {
            state.recipes.into_iter().map(|matched| matched.recipe.id).collect()
        };
        ShareLink::new(self.session_ingredients(), recipe_ids)
    }

    /// Execute one command
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownRecipe`], [`EngineError::InvalidIndex`] and
    /// [`EngineError::InvalidIngredient`] for bad input. Failed writes are not
    /// errors; they show up in [`CommandReport::warnings`].
    pub fn dispatch(&self, command: KitchenCommand) -> Result<CommandReport, EngineError> {
        debug!("Dispatching {:?}", command);
        let outcome = self.execute(command)?;

        let warnings = self.store.take_write_failures();
        for warning in &warnings {
            warn!("Change kept for this session only: {}", warning);
        }
        Ok(CommandReport { outcome, warnings })
    }

    fn execute(&self, command: KitchenCommand) -> Result<CommandOutcome, EngineError> {
        let outcome = match command {
            KitchenCommand::SetSessionIngredients(names) => {
                let mut cleaned: Vec<String> = Vec::new();
                for name in names {
                    let name = self.pantry.validate(&name)?;
                    if !cleaned.contains(&name) {
                        cleaned.push(name);
                    }
                }
                *self.session.borrow_mut() = cleaned;
                self.bus.publish(&Event::RecipesNeedRefresh);
                CommandOutcome::Updated
            }
            KitchenCommand::AddSessionIngredient(name) => {
                let name = self.pantry.validate(&name)?;
                let added = {
                    let mut session = self.session.borrow_mut();
                    let added = !session.contains(&name);
                    if added {
                        session.push(name);
                    }
                    added
                };
                if added {
                    self.bus.publish(&Event::RecipesNeedRefresh);
                }
                changed(added)
            }
            KitchenCommand::RemoveSessionIngredient(name) => {
                let removed = {
                    let mut session = self.session.borrow_mut();
                    let before = session.len();
                    session.retain(|item| item != name.trim());
                    session.len() != before
                };
                if removed {
                    self.bus.publish(&Event::RecipesNeedRefresh);
                }
                changed(removed)
            }
            KitchenCommand::AddToMenu(recipe_id) => {
                let recipe = self
                    .catalog
                    .by_id(&recipe_id)
                    .ok_or_else(|| EngineError::UnknownRecipe(recipe_id.clone()))?;
                let scorer = RecipeScorer::new(self.store.config().cook_threshold);
                let matched = scorer.evaluate(recipe, &self.available_ingredients());
                changed(self.menu.add(&matched))
            }
            KitchenCommand::RemoveFromMenu(recipe_id) => changed(self.menu.remove(&recipe_id)),
            KitchenCommand::ClearMenu => {
                self.menu.clear();
                CommandOutcome::Updated
            }
            KitchenCommand::GenerateShoppingList => {
                let available = self.available_ingredients();
                let servings = self.store.servings();
                CommandOutcome::ShoppingList(self.menu.generate_shopping_list(&available, servings))
            }
            KitchenCommand::AddShoppingItems(displays) => {
                let appended = self.shopping.add_missing(&displays);
                self.views.shopping.refresh();
                CommandOutcome::Count(appended.len())
            }
            KitchenCommand::ToggleShoppingItem(index) => {
                let checked = self.shopping.toggle(index)?;
                // Unchecking publishes nothing
                self.views.shopping.refresh();
                CommandOutcome::Checked(checked)
            }
            KitchenCommand::RemoveShoppingItem(index) => {
                let removed = self.shopping.remove(index)?;
                debug!("Removed '{}' from the shopping list", removed.name);
                self.views.shopping.refresh();
                CommandOutcome::Updated
            }
            KitchenCommand::CheckAllShoppingItems => CommandOutcome::Count(self.shopping.check_all()),
            KitchenCommand::ClearShoppingList => {
                self.shopping.clear();
                self.views.shopping.refresh();
                CommandOutcome::Updated
            }
            KitchenCommand::AddPantryItem(name) => changed(self.pantry.add(&name)?),
            KitchenCommand::RemovePantryItem(name) => changed(self.pantry.remove(&name)),
            KitchenCommand::AddPantryGroup(group) => CommandOutcome::Count(self.pantry.add_group(group)),
            KitchenCommand::RemovePantryGroup(group) => CommandOutcome::Count(self.pantry.remove_group(group)),
            KitchenCommand::ClearPurchased => {
                self.pantry.clear_purchased();
                CommandOutcome::Updated
            }
            KitchenCommand::SetServings(servings) => self.set_servings(servings),
            KitchenCommand::ToggleFavorite(recipe_id) => {
                if self.catalog.by_id(&recipe_id).is_none() {
                    return Err(EngineError::UnknownRecipe(recipe_id));
                }
                CommandOutcome::Favorite(self.favorites.toggle(&recipe_id))
            }
            KitchenCommand::RecordView(recipe_id) => {
                if self.catalog.by_id(&recipe_id).is_none() {
                    return Err(EngineError::UnknownRecipe(recipe_id));
                }
                self.favorites.record_view(&recipe_id);
                CommandOutcome::Updated
            }
            KitchenCommand::ApplyShareLink(query) => {
                let link = ShareLink::parse(&query);
                let unknown = link
                    .recipe_ids
                    .iter()
                    .filter(|id| self.catalog.by_id(id).is_none())
                    .count();
                if unknown > 0 {
                    warn!("Share link references {} unknown recipes", unknown);
                }
                CommandOutcome::Count(self.pantry.merge(&link.ingredients))
            }
        };
        Ok(outcome)
    }

    /// Store the serving count and rescale the quantities on the shopping list
    fn set_servings(&self, servings: u32) -> CommandOutcome {
        let servings = servings.clamp(1, self.store.config().max_offered_servings);
        let previous = self.store.servings();
        if servings == previous {
            return CommandOutcome::Unchanged;
        }
        self.store.set_servings(servings);

        let list = self.shopping.items();
        if !list.is_empty() {
            let rescaled: Vec<ShoppingItem> = list
                .into_iter()
                .map(|item| ShoppingItem {
                    name: rescale_display(&item, previous, servings),
                    ..item
                })
                .collect();
            self.store.replace_shopping_list(&rescaled);
            self.bus.publish(&Event::ShoppingListReset);
        }
        info!("Servings changed from {} to {}", previous, servings);
        CommandOutcome::Updated
    }
}
