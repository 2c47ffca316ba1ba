//! # Views Module
//!
//! Derived views over the shared store: recipe list, menu, shopping list and
//! pantry. Each view subscribes to the topics that can invalidate it and, on
//! notification, re-reads the [`Store`] and recomputes its state. Event
//! payloads are never used as data.

use crate::menu::{available_ingredients, evaluate_entries, summarize_missing, MenuItemStatus, MissingIngredient};
use crate::recipe_catalog::RecipeCatalog;
use crate::recipe_model::MatchedRecipe;
use crate::recipe_scorer::RecipeScorer;
use crate::reconciliation_bus::{Event, ReconciliationBus, Subscription, Topic};
use crate::shopping_list::{ListSummary, ShoppingItem};
use crate::storage::Store;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Session ingredients shared between the controller and the views
pub type SessionIngredients = Rc<RefCell<Vec<String>>>;

/// Subscribe `state` to each topic, recomputing it with `recompute`
fn subscribe_all<T, F>(bus: &ReconciliationBus, topics: &[Topic], state: &Rc<RefCell<T>>, recompute: F) -> Vec<Subscription>
where
    T: 'static,
    F: Fn(&mut T) + Clone + 'static,
{
    topics
        .iter()
        .map(|topic| {
            let state = Rc::clone(state);
            let recompute = recompute.clone();
            bus.subscribe(*topic, move |event: &Event| {
                trace!("View refresh on {}", event.topic());
                recompute(&mut state.borrow_mut());
            })
        })
        .collect()
}

fn scoring_input(store: &Store, session: &SessionIngredients) -> Vec<String> {
    let mut available = session.borrow().clone();
    for name in store.pantry() {
        if !available.contains(&name) {
            available.push(name);
        }
    }
    available
}

/// State of the recipe list
#[derive(Debug, Clone, Default)]
pub struct RecipeListState {
    /// Ranked matches, or featured recipes when nothing is available
    pub recipes: Vec<MatchedRecipe>,
    /// Whether `recipes` is the featured sample
    pub featured: bool,
}

impl RecipeListState {
    /// Number of recipes the scorer considers cookable
    pub fn cookable_count(&self) -> usize {
        self.recipes.iter().filter(|r| r.is_likely_cookable()).count()
    }
}

/// Ranked recipes for session input plus pantry
pub struct RecipeListView {
    state: Rc<RefCell<RecipeListState>>,
    subscriptions: Vec<Subscription>,
    store: Rc<Store>,
    catalog: Rc<RecipeCatalog>,
    session: SessionIngredients,
}

impl RecipeListView {
    pub fn attach(
        store: Rc<Store>,
        bus: &ReconciliationBus,
        catalog: Rc<RecipeCatalog>,
        session: SessionIngredients,
    ) -> Self {
        let state = Rc::new(RefCell::new(RecipeListState::default()));
        let recompute = {
            let store = Rc::clone(&store);
            let catalog = Rc::clone(&catalog);
            let session = Rc::clone(&session);
            move |state: &mut RecipeListState| Self::compute(&store, &catalog, &session, state)
        };
        let subscriptions = subscribe_all(
            bus,
            &[Topic::PantryChanged, Topic::RecipesNeedRefresh],
            &state,
            recompute,
        );

        let view = Self {
            state,
            subscriptions,
            store,
            catalog,
            session,
        };
        view.refresh();
        view
    }

    fn compute(store: &Store, catalog: &RecipeCatalog, session: &SessionIngredients, state: &mut RecipeListState) {
        let available = scoring_input(store, session);
        if available.is_empty() {
            state.recipes = catalog.featured_as_matches(store.config().featured_count);
            state.featured = true;
        } else {
            let scorer = RecipeScorer::new(store.config().cook_threshold);
            state.recipes = scorer.score(catalog.recipes(), &available);
            state.featured = false;
        }
    }

    /// Recompute now
    pub fn refresh(&self) {
        Self::compute(&self.store, &self.catalog, &self.session, &mut self.state.borrow_mut());
    }

    pub fn state(&self) -> RecipeListState {
        self.state.borrow().clone()
    }

    pub fn detach(self) {
        self.subscriptions.into_iter().for_each(Subscription::unsubscribe);
    }
}

/// State of the menu
#[derive(Debug, Clone, Default)]
pub struct MenuState {
    pub items: Vec<MenuItemStatus>,
    pub missing: Vec<MissingIngredient>,
}

impl MenuState {
    /// Number of menu dishes with every ingredient available
    pub fn fully_stocked_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_fully_stocked).count()
    }
}

/// Live menu status
pub struct MenuView {
    state: Rc<RefCell<MenuState>>,
    subscriptions: Vec<Subscription>,
    store: Rc<Store>,
    session: SessionIngredients,
}

impl MenuView {
    pub fn attach(store: Rc<Store>, bus: &ReconciliationBus, session: SessionIngredients) -> Self {
        let state = Rc::new(RefCell::new(MenuState::default()));
        let recompute = {
            let store = Rc::clone(&store);
            let session = Rc::clone(&session);
            move |state: &mut MenuState| Self::compute(&store, &session, state)
        };
        let subscriptions = subscribe_all(
            bus,
            &[
                Topic::MenuChanged,
                Topic::PantryChanged,
                Topic::PurchaseMade,
                Topic::RecipesNeedRefresh,
            ],
            &state,
            recompute,
        );

        let view = Self {
            state,
            subscriptions,
            store,
            session,
        };
        view.refresh();
        view
    }

    fn compute(store: &Store, session: &SessionIngredients, state: &mut MenuState) {
        let available = available_ingredients(store, &session.borrow());
        state.items = evaluate_entries(store.menu(), &available);
        state.missing = summarize_missing(&state.items);
    }

    pub fn refresh(&self) {
        Self::compute(&self.store, &self.session, &mut self.state.borrow_mut());
    }

    pub fn state(&self) -> MenuState {
        self.state.borrow().clone()
    }

    pub fn detach(self) {
        self.subscriptions.into_iter().for_each(Subscription::unsubscribe);
    }
}

/// State of the shopping list
#[derive(Debug, Clone, Default)]
pub struct ShoppingListState {
    pub items: Vec<ShoppingItem>,
    /// Set when someone asked for the list to be shown
    pub open_requested: bool,
}

impl ShoppingListState {
    pub fn summary(&self) -> ListSummary {
        ListSummary {
            total: self.items.len(),
            checked: self.items.iter().filter(|item| item.checked).count(),
        }
    }
}

/// Shopping list contents plus the open request flag
pub struct ShoppingListView {
    state: Rc<RefCell<ShoppingListState>>,
    subscriptions: Vec<Subscription>,
    store: Rc<Store>,
}

impl ShoppingListView {
    pub fn attach(store: Rc<Store>, bus: &ReconciliationBus) -> Self {
        let state = Rc::new(RefCell::new(ShoppingListState::default()));
        let recompute = {
            let store = Rc::clone(&store);
            move |state: &mut ShoppingListState| state.items = store.shopping_list()
        };
        let mut subscriptions = subscribe_all(
            bus,
            &[Topic::ShoppingListReset, Topic::PantryChanged, Topic::PurchaseMade],
            &state,
            recompute,
        );

        let open_state = Rc::clone(&state);
        let open_store = Rc::clone(&store);
        subscriptions.push(bus.subscribe(Topic::ShoppingListOpenRequest, move |_| {
            let mut state = open_state.borrow_mut();
            state.items = open_store.shopping_list();
            state.open_requested = true;
        }));

        let view = Self {
            state,
            subscriptions,
            store,
        };
        view.refresh();
        view
    }

    pub fn refresh(&self) {
        self.state.borrow_mut().items = self.store.shopping_list();
    }

    pub fn state(&self) -> ShoppingListState {
        self.state.borrow().clone()
    }

    /// Consume the open request, returning whether one was pending
    pub fn take_open_request(&self) -> bool {
        std::mem::take(&mut self.state.borrow_mut().open_requested)
    }

    pub fn detach(self) {
        self.subscriptions.into_iter().for_each(Subscription::unsubscribe);
    }
}

/// State of the pantry panel
#[derive(Debug, Clone, Default)]
pub struct PantryState {
    pub items: Vec<String>,
    pub purchased: Vec<String>,
}

/// Pantry contents and purchases
pub struct PantryView {
    state: Rc<RefCell<PantryState>>,
    subscriptions: Vec<Subscription>,
    store: Rc<Store>,
}

impl PantryView {
    pub fn attach(store: Rc<Store>, bus: &ReconciliationBus) -> Self {
        let state = Rc::new(RefCell::new(PantryState::default()));
        let recompute = {
            let store = Rc::clone(&store);
            move |state: &mut PantryState| {
                state.items = store.pantry();
                state.purchased = store.purchased();
            }
        };
        let subscriptions = subscribe_all(bus, &[Topic::PantryChanged, Topic::PurchaseMade], &state, recompute);

        let view = Self {
            state,
            subscriptions,
            store,
        };
        view.refresh();
        view
    }

    pub fn refresh(&self) {
        let mut state = self.state.borrow_mut();
        state.items = self.store.pantry();
        state.purchased = self.store.purchased();
    }

    pub fn state(&self) -> PantryState {
        self.state.borrow().clone()
    }

    pub fn detach(self) {
        self.subscriptions.into_iter().for_each(Subscription::unsubscribe);
    }
}
