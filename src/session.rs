//! Session-scoped selection state.
//!
//! Holds the recipe corpus together with the keyword selection and search
//! term, and tells the active view about changes through one optional
//! observer instead of ambient globals.

use indexmap::IndexSet;

use crate::filter;
use crate::keywords;
use crate::recipe::Recipe;

/// Callback registered by the active view, invoked with the fresh view
/// after every selection or corpus change.
pub type ChangeObserver = Box<dyn FnMut(&[&Recipe]) + Send>;

#[derive(Default)]
pub struct Session {
  recipes: Vec<Recipe>,
  selected_keywords: IndexSet<String>,
  search_term: String,
  common_keywords: Vec<String>,
  observer: Option<ChangeObserver>,
}

impl Session {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register the observer, replacing any previous one.
  pub fn on_change(&mut self, observer: ChangeObserver) {
    self.observer = Some(observer);
  }

  pub fn clear_observer(&mut self) {
    self.observer = None;
  }

  /// Replace the corpus and rebuild the keyword vocabulary.
  pub fn set_recipes(&mut self, recipes: Vec<Recipe>) {
    self.common_keywords = keywords::extract(&recipes);
    self.recipes = recipes;
    self.notify();
  }

  /// Drop one recipe from the corpus, e.g. after a successful delete.
  ///
  /// Returns whether a recipe with that id was present.
  pub fn remove_recipe(&mut self, id: &str) -> bool {
    let before = self.recipes.len();
    self.recipes.retain(|r| r.id != id);
    let removed = self.recipes.len() != before;
    if removed {
      self.common_keywords = keywords::extract(&self.recipes);
      self.notify();
    }
    removed
  }

  /// Select `keyword` if unselected, unselect it otherwise.
  ///
  /// Returns whether the keyword is selected afterwards.
  pub fn toggle_keyword(&mut self, keyword: &str) -> bool {
    let selected = if self.selected_keywords.shift_remove(keyword) {
      false
    } else {
      self.selected_keywords.insert(keyword.to_string());
      true
    };
    self.notify();
    selected
  }

  /// Select a keyword that may not be in the vocabulary yet.
  ///
  /// Blank and already selected keywords are ignored.
  pub fn add_keyword(&mut self, keyword: &str) -> bool {
    let keyword = keyword.trim();
    if keyword.is_empty() || !self.selected_keywords.insert(keyword.to_string()) {
      return false;
    }
    self.notify();
    true
  }

  pub fn set_search_term(&mut self, term: impl Into<String>) {
    self.search_term = term.into();
    self.notify();
  }

  /// The filtered, title-ordered view of the corpus.
  pub fn view(&self) -> Vec<&Recipe> {
    filter::view(&self.recipes, &self.selected_keywords, &self.search_term)
  }

  pub fn recipes(&self) -> &[Recipe] {
    &self.recipes
  }

  pub fn selected_keywords(&self) -> &IndexSet<String> {
    &self.selected_keywords
  }

  pub fn search_term(&self) -> &str {
    &self.search_term
  }

  pub fn common_keywords(&self) -> &[String] {
    &self.common_keywords
  }

  /// Forget everything, as on sign-out. The observer stays registered.
  pub fn reset(&mut self) {
    self.recipes.clear();
    self.selected_keywords.clear();
    self.search_term.clear();
    self.common_keywords.clear();
    self.notify();
  }

  fn notify(&mut self) {
    if let Some(mut observer) = self.observer.take() {
      observer(self.view().as_slice());
      self.observer = Some(observer);
    }
  }
}

impl std::fmt::Debug for Session {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Session")
      .field("recipes", &self.recipes.len())
      .field("selected_keywords", &self.selected_keywords)
      .field("search_term", &self.search_term)
      .field("common_keywords", &self.common_keywords)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{Arc, Mutex};

  fn recipe(id: &str, title: &str, attributes: &str) -> Recipe {
    Recipe {
      id: id.to_string(),
      title: title.to_string(),
      attributes: attributes.to_string(),
      ..Default::default()
    }
  }

  fn session() -> Session {
    let mut session = Session::new();
    session.set_recipes(vec![
      recipe("1", "Apple Pie", "dessert, baking"),
      recipe("2", "Bread", "baking"),
    ]);
    session
  }

  fn titles(session: &Session) -> Vec<String> {
    session.view().iter().map(|r| r.title.clone()).collect()
  }

  #[test]
  fn test_set_recipes_rebuilds_keywords() {
    let session = session();
    assert_eq!(session.common_keywords(), ["baking", "dessert"]);
  }

  #[test]
  fn test_toggle_keyword() {
    let mut session = session();
    assert!(session.toggle_keyword("dessert"));
    assert_eq!(titles(&session), vec!["Apple Pie"]);

    assert!(!session.toggle_keyword("dessert"));
    assert_eq!(titles(&session), vec!["Apple Pie", "Bread"]);
  }

  #[test]
  fn test_selection_keeps_insertion_order() {
    let mut session = session();
    session.toggle_keyword("dessert");
    session.toggle_keyword("baking");
    let order: Vec<&str> = session.selected_keywords().iter().map(String::as_str).collect();
    assert_eq!(order, vec!["dessert", "baking"]);
  }

  #[test]
  fn test_add_keyword_ignores_blank_and_duplicates() {
    let mut session = session();
    assert!(session.add_keyword(" new "));
    assert!(!session.add_keyword("new"));
    assert!(!session.add_keyword("   "));
    assert_eq!(session.selected_keywords().len(), 1);
  }

  #[test]
  fn test_observer_sees_every_change() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut session = session();
    session.on_change(Box::new(move |view: &[&Recipe]| {
      sink.lock().unwrap().push(view.len());
    }));

    session.set_search_term("pie");
    session.set_search_term("");
    session.toggle_keyword("dessert");
    session.reset();

    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1, 0]);
  }

  #[test]
  fn test_remove_recipe_updates_vocabulary() {
    let mut session = session();
    assert!(session.remove_recipe("1"));
    assert!(!session.remove_recipe("1"));
    assert_eq!(session.common_keywords(), ["baking"]);
    assert_eq!(titles(&session), vec!["Bread"]);
  }

  #[test]
  fn test_reset_clears_selection() {
    let mut session = session();
    session.toggle_keyword("baking");
    session.set_search_term("bread");
    session.reset();

    assert!(session.recipes().is_empty());
    assert!(session.selected_keywords().is_empty());
    assert_eq!(session.search_term(), "");
    assert!(session.common_keywords().is_empty());
  }
}
