//! Keyword filtering, free-text search and title ordering over a recipe list.

use icu_collator::options::CollatorOptions;
use icu_collator::Collator;
use indexmap::IndexSet;
use std::cmp::Ordering;
use tracing::warn;

use crate::recipe::Recipe;

/// Recipes carrying every selected keyword and matching `search_term`,
/// ordered by title.
///
/// Never mutates its inputs; the same inputs always give the same output.
pub fn view<'a>(
  recipes: &'a [Recipe],
  selected_keywords: &IndexSet<String>,
  search_term: &str,
) -> Vec<&'a Recipe> {
  let term = search_term.trim().to_lowercase();

  let mut matched: Vec<&Recipe> = recipes
    .iter()
    .filter(|r| has_all_keywords(r, selected_keywords))
    .filter(|r| term.is_empty() || matches_search(r, &term))
    .collect();

  let order = title_order();
  matched.sort_by(|a, b| order(&a.title, &b.title));
  matched
}

/// AND semantics: the recipe's keyword set must contain every selected keyword.
pub fn has_all_keywords(recipe: &Recipe, selected: &IndexSet<String>) -> bool {
  if selected.is_empty() {
    return true;
  }
  if recipe.attributes.is_empty() {
    return false;
  }
  let own: IndexSet<&str> = recipe.keywords().collect();
  selected.iter().all(|k| own.contains(k.as_str()))
}

/// Case-insensitive substring match on title, ingredient names, steps, or
/// the raw attributes string. `term` must already be lower-cased.
pub fn matches_search(recipe: &Recipe, term: &str) -> bool {
  let hit = |text: &str| text.to_lowercase().contains(term);

  hit(&recipe.title)
    || recipe.ingredients.iter().any(|i| hit(&i.name))
    || recipe.steps.iter().any(|s| hit(s))
    || hit(&recipe.attributes)
}

/// Title comparator using the CLDR root collation.
///
/// Accents and case only break ties, so "Éclair" sorts among the E's and
/// "apple" comes before "Apple". Falls back to a case-folded order when the
/// collation data cannot be loaded.
pub fn title_order() -> impl Fn(&str, &str) -> Ordering {
  let collator = Collator::try_new(Default::default(), CollatorOptions::default())
    .map_err(|e| warn!(error = %e, "title collation unavailable, using case-folded order"))
    .ok();

  move |a: &str, b: &str| match &collator {
    Some(collator) => collator.compare(a, b),
    None => case_folded_order(a, b),
  }
}

fn case_folded_order(a: &str, b: &str) -> Ordering {
  a.to_lowercase()
    .cmp(&b.to_lowercase())
    .then_with(|| b.cmp(a))
}
