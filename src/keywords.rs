//! Vocabularies derived from the recipe corpus.

use indexmap::IndexMap;
use std::collections::BTreeSet;

use crate::recipe::Recipe;

/// Keywords ordered by how many recipes use them, most used first.
///
/// Ties keep the order in which keywords were first seen in `recipes`.
pub fn extract(recipes: &[Recipe]) -> Vec<String> {
  let mut counts: IndexMap<&str, usize> = IndexMap::new();
  for recipe in recipes {
    for keyword in recipe.keywords() {
      *counts.entry(keyword).or_insert(0) += 1;
    }
  }

  let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
  // Stable, so first-seen order survives among equal counts
  ranked.sort_by(|a, b| b.1.cmp(&a.1));
  ranked.into_iter().map(|(k, _)| k.to_string()).collect()
}

/// Unique ingredient names across all recipes, sorted.
///
/// Used to offer completions when editing a recipe.
pub fn ingredient_names(recipes: &[Recipe]) -> Vec<String> {
  let names: BTreeSet<&str> = recipes
    .iter()
    .flat_map(|r| r.ingredients.iter())
    .map(|i| i.name.trim())
    .filter(|n| !n.is_empty())
    .collect();
  names.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::recipe::Ingredient;

  fn recipe(title: &str, attributes: &str) -> Recipe {
    Recipe {
      id: title.to_lowercase(),
      title: title.to_string(),
      attributes: attributes.to_string(),
      ..Default::default()
    }
  }

  #[test]
  fn test_ranked_by_count() {
    let recipes = vec![
      recipe("Apple Pie", "dessert, baking"),
      recipe("Bread", "baking"),
    ];
    assert_eq!(extract(&recipes), vec!["baking", "dessert"]);
  }

  #[test]
  fn test_ties_keep_first_seen_order() {
    let recipes = vec![
      recipe("A", "soup, quick"),
      recipe("B", "vegan, soup"),
      recipe("C", "quick"),
      recipe("D", "vegan"),
    ];
    // All three appear twice; order of first appearance wins
    assert_eq!(extract(&recipes), vec!["soup", "quick", "vegan"]);
  }

  #[test]
  fn test_skips_blank_keywords() {
    let recipes = vec![recipe("A", ""), recipe("B", " , spicy, ")];
    assert_eq!(extract(&recipes), vec!["spicy"]);
    assert!(extract(&[recipe("C", "")]).is_empty());
  }

  #[test]
  fn test_extract_is_idempotent() {
    let recipes = vec![
      recipe("A", "x, y"),
      recipe("B", "y, z"),
      recipe("C", "z, y"),
    ];
    let first = extract(&recipes);
    assert_eq!(first, extract(&recipes));
    assert_eq!(first, vec!["y", "z", "x"]);
  }

  #[test]
  fn test_reordering_identical_recipes_is_stable() {
    let a = recipe("A", "x, y");
    let b = recipe("B", "x, y");
    assert_eq!(extract(&[a.clone(), b.clone()]), extract(&[b, a]));
  }

  #[test]
  fn test_ingredient_names_unique_and_sorted() {
    let mut soup = recipe("Soup", "");
    soup.ingredients = vec![
      Ingredient {
        name: "onion".to_string(),
        ..Default::default()
      },
      Ingredient {
        name: " carrot ".to_string(),
        ..Default::default()
      },
      Ingredient::default(),
    ];
    let mut stew = recipe("Stew", "");
    stew.ingredients = vec![Ingredient {
      name: "onion".to_string(),
      ..Default::default()
    }];

    assert_eq!(ingredient_names(&[soup, stew]), vec!["carrot", "onion"]);
  }
}
