//! Plain-text rendering of recipes for the terminal.

use recipes::recipe::Recipe;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Keywords as shown in lists, "None" when the recipe has none
pub fn attributes_label(recipe: &Recipe) -> &str {
  if recipe.attributes.trim().is_empty() {
    "None"
  } else {
    &recipe.attributes
  }
}

/// Numbered list of recipes with a results count header
pub fn recipe_list(view: &[&Recipe], total: usize) -> String {
  let mut out = format!("Showing {} of {} recipes\n", view.len(), total);
  for (n, recipe) in view.iter().enumerate() {
    out.push_str(&format!(
      "{:>3}. {:<40} {}\n",
      n + 1,
      truncate(&recipe.title, 40),
      truncate(attributes_label(recipe), 50)
    ));
  }
  out
}

/// Full recipe card
pub fn recipe_detail(recipe: &Recipe) -> String {
  let mut out = format!("{}\n", recipe.title);
  out.push_str(&format!("{}\n", "=".repeat(recipe.title.chars().count().max(3))));
  if let Some(notes) = recipe.notes.as_deref().filter(|n| !n.is_empty()) {
    out.push_str(&format!("Notes: {}\n", notes));
  }
  out.push_str(&format!(
    "Servings: {} {}\n",
    recipe.servings.amount, recipe.servings.unit
  ));
  out.push_str(&format!("Keywords: {}\n", attributes_label(recipe)));

  out.push_str("\nIngredients\n");
  for ingredient in &recipe.ingredients {
    let line = [
      ingredient.amount.as_str(),
      ingredient.unit.as_str(),
      ingredient.name.as_str(),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" ");
    out.push_str(&format!("  - {}\n", line));
  }

  out.push_str("\nSteps\n");
  for (n, step) in recipe.steps.iter().enumerate() {
    out.push_str(&format!("  {}. {}\n", n + 1, step));
  }

  out.push_str(&format!("\nid: {}\n", recipe.id));
  out
}
