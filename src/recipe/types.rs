use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Separator used by the backend to join keywords in `attributes`.
pub const KEYWORD_SEPARATOR: &str = ", ";

/// Split an attributes string into trimmed, non-empty keywords.
pub fn split_keywords(attributes: &str) -> impl Iterator<Item = &str> {
  attributes
    .split(KEYWORD_SEPARATOR)
    .map(str::trim)
    .filter(|k| !k.is_empty())
}

/// Quantity of servings a recipe yields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Servings {
  #[serde(default)]
  pub amount: String,
  #[serde(default)]
  pub unit: String,
}

impl Servings {
  /// Servings used when a draft does not specify any.
  pub fn default_draft() -> Self {
    Self {
      amount: "4".to_string(),
      unit: "st".to_string(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
  #[serde(default)]
  pub amount: String,
  #[serde(default)]
  pub unit: String,
  #[serde(default)]
  pub name: String,
}

/// A recipe as stored by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
  /// Free-form keyword list joined with ", "
  #[serde(default)]
  pub attributes: String,
  #[serde(default)]
  pub servings: Servings,
  #[serde(default)]
  pub ingredients: Vec<Ingredient>,
  #[serde(default)]
  pub steps: Vec<String>,
  /// Opaque, string-ordered marker assigned by the backend
  #[serde(default)]
  pub version: String,
}

impl Recipe {
  pub fn keywords(&self) -> impl Iterator<Item = &str> {
    split_keywords(&self.attributes)
  }

  pub fn has_keyword(&self, keyword: &str) -> bool {
    self.keywords().any(|k| k == keyword)
  }

  /// Build the record the server holds after accepting `draft` under `id`.
  ///
  /// The version is left empty: only the backend assigns versions.
  pub fn from_draft(id: String, draft: RecipeDraft) -> Self {
    Recipe {
      id,
      title: draft.title,
      notes: draft.notes,
      attributes: draft.attributes,
      servings: draft.servings.unwrap_or_else(Servings::default_draft),
      ingredients: draft.ingredients,
      steps: draft.steps,
      version: String::new(),
    }
  }
}

/// Request body for create and update: a recipe without `id` and `version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
  #[serde(default)]
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
  #[serde(default)]
  pub attributes: String,
  /// Keywords to merge into `attributes`; accepted from draft files only
  #[serde(default, skip_serializing)]
  pub keywords: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub servings: Option<Servings>,
  #[serde(default)]
  pub ingredients: Vec<Ingredient>,
  #[serde(default)]
  pub steps: Vec<String>,
}

impl From<&Recipe> for RecipeDraft {
  fn from(recipe: &Recipe) -> Self {
    RecipeDraft {
      title: recipe.title.clone(),
      notes: recipe.notes.clone(),
      attributes: recipe.attributes.clone(),
      keywords: Vec::new(),
      servings: Some(recipe.servings.clone()),
      ingredients: recipe.ingredients.clone(),
      steps: recipe.steps.clone(),
    }
  }
}

impl RecipeDraft {
  /// Trim every field, drop blank rows, and fold `keywords` into `attributes`.
  pub fn normalized(self) -> Self {
    let notes = self
      .notes
      .map(|n| n.trim().to_string())
      .filter(|n| !n.is_empty());

    let steps = self
      .steps
      .into_iter()
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect();

    let ingredients = self
      .ingredients
      .into_iter()
      .map(|i| Ingredient {
        amount: i.amount.trim().to_string(),
        unit: i.unit.trim().to_string(),
        name: i.name.trim().to_string(),
      })
      .filter(|i| !i.name.is_empty())
      .collect();

    let mut keywords: Vec<String> = Vec::new();
    let existing = split_keywords(&self.attributes).map(String::from);
    let extra = self.keywords.iter().map(|k| k.trim().to_string());
    for keyword in existing.chain(extra) {
      if !keyword.is_empty() && !keywords.contains(&keyword) {
        keywords.push(keyword);
      }
    }

    RecipeDraft {
      title: self.title.trim().to_string(),
      notes,
      attributes: keywords.join(KEYWORD_SEPARATOR),
      keywords: Vec::new(),
      servings: Some(self.servings.unwrap_or_else(Servings::default_draft)),
      ingredients,
      steps,
    }
  }

  /// Check that a normalized draft can be submitted.
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.title.is_empty() {
      return Err(ValidationError::MissingTitle);
    }
    if self.steps.is_empty() {
      return Err(ValidationError::NoSteps);
    }
    if self.ingredients.is_empty() {
      return Err(ValidationError::NoIngredients);
    }
    Ok(())
  }
}
