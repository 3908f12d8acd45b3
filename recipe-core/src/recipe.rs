use serde::{Deserialize, Serialize};

/// A recipe as returned by the list and detail endpoints. Only the fields the
/// application reads are modelled; unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub thumbnail_url: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub instructions: Option<Instructions>,
    #[serde(default)]
    pub nutrition: Option<Nutrition>,
    #[serde(default)]
    pub total_time_minutes: Option<u32>,
    #[serde(default)]
    pub cook_time_minutes: Option<u32>,
    #[serde(default)]
    pub prep_time_minutes: Option<u32>,
    #[serde(default, alias = "num_servings")]
    pub servings: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub user_ratings: Option<UserRatings>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Nutrition {
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserRatings {
    #[serde(default)]
    pub count_positive: u64,
    #[serde(default)]
    pub count_negative: u64,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Component {
    pub ingredient: Ingredient,
    #[serde(default, deserialize_with = "null_as_default")]
    pub measurements: Vec<Measurement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub measurements: Vec<Measurement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Measurement {
    #[serde(default, deserialize_with = "unit_name")]
    pub unit: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: String,
}

/// The API sends instructions either as one block of text or as a list of
/// steps; both shapes are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Instructions {
    Text(String),
    Steps(Vec<InstructionStep>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstructionStep {
    #[serde(default)]
    pub display_text: String,
    #[serde(default)]
    pub position: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RecipeList {
    #[serde(default)]
    pub results: Vec<Recipe>,
    #[serde(default)]
    pub count: u64,
}

impl Recipe {
    pub fn instruction_steps(&self) -> Vec<String> {
        match &self.instructions {
            Some(Instructions::Text(text)) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
            Some(Instructions::Steps(steps)) => {
                let mut steps = steps.clone();
                steps.sort_by_key(|s| s.position.unwrap_or(u32::MAX));
                steps.into_iter().map(|s| s.display_text).collect()
            }
            None => Vec::new(),
        }
    }

    /// "quantité unité nom" pour chaque ingrédient, dans l'ordre des sections.
    pub fn ingredient_lines(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|section| section.components.iter())
            .map(|component| {
                let first = component
                    .ingredient
                    .measurements
                    .first()
                    .or_else(|| component.measurements.first());
                match first {
                    Some(m) => {
                        let qty_unit = [m.quantity.trim(), m.unit.trim()]
                            .into_iter()
                            .filter(|part| !part.is_empty())
                            .collect::<Vec<_>>()
                            .join(" ");
                        if qty_unit.is_empty() {
                            component.ingredient.name.clone()
                        } else {
                            format!("{} {}", qty_unit, component.ingredient.name)
                        }
                    }
                    None => component.ingredient.name.clone(),
                }
            })
            .collect()
    }

    pub fn rating_percent(&self) -> Option<u8> {
        let score = self.user_ratings.as_ref()?.score?;
        Some((score.clamp(0.0, 1.0) * 100.0).round() as u8)
    }

    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.display_name.to_lowercase().contains(&needle))
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }
}

/// Client-side search over an already fetched page of recipes.
pub fn filter_recipes<'a>(recipes: &'a [Recipe], term: &str) -> Vec<&'a Recipe> {
    recipes.iter().filter(|recipe| recipe.matches(term)).collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Detail payloads nest the unit as an object ({"name": "cup", ...}).
fn unit_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Unit {
        Plain(String),
        Named {
            #[serde(default)]
            name: String,
        },
    }

    Ok(match Option::<Unit>::deserialize(deserializer)? {
        Some(Unit::Plain(unit)) => unit,
        Some(Unit::Named { name }) => name,
        None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(json: serde_json::Value) -> Recipe {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn tolerates_missing_and_null_fields() {
        let r = recipe(serde_json::json!({
            "id": 7,
            "name": "Toast",
            "description": null,
            "thumbnail_url": null,
            "tags": null,
            "extra_field": {"ignored": true}
        }));
        assert_eq!(r.id, 7);
        assert!(r.description.is_none());
        assert!(r.thumbnail_url.is_empty());
        assert!(r.tags.is_empty());
        assert!(r.instruction_steps().is_empty());
        assert!(r.rating_percent().is_none());
    }

    #[test]
    fn instructions_accept_text_and_steps() {
        let text = recipe(serde_json::json!({
            "id": 1, "name": "a",
            "instructions": "Boil water\n\n Add pasta \n"
        }));
        assert_eq!(text.instruction_steps(), vec!["Boil water", "Add pasta"]);

        let steps = recipe(serde_json::json!({
            "id": 2, "name": "b",
            "instructions": [
                {"display_text": "Serve", "position": 2},
                {"display_text": "Mix", "position": 1}
            ]
        }));
        assert_eq!(steps.instruction_steps(), vec!["Mix", "Serve"]);
    }

    #[test]
    fn ingredient_lines_use_first_measurement() {
        let r = recipe(serde_json::json!({
            "id": 3, "name": "c",
            "sections": [{
                "components": [
                    {"ingredient": {"name": "flour", "measurements": [{"unit": "cup", "quantity": "2"}]}},
                    {"ingredient": {"name": "salt"}, "measurements": [{"unit": {"name": "pinch"}, "quantity": "1"}]},
                    {"ingredient": {"name": "love"}}
                ]
            }]
        }));
        assert_eq!(
            r.ingredient_lines(),
            vec!["2 cup flour", "1 pinch salt", "love"]
        );
    }

    #[test]
    fn rating_is_rounded_percentage() {
        let r = recipe(serde_json::json!({
            "id": 4, "name": "d",
            "user_ratings": {"count_positive": 150, "count_negative": 13, "score": 0.916}
        }));
        assert_eq!(r.rating_percent(), Some(92));
    }

    #[test]
    fn filter_matches_name_tag_or_description() {
        let recipes = vec![
            recipe(serde_json::json!({"id": 1, "name": "Ratatouille"})),
            recipe(serde_json::json!({
                "id": 2, "name": "Soup",
                "tags": [{"name": "vegan", "display_name": "Vegan", "type": "dietary"}]
            })),
            recipe(serde_json::json!({"id": 3, "name": "Cake", "description": "A vegan treat"})),
            recipe(serde_json::json!({"id": 4, "name": "Steak"})),
        ];

        let ids: Vec<u64> = filter_recipes(&recipes, "VEGAN").iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(filter_recipes(&recipes, "ratat").len(), 1);
        assert_eq!(filter_recipes(&recipes, "  ").len(), 4);
    }
}
