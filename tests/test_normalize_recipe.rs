use dishlens::model::display_numbers;
use dishlens::parse::{
    DEFAULT_COOK_TIME, DEFAULT_SERVINGS, INGREDIENTS_PLACEHOLDER, INSTRUCTIONS_PLACEHOLDER,
};
use dishlens::{normalize_recipe, Instruction};

#[test]
fn test_stir_fry_scenario() {
    let raw = "Spicy Tofu Stir-Fry\n\nIngredients:\n- 1 block tofu\n- 2 tbsp soy sauce\n\nInstructions:\n1. Press tofu.\n2. Stir-fry 5 minutes.\nCooking Time: 20 mins";
    let recipe = normalize_recipe(raw);

    assert_eq!(recipe.title, "Spicy Tofu Stir-Fry");
    assert_eq!(
        recipe.ingredients,
        vec!["1 block tofu".to_string(), "2 tbsp soy sauce".to_string()]
    );
    assert_eq!(
        recipe.instructions,
        vec![
            Instruction::step("Press tofu.", Some(1)),
            Instruction::step("Stir-fry 5 minutes.", Some(2)),
        ]
    );
    // Timing labels are matched across the whole text, not only inside a
    // dedicated section
    assert_eq!(recipe.cook_time, "20 mins");
}

#[test]
fn test_structured_response_wins_over_heuristic_reading() {
    // Read as plain text, the first line would become the title; the
    // structured path must win
    let raw = r#"{"title":"Miso Soup","ingredients":["dashi","miso paste"],"instructions":["Heat dashi.","Whisk in miso."],"servings":2}"#;
    let recipe = normalize_recipe(raw);
    assert_eq!(recipe.title, "Miso Soup");
    assert_eq!(recipe.servings, 2);
    assert_eq!(recipe.ingredients.len(), 2);
    assert_eq!(recipe.instructions.len(), 2);
}

#[test]
fn test_label_beats_first_line() {
    let raw = "Bar\nTitle: Foo\n\nIngredients:\n- salt";
    let recipe = normalize_recipe(raw);
    assert_eq!(recipe.title, "Foo");
}

#[test]
fn test_step_numbers_pass_through_verbatim() {
    let raw = "Skillet Eggs\n\nInstructions:\n1. Mix.\n3. Bake.";
    let recipe = normalize_recipe(raw);
    let numbered: Vec<Option<u32>> = recipe
        .instructions
        .iter()
        .map(|instruction| instruction.number())
        .collect();
    assert_eq!(numbered, vec![Some(1), Some(3)]);
}

#[test]
fn test_trailing_metadata_trimmed_from_serve_step() {
    let raw = "Weeknight Curry\n\nInstructions:\n1. Simmer the sauce.\n5. Serve warm. Cooking Time: 20 mins Servings: 4";
    let recipe = normalize_recipe(raw);
    let last = recipe.instructions.last().unwrap();
    assert_eq!(last.content(), "Serve warm.");
    assert_eq!(last.number(), Some(5));
}

#[test]
fn test_missing_sections_become_placeholders() {
    let raw = "Mystery Dish\n\nSome prose that names no ingredients and no steps in any recognizable way";
    let recipe = normalize_recipe(raw);
    assert_eq!(recipe.title, "Mystery Dish");
    assert_eq!(recipe.ingredients, vec![INGREDIENTS_PLACEHOLDER.to_string()]);
    assert_eq!(recipe.instructions.len(), 1);
    assert!(recipe.instructions[0].is_error());
    assert_eq!(recipe.instructions[0].content(), INSTRUCTIONS_PLACEHOLDER);
}

#[test]
fn test_macros_optional_per_field() {
    let raw = "Protein Bowl\n\nIngredients:\n- 1 cup rice\n\nNutrition:\nCalories: 300";
    let recipe = normalize_recipe(raw);
    let macros = recipe.macros.expect("calories alone is enough for macros");
    assert_eq!(macros.calories, 300);
    assert_eq!(macros.protein, 0);
    assert_eq!(macros.carbs, 0);
    assert_eq!(macros.fat, 0);
    assert_eq!(macros.fiber, None);
    assert_eq!(macros.sugar, None);
    assert_eq!(macros.sodium, None);

    let without = normalize_recipe("Plain Toast\n\nIngredients:\n- bread");
    assert!(without.macros.is_none());
}

#[test]
fn test_serialized_macros_skip_absent_fields() {
    let raw = "Protein Bowl\n\nIngredients:\n- 1 cup rice\n\nNutrition:\nCalories: 300\nProtein: 20";
    let recipe = normalize_recipe(raw);
    let json = serde_json::to_value(&recipe).unwrap();
    let macros = json["macros"].as_object().unwrap();
    assert_eq!(macros["calories"], 300);
    assert!(!macros.contains_key("fiber"));
    assert!(!macros.contains_key("sodium"));
}

#[test]
fn test_headers_do_not_consume_display_numbers() {
    let raw = "Layered Bowl\n\nInstructions:\nFor the sauce:\nWhisk everything together.\n\nFor the bowl:\nPile it over rice.";
    let recipe = normalize_recipe(raw);
    assert!(recipe.instructions[0].is_header());
    let numbers = display_numbers(&recipe.instructions);
    assert_eq!(numbers, vec![None, Some(1), None, Some(2)]);
}

#[test]
fn test_markdown_stripped_from_fields() {
    let raw = "**Garlic Butter Pasta**\n\nIngredients:\n- **4 cloves garlic**\n- 200g *spaghetti*\n\nInstructions:\n1. Cook the `spaghetti`.\n2. Toss with garlic butter.";
    let recipe = normalize_recipe(raw);
    assert_eq!(recipe.title, "Garlic Butter Pasta");
    assert_eq!(recipe.ingredients[0], "4 cloves garlic");
    assert_eq!(recipe.ingredients[1], "200g spaghetti");
    assert_eq!(recipe.instructions[0].content(), "Cook the spaghetti.");
}

#[test]
fn test_defaults_fill_missing_metadata() {
    let raw = "Quick Salad\n\nIngredients:\n- lettuce\n\nInstructions:\n1. Toss.";
    let recipe = normalize_recipe(raw);
    assert_eq!(recipe.cook_time, DEFAULT_COOK_TIME);
    assert_eq!(recipe.servings, DEFAULT_SERVINGS);
    assert!(!recipe.image_url.is_empty());
}
