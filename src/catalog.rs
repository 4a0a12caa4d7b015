use include_dir::{include_dir, Dir};
use serde::{Deserialize, Deserializer, Serialize};
use strum::IntoEnumIterator;

static ASSETS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets");

const CATALOG_FILE: &str = "exercises.json";

/// Selection value that disables a filter predicate
pub const ALL: &str = "All";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[strum(
    ascii_case_insensitive,
    parse_err_ty = UnknownVariant,
    parse_err_fn = UnknownVariant::from_name
)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Beginner => 1.0,
            Difficulty::Intermediate => 1.5,
            Difficulty::Advanced => 2.0,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[strum(
    ascii_case_insensitive,
    parse_err_ty = UnknownVariant,
    parse_err_fn = UnknownVariant::from_name
)]
pub enum ExerciseType {
    #[default]
    Pronunciation,
    Fluency,
    Articulation,
    Voice,
    Language,
    Breathing,
    Resonance,
    Projection,
    Expression,
    Confidence,
}

impl ExerciseType {
    /// Parse a type name, falling back to `Pronunciation` for anything unknown
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value '{0}'")]
pub struct UnknownVariant(pub String);

impl UnknownVariant {
    fn from_name(name: &str) -> Self {
        UnknownVariant(name.to_string())
    }
}

/// Reads an exercise type name leniently; unknown names become `Pronunciation`
fn lenient_exercise_type<'de, D>(deserializer: D) -> Result<ExerciseType, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    Ok(ExerciseType::from_name_or_default(&name))
}

/// A predefined exercise, immutable once the catalog is loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(rename = "type", deserialize_with = "lenient_exercise_type")]
    pub exercise_type: ExerciseType,
    /// target minutes
    pub duration: u32,
}

impl Exercise {
    pub fn target_secs(&self) -> u64 {
        u64::from(self.duration) * 60
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[allow(dead_code)]
    name: String,
    exercises: Vec<Exercise>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    exercises: Vec<Exercise>,
}

impl Catalog {
    /// Load the built-in catalog of speech exercises
    pub fn builtin() -> Self {
        let file = ASSETS_DIR
            .get_file(CATALOG_FILE)
            .and_then(|f| f.contents_utf8())
            .unwrap_or("{\"name\":\"empty\",\"exercises\":[]}");

        match serde_json::from_str::<CatalogFile>(file) {
            Ok(parsed) => Self::new(parsed.exercises),
            Err(e) => {
                tracing::error!("built-in catalog is malformed: {e}");
                Self::new(Vec::new())
            }
        }
    }

    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self { exercises }
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }
}

/// Keep the exercises matching both selections, in catalog order.
/// `"All"` disables a predicate; otherwise names must match exactly.
pub fn filter_exercises<'a>(
    catalog: &'a [Exercise],
    difficulty: &str,
    exercise_type: &str,
) -> Vec<&'a Exercise> {
    catalog
        .iter()
        .filter(|e| matches_selection(difficulty, &e.difficulty.to_string()))
        .filter(|e| matches_selection(exercise_type, &e.exercise_type.to_string()))
        .collect()
}

fn matches_selection(selection: &str, value: &str) -> bool {
    selection == ALL || selection == value
}

/// Filter selections with a memoized result, recomputed only when a selection changes
#[derive(Debug, Clone)]
pub struct CatalogFilter {
    difficulty: String,
    exercise_type: String,
    cached: Option<Vec<usize>>,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        Self::new(ALL, ALL)
    }
}

impl CatalogFilter {
    pub fn new(difficulty: &str, exercise_type: &str) -> Self {
        Self {
            difficulty: difficulty.to_string(),
            exercise_type: exercise_type.to_string(),
            cached: None,
        }
    }

    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    pub fn exercise_type(&self) -> &str {
        &self.exercise_type
    }

    pub fn set_difficulty(&mut self, difficulty: &str) {
        if self.difficulty != difficulty {
            self.difficulty = difficulty.to_string();
            self.cached = None;
        }
    }

    pub fn set_exercise_type(&mut self, exercise_type: &str) {
        if self.exercise_type != exercise_type {
            self.exercise_type = exercise_type.to_string();
            self.cached = None;
        }
    }

    /// Step the difficulty selection through All, Beginner, Intermediate, Advanced
    pub fn cycle_difficulty(&mut self) {
        let options = difficulty_options();
        let next = next_option(&options, &self.difficulty);
        self.set_difficulty(&next);
    }

    pub fn cycle_exercise_type(&mut self) {
        let options = type_options();
        let next = next_option(&options, &self.exercise_type);
        self.set_exercise_type(&next);
    }

    pub fn apply<'a>(&mut self, catalog: &'a Catalog) -> Vec<&'a Exercise> {
        let (difficulty, exercise_type) = (&self.difficulty, &self.exercise_type);
        let indices = self.cached.get_or_insert_with(|| {
            catalog
                .exercises()
                .iter()
                .enumerate()
                .filter(|(_, e)| matches_selection(difficulty, &e.difficulty.to_string()))
                .filter(|(_, e)| matches_selection(exercise_type, &e.exercise_type.to_string()))
                .map(|(i, _)| i)
                .collect()
        });

        indices
            .iter()
            .filter_map(|&i| catalog.exercises().get(i))
            .collect()
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }
}

pub fn difficulty_options() -> Vec<String> {
    std::iter::once(ALL.to_string())
        .chain(Difficulty::iter().map(|d| d.to_string()))
        .collect()
}

pub fn type_options() -> Vec<String> {
    std::iter::once(ALL.to_string())
        .chain(ExerciseType::iter().map(|t| t.to_string()))
        .collect()
}

fn next_option(options: &[String], current: &str) -> String {
    let idx = options.iter().position(|o| o == current).unwrap_or(0);
    options[(idx + 1) % options.len()].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn exercise(id: u32, difficulty: Difficulty, exercise_type: ExerciseType) -> Exercise {
        Exercise {
            id,
            title: format!("exercise {id}"),
            description: String::new(),
            difficulty,
            exercise_type,
            duration: 5,
        }
    }

    #[test]
    fn test_builtin_catalog_has_fifty_unique_exercises() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 50);

        let ids: HashSet<u32> = catalog.exercises().iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 50);
        assert!(catalog.exercises().iter().all(|e| e.id > 0 && e.duration > 0));
    }

    #[test]
    fn test_builtin_catalog_covers_every_type() {
        let catalog = Catalog::builtin();
        for t in ExerciseType::iter() {
            assert!(
                catalog.exercises().iter().any(|e| e.exercise_type == t),
                "no exercise for {t}"
            );
        }
    }

    #[test]
    fn test_filter_all_returns_full_catalog_in_order() {
        let catalog = Catalog::builtin();
        let filtered = filter_exercises(catalog.exercises(), ALL, ALL);
        let expected: Vec<&Exercise> = catalog.exercises().iter().collect();
        assert_eq!(filtered, expected);
    }

    #[test]
    fn test_filter_every_result_matches_both_predicates() {
        let catalog = Catalog::builtin();
        for d in difficulty_options() {
            for t in type_options() {
                for e in filter_exercises(catalog.exercises(), &d, &t) {
                    assert!(d == ALL || e.difficulty.to_string() == d);
                    assert!(t == ALL || e.exercise_type.to_string() == t);
                }
            }
        }
    }

    #[test]
    fn test_filter_preserves_input_order() {
        let items = vec![
            exercise(9, Difficulty::Advanced, ExerciseType::Voice),
            exercise(2, Difficulty::Beginner, ExerciseType::Voice),
            exercise(5, Difficulty::Advanced, ExerciseType::Fluency),
            exercise(1, Difficulty::Advanced, ExerciseType::Voice),
        ];

        let ids: Vec<u32> = filter_exercises(&items, "Advanced", ALL)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![9, 5, 1]);

        let ids: Vec<u32> = filter_exercises(&items, "Advanced", "Voice")
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![9, 1]);
    }

    #[test]
    fn test_filter_is_exact_string_match() {
        let items = vec![exercise(1, Difficulty::Beginner, ExerciseType::Voice)];
        assert!(filter_exercises(&items, "beginner", ALL).is_empty());
        assert!(filter_exercises(&items, ALL, "voice").is_empty());
        assert!(filter_exercises(&items, "all", ALL).is_empty());
    }

    #[test]
    fn test_filter_empty_catalog() {
        assert!(filter_exercises(&[], ALL, ALL).is_empty());
    }

    #[test]
    fn test_catalog_filter_memoizes_until_selection_changes() {
        let catalog = Catalog::builtin();
        let mut filter = CatalogFilter::default();
        assert!(!filter.is_cached());

        let all = filter.apply(&catalog).len();
        assert_eq!(all, 50);
        assert!(filter.is_cached());

        filter.set_difficulty(ALL);
        assert!(filter.is_cached(), "same selection keeps the cache");

        filter.set_difficulty("Beginner");
        assert!(!filter.is_cached());
        let beginner = filter.apply(&catalog);
        assert!(beginner.iter().all(|e| e.difficulty == Difficulty::Beginner));
        assert_eq!(
            beginner,
            filter_exercises(catalog.exercises(), "Beginner", ALL)
        );
    }

    #[test]
    fn test_cycle_selections_wrap_around() {
        let mut filter = CatalogFilter::default();
        filter.cycle_difficulty();
        assert_eq!(filter.difficulty(), "Beginner");
        filter.cycle_difficulty();
        filter.cycle_difficulty();
        assert_eq!(filter.difficulty(), "Advanced");
        filter.cycle_difficulty();
        assert_eq!(filter.difficulty(), ALL);

        for _ in 0..ExerciseType::iter().count() {
            filter.cycle_exercise_type();
        }
        assert_eq!(filter.exercise_type(), "Confidence");
        filter.cycle_exercise_type();
        assert_eq!(filter.exercise_type(), ALL);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("advanced".parse::<Difficulty>(), Ok(Difficulty::Advanced));
        assert!("expert".parse::<Difficulty>().is_err());
        assert_eq!("Breathing".parse::<ExerciseType>(), Ok(ExerciseType::Breathing));
        assert_eq!(
            ExerciseType::from_name_or_default("Storytelling"),
            ExerciseType::Pronunciation
        );
    }

    #[test]
    fn test_parse_error_names_the_value() {
        let err = "expert".parse::<Difficulty>().unwrap_err();
        assert_eq!(err, UnknownVariant("expert".to_string()));
        assert_eq!(err.to_string(), "unknown value 'expert'");
        assert_eq!("BREATHING".parse::<ExerciseType>(), Ok(ExerciseType::Breathing));
        assert_eq!(ExerciseType::default(), ExerciseType::Pronunciation);
    }

    #[test]
    fn test_unknown_type_in_record_falls_back_to_pronunciation() {
        let json = r#"{
            "id": 77,
            "title": "Tell a Story",
            "description": "Narrate a short story",
            "difficulty": "Intermediate",
            "type": "Storytelling",
            "duration": 4
        }"#;
        let e: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(e.exercise_type, ExerciseType::Pronunciation);
        assert_eq!(e.difficulty, Difficulty::Intermediate);

        let file = format!(r#"{{"name": "custom", "exercises": [{json}]}}"#);
        let parsed: CatalogFile = serde_json::from_str(&file).unwrap();
        assert_eq!(parsed.exercises.len(), 1);
    }

    #[test]
    fn test_target_secs() {
        let e = exercise(1, Difficulty::Beginner, ExerciseType::Voice);
        assert_eq!(e.target_secs(), 300);
    }
}
