//! Exercise definitions - справочник упражнений

use serde::{Deserialize, Serialize};

/// Muscle groups an exercise targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,      // Грудь
    Shoulders,  // Дельты
    Triceps,
    Back,       // Широчайшие, трапеции
    Biceps,
    Core,       // Пресс
    Glutes,
    Quads,      // Передняя поверхность бедра
    Hamstrings, // Задняя поверхность бедра
    Calves,     // Голень
    FullBody,
}

impl MuscleGroup {
    /// Lower-case name, the same text users type after `muscle:`
    pub fn as_str(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Back => "back",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Core => "core",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Quads => "quads",
            MuscleGroup::Hamstrings => "hamstrings",
            MuscleGroup::Calves => "calves",
            MuscleGroup::FullBody => "full_body",
        }
    }

    /// Broader region names ("arms", "legs") the group also answers to
    pub fn region(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Triceps | MuscleGroup::Biceps => "arms",
            MuscleGroup::Back => "back",
            MuscleGroup::Core => "core",
            MuscleGroup::Glutes
            | MuscleGroup::Quads
            | MuscleGroup::Hamstrings
            | MuscleGroup::Calves => "legs",
            MuscleGroup::FullBody => "full_body",
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        self.as_str() == value || self.region() == value
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Strength,
    Cardio,
    Flexibility,
    Plyometrics, // Прыжковые
    MartialArts, // Единоборства, тайцзи
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Strength => "strength",
            Category::Cardio => "cardio",
            Category::Flexibility => "flexibility",
            Category::Plyometrics => "plyometrics",
            Category::MartialArts => "martial_arts",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Strength => "💪",
            Category::Cardio => "🏃",
            Category::Flexibility => "🧘",
            Category::Plyometrics => "🦘",
            Category::MartialArts => "👊",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Kettlebell,
    Bodyweight,
    Cable,
    Machine,
    Bands,
}

impl Equipment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Equipment::Barbell => "barbell",
            Equipment::Dumbbell => "dumbbell",
            Equipment::Kettlebell => "kettlebell",
            Equipment::Bodyweight => "bodyweight",
            Equipment::Cable => "cable",
            Equipment::Machine => "machine",
            Equipment::Bands => "bands",
        }
    }
}

/// Ordered from easiest to hardest, so `Ord` gives the difficulty sort
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub muscle_groups: Vec<MuscleGroup>,
    pub equipment: Vec<Equipment>,
    pub difficulty: Difficulty,
    pub calories_per_minute: f32,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    /// Created ad hoc by the user, lives only in memory
    #[serde(default)]
    pub is_custom: bool,
}

impl Exercise {
    /// Lower-cased text the free-text query is matched against
    pub fn haystack(&self) -> String {
        let mut parts = vec![self.name.to_lowercase(), self.category.as_str().to_string()];
        if let Some(desc) = &self.description {
            parts.push(desc.to_lowercase());
        }
        parts.extend(self.muscle_groups.iter().map(|m| m.as_str().to_string()));
        parts.extend(self.equipment.iter().map(|e| e.as_str().to_string()));
        parts.join(" ")
    }
}

struct ExerciseDef {
    id: &'static str,
    name: &'static str,
    category: Category,
    muscle_groups: &'static [MuscleGroup],
    equipment: &'static [Equipment],
    difficulty: Difficulty,
    calories_per_minute: f32,
    description: Option<&'static str>,
    has_video: bool,
    has_image: bool,
}

impl ExerciseDef {
    fn to_exercise(&self) -> Exercise {
        Exercise {
            id: self.id.to_string(),
            name: self.name.to_string(),
            category: self.category,
            muscle_groups: self.muscle_groups.to_vec(),
            equipment: self.equipment.to_vec(),
            difficulty: self.difficulty,
            calories_per_minute: self.calories_per_minute,
            description: self.description.map(str::to_string),
            video_url: self
                .has_video
                .then(|| format!("https://media.gymscout.app/video/{}.mp4", self.id)),
            image_url: self
                .has_image
                .then(|| format!("https://media.gymscout.app/img/{}.jpg", self.id)),
            is_custom: false,
        }
    }
}

use Difficulty::*;
use Equipment as Gear;
use MuscleGroup as M;

const LIBRARY: &[ExerciseDef] = &[
    // Push
    ExerciseDef {
        id: "bench_press",
        name: "Barbell Bench Press",
        category: Category::Strength,
        muscle_groups: &[M::Chest, M::Triceps, M::Shoulders],
        equipment: &[Gear::Barbell],
        difficulty: Intermediate,
        calories_per_minute: 6.0,
        description: Some("Lie on a flat bench, lower the bar to mid chest and press up"),
        has_video: true,
        has_image: true,
    },
    ExerciseDef {
        id: "incline_db_press",
        name: "Incline Dumbbell Press",
        category: Category::Strength,
        muscle_groups: &[M::Chest, M::Shoulders, M::Triceps],
        equipment: &[Gear::Dumbbell],
        difficulty: Intermediate,
        calories_per_minute: 5.5,
        description: Some("Bench at 30 degrees, press dumbbells over the upper chest"),
        has_video: false,
        has_image: true,
    },
    ExerciseDef {
        id: "pushups_fist",
        name: "Knuckle Push-Up",
        category: Category::Strength,
        muscle_groups: &[M::Chest, M::Triceps, M::Shoulders, M::Core],
        equipment: &[Gear::Bodyweight],
        difficulty: Beginner,
        calories_per_minute: 7.0,
        description: Some("Push-up on the fists, wrists straight, body in one line"),
        has_video: true,
        has_image: false,
    },
    ExerciseDef {
        id: "overhead_press",
        name: "Overhead Press",
        category: Category::Strength,
        muscle_groups: &[M::Shoulders, M::Triceps, M::Core],
        equipment: &[Gear::Barbell],
        difficulty: Intermediate,
        calories_per_minute: 5.0,
        description: Some("Standing press from the front rack to lockout overhead"),
        has_video: true,
        has_image: true,
    },
    ExerciseDef {
        id: "triceps_pushdown",
        name: "Cable Triceps Pushdown",
        category: Category::Strength,
        muscle_groups: &[M::Triceps],
        equipment: &[Gear::Cable],
        difficulty: Beginner,
        calories_per_minute: 3.5,
        description: None,
        has_video: false,
        has_image: false,
    },
    // Pull
    ExerciseDef {
        id: "deadlift",
        name: "Barbell Deadlift",
        category: Category::Strength,
        muscle_groups: &[M::Back, M::Hamstrings, M::Glutes, M::Core],
        equipment: &[Gear::Barbell],
        difficulty: Advanced,
        calories_per_minute: 8.0,
        description: Some("Hinge at the hips, flat back, drive the floor away"),
        has_video: true,
        has_image: true,
    },
    ExerciseDef {
        id: "pullup",
        name: "Pull-Up",
        category: Category::Strength,
        muscle_groups: &[M::Back, M::Biceps],
        equipment: &[Gear::Bodyweight],
        difficulty: Intermediate,
        calories_per_minute: 8.0,
        description: Some("Dead hang to chin over the bar"),
        has_video: true,
        has_image: false,
    },
    ExerciseDef {
        id: "db_row",
        name: "One-Arm Dumbbell Row",
        category: Category::Strength,
        muscle_groups: &[M::Back, M::Biceps],
        equipment: &[Gear::Dumbbell],
        difficulty: Beginner,
        calories_per_minute: 5.0,
        description: None,
        has_video: false,
        has_image: true,
    },
    ExerciseDef {
        id: "db_curl",
        name: "Dumbbell Curl",
        category: Category::Strength,
        muscle_groups: &[M::Biceps],
        equipment: &[Gear::Dumbbell],
        difficulty: Beginner,
        calories_per_minute: 3.0,
        description: None,
        has_video: true,
        has_image: true,
    },
    ExerciseDef {
        id: "band_pull_apart",
        name: "Band Pull-Apart",
        category: Category::Strength,
        muscle_groups: &[M::Shoulders, M::Back],
        equipment: &[Gear::Bands],
        difficulty: Beginner,
        calories_per_minute: 3.0,
        description: Some("Arms straight, pull the band to the chest squeezing the shoulder blades"),
        has_video: false,
        has_image: false,
    },
    // Legs
    ExerciseDef {
        id: "back_squat",
        name: "Barbell Back Squat",
        category: Category::Strength,
        muscle_groups: &[M::Quads, M::Glutes, M::Core],
        equipment: &[Gear::Barbell],
        difficulty: Advanced,
        calories_per_minute: 8.0,
        description: Some("Bar on the upper back, squat below parallel"),
        has_video: true,
        has_image: true,
    },
    ExerciseDef {
        id: "goblet_squat",
        name: "Goblet Squat",
        category: Category::Strength,
        muscle_groups: &[M::Quads, M::Glutes],
        equipment: &[Gear::Kettlebell, Gear::Dumbbell],
        difficulty: Beginner,
        calories_per_minute: 6.0,
        description: None,
        has_video: true,
        has_image: false,
    },
    ExerciseDef {
        id: "romanian_deadlift",
        name: "Single-Leg Romanian Deadlift",
        category: Category::Strength,
        muscle_groups: &[M::Hamstrings, M::Glutes, M::Core],
        equipment: &[Gear::Dumbbell, Gear::Bodyweight],
        difficulty: Intermediate,
        calories_per_minute: 5.0,
        description: Some("Stand on one leg, hinge forward reaching the other leg back, spine straight"),
        has_video: false,
        has_image: true,
    },
    ExerciseDef {
        id: "leg_press",
        name: "Leg Press",
        category: Category::Strength,
        muscle_groups: &[M::Quads, M::Glutes],
        equipment: &[Gear::Machine],
        difficulty: Beginner,
        calories_per_minute: 5.0,
        description: None,
        has_video: false,
        has_image: false,
    },
    ExerciseDef {
        id: "calf_raises",
        name: "Calf Raise",
        category: Category::Strength,
        muscle_groups: &[M::Calves],
        equipment: &[Gear::Bodyweight],
        difficulty: Beginner,
        calories_per_minute: 3.0,
        description: Some("Toes on the edge of a step, rise up and lower below the step"),
        has_video: false,
        has_image: false,
    },
    // Core
    ExerciseDef {
        id: "plank_elbows",
        name: "Elbow Plank",
        category: Category::Strength,
        muscle_groups: &[M::Core, M::Shoulders],
        equipment: &[Gear::Bodyweight],
        difficulty: Beginner,
        calories_per_minute: 4.0,
        description: None,
        has_video: true,
        has_image: true,
    },
    ExerciseDef {
        id: "jackknife",
        name: "Jackknife Sit-Up",
        category: Category::Strength,
        muscle_groups: &[M::Core],
        equipment: &[Gear::Bodyweight],
        difficulty: Intermediate,
        calories_per_minute: 6.0,
        description: None,
        has_video: false,
        has_image: false,
    },
    ExerciseDef {
        id: "kb_swing",
        name: "Kettlebell Swing",
        category: Category::Cardio,
        muscle_groups: &[M::Glutes, M::Hamstrings, M::Core],
        equipment: &[Gear::Kettlebell],
        difficulty: Intermediate,
        calories_per_minute: 12.0,
        description: Some("Explosive hip hinge, the bell floats to chest height"),
        has_video: true,
        has_image: true,
    },
    // Cardio / plyo
    ExerciseDef {
        id: "burpee",
        name: "Burpee",
        category: Category::Cardio,
        muscle_groups: &[M::FullBody],
        equipment: &[Gear::Bodyweight],
        difficulty: Intermediate,
        calories_per_minute: 10.0,
        description: None,
        has_video: true,
        has_image: false,
    },
    ExerciseDef {
        id: "box_jump",
        name: "Box Jump",
        category: Category::Plyometrics,
        muscle_groups: &[M::Quads, M::Glutes, M::Calves],
        equipment: &[Gear::Bodyweight],
        difficulty: Advanced,
        calories_per_minute: 10.0,
        description: None,
        has_video: false,
        has_image: true,
    },
    // Flexibility
    ExerciseDef {
        id: "hip_flexor_stretch",
        name: "Kneeling Hip Flexor Stretch",
        category: Category::Flexibility,
        muscle_groups: &[M::Quads, M::Glutes],
        equipment: &[Gear::Bodyweight],
        difficulty: Beginner,
        calories_per_minute: 2.0,
        description: None,
        has_video: false,
        has_image: false,
    },
    // Martial arts
    ExerciseDef {
        id: "squats_strikes",
        name: "Squat with Strikes",
        category: Category::MartialArts,
        muscle_groups: &[M::Quads, M::Glutes, M::Core, M::Shoulders],
        equipment: &[Gear::Bodyweight],
        difficulty: Intermediate,
        calories_per_minute: 9.0,
        description: None,
        has_video: false,
        has_image: false,
    },
    ExerciseDef {
        id: "taiji_shadow",
        name: "Taiji Shadow Boxing",
        category: Category::MartialArts,
        muscle_groups: &[M::FullBody],
        equipment: &[Gear::Bodyweight],
        difficulty: Beginner,
        calories_per_minute: 4.0,
        description: Some("Slow continuous forms, weight shifting from leg to leg"),
        has_video: true,
        has_image: false,
    },
];

/// Built-in exercise library
pub fn get_all_exercises() -> Vec<Exercise> {
    LIBRARY.iter().map(ExerciseDef::to_exercise).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_library_ids_unique() {
        let all = get_all_exercises();
        let ids: HashSet<_> = all.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn test_muscle_region_matching() {
        assert!(MuscleGroup::Biceps.matches("arms"));
        assert!(MuscleGroup::Biceps.matches("biceps"));
        assert!(!MuscleGroup::Chest.matches("arms"));
    }

    #[test]
    fn test_haystack_includes_equipment() {
        let all = get_all_exercises();
        let bench = all.iter().find(|e| e.id == "bench_press").unwrap();
        let hay = bench.haystack();
        assert!(hay.contains("barbell"));
        assert!(hay.contains("chest"));
        assert!(hay.contains("bench press"));
    }

    #[test]
    fn test_media_urls_follow_flags() {
        let all = get_all_exercises();
        let curl = all.iter().find(|e| e.id == "db_curl").unwrap();
        assert!(curl.video_url.is_some());
        let row = all.iter().find(|e| e.id == "db_row").unwrap();
        assert!(row.video_url.is_none());
        assert!(row.image_url.is_some());
    }
}
