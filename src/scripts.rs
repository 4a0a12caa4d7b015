use crate::catalog::ExerciseType;

/// Illustrative material shown next to the steps while practicing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeContent {
    pub title: &'static str,
    pub lines: &'static [&'static str],
    pub tip: &'static str,
}

/// Instruction steps and practice content for one exercise type.
/// Both halves come from the same match so the tables cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseScript {
    pub steps: &'static [&'static str],
    pub practice: PracticeContent,
}

impl ExerciseScript {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, idx: usize) -> Option<&'static str> {
        self.steps.get(idx).copied()
    }
}

pub fn script_for(exercise_type: ExerciseType) -> &'static ExerciseScript {
    match exercise_type {
        ExerciseType::Pronunciation => &PRONUNCIATION,
        ExerciseType::Fluency => &FLUENCY,
        ExerciseType::Articulation => &ARTICULATION,
        ExerciseType::Voice => &VOICE,
        ExerciseType::Language => &LANGUAGE,
        ExerciseType::Breathing => &BREATHING,
        ExerciseType::Resonance => &RESONANCE,
        ExerciseType::Projection => &PROJECTION,
        ExerciseType::Expression => &EXPRESSION,
        ExerciseType::Confidence => &CONFIDENCE,
    }
}

static PRONUNCIATION: ExerciseScript = ExerciseScript {
    steps: &[
        "Take a deep breath and relax your vocal cords",
        "Listen carefully to the target sound",
        "Practice the sound slowly and clearly",
        "Repeat with increasing speed",
        "Maintain clarity throughout",
    ],
    practice: PracticeContent {
        title: "Vowel Sound Practice",
        lines: &[
            "A - Say 'ah' as in 'father' - Hold for 3 seconds",
            "E - Say 'eh' as in 'bed' - Hold for 3 seconds",
            "I - Say 'ee' as in 'see' - Hold for 3 seconds",
            "O - Say 'oh' as in 'go' - Hold for 3 seconds",
            "U - Say 'oo' as in 'moon' - Hold for 3 seconds",
        ],
        tip: "Practice each vowel sound clearly and hold each one. Focus on opening your mouth wide and maintaining consistent volume.",
    },
};

static FLUENCY: ExerciseScript = ExerciseScript {
    steps: &[
        "Start with slow, deliberate speech",
        "Focus on smooth transitions between words",
        "Practice breathing rhythmically",
        "Gradually increase your pace",
        "Maintain consistent flow",
    ],
    practice: PracticeContent {
        title: "Smooth Speech Practice",
        lines: &[
            "The quick brown fox jumps over the lazy dog",
            "Peter Piper picked a peck of pickled peppers",
            "How much wood would a woodchuck chuck",
            "She sells seashells by the seashore",
            "Red lorry, yellow lorry, red lorry, yellow lorry",
        ],
        tip: "Read each phrase slowly at first, then gradually increase your speed while maintaining clarity and smooth transitions.",
    },
};

static ARTICULATION: ExerciseScript = ExerciseScript {
    steps: &[
        "Warm up your mouth and tongue",
        "Practice each sound individually",
        "Combine sounds into words",
        "Focus on precision and clarity",
        "Build up to full sentences",
    ],
    practice: PracticeContent {
        title: "Tongue Twister Practice",
        lines: &[
            "Betty Botter bought some butter",
            "But she said the butter's bitter",
            "If I put it in my batter",
            "It will make my batter bitter",
            "But a bit of better butter",
            "Will make my batter better",
        ],
        tip: "Start slowly and clearly. Focus on each word and sound. Gradually increase speed while maintaining precision.",
    },
};

static VOICE: ExerciseScript = ExerciseScript {
    steps: &[
        "Begin with gentle humming",
        "Practice pitch variations",
        "Work on volume control",
        "Develop vocal resonance",
        "Express emotions through voice",
    ],
    practice: PracticeContent {
        title: "Voice Control Practice",
        lines: &[
            "Hum 'mmmm' - Feel the vibration in your chest",
            "Say 'la la la' - Practice pitch variations",
            "Count 1-10 - Vary your volume (whisper to loud)",
            "Say 'hello' - Practice different emotions",
            "Practice 'ah-oh-ee' - Work on resonance",
        ],
        tip: "Focus on feeling the vibrations in your chest and face. Practice different pitches and volumes with control.",
    },
};

static LANGUAGE: ExerciseScript = ExerciseScript {
    steps: &[
        "Read the text silently first",
        "Understand the content and context",
        "Practice pronunciation of difficult words",
        "Focus on natural expression",
        "Deliver with confidence and clarity",
    ],
    practice: PracticeContent {
        title: "Reading Comprehension Practice",
        lines: &[
            "The sun was setting behind the mountains, casting long shadows across the valley. Birds were returning to their nests, and a gentle breeze rustled through the trees. It was a perfect evening for reflection and gratitude.",
        ],
        tip: "Read the passage with expression and emotion. Vary your pace and tone to bring the scene to life.",
    },
};

static BREATHING: ExerciseScript = ExerciseScript {
    steps: &[
        "Sit comfortably with your back straight",
        "Place one hand on your chest, one on your belly",
        "Breathe in slowly through your nose",
        "Feel your belly expand, not your chest",
        "Exhale slowly and completely",
        "Practice this rhythm for 5 minutes",
    ],
    practice: PracticeContent {
        title: "Diaphragmatic Breathing Practice",
        lines: &[
            "Place one hand on your chest, one on your belly",
            "Breathe in slowly through your nose (4 counts)",
            "Feel your belly expand, not your chest",
            "Hold the breath (4 counts)",
            "Exhale slowly through your mouth (6 counts)",
            "Repeat this cycle 10 times",
        ],
        tip: "Focus on breathing from your diaphragm. Your belly should rise and fall, not your chest. Practice this rhythm slowly and mindfully.",
    },
};

static RESONANCE: ExerciseScript = ExerciseScript {
    steps: &[
        "Start with gentle humming",
        "Feel the vibration in your chest",
        "Move the sound to your nasal cavity",
        "Practice with different vowel sounds",
        "Maintain steady pitch and volume",
        "Feel the resonance throughout your body",
    ],
    practice: PracticeContent {
        title: "Vocal Resonance Practice",
        lines: &[
            "Hum 'mmmm' - Feel chest vibration",
            "Say 'nnnn' - Feel nasal resonance",
            "Practice 'ng' sound - Feel throat vibration",
            "Say 'ah' - Feel full body resonance",
            "Combine sounds: 'mm-ah', 'nn-oh', 'ng-ee'",
        ],
        tip: "Focus on feeling the vibrations in different parts of your body. Resonance should feel like a gentle hum throughout your chest and face.",
    },
};

static PROJECTION: ExerciseScript = ExerciseScript {
    steps: &[
        "Stand with good posture",
        "Take a deep breath from your diaphragm",
        "Speak from your chest, not your throat",
        "Project your voice to the back of the room",
        "Maintain clear articulation",
        "Practice with increasing distance",
    ],
    practice: PracticeContent {
        title: "Voice Projection Practice",
        lines: &[
            "Stand 5 feet from a wall and speak clearly",
            "Say 'Hello, can you hear me?'",
            "Move to 10 feet and repeat",
            "Move to 15 feet and project your voice",
            "Practice: 'The weather is beautiful today!'",
            "Project to the back of an imaginary room",
        ],
        tip: "Stand with good posture, breathe from your diaphragm, and speak from your chest. Imagine your voice reaching the back of a large room.",
    },
};

static EXPRESSION: ExerciseScript = ExerciseScript {
    steps: &[
        "Read the text with different emotions",
        "Practice happy, sad, angry, and calm tones",
        "Use facial expressions to enhance emotion",
        "Vary your pitch and pace",
        "Connect emotionally with your audience",
        "Maintain authenticity in expression",
    ],
    practice: PracticeContent {
        title: "Emotional Expression Practice",
        lines: &[
            "Happy: 'What a wonderful day this is!'",
            "Sad: 'I feel a bit down today'",
            "Excited: 'I can't wait to see you!'",
            "Calm: 'Everything will be alright'",
            "Confident: 'I know I can do this'",
            "Surprised: 'Oh my goodness, really?'",
        ],
        tip: "Practice each phrase with genuine emotion. Use facial expressions, vary your pitch, and connect with the feeling behind each word.",
    },
};

static CONFIDENCE: ExerciseScript = ExerciseScript {
    steps: &[
        "Stand tall with open posture",
        "Make eye contact with your audience",
        "Speak clearly and at a steady pace",
        "Use positive self-talk",
        "Practice power poses before speaking",
        "Celebrate small victories",
    ],
    practice: PracticeContent {
        title: "Confidence Building Practice",
        lines: &[
            "Stand tall with open posture",
            "Make eye contact with yourself in the mirror",
            "Say 'I am confident and capable'",
            "Practice power poses for 2 minutes",
            "Speak clearly: 'My voice matters'",
            "End with: 'I am proud of my progress'",
        ],
        tip: "Stand in front of a mirror. Practice power poses, make eye contact, and speak with conviction. Believe in what you're saying.",
    },
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_type_has_four_to_six_steps() {
        for t in ExerciseType::iter() {
            let script = script_for(t);
            assert!(
                (4..=6).contains(&script.step_count()),
                "{t} has {} steps",
                script.step_count()
            );
            assert!(!script.practice.lines.is_empty());
            assert!(!script.practice.title.is_empty());
            assert!(!script.practice.tip.is_empty());
        }
    }

    #[test]
    fn test_unknown_type_falls_back_to_pronunciation() {
        let fallback = script_for(ExerciseType::from_name_or_default("Storytelling"));
        assert_eq!(fallback, script_for(ExerciseType::Pronunciation));
        assert_eq!(fallback.practice.title, "Vowel Sound Practice");

        let empty = script_for(ExerciseType::from_name_or_default(""));
        assert_eq!(empty, script_for(ExerciseType::Pronunciation));
    }

    #[test]
    fn test_known_names_resolve_to_their_own_script() {
        assert_eq!(script_for(ExerciseType::Breathing).step_count(), 6);
        assert_eq!(
            script_for(ExerciseType::Breathing).practice.title,
            "Diaphragmatic Breathing Practice"
        );
        assert_eq!(
            script_for(ExerciseType::Fluency).step(0),
            Some("Start with slow, deliberate speech")
        );
    }

    #[test]
    fn test_step_out_of_range() {
        let script = script_for(ExerciseType::Voice);
        assert_eq!(script.step(script.step_count()), None);
    }
}
