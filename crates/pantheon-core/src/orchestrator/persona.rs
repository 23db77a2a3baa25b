//! Persona catalog and router.
//!
//! **PersonaId** is the closed set of responders. Each id maps to a fixed [`Persona`] (display
//! identity, tone, specialties, empathy weight). **PersonaRouter** is the switchboard: an
//! ordered rule list where the first matching rule picks the persona. Physiological signals
//! from the active cycle outrank message topic; with neither, the strategic persona answers.

use serde::{Deserialize, Serialize};

use super::cycle::Phase;
use super::emotion::KeywordSet;

// ---------------------------------------------------------------------------
// PersonaId + catalog
// ---------------------------------------------------------------------------

/// Identifier of one of the eight personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaId {
    /// Athena. Default responder.
    #[default]
    Strategic,
    /// Aphrodite.
    Romantic,
    /// Artemis.
    Independence,
    /// Hera.
    Loyalty,
    /// Demeter. Target of the physiological override.
    Nurturing,
    /// Persephone.
    Transformation,
    /// Hestia.
    Peace,
    /// Hecate.
    Intuition,
}

impl PersonaId {
    pub const ALL: [PersonaId; 8] = [
        PersonaId::Strategic,
        PersonaId::Romantic,
        PersonaId::Independence,
        PersonaId::Loyalty,
        PersonaId::Nurturing,
        PersonaId::Transformation,
        PersonaId::Peace,
        PersonaId::Intuition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaId::Strategic => "strategic",
            PersonaId::Romantic => "romantic",
            PersonaId::Independence => "independence",
            PersonaId::Loyalty => "loyalty",
            PersonaId::Nurturing => "nurturing",
            PersonaId::Transformation => "transformation",
            PersonaId::Peace => "peace",
            PersonaId::Intuition => "intuition",
        }
    }

    /// Accepts either the id or the display name ("athena", "Demeter", ...).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strategic" | "athena" => Some(PersonaId::Strategic),
            "romantic" | "aphrodite" => Some(PersonaId::Romantic),
            "independence" | "artemis" => Some(PersonaId::Independence),
            "loyalty" | "hera" => Some(PersonaId::Loyalty),
            "nurturing" | "demeter" => Some(PersonaId::Nurturing),
            "transformation" | "persephone" => Some(PersonaId::Transformation),
            "peace" | "hestia" => Some(PersonaId::Peace),
            "intuition" | "hecate" => Some(PersonaId::Intuition),
            _ => None,
        }
    }

    /// Full persona definition for this id.
    pub fn persona(&self) -> Persona {
        match self {
            PersonaId::Strategic => Persona {
                id: *self,
                name: "Athena",
                domain: "Wisdom & Strategic Thinking",
                personality: "Analytical, wise, strategic, logical",
                approach: "Breaks down problems systematically and offers practical guidance",
                specialties: &["career", "decision-making", "strategy", "education", "leadership"],
                communication_style: "Direct but supportive, uses logical frameworks",
                empathy_level: 7,
            },
            PersonaId::Romantic => Persona {
                id: *self,
                name: "Aphrodite",
                domain: "Love & Self-Acceptance",
                personality: "Passionate, warm, affirming",
                approach: "Focuses on self-love and relationships",
                specialties: &["relationships", "self-esteem", "romance", "body image"],
                communication_style: "Warm and celebratory",
                empathy_level: 9,
            },
            PersonaId::Independence => Persona {
                id: *self,
                name: "Artemis",
                domain: "Independence & Boundaries",
                personality: "Fierce, empowering",
                approach: "Champions independence and boundaries",
                specialties: &["boundaries", "assertiveness", "freedom"],
                communication_style: "Strong and direct",
                empathy_level: 6,
            },
            PersonaId::Loyalty => Persona {
                id: *self,
                name: "Hera",
                domain: "Relationships & Commitment",
                personality: "Dignified, protective",
                approach: "Emphasizes respect and loyalty",
                specialties: &["marriage", "family", "commitment", "respect"],
                communication_style: "Respectful and caring",
                empathy_level: 7,
            },
            PersonaId::Nurturing => Persona {
                id: *self,
                name: "Demeter",
                domain: "Nurturing & Health",
                personality: "Maternal, healing",
                approach: "Provides comfort and nourishment",
                specialties: &["health", "nutrition", "self-care", "menstrual health"],
                communication_style: "Gentle and nurturing",
                empathy_level: 10,
            },
            PersonaId::Transformation => Persona {
                id: *self,
                name: "Persephone",
                domain: "Transformation & Healing",
                personality: "Resilient, understanding",
                approach: "Guides through challenging transitions",
                specialties: &["healing", "trauma", "grief", "growth"],
                communication_style: "Empathetic and hopeful",
                empathy_level: 10,
            },
            PersonaId::Peace => Persona {
                id: *self,
                name: "Hestia",
                domain: "Inner Peace & Home",
                personality: "Calm, comforting",
                approach: "Promotes grounding and peace",
                specialties: &["anxiety", "stress relief", "mindfulness", "home life"],
                communication_style: "Soothing and gentle",
                empathy_level: 8,
            },
            PersonaId::Intuition => Persona {
                id: *self,
                name: "Hecate",
                domain: "Intuition & Inner Wisdom",
                personality: "Mystical, insightful",
                approach: "Encourages trust in intuition",
                specialties: &["intuition", "spirituality", "dreams", "purpose"],
                communication_style: "Mysterious and probing",
                empathy_level: 8,
            },
        }
    }
}

impl std::fmt::Display for PersonaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable persona definition. Empathy weight is 0–10.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: PersonaId,
    pub name: &'static str,
    pub domain: &'static str,
    pub personality: &'static str,
    pub approach: &'static str,
    pub specialties: &'static [&'static str],
    pub communication_style: &'static str,
    pub empathy_level: u8,
}

/// The full catalog in id order.
pub fn catalog() -> Vec<Persona> {
    PersonaId::ALL.iter().map(PersonaId::persona).collect()
}

// ---------------------------------------------------------------------------
// PersonaRouter
// ---------------------------------------------------------------------------

/// Active-cycle symptoms that route straight to the nurturing persona. Compared lower-cased, exact.
pub const DISTRESS_SYMPTOMS: [&str; 6] = [
    "cramps",
    "pain",
    "heavy flow",
    "fatigue",
    "mood changes",
    "bloating",
];

/// Which rule selected the persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteReason {
    MenstrualPhase,
    DistressSymptom(String),
    Topic(PersonaId),
    Default,
}

impl RouteReason {
    pub fn label(&self) -> &'static str {
        match self {
            RouteReason::MenstrualPhase => "menstrual_phase",
            RouteReason::DistressSymptom(_) => "distress_symptom",
            RouteReason::Topic(_) => "topic",
            RouteReason::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub persona_id: PersonaId,
    /// True iff the selected persona differs from the caller's current one.
    pub switched: bool,
    pub reason: RouteReason,
}

enum RouteRule {
    /// Menstrual phase or a distress symptom on the active cycle.
    PhysiologicalOverride,
    Topic { target: PersonaId, keywords: KeywordSet },
}

/// Ordered persona selection. Build once and share by reference.
pub struct PersonaRouter {
    rules: Vec<RouteRule>,
    fallback: PersonaId,
}

impl PersonaRouter {
    pub fn new() -> Self {
        let topic = |target, words: &[&str]| RouteRule::Topic {
            target,
            keywords: KeywordSet::new(words),
        };
        let rules = vec![
            RouteRule::PhysiologicalOverride,
            topic(PersonaId::Strategic, &["work", "career", "decision"]),
            topic(PersonaId::Romantic, &["love", "relationship"]),
            topic(PersonaId::Nurturing, &["food", "eat", "craving"]),
            topic(PersonaId::Transformation, &["trauma", "grief"]),
            topic(PersonaId::Peace, &["stress", "anxious"]),
            topic(PersonaId::Loyalty, &["family", "commitment"]),
            topic(
                PersonaId::Independence,
                &["boundary", "boundaries", "independent", "independence"],
            ),
            topic(PersonaId::Intuition, &["intuition", "spiritual"]),
        ];
        Self {
            rules,
            fallback: PersonaId::Strategic,
        }
    }

    /// Picks the persona for this turn. A missing `current` always counts as a switch.
    ///
    /// `symptoms` are checked even when `phase` is unknown.
    pub fn select_persona(
        &self,
        message: &str,
        current: Option<PersonaId>,
        phase: Option<Phase>,
        symptoms: &[String],
    ) -> RouteDecision {
        let (persona_id, reason) = self
            .rules
            .iter()
            .find_map(|rule| Self::evaluate(rule, message, phase, symptoms))
            .unwrap_or((self.fallback, RouteReason::Default));
        let switched = current != Some(persona_id);

        tracing::info!(
            target: "pantheon::router",
            persona = persona_id.as_str(),
            switched,
            reason = reason.label(),
            "Persona selected"
        );

        RouteDecision {
            persona_id,
            switched,
            reason,
        }
    }

    fn evaluate(
        rule: &RouteRule,
        message: &str,
        phase: Option<Phase>,
        symptoms: &[String],
    ) -> Option<(PersonaId, RouteReason)> {
        match rule {
            RouteRule::PhysiologicalOverride => {
                if phase == Some(Phase::Menstrual) {
                    return Some((PersonaId::Nurturing, RouteReason::MenstrualPhase));
                }
                symptoms
                    .iter()
                    .map(|s| s.trim().to_lowercase())
                    .find(|s| DISTRESS_SYMPTOMS.contains(&s.as_str()))
                    .map(|s| (PersonaId::Nurturing, RouteReason::DistressSymptom(s)))
            }
            RouteRule::Topic { target, keywords } => keywords
                .is_match(message)
                .then(|| (*target, RouteReason::Topic(*target))),
        }
    }
}

impl Default for PersonaRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::cycle::{compute_phase, PhaseSnapshot};
    use crate::shared::CycleRecord;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn snapshot_on_day(day: i64, symptoms: &[&str]) -> PhaseSnapshot {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let history = vec![CycleRecord::new(start).with_symptoms(symptoms.iter().copied())];
        let now = Utc.from_utc_datetime(&start.and_hms_opt(9, 0, 0).unwrap()) + Duration::days(day - 1);
        compute_phase(&history, now, 28, 5).unwrap()
    }

    #[test]
    fn catalog_has_eight_distinct_personas() {
        let all = catalog();
        assert_eq!(all.len(), 8);
        assert_eq!(PersonaId::Nurturing.persona().name, "Demeter");
        assert_eq!(PersonaId::Nurturing.persona().empathy_level, 10);
        assert_eq!(PersonaId::Independence.persona().empathy_level, 6);
        assert!(all.iter().all(|p| p.empathy_level <= 10));
    }

    #[test]
    fn ids_parse_from_name_or_id() {
        assert_eq!(PersonaId::from_str("athena"), Some(PersonaId::Strategic));
        assert_eq!(PersonaId::from_str("Peace"), Some(PersonaId::Peace));
        assert_eq!(PersonaId::from_str("zeus"), None);
        for id in PersonaId::ALL {
            assert_eq!(PersonaId::from_str(id.as_str()), Some(id));
        }
    }

    #[test]
    fn menstrual_phase_overrides_topic() {
        let router = PersonaRouter::new();
        let snap = snapshot_on_day(2, &[]);
        let d = router.select_persona(
            "my career decision",
            Some(PersonaId::Strategic),
            Some(snap.phase),
            &snap.symptoms,
        );
        assert_eq!(d.persona_id, PersonaId::Nurturing);
        assert!(d.switched);
        assert_eq!(d.reason, RouteReason::MenstrualPhase);
    }

    #[test]
    fn distress_symptom_overrides_outside_menstruation() {
        let router = PersonaRouter::new();
        let snap = snapshot_on_day(20, &["Bloating"]);
        assert_eq!(snap.phase, Phase::Luteal);
        let d = router.select_persona("anything", Some(PersonaId::Nurturing), Some(snap.phase), &snap.symptoms);
        assert_eq!(d.persona_id, PersonaId::Nurturing);
        assert!(!d.switched);
        assert_eq!(d.reason, RouteReason::DistressSymptom("bloating".into()));

        // partial symptom text is not an exact hit
        let snap = snapshot_on_day(20, &["mild pain in back"]);
        let d = router.select_persona("hello", None, Some(snap.phase), &snap.symptoms);
        assert_eq!(d.persona_id, PersonaId::Strategic);
    }

    #[test]
    fn symptoms_override_without_a_known_phase() {
        let router = PersonaRouter::new();
        let d = router.select_persona("my career", Some(PersonaId::Strategic), None, &["cramps".to_string()]);
        assert_eq!(d.persona_id, PersonaId::Nurturing);
        assert!(d.switched);
        assert_eq!(d.reason, RouteReason::DistressSymptom("cramps".into()));
    }

    #[test]
    fn topics_follow_rule_order() {
        let router = PersonaRouter::new();
        let cases = [
            ("Work is draining", PersonaId::Strategic),
            ("my relationship", PersonaId::Romantic),
            ("I keep craving sugar", PersonaId::Nurturing),
            ("processing grief", PersonaId::Transformation),
            ("so much stress", PersonaId::Peace),
            ("family dinner", PersonaId::Loyalty),
            ("setting boundaries", PersonaId::Independence),
            ("a spiritual question", PersonaId::Intuition),
            // work precedes love
            ("love my work", PersonaId::Strategic),
            // whole words only
            ("homework and lovely weather", PersonaId::Strategic),
        ];
        for (text, expected) in cases {
            assert_eq!(router.select_persona(text, None, None, &[]).persona_id, expected, "{}", text);
        }
    }

    #[test]
    fn default_persona_and_switch_flag() {
        let router = PersonaRouter::new();
        let d = router.select_persona("hello there", Some(PersonaId::Strategic), None, &[]);
        assert_eq!(d.persona_id, PersonaId::Strategic);
        assert!(!d.switched);
        assert_eq!(d.reason, RouteReason::Default);

        let d = router.select_persona("hello there", Some(PersonaId::Peace), None, &[]);
        assert!(d.switched);

        let d = router.select_persona("hello there", None, None, &[]);
        assert!(d.switched);
    }
}
