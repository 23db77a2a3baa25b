//! Cycle insight advisor: phase-keyed guidance and the tracking opt-in offer.

use serde::{Deserialize, Serialize};

use super::cycle::{Phase, PhaseSnapshot};

/// Lower-cased substrings that mark a message as cycle-related.
pub const CYCLE_KEYWORDS: [&str; 30] = [
    "period",
    "periods",
    "menstrual",
    "menstruation",
    "cycle",
    "cramps",
    "pms",
    "bloating",
    "heavy flow",
    "light flow",
    "irregular",
    "late period",
    "early period",
    "ovulation",
    "hormones",
    "mood swings",
    "breast tenderness",
    "acne",
    "breakout",
    "fatigue",
    "tired",
    "emotional",
    "cramping",
    "pain",
    "uncomfortable",
    "flow",
    "spotting",
    "breakthrough bleeding",
    "missed period",
    "delayed",
];

pub const TRACKING_OPT_IN_ADVICE: &str = "I notice you're dealing with menstrual concerns. Would you like me to help you start tracking your cycle? It could provide valuable insights into your patterns and symptoms.";

pub const GENERIC_TRACKING_ADVICE: &str = "I'd love to help you understand your cycle better. Tracking can provide insights into your body's patterns.";

const GENERIC_QUICK_TIP: &str = "Listen to your body's signals and honor its needs";

/// Structured guidance derived from a phase or from message content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    #[serde(default)]
    pub should_offer_tracking: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_specific_advice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom_management: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_tips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_recommendations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_support: Option<Vec<String>>,
}

impl Insight {
    /// Offer to start tracking, carrying the given advice text.
    pub fn offer_tracking(advice: &str) -> Self {
        Self {
            should_offer_tracking: true,
            phase_specific_advice: Some(advice.to_string()),
            ..Default::default()
        }
    }
}

fn owned(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}

/// Stateless; holds nothing but static tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleInsightAdvisor;

impl CycleInsightAdvisor {
    pub fn new() -> Self {
        Self
    }

    /// True when the lower-cased message contains any cycle keyword as a substring.
    pub fn mentions_cycle(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        CYCLE_KEYWORDS.iter().any(|k| lower.contains(k))
    }

    /// Opt-in offer first, then phase guidance, else an empty insight.
    pub fn analyze_relevance(
        &self,
        message: &str,
        snapshot: Option<&PhaseSnapshot>,
        tracking_enabled: bool,
    ) -> Insight {
        if self.mentions_cycle(message) && !tracking_enabled {
            return Insight::offer_tracking(TRACKING_OPT_IN_ADVICE);
        }
        match snapshot {
            Some(snap) => self.phase_guidance(snap.phase),
            None => Insight::default(),
        }
    }

    /// Guidance for a phase name from an untyped source. Unknown names get the generic offer.
    pub fn guidance_for_key(&self, phase: &str) -> Insight {
        match Phase::parse(phase) {
            Some(p) => self.phase_guidance(p),
            None => Insight::offer_tracking(GENERIC_TRACKING_ADVICE),
        }
    }

    pub fn phase_guidance(&self, phase: Phase) -> Insight {
        match phase {
            Phase::Menstrual => Insight {
                should_offer_tracking: false,
                phase_specific_advice: Some("You're in your menstrual phase - a time for rest and gentle care. Your body is shedding the uterine lining, which can cause cramping and fatigue.".to_string()),
                symptom_management: owned(&[
                    "Use a heating pad for cramps",
                    "Try gentle yoga or stretching",
                    "Take warm baths with Epsom salts",
                    "Practice deep breathing for pain relief",
                    "Stay hydrated with warm herbal teas",
                ]),
                nutritional_tips: owned(&[
                    "Iron-rich foods like spinach, lentils, and lean meats",
                    "Magnesium from dark chocolate, nuts, and seeds",
                    "Anti-inflammatory foods like ginger and turmeric",
                    "Avoid excessive caffeine and sugar",
                    "Stay hydrated with water and herbal teas",
                ]),
                exercise_recommendations: owned(&[
                    "Gentle walks or light stretching",
                    "Restorative yoga poses",
                    "Avoid high-intensity workouts",
                    "Listen to your body's need for rest",
                ]),
                mood_support: owned(&[
                    "Practice self-compassion",
                    "Allow yourself extra rest",
                    "Journal your feelings",
                    "Connect with supportive friends",
                    "Engage in comforting activities",
                ]),
            },
            Phase::Follicular => Insight {
                should_offer_tracking: false,
                phase_specific_advice: Some("You're in your follicular phase - a time of renewal and increasing energy. Your body is preparing for ovulation.".to_string()),
                symptom_management: owned(&[
                    "Support increasing energy with good nutrition",
                    "Stay hydrated as energy builds",
                    "Monitor any PMS symptoms fading",
                ]),
                nutritional_tips: owned(&[
                    "Protein-rich foods for energy",
                    "Complex carbohydrates for sustained energy",
                    "Fresh fruits and vegetables",
                    "Adequate healthy fats",
                ]),
                exercise_recommendations: owned(&[
                    "Gradually increase activity levels",
                    "Try new workout routines",
                    "Strength training can be beneficial",
                    "Cardiovascular exercises",
                ]),
                mood_support: owned(&[
                    "Set new goals and intentions",
                    "Embrace creative projects",
                    "Social activities may feel more appealing",
                    "Plan challenging tasks for later in this phase",
                ]),
            },
            Phase::Ovulatory => Insight {
                should_offer_tracking: false,
                phase_specific_advice: Some("You're in your ovulatory phase - peak energy and fertility time. You may feel most confident and social now.".to_string()),
                symptom_management: owned(&[
                    "Track ovulation signs if trying to conceive",
                    "Stay extra hydrated",
                    "Monitor any ovulation pain (mittelschmerz)",
                ]),
                nutritional_tips: owned(&[
                    "Antioxidant-rich foods",
                    "Healthy fats for hormone production",
                    "Folate-rich foods if considering pregnancy",
                    "Plenty of water",
                ]),
                exercise_recommendations: owned(&[
                    "High-intensity workouts are well-tolerated",
                    "Team sports or group fitness",
                    "Dancing or fun activities",
                    "Peak performance time for athletics",
                ]),
                mood_support: owned(&[
                    "Embrace social opportunities",
                    "Confidence is naturally higher",
                    "Great time for important conversations",
                    "Creative and productive energy peaks",
                ]),
            },
            Phase::Luteal => Insight {
                should_offer_tracking: false,
                phase_specific_advice: Some("You're in your luteal phase - energy may be declining and PMS symptoms might appear. This is a time to slow down and prepare for menstruation.".to_string()),
                symptom_management: owned(&[
                    "Manage PMS symptoms proactively",
                    "Use stress-reduction techniques",
                    "Monitor mood changes with compassion",
                    "Prepare for potential breast tenderness or bloating",
                ]),
                nutritional_tips: owned(&[
                    "Complex carbohydrates for mood stability",
                    "Calcium and magnesium for PMS relief",
                    "Limit salt to reduce bloating",
                    "B-vitamins for mood support",
                    "Avoid alcohol which can worsen PMS",
                ]),
                exercise_recommendations: owned(&[
                    "Moderate exercise like walking or swimming",
                    "Yoga for stress relief",
                    "Avoid overexertion",
                    "Stretching for tension relief",
                ]),
                mood_support: owned(&[
                    "Practice patience with yourself",
                    "Prepare for emotional sensitivity",
                    "Maintain regular sleep schedule",
                    "Use relaxation techniques",
                    "Plan lighter social schedules",
                ]),
            },
        }
    }

    /// Four short tips for the phase.
    pub fn quick_tips(&self, phase: Phase) -> Vec<&'static str> {
        match phase {
            Phase::Menstrual => vec![
                "Rest when your body needs it",
                "Use heat therapy for cramps",
                "Stay hydrated with warm drinks",
                "Gentle movement can help with circulation",
            ],
            Phase::Follicular => vec![
                "Take advantage of increasing energy",
                "Plan challenging projects",
                "Focus on protein and complex carbs",
                "Great time to start new exercise routines",
            ],
            Phase::Ovulatory => vec![
                "Peak time for social and physical activities",
                "High-intensity exercise is well tolerated",
                "Confidence and communication skills peak",
                "Ideal time for important meetings or dates",
            ],
            Phase::Luteal => vec![
                "Prepare for potential PMS symptoms",
                "Focus on stress management",
                "Limit salt and sugar intake",
                "Plan for more downtime and self-care",
            ],
        }
    }

    pub fn quick_tips_for_key(&self, phase: &str) -> Vec<&'static str> {
        Phase::parse(phase)
            .map(|p| self.quick_tips(p))
            .unwrap_or_else(|| vec![GENERIC_QUICK_TIP])
    }
}
