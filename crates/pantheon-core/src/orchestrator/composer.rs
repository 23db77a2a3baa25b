//! Response composer: prompt enrichment, reply augmentation, persona system prompt, and
//! the canned fallback table used when the generator is unavailable.
//!
//! All functions are pure string transforms. Absent fields are omitted, never rendered empty.

use super::cycle::{Phase, PhaseSnapshot};
use super::cycle_insight::Insight;
use super::emotion::Emotion;
use super::persona::{Persona, PersonaId};

const CONTEXT_OPEN: &str = " [User is in ";
const SYMPTOMS_OPEN: &str = " [Symptoms: ";
const ADVICE_OPEN: &str = " [Advice: ";
const COMFORT_HINT: &str = "please be extra empathetic and provide practical comfort and symptom tips.";
const ENERGY_HINT: &str = "consider energy, mood, and self-care.";

const CARE_TIP_LIMIT: usize = 2;

pub const TRACKING_OFFER_NOTE: &str = "🌸 Would you like me to help you start tracking your menstrual cycle? It can provide valuable insights and personalized support.";

/// Appends bracketed cycle context to the raw message.
///
/// Order is fixed: phase clause (only with a snapshot), symptoms (only when logged), advice
/// (only when the insight carries one). [`strip_context`] relies on that order.
pub fn compose_prompt(message: &str, snapshot: Option<&PhaseSnapshot>, insight: &Insight) -> String {
    let mut prompt = message.to_string();
    if let Some(snap) = snapshot {
        let hint = if snap.phase == Phase::Menstrual {
            COMFORT_HINT
        } else {
            ENERGY_HINT
        };
        prompt.push_str(&format!(
            "{}{} phase (Day {}/{}) – {}]",
            CONTEXT_OPEN,
            snap.phase.as_str(),
            snap.cycle_day,
            snap.average_cycle_length,
            hint
        ));
        if !snap.symptoms.is_empty() {
            prompt.push_str(&format!("{}{}]", SYMPTOMS_OPEN, snap.symptoms.join(", ")));
        }
    }
    if let Some(advice) = insight.phase_specific_advice.as_deref() {
        prompt.push_str(&format!("{}{}]", ADVICE_OPEN, advice));
    }
    prompt
}

/// Cuts the last `open ... ]` clause off `text` if it is the trailing clause.
fn strip_trailing<'a>(text: &'a str, open: &str, accept: impl Fn(&str) -> bool) -> &'a str {
    match text.rfind(open) {
        Some(i) if text.ends_with(']') && accept(&text[i + open.len()..text.len() - 1]) => &text[..i],
        _ => text,
    }
}

/// Inverse of [`compose_prompt`]: removes the trailing context clauses in reverse order.
/// A message that itself ends in one of these bracketed markers is indistinguishable from
/// enriched text and will lose it.
pub fn strip_context(prompt: &str) -> &str {
    let rest = strip_trailing(prompt, ADVICE_OPEN, |_| true);
    let rest = strip_trailing(rest, SYMPTOMS_OPEN, |body| !body.contains(']'));
    strip_trailing(rest, CONTEXT_OPEN, |body| {
        !body.contains(']')
            && (body.ends_with(COMFORT_HINT) || body.ends_with(ENERGY_HINT))
            && Phase::ALL
                .iter()
                .any(|p| body.starts_with(&format!("{} phase (Day ", p.as_str())))
    })
}

/// Adds gentle-care excerpts to the generated text. Only the menstrual phase is augmented.
pub fn compose_reply(generated: &str, phase: Option<Phase>, guidance: &Insight) -> String {
    let mut reply = generated.to_string();
    if phase != Some(Phase::Menstrual) {
        return reply;
    }
    if let Some(tips) = guidance.symptom_management.as_ref().filter(|t| !t.is_empty()) {
        let take = tips.len().min(CARE_TIP_LIMIT);
        reply.push_str("\n\n🌸 Gentle care tips:\n• ");
        reply.push_str(&tips[..take].join("\n• "));
    }
    if let Some(first) = guidance.mood_support.as_ref().and_then(|m| m.first()) {
        reply.push_str("\n\n💖 Remember: ");
        reply.push_str(first);
    }
    reply
}

/// Dashboard-style notes: the insight's advice and, when offered, the tracking invitation.
pub fn append_insight_notes(reply: &str, insight: &Insight) -> String {
    let mut out = reply.to_string();
    if let Some(advice) = insight.phase_specific_advice.as_deref() {
        out.push_str("\n\n💫 **Cycle Insight**: ");
        out.push_str(advice);
    }
    if insight.should_offer_tracking {
        out.push_str("\n\n");
        out.push_str(TRACKING_OFFER_NOTE);
    }
    out
}

/// Persona identity block sent as the system turn.
pub fn system_prompt(persona: &Persona, emotion: Emotion) -> String {
    format!(
        "You are {name}, goddess of {domain}.\n\
         Personality: {personality}\n\
         Approach: {approach}\n\
         Specialties: {specialties}\n\
         Communication: {style}\n\n\
         The user appears {emotion}. Respond empathetically as {name}.",
        name = persona.name,
        domain = persona.domain,
        personality = persona.personality,
        approach = persona.approach,
        specialties = persona.specialties.join(", "),
        style = persona.communication_style,
        emotion = emotion.as_str(),
    )
}

/// Canned reply per persona and emotion.
pub fn fallback_reply(persona: PersonaId, emotion: Emotion) -> &'static str {
    use Emotion::*;
    use PersonaId::*;
    match (persona, emotion) {
        (Strategic, Happy) => "It's wonderful you're feeling positive! Let's harness this into a clear plan.",
        (Strategic, Sad) => "I'm sorry you're feeling down. Let's analyze your concerns and find solutions.",
        (Strategic, Angry) => "I understand your frustration. Let's break things down logically to help.",
        (Strategic, Anxious) => "I sense your worry. We'll tackle this step by step together.",
        (Strategic, Excited) => "Your excitement is great! Let's channel it toward your goals.",
        (Strategic, Neutral) => "I'm here to offer wisdom. How can I assist you today?",

        (Romantic, Happy) => "Your joy is beautiful! Let's nurture this self-love and compassion.",
        (Romantic, Sad) => "I feel your sadness. You deserve love and care. Let me comfort you.",
        (Romantic, Angry) => "I hear your passion. Let's use it to set healthy boundaries.",
        (Romantic, Anxious) => "You're not alone. Take a deep breath. I'm here for you.",
        (Romantic, Excited) => "Your excitement sparkles! Let's celebrate and spread this warmth.",
        (Romantic, Neutral) => "I'm here to help you with love and acceptance. What do you need?",

        (Independence, Happy) => "Your independence shines! Let's strengthen your personal power.",
        (Independence, Sad) => "I see your pain. Remember your inner strength. Together we'll prevail.",
        (Independence, Angry) => "Your anger shows your boundaries. Let's use it to protect your peace.",
        (Independence, Anxious) => "Trust your resilience. I'll guide you to assert your needs.",
        (Independence, Excited) => "Your fierce spirit is alive! Let's pursue your aspirations boldly.",
        (Independence, Neutral) => "I'm here to empower your independence. What would you like?",

        (Loyalty, Happy) => "Your relationships bring joy! Let's cultivate respect and loyalty.",
        (Loyalty, Sad) => "Family bonds can hurt. You deserve dignity. Let's discuss support.",
        (Loyalty, Angry) => "Feelings matter. We'll address conflict with respect and care.",
        (Loyalty, Anxious) => "Commitments can worry us. Let's foster stability and trust.",
        (Loyalty, Excited) => "Your excitement for love is inspiring! Let's deepen connections.",
        (Loyalty, Neutral) => "I'm here to nurture healthy bonds. How can I assist?",

        (Nurturing, Happy) => "Your well-being nourishes all! Let's tend to your health and care.",
        (Nurturing, Sad) => "I feel your sorrow. Let me comfort you with nurturing guidance.",
        (Nurturing, Angry) => "Your frustration shows you care deeply. Let's soothe it gently.",
        (Nurturing, Anxious) => "Focus on self-nourishment. You deserve comfort and calm.",
        (Nurturing, Excited) => "Your energy is fertile ground! Let's cultivate healthy habits.",
        (Nurturing, Neutral) => "I'm here to nurture your body and soul. How can I support?",

        (Transformation, Happy) => "Your renewal is beautiful! Embrace your growth and transformation.",
        (Transformation, Sad) => "I understand grief. Let's honor your pain and guide you through it.",
        (Transformation, Angry) => "Transformation can be tough. Let's channel your anger into growth.",
        (Transformation, Anxious) => "Transitions can unsettle us. I'll help you find steady ground.",
        (Transformation, Excited) => "New beginnings excite me too! Let's welcome positive change.",
        (Transformation, Neutral) => "I'm here to guide your healing journey. What transitions face you?",

        (Peace, Happy) => "Your calm warms my heart. Let's cultivate more peace and comfort.",
        (Peace, Sad) => "My hearth is open for your sorrow. Breathe and find solace here.",
        (Peace, Angry) => "Your fire needs tending. Let's soothe it and restore balance.",
        (Peace, Anxious) => "You're safe here. We'll create calm to ease your worries.",
        (Peace, Excited) => "Your gentle joy brightens us. Let's share this warmth together.",
        (Peace, Neutral) => "Welcome to my hearth. How can I bring you comfort today?",

        (Intuition, Happy) => "Your intuition guides you well. Trust this joy and inner light.",
        (Intuition, Sad) => "In darkness lies wisdom. I'll help you navigate and transform grief.",
        (Intuition, Angry) => "Your anger reveals truths. Let's explore what it uncovers.",
        (Intuition, Anxious) => "Anxiety signals insight. Let's listen to your inner voice.",
        (Intuition, Excited) => "Your excitement heralds new paths. Trust your instincts.",
        (Intuition, Neutral) => "I'm here to illuminate your path with intuitive guidance.",
    }
}
