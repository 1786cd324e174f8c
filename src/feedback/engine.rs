use super::types::{FeedbackResult, RiskBand, Scenario};
use crate::models::FeatureRecord;

/// Marker prepended to the stored parent summary.
pub const SUMMARY_PREFIX: &str = "PARENT: ";

/// Maximum characters of joined parent advice kept in the stored summary.
pub const SUMMARY_MAX_CHARS: usize = 200;

/// The subset of a feature record the rules look at, with defaults applied.
struct RuleInputs<'a> {
    hours: i32,
    prev_score: i32,
    attendance: i32,
    sleep: i32,
    motivation: String,
    peer_influence: Option<&'a str>,
}

impl<'a> RuleInputs<'a> {
    fn from_record(record: &'a FeatureRecord) -> Self {
        Self {
            hours: record.hours_studied.unwrap_or(0),
            prev_score: record.previous_scores.unwrap_or(0),
            attendance: record.attendance.unwrap_or(100),
            sleep: record.sleep_hours.unwrap_or(7),
            motivation: record
                .motivation_level
                .as_deref()
                .unwrap_or("Medium")
                .to_lowercase(),
            peer_influence: record.peer_influence.as_deref(),
        }
    }
}

/// Score a student: risk band, per-audience advice and the storage summary.
pub fn evaluate(score: f64, record: &FeatureRecord) -> FeedbackResult {
    let band = classify_risk(score);
    let inputs = RuleInputs::from_record(record);

    let mut scenarios = Vec::new();
    let mut parent_advice = Vec::new();
    let mut teacher_advice = Vec::new();

    for scenario in detect_scenarios(score, &inputs) {
        let (parent, teacher) = advice_for(scenario, &inputs);
        scenarios.push(scenario);
        parent_advice.push(parent);
        teacher_advice.push(teacher);
    }

    if parent_advice.is_empty() {
        parent_advice.push(
            "Current data shows balanced development. Keeping the calm study environment at home \
             is enough to sustain this stability."
                .to_string(),
        );
        teacher_advice.push(
            "The student is progressing in line with the curriculum. Difficulty can be raised \
             gradually to stretch their capacity."
                .to_string(),
        );
    }

    let final_text_for_db = summarize(&parent_advice);

    FeedbackResult {
        risk_band: band,
        risk_label: band.label(),
        color: band.color(),
        icon: band.icon(),
        title: band.title(),
        scenarios,
        parent_advice,
        teacher_advice,
        final_text_for_db,
    }
}

/// Bands are checked high to low; boundary values belong to the upper band.
pub fn classify_risk(score: f64) -> RiskBand {
    if score >= 85.0 {
        RiskBand::Low
    } else if score >= 70.0 {
        RiskBand::Safe
    } else if score >= 50.0 {
        RiskBand::Medium
    } else {
        RiskBand::High
    }
}

fn detect_scenarios(score: f64, inputs: &RuleInputs<'_>) -> Vec<Scenario> {
    let mut fired = Vec::with_capacity(3);

    // Potential and effort are alternative diagnoses.
    if f64::from(inputs.prev_score) > score + 10.0 && inputs.hours < 10 {
        fired.push(Scenario::UnderperformingPotential);
    } else if inputs.hours > 15 && score < 70.0 {
        fired.push(Scenario::IneffectiveEffort);
    }

    if inputs.sleep < 6 || inputs.attendance < 80 {
        fired.push(Scenario::LifestyleFactor);
    }

    if inputs.motivation == "low" || inputs.peer_influence == Some("Negative") {
        fired.push(Scenario::MotivationEnvironment);
    }

    fired
}

fn advice_for(scenario: Scenario, inputs: &RuleInputs<'_>) -> (String, String) {
    match scenario {
        Scenario::UnderperformingPotential => (
            format!(
                "Your child's past score of {} shows real potential. However, a study pace of {} \
                 hours per week keeps them below that potential. Build a home routine that makes \
                 clear success comes from discipline, not talent alone.",
                inputs.prev_score, inputs.hours
            ),
            "Profile: high potential / low effort. The student may be experiencing academic \
             boredom. Give project-based responsibilities in areas they care about to re-trigger \
             intrinsic motivation."
                .to_string(),
        ),
        Scenario::IneffectiveEffort => (
            format!(
                "Despite an intense pace of {} hours per week, grades are not reaching the expected \
                 level, which signals inefficient study. Focus on whether the material is \
                 understood rather than time spent at the desk, and minimize distractions \
                 (phone, noise) during study.",
                inputs.hours
            ),
            "The student puts in high effort but their learning strategy is failing. Coach active \
             recall and spaced repetition, and scaffold the gaps in foundational concepts."
                .to_string(),
        ),
        Scenario::LifestyleFactor => {
            let reason = if inputs.sleep < 6 {
                "insufficient sleep"
            } else {
                "attendance-related gaps"
            };
            (
                format!(
                    "Our analysis shows the main obstacle is lifestyle ({reason}) rather than \
                     academics. Learning needs a rested mind; please move the current {} hours of \
                     sleep to at least 8 hours.",
                    inputs.sleep
                ),
                "Cognitive performance is limited by fatigue or absence. Instead of criticizing low \
                 in-class performance, encourage social participation that strengthens the sense \
                 of belonging at school."
                    .to_string(),
            )
        }
        Scenario::MotivationEnvironment => (
            "Your child's current reluctance may come from not connecting with academic goals. \
             Connect through their hobbies outside school and patiently show how those hobbies \
             relate to academic success (for example, discipline)."
                .to_string(),
            "The student is in the low motivation / negative peer influence risk group. Group them \
             with positive role models in class to change attitudes through social learning."
                .to_string(),
        ),
    }
}

/// Hard character cut, no word-boundary handling.
fn summarize(parent_advice: &[String]) -> String {
    let joined = parent_advice.join(" ");
    let body: String = joined.chars().take(SUMMARY_MAX_CHARS).collect();
    format!("{SUMMARY_PREFIX}{body}")
}
