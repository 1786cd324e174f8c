//! Synthetic training data
//!
//! Balances a skewed real dataset with samples whose score is a weighted sum
//! of the features plus gaussian noise.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{rngs::StdRng, Rng, SeedableRng};
use statrs::distribution::Normal;

use crate::models::{FeatureRecord, TrainingRow};

const LEVELS: [&str; 3] = ["Low", "Medium", "High"];
const LEVEL_WEIGHTS: [f64; 3] = [0.3, 0.4, 0.3];
const DISTANCES: [&str; 3] = ["Near", "Moderate", "Far"];
const DISTANCE_WEIGHTS: [f64; 3] = [0.4, 0.4, 0.2];
const PEERS: [&str; 3] = ["Negative", "Neutral", "Positive"];
const PEER_WEIGHTS: [f64; 3] = [0.2, 0.5, 0.3];
const YES_NO: [&str; 2] = ["Yes", "No"];

const NOISE_STD: f64 = 3.0;
const MIN_SCORE: f64 = 10.0;
const MAX_SCORE: f64 = 100.0;

pub const DEFAULT_SAMPLES: usize = 4000;

pub struct SyntheticGenerator {
    rng: StdRng,
}

impl SyntheticGenerator {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Repeatable output when a seed is given.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    pub fn generate(&mut self, samples: usize) -> Vec<TrainingRow> {
        (0..samples).map(|_| self.sample()).collect()
    }

    fn sample(&mut self) -> TrainingRow {
        let hours = self.rng.gen_range(1..35);
        let attendance = self.rng.gen_range(40..100);
        let prev_score = self.rng.gen_range(30..100);
        let sleep = self.rng.gen_range(4..10);
        let tutoring = self.rng.gen_range(0..8);
        let physical = self.rng.gen_range(0..6);

        let motivation = self.choose(&LEVELS, &LEVEL_WEIGHTS);
        let parental = self.choose(&LEVELS, &LEVEL_WEIGHTS);
        let resources = self.choose(&LEVELS, &LEVEL_WEIGHTS);
        let income = self.choose(&LEVELS, &LEVEL_WEIGHTS);
        let teacher = self.choose(&LEVELS, &LEVEL_WEIGHTS);
        let distance = self.choose(&DISTANCES, &DISTANCE_WEIGHTS);
        let peer = self.choose(&PEERS, &PEER_WEIGHTS);
        let internet = self.choose(&YES_NO, &[0.8, 0.2]);
        let disability = self.choose(&YES_NO, &[0.1, 0.9]);

        let mut weight = 0.0;
        // Core factors, 60%
        weight += f64::from(prev_score) / 100.0 * 0.3;
        weight += f64::from(hours) / 35.0 * 0.15;
        weight += f64::from(attendance) / 100.0 * 0.15;
        // Supporting factors, 30%
        weight += level_weight(motivation) * 0.1;
        weight += f64::from(sleep) / 10.0 * 0.1;
        weight += level_weight(teacher) * 0.1;
        // Environment, 10%
        if internet == "Yes" {
            weight += 0.05;
        }
        if disability == "No" {
            weight += 0.05;
        }

        let noisy = weight * 100.0 + self.noise();
        let exam_score = (noisy.clamp(MIN_SCORE, MAX_SCORE) * 10.0).round() / 10.0;

        TrainingRow {
            features: FeatureRecord {
                hours_studied: Some(hours),
                attendance: Some(attendance),
                previous_scores: Some(prev_score),
                tutoring_sessions: Some(tutoring),
                sleep_hours: Some(sleep),
                physical_activity: Some(physical),
                motivation_level: Some(motivation.to_string()),
                parental_involvement: Some(parental.to_string()),
                access_to_resources: Some(resources.to_string()),
                internet_access: Some(internet.to_string()),
                family_income: Some(income.to_string()),
                teacher_quality: Some(teacher.to_string()),
                peer_influence: Some(peer.to_string()),
                learning_disabilities: Some(disability.to_string()),
                distance_from_home: Some(distance.to_string()),
            },
            exam_score,
        }
    }

    fn choose(&mut self, options: &[&'static str], weights: &[f64]) -> &'static str {
        match WeightedIndex::new(weights) {
            Ok(dist) => options[dist.sample(&mut self.rng)],
            Err(_) => options[0],
        }
    }

    fn noise(&mut self) -> f64 {
        match Normal::new(0.0, NOISE_STD) {
            Ok(normal) => normal.sample(&mut self.rng),
            Err(_) => 0.0,
        }
    }
}

fn level_weight(level: &str) -> f64 {
    match level {
        "High" => 1.0,
        "Medium" => 0.5,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_generation_is_repeatable() {
        let a = SyntheticGenerator::seeded(42).generate(50);
        let b = SyntheticGenerator::seeded(42).generate(50);
        assert_eq!(a, b);
    }

    #[test]
    fn test_optional_seed() {
        assert_eq!(SyntheticGenerator::new(Some(5)).generate(20), SyntheticGenerator::seeded(5).generate(20));
        assert_eq!(SyntheticGenerator::new(None).generate(3).len(), 3);
    }

    #[test]
    fn test_noise_spread() {
        let mut generator = SyntheticGenerator::seeded(21);
        let samples: Vec<f64> = (0..5000).map(|_| generator.noise()).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let std = (samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64).sqrt();

        assert!(mean.abs() < 0.2, "mean = {mean}");
        assert!((std - NOISE_STD).abs() < 0.2, "std = {std}");
    }

    #[test]
    fn test_values_stay_in_range() {
        for row in SyntheticGenerator::seeded(1).generate(500) {
            let f = &row.features;
            assert!((1..35).contains(&f.hours_studied.unwrap()));
            assert!((40..100).contains(&f.attendance.unwrap()));
            assert!((30..100).contains(&f.previous_scores.unwrap()));
            assert!((4..10).contains(&f.sleep_hours.unwrap()));
            assert!((0..8).contains(&f.tutoring_sessions.unwrap()));
            assert!((0..6).contains(&f.physical_activity.unwrap()));
            assert!(LEVELS.contains(&f.motivation_level.as_deref().unwrap()));
            assert!(PEERS.contains(&f.peer_influence.as_deref().unwrap()));
            assert!((MIN_SCORE..=MAX_SCORE).contains(&row.exam_score));
            assert_eq!((row.exam_score * 10.0).round() / 10.0, row.exam_score);
        }
    }

    #[test]
    fn test_stronger_profile_scores_higher_on_average() {
        let rows = SyntheticGenerator::seeded(9).generate(2000);
        let mean = |pred: &dyn Fn(&TrainingRow) -> bool| {
            let picked: Vec<f64> = rows.iter().filter(|r| pred(r)).map(|r| r.exam_score).collect();
            picked.iter().sum::<f64>() / picked.len() as f64
        };

        let high = mean(&|r| r.features.previous_scores.unwrap() >= 80);
        let low = mean(&|r| r.features.previous_scores.unwrap() < 50);
        assert!(high > low + 5.0, "high={high} low={low}");
    }
}
