//! Built-in quest definitions.

use super::{Difficulty, Quest};

/// The lifestyle quests assigned to every day unless configuration overrides them.
pub fn daily_quests() -> Vec<Quest> {
    vec![
        Quest::lifestyle("wake7am", "Wake up at 7 AM", Difficulty::Easy)
            .with_description("Start your day early and maintain a consistent sleep schedule")
            .with_exp(20)
            .with_category("Daily")
            .with_time_estimate("5 min"),
        Quest::lifestyle("gym-workout", "Complete Daily Workout", Difficulty::Normal)
            .with_description("Complete your scheduled workout routine")
            .with_exp(50)
            .with_category("Fitness")
            .with_time_estimate("45 min"),
        Quest::lifestyle("drink-water", "Drink 6L Water", Difficulty::Easy)
            .with_description("Stay hydrated throughout the day")
            .with_exp(20)
            .with_category("Health")
            .with_time_estimate("2 min"),
        Quest::lifestyle("healthy-meal", "Eat Healthy Meals", Difficulty::Normal)
            .with_description("Maintain a balanced diet with nutritious meals")
            .with_exp(30)
            .with_category("Nutrition")
            .with_time_estimate("30 min"),
        Quest::lifestyle("meditation", "Daily Meditation", Difficulty::Easy)
            .with_description("Practice mindfulness and mental clarity")
            .with_exp(25)
            .with_category("Mental Health")
            .with_time_estimate("15 min"),
    ]
}

/// A starter set of learning quests.
pub fn learning_quests() -> Vec<Quest> {
    vec![
        Quest::learning("python-intro", "Introduction to Python syntax", Difficulty::Easy)
            .with_description("Learn basic Python syntax, indentation, and code structure")
            .with_category("Foundation Skills")
            .with_time_estimate("45 min"),
        Quest::learning("python-vars", "Variables & Data Types", Difficulty::Easy)
            .with_description("Master Python variables, integers, floats, strings, and booleans")
            .with_category("Foundation Skills")
            .with_time_estimate("45 min"),
        Quest::learning("python-strings", "Strings & String Methods", Difficulty::Normal)
            .with_description("Work with string manipulation, formatting, and built-in methods")
            .with_category("Foundation Skills")
            .with_time_estimate("1 hour"),
        Quest::learning("python-lists", "Lists & List Methods", Difficulty::Normal)
            .with_description("Understand lists, indexing, slicing, and list methods")
            .with_category("Foundation Skills")
            .with_time_estimate("1 hour"),
        Quest::learning("linear-algebra", "Linear Algebra Fundamentals", Difficulty::Hard)
            .with_description("Vectors, matrices and the operations machine learning is built on")
            .with_category("Mathematics")
            .with_time_estimate("2 hour"),
        Quest::learning("titanic-project", "Complete Titanic Project", Difficulty::VeryHard)
            .with_description("End-to-end classification project on the Titanic dataset")
            .with_category("Machine Learning")
            .with_time_estimate("3 hour"),
    ]
}

/// Look a quest up by id in `extra` first, then in the built-in catalogs.
pub fn find_quest(id: &str, extra: &[Quest]) -> Option<Quest> {
    extra
        .iter()
        .find(|q| q.id == id)
        .cloned()
        .or_else(|| daily_quests().into_iter().find(|q| q.id == id))
        .or_else(|| learning_quests().into_iter().find(|q| q.id == id))
}
