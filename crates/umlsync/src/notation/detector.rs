//! Class notation detector
//!
//! Identifies the PlantUML class-diagram subset from input text.

use crate::core::Detector;

/// Detector for the class notation
pub struct ClassNotationDetector;

impl ClassNotationDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClassNotationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ClassNotationDetector {
    fn detect(&self, input: &str) -> bool {
        self.confidence(input) > 0.5
    }

    fn confidence(&self, input: &str) -> f64 {
        let has_class_block = input.lines().any(|line| {
            let line = line.trim();
            line.starts_with("class ") && line.contains('{')
        });

        if input.trim_start().starts_with("@startuml") && has_class_block {
            return 1.0;
        }

        if has_class_block {
            return 0.8;
        }

        // Symbols shared with flowchart notations (`-->`) are not enough
        let has_relationship = ["<|--", "--|>", "*--", "o--", "..>", "..|>", "--+"]
            .iter()
            .any(|symbol| input.contains(symbol));
        let has_intermediate = input
            .lines()
            .any(|line| line.trim_start().starts_with('(') && line.contains(") .."));

        if has_relationship || has_intermediate {
            return 0.7;
        }

        0.0
    }

    fn diagram_type(&self) -> &'static str {
        "class"
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["@startuml", "class", ".."]
    }
}
