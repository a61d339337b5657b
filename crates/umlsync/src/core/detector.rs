//! Core detector trait for notation identification

/// Core trait for notation detectors
///
/// # Example
/// ```
/// use umlsync::core::Detector;
/// use umlsync::notation::ClassNotationDetector;
///
/// let detector = ClassNotationDetector::new();
/// assert!(detector.detect("@startuml\nclass User {\n}\n@enduml"));
/// ```
pub trait Detector: Send + Sync {
    /// Detect if the input matches this notation
    fn detect(&self, input: &str) -> bool;

    /// Get the confidence level of the detection (0.0 to 1.0)
    fn confidence(&self, input: &str) -> f64;

    /// Get the notation type name
    fn diagram_type(&self) -> &'static str;

    /// Get key patterns that this detector looks for
    fn patterns(&self) -> Vec<&'static str>;
}
