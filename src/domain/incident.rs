use super::Point;

/// Incident severity as reported by event staff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parse a severity label, ignoring case and surrounding whitespace
    pub fn from_label(label: &str) -> Option<Severity> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn weight(self) -> f64 {
        match self {
            Severity::Low => 10.0,
            Severity::Medium => 20.0,
            Severity::High => 50.0,
            Severity::Critical => 100.0,
        }
    }
}

/// An active incident near the venue
#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    pub id: Option<u64>,
    pub location: Point,
    /// `None` when the label was missing or unrecognised
    pub severity: Option<Severity>,
}

impl Incident {
    pub fn new(location: Point, severity: Option<Severity>) -> Self {
        Self {
            id: None,
            location,
            severity,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Penalty weight; unknown severities weigh nothing
    pub fn weight(&self) -> f64 {
        self.severity.map(Severity::weight).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_label() {
        assert_eq!(Severity::from_label("Critical"), Some(Severity::Critical));
        assert_eq!(Severity::from_label(" high "), Some(Severity::High));
        assert_eq!(Severity::from_label("MEDIUM"), Some(Severity::Medium));
        assert_eq!(Severity::from_label("low"), Some(Severity::Low));
        assert_eq!(Severity::from_label("Catastrophic"), None);
    }

    #[test]
    fn test_weights() {
        let at = Point::new(0.0, 0.0);
        assert_eq!(Incident::new(at, Some(Severity::Low)).weight(), 10.0);
        assert_eq!(Incident::new(at, Some(Severity::Medium)).weight(), 20.0);
        assert_eq!(Incident::new(at, Some(Severity::High)).weight(), 50.0);
        assert_eq!(Incident::new(at, Some(Severity::Critical)).weight(), 100.0);
        assert_eq!(Incident::new(at, None).weight(), 0.0);
    }
}
