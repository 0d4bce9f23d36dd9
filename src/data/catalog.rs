//! The fixed course outline shown in the side menu.

/// A course grouping several topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Course {
    pub name: &'static str,
    pub topics: &'static [&'static str],
}

pub const COURSES: &[Course] = &[
    Course {
        name: "Pre-Calculus",
        topics: &[
            "Functions and Graphs",
            "Rate of Change",
            "Introduction to Limits",
        ],
    },
    Course {
        name: "Differential Calculus (Calculus I)",
        topics: &[
            "Limits and Continuity",
            "The Derivative",
            "Differentiation Rules",
            "Applications of the Derivative",
        ],
    },
    Course {
        name: "Integral Calculus (Calculus II)",
        topics: &[
            "Integration",
            "The Fundamental Theorem of Calculus",
            "Techniques of Integration",
            "Applications of Integration",
        ],
    },
];

/// Every topic in menu order, paired with its course.
pub fn topics() -> impl Iterator<Item = (&'static Course, &'static str)> {
    COURSES
        .iter()
        .flat_map(|course| course.topics.iter().map(move |topic| (course, *topic)))
}

/// The topic at a flat menu position.
pub fn topic_at(index: usize) -> Option<&'static str> {
    topics().nth(index).map(|(_, topic)| topic)
}

pub fn topic_count() -> usize {
    COURSES.iter().map(|course| course.topics.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_topic_order() {
        assert_eq!(topic_count(), 11);
        assert_eq!(topic_at(0), Some("Functions and Graphs"));
        assert_eq!(topic_at(3), Some("Limits and Continuity"));
        assert_eq!(topic_at(10), Some("Applications of Integration"));
        assert_eq!(topic_at(11), None);
    }
}
