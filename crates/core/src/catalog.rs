//! Catalog model - the fixed, ordered curriculum of weeks and tasks.

use serde::{Deserialize, Serialize};

/// One week of the curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekDefinition {
    /// Week number, unique within a catalog
    #[serde(rename = "week")]
    pub week_number: u32,

    /// Week title
    pub title: String,

    /// Ordered task labels
    pub tasks: Vec<String>,
}

impl WeekDefinition {
    /// Create a week definition.
    pub fn new<I, T>(week_number: u32, title: impl Into<String>, tasks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            week_number,
            title: title.into(),
            tasks: tasks.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of tasks in this week.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

/// Errors raised while building a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Week numbers start at 1
    #[error("week numbers must be positive (got {0})")]
    NonPositiveWeek(u32),

    /// Week numbers must be strictly increasing
    #[error("week {current} follows week {previous}; week numbers must strictly increase")]
    OutOfOrder {
        /// The week that came before
        previous: u32,
        /// The offending week
        current: u32,
    },

    /// A task label is empty
    #[error("week {week} task {index} has an empty label")]
    EmptyTask {
        /// Week number
        week: u32,
        /// Zero-based task index
        index: usize,
    },
}

/// Read-only, ordered list of week definitions.
///
/// A catalog is never mutated after construction; every derived value in
/// the workspace (percentages, schedules, default flags) is computed against
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    weeks: Vec<WeekDefinition>,
}

impl Catalog {
    /// Build a catalog, checking that week numbers are positive and strictly
    /// increasing and that no task label is empty.
    pub fn new(weeks: Vec<WeekDefinition>) -> Result<Self, CatalogError> {
        let mut previous: Option<u32> = None;
        for week in &weeks {
            if week.week_number == 0 {
                return Err(CatalogError::NonPositiveWeek(week.week_number));
            }
            if let Some(previous) = previous {
                if week.week_number <= previous {
                    return Err(CatalogError::OutOfOrder {
                        previous,
                        current: week.week_number,
                    });
                }
            }
            if let Some(index) = week.tasks.iter().position(|t| t.trim().is_empty()) {
                return Err(CatalogError::EmptyTask {
                    week: week.week_number,
                    index,
                });
            }
            previous = Some(week.week_number);
        }
        Ok(Self { weeks })
    }

    /// The built-in 12-week full-stack web development roadmap.
    pub fn roadmap() -> Self {
        let weeks = ROADMAP
            .iter()
            .map(|(number, title, tasks)| {
                WeekDefinition::new(*number, *title, tasks.iter().copied())
            })
            .collect();
        Self { weeks }
    }

    /// All weeks in catalog order.
    pub fn weeks(&self) -> &[WeekDefinition] {
        &self.weeks
    }

    /// Look up a week by its number.
    pub fn week(&self, week_number: u32) -> Option<&WeekDefinition> {
        self.weeks
            .binary_search_by_key(&week_number, |w| w.week_number)
            .ok()
            .map(|idx| &self.weeks[idx])
    }

    /// Iterate weeks in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, WeekDefinition> {
        self.weeks.iter()
    }

    /// Number of weeks.
    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    /// Whether the catalog has no weeks.
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Total number of tasks across all weeks.
    pub fn total_tasks(&self) -> usize {
        self.weeks.iter().map(WeekDefinition::task_count).sum()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::roadmap()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a WeekDefinition;
    type IntoIter = std::slice::Iter<'a, WeekDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

const ROADMAP: &[(u32, &str, &[&str])] = &[
    (
        1,
        "HTML Fundamentals",
        &[
            "What is the web: browser & server",
            "HTML structure (html, head, body)",
            "Basic tags: headings, paragraphs, lists, links, images",
            "Forms & inputs",
            "Exercise: build a personal profile page",
        ],
    ),
    (
        2,
        "CSS Styling",
        &[
            "Selectors, classes, ids",
            "Box model, colors, fonts, spacing",
            "Flexbox & Grid",
            "Responsive design (media queries)",
            "Exercise: responsive profile layout",
        ],
    ),
    (
        3,
        "JavaScript Basics",
        &[
            "Variables & data types",
            "Conditions & loops",
            "Functions & events",
            "DOM manipulation",
            "Exercise: calculator or interactive form",
        ],
    ),
    (
        4,
        "React Basics",
        &[
            "SPA concepts & JSX",
            "Components, props & state",
            "useState & events",
            "useEffect & fetch API",
            "Exercise: React to-do list",
        ],
    ),
    (
        5,
        "Styling: Tailwind CSS",
        &[
            "Installing & configuring Tailwind",
            "Utility classes & responsive variants",
            "Component reuse",
            "Dark mode & basic animation",
            "Exercise: to-do list with a modern UI",
        ],
    ),
    (
        6,
        "Routing & API Integration",
        &[
            "React Router basics",
            "Fetching data from a public API",
            "Error handling & loading state",
            "Form input & POST to an API",
            "Exercise: crypto info app (public API)",
        ],
    ),
    (
        7,
        "Node & Express Basics",
        &[
            "Servers & REST API concepts",
            "Create an Express server",
            "Routing GET/POST/PUT/DELETE",
            "Middleware & JSON",
            "Exercise: user management API",
        ],
    ),
    (
        8,
        "Database: MongoDB",
        &[
            "Database concepts & CRUD",
            "MongoDB + Mongoose setup",
            "Create & read",
            "Update & delete",
            "Exercise: to-do API with a database",
        ],
    ),
    (
        9,
        "Frontend & Backend Integration",
        &[
            "Connect React to Express",
            "Fetch from the backend",
            "Submit forms from React to the backend",
            "CORS & .env",
            "Exercise: MERN to-do app",
        ],
    ),
    (
        10,
        "Git & GitHub",
        &[
            "Git & version control concepts",
            "Init, commit, branch",
            "Push to GitHub",
            "Pull request basics",
            "Exercise: upload a project to GitHub",
        ],
    ),
    (
        11,
        "Deploying to the Internet",
        &[
            "Deploy the frontend to Vercel",
            "Deploy the backend to Render",
            "Connect the live backend and frontend",
            "Use MongoDB Atlas",
            "Test the live deployment",
        ],
    ),
    (
        12,
        "Portfolio & Next Steps",
        &[
            "Build a portfolio landing page",
            "Collect projects & documentation",
            "Add JWT authentication (bonus)",
            "Upload to GitHub & Vercel",
            "Prepare a CV & deploy the portfolio",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roadmap_shape() {
        let catalog = Catalog::roadmap();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.total_tasks(), 60);
        for (idx, week) in catalog.iter().enumerate() {
            assert_eq!(week.week_number as usize, idx + 1);
            assert_eq!(week.task_count(), 5);
        }
    }

    #[test]
    fn test_roadmap_passes_validation() {
        let catalog = Catalog::roadmap();
        let rebuilt = Catalog::new(catalog.weeks().to_vec()).unwrap();
        assert_eq!(rebuilt, catalog);
    }

    #[test]
    fn test_week_lookup() {
        let catalog = Catalog::roadmap();
        assert_eq!(catalog.week(4).unwrap().title, "React Basics");
        assert!(catalog.week(0).is_none());
        assert!(catalog.week(13).is_none());
    }

    #[test]
    fn test_rejects_out_of_order_weeks() {
        let err = Catalog::new(vec![
            WeekDefinition::new(2, "b", ["x"]),
            WeekDefinition::new(1, "a", ["y"]),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::OutOfOrder { previous: 2, current: 1 });
    }

    #[test]
    fn test_rejects_duplicate_and_zero_weeks() {
        let dup = Catalog::new(vec![
            WeekDefinition::new(1, "a", ["x"]),
            WeekDefinition::new(1, "b", ["y"]),
        ]);
        assert!(matches!(dup, Err(CatalogError::OutOfOrder { .. })));

        let zero = Catalog::new(vec![WeekDefinition::new(0, "a", ["x"])]);
        assert_eq!(zero.unwrap_err(), CatalogError::NonPositiveWeek(0));
    }

    #[test]
    fn test_rejects_empty_task_label() {
        let err = Catalog::new(vec![WeekDefinition::new(3, "a", ["ok", "  "])]).unwrap_err();
        assert_eq!(err, CatalogError::EmptyTask { week: 3, index: 1 });
    }

    #[test]
    fn test_sparse_week_numbers_allowed() {
        let catalog = Catalog::new(vec![
            WeekDefinition::new(1, "a", ["x"]),
            WeekDefinition::new(5, "b", ["y", "z"]),
        ])
        .unwrap();
        assert_eq!(catalog.week(5).unwrap().task_count(), 2);
        assert!(catalog.week(3).is_none());
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::new(Vec::new()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.total_tasks(), 0);
    }
}
