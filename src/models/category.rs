use chrono::{DateTime, Utc};

/// Global catalog seeded into every new database: (key, label, icon).
pub const CATALOG: &[(&str, &str, &str)] = &[
    ("clothing", "Clothing", "👕"),
    ("education", "Education", "🎓"),
    ("entertainment", "Entertainment", "🎬"),
    ("gifts", "Gifts & Donations", "🎁"),
    ("groceries", "Groceries", "🛒"),
    ("healthcare", "Healthcare", "🩺"),
    ("housing", "Housing", "🏠"),
    ("income", "Income", "💰"),
    ("insurance", "Insurance", "🛡"),
    ("personal_care", "Personal Care", "🧴"),
    ("restaurants", "Restaurants", "🍽"),
    ("savings", "Savings", "🏦"),
    ("shopping", "Shopping", "🛍"),
    ("subscriptions", "Subscriptions", "📺"),
    ("transportation", "Transportation", "🚌"),
    ("travel", "Travel", "✈"),
    ("utilities", "Utilities", "💡"),
    ("other", "Other", "📦"),
];

/// Keys an owner is subscribed to at onboarding.
pub const DEFAULT_SUBSCRIPTIONS: &[&str] = &[
    "groceries",
    "housing",
    "income",
    "restaurants",
    "transportation",
    "utilities",
    "other",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    /// Globally unique, e.g. `groceries`.
    pub key: String,
    pub label: String,
    pub icon: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Find a category by ID in a slice.
    pub fn find_by_id(categories: &[Category], id: i64) -> Option<&Category> {
        categories.iter().find(|c| c.id == id)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// An owner's link to a catalog category. Unsubscribing soft-deletes the row.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: i64,
    pub owner_id: String,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
