//! The category → group lookup.

use crate::ledger::LedgerRow;

/// A group (second classification level).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDef {
    /// Group code.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
}

/// A category (first classification level) and its valid groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDef {
    /// Category code.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Valid groups, in display order. Empty for leaf categories.
    pub groups: &'static [GroupDef],
}

impl CategoryDef {
    /// Returns true if the category has no groups.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.groups.is_empty()
    }

    /// Position of a group code within this category.
    #[must_use]
    pub fn group_index(&self, code: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.code == code)
    }
}

/// Where a row lands in the hierarchy, as indices into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Known category and known group.
    Group {
        /// Category index.
        category: usize,
        /// Group index within the category.
        group: usize,
    },
    /// Known leaf category; the row belongs to the category itself.
    Leaf {
        /// Category index.
        category: usize,
    },
    /// Known category with groups, but the row's group is missing or unknown.
    Ungrouped {
        /// Category index.
        category: usize,
    },
    /// Missing or unknown category.
    Unknown,
}

impl Resolution {
    /// Category index, when the category is known.
    #[must_use]
    pub const fn category(&self) -> Option<usize> {
        match *self {
            Self::Group { category, .. } | Self::Leaf { category } | Self::Ungrouped { category } => {
                Some(category)
            }
            Self::Unknown => None,
        }
    }
}

const CURRENT_EXPENSE_GROUPS: &[GroupDef] = &[
    GroupDef {
        code: "1",
        name: "PESSOAL E ENCARGOS SOCIAIS",
    },
    GroupDef {
        code: "2",
        name: "JUROS E ENCARGOS DA DÍVIDA",
    },
    GroupDef {
        code: "3",
        name: "OUTRAS DESPESAS CORRENTES",
    },
];

const CAPITAL_EXPENSE_GROUPS: &[GroupDef] = &[
    GroupDef {
        code: "4",
        name: "INVESTIMENTOS",
    },
    GroupDef {
        code: "5",
        name: "INVERSÕES FINANCEIRAS",
    },
    GroupDef {
        code: "6",
        name: "AMORTIZAÇÃO DA DÍVIDA",
    },
];

const STANDARD_CATEGORIES: &[CategoryDef] = &[
    CategoryDef {
        code: "3",
        name: "DESPESAS CORRENTES",
        groups: CURRENT_EXPENSE_GROUPS,
    },
    CategoryDef {
        code: "4",
        name: "DESPESAS DE CAPITAL",
        groups: CAPITAL_EXPENSE_GROUPS,
    },
    CategoryDef {
        code: "9",
        name: "RESERVA DE CONTINGÊNCIA",
        groups: &[],
    },
];

static STANDARD: ClassificationTree = ClassificationTree::new(STANDARD_CATEGORIES);

/// Fixed, read-only classification lookup.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationTree {
    categories: &'static [CategoryDef],
}

impl ClassificationTree {
    /// Builds a tree over a static category table.
    #[must_use]
    pub const fn new(categories: &'static [CategoryDef]) -> Self {
        Self { categories }
    }

    /// The budget-expense classification in use by the ledger.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Categories in display order.
    #[must_use]
    pub fn categories(&self) -> &'static [CategoryDef] {
        self.categories
    }

    /// Position of a category code.
    #[must_use]
    pub fn category_index(&self, code: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.code == code)
    }

    /// Looks up a category by code.
    #[must_use]
    pub fn category(&self, code: &str) -> Option<&'static CategoryDef> {
        self.categories.iter().find(|c| c.code == code)
    }

    /// Looks up a group by category and group code.
    #[must_use]
    pub fn group(&self, category: &str, group: &str) -> Option<&'static GroupDef> {
        self.category(category)?.groups.iter().find(|g| g.code == group)
    }

    /// Resolves a row's codes against the tree.
    #[must_use]
    pub fn resolve(&self, row: &LedgerRow) -> Resolution {
        self.resolve_codes(row.category.as_deref(), row.group.as_deref())
    }

    /// Resolves a category/group code pair against the tree.
    #[must_use]
    pub fn resolve_codes(&self, category: Option<&str>, group: Option<&str>) -> Resolution {
        let Some(category_idx) = category.and_then(|c| self.category_index(c)) else {
            return Resolution::Unknown;
        };
        let def = &self.categories[category_idx];
        if def.is_leaf() {
            return Resolution::Leaf {
                category: category_idx,
            };
        }
        match group.and_then(|g| def.group_index(g)) {
            Some(group_idx) => Resolution::Group {
                category: category_idx,
                group: group_idx,
            },
            None => Resolution::Ungrouped {
                category: category_idx,
            },
        }
    }
}
