#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Qualification {
    pub id: i32,
    pub name: &'static str,
}

pub const QUALIFICATIONS: [Qualification; 3] = [
    Qualification { id: 1, name: "C#" },
    Qualification {
        id: 2,
        name: "Python",
    },
    Qualification { id: 3, name: "Rust" },
];

pub const SELECTED_QUALIFICATION_ID: i32 = 3;

/// What the qualification page renders: the fixed list plus the selected id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewModel {
    pub qualifications: Vec<Qualification>,
    pub selected: i32,
}

impl ListViewModel {
    /// Built fresh on every call from the constants above; nothing is shared
    /// between requests.
    pub fn current() -> Self {
        Self {
            qualifications: QUALIFICATIONS.to_vec(),
            selected: SELECTED_QUALIFICATION_ID,
        }
    }

    pub fn is_selected(&self, qualification: &Qualification) -> bool {
        qualification.id == self.selected
    }

    pub fn selected_qualification(&self) -> Option<&Qualification> {
        self.qualifications
            .iter()
            .find(|qualification| self.is_selected(qualification))
    }
}
