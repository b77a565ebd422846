use std::fmt;

use serde::Deserialize;

pub const FACE_POINTS: usize = 468;
pub const HAND_POINTS: usize = 21;
pub const HANDS_POINTS: usize = HAND_POINTS * 2;
pub const POSE_POINTS: usize = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Face,
    Hands,
    Pose,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Face, Category::Hands, Category::Pose];

    pub fn point_count(self) -> usize {
        match self {
            Category::Face => FACE_POINTS,
            Category::Hands => HANDS_POINTS,
            Category::Pose => POSE_POINTS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Face => "face",
            Category::Hands => "hands",
            Category::Pose => "pose",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Category::Face => 0,
            Category::Hands => 1,
            Category::Pose => 2,
        }
    }

    fn bit(self) -> u8 {
        1 << self.index()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The categories enabled for a run. Iteration always follows
/// [`Category::ALL`], whatever order the categories were added in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategorySet {
    bits: u8,
}

impl CategorySet {
    pub fn empty() -> Self {
        Self { bits: 0 }
    }

    pub fn all() -> Self {
        Category::ALL.into_iter().collect()
    }

    pub fn with(mut self, category: Category) -> Self {
        self.insert(category);
        self
    }

    pub fn insert(&mut self, category: Category) {
        self.bits |= category.bit();
    }

    pub fn remove(&mut self, category: Category) {
        self.bits &= !category.bit();
    }

    pub fn contains(&self, category: Category) -> bool {
        self.bits & category.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|c| self.contains(*c))
    }

    pub fn stride(&self) -> usize {
        self.iter().map(Category::point_count).sum()
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut set = CategorySet::empty();
        for category in iter {
            set.insert(category);
        }
        set
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Category::name).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
