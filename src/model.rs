// Domain records shared by the API client, the coordinator and the presenter.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolType {
    Elementary,
    Middle,
    High,
    Special,
    Other,
}

impl SchoolType {
    /// Maps the `SCHUL_KND_SC_NM` kind string to a school type.
    pub fn from_kind(kind: &str) -> Self {
        match kind.trim() {
            "초등학교" => SchoolType::Elementary,
            "중학교" => SchoolType::Middle,
            "고등학교" => SchoolType::High,
            "특수학교" => SchoolType::Special,
            _ => SchoolType::Other,
        }
    }

    /// Timetable sub-resource for this kind of school. `None` when the API
    /// publishes no timetable for it.
    pub fn timetable_resource(&self) -> Option<&'static str> {
        match self {
            SchoolType::Elementary => Some("elsTimetable"),
            SchoolType::Middle => Some("misTimetable"),
            SchoolType::High => Some("hisTimetable"),
            SchoolType::Special => Some("spsTimetable"),
            SchoolType::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct School {
    pub org_code: String,
    pub school_code: String,
    pub school_name: String,
    pub school_type: SchoolType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    /// Parses the `MMEAL_SC_NM` label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "조식" => Some(MealType::Breakfast),
            "중식" => Some(MealType::Lunch),
            "석식" => Some(MealType::Dinner),
            _ => None,
        }
    }
}

/// One day's meals. Each entry is a single dish token, not yet segmented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealMenu {
    pub breakfast: Vec<String>,
    pub lunch: Vec<String>,
    pub dinner: Vec<String>,
}

impl MealMenu {
    pub fn get(&self, meal: MealType) -> &[String] {
        match meal {
            MealType::Breakfast => &self.breakfast,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.breakfast.is_empty() && self.lunch.is_empty() && self.dinner.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimetablePeriod {
    pub period: u32,
    pub content: String,
}

impl TimetablePeriod {
    pub fn new(period: u32, content: impl Into<String>) -> Self {
        Self {
            period,
            content: content.into(),
        }
    }
}

/// Drops duplicate (period, content) rows and orders the rest by descending
/// period. Rows sharing a period keep their arrival order.
pub fn normalize_timetable(rows: Vec<TimetablePeriod>) -> Vec<TimetablePeriod> {
    let mut out: Vec<TimetablePeriod> = Vec::with_capacity(rows.len());
    for row in rows {
        if !out.contains(&row) {
            out.push(row);
        }
    }
    out.sort_by(|a, b| b.period.cmp(&a.period));
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter)]
pub enum DisplayPart {
    #[default]
    Breakfast,
    Lunch,
    Dinner,
    Timetable,
}

impl DisplayPart {
    pub fn meal_type(&self) -> Option<MealType> {
        match self {
            DisplayPart::Breakfast => Some(MealType::Breakfast),
            DisplayPart::Lunch => Some(MealType::Lunch),
            DisplayPart::Dinner => Some(MealType::Dinner),
            DisplayPart::Timetable => None,
        }
    }
}

impl fmt::Display for DisplayPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayPart::Breakfast => write!(f, "아침"),
            DisplayPart::Lunch => write!(f, "점심"),
            DisplayPart::Dinner => write!(f, "저녁"),
            DisplayPart::Timetable => write!(f, "시간표"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSelection {
    pub grade: u32,
    pub class_number: u32,
    pub skip_weekend: bool,
    pub part: DisplayPart,
}

impl Default for UserSelection {
    fn default() -> Self {
        Self {
            grade: 1,
            class_number: 1,
            skip_weekend: false,
            part: DisplayPart::default(),
        }
    }
}

/// Snapshot rendered by the presenter. Only the coordinator mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub meal: Option<MealMenu>,
    /// Deduplicated, descending by period.
    pub timetable: Vec<TimetablePeriod>,
    pub selection: UserSelection,
    pub school: Option<School>,
    pub network_reachable: bool,
    pub is_refreshing: bool,
    /// Request date the current meal/timetable belong to.
    pub fetched_for: Option<NaiveDate>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            meal: None,
            timetable: Vec::new(),
            selection: UserSelection::default(),
            school: None,
            network_reachable: true,
            is_refreshing: false,
            fetched_for: None,
        }
    }
}
